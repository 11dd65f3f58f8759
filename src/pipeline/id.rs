//! Identity types for node pairs.
//!
//! Pair IDs are assigned per direction in creation order, starting at 0, so
//! they double as the pair's position in that direction's handoff sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node pair within one direction's handoff sequence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PairId(pub u64);

impl PairId {
    #[inline]
    pub fn next(self) -> PairId {
        PairId(self.0 + 1)
    }
}

impl fmt::Debug for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairId({})", self.0)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_id_sequence() {
        let first = PairId::default();
        assert_eq!(first, PairId(0));
        assert_eq!(first.next(), PairId(1));
        assert!(first < first.next());
    }

    #[test]
    fn test_pair_id_formatting() {
        assert_eq!(format!("{:?}", PairId(3)), "PairId(3)");
        assert_eq!(PairId(3).to_string(), "pair#3");
    }

    #[test]
    fn test_pair_id_goes_past_u32() {
        let id = PairId(u64::from(u32::MAX));
        assert_eq!(id.next(), PairId(1 << 32));
    }
}
