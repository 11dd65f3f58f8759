//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::io::Cursor;
use tmix_ingest::pipeline::SealedPair;

/// Wrap cvec text as an in-memory stream
pub fn stream(text: impl Into<String>) -> std::io::Result<Cursor<Vec<u8>>> {
    Ok(Cursor::new(text.into().into_bytes()))
}

/// Sizes of the handed-off pairs, in handoff order
pub fn pair_sizes(pairs: &[SealedPair]) -> Vec<usize> {
    pairs.iter().map(|pair| pair.vectors.len()).collect()
}

/// Expected number of pairs for `accepted` records at `capacity`
pub fn expected_pairs(accepted: u64, capacity: usize) -> u64 {
    accepted.div_ceil(capacity as u64)
}
