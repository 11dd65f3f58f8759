//! PairAllocator - capacity-bounded grouping of accepted records.
//!
//! Keeps at most one open pair per direction. A pair is opened on the first
//! offer after the previous one was sealed, sealed as soon as it holds
//! `capacity` vectors, and the last partial pair is sealed by [`finish`].
//!
//! [`finish`]: PairAllocator::finish

use crate::config::PairOptions;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::handle::{PairHandle, PairHandleFactory};
use crate::pipeline::id::PairId;
use crate::types::{ConnectionVector, Direction};

struct OpenPair {
    id: PairId,
    len: usize,
    handle: Box<dyn PairHandle>,
}

/// Assigns accepted connection vectors of one direction to node pairs.
pub struct PairAllocator<F> {
    direction: Direction,
    capacity: usize,
    options: PairOptions,
    factory: F,
    current: Option<OpenPair>,
    next_id: PairId,
    pairs_created: u64,
}

impl<F: PairHandleFactory> PairAllocator<F> {
    pub fn new(
        direction: Direction,
        capacity: usize,
        options: PairOptions,
        factory: F,
    ) -> PipelineResult<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "cvecs_per_pair must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            direction,
            capacity,
            options,
            factory,
            current: None,
            next_id: PairId::default(),
            pairs_created: 0,
        })
    }

    /// Pairs opened so far, including the one currently open.
    pub fn pairs_created(&self) -> u64 {
        self.pairs_created
    }

    /// Add one accepted vector to the current pair, opening or sealing
    /// pairs as needed.
    pub fn offer(&mut self, cvec: ConnectionVector) -> PipelineResult<()> {
        if self.current.is_none() {
            self.current = Some(self.open_next()?);
        }
        if let Some(pair) = self.current.as_mut() {
            pair.handle.accept(cvec)?;
            pair.len += 1;
            if pair.len < self.capacity {
                return Ok(());
            }
        }
        self.seal_current()
    }

    /// Seal the open pair, if any. Called once the direction's input ends.
    pub fn finish(&mut self) -> PipelineResult<()> {
        if self.current.is_some() {
            self.seal_current()?;
        }
        Ok(())
    }

    fn open_next(&mut self) -> PipelineResult<OpenPair> {
        let id = self.next_id;
        let mut handle = self.factory.new_pair(self.direction, id)?;
        handle.apply_options(&self.options);
        self.next_id = id.next();
        self.pairs_created += 1;
        tracing::debug!(
            "Opened {} {} (lossless: {})",
            self.direction,
            id,
            self.options.lossless
        );
        Ok(OpenPair { id, len: 0, handle })
    }

    fn seal_current(&mut self) -> PipelineResult<()> {
        if let Some(mut pair) = self.current.take() {
            pair.handle.seal()?;
            tracing::debug!(
                "Sealed {} {} with {} cvecs",
                self.direction,
                pair.id,
                pair.len
            );
        }
        Ok(())
    }
}
