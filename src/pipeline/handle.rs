//! Node-pair handle abstraction.
//!
//! The allocator never talks to a simulation engine directly. It asks a
//! [`PairHandleFactory`] for one handle per pair, configures it, streams the
//! pair's connection vectors into it and seals it once the pair is full or
//! the input ends. What a handle does with the vectors is up to the engine
//! side.

use crate::config::PairOptions;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::PairId;
use crate::types::{ConnectionVector, Direction};

/// Receiving end of one initiator/acceptor node pair.
#[cfg_attr(test, mockall::automock)]
pub trait PairHandle: Send {
    /// Called once, before the first `accept`.
    fn apply_options(&mut self, _options: &PairOptions) {}

    /// Append one connection vector to the pair.
    fn accept(&mut self, cvec: ConnectionVector) -> PipelineResult<()>;

    /// No further vectors will arrive for this pair.
    fn seal(&mut self) -> PipelineResult<()>;
}

/// Supplies a fresh handle for every pair the allocator opens.
#[cfg_attr(test, mockall::automock)]
pub trait PairHandleFactory {
    fn new_pair(&mut self, direction: Direction, id: PairId)
        -> PipelineResult<Box<dyn PairHandle>>;
}

impl<F: PairHandleFactory + ?Sized> PairHandleFactory for &mut F {
    fn new_pair(
        &mut self,
        direction: Direction,
        id: PairId,
    ) -> PipelineResult<Box<dyn PairHandle>> {
        (**self).new_pair(direction, id)
    }
}
