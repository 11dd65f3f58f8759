//! Handoff boundary between the ingestion pipeline and the engine side.
//!
//! `ChannelPairFactory` hands out handles that buffer a pair's connection
//! vectors and, when sealed, send the finished pair over a crossbeam channel.
//! The engine side drains them from the matching [`PairReceiver`].

use crate::config::PairOptions;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::handle::{PairHandle, PairHandleFactory};
use crate::pipeline::id::PairId;
use crate::types::{ConnectionVector, Direction};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// A node pair whose contents have been handed off.
#[derive(Debug, Clone)]
pub struct SealedPair {
    pub id: PairId,
    pub direction: Direction,
    pub options: PairOptions,
    pub vectors: Vec<ConnectionVector>,
}

/// Factory whose handles deliver sealed pairs over a channel.
#[derive(Clone)]
pub struct ChannelPairFactory {
    tx: Sender<SealedPair>,
}

impl ChannelPairFactory {
    /// Create a factory and the receiver its sealed pairs arrive on.
    pub fn new() -> (Self, PairReceiver) {
        // Unbounded: a sequential run may seal every pair before the
        // receiver is drained on the same thread.
        let (tx, rx) = unbounded();
        (Self { tx }, PairReceiver { rx })
    }
}

impl PairHandleFactory for ChannelPairFactory {
    fn new_pair(
        &mut self,
        direction: Direction,
        id: PairId,
    ) -> PipelineResult<Box<dyn PairHandle>> {
        Ok(Box::new(ChannelPairHandle {
            id,
            direction,
            options: PairOptions::default(),
            vectors: Vec::new(),
            tx: self.tx.clone(),
            sealed: false,
        }))
    }
}

struct ChannelPairHandle {
    id: PairId,
    direction: Direction,
    options: PairOptions,
    vectors: Vec<ConnectionVector>,
    tx: Sender<SealedPair>,
    sealed: bool,
}

impl PairHandle for ChannelPairHandle {
    fn apply_options(&mut self, options: &PairOptions) {
        self.options = *options;
    }

    fn accept(&mut self, cvec: ConnectionVector) -> PipelineResult<()> {
        if self.sealed {
            return Err(PipelineError::Handoff(format!(
                "{} {} is already sealed",
                self.direction, self.id
            )));
        }
        self.vectors.push(cvec);
        Ok(())
    }

    fn seal(&mut self) -> PipelineResult<()> {
        if self.sealed {
            return Ok(());
        }
        self.sealed = true;
        let pair = SealedPair {
            id: self.id,
            direction: self.direction,
            options: self.options,
            vectors: std::mem::take(&mut self.vectors),
        };
        self.tx.send(pair).map_err(|_| {
            PipelineError::Handoff(format!(
                "receiver dropped before {} {} was handed off",
                self.direction, self.id
            ))
        })
    }
}

/// Engine-side end of a [`ChannelPairFactory`].
pub struct PairReceiver {
    rx: Receiver<SealedPair>,
}

impl PairReceiver {
    /// Take every pair sealed so far without blocking.
    pub fn drain(&self) -> Vec<SealedPair> {
        self.rx.try_iter().collect()
    }

    /// Blocking iterator that ends when every sender is gone.
    pub fn iter(&self) -> impl Iterator<Item = SealedPair> + '_ {
        self.rx.iter()
    }
}
