//! Pipeline executor - the per-direction ingestion loop.
//!
//! Each run:
//! 1. Pull the next record from the parser.
//! 2. Count it, then ask the sampling filter whether to keep it.
//! 3. Offer kept records to the direction's pair allocator.
//! 4. On end of stream or the first error, seal the open pair and report.

use crate::config::IngestConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::handle::PairHandleFactory;
use crate::pipeline::nodes::{PairAllocator, RecordParser, SamplingFilter, UniformSource};
use crate::pipeline::stats::{DirectionReport, DirectionState, IngestionStats};
use crate::types::Direction;
use std::io::BufRead;

/// Ingestion pipeline for one direction.
///
/// Owns its allocator and counters exclusively; nothing is shared with the
/// other direction apart from the draw source handed to [`run`].
///
/// [`run`]: IngestionPipeline::run
pub struct IngestionPipeline<F> {
    direction: Direction,
    filter: SamplingFilter,
    allocator: PairAllocator<F>,
    stats: IngestionStats,
    state: DirectionState,
}

impl<F: PairHandleFactory> IngestionPipeline<F> {
    pub fn new(direction: Direction, config: &IngestConfig, factory: F) -> PipelineResult<Self> {
        Ok(Self {
            direction,
            filter: SamplingFilter::new(config.keep_probability)?,
            allocator: PairAllocator::new(
                direction,
                config.cvecs_per_pair,
                config.pair,
                factory,
            )?,
            stats: IngestionStats::default(),
            state: DirectionState::NotStarted,
        })
    }

    fn transition(&mut self, next: DirectionState) {
        tracing::debug!("{} side: {:?} -> {:?}", self.direction, self.state, next);
        self.state = next;
    }

    /// Consume `stream` front to back and report what was ingested.
    ///
    /// The stream is dropped before this returns, whatever the outcome.
    pub fn run<R, S>(mut self, stream: R, source: &mut S) -> DirectionReport
    where
        R: BufRead,
        S: UniformSource + ?Sized,
    {
        tracing::info!("Adding connection vectors to {} side", self.direction);
        self.transition(DirectionState::Parsing);

        let mut parser = RecordParser::new(stream);
        let mut outcome = self.pump(&mut parser, source);
        drop(parser);

        // Seal whatever was accepted before the stream ended or failed.
        if let Err(err) = self.allocator.finish() {
            match outcome {
                Ok(()) => outcome = Err(err),
                Err(_) => tracing::warn!(
                    "Could not seal last {} pair after failure: {}",
                    self.direction,
                    err
                ),
            }
        }
        self.stats.pairs_created = self.allocator.pairs_created();

        match outcome {
            Ok(()) => {
                self.transition(DirectionState::Completed);
                tracing::info!("Total cvecs read {}.", self.stats.total_parsed);
                tracing::info!(
                    "Read a total of {} cvecs, distributing them to {} node pairs.",
                    self.stats.total_accepted,
                    self.stats.pairs_created
                );
                DirectionReport::completed(self.direction, self.stats)
            }
            Err(err) => {
                self.transition(DirectionState::Failed);
                tracing::warn!(
                    "{} side stopped after {} cvecs: {}",
                    self.direction,
                    self.stats.total_parsed,
                    err
                );
                DirectionReport::failed(self.direction, self.stats, err)
            }
        }
    }

    fn pump<R, S>(&mut self, parser: &mut RecordParser<R>, source: &mut S) -> Result<(), PipelineError>
    where
        R: BufRead,
        S: UniformSource + ?Sized,
    {
        while let Some(cvec) = parser.next_record()? {
            self.stats.total_parsed += 1;
            if self.filter.accept(source) {
                self.stats.total_accepted += 1;
                self.allocator.offer(cvec)?;
            }
        }
        Ok(())
    }
}
