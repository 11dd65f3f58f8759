//! DirectionRunner - runs the ingestion pipeline for every present stream.
//!
//! The inbound stream is mandatory, the outbound one optional. Sequential
//! runs share one draw source and process inbound first. Parallel runs give
//! each direction its own generator seeded from the run seed, so counts stay
//! reproducible regardless of thread scheduling.

use crate::config::IngestConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::executor::IngestionPipeline;
use crate::pipeline::handle::PairHandleFactory;
use crate::pipeline::nodes::{RngSource, UniformSource};
use crate::pipeline::stats::{DirectionReport, IngestionStats, RunSummary};
use crate::types::Direction;
use chrono::Utc;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Open a connection-vector file for one direction.
pub fn open_stream(path: impl AsRef<Path>) -> io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

/// Runs one pipeline per configured direction.
pub struct DirectionRunner {
    config: IngestConfig,
}

impl DirectionRunner {
    /// Validates the configuration before any stream is touched.
    pub fn new(config: IngestConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Draw source for a sequential run: seeded if the config has a seed.
    pub fn draw_source(&self) -> RngSource<StdRng> {
        match self.config.seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        }
    }

    /// Ingest inbound, then outbound if present, sharing `factory` and `source`.
    ///
    /// A stream that failed to open fails only its own direction.
    pub fn run<R, F, S>(
        &self,
        inbound: io::Result<R>,
        outbound: Option<io::Result<R>>,
        factory: &mut F,
        source: &mut S,
    ) -> RunSummary
    where
        R: BufRead,
        F: PairHandleFactory + ?Sized,
        S: UniformSource + ?Sized,
    {
        let started_at = Utc::now();
        let inbound = self.run_direction(Direction::Inbound, inbound, &mut *factory, &mut *source);
        let outbound = outbound.map(|stream| {
            self.run_direction(Direction::Outbound, stream, &mut *factory, &mut *source)
        });
        self.summary(started_at, inbound, outbound)
    }

    /// Ingest both directions concurrently, one scoped thread per direction.
    pub fn run_parallel<R, F>(
        &self,
        inbound: io::Result<R>,
        outbound: Option<io::Result<R>>,
        factory: F,
    ) -> RunSummary
    where
        R: BufRead + Send,
        F: PairHandleFactory + Clone + Send,
    {
        let started_at = Utc::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!("Running directions in parallel with base seed {}", seed);

        let (inbound, outbound) = std::thread::scope(|scope| {
            let outbound_handle = outbound.map(|stream| {
                let mut factory = factory.clone();
                scope.spawn(move || {
                    let mut source = RngSource::seeded(seed ^ Direction::Outbound.seed_salt());
                    self.run_direction(Direction::Outbound, stream, &mut factory, &mut source)
                })
            });

            let mut factory = factory;
            let mut source = RngSource::seeded(seed ^ Direction::Inbound.seed_salt());
            let inbound = self.run_direction(Direction::Inbound, inbound, &mut factory, &mut source);

            let outbound = outbound_handle.map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    DirectionReport::failed(
                        Direction::Outbound,
                        IngestionStats::default(),
                        PipelineError::Handoff("outbound worker panicked".to_string()),
                    )
                })
            });
            (inbound, outbound)
        });

        self.summary(started_at, inbound, outbound)
    }

    fn run_direction<R, F, S>(
        &self,
        direction: Direction,
        stream: io::Result<R>,
        factory: &mut F,
        source: &mut S,
    ) -> DirectionReport
    where
        R: BufRead,
        F: PairHandleFactory + ?Sized,
        S: UniformSource + ?Sized,
    {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!("Cannot read {} stream: {}", direction, err);
                return DirectionReport::failed(
                    direction,
                    IngestionStats::default(),
                    PipelineError::StreamUnavailable(err),
                );
            }
        };

        match IngestionPipeline::new(direction, &self.config, factory) {
            Ok(pipeline) => pipeline.run(stream, source),
            Err(err) => DirectionReport::failed(direction, IngestionStats::default(), err),
        }
    }

    fn summary(
        &self,
        started_at: chrono::DateTime<Utc>,
        inbound: DirectionReport,
        outbound: Option<DirectionReport>,
    ) -> RunSummary {
        RunSummary {
            started_at,
            keep_probability: self.config.keep_probability,
            cvecs_per_pair: self.config.cvecs_per_pair,
            inbound,
            outbound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bridge::ChannelPairFactory;
    use crate::pipeline::nodes::ReplaySource;
    use crate::pipeline::stats::DirectionState;
    use std::io::Cursor;

    fn stream(records: usize) -> io::Result<Cursor<Vec<u8>>> {
        let text: String = (0..records)
            .map(|i| format!("CONC {} 1 1 {} 443\nc> 10\nc< 20\n", i, 2000 + i))
            .collect();
        Ok(Cursor::new(text.into_bytes()))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = IngestConfig::default().with_keep_probability(1.2);
        assert!(matches!(
            DirectionRunner::new(config),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_outbound_is_optional() {
        let runner = DirectionRunner::new(IngestConfig::default()).unwrap();
        let (mut factory, _rx) = ChannelPairFactory::new();
        let summary = runner.run(
            stream(3),
            None,
            &mut factory,
            &mut ReplaySource::new(vec![0.0]).unwrap(),
        );
        assert!(summary.is_success());
        assert!(summary.outbound.is_none());
        assert_eq!(summary.inbound.stats.total_parsed, 3);
    }

    #[test]
    fn test_unavailable_stream_fails_only_its_direction() {
        let runner = DirectionRunner::new(IngestConfig::default()).unwrap();
        let (mut factory, _rx) = ChannelPairFactory::new();
        let missing = io::Error::new(io::ErrorKind::NotFound, "missing");
        let summary = runner.run(
            stream(2),
            Some(Err(missing)),
            &mut factory,
            &mut ReplaySource::new(vec![0.0]).unwrap(),
        );
        assert!(summary.inbound.is_completed());
        let outbound = summary.outbound.as_ref().unwrap();
        assert_eq!(outbound.state, DirectionState::Failed);
        assert!(matches!(
            outbound.error,
            Some(PipelineError::StreamUnavailable(_))
        ));
        assert_eq!(outbound.stats, IngestionStats::default());
    }

    #[test]
    fn test_sequential_run_shares_draw_source() {
        let config = IngestConfig::default().with_keep_probability(0.5);
        let runner = DirectionRunner::new(config).unwrap();
        let (mut factory, _rx) = ChannelPairFactory::new();
        let mut source = ReplaySource::new(vec![0.1, 0.9, 0.9]).unwrap();

        let summary = runner.run(stream(3), Some(stream(3)), &mut factory, &mut source);
        // Inbound uses draws 0..3, outbound continues with 3..6.
        assert_eq!(summary.inbound.stats.total_accepted, 1);
        assert_eq!(summary.outbound.as_ref().unwrap().stats.total_accepted, 1);
        assert_eq!(source.consumed(), 6);
    }

    #[test]
    fn test_parallel_run_is_deterministic_under_seed() {
        let config = IngestConfig::default()
            .with_keep_probability(0.4)
            .with_cvecs_per_pair(7)
            .with_seed(1234);
        let runner = DirectionRunner::new(config).unwrap();

        let run = || {
            let (factory, rx) = ChannelPairFactory::new();
            let summary = runner.run_parallel(stream(200), Some(stream(300)), factory);
            let pairs = rx.drain().len() as u64;
            (summary, pairs)
        };
        let (first, first_pairs) = run();
        let (second, second_pairs) = run();

        assert_eq!(first.inbound.stats, second.inbound.stats);
        assert_eq!(
            first.outbound.as_ref().unwrap().stats,
            second.outbound.as_ref().unwrap().stats
        );
        assert_eq!(first_pairs, second_pairs);
        assert_eq!(first_pairs, first.totals().pairs_created);
    }
}
