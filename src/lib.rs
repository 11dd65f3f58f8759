//! # tmix-ingest: Tmix connection-vector ingestion
//!
//! Reads Tmix connection-vector traces (one stream per traffic direction),
//! keeps each record with a configurable probability and distributes the kept
//! records over initiator/acceptor node pairs of bounded capacity. The node
//! pairs are handed to a simulation engine through an opaque handle; building
//! topologies and running the simulation happen on the engine side.
//!
//! ## Architecture
//!
//! - **Parser**: lazy, line-oriented `SEQ`/`CONC` record reader
//! - **Sampling**: per-record Bernoulli filter over an injected draw source
//! - **Allocation**: fills node pairs up to `cvecs_per_pair`, then rolls over
//! - **Runner**: one pipeline per direction, sequential or on scoped threads
//!
//! ## Example
//!
//! ```no_run
//! use tmix_ingest::{
//!     config::IngestConfig,
//!     pipeline::{open_stream, ChannelPairFactory, DirectionRunner},
//! };
//!
//! let runner = DirectionRunner::new(IngestConfig::default().with_keep_probability(0.5))?;
//! let (mut factory, pairs) = ChannelPairFactory::new();
//! let mut source = runner.draw_source();
//!
//! let summary = runner.run(
//!     open_stream("inbound.cvec"),
//!     Some(open_stream("outbound.cvec")),
//!     &mut factory,
//!     &mut source,
//! );
//! for report in summary.reports() {
//!     println!("{report}");
//! }
//! println!("{} node pairs handed off", pairs.drain().len());
//! # Ok::<(), tmix_ingest::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::{IngestConfig, PairOptions};
pub use error::{IngestError, Result};
pub use pipeline::{DirectionReport, DirectionRunner, IngestionStats, PipelineError, RunSummary};
pub use types::{ConnectionVector, Direction};
