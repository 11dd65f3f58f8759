//! Connection-vector ingestion pipeline.
//!
//! Records flow one way through a fixed chain of stages, once per direction:
//!
//! ```text
//! stream ──► [RecordParser] ──► [SamplingFilter] ──► [PairAllocator] ──► PairHandle
//!                                                                     (engine side)
//! ```
//!
//! # Design
//!
//! - **Lazy parsing**: one record is materialized at a time; the parser holds
//!   back at most the header that closes the current record.
//! - **Injected randomness**: the filter draws from a [`UniformSource`], so a
//!   fixed seed reproduces every per-direction count.
//! - **Opaque handoff**: pairs are delivered through [`PairHandle`]s obtained
//!   from a [`PairHandleFactory`]; [`ChannelPairFactory`] ships them across a
//!   crossbeam channel.
//! - **Partial results**: a failing direction still reports the counts it
//!   reached, and never affects the other direction.

pub mod bridge;
pub mod error;
pub mod executor;
pub mod handle;
pub mod id;
pub mod nodes;
pub mod runner;
pub mod stats;

pub use bridge::{ChannelPairFactory, PairReceiver, SealedPair};
pub use error::{PipelineError, PipelineResult};
pub use executor::IngestionPipeline;
pub use handle::{PairHandle, PairHandleFactory};
pub use id::PairId;
pub use nodes::{
    PairAllocator, RecordParser, ReplaySource, RngSource, SamplingFilter, UniformSource,
};
pub use runner::{open_stream, DirectionRunner};
pub use stats::{DirectionReport, DirectionState, IngestionStats, RunSummary};
