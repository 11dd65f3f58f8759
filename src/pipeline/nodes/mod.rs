//! Built-in pipeline stages.

pub mod pair_allocator;
pub mod record_source;
pub mod sampling_filter;

pub use pair_allocator::PairAllocator;
pub use record_source::RecordParser;
pub use sampling_filter::{ReplaySource, RngSource, SamplingFilter, UniformSource};
