//! SamplingFilter - per-record Bernoulli accept/reject.
//!
//! A record is kept when a uniform draw in [0, 1) falls below the
//! keep-probability. The draw source is injected so runs are reproducible
//! under a fixed seed.

use crate::pipeline::error::{PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of independent uniform draws in [0, 1).
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Adapts any `rand` generator into a [`UniformSource`].
pub struct RngSource<R>(pub R);

impl<R: Rng> UniformSource for RngSource<R> {
    fn next_uniform(&mut self) -> f64 {
        // Standard distribution for f64 is uniform over [0, 1)
        self.0.gen::<f64>()
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Replays a fixed sequence of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    draws: Vec<f64>,
    position: usize,
}

impl ReplaySource {
    pub fn new(draws: Vec<f64>) -> PipelineResult<Self> {
        if draws.is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "replay source needs at least one draw".to_string(),
            ));
        }
        Ok(Self { draws, position: 0 })
    }

    /// Number of draws handed out so far
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl UniformSource for ReplaySource {
    fn next_uniform(&mut self) -> f64 {
        let draw = self.draws[self.position % self.draws.len()];
        self.position += 1;
        draw
    }
}

/// Memoryless keep/drop decision with a fixed keep-probability.
#[derive(Debug, Clone, Copy)]
pub struct SamplingFilter {
    keep_probability: f64,
}

impl SamplingFilter {
    pub fn new(keep_probability: f64) -> PipelineResult<Self> {
        if !(0.0..=1.0).contains(&keep_probability) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "keep_probability must be within [0.0, 1.0], got {}",
                keep_probability
            )));
        }
        Ok(Self { keep_probability })
    }

    /// Check if every record passes without consulting the source.
    pub fn is_passthrough(&self) -> bool {
        self.keep_probability >= 1.0
    }

    /// Decide whether to keep the next record.
    ///
    /// At probability 1.0 and 0.0 the outcome is fixed and no draw is taken.
    pub fn accept<S: UniformSource + ?Sized>(&self, source: &mut S) -> bool {
        if self.is_passthrough() {
            return true;
        }
        if self.keep_probability <= 0.0 {
            return false;
        }
        source.next_uniform() < self.keep_probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_probability() {
        assert!(SamplingFilter::new(-0.01).is_err());
        assert!(SamplingFilter::new(1.01).is_err());
        assert!(SamplingFilter::new(f64::NAN).is_err());
    }

    #[test]
    fn test_always_keep_takes_no_draws() {
        let filter = SamplingFilter::new(1.0).unwrap();
        let mut source = ReplaySource::new(vec![0.0, 0.999_999]).unwrap();
        for _ in 0..10 {
            assert!(filter.accept(&mut source));
        }
        assert_eq!(source.consumed(), 0);
    }

    #[test]
    fn test_never_keep() {
        let filter = SamplingFilter::new(0.0).unwrap();
        let mut source = ReplaySource::new(vec![0.0]).unwrap();
        assert!(!filter.accept(&mut source));
        assert_eq!(source.consumed(), 0);
    }

    #[test]
    fn test_accepts_strictly_below_probability() {
        let filter = SamplingFilter::new(0.5).unwrap();
        let mut source = ReplaySource::new(vec![0.0, 0.49, 0.5, 0.75]).unwrap();
        let decisions: Vec<bool> = (0..4).map(|_| filter.accept(&mut source)).collect();
        assert_eq!(decisions, vec![true, true, false, false]);
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..100 {
            let draw = a.next_uniform();
            assert!((0.0..1.0).contains(&draw));
            assert_eq!(draw, b.next_uniform());
        }
    }

    #[test]
    fn test_keep_rate_roughly_matches_probability() {
        let filter = SamplingFilter::new(0.3).unwrap();
        let mut source = RngSource::seeded(7);
        let kept = (0..10_000).filter(|_| filter.accept(&mut source)).count();
        assert!((2_700..3_300).contains(&kept), "kept {kept}");
    }

    #[test]
    fn test_empty_replay_rejected() {
        assert!(matches!(
            ReplaySource::new(Vec::new()),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_dyn_source() {
        let filter = SamplingFilter::new(0.5).unwrap();
        let mut replay = ReplaySource::new(vec![0.1]).unwrap();
        let source: &mut dyn UniformSource = &mut replay;
        assert!(filter.accept(source));
    }
}
