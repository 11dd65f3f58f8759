//! Per-direction accounting and run summaries.

use crate::pipeline::error::PipelineError;
use crate::types::Direction;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Counters accumulated while ingesting one direction's stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionStats {
    /// Records successfully parsed, accepted or not
    pub total_parsed: u64,
    /// Records that passed sampling
    pub total_accepted: u64,
    /// Pairs opened, including a partially filled last one
    pub pairs_created: u64,
}

impl std::ops::Add for IngestionStats {
    type Output = IngestionStats;

    fn add(self, rhs: Self) -> Self::Output {
        IngestionStats {
            total_parsed: self.total_parsed + rhs.total_parsed,
            total_accepted: self.total_accepted + rhs.total_accepted,
            pairs_created: self.pairs_created + rhs.pairs_created,
        }
    }
}

/// Lifecycle of one direction's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionState {
    #[default]
    NotStarted,
    Parsing,
    /// Stream exhausted cleanly
    Completed,
    /// Stopped early; stats hold what was reached
    Failed,
}

fn serialize_error<S: Serializer>(
    error: &Option<PipelineError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}

/// Outcome of one direction: the terminal state, the counters reached and
/// the error that stopped it, if any.
#[derive(Debug, Serialize)]
pub struct DirectionReport {
    pub direction: Direction,
    pub state: DirectionState,
    pub stats: IngestionStats,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<PipelineError>,
}

impl DirectionReport {
    pub fn completed(direction: Direction, stats: IngestionStats) -> Self {
        Self {
            direction,
            state: DirectionState::Completed,
            stats,
            error: None,
        }
    }

    pub fn failed(direction: Direction, stats: IngestionStats, error: PipelineError) -> Self {
        Self {
            direction,
            state: DirectionState::Failed,
            stats,
            error: Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == DirectionState::Completed
    }
}

impl fmt::Display for DirectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total cvecs read {}.", self.stats.total_parsed)?;
        write!(
            f,
            "Read a total of {} cvecs, distributing them to {} node pairs.",
            self.stats.total_accepted, self.stats.pairs_created
        )?;
        if let Some(err) = &self.error {
            write!(f, "\n{} side stopped early: {}", self.direction, err)?;
        }
        Ok(())
    }
}

/// Reports for every direction of one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub keep_probability: f64,
    pub cvecs_per_pair: usize,
    pub inbound: DirectionReport,
    pub outbound: Option<DirectionReport>,
}

impl RunSummary {
    pub fn reports(&self) -> impl Iterator<Item = &DirectionReport> {
        std::iter::once(&self.inbound).chain(self.outbound.as_ref())
    }

    pub fn report(&self, direction: Direction) -> Option<&DirectionReport> {
        self.reports().find(|r| r.direction == direction)
    }

    /// Counters summed over both directions
    pub fn totals(&self) -> IngestionStats {
        self.reports()
            .map(|r| r.stats)
            .fold(IngestionStats::default(), |acc, s| acc + s)
    }

    /// True when every present direction completed
    pub fn is_success(&self) -> bool {
        self.reports().all(DirectionReport::is_completed)
    }
}
