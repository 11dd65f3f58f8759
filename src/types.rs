//! Core data types for connection-vector ingestion
//!
//! This module defines the records that flow through the ingestion pipeline:
//! [`ConnectionVector`] (one parsed Tmix record) and [`Direction`] (which side
//! of the simulated link initiates the connections in a stream).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which side of the simulated link initiates the connections in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Initiators on the left side (first input stream)
    Inbound,
    /// Initiators on the right side (optional second input stream)
    Outbound,
}

impl Direction {
    /// Display name for the direction
    pub fn display_name(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    /// Salt mixed into the run seed when each direction gets its own generator
    pub fn seed_salt(&self) -> u64 {
        match self {
            Direction::Inbound => 0x9E37_79B9_7F4A_7C15,
            Direction::Outbound => 0xC2B2_AE3D_27D4_EB4F,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Connection vector flavor, taken from the record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvecKind {
    /// `SEQ` - request/response epochs strictly alternate
    Sequential,
    /// `CONC` - both endpoints send independently
    Concurrent,
}

impl CvecKind {
    /// Header keyword as it appears in the stream
    pub fn keyword(&self) -> &'static str {
        match self {
            CvecKind::Sequential => "SEQ",
            CvecKind::Concurrent => "CONC",
        }
    }
}

/// Endpoint that performs an ADU or think-time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    Initiator,
    Acceptor,
}

/// One step of a connection's application-level behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adu {
    /// An endpoint sends `bytes` bytes
    Send { from: Endpoint, bytes: u64 },
    /// Think time before the next step. `by` is `None` for sequential vectors,
    /// where the wait is not tied to one endpoint.
    Wait { by: Option<Endpoint>, time: Duration },
}

/// A single parsed Tmix connection vector.
///
/// Immutable once parsed. The ingestion pipeline never looks inside; it only
/// counts records and routes them to node pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionVector {
    pub kind: CvecKind,
    /// Connection start time relative to the beginning of the trace
    pub start_time: Duration,
    /// Epoch count for `SEQ`, initiator ADU count for `CONC`
    pub initiator_count: u32,
    /// Acceptor ADU count (`CONC` only)
    pub acceptor_count: Option<u32>,
    pub initiator_port: u32,
    pub acceptor_port: u32,
    /// Receiver window sizes in bytes (initiator, acceptor)
    pub windows: Option<(u32, u32)>,
    pub min_rtt: Option<Duration>,
    /// Loss rates in [0, 1] (initiator, acceptor)
    pub loss: Option<(f64, f64)>,
    /// ADU steps in stream order
    pub adus: Vec<Adu>,
}

impl ConnectionVector {
    /// Create an empty vector of the given kind with default attributes
    pub fn new(kind: CvecKind, start_time: Duration) -> Self {
        Self {
            kind,
            start_time,
            initiator_count: 0,
            acceptor_count: None,
            initiator_port: 0,
            acceptor_port: 0,
            windows: None,
            min_rtt: None,
            loss: None,
            adus: Vec::new(),
        }
    }

    /// Total bytes sent by both endpoints
    pub fn total_bytes(&self) -> u64 {
        self.adus
            .iter()
            .map(|adu| match adu {
                Adu::Send { bytes, .. } => *bytes,
                Adu::Wait { .. } => 0,
            })
            .sum()
    }
}
