//! Ingestion types: counters, results and errors.

use std::fmt;

use crate::transport::TransportError;

/// Counters kept by the ingestion loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Records read from the transport
    pub records: u64,
    /// Records that decoded and were published
    pub decoded: u64,
    /// Records discarded as malformed
    pub misses: u64,
    /// Waits that ended without a record
    pub idle_polls: u64,
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} decoded, {} discarded, {} idle polls",
            self.records, self.decoded, self.misses, self.idle_polls
        )
    }
}

/// What the ingestion thread hands back when it is joined.
#[derive(Debug)]
pub struct IngestReport<S> {
    /// The transport, returned so its owner can close it
    pub source: S,
    pub stats: IngestStats,
    /// How the loop ended: `Ok` after a stop request, `Err` on link failure
    pub result: Result<(), TransportError>,
}

/// Errors from managing the ingestion thread.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to spawn ingestion thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Ingestion thread panicked")]
    Panicked,
}
