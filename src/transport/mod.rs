//! Sensor transport - the serial link the telemetry arrives on.
//!
//! # Structure
//!
//! - [`error`] - Error types for transport operations
//! - [`line_mode`] - Canonical line-mode settings
//! - [`channel`] - Serial device channel
//!
//! The ingestion loop only sees the [`RecordSource`] trait, so tests can
//! drive it with an in-memory transport.

mod error;
#[cfg(unix)]
mod channel;
#[cfg(unix)]
mod line_mode;

pub use error::TransportError;
#[cfg(unix)]
pub use channel::SerialChannel;
#[cfg(unix)]
pub use line_mode::LineMode;

/// Largest record the transport hands out in one read.
pub const MAX_RECORD_LEN: usize = 1024;

/// Result of one wait for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A record of this many bytes was written into the buffer.
    Record(usize),
    /// Nothing arrived within the wait bound.
    Idle,
}

/// Source of newline-delimited records.
pub trait RecordSource {
    /// Read the next record into `buf`.
    ///
    /// Blocks until a record is available, the source's wait bound expires
    /// (`Idle`), or the link fails. Must not allocate.
    fn read_record(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TransportError>;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TransportError> {
        (**self).read_record(buf)
    }
}
