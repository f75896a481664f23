//! Transport error types

use std::io;
use std::path::PathBuf;

/// Errors raised while opening, configuring or reading the sensor link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to open modem device: {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to configure serial port ({op}): {source}")]
    Configure {
        /// The termios call that failed
        op: &'static str,
        source: io::Error,
    },

    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaud(u32),

    #[error("Serial read failed: {0}")]
    Read(#[source] io::Error),

    /// Zero-length read or hang-up: the device went away.
    #[error("Serial link disconnected")]
    Disconnected,

    /// The owning side closed the transport under a pending read.
    #[error("Transport closed")]
    Closed,

    #[error("Serial devices are not supported on this platform")]
    Unsupported,
}

impl TransportError {
    /// Whether the error means the link itself is gone rather than a
    /// single failed operation.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TransportError::Disconnected | TransportError::Closed)
    }
}
