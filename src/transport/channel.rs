//! Serial device channel: open, configure, read records, restore.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::TransportError;
use super::line_mode::LineMode;
use super::{ReadOutcome, RecordSource};

/// Open handle on the sensor's tty device.
///
/// Remembers the settings found on the device so they can be put back on
/// [`close`](Self::close), or on drop if `close` was never reached.
pub struct SerialChannel {
    file: File,
    path: PathBuf,
    /// Settings captured by `configure`, restored on close
    saved: Option<libc::termios>,
    poll_interval: Option<Duration>,
}

impl SerialChannel {
    /// Open the device read/write without making it our controlling tty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        log::debug!("Opened {}", path.display());

        Ok(Self {
            file,
            path,
            saved: None,
            poll_interval: LineMode::default().poll_interval,
        })
    }

    /// Switch the device into canonical line mode.
    ///
    /// Captures the current settings first, then discards anything queued
    /// before the switch so the first record read is post-configuration data.
    pub fn configure(&mut self, mode: &LineMode) -> Result<(), TransportError> {
        let tio = mode.termios()?;
        let fd = self.file.as_raw_fd();

        if self.saved.is_none() {
            // SAFETY: zeroed termios is valid; fd is open for our lifetime.
            let mut original: libc::termios = unsafe { std::mem::zeroed() };
            if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
                return Err(configure_error("tcgetattr"));
            }
            self.saved = Some(original);
        }

        // SAFETY: fd is open; tio outlives the call.
        if unsafe { libc::tcflush(fd, libc::TCIFLUSH) } != 0 {
            return Err(configure_error("tcflush"));
        }
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
            return Err(configure_error("tcsetattr"));
        }

        self.poll_interval = mode.poll_interval;
        log::info!(
            "Configured {} for canonical mode at {} baud",
            self.path.display(),
            mode.baud
        );
        Ok(())
    }

    /// Restore the original settings and release the device.
    ///
    /// Restoration is best-effort: a failure is logged and the descriptor is
    /// closed regardless.
    pub fn close(mut self) {
        self.restore();
        log::debug!("Closed {}", self.path.display());
    }

    fn restore(&mut self) {
        if let Some(original) = self.saved.take() {
            // SAFETY: fd is still open; original came from tcgetattr.
            let rc = unsafe { libc::tcsetattr(self.file.as_raw_fd(), libc::TCSANOW, &original) };
            if rc != 0 {
                log::warn!(
                    "Failed to restore settings on {}: {}",
                    self.path.display(),
                    io::Error::last_os_error()
                );
            }
        }
    }

    /// Wait up to the poll interval for input. `Ok(false)` on timeout.
    fn wait_readable(&self) -> Result<bool, TransportError> {
        let timeout_ms = match self.poll_interval {
            Some(interval) => interval.as_millis().min(i32::MAX as u128) as libc::c_int,
            None => -1,
        };

        loop {
            let mut pfd = libc::pollfd {
                fd: self.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };
            // SAFETY: pfd is a single valid pollfd.
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(TransportError::Read(err));
            }
            if rc == 0 {
                return Ok(false);
            }
            if pfd.revents & libc::POLLIN != 0 {
                return Ok(true);
            }
            if pfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
                return Err(TransportError::Disconnected);
            }
        }
    }
}

impl RecordSource for SerialChannel {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, TransportError> {
        if !self.wait_readable()? {
            return Ok(ReadOutcome::Idle);
        }

        loop {
            match self.file.read(buf) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => return Ok(ReadOutcome::Record(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // A pty or USB serial adapter reports hang-up as EIO
                Err(e) if e.raw_os_error() == Some(libc::EIO) => {
                    return Err(TransportError::Disconnected)
                }
                Err(e) => return Err(TransportError::Read(e)),
            }
        }
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.restore();
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .field("configured", &self.saved.is_some())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

fn configure_error(op: &'static str) -> TransportError {
    TransportError::Configure {
        op,
        source: io::Error::last_os_error(),
    }
}
