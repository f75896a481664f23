//! Canonical line-mode settings for the sensor's serial link.

use std::time::Duration;

use super::error::TransportError;

/// End-of-transmission (Ctrl-D), the only control character left enabled
/// besides the newline terminator.
const EOT: libc::cc_t = 4;

/// Serial line settings applied by [`SerialChannel::configure`].
///
/// [`SerialChannel::configure`]: super::SerialChannel::configure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMode {
    /// Line speed in bits per second
    pub baud: u32,
    /// RTS/CTS hardware flow control
    pub hardware_flow_control: bool,
    /// Upper bound on a single wait for a record. `None` blocks until a
    /// record arrives, which leaves shutdown waiting on the device.
    pub poll_interval: Option<Duration>,
}

impl LineMode {
    pub const DEFAULT_BAUD: u32 = 38_400;
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Supported line speeds.
    pub const SUPPORTED_BAUD: &'static [u32] =
        &[9_600, 19_200, 38_400, 57_600, 115_200, 230_400];

    /// Build the termios block for these settings.
    ///
    /// Canonical input, 8 data bits, no parity, receiver on, modem lines
    /// ignored. Every special character is cleared except end-of-file, so
    /// payload bytes are never taken as signals; `VMIN = 1` and `VTIME = 0`
    /// make a read wait for a full line with no inter-character timer.
    pub fn termios(&self) -> Result<libc::termios, TransportError> {
        let speed = baud_constant(self.baud)?;

        // SAFETY: termios is a plain C struct; all-zero is a valid value.
        let mut tio: libc::termios = unsafe { std::mem::zeroed() };

        tio.c_cflag = libc::CS8 | libc::CLOCAL | libc::CREAD;
        if self.hardware_flow_control {
            tio.c_cflag |= libc::CRTSCTS;
        }
        tio.c_iflag = libc::IGNPAR | libc::ICRNL;
        tio.c_oflag = 0;
        tio.c_lflag = libc::ICANON;

        tio.c_cc[libc::VEOF] = EOT;
        tio.c_cc[libc::VMIN] = 1;
        tio.c_cc[libc::VTIME] = 0;

        // SAFETY: tio is a valid, exclusively borrowed termios.
        let ok = unsafe {
            libc::cfsetispeed(&mut tio, speed) == 0 && libc::cfsetospeed(&mut tio, speed) == 0
        };
        if !ok {
            return Err(TransportError::Configure {
                op: "cfsetspeed",
                source: std::io::Error::last_os_error(),
            });
        }

        Ok(tio)
    }
}

impl Default for LineMode {
    fn default() -> Self {
        Self {
            baud: Self::DEFAULT_BAUD,
            hardware_flow_control: true,
            poll_interval: Some(Self::DEFAULT_POLL_INTERVAL),
        }
    }
}

fn baud_constant(baud: u32) -> Result<libc::speed_t, TransportError> {
    Ok(match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => return Err(TransportError::UnsupportedBaud(other)),
    })
}
