//! Serial Port Transport
//!
//! [`ByteTransport`] implementation over a system serial port, configured
//! the way a CONSULT ECM expects: 8 data bits, no parity, one stop bit, no
//! flow control. The CONSULT protocol has no timeout semantics, so reads
//! keep waiting until the requested bytes arrive.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use crate::error::ConsultError;
use crate::transport::ByteTransport;

/// Interval at which a blocked read re-polls the port. Purely internal;
/// callers observe an indefinitely blocking read.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A CONSULT-configured serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open and configure `device` at `baud_rate`.
    ///
    /// Stale bytes in the OS buffers are cleared so a previous session
    /// cannot leak into the handshake. On Windows, DTR is asserted; some
    /// CONSULT cables are powered through it.
    pub fn open(device: &str, baud_rate: u32) -> Result<SerialTransport, ConsultError> {
        #[cfg_attr(not(windows), allow(unused_mut))]
        let mut port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open()?;

        #[cfg(windows)]
        port.write_data_terminal_ready(true)?;

        port.clear(ClearBuffer::All)?;
        info!("opened {} at {} baud", device, baud_rate);
        Ok(SerialTransport { port })
    }
}

impl ByteTransport for SerialTransport {
    fn read(&mut self, size: usize) -> Result<Vec<u8>, ConsultError> {
        let mut buf = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            match self.port.read(&mut buf[filled..]) {
                Ok(count) => filled += count,
                Err(error)
                    if matches!(
                        error.kind(),
                        std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ConsultError> {
        self.port.write_all(bytes)?;
        Ok(())
    }
}
