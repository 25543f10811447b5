//! CONSULT Error Types

use thiserror::Error;

/// Errors that can occur while talking to (or replaying) a CONSULT device.
#[derive(Debug, Error)]
pub enum ConsultError {
    /// OS-level transport failure. Passed through unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Serial port failure (open, configuration, unsupported baud rate).
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A replay log line did not match the `R`/`W` hex grammar.
    #[error("malformed log line: {0:?}")]
    MalformedLog(String),

    /// The replay log has no more data able to satisfy the request.
    #[error("replay log exhausted")]
    LogExhausted,

    /// The ECM sent something the protocol state machine does not allow.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A response frame's length does not match what the operation requires.
    #[error("unexpected response frame: {0}")]
    ShortFrame(String),

    /// The ECM reported a fault code id outside the known set.
    #[error("unknown fault code id {0}")]
    UnknownFaultCode(u8),

    /// An engine parameter identifier outside the known set.
    #[error("unknown engine parameter {0:?}")]
    UnknownParameter(String),
}
