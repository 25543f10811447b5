//! Nissan CONSULT Diagnostic Protocol
//!
//! Client-side driver for the CONSULT (generation I) serial protocol:
//! handshake, command echo verification, framed streaming and halt, plus
//! the parameter and fault code tables and a record/replay transport layer
//! that can drive the engine from a captured log instead of a live port.

mod engine;
mod error;
mod faults;
mod log;
mod params;
mod recorder;
mod replay;
mod response;
mod serial;
mod transport;

pub use engine::{ConsultEngine, ParameterStream};
pub use error::ConsultError;
pub use faults::FaultCode;
pub use log::{LogRecord, RecordKind};
pub use params::EngineParameter;
pub use recorder::RecordingTransport;
pub use replay::ReplayTransport;
pub use response::{EcuMetadata, EngineParameters, FaultCodeData, FaultCodes};
pub use serial::SerialTransport;
pub use transport::ByteTransport;

/// CONSULT wire protocol constants.
pub mod command {
    /// Bus initialisation sequence sent by the host.
    pub const INIT: [u8; 3] = [0xFF, 0xFF, 0xEF];
    /// Acknowledgement byte ending the initialisation handshake.
    pub const INIT_ACK: u8 = 0x10;
    /// Read one ECM register.
    pub const READ_REGISTER: u8 = 0x5A;
    /// Request ECU part number metadata.
    pub const ECU_INFO: u8 = 0xD0;
    /// Request stored fault codes.
    pub const FAULT_CODES: u8 = 0xD1;
    /// Authorise the ECM to start emitting frames.
    pub const GO_AHEAD: u8 = 0xF0;
    /// First byte of every ECM frame.
    pub const FRAME_START: u8 = 0xFF;
    /// Terminate streaming.
    pub const HALT: u8 = 0x30;
    /// ECM acknowledgement of a halt request.
    pub const HALT_ACK: u8 = 0xCF;
}
