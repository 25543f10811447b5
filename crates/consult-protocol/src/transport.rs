//! Bytewise Transport Abstraction

use crate::error::ConsultError;

/// A blocking bytewise channel to a CONSULT device.
///
/// Implementations do not impose any framing, ordering or timeout semantics.
/// Those belong to the protocol engine layered on top.
pub trait ByteTransport {
    /// Read exactly `size` bytes, blocking until they are all available.
    ///
    /// `size == 0` is permitted and returns an empty buffer. Fails only on
    /// transport error.
    fn read(&mut self, size: usize) -> Result<Vec<u8>, ConsultError>;

    /// Write all of `bytes`, blocking until they are accepted.
    ///
    /// Zero-length writes are permitted no-ops. Fails only on transport
    /// error.
    fn write(&mut self, bytes: &[u8]) -> Result<(), ConsultError>;
}

impl<T: ByteTransport + ?Sized> ByteTransport for Box<T> {
    fn read(&mut self, size: usize) -> Result<Vec<u8>, ConsultError> {
        (**self).read(size)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ConsultError> {
        (**self).write(bytes)
    }
}
