//! Recording Transport
//!
//! A [`ByteTransport`] shim that forwards every operation to an inner
//! transport while appending a human-readable trace to a text sink. The
//! resulting log can later drive a [`ReplayTransport`].
//!
//! [`ReplayTransport`]: crate::ReplayTransport

use std::io::Write;

use crate::error::ConsultError;
use crate::log::RecordKind;
use crate::transport::ByteTransport;

/// Transport shim that snoops all traffic into a log sink.
///
/// Consecutive operations of the same kind are merged into one log entry;
/// a change of kind finishes the entry and starts a new `R `/`W ` one. On
/// drop, an unterminated final entry gets its newline so logs can be
/// concatenated safely.
pub struct RecordingTransport<T, W: Write> {
    inner: T,
    sink: W,
    current: Option<RecordKind>,
}

impl<T: ByteTransport, W: Write> RecordingTransport<T, W> {
    pub fn new(inner: T, sink: W) -> RecordingTransport<T, W> {
        RecordingTransport {
            inner,
            sink,
            current: None,
        }
    }

    fn append(&mut self, kind: RecordKind, bytes: &[u8]) -> Result<(), ConsultError> {
        // An entry must carry at least one byte, so zero-length operations
        // are forwarded but leave no trace.
        if bytes.is_empty() {
            return Ok(());
        }
        if self.current != Some(kind) {
            if self.current.is_some() {
                self.sink.write_all(b"\n")?;
            }
            write!(self.sink, "{} ", kind.tag())?;
            self.current = Some(kind);
        }
        for byte in bytes {
            write!(self.sink, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl<T: ByteTransport, W: Write> ByteTransport for RecordingTransport<T, W> {
    fn read(&mut self, size: usize) -> Result<Vec<u8>, ConsultError> {
        let bytes = self.inner.read(size)?;
        self.append(RecordKind::Read, &bytes)?;
        Ok(bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ConsultError> {
        self.inner.write(bytes)?;
        self.append(RecordKind::Write, bytes)?;
        Ok(())
    }
}

impl<T, W: Write> Drop for RecordingTransport<T, W> {
    fn drop(&mut self) {
        if self.current.is_some() {
            let _ = self.sink.write_all(b"\n");
        }
        let _ = self.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayTransport;

    fn inner(log: &str) -> ReplayTransport {
        ReplayTransport::new(log.as_bytes(), false).unwrap()
    }

    #[test]
    fn test_no_traffic_leaves_empty_log() {
        let mut buf = Vec::new();
        {
            let _recorder = RecordingTransport::new(inner(""), &mut buf);
        }
        assert_eq!(buf, b"");
    }

    #[test]
    fn test_single_read() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("R 1a"), &mut buf);
            assert_eq!(recorder.read(1).unwrap(), vec![0x1a]);
        }
        assert_eq!(buf, b"R 1a\n");
    }

    #[test]
    fn test_single_write() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("W 1a"), &mut buf);
            recorder.write(&[0x1a]).unwrap();
        }
        assert_eq!(buf, b"W 1a\n");
    }

    #[test]
    fn test_consecutive_reads_merge() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("R 1011"), &mut buf);
            recorder.read(1).unwrap();
            recorder.read(1).unwrap();
        }
        assert_eq!(buf, b"R 1011\n");
    }

    #[test]
    fn test_consecutive_writes_merge() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("W 2021"), &mut buf);
            recorder.write(&[0x20]).unwrap();
            recorder.write(&[0x21]).unwrap();
        }
        assert_eq!(buf, b"W 2021\n");
    }

    #[test]
    fn test_kind_change_starts_new_entry() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("R 01\nW 01"), &mut buf);
            assert_eq!(recorder.read(1).unwrap(), vec![0x01]);
            recorder.write(&[0x01]).unwrap();
        }
        assert_eq!(buf, b"R 01\nW 01\n");
    }

    #[test]
    fn test_reads_writes_reads_compaction() {
        let mut buf = Vec::new();
        {
            let log = "R 01020102\nW 01020102\nR 01020102";
            let mut recorder = RecordingTransport::new(inner(log), &mut buf);
            recorder.read(2).unwrap();
            recorder.read(2).unwrap();
            recorder.write(&[0x01, 0x02]).unwrap();
            recorder.write(&[0x01, 0x02]).unwrap();
            recorder.read(2).unwrap();
            recorder.read(2).unwrap();
        }
        assert_eq!(buf, b"R 01020102\nW 01020102\nR 01020102\n");
    }

    #[test]
    fn test_zero_length_operations_leave_no_trace() {
        let mut buf = Vec::new();
        {
            let mut recorder = RecordingTransport::new(inner("R 01"), &mut buf);
            recorder.write(&[]).unwrap();
            assert_eq!(recorder.read(0).unwrap(), Vec::<u8>::new());
            recorder.read(1).unwrap();
        }
        assert_eq!(buf, b"R 01\n");
    }

    #[test]
    fn test_log_round_trips_through_parser() {
        use crate::log::{parse_log, LogRecord, RecordKind};

        let mut buf = Vec::new();
        {
            let log = "W ffffef\nR 1011\nW 30";
            let mut recorder = RecordingTransport::new(inner(log), &mut buf);
            recorder.write(&[0xff, 0xff, 0xef]).unwrap();
            recorder.read(1).unwrap();
            recorder.read(1).unwrap();
            recorder.write(&[0x30]).unwrap();
        }
        let records = parse_log(buf.as_slice()).unwrap();
        assert_eq!(
            records,
            vec![
                LogRecord {
                    kind: RecordKind::Write,
                    bytes: vec![0xff, 0xff, 0xef],
                },
                LogRecord {
                    kind: RecordKind::Read,
                    bytes: vec![0x10, 0x11],
                },
                LogRecord {
                    kind: RecordKind::Write,
                    bytes: vec![0x30],
                },
            ]
        );
    }
}
