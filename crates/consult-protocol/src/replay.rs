//! Replay Transport
//!
//! A [`ByteTransport`] that replays a previously captured transaction log,
//! letting the protocol engine run without any hardware attached.
//!
//! Reads walk the Read records of the log; writes are located by substring
//! search over the Write records. The two cursors stay synchronised: a
//! successful write repositions the read cursor to the first Read byte
//! strictly after the matched Write record, which is what keeps the
//! replayed request/response ordering faithful.

use std::io::BufRead;

use tracing::debug;

use crate::error::ConsultError;
use crate::log::{parse_log, LogRecord, RecordKind};
use crate::transport::ByteTransport;

/// A cursor into the byte stream formed by the records of one kind.
///
/// Either addresses a byte (`record` in bounds, `offset` inside it) or sits
/// at end-of-corpus (`record` == record count). Never between records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    record: usize,
    offset: usize,
}

/// Byte transport replaying a parsed transaction log.
pub struct ReplayTransport {
    records: Vec<LogRecord>,
    wrap: bool,
    /// Total bytes across Write records; bounds the write search.
    write_total: usize,
    read_pos: Position,
    write_pos: Position,
}

impl ReplayTransport {
    /// Parse a log and build a transport over it.
    ///
    /// With `wrap` enabled both cursors cycle back to the start of the log
    /// when they run out of data, so a short capture can drive an
    /// arbitrarily long session.
    pub fn new<R: BufRead>(reader: R, wrap: bool) -> Result<ReplayTransport, ConsultError> {
        let records = parse_log(reader)?;
        debug!("parsed {} replay record(s)", records.len());
        let write_total = records
            .iter()
            .filter(|record| record.kind == RecordKind::Write)
            .map(|record| record.bytes.len())
            .sum();
        let mut transport = ReplayTransport {
            records,
            wrap,
            write_total,
            read_pos: Position {
                record: 0,
                offset: 0,
            },
            write_pos: Position {
                record: 0,
                offset: 0,
            },
        };
        transport.read_pos = transport.seek(0, RecordKind::Read, false);
        transport.write_pos = transport.seek(0, RecordKind::Write, false);
        Ok(transport)
    }

    fn end(&self) -> Position {
        Position {
            record: self.records.len(),
            offset: 0,
        }
    }

    /// First byte of the first `kind` record at index `from` or later.
    /// Wraps around at most once when `wrap` is set; end-of-corpus if no
    /// such record exists.
    fn seek(&self, from: usize, kind: RecordKind, wrap: bool) -> Position {
        for record in from..self.records.len() {
            if self.records[record].kind == kind {
                return Position { record, offset: 0 };
            }
        }
        if wrap {
            return self.seek(0, kind, false);
        }
        self.end()
    }

    /// The byte a position addresses, or `None` at end-of-corpus.
    fn byte_at(&self, pos: Position) -> Option<u8> {
        self.records.get(pos.record).map(|record| record.bytes[pos.offset])
    }

    /// The next position of the same kind after `pos`, crossing record
    /// boundaries and wrapping per the transport's setting.
    fn advance(&self, pos: Position, kind: RecordKind) -> Position {
        if pos.offset + 1 < self.records[pos.record].bytes.len() {
            return Position {
                record: pos.record,
                offset: pos.offset + 1,
            };
        }
        self.seek(pos.record + 1, kind, self.wrap)
    }

    /// Try to match `bytes` starting exactly at `start`, returning the
    /// position of the final matched byte. The match may span records and,
    /// when wrapping is enabled, the end of the corpus.
    fn match_at(&self, start: Position, bytes: &[u8]) -> Option<Position> {
        let mut pos = start;
        let mut last = start;
        for &expected in bytes {
            if self.byte_at(pos)? != expected {
                return None;
            }
            last = pos;
            pos = self.advance(pos, RecordKind::Write);
        }
        Some(last)
    }
}

impl ByteTransport for ReplayTransport {
    fn read(&mut self, size: usize) -> Result<Vec<u8>, ConsultError> {
        let mut bytes = Vec::with_capacity(size);
        for _ in 0..size {
            let byte = self
                .byte_at(self.read_pos)
                .ok_or(ConsultError::LogExhausted)?;
            bytes.push(byte);
            self.read_pos = self.advance(self.read_pos, RecordKind::Read);
        }
        Ok(bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ConsultError> {
        if bytes.is_empty() {
            return Ok(());
        }

        // Find the first occurrence of `bytes` in the Write byte stream at
        // or after the cursor. Each candidate start position is visited at
        // most once, so with wrapping the search gives up after one full
        // cycle instead of spinning.
        let mut start = self.write_pos;
        let mut attempts = 0usize;
        let last = loop {
            if self.byte_at(start).is_none() {
                return Err(ConsultError::LogExhausted);
            }
            if self.wrap && attempts >= self.write_total {
                return Err(ConsultError::LogExhausted);
            }
            if let Some(last) = self.match_at(start, bytes) {
                break last;
            }
            start = self.advance(start, RecordKind::Write);
            attempts += 1;
        };

        self.write_pos = self.advance(last, RecordKind::Write);
        // The final byte of the match fixes where subsequent reads resume:
        // the first Read record after the matched Write record.
        self.read_pos = self.seek(last.record, RecordKind::Read, self.wrap);
        Ok(())
    }
}
