//! The recorded-event file: a lazy, one-shot, non-restartable sequence of
//! MBO events read from disk.
//!
//! The on-disk format itself is named an external collaborator — an opaque
//! record source exposing only "yield next event or end-of-stream". This
//! crate's concrete choice reuses the same fixed-width wire encoding defined
//! for the TCP link (`crate::wire`), so a single `encode`/`decode` pair and a
//! single notion of record width serve both the file and the socket.

use crate::mbo::MboEvent;
use crate::wire;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A recorded event file opened for sequential, forward-only reading.
pub struct EventSource {
    reader: BufReader<File>,
}

impl EventSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(EventSource {
            reader: BufReader::new(File::open(path)?),
        })
    }

    /// Yield the next event, or `Ok(None)` at a clean end-of-file boundary.
    /// A short read in the middle of a record is reported as
    /// [`io::ErrorKind::UnexpectedEof`].
    pub fn next_event(&mut self) -> io::Result<Option<MboEvent>> {
        let mut buf = [0u8; wire::W];
        let mut filled = 0;
        while filled < wire::W {
            let n = self.reader.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "recorded event file truncated mid-record",
                ));
            }
            filled += n;
        }
        wire::decode(&buf)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Iterator for EventSource {
    type Item = io::Result<MboEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Writes a recorded event file in the same wire format `EventSource` reads —
/// used to build deterministic fixtures for tests.
pub struct EventFileWriter {
    writer: BufWriter<File>,
}

impl EventFileWriter {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(EventFileWriter {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn write_event(&mut self, event: &MboEvent) -> io::Result<()> {
        self.writer.write_all(&wire::encode(event))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
