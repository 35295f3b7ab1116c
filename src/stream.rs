//! Byte-stream I/O abstraction (external interface, consumed rather than
//! owned by this codec). A blanket trait over `Read + Write + Seek` rather
//! than a bespoke newtype: `std::io::Cursor<Vec<u8>>`, `std::fs::File`, and
//! any other standard stream already satisfy it.

use std::io::{Read, Seek, SeekFrom, Write};

pub trait Stream: Read + Write + Seek {
    /// Current byte offset, used by the skip path (C6).
    fn tell(&mut self) -> std::io::Result<u64> {
        self.stream_position()
    }

    /// Advance (or rewind) the stream by `delta` bytes relative to the
    /// current position.
    fn seek_relative(&mut self, delta: i64) -> std::io::Result<u64> {
        self.seek(SeekFrom::Current(delta))
    }
}

impl<T: Read + Write + Seek> Stream for T {}
