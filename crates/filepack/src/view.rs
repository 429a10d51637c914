//! Read-only view over a compiled file's decoded bytes

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// A read-only view of the contents of a compiled static file.
///
/// Views are cheap snapshots: each holds a shared handle to the decoded
/// bytes plus its own cursor, so no locking is involved once a view has
/// been opened. A view keeps the bytes alive but can never mutate them.
#[derive(Debug, Clone)]
pub struct FileView {
    inner: Cursor<Arc<[u8]>>,
}

impl FileView {
    pub(crate) fn new(data: Arc<[u8]>) -> Self {
        FileView {
            inner: Cursor::new(data),
        }
    }

    /// Total decoded size of the file contents, in bytes.
    pub fn size(&self) -> u64 {
        self.inner.get_ref().len() as u64
    }

    /// Read up to `buf.len()` bytes starting at the absolute `offset`,
    /// without moving the cursor. Reads at or past the end return `Ok(0)`.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.inner.get_ref();
        let start = offset.min(data.len() as u64) as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    /// Write the remaining contents to `sink` in one pass, advancing the
    /// cursor to the end. Returns the number of bytes written.
    pub fn write_to<W: Write>(&mut self, sink: &mut W) -> io::Result<u64> {
        let data = Arc::clone(self.inner.get_ref());
        let start = self.inner.position().min(data.len() as u64) as usize;
        sink.write_all(&data[start..])?;
        self.inner.set_position(data.len() as u64);
        Ok((data.len() - start) as u64)
    }

    /// Close the view. This never fails: a view holds no resource beyond
    /// the shared bytes, so dropping one unclosed leaks nothing.
    pub fn close(self) {}
}

impl Read for FileView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for FileView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
