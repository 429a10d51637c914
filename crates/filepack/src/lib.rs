//! Compiled static file registry
//!
//! This crate lets a program ship static assets (templates, stylesheets,
//! fixtures) inside its own binary and read them back through a uniform
//! file interface. The companion `filepack-compile` tool turns real files
//! into generated Rust source; executing that source registers each file's
//! zlib-compressed contents with a process-wide [`Registry`]. Payloads are
//! decompressed lazily, the first time a path is opened, and the raw bytes
//! are cached for every later open.
//!
//! The crate-level [`open`] and [`read_file`] functions fall back to the
//! host filesystem when a path is not registered, so application code can
//! read compiled and real files through one call site:
//!
//! ```
//! use std::io::Read;
//!
//! let packed = filepack::codec::encode(b"body { margin: 0 }").unwrap();
//! filepack::register("static/site.css", packed);
//!
//! let mut file = filepack::open("static/site.css").unwrap();
//! let mut css = String::new();
//! file.read_to_string(&mut css).unwrap();
//! assert_eq!(css, "body { margin: 0 }");
//! ```
//!
//! This is not a general virtual filesystem: there are no directories, no
//! listing, no writes, and no metadata beyond size.

pub mod codec;
mod registry;
mod view;

pub use registry::{Registry, RegistryError};
pub use view::FileView;

use std::fs;
use std::io::{self, Read, Seek, SeekFrom};

/// Register the contents of a compiled file with the global registry.
///
/// Meant to be called from generated registration code during program
/// startup; `data` is assumed to be zlib-compressed. Panics on an empty or
/// duplicate path, since either is a build-time bug. Use [`try_register`]
/// for a recoverable result.
pub fn register(path: &str, data: impl Into<Vec<u8>>) {
    Registry::global().register(path, data);
}

/// Fallible form of [`register`].
pub fn try_register(path: &str, data: impl Into<Vec<u8>>) -> Result<(), RegistryError> {
    Registry::global().try_register(path, data)
}

/// A file opened by [`open`]: either a compiled static file or a real file
/// from the host filesystem.
#[derive(Debug)]
pub enum File {
    /// A view over a registered static file.
    Static(FileView),
    /// A real file, opened because the path was not registered.
    Host(fs::File),
}

impl Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            File::Static(view) => view.read(buf),
            File::Host(file) => file.read(buf),
        }
    }
}

impl Seek for File {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            File::Static(view) => view.seek(pos),
            File::Host(file) => file.seek(pos),
        }
    }
}

/// Open `path` for reading.
///
/// A path registered with the global registry is served from the compiled
/// bytes; an unregistered path falls through to [`fs::File::open`]. Decode
/// failures surface as [`io::ErrorKind::InvalidData`] and never trigger the
/// fallback.
pub fn open(path: &str) -> io::Result<File> {
    match Registry::global().open(path) {
        Ok(view) => Ok(File::Static(view)),
        Err(RegistryError::NotFound(_)) => Ok(File::Host(fs::File::open(path)?)),
        Err(err) => Err(err.into()),
    }
}

/// Read the complete contents of `path`, delegating to [`fs::read`] when
/// the path is not registered.
pub fn read_file(path: &str) -> io::Result<Vec<u8>> {
    match Registry::global().read(path) {
        Ok(data) => Ok(data),
        Err(RegistryError::NotFound(_)) => fs::read(path),
        Err(err) => Err(err.into()),
    }
}

/// Read the full contents of a registered static file or panic.
///
/// Intended for initialization-time reads that are expected always to
/// succeed. Unlike [`read_file`], this does not delegate to the host
/// filesystem.
///
/// # Panics
///
/// Panics if `path` is not registered or its payload fails to decode.
pub fn must_read(path: &str) -> Vec<u8> {
    match Registry::global().read(path) {
        Ok(data) => data,
        Err(err) => panic!("filepack: reading {path:?}: {err}"),
    }
}
