//! Process-wide registry of compiled file payloads
//!
//! Generated code registers path/payload pairs at startup; opens decode the
//! stored payload on first access and hand out shared views of the raw
//! bytes.

use crate::codec;
use crate::view::FileView;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registration was attempted with an empty path.
    #[error("registered empty path")]
    InvalidPath,

    /// A second registration reused an already-registered cleaned path.
    #[error("duplicate path registered: {0:?}")]
    DuplicatePath(String),

    /// No compiled file is registered under the requested path.
    #[error("no compiled file registered at {0:?}")]
    NotFound(String),

    /// The stored payload could not be decompressed.
    #[error("decoding {path:?}: {source}")]
    Decode {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl From<RegistryError> for io::Error {
    fn from(err: RegistryError) -> io::Error {
        let kind = match &err {
            RegistryError::NotFound(_) => io::ErrorKind::NotFound,
            RegistryError::Decode { .. } => io::ErrorKind::InvalidData,
            RegistryError::InvalidPath | RegistryError::DuplicatePath(_) => {
                io::ErrorKind::InvalidInput
            }
        };
        io::Error::new(kind, err)
    }
}

/// Storage state of one registered file.
///
/// The only allowed transition is `Encoded` to `Decoded`, made under the
/// registry lock the first time the entry is opened. A failed decode leaves
/// the entry in `Encoded`.
enum Payload {
    /// The zlib-compressed bytes stored at registration time.
    Encoded(Vec<u8>),
    /// The raw bytes, shared with every view opened over this entry.
    Decoded(Arc<[u8]>),
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The table mapping cleaned logical paths to compiled file payloads.
///
/// One process-wide instance lives behind [`Registry::global`]; independent
/// instances exist mainly for tests. A single lock covers the whole
/// check-then-insert and lookup-then-maybe-decode sequences, which is what
/// keeps registration unique and the decode transition at-most-once under
/// concurrent callers.
pub struct Registry {
    entries: Mutex<HashMap<String, Payload>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry used by generated registration code and by
    /// the crate-level functions.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Register the contents of a compiled file under `path`.
    ///
    /// The path is cleaned lexically and any leading separators are
    /// discarded, so the stored key is always relative. The payload is
    /// stored verbatim and is assumed to be zlib-compressed. Fails with
    /// [`RegistryError::InvalidPath`] if `path` is empty and with
    /// [`RegistryError::DuplicatePath`] if the cleaned path has already
    /// been registered.
    pub fn try_register(
        &self,
        path: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), RegistryError> {
        if path.is_empty() {
            return Err(RegistryError::InvalidPath);
        }
        let clean = clean_path(path);

        let mut entries = self.entries.lock();
        if entries.contains_key(&clean) {
            return Err(RegistryError::DuplicatePath(clean));
        }
        entries.insert(clean, Payload::Encoded(data.into()));
        Ok(())
    }

    /// Panicking form of [`Registry::try_register`], meant to be called
    /// from generated registration code where any failure is a build-time
    /// bug rather than a runtime condition.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or already registered.
    pub fn register(&self, path: &str, data: impl Into<Vec<u8>>) {
        if let Err(err) = self.try_register(path, data) {
            panic!("filepack: {err}");
        }
    }

    /// Open the compiled file registered under `path`.
    ///
    /// The key must match the cleaned registered path exactly; lookups do
    /// not re-clean their argument. The payload is decoded on first open
    /// and the raw bytes are cached for every later open.
    pub fn open(&self, path: &str) -> Result<FileView, RegistryError> {
        Ok(FileView::new(self.open_data(path)?))
    }

    /// Read the full raw contents of the compiled file registered under
    /// `path`, with the same decode-on-first-open behavior as
    /// [`Registry::open`].
    pub fn read(&self, path: &str) -> Result<Vec<u8>, RegistryError> {
        Ok(self.open_data(path)?.to_vec())
    }

    fn open_data(&self, path: &str) -> Result<Arc<[u8]>, RegistryError> {
        let mut entries = self.entries.lock();
        let payload = entries
            .get_mut(path)
            .ok_or_else(|| RegistryError::NotFound(path.to_string()))?;

        match payload {
            Payload::Decoded(data) => Ok(Arc::clone(data)),
            // The first time a file is opened, decode the payload in place.
            Payload::Encoded(data) => {
                let raw: Arc<[u8]> = codec::decode(data)
                    .map_err(|source| RegistryError::Decode {
                        path: path.to_string(),
                        source,
                    })?
                    .into();
                *payload = Payload::Decoded(Arc::clone(&raw));
                Ok(raw)
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// Lexically clean `path` into the canonical registry key.
///
/// `.` segments and redundant separators are dropped, `..` pops a preceding
/// normal segment and is otherwise kept, and leading separators are
/// discarded so the key is always relative. No filesystem access is
/// involved. A path that cleans away entirely becomes `"."`.
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            part => parts.push(part),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
