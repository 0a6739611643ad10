use camino::Utf8PathBuf;
use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building, reading or writing a playlist.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Playlist is full (limit: {limit} tracks)")]
    Capacity { limit: usize },
    #[error("Failed to allocate room for another track: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed playlist line '{line}': {reason}")]
    MalformedLine { line: String, reason: &'static str },
}

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Returns the underlying I/O error kind, e.g. to tell a missing file apart from a
    /// permission problem. `None` for non-I/O errors.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
