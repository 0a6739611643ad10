use crate::error::Result;
use crate::track::Track;
use camino::Utf8Path;

/// A trait for collections of tracks that are persisted as text files, one track per line.
///
/// Reading always builds a fresh object; whatever the caller held before is replaced by
/// assignment, never merged.
pub trait TracksFile {
    /// Creates a new object from file contents.
    /// Lines that cannot be parsed are skipped with a warning.
    fn open<T: AsRef<Utf8Path>>(fpath: T) -> Result<Self> where Self: Sized;

    /// Like `open`, but yields an empty object if the file does not exist yet.
    fn open_or_new<T: AsRef<Utf8Path>>(fpath: T) -> Result<Self> where Self: Sized;

    /// Returns an iterator to all tracks in the object, in order of appearance.
    fn tracks(&self) -> impl Iterator<Item = &Track>;

    /// Overwrites the text file at `fpath` to reflect the current object state.
    fn write<T: AsRef<Utf8Path>>(&mut self, fpath: T) -> Result<()>;
}
