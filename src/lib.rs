pub mod error;
pub mod track;
pub mod playlist;

mod tracksfile;

pub use error::{Error, Result};

use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;
use std::sync::OnceLock;

/// Returns the path to the music directory, or `None` if the home directory is unknown.
pub fn music_dir() -> Option<&'static Utf8Path> {
    static MUSIC_DIR: OnceLock<Option<Utf8PathBuf>> = OnceLock::new();
    MUSIC_DIR.get_or_init(|| path_from(dirs::home_dir, "Music")).as_deref()
}

/// Returns the path of the playlist file used when none is given on the command line.
pub fn default_playlist_file() -> Option<&'static Utf8Path> {
    static PLAYLIST_FILE: OnceLock<Option<Utf8PathBuf>> = OnceLock::new();
    PLAYLIST_FILE
        .get_or_init(|| music_dir().map(|dir| dir.join("Playlists").join("playlist.csv")))
        .as_deref()
}

/// Joins the output of a `dirs::*` function with a relative path.
///
/// Returns `None` if the base directory is unknown, not absolute, or not valid UTF-8, or if
/// `rel_path` is not relative.
///
/// # Examples
/// ```
/// let path = music_ring::path_from(|| Some("/home/user"), "my_file.txt");
/// assert_eq!(path.unwrap().as_str(), "/home/user/my_file.txt");
/// ```
pub fn path_from<A: AsRef<Path>, B: AsRef<Path>>(base_dir: impl FnOnce() -> Option<A>, rel_path: B) -> Option<Utf8PathBuf> {
    let rel_path = Utf8Path::from_path(rel_path.as_ref()).filter(|x| x.is_relative())?;
    let base = base_dir()?;
    let mut path = Utf8Path::from_path(base.as_ref()).filter(|x| x.is_absolute())?.to_owned();
    path.push(rel_path);
    Some(path)
}
