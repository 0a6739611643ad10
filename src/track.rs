use crate::error::Error;
use log::warn;
use std::fmt;

/// Maximum number of characters kept in a title or an artist name.
pub const MAX_FIELD_LEN: usize = 99;

/// Separator between the artist and the title in a playlist file line.
pub const FIELD_SEPARATOR: char = ',';

/// A track in a playlist.
///
/// Tracks are plain values compared field by field; two tracks with the same title and artist
/// are the same track. Fields are bounded to `MAX_FIELD_LEN` characters, longer input is cut
/// short when the track is created.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Track {
    title: String,
    artist: String,
}

impl Track {
    pub fn new<T: Into<String>, A: Into<String>>(title: T, artist: A) -> Self {
        Track {
            title: bounded(title.into(), "title"),
            artist: bounded(artist.into(), "artist"),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Returns whether the track matches the given title and artist exactly, after cutting
    /// them down the same way `new` does.
    pub fn matches(&self, title: &str, artist: &str) -> bool {
        self.title == prefix(title) && self.artist == prefix(artist)
    }

    /// Returns whether the track survives a write/read cycle through a playlist file.
    /// The file format has no escaping, so neither field may hold a separator or a line break.
    pub fn is_persistable(&self) -> bool {
        [&self.title, &self.artist].iter().all(|field| !field.contains([FIELD_SEPARATOR, '\n', '\r']))
    }

    pub fn as_file_line(&self) -> String {
        format!("{}{}{}", self.artist, FIELD_SEPARATOR, self.title)
    }
}

/// Returns the first `MAX_FIELD_LEN` characters of `field`.
fn prefix(field: &str) -> &str {
    match field.char_indices().nth(MAX_FIELD_LEN) {
        Some((end, _)) => &field[..end],
        None => field,
    }
}

/// Cuts `field` down to `MAX_FIELD_LEN` characters, on a character boundary.
fn bounded(mut field: String, what: &str) -> String {
    let end = prefix(&field).len();
    if end < field.len() {
        warn!("Track {} '{}...' exceeds {} characters, truncating", what, &field[..end], MAX_FIELD_LEN);
        field.truncate(end);
    }
    field
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by {}", self.title, self.artist)
    }
}

impl std::str::FromStr for Track {
    type Err = Error;

    /// Parses a playlist file line of the form `artist,title`. Either field may be empty.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| Error::MalformedLine { line: line.to_string(), reason };

        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut it = line.split(FIELD_SEPARATOR);
        let artist = it.next().unwrap_or_default();
        let title = match it.next() {
            Some(split) => split,
            None => return Err(malformed("missing separator")),
        };
        if it.next().is_some() {
            return Err(malformed("more than two fields"));
        }
        Ok(Track::new(title, artist))
    }
}
