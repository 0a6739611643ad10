pub use crate::tracksfile::TracksFile;

use crate::error::{Error, Result};
use crate::track::Track;
use camino::Utf8Path;
use log::{debug, info, warn};
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::iter::FusedIterator;
use std::mem;

/// Number of tracks a playlist accepts unless told otherwise.
pub const DEFAULT_MAX_TRACKS: usize = 10_000;

#[derive(Debug, Clone)]
struct Node {
    track: Track,
    /// Slot index of the following node. The last node links back to the first.
    next: usize,
}

/// An ordered collection of tracks, stored as a circular singly-linked list.
///
/// The ring is referenced through its tail, the most recently added node, and the head is
/// always `tail.next`. Nodes live in an arena of slots; a removed node leaves its slot vacant
/// and the slot is handed out again by a later `add`. Slot indices never leave this struct, so
/// nothing can observe a node after it was removed.
#[derive(Debug, Clone)]
pub struct Playlist {
    slots: Vec<Option<Node>>,

    /// Vacant slots, reused before the arena grows.
    free: Vec<usize>,

    tail: Option<usize>,
    len: usize,
    max_tracks: usize,

    /// Whether the playlist was modified since the last `write`.
    is_modified: bool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::with_max_tracks(DEFAULT_MAX_TRACKS)
    }

    /// Creates an empty playlist that refuses to grow beyond `max_tracks` tracks.
    pub fn with_max_tracks(max_tracks: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            tail: None,
            len: 0,
            max_tracks,
            is_modified: false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_tracks(&self) -> usize {
        self.max_tracks
    }

    /// Returns whether the playlist was modified since it was created, read or written.
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Returns the first track, i.e. the successor of the tail.
    pub fn first(&self) -> Option<&Track> {
        self.tail.map(|tail| &self.node(self.node(tail).next).track)
    }

    /// Returns the most recently added track that is still present.
    pub fn last(&self) -> Option<&Track> {
        self.tail.map(|tail| &self.node(tail).track)
    }

    pub fn contains(&self, title: &str, artist: &str) -> bool {
        self.iter().any(|track| track.matches(title, artist))
    }

    /// Appends a new track built from `title` and `artist` to the end of the playlist.
    pub fn add<T: Into<String>, A: Into<String>>(&mut self, title: T, artist: A) -> Result<()> {
        self.push(Track::new(title, artist))
    }

    /// Pushes a track to the end of the playlist, making it the new tail.
    ///
    /// Fails without touching the playlist if it is full or if the arena cannot grow.
    pub fn push(&mut self, track: Track) -> Result<()> {
        if self.len >= self.max_tracks {
            return Err(Error::Capacity { limit: self.max_tracks });
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.try_reserve(1)?;
                // Room for every slot on the free list, so `remove` never allocates
                self.free.try_reserve(self.slots.len() + 1)?;
                self.slots.push(None);
                self.slots.len() - 1
            },
        };

        let next = match self.tail {
            Some(tail) => {
                let node = self.node_mut(tail);
                mem::replace(&mut node.next, index)
            },
            // A lone node is its own successor
            None => index,
        };
        debug!("Adding {} at slot {}", track, index);
        self.slots[index] = Some(Node { track, next });
        self.tail = Some(index);
        self.len += 1;
        self.is_modified = true;
        debug_assert!(self.verify_integrity());
        Ok(())
    }

    /// Removes the first track (from the head) matching both `title` and `artist`.
    /// Returns the removed track, or `None` if no track matched.
    pub fn remove(&mut self, title: &str, artist: &str) -> Option<Track> {
        let tail = match self.tail {
            Some(tail) => tail,
            None => {
                debug!("Nothing to remove, the playlist is empty");
                return None;
            },
        };

        let mut prev = tail;
        let mut current = self.node(tail).next;
        for _ in 0..self.len {
            if self.node(current).track.matches(title, artist) {
                return Some(self.unlink(prev, current));
            }
            prev = current;
            current = self.node(current).next;
        }
        debug!("'{}' by {} not found in the playlist", title, artist);
        None
    }

    /// Unlinks `current`, whose predecessor is `prev`, and releases its slot.
    fn unlink(&mut self, prev: usize, current: usize) -> Track {
        let node = match self.slots[current].take() {
            Some(node) => node,
            None => unreachable!("ring link points at vacant slot {current}"),
        };
        self.len -= 1;
        self.is_modified = true;

        if self.len == 0 {
            self.tail = None;
            self.slots.clear();
            self.free.clear();
        } else {
            self.node_mut(prev).next = node.next;
            if Some(current) == self.tail {
                self.tail = Some(prev);
            }
            self.free.push(current);
        }
        debug!("Removed {} from slot {}", node.track, current);
        debug_assert!(self.verify_integrity());
        node.track
    }

    /// Shuffles the playlist using the thread-local random number generator.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffles the playlist by swapping the tracks of `2 * len` randomly chosen pairs of
    /// positions. Positions are drawn with replacement, so a pair may be a single position.
    ///
    /// Only the tracks move; the ring itself is left alone. The resulting permutations are not
    /// uniformly distributed, which is fine for a playlist.
    pub fn shuffle_with<R: Rng>(&mut self, rng: &mut R) {
        if self.is_empty() {
            info!("The playlist is empty, nothing to shuffle");
            return;
        }
        let count = self.len;
        if count == 1 {
            return;
        }

        // Slot indices in playlist order, so each position resolves without a walk
        let positions: Vec<usize> = self.slot_indices().collect();
        for _ in 0..count * 2 {
            let a = positions[rng.gen_range(0..count)];
            let b = positions[rng.gen_range(0..count)];
            self.swap_tracks(a, b);
        }
        self.is_modified = true;
        debug_assert!(self.verify_integrity());
    }

    /// Exchanges the tracks held by two live slots.
    fn swap_tracks(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (left, right) = self.slots.split_at_mut(hi);
        match (left[lo].as_mut(), right[0].as_mut()) {
            (Some(x), Some(y)) => mem::swap(&mut x.track, &mut y.track),
            _ => unreachable!("shuffle position points at a vacant slot"),
        }
    }

    /// Returns an iterator over the tracks, from the head to the tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            playlist: self,
            cursor: self.tail.map_or(0, |tail| self.node(tail).next),
            remaining: self.len,
        }
    }

    /// Slot indices in head-to-tail order.
    fn slot_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let head = self.tail.map(|tail| self.node(tail).next);
        std::iter::successors(head, move |&index| Some(self.node(index).next)).take(self.len)
    }

    fn node(&self, index: usize) -> &Node {
        // If this fails, a link or the tail points at a vacant slot and the ring is corrupt
        match &self.slots[index] {
            Some(node) => node,
            None => unreachable!("ring link points at vacant slot {index}"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        match &mut self.slots[index] {
            Some(node) => node,
            None => unreachable!("ring link points at vacant slot {index}"),
        }
    }

    /// Verifies the integrity of the struct. This is quite slow and intended for use with
    /// `debug_assert`.
    fn verify_integrity(&self) -> bool {
        let live = self.slots.iter().filter(|x| x.is_some()).count();
        if live != self.len || live + self.free.len() != self.slots.len() {
            return false;
        }
        if self.free.iter().any(|&i| !matches!(self.slots.get(i), Some(None))) {
            return false;
        }

        let tail = match self.tail {
            Some(tail) => tail,
            None => return self.len == 0,
        };
        if self.len == 0 {
            return false;
        }

        // Walking `len` links from the tail must visit every node once and end at the tail
        let mut seen = vec![false; self.slots.len()];
        let mut current = tail;
        for _ in 0..self.len {
            match seen.get_mut(current) {
                Some(visited) if !*visited => *visited = true,
                _ => return false,
            }
            current = match self.slots.get(current) {
                Some(Some(node)) => node.next,
                _ => return false,
            };
        }
        current == tail
    }

    /// Reads a playlist file, refusing to hold more than `max_tracks` tracks.
    ///
    /// Every line is expected to be `artist,title`. Blank lines are ignored, and lines that
    /// fail to parse are skipped with a warning.
    pub fn open_with_max_tracks<T: AsRef<Utf8Path>>(fpath: T, max_tracks: usize) -> Result<Self> {
        let fpath = fpath.as_ref();
        let file = BufReader::new(File::open(fpath).map_err(|e| Error::io(fpath, e))?);

        let mut pl = Self::with_max_tracks(max_tracks);
        for (i, line) in file.lines().enumerate() {
            let line = line.map_err(|e| Error::io(fpath, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let track = match line.parse::<Track>() {
                Ok(track) => track,
                Err(e) => {
                    warn!("Failed to parse line {} in '{}': {}, skipping", i + 1, fpath, e);
                    continue;
                },
            };
            pl.push(track)?;
        }
        pl.is_modified = false;
        info!("Loaded {} tracks from '{}'", pl.len, fpath);
        Ok(pl)
    }

    /// Like `open_with_max_tracks`, but a missing file yields an empty playlist.
    pub fn open_or_new_with_max_tracks<T: AsRef<Utf8Path>>(fpath: T, max_tracks: usize) -> Result<Self> {
        match Self::open_with_max_tracks(fpath, max_tracks) {
            Err(e) if e.io_kind() == Some(ErrorKind::NotFound) => Ok(Self::with_max_tracks(max_tracks)),
            result => result,
        }
    }
}

impl TracksFile for Playlist {
    fn open<T: AsRef<Utf8Path>>(fpath: T) -> Result<Self> {
        Self::open_with_max_tracks(fpath, DEFAULT_MAX_TRACKS)
    }

    fn open_or_new<T: AsRef<Utf8Path>>(fpath: T) -> Result<Self> {
        Self::open_or_new_with_max_tracks(fpath, DEFAULT_MAX_TRACKS)
    }

    fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.iter()
    }

    fn write<T: AsRef<Utf8Path>>(&mut self, fpath: T) -> Result<()> {
        let fpath = fpath.as_ref();
        let mut file = BufWriter::new(File::create(fpath).map_err(|e| Error::io(fpath, e))?);
        for track in self.iter() {
            if !track.is_persistable() {
                warn!("{} contains a comma or a line break and will not read back intact", track);
            }
            writeln!(file, "{}", track.as_file_line()).map_err(|e| Error::io(fpath, e))?;
        }
        file.flush().map_err(|e| Error::io(fpath, e))?;
        self.is_modified = false;
        info!("Saved {} tracks to '{}'", self.len, fpath);
        Ok(())
    }
}

/// Iterator over the tracks of a `Playlist`, from the head to the tail.
///
/// The ring has no end marker, so the iterator stops after exactly `len` tracks.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    playlist: &'a Playlist,
    cursor: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Track;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.playlist.node(self.cursor);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
