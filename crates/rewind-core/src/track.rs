//! Tracks and the ordered track list that forms a project's content.
//!
//! `TrackList` is the content container recorded by history. Tracks that are
//! still being recorded live in a separate pending list until they are
//! committed with [`TrackList::apply_pending`].

use std::fmt;

use anyhow::{Context, Result};
use rewind_mod_history::ContentContainer;
use serde::{Deserialize, Serialize};

/// Stable identity of a track within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a track holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackKind {
    /// Sampled audio.
    #[default]
    Wave,
    /// Text labels positioned on the timeline.
    Label,
    /// Note events.
    Note,
}

/// A single track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    /// Linear gain, 1.0 = unity.
    pub gain: f32,
    /// Stereo pan, -1.0 (left) to 1.0 (right).
    pub pan: f32,
    pub muted: bool,
    /// Sample rate of `samples`, in Hz.
    pub rate: u32,
    pub samples: Vec<f32>,
}

/// Default sample rate for new tracks.
pub const DEFAULT_RATE: u32 = 44_100;

impl Track {
    /// Creates an empty track with unity gain and centered pan.
    pub fn new(id: TrackId, name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            gain: 1.0,
            pan: 0.0,
            muted: false,
            rate: DEFAULT_RATE,
            samples: Vec::new(),
        }
    }

    /// Length of the track's audio in seconds.
    pub fn duration(&self) -> f64 {
        if self.rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.rate)
    }

    /// Makes an independent copy, including the sample data.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample buffer cannot be allocated.
    pub fn duplicate(&self) -> Result<Self> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(self.samples.len())
            .with_context(|| {
                format!(
                    "Failed to allocate {} samples for track {}",
                    self.samples.len(),
                    self.id
                )
            })?;
        samples.extend_from_slice(&self.samples);
        Ok(Self {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            gain: self.gain,
            pan: self.pan,
            muted: self.muted,
            rate: self.rate,
            samples,
        })
    }
}

/// Ordered tracks of a project, plus tracks still being recorded.
#[derive(Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
    pending: Vec<Track>,
    /// Next id handed out by [`TrackList::add`]. Never reused, even after
    /// a restore removes the track that held it.
    next_id: u64,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a track at the end of the list and returns its id.
    pub fn add(&mut self, name: impl Into<String>, kind: TrackKind) -> TrackId {
        let id = self.allocate_id();
        self.push(Track::new(id, name, kind));
        id
    }

    /// Appends an existing track, keeping its id.
    pub fn push(&mut self, track: Track) {
        self.next_id = self.next_id.max(track.id.0 + 1);
        self.tracks.push(track);
    }

    /// Removes a track, returning it if it existed.
    pub fn remove(&mut self, id: TrackId) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        Some(self.tracks.remove(index))
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// First track with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    /// Moves a track to `index`, clamped to the end of the list.
    pub fn move_to(&mut self, id: TrackId, index: usize) -> bool {
        let Some(track) = self.remove(id) else {
            return false;
        };
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total length of the project in seconds.
    pub fn end_time(&self) -> f64 {
        self.tracks.iter().map(Track::duration).fold(0.0, f64::max)
    }

    /// Starts a track that is not yet part of the list (e.g. while recording).
    pub fn begin_pending(&mut self, name: impl Into<String>, kind: TrackKind) -> TrackId {
        let id = self.allocate_id();
        self.pending.push(Track::new(id, name, kind));
        id
    }

    pub fn pending_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.pending.iter_mut().find(|t| t.id == id)
    }

    /// Commits every pending track to the end of the list.
    pub fn apply_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.tracks.append(&mut self.pending);
        count
    }

    /// Discards every pending track.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn has_pending_tracks(&self) -> bool {
        !self.pending.is_empty()
    }

    fn allocate_id(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl ContentContainer for TrackList {
    type Item = Track;

    fn clear(&mut self) {
        self.tracks.clear();
        self.pending.clear();
    }

    fn items(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    fn duplicate_item(&self, item: &Track) -> Result<Track> {
        item.duplicate()
    }

    fn add_item(&mut self, item: Track) {
        self.push(item);
    }

    fn has_pending_items(&self) -> bool {
        self.has_pending_tracks()
    }
}
