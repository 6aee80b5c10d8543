//! Project model combining tracks, view state, and metadata tags.
//!
//! A `Project` is the live document context that history records from and
//! restores into. It owns its `TrackList` and `ViewInfo` outright and holds
//! its `Tags` through a replaceable shared handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rewind_mod_history::{HistoryDocument, SelectedRegion};
use serde::{Deserialize, Serialize};

use crate::tags::Tags;
use crate::track::{Track, TrackList};
use crate::view::ViewInfo;

/// Generates an id for a project that has never been saved.
pub fn generate_project_id() -> String {
    format!("unsaved-{}", uuid::Uuid::new_v4())
}

/// Generates a project id for a file on disk.
///
/// Uses a hash of the canonical path for stability across sessions.
pub fn project_id_for_path(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    format!("file-{:016x}", hasher.finish())
}

/// A single open project.
pub struct Project {
    /// Key under which the project is autosaved.
    pub id: String,
    /// Display name.
    pub title: String,
    /// File path on disk, if any.
    pub file_path: Option<PathBuf>,
    /// The project's content.
    pub tracks: TrackList,
    /// Selection, zoom and scroll.
    pub view_info: ViewInfo,
    tags: Arc<Tags>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("file_path", &self.file_path)
            .field("tracks", &self.tracks.len())
            .field("selection", &self.view_info.selected_region)
            .finish_non_exhaustive()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Creates a new empty, untitled project.
    pub fn new() -> Self {
        Self::with_id(generate_project_id())
    }

    /// Creates a new empty project under a known id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: "Untitled".to_string(),
            file_path: None,
            tracks: TrackList::new(),
            view_info: ViewInfo::default(),
            tags: Arc::new(Tags::new()),
        }
    }

    /// Creates a new empty project associated with a file path.
    pub fn for_path(path: &Path) -> Self {
        let mut project = Self::with_id(project_id_for_path(path));
        project.title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        project.file_path = Some(path.to_path_buf());
        project
    }

    /// The current tags handle.
    pub fn tags(&self) -> &Arc<Tags> {
        &self.tags
    }

    /// Edits the tags by swapping in a modified copy.
    ///
    /// Handles captured earlier (e.g. by history) keep the old values.
    pub fn edit_tags(&mut self, edit: impl FnOnce(&mut Tags)) {
        let mut tags = Tags::clone(&self.tags);
        edit(&mut tags);
        self.tags = Arc::new(tags);
    }

    /// Serializable copy of the project's state.
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            file_path: self.file_path.clone(),
            tracks: self.tracks.iter().cloned().collect(),
            selection: self.view_info.selected_region,
            tags: Tags::clone(&self.tags),
        }
    }

    /// Rebuilds a project from a snapshot.
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let mut tracks = TrackList::new();
        for track in snapshot.tracks {
            tracks.push(track);
        }
        Self {
            id: snapshot.id,
            title: snapshot.title,
            file_path: snapshot.file_path,
            tracks,
            view_info: ViewInfo {
                selected_region: snapshot.selection,
                ..ViewInfo::default()
            },
            tags: Arc::new(snapshot.tags),
        }
    }
}

impl HistoryDocument for Project {
    type Content = TrackList;
    type Tags = Tags;

    fn content(&self) -> &TrackList {
        &self.tracks
    }

    fn content_mut(&mut self) -> &mut TrackList {
        &mut self.tracks
    }

    fn selection(&self) -> SelectedRegion {
        self.view_info.selected_region
    }

    fn set_selection(&mut self, selection: SelectedRegion) {
        self.view_info.selected_region = selection;
    }

    fn tags(&self) -> Arc<Tags> {
        Arc::clone(&self.tags)
    }

    fn set_tags(&mut self, tags: Arc<Tags>) {
        self.tags = tags;
    }
}

/// Everything an autosave needs to bring a project back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: String,
    pub title: String,
    pub file_path: Option<PathBuf>,
    pub tracks: Vec<Track>,
    pub selection: SelectedRegion,
    pub tags: Tags,
}
