//! Core project model for rewind.
//!
//! Holds the live state of an open project (tracks, view state, metadata
//! tags) and wires it to the snapshot-based history in `rewind-mod-history`.
pub mod autosave;
pub mod history;
pub mod project;
pub mod tags;
pub mod track;
pub mod view;

pub use autosave::{recover_project, ProjectAutosave};
pub use history::{open_project_history, project_history, ProjectCheckpoint, ProjectHistory};
pub use project::{generate_project_id, project_id_for_path, Project, ProjectSnapshot};
pub use tags::Tags;
pub use track::{Track, TrackId, TrackKind, TrackList};
pub use view::ViewInfo;
