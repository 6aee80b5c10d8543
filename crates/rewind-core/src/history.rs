// Re-exports from rewind-mod-history and project-specific wiring.
// Bridges the history crate's generic coordinator with the `Project` type.
use std::sync::Arc;

use anyhow::{Context, Result};

pub use rewind_mod_history::{
    AutoSave, AutosaveMeta, AutosaveStore, Checkpoint, HistoryConfig, HistoryCoordinator,
    HistoryEntry, NoAutoSave, SelectedRegion, UndoPush, UndoStack, INITIAL_STATE_DESCRIPTION,
};

use crate::autosave::ProjectAutosave;
use crate::project::Project;
use crate::tags::Tags;
use crate::track::TrackList;

/// Undo/redo coordinator for a project.
pub type ProjectHistory = HistoryCoordinator<Project>;

/// A recorded project checkpoint.
pub type ProjectCheckpoint = Checkpoint<TrackList, Tags>;

/// Creates a project history whose autosaves go to `store`.
pub fn project_history(config: &HistoryConfig, store: Arc<AutosaveStore>) -> ProjectHistory {
    HistoryCoordinator::new(config, Box::new(ProjectAutosave::new(store, config)))
}

/// Opens the autosave store under `config.data_dir` and creates a project
/// history writing to it.
///
/// # Errors
///
/// Returns an error if the autosave store cannot be opened.
pub fn open_project_history(
    config: &HistoryConfig,
) -> Result<(ProjectHistory, Arc<AutosaveStore>)> {
    let store = AutosaveStore::open(&config.data_dir).context("Failed to open autosave store")?;
    Ok((project_history(config, Arc::clone(&store)), store))
}
