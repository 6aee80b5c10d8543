//! Autosave of live projects into the history crate's `AutosaveStore`,
//! and recovery of projects from it.

use std::sync::Arc;

use anyhow::{Context, Result};
use rewind_mod_history::{AutoSave, AutosaveStore, HistoryConfig};

use crate::project::{Project, ProjectSnapshot};

/// Autosave sink that writes project snapshots to an `AutosaveStore`.
#[derive(Debug, Clone)]
pub struct ProjectAutosave {
    store: Arc<AutosaveStore>,
    enabled: bool,
}

impl ProjectAutosave {
    pub fn new(store: Arc<AutosaveStore>, config: &HistoryConfig) -> Self {
        Self {
            store,
            enabled: config.autosave_enabled,
        }
    }

    pub fn store(&self) -> &Arc<AutosaveStore> {
        &self.store
    }
}

impl AutoSave<Project> for ProjectAutosave {
    fn auto_save(&self, project: &Project) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.store
            .write(&project.id, &project.snapshot())
            .with_context(|| format!("Failed to autosave project {}", project.id))
    }
}

/// Rebuilds a project from its last autosave.
///
/// Returns `None` if nothing was autosaved under `id`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the snapshot is corrupt.
pub fn recover_project(store: &AutosaveStore, id: &str) -> Result<Option<Project>> {
    let snapshot: Option<ProjectSnapshot> = store
        .read(id)
        .with_context(|| format!("Failed to read autosave for {id}"))?;
    if snapshot.is_some() {
        tracing::info!(id, "Recovered project from autosave");
    }
    Ok(snapshot.map(Project::from_snapshot))
}
