/// Snapshot-based undo/redo history for project documents.
///
/// Provides a cursor-based `UndoStack` of full-state checkpoints, the
/// `HistoryCoordinator` that decides when checkpoints are recorded and how
/// they are made live again, and an `AutosaveStore` backed by an embedded
/// key-value store (redb) for crash recovery.
pub mod checkpoint;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod persistence;
pub mod stack;

pub use checkpoint::{Checkpoint, SelectedRegion, UndoPush};
pub use config::HistoryConfig;
pub use coordinator::{HistoryCoordinator, INITIAL_STATE_DESCRIPTION};
pub use document::{AutoSave, ContentContainer, HistoryDocument, NoAutoSave};
pub use persistence::{AutosaveMeta, AutosaveStore};
pub use stack::{HistoryEntry, UndoStack};
