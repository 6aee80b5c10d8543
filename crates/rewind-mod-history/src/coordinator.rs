/// Decides when checkpoints are recorded and how they become live again.
///
/// One `HistoryCoordinator` exists per open project. It owns the project's
/// [`UndoStack`] and the autosave sink, and is handed the live project on
/// every call instead of looking it up.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::checkpoint::{Checkpoint, SelectedRegion, UndoPush};
use crate::config::HistoryConfig;
use crate::document::{AutoSave, ContentContainer, HistoryDocument, NoAutoSave};
use crate::stack::UndoStack;

/// Description recorded by [`HistoryCoordinator::initial_state`].
pub const INITIAL_STATE_DESCRIPTION: &str = "Created new project";

type ContentOf<D> = <D as HistoryDocument>::Content;
type TagsOf<D> = <D as HistoryDocument>::Tags;

/// Undo/redo coordinator for a single live document.
pub struct HistoryCoordinator<D: HistoryDocument> {
    stack: UndoStack<ContentOf<D>, TagsOf<D>>,
    autosave: Box<dyn AutoSave<D>>,
    /// Set by every push; cleared only by the owner after a real save.
    dirty: bool,
}

impl<D: HistoryDocument> std::fmt::Debug for HistoryCoordinator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryCoordinator")
            .field("stack", &self.stack)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl<D: HistoryDocument> HistoryCoordinator<D> {
    pub fn new(config: &HistoryConfig, autosave: Box<dyn AutoSave<D>>) -> Self {
        Self {
            stack: UndoStack::new(config),
            autosave,
            dirty: false,
        }
    }

    /// Coordinator with default limits whose autosave signals go nowhere.
    pub fn in_memory() -> Self {
        Self::new(&HistoryConfig::default(), Box::new(NoAutoSave))
    }

    pub fn stack(&self) -> &UndoStack<ContentOf<D>, TagsOf<D>> {
        &self.stack
    }

    /// Whether any push happened since the owner last cleared the flag.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Marks the checkpoint at the cursor as matching what is on disk.
    pub fn state_saved(&mut self) {
        self.stack.state_saved();
    }

    /// Discards all history and records `document` as the only checkpoint.
    ///
    /// Call once, when a project is created or opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be snapshotted; history is
    /// left untouched in that case.
    pub fn initial_state(&mut self, document: &D) -> Result<()> {
        let (content, selection, tags) = capture(document)?;
        self.stack.clear_states();
        self.stack.push_state(
            content,
            selection,
            tags,
            INITIAL_STATE_DESCRIPTION.to_string(),
            String::new(),
            UndoPush::MINIMAL,
        );
        self.stack.state_saved();
        Ok(())
    }

    /// Whether an undo step may be taken right now.
    pub fn undo_available(&self, document: &D) -> bool {
        self.stack.undo_available() && !document.content().has_pending_items()
    }

    /// Whether a redo step may be taken right now.
    pub fn redo_available(&self, document: &D) -> bool {
        self.stack.redo_available() && !document.content().has_pending_items()
    }

    /// Records one undo step with the default (autosaving) policy.
    ///
    /// # Errors
    ///
    /// See [`HistoryCoordinator::push_state_with`].
    pub fn push_state(
        &mut self,
        document: &D,
        description: impl Into<String>,
        short_description: impl Into<String>,
    ) -> Result<()> {
        self.push_state_with(document, description, short_description, UndoPush::default())
    }

    /// Records one undo step.
    ///
    /// Every editing operation calls this once it has finished a logical
    /// change. Marks the coordinator dirty and, unless `flags` is
    /// [`UndoPush::MINIMAL`], signals autosave after the push.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be snapshotted; nothing is
    /// recorded in that case.
    pub fn push_state_with(
        &mut self,
        document: &D,
        description: impl Into<String>,
        short_description: impl Into<String>,
        flags: UndoPush,
    ) -> Result<()> {
        let (content, selection, tags) = capture(document)?;
        self.stack.push_state(
            content,
            selection,
            tags,
            description.into(),
            short_description.into(),
            flags,
        );
        self.dirty = true;

        if flags.wants_autosave() {
            self.request_autosave(document);
        }
        Ok(())
    }

    /// Refreshes the checkpoint at the cursor from `document`.
    ///
    /// Used for continuous adjustments that belong to the current step.
    /// Never adds a checkpoint, moves the cursor, or discards redo states.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be snapshotted.
    pub fn modify_state(&mut self, document: &D, wants_autosave: bool) -> Result<()> {
        let (content, selection, tags) = capture(document)?;
        self.stack.modify_state(content, selection, tags);
        if wants_autosave {
            self.request_autosave(document);
        }
        Ok(())
    }

    /// Abandons in-progress edits by restoring the checkpoint at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be duplicated; `document`
    /// is untouched in that case.
    pub fn rollback_state(&mut self, document: &mut D) -> Result<()> {
        let Some(state) = self.stack.current_state() else {
            tracing::debug!("Nothing to roll back to");
            return Ok(());
        };
        let restoration = Restoration::prepare(state).context("Failed to roll back")?;
        restoration.apply(document);
        self.stack.break_consolidation();
        self.request_autosave(document);
        Ok(())
    }

    /// Moves the cursor to `n` and makes that checkpoint the live state.
    ///
    /// Returns `Ok(false)` without doing anything if `n` is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be duplicated; the cursor
    /// and `document` are left as they were.
    pub fn set_state_to(&mut self, document: &mut D, n: usize) -> Result<bool> {
        let previous = self.stack.current_index();
        let Some(state) = self.stack.set_state_to(n) else {
            tracing::debug!(position = n, "Ignoring out-of-range history position");
            return Ok(false);
        };
        let description = state.description().to_string();

        let restoration = match Restoration::prepare(state) {
            Ok(restoration) => restoration,
            Err(e) => {
                if let Some(previous) = previous {
                    self.stack.set_state_to(previous);
                }
                tracing::warn!(position = n, "Abandoned history restore: {e:#}");
                return Err(e.context(format!("Failed to restore history state {n}")));
            }
        };
        restoration.apply(document);
        tracing::debug!(position = n, %description, "Restored history state");

        self.request_autosave(document);
        Ok(true)
    }

    /// Steps one checkpoint back. Returns `Ok(false)` when unavailable.
    ///
    /// # Errors
    ///
    /// See [`HistoryCoordinator::set_state_to`].
    pub fn undo(&mut self, document: &mut D) -> Result<bool> {
        if !self.undo_available(document) {
            return Ok(false);
        }
        match self.stack.current_index() {
            Some(index) => self.set_state_to(document, index - 1),
            None => Ok(false),
        }
    }

    /// Steps one checkpoint forward. Returns `Ok(false)` when unavailable.
    ///
    /// # Errors
    ///
    /// See [`HistoryCoordinator::set_state_to`].
    pub fn redo(&mut self, document: &mut D) -> Result<bool> {
        if !self.redo_available(document) {
            return Ok(false);
        }
        match self.stack.current_index() {
            Some(index) => self.set_state_to(document, index + 1),
            None => Ok(false),
        }
    }

    /// Fires the autosave signal. Failures are logged, never returned.
    fn request_autosave(&self, document: &D) {
        if let Err(e) = self.autosave.auto_save(document) {
            tracing::warn!("Autosave failed: {e:#}");
        }
    }
}

/// Copies the live state into the parts of a checkpoint.
fn capture<D: HistoryDocument>(
    document: &D,
) -> Result<(ContentOf<D>, SelectedRegion, Arc<TagsOf<D>>)> {
    let content = document
        .content()
        .snapshot()
        .context("Failed to snapshot project content")?;
    Ok((content, document.selection(), document.tags()))
}

/// A checkpoint's state, fully duplicated and ready to become live.
///
/// Building one never touches the live document, so a failed duplication
/// leaves nothing half-applied.
struct Restoration<I, M> {
    selection: SelectedRegion,
    tags: Arc<M>,
    items: Vec<I>,
}

impl<I, M> Restoration<I, M> {
    fn prepare<C>(state: &Checkpoint<C, M>) -> Result<Self>
    where
        C: ContentContainer<Item = I>,
    {
        let content = state.content();
        let items = content
            .items()
            .enumerate()
            .map(|(index, item)| {
                content
                    .duplicate_item(item)
                    .with_context(|| format!("Failed to duplicate item {index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            selection: state.selection(),
            tags: Arc::clone(state.tags()),
            items,
        })
    }

    fn apply<D>(self, document: &mut D)
    where
        D: HistoryDocument<Tags = M>,
        D::Content: ContentContainer<Item = I>,
    {
        document.set_selection(self.selection);
        document.set_tags(self.tags);
        let content = document.content_mut();
        content.clear();
        for item in self.items {
            content.add_item(item);
        }
    }
}
