/// Cursor-based history stack of full-state checkpoints.
///
/// The stack owns every checkpoint pushed into it. Moving the cursor never
/// discards anything; pushing while the cursor is behind the tail discards
/// the redo branch first, so history never forks.
use std::sync::Arc;

use crate::checkpoint::{Checkpoint, SelectedRegion, UndoPush};
use crate::config::HistoryConfig;

/// One row of a history listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub index: usize,
    pub description: &'a str,
    pub short_description: &'a str,
    /// Whether the cursor points at this checkpoint.
    pub current: bool,
    /// Whether this is the last checkpoint marked as saved.
    pub saved: bool,
}

/// Manages the checkpoint sequence for a single project.
pub struct UndoStack<C, M> {
    /// Checkpoints, oldest first.
    states: Vec<Checkpoint<C, M>>,
    /// Index of the checkpoint representing the live state.
    current: Option<usize>,
    /// Index of the checkpoint marked by `state_saved`, if it still exists.
    saved: Option<usize>,
    /// Max checkpoints kept before the oldest are evicted.
    max_depth: usize,
    /// Set by a push, cleared by any cursor move or modification. A
    /// consolidating push only merges into the tail while this holds.
    may_consolidate: bool,
}

impl<C, M> std::fmt::Debug for UndoStack<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoStack")
            .field("len", &self.states.len())
            .field("current", &self.current)
            .field("saved", &self.saved)
            .field("max_depth", &self.max_depth)
            .field("may_consolidate", &self.may_consolidate)
            .finish()
    }
}

impl<C, M> Default for UndoStack<C, M> {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl<C, M> UndoStack<C, M> {
    /// Creates an empty stack.
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            states: Vec::new(),
            current: None,
            saved: None,
            max_depth: config.effective_depth(),
            may_consolidate: false,
        }
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Cursor position, or `None` for an empty stack.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Position last marked by [`UndoStack::state_saved`].
    pub fn saved_index(&self) -> Option<usize> {
        self.saved
    }

    /// Removes every checkpoint and resets the cursor.
    pub fn clear_states(&mut self) {
        self.states.clear();
        self.current = None;
        self.saved = None;
        self.may_consolidate = false;
        tracing::debug!("Cleared history");
    }

    /// Records a new checkpoint after the cursor.
    ///
    /// Discards the redo branch, appends, and moves the cursor to the new
    /// tail. With [`UndoPush::CONSOLIDATE`] the tail is overwritten instead
    /// when it was pushed with the same flag and description, and nothing
    /// has moved the cursor or modified a checkpoint since that push.
    pub fn push_state(
        &mut self,
        content: C,
        selection: SelectedRegion,
        tags: Arc<M>,
        description: String,
        short_description: String,
        flags: UndoPush,
    ) {
        self.truncate_redo_branch();

        if self.may_consolidate && flags.contains(UndoPush::CONSOLIDATE) {
            if let Some(tail) = self.states.last_mut() {
                if tail.flags().contains(UndoPush::CONSOLIDATE)
                    && tail.description() == description
                {
                    tail.replace_state(content, selection, tags);
                    let tail_index = self.states.len() - 1;
                    if self.saved == Some(tail_index) {
                        self.saved = None;
                    }
                    tracing::debug!(
                        position = tail_index,
                        %description,
                        "Consolidated history state"
                    );
                    return;
                }
            }
        }

        self.states.push(Checkpoint::new(
            content,
            selection,
            tags,
            description,
            short_description,
            flags,
        ));
        self.current = Some(self.states.len() - 1);
        self.may_consolidate = true;
        self.enforce_depth();
        tracing::debug!(
            position = ?self.current,
            len = self.states.len(),
            "Pushed history state"
        );
    }

    /// Overwrites the checkpoint at the cursor without moving the cursor.
    ///
    /// Returns `false` (and records nothing) if the stack is empty.
    pub fn modify_state(&mut self, content: C, selection: SelectedRegion, tags: Arc<M>) -> bool {
        let Some(index) = self.current else {
            tracing::debug!("Ignoring history modification on an empty stack");
            return false;
        };
        self.states[index].replace_state(content, selection, tags);
        self.may_consolidate = false;
        if self.saved == Some(index) {
            self.saved = None;
        }
        tracing::debug!(position = index, "Modified history state");
        true
    }

    /// Stops the next consolidating push from merging into the tail.
    pub(crate) fn break_consolidation(&mut self) {
        self.may_consolidate = false;
    }

    /// Marks the cursor position as the saved baseline.
    pub fn state_saved(&mut self) {
        self.saved = self.current;
    }

    /// Whether the cursor has moved away from the saved baseline, or the
    /// saved checkpoint no longer exists.
    pub fn unsaved_changes(&self) -> bool {
        self.saved.is_none() || self.saved != self.current
    }

    /// Whether the cursor can move one step back.
    pub fn undo_available(&self) -> bool {
        self.current.is_some_and(|index| index > 0)
    }

    /// Whether the cursor can move one step forward.
    pub fn redo_available(&self) -> bool {
        self.current
            .is_some_and(|index| index + 1 < self.states.len())
    }

    /// The checkpoint at the cursor.
    pub fn current_state(&self) -> Option<&Checkpoint<C, M>> {
        self.current.and_then(|index| self.states.get(index))
    }

    /// The checkpoint at `n`, without moving the cursor.
    pub fn state_at(&self, n: usize) -> Option<&Checkpoint<C, M>> {
        self.states.get(n)
    }

    /// Moves the cursor to `n` and returns the checkpoint now current.
    ///
    /// Returns `None` and leaves the cursor alone if `n` is out of range.
    pub fn set_state_to(&mut self, n: usize) -> Option<&Checkpoint<C, M>> {
        if n >= self.states.len() {
            return None;
        }
        self.current = Some(n);
        self.may_consolidate = false;
        self.states.get(n)
    }

    /// Lists every checkpoint, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = HistoryEntry<'_>> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(move |(index, state)| HistoryEntry {
                index,
                description: state.description(),
                short_description: state.short_description(),
                current: self.current == Some(index),
                saved: self.saved == Some(index),
            })
    }

    /// Drops every checkpoint after the cursor.
    fn truncate_redo_branch(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        let keep = index + 1;
        if keep < self.states.len() {
            tracing::debug!(
                discarded = self.states.len() - keep,
                "Discarding redo branch"
            );
            self.states.truncate(keep);
            if self.saved.is_some_and(|saved| saved >= keep) {
                self.saved = None;
            }
        }
    }

    /// Evicts the oldest checkpoints until the depth limit holds.
    fn enforce_depth(&mut self) {
        if self.states.len() <= self.max_depth {
            return;
        }
        let excess = self.states.len() - self.max_depth;
        self.states.drain(..excess);
        self.current = self.current.map(|index| index.saturating_sub(excess));
        self.saved = self.saved.and_then(|saved| saved.checked_sub(excess));
        tracing::debug!(evicted = excess, "Evicted oldest history states");
    }
}
