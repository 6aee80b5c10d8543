/// Core types for recorded history checkpoints.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Selected time range snapshot.
///
/// Mirrors the selection held by the project's view state but is
/// independently serializable without depending on the core crate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedRegion {
    /// Start of the selection, in seconds.
    pub t0: f64,
    /// End of the selection, in seconds. Never less than `t0`.
    pub t1: f64,
}

impl SelectedRegion {
    /// Creates a region, swapping the bounds if they arrive reversed.
    pub fn new(t0: f64, t1: f64) -> Self {
        if t1 < t0 {
            Self { t0: t1, t1: t0 }
        } else {
            Self { t0, t1 }
        }
    }

    /// Length of the selection in seconds.
    pub fn duration(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Whether the selection is a single point (a cursor).
    pub fn is_point(&self) -> bool {
        self.t0 == self.t1
    }
}

bitflags::bitflags! {
    /// Policy bits controlling the side effects of a history push.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UndoPush: u8 {
        /// Signal the autosave side-channel after the push completes.
        const AUTOSAVE = 1 << 0;
        /// Replace the tail checkpoint instead of appending when the tail
        /// also carries this flag and has the same description.
        const CONSOLIDATE = 1 << 1;
    }
}

impl UndoPush {
    /// Record the checkpoint and nothing else.
    pub const MINIMAL: Self = Self::empty();

    /// Whether this push should reach the autosave side-channel.
    pub fn wants_autosave(self) -> bool {
        self.contains(Self::AUTOSAVE)
    }
}

impl Default for UndoPush {
    fn default() -> Self {
        Self::AUTOSAVE
    }
}

/// One recorded point in a project's history.
///
/// The content is an independent copy owned by the checkpoint; the tags
/// handle is shared with whatever the live project held at capture time.
#[derive(Debug)]
pub struct Checkpoint<C, M> {
    content: C,
    selection: SelectedRegion,
    tags: Arc<M>,
    description: String,
    short_description: String,
    flags: UndoPush,
}

impl<C, M> Checkpoint<C, M> {
    pub(crate) fn new(
        content: C,
        selection: SelectedRegion,
        tags: Arc<M>,
        description: String,
        short_description: String,
        flags: UndoPush,
    ) -> Self {
        Self {
            content,
            selection,
            tags,
            description,
            short_description,
            flags,
        }
    }

    /// Overwrites the captured state, keeping labels and flags.
    pub(crate) fn replace_state(&mut self, content: C, selection: SelectedRegion, tags: Arc<M>) {
        self.content = content;
        self.selection = selection;
        self.tags = tags;
    }

    /// The content snapshot.
    pub fn content(&self) -> &C {
        &self.content
    }

    /// The selection at capture time.
    pub fn selection(&self) -> SelectedRegion {
        self.selection
    }

    /// The tags handle at capture time.
    pub fn tags(&self) -> &Arc<M> {
        &self.tags
    }

    /// Long label, as shown in a history list.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Short label, as shown in "Undo <x>" menu items.
    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    /// Push policy this checkpoint was recorded with.
    pub fn flags(&self) -> UndoPush {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_region_default() {
        let region = SelectedRegion::default();
        assert_eq!(region.t0, 0.0);
        assert_eq!(region.t1, 0.0);
        assert!(region.is_point());
    }

    #[test]
    fn test_selected_region_orders_bounds() {
        let region = SelectedRegion::new(4.0, 1.5);
        assert_eq!(region.t0, 1.5);
        assert_eq!(region.t1, 4.0);
        assert!((region.duration() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_selected_region_serde_roundtrip() {
        let region = SelectedRegion::new(0.25, 3.0);
        let bytes = bincode::serialize(&region).expect("serialize");
        let decoded: SelectedRegion = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(decoded, region);
    }

    #[test]
    fn test_default_push_autosaves() {
        assert!(UndoPush::default().wants_autosave());
        assert!(!UndoPush::MINIMAL.wants_autosave());
        assert!(!UndoPush::CONSOLIDATE.wants_autosave());
        assert!((UndoPush::AUTOSAVE | UndoPush::CONSOLIDATE).wants_autosave());
    }

    #[test]
    fn test_replace_state_keeps_labels() {
        let mut checkpoint = Checkpoint::new(
            vec![1, 2],
            SelectedRegion::default(),
            Arc::new("tags-a"),
            "Moved clip".to_string(),
            "Move".to_string(),
            UndoPush::CONSOLIDATE,
        );
        checkpoint.replace_state(vec![3], SelectedRegion::new(1.0, 2.0), Arc::new("tags-b"));

        assert_eq!(checkpoint.content(), &vec![3]);
        assert_eq!(checkpoint.selection(), SelectedRegion::new(1.0, 2.0));
        assert_eq!(**checkpoint.tags(), "tags-b");
        assert_eq!(checkpoint.description(), "Moved clip");
        assert_eq!(checkpoint.short_description(), "Move");
        assert_eq!(checkpoint.flags(), UndoPush::CONSOLIDATE);
    }
}
