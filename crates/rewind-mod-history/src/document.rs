/// Seams between the history coordinator and the live project it drives.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::checkpoint::SelectedRegion;

/// An ordered, mutable collection of content items.
///
/// The coordinator never shares items between a checkpoint and the live
/// container: every capture and every restore goes through
/// [`ContentContainer::duplicate_item`].
pub trait ContentContainer: Default {
    type Item;

    /// Removes every item, including pending ones.
    fn clear(&mut self);

    /// Committed items, in order. Pending items are not included.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;

    /// Makes an independent copy of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy cannot be made (e.g. allocation failure).
    fn duplicate_item(&self, item: &Self::Item) -> Result<Self::Item>;

    /// Appends an item at the end.
    fn add_item(&mut self, item: Self::Item);

    /// Whether items are in a transient, not-yet-committed editing state.
    fn has_pending_items(&self) -> bool;

    /// Builds an independent copy of every committed item.
    ///
    /// Fails without side effects if any single item cannot be duplicated.
    fn snapshot(&self) -> Result<Self> {
        let mut copy = Self::default();
        for (index, item) in self.items().enumerate() {
            let item = self
                .duplicate_item(item)
                .with_context(|| format!("Failed to duplicate item {index}"))?;
            copy.add_item(item);
        }
        Ok(copy)
    }
}

/// The live document context whose state is recorded into history.
pub trait HistoryDocument {
    type Content: ContentContainer;
    type Tags;

    fn content(&self) -> &Self::Content;

    fn content_mut(&mut self) -> &mut Self::Content;

    fn selection(&self) -> SelectedRegion;

    fn set_selection(&mut self, selection: SelectedRegion);

    /// Returns a new handle to the current tags.
    fn tags(&self) -> Arc<Self::Tags>;

    /// Replaces the live tags handle. Previously captured handles are unaffected.
    fn set_tags(&mut self, tags: Arc<Self::Tags>);
}

/// Receiver of "persist now" signals.
///
/// Signals are fire-and-forget: the coordinator logs a failure and moves on,
/// so implementations must not assume the caller retries.
pub trait AutoSave<D: ?Sized> {
    /// # Errors
    ///
    /// Returns an error if the document could not be persisted.
    fn auto_save(&self, document: &D) -> Result<()>;
}

/// Autosave sink that discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAutoSave;

impl<D: ?Sized> AutoSave<D> for NoAutoSave {
    fn auto_save(&self, _document: &D) -> Result<()> {
        Ok(())
    }
}
