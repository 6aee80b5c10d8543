// Integration tests for the history system.
//
// These tests exercise full workflows spanning the HistoryCoordinator,
// UndoStack and AutosaveStore together, simulating realistic usage patterns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use rewind_mod_history::{
    AutoSave, AutosaveStore, ContentContainer, HistoryConfig, HistoryCoordinator,
    HistoryDocument, SelectedRegion, UndoPush,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Lane {
    name: String,
    samples: Vec<i16>,
}

#[derive(Debug, Default)]
struct Lanes {
    lanes: Vec<Box<Lane>>,
    pending: Vec<Box<Lane>>,
}

impl ContentContainer for Lanes {
    type Item = Box<Lane>;

    fn clear(&mut self) {
        self.lanes.clear();
        self.pending.clear();
    }

    fn items(&self) -> impl Iterator<Item = &Box<Lane>> {
        self.lanes.iter()
    }

    fn duplicate_item(&self, item: &Box<Lane>) -> Result<Box<Lane>> {
        Ok(Box::new(Lane::clone(item)))
    }

    fn add_item(&mut self, item: Box<Lane>) {
        self.lanes.push(item);
    }

    fn has_pending_items(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[derive(Debug, Default)]
struct Session {
    id: String,
    lanes: Lanes,
    selection: SelectedRegion,
    tags: Arc<Vec<(String, String)>>,
}

impl Session {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    fn add_lane(&mut self, name: &str) {
        self.lanes.lanes.push(Box::new(Lane {
            name: name.to_string(),
            samples: vec![1, 2, 3],
        }));
    }

    fn remove_lane(&mut self, name: &str) {
        self.lanes.lanes.retain(|lane| lane.name != name);
    }

    fn names(&self) -> Vec<String> {
        self.lanes.lanes.iter().map(|l| l.name.clone()).collect()
    }

    fn values(&self) -> Vec<Lane> {
        self.lanes.lanes.iter().map(|l| Lane::clone(l)).collect()
    }
}

impl HistoryDocument for Session {
    type Content = Lanes;
    type Tags = Vec<(String, String)>;

    fn content(&self) -> &Lanes {
        &self.lanes
    }

    fn content_mut(&mut self) -> &mut Lanes {
        &mut self.lanes
    }

    fn selection(&self) -> SelectedRegion {
        self.selection
    }

    fn set_selection(&mut self, selection: SelectedRegion) {
        self.selection = selection;
    }

    fn tags(&self) -> Arc<Vec<(String, String)>> {
        Arc::clone(&self.tags)
    }

    fn set_tags(&mut self, tags: Arc<Vec<(String, String)>>) {
        self.tags = tags;
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct SessionSnapshot {
    lanes: Vec<Lane>,
    selection: SelectedRegion,
}

/// Autosave sink writing into a real store and counting signals.
struct StoreAutoSave {
    store: Arc<AutosaveStore>,
    signals: Arc<AtomicUsize>,
}

impl AutoSave<Session> for StoreAutoSave {
    fn auto_save(&self, session: &Session) -> Result<()> {
        self.signals.fetch_add(1, Ordering::SeqCst);
        let snapshot = SessionSnapshot {
            lanes: session.values(),
            selection: session.selection,
        };
        self.store.write(&session.id, &snapshot)
    }
}

fn test_config(dir: &std::path::Path) -> HistoryConfig {
    HistoryConfig {
        max_history_depth: 100,
        autosave_enabled: true,
        data_dir: dir.to_path_buf(),
    }
}

fn new_history(
    store: &Arc<AutosaveStore>,
    config: &HistoryConfig,
) -> (HistoryCoordinator<Session>, Arc<AtomicUsize>) {
    let signals = Arc::new(AtomicUsize::new(0));
    let sink = StoreAutoSave {
        store: Arc::clone(store),
        signals: Arc::clone(&signals),
    };
    (HistoryCoordinator::new(config, Box::new(sink)), signals)
}

fn in_memory() -> HistoryCoordinator<Session> {
    HistoryCoordinator::in_memory()
}

// ── Availability ───────────────────────────────────────────────────────

#[test]
fn test_undo_available_after_every_push() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    assert!(!history.undo_available(&session));
    assert!(!history.redo_available(&session));

    for i in 0..10 {
        session.add_lane(&format!("lane{i}"));
        history.push_state(&session, "Add lane", "Add").unwrap();
        assert!(history.undo_available(&session));
        assert!(!history.redo_available(&session));
    }
}

#[test]
fn test_pending_items_disable_undo_redo_regardless_of_stack() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    session.add_lane("a");
    history.push_state(&session, "Add a", "Add").unwrap();
    session.add_lane("b");
    history.push_state(&session, "Add b", "Add").unwrap();
    history.set_state_to(&mut session, 1).unwrap();
    assert!(history.stack().undo_available());
    assert!(history.stack().redo_available());

    session.lanes.pending.push(Box::new(Lane {
        name: "recording".to_string(),
        samples: Vec::new(),
    }));
    assert!(!history.undo_available(&session));
    assert!(!history.redo_available(&session));
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn test_add_then_delete_then_jump_to_start() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    session.add_lane("Drums");
    history.initial_state(&session).unwrap();

    session.add_lane("Bass");
    history.push_state(&session, "Add track", "Add").unwrap();
    let after_add = session.values();

    session.remove_lane("Drums");
    history.push_state(&session, "Delete track", "Delete").unwrap();
    assert_eq!(session.names(), vec!["Bass"]);

    // Position 1 is "Add track".
    assert!(history.set_state_to(&mut session, 1).unwrap());
    assert_eq!(session.values(), after_add);

    history.set_state_to(&mut session, 0).unwrap();
    assert_eq!(session.names(), vec!["Drums"]);
    assert!(!history.undo_available(&session));
    assert!(history.redo_available(&session));
}

#[test]
fn test_push_after_undo_truncates_to_cursor_plus_one() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    for i in 0..5 {
        session.add_lane(&format!("lane{i}"));
        history.push_state(&session, format!("Add lane{i}"), "Add").unwrap();
    }
    assert_eq!(history.stack().len(), 6);

    let k = 2;
    history.set_state_to(&mut session, k).unwrap();
    session.add_lane("branch");
    history.push_state(&session, "Add branch", "Add").unwrap();

    assert_eq!(history.stack().len(), k + 2);
    assert!(!history.redo_available(&session));
    assert_eq!(session.names(), vec!["lane0", "lane1", "branch"]);
}

#[test]
fn test_rollback_round_trip_makes_fresh_duplicates() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    session.add_lane("a");
    session.add_lane("b");
    history.initial_state(&session).unwrap();
    let captured = session.values();

    session.lanes.lanes[0].samples.push(99);
    session.add_lane("scratch");
    history.rollback_state(&mut session).unwrap();
    assert_eq!(session.values(), captured);

    // The live items are not the checkpoint's items.
    let checkpoint = history.stack().current_state().unwrap();
    for (live, stored) in session.lanes.lanes.iter().zip(checkpoint.content().items()) {
        assert_eq!(live, stored);
        assert!(!std::ptr::eq::<Lane>(&**live, &**stored));
    }

    // Mutating the restored items does not leak back into history.
    session.lanes.lanes[1].samples.clear();
    history.rollback_state(&mut session).unwrap();
    assert_eq!(session.values(), captured);
}

#[test]
fn test_modify_state_never_changes_length() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    session.add_lane("a");
    history.push_state(&session, "Add a", "Add").unwrap();

    for i in 0..5 {
        session.selection = SelectedRegion::new(0.0, i as f64);
        history.modify_state(&session, false).unwrap();
        assert_eq!(history.stack().len(), 2);
    }
    history.set_state_to(&mut session, 0).unwrap();
    history.set_state_to(&mut session, 1).unwrap();
    assert_eq!(session.selection, SelectedRegion::new(0.0, 4.0));
}

#[test]
fn test_consolidated_nudges_undo_as_one_step() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    session.add_lane("a");
    history.initial_state(&session).unwrap();

    for i in 1..=4 {
        session.selection = SelectedRegion::new(i as f64, i as f64 + 1.0);
        history
            .push_state_with(
                &session,
                "Nudge selection",
                "Nudge",
                UndoPush::AUTOSAVE | UndoPush::CONSOLIDATE,
            )
            .unwrap();
    }
    assert_eq!(history.stack().len(), 2);

    assert!(history.undo(&mut session).unwrap());
    assert_eq!(session.selection, SelectedRegion::default());
}

#[test]
fn test_tags_restored_by_handle() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    let original_tags = Arc::clone(&session.tags);

    session.tags = Arc::new(vec![("TITLE".to_string(), "Demo".to_string())]);
    history.push_state(&session, "Edit tags", "Tags").unwrap();

    history.undo(&mut session).unwrap();
    assert!(Arc::ptr_eq(&session.tags, &original_tags));
    history.redo(&mut session).unwrap();
    assert_eq!(session.tags[0].1, "Demo");
}

// ── Autosave side-channel ──────────────────────────────────────────────

#[test]
fn test_autosave_signals_follow_push_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let store = AutosaveStore::open(dir.path()).unwrap();
    let (mut history, signals) = new_history(&store, &config);
    let mut session = Session::new("signals");

    history.initial_state(&session).unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 0);

    session.add_lane("a");
    history
        .push_state_with(&session, "Add a", "Add", UndoPush::MINIMAL)
        .unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 0);

    session.add_lane("b");
    history.push_state(&session, "Add b", "Add").unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 1);

    // Restores always signal, whatever the push flags were.
    history.set_state_to(&mut session, 1).unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 2);
    history.rollback_state(&mut session).unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 3);

    // Out-of-range requests do nothing at all.
    history.set_state_to(&mut session, 42).unwrap();
    assert_eq!(signals.load(Ordering::SeqCst), 3);
}

#[test]
fn test_autosave_store_holds_latest_live_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let store = AutosaveStore::open(dir.path()).unwrap();
    let (mut history, _signals) = new_history(&store, &config);
    let mut session = Session::new("latest");

    history.initial_state(&session).unwrap();
    session.add_lane("a");
    history.push_state(&session, "Add a", "Add").unwrap();
    session.add_lane("b");
    history.push_state(&session, "Add b", "Add").unwrap();
    history.undo(&mut session).unwrap();

    let saved: SessionSnapshot = store.read("latest").unwrap().unwrap();
    assert_eq!(saved.lanes.len(), 1);
    assert_eq!(saved.lanes[0].name, "a");
}

#[test]
fn test_dirty_flag_only_cleared_by_owner() {
    let mut history = in_memory();
    let mut session = Session::new("doc");
    history.initial_state(&session).unwrap();
    assert!(!history.is_dirty());

    session.add_lane("a");
    history.push_state(&session, "Add a", "Add").unwrap();
    assert!(history.is_dirty());

    history.undo(&mut session).unwrap();
    history.modify_state(&session, false).unwrap();
    assert!(history.is_dirty());

    history.set_dirty(false);
    history.state_saved();
    assert!(!history.is_dirty());
    assert!(!history.stack().unsaved_changes());
}

// ── Depth limit ────────────────────────────────────────────────────────

#[test]
fn test_depth_limit_keeps_most_recent_states() {
    let mut history: HistoryCoordinator<Session> = HistoryCoordinator::new(
        &HistoryConfig {
            max_history_depth: 4,
            autosave_enabled: false,
            data_dir: std::path::PathBuf::from("."),
        },
        Box::new(rewind_mod_history::NoAutoSave),
    );
    let mut session = Session::new("deep");
    history.initial_state(&session).unwrap();
    for i in 0..10 {
        session.add_lane(&format!("lane{i}"));
        history.push_state(&session, format!("Add lane{i}"), "Add").unwrap();
    }
    assert_eq!(history.stack().len(), 4);

    let mut steps = 0;
    while history.undo(&mut session).unwrap() {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert_eq!(session.names().len(), 7);
}
