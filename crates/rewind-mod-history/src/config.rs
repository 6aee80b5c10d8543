/// Configuration for the history system.
use std::path::{Path, PathBuf};

/// Maximum number of checkpoints kept per project before the oldest
/// ones are evicted.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1_000;

/// Smallest depth that still allows one undo step.
pub const MIN_HISTORY_DEPTH: usize = 2;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max checkpoints per project. Oldest checkpoints are evicted first.
    pub max_history_depth: usize,
    /// Whether autosave signals reach the autosave store.
    pub autosave_enabled: bool,
    /// Root directory for the autosave database.
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
            autosave_enabled: true,
            data_dir: resolve_data_dir(),
        }
    }
}

impl HistoryConfig {
    /// Depth actually enforced by the stack.
    pub fn effective_depth(&self) -> usize {
        self.max_history_depth.max(MIN_HISTORY_DEPTH)
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `REWIND_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REWIND_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}
