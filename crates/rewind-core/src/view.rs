//! View state of a project: selection, zoom and scroll.

use rewind_mod_history::SelectedRegion;

/// Zoom used by new projects, in pixels per second.
pub const DEFAULT_ZOOM: f64 = 86.0;

/// Per-project view state. Only the selection is recorded by history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewInfo {
    pub selected_region: SelectedRegion,
    /// Pixels per second.
    pub zoom: f64,
    /// Left edge of the visible timeline, in seconds.
    pub h_scroll: f64,
}

impl Default for ViewInfo {
    fn default() -> Self {
        Self {
            selected_region: SelectedRegion::default(),
            zoom: DEFAULT_ZOOM,
            h_scroll: 0.0,
        }
    }
}

impl ViewInfo {
    /// Selects `[t0, t1]`, clamping negative times to zero.
    pub fn select(&mut self, t0: f64, t1: f64) {
        self.selected_region = SelectedRegion::new(t0.max(0.0), t1.max(0.0));
    }

    /// Collapses the selection to a point at `t`.
    pub fn set_cursor(&mut self, t: f64) {
        self.select(t, t);
    }
}
