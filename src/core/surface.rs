// HiveTail - core/surface.rs
//
// The append-only display surface a poller writes into.
//
// `DisplaySurface` is the seam between the poller and whatever renders the
// log (the egui view, stdout, or a test double). `LineBuffer` is the
// in-memory implementation used by the GUI: it stores lines and models the
// scroll geometry of a fixed-row-height list so the poller can measure and
// move the viewport without touching egui.

use crate::core::scroll::ScrollMetrics;
use crate::util::constants;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A surface shared between a poller thread and whoever renders it.
pub type SharedSurface<S> = Arc<Mutex<S>>;

/// Lock a surface, recovering the guard if another holder panicked.
///
/// Surface state is a list of lines plus scroll numbers, all valid after any
/// partial update, so a poisoned lock is safe to reuse.
pub fn lock_surface<S: ?Sized>(surface: &Mutex<S>) -> MutexGuard<'_, S> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A container that log lines are appended to.
///
/// Lines are never removed. Each `append_line` call renders exactly one line
/// followed by a line break.
pub trait DisplaySurface: Send {
    /// Append one line to the end of the surface.
    fn append_line(&mut self, line: &str);

    /// Current scroll geometry. `scroll_height` must never be smaller than
    /// `offset_height`.
    fn metrics(&self) -> ScrollMetrics;

    /// Move the viewport. Implementations clamp to their scrollable range.
    fn set_scroll_top(&mut self, scroll_top: f32);

    /// Whether appended lines only take their final size after a layout
    /// pass. Surfaces without layout skip the reflow wait.
    fn needs_reflow(&self) -> bool {
        true
    }

    /// Whether the surface can no longer show lines. A poller stops once its
    /// surface is closed.
    fn is_closed(&self) -> bool {
        false
    }
}

/// In-memory surface backing the GUI log view.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    /// Height of one rendered row including spacing.
    line_height: f32,
    viewport_height: f32,
    /// Rows and content height the view last laid out. Rows appended since
    /// then are assumed to add `line_height` each.
    measured_rows: usize,
    measured_height: f32,
    scroll_top: f32,
    /// Set by `set_scroll_top`; consumed by the view on its next frame.
    scroll_request: Option<f32>,
}

impl LineBuffer {
    pub fn new(line_height: f32, viewport_height: f32) -> Self {
        Self {
            lines: Vec::new(),
            line_height: line_height.max(1.0),
            viewport_height: viewport_height.max(0.0),
            measured_rows: 0,
            measured_height: 0.0,
            scroll_top: 0.0,
            scroll_request: None,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Total height of all rows: the last measured height plus an estimate
    /// for rows the view has not laid out yet.
    pub fn content_height(&self) -> f32 {
        let unmeasured = self.lines.len().saturating_sub(self.measured_rows);
        self.measured_height + unmeasured as f32 * self.line_height
    }

    /// Record the geometry the view actually laid out this frame.
    pub fn set_layout(&mut self, line_height: f32, viewport_height: f32) {
        self.line_height = line_height.max(1.0);
        self.viewport_height = viewport_height.max(0.0);
    }

    /// Record the content height the view produced for its first `rows`
    /// lines. The scroll range is taken from this, so it matches the range
    /// the view clamps offsets to.
    pub fn record_content(&mut self, rows: usize, height: f32) {
        self.measured_rows = rows.min(self.lines.len());
        self.measured_height = height.max(0.0);
    }

    /// Record a scroll offset the user produced (wheel, drag, keyboard).
    pub fn record_scroll(&mut self, scroll_top: f32) {
        self.scroll_top = scroll_top;
    }

    /// Take the pending programmatic scroll, if any.
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        self.scroll_request.take()
    }

    fn max_scroll_top(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_FONT_SIZE + 4.0,
            constants::DEFAULT_VIEWPORT_HEIGHT,
        )
    }
}

impl DisplaySurface for LineBuffer {
    fn append_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top,
            scroll_height: self.content_height().max(self.viewport_height),
            offset_height: self.viewport_height,
        }
    }

    fn set_scroll_top(&mut self, scroll_top: f32) {
        let clamped = scroll_top.clamp(0.0, self.max_scroll_top());
        self.scroll_top = clamped;
        self.scroll_request = Some(clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        buf.append_line("a");
        buf.append_line("b");
        assert_eq!(buf.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(buf.content_height(), 20.0);
    }

    #[test]
    fn test_scroll_height_never_below_viewport() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        buf.append_line("only");
        let m = buf.metrics();
        assert_eq!(m.scroll_height, 100.0);
        assert!(m.is_at_bottom(1.0));
    }

    #[test]
    fn test_set_scroll_top_clamps_and_queues_request() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        for i in 0..30 {
            buf.append_line(&format!("line {i}"));
        }
        buf.set_scroll_top(10_000.0);
        assert_eq!(buf.metrics().scroll_top, 200.0);
        assert_eq!(buf.take_scroll_request(), Some(200.0));
        assert_eq!(buf.take_scroll_request(), None);

        buf.set_scroll_top(-5.0);
        assert_eq!(buf.metrics().scroll_top, 0.0);
    }

    #[test]
    fn test_record_scroll_does_not_queue_request() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        buf.record_scroll(42.0);
        assert_eq!(buf.metrics().scroll_top, 42.0);
        assert_eq!(buf.take_scroll_request(), None);
    }

    #[test]
    fn test_set_layout_changes_geometry() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        for _ in 0..20 {
            buf.append_line("x");
        }
        buf.set_layout(20.0, 50.0);
        let m = buf.metrics();
        assert_eq!(m.scroll_height, 400.0);
        assert_eq!(m.offset_height, 50.0);
        assert_eq!(m.bottom_offset(), 350.0);
    }

    #[test]
    fn test_measured_content_height_sets_scroll_range() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        for _ in 0..20 {
            buf.append_line("x");
        }
        // The view lays out rows with spacing between them, not after the
        // last one, so its height is shorter than rows * line_height.
        buf.record_content(20, 197.0);
        assert_eq!(buf.content_height(), 197.0);
        assert_eq!(buf.metrics().bottom_offset(), 97.0);

        buf.set_scroll_top(10_000.0);
        assert_eq!(buf.metrics().scroll_top, 97.0);
        assert!(buf.metrics().is_at_bottom(0.0));
    }

    #[test]
    fn test_rows_appended_after_measurement_are_estimated() {
        let mut buf = LineBuffer::new(10.0, 100.0);
        for _ in 0..20 {
            buf.append_line("x");
        }
        buf.record_content(20, 197.0);
        buf.append_line("y");
        buf.append_line("z");
        assert_eq!(buf.content_height(), 217.0);
    }
}
