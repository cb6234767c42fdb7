// HiveTail - app/state.rs
//
// Application state for the GUI. Holds the current node, the shared log
// surface, and everything the status bar displays.
// Owned by the eframe::App implementation.

use crate::core::model::TailProgress;
use crate::core::surface::{LineBuffer, SharedSurface};
use crate::platform::config::AppConfig;
use crate::util::constants;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Validated configuration.
    pub config: AppConfig,

    /// Text in the node name field.
    pub node_input: String,

    /// Node currently being followed (None when idle).
    pub active_node: Option<String>,

    /// Lines of the current node's log, shared with the poll thread.
    pub surface: SharedSurface<LineBuffer>,

    /// Whether a poller is running.
    pub tail_active: bool,

    /// Cursor after the most recent successful poll.
    pub cursor: Option<i64>,

    /// Local time of the most recent successful poll.
    pub last_update: Option<DateTime<Local>>,

    /// Failed polls since the last success.
    pub consecutive_failures: u32,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings (config problems, poll failures).
    pub warnings: Vec<String>,

    /// Whether to show the About dialog.
    pub show_about: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    /// Set by the toolbar; consumed by the app's update loop.
    pub request_start_tail: bool,

    /// Set by the toolbar; consumed by the app's update loop.
    pub request_stop_tail: bool,
}

impl AppState {
    pub fn new(config: AppConfig, debug_mode: bool) -> Self {
        Self {
            config,
            node_input: String::new(),
            active_node: None,
            surface: Arc::new(Mutex::new(LineBuffer::default())),
            tail_active: false,
            cursor: None,
            last_update: None,
            consecutive_failures: 0,
            status_message: "Ready. Enter a node name and press Follow.".to_string(),
            warnings: Vec::new(),
            show_about: false,
            debug_mode,
            request_start_tail: false,
            request_stop_tail: false,
        }
    }

    /// Replace the surface with an empty one for a new node and return a
    /// handle to it for the poller.
    pub fn begin_session(&mut self, node: &str) -> SharedSurface<LineBuffer> {
        self.surface = Arc::new(Mutex::new(LineBuffer::default()));
        self.active_node = Some(node.to_string());
        self.tail_active = true;
        self.cursor = None;
        self.last_update = None;
        self.consecutive_failures = 0;
        self.status_message = format!("Following {node}\u{2026}");
        Arc::clone(&self.surface)
    }

    /// Mark the session as stopped. The lines already fetched stay visible.
    pub fn end_session(&mut self) {
        self.tail_active = false;
        self.status_message = match &self.active_node {
            Some(node) => format!("Stopped following {node}."),
            None => "Stopped.".to_string(),
        };
    }

    /// Push a warning, dropping the oldest once the cap is reached.
    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() >= constants::MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(message);
    }

    /// Fold one progress message from the poller into the state.
    pub fn apply_progress(&mut self, msg: TailProgress) {
        match msg {
            TailProgress::Started { node } => {
                tracing::debug!(node = %node, "Poller running");
            }
            TailProgress::Chunk { position, .. } => {
                if self.consecutive_failures > 0 {
                    if let Some(node) = &self.active_node {
                        self.status_message = format!("Following {node}. Connection restored.");
                    }
                }
                self.cursor = Some(position);
                self.last_update = Some(Local::now());
                self.consecutive_failures = 0;
            }
            TailProgress::PollFailed {
                error,
                consecutive_failures,
                retry_in,
                ..
            } => {
                self.consecutive_failures = consecutive_failures;
                self.status_message = format!(
                    "Poll failed ({consecutive_failures}x), retrying in {:.1}s: {error}",
                    retry_in.as_secs_f64()
                );
                self.push_warning(error);
            }
            TailProgress::Stopped => self.end_session(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::NodeId;
    use crate::core::surface::{lock_surface, DisplaySurface};
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), false)
    }

    #[test]
    fn test_begin_session_replaces_surface() {
        let mut st = state();
        let first = st.begin_session("a");
        lock_surface(&first).append_line("old");

        let second = st.begin_session("b");
        assert!(lock_surface(&second).is_empty());
        assert!(lock_surface(&st.surface).is_empty());
        assert_eq!(st.active_node.as_deref(), Some("b"));
        assert!(st.tail_active);
    }

    #[test]
    fn test_chunk_updates_cursor_and_clears_failures() {
        let mut st = state();
        st.begin_session("n");
        st.consecutive_failures = 3;
        st.apply_progress(TailProgress::Chunk {
            requested: -100,
            position: 42,
            appended: 2,
            snapped: true,
        });
        assert_eq!(st.cursor, Some(42));
        assert_eq!(st.consecutive_failures, 0);
        assert!(st.last_update.is_some());
    }

    #[test]
    fn test_failure_sets_status_and_warning() {
        let mut st = state();
        st.begin_session("n");
        st.apply_progress(TailProgress::PollFailed {
            requested: 42,
            error: "GET x returned 500 Internal Server Error".to_string(),
            consecutive_failures: 2,
            retry_in: Duration::from_secs(6),
        });
        assert_eq!(st.consecutive_failures, 2);
        assert!(st.status_message.contains("retrying in 6.0s"));
        assert_eq!(st.warnings.len(), 1);
        assert_eq!(st.cursor, None);
    }

    #[test]
    fn test_stopped_ends_session() {
        let mut st = state();
        st.begin_session("n");
        st.apply_progress(TailProgress::Started {
            node: NodeId::parse("n").unwrap(),
        });
        st.apply_progress(TailProgress::Stopped);
        assert!(!st.tail_active);
        assert_eq!(st.status_message, "Stopped following n.");
    }

    #[test]
    fn test_warnings_are_capped() {
        let mut st = state();
        for i in 0..constants::MAX_WARNINGS + 5 {
            st.push_warning(format!("w{i}"));
        }
        assert_eq!(st.warnings.len(), constants::MAX_WARNINGS);
        assert_eq!(st.warnings[0], "w5");
    }
}
