// HiveTail - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the UI panels and manages the poller lifecycle.

use crate::app::client::LogSource;
use crate::app::state::AppState;
use crate::app::tail::{start_log, PollHandle, TailConfig};
use crate::core::model::NodeId;
use crate::ui;
use crate::util::constants;
use std::sync::Arc;
use std::time::Duration;

/// The HiveTail application.
pub struct HiveTailApp {
    pub state: AppState,
    source: Arc<dyn LogSource>,
    poller: Option<PollHandle>,
}

impl HiveTailApp {
    pub fn new(state: AppState, source: Arc<dyn LogSource>) -> Self {
        Self {
            state,
            source,
            poller: None,
        }
    }

    /// Follow the node named in the toolbar, replacing any running poller.
    fn start_tail(&mut self) {
        let node = match NodeId::parse(&self.state.node_input) {
            Ok(node) => node,
            Err(e) => {
                self.state.status_message = format!("Cannot follow: {e}");
                return;
            }
        };

        if let Some(previous) = self.poller.take() {
            previous.stop();
        }

        let surface = self.state.begin_session(node.as_str());
        let config = TailConfig::from_app_config(&self.state.config);
        self.poller = Some(start_log(node, surface, Arc::clone(&self.source), config));
    }

    fn stop_tail(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.state.end_session();
    }
}

impl eframe::App for HiveTailApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll live tail progress.
        if let Some(poller) = &self.poller {
            for msg in poller.poll_progress(constants::MAX_TAIL_MESSAGES_PER_FRAME) {
                self.state.apply_progress(msg);
            }
        }

        // ---- Handle flags set by the toolbar ----
        if self.state.request_start_tail {
            self.state.request_start_tail = false;
            self.start_tail();
        }
        if self.state.request_stop_tail {
            self.state.request_stop_tail = false;
            self.stop_tail();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::panels::toolbar::render(ui, &mut self.state);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::status_bar::render(ui, &self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::log_view::render(ui, &self.state);
        });

        ui::panels::about::render(ctx, &mut self.state);

        // Keep repainting while a tail is active so new lines and
        // snap-to-bottom requests from the poll thread appear promptly.
        if self.state.tail_active {
            ctx.request_repaint_after(Duration::from_millis(constants::TAIL_REPAINT_INTERVAL_MS));
        }
    }
}
