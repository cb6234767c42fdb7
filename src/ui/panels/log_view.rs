// HiveTail - ui/panels/log_view.rs
//
// Virtual-scrolling view of the followed node's log.
//
// Uses `ScrollArea::show_rows`, so only visible rows are laid out regardless
// of how long the log grows. The view and the poll thread share the
// `LineBuffer`:
//   - each frame the view writes back the row height, viewport height,
//     content height and scroll offset it actually rendered, so the poller's
//     "was the user at the bottom?" check uses the same scroll range egui
//     clamps to;
//   - a snap-to-bottom requested by the poller is applied here on the next
//     frame via `vertical_scroll_offset`.
// The buffer lock is held for the whole frame so a poller update cannot land
// between reading the request and recording the resulting offset.

use crate::app::state::AppState;
use crate::core::surface::lock_surface;
use crate::ui::theme;
use std::sync::Arc;

/// Render the log panel (central area).
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let surface = Arc::clone(&state.surface);
    let mut buffer = lock_surface(&surface);

    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    let line_height = row_height + ui.spacing().item_spacing.y;

    if buffer.is_empty() {
        buffer.set_layout(line_height, ui.available_height());
        buffer.record_content(0, 0.0);
        ui.centered_and_justified(|ui| {
            match (&state.active_node, state.tail_active) {
                (Some(node), true) => ui.label(format!("Waiting for log lines from {node}\u{2026}")),
                (Some(node), false) => ui.label(format!("No log lines received from {node}.")),
                (None, _) => ui.label("No node selected.\nEnter a node name above and press Follow."),
            };
        });
        return;
    }

    let mut area = egui::ScrollArea::both().auto_shrink([false; 2]);
    if let Some(offset) = buffer.take_scroll_request() {
        area = area.vertical_scroll_offset(offset);
    }

    let colour = theme::line_text_colour(state.config.dark_mode);
    let total = buffer.len();
    let output = area.show_rows(ui, row_height, total, |ui, rows| {
        for line in buffer.lines().iter().skip(rows.start).take(rows.len()) {
            ui.add(
                egui::Label::new(egui::RichText::new(line).monospace().color(colour))
                    .wrap_mode(egui::TextWrapMode::Extend),
            );
        }
    });

    buffer.set_layout(line_height, output.inner_rect.height());
    buffer.record_content(total, output.content_size.y);
    buffer.record_scroll(output.state.offset.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::LogSource;
    use crate::app::tail::poll_cycle;
    use crate::core::model::{LogChunk, NodeId};
    use crate::core::scroll::ScrollPolicy;
    use crate::core::surface::DisplaySurface;
    use crate::platform::config::AppConfig;
    use crate::util::error::FetchError;
    use std::sync::atomic::AtomicI64;
    use std::time::Duration;

    /// Answers every request with one new line.
    struct OneLinePerPoll;

    impl LogSource for OneLinePerPoll {
        fn fetch_log(&self, _node: &NodeId, position: i64) -> Result<LogChunk, FetchError> {
            let position = position.max(0);
            Ok(LogChunk {
                content: vec![format!("line {position}")],
                position: position + 1,
            })
        }
    }

    fn screen() -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
            )),
            ..Default::default()
        }
    }

    fn frame(ctx: &egui::Context, state: &AppState) {
        let _ = ctx.run(screen(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| render(ui, state));
        });
    }

    fn session_with_lines(n: usize) -> AppState {
        let mut state = AppState::new(AppConfig::default(), false);
        let surface = state.begin_session("worker");
        let mut buffer = lock_surface(&surface);
        for i in 0..n {
            buffer.append_line(&format!("seed {i}"));
        }
        drop(buffer);
        state
    }

    fn instant_scroll() -> ScrollPolicy {
        ScrollPolicy {
            tolerance: 1.0,
            reflow_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_view_reports_scroll_range_it_clamps_to() {
        let ctx = egui::Context::default();
        let state = session_with_lines(200);
        frame(&ctx, &state);

        // Ask for far past the end; the view clamps and records the result.
        lock_surface(&state.surface).set_scroll_top(1.0e6);
        frame(&ctx, &state);
        frame(&ctx, &state);

        let metrics = lock_surface(&state.surface).metrics();
        assert!(metrics.scroll_top > 0.0);
        assert!(
            metrics.is_at_bottom(0.5),
            "scroll_top={} bottom_offset={}",
            metrics.scroll_top,
            metrics.bottom_offset()
        );
    }

    #[test]
    fn test_keeps_following_across_many_cycles() {
        let ctx = egui::Context::default();
        let state = session_with_lines(200);
        let node = NodeId::parse("worker").unwrap();
        let cursor = AtomicI64::new(200);
        frame(&ctx, &state);
        lock_surface(&state.surface).set_scroll_top(1.0e6);
        frame(&ctx, &state);

        for cycle in 0..5 {
            let report = poll_cycle(
                &node,
                &cursor,
                &state.surface,
                &OneLinePerPoll,
                &instant_scroll(),
            )
            .unwrap();
            assert!(report.snapped, "cycle {cycle} stopped following");
            frame(&ctx, &state);
            frame(&ctx, &state);

            let metrics = lock_surface(&state.surface).metrics();
            assert!(
                metrics.is_at_bottom(1.0),
                "cycle {cycle}: scroll_top={} bottom_offset={}",
                metrics.scroll_top,
                metrics.bottom_offset()
            );
        }
        assert_eq!(lock_surface(&state.surface).len(), 205);
    }

    #[test]
    fn test_scrolled_up_view_stops_following() {
        let ctx = egui::Context::default();
        let state = session_with_lines(200);
        let node = NodeId::parse("worker").unwrap();
        let cursor = AtomicI64::new(200);
        frame(&ctx, &state);

        // Follow once, then move to the top as a user reading back would.
        lock_surface(&state.surface).set_scroll_top(1.0e6);
        frame(&ctx, &state);
        lock_surface(&state.surface).set_scroll_top(0.0);
        frame(&ctx, &state);
        frame(&ctx, &state);

        let report = poll_cycle(
            &node,
            &cursor,
            &state.surface,
            &OneLinePerPoll,
            &instant_scroll(),
        )
        .unwrap();
        assert!(!report.snapped);
        frame(&ctx, &state);

        let buffer = lock_surface(&state.surface);
        assert_eq!(buffer.metrics().scroll_top, 0.0);
        assert_eq!(buffer.len(), 201);
    }
}
