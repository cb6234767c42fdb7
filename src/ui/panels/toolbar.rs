// HiveTail - ui/panels/toolbar.rs
//
// Top bar: node name field, Follow/Stop, and the About button.
// Only sets request flags on `AppState`; the app acts on them.

use crate::app::state::AppState;
use crate::ui::theme;

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label("Node:");
        let field = ui.add_enabled(
            !state.tail_active,
            egui::TextEdit::singleline(&mut state.node_input)
                .hint_text("node name")
                .desired_width(theme::NODE_FIELD_WIDTH),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if state.tail_active {
            if ui
                .button("\u{23f9} Stop")
                .on_hover_text("Stop following this node")
                .clicked()
            {
                state.request_stop_tail = true;
            }
        } else {
            let can_start = !state.node_input.trim().is_empty();
            let follow = ui
                .add_enabled(can_start, egui::Button::new("\u{25b6} Follow"))
                .on_hover_text("Stream this node's log");
            if can_start && (follow.clicked() || submitted) {
                state.request_start_tail = true;
            }
        }

        ui.separator();
        ui.label(egui::RichText::new(&state.config.base_url).small().weak());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("\u{24d8}").on_hover_text("About HiveTail").clicked() {
                state.show_about = true;
            }
        });
    });
}
