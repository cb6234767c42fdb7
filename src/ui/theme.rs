// HiveTail - ui/theme.rs
//
// Colour scheme, visuals and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Status indicator colours.
pub const STATUS_FOLLOWING: Color32 = Color32::from_rgb(34, 197, 94); // Green 500
pub const STATUS_RETRYING: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600
pub const STATUS_IDLE: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500

/// Layout constants.
pub const NODE_FIELD_WIDTH: f32 = 220.0;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;

/// Colour of the status dot for the current tail state.
pub fn status_colour(tail_active: bool, consecutive_failures: u32) -> Color32 {
    match (tail_active, consecutive_failures) {
        (false, _) => STATUS_IDLE,
        (true, 0) => STATUS_FOLLOWING,
        (true, _) => STATUS_RETRYING,
    }
}

/// Log line colour: near-white in dark mode, near-black in light mode.
pub fn line_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(229, 231, 235) // Gray 200
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Apply the configured theme and font size to the egui context.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    ctx.set_visuals(if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });

    let mut style = (*ctx.style()).clone();
    style
        .text_styles
        .insert(egui::TextStyle::Body, egui::FontId::proportional(font_size));
    style
        .text_styles
        .insert(egui::TextStyle::Button, egui::FontId::proportional(font_size));
    // Monospace runs slightly smaller so log lines fit more columns.
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::monospace((font_size - 1.5).max(8.0)),
    );
    ctx.set_style(style);
}
