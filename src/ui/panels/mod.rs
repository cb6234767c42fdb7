// HiveTail - ui/panels/mod.rs

pub mod about;
pub mod log_view;
pub mod status_bar;
pub mod toolbar;
