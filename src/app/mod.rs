// HiveTail - app/mod.rs
//
// Application layer: HTTP access, the live-tail poller, headless mode and
// GUI state.
// Dependencies: core layer, util.
// Must NOT depend on: ui.

pub mod client;
pub mod headless;
pub mod state;
pub mod tail;
