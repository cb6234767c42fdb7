// HiveTail - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, serde.
// Must NOT depend on: ui, platform, app, or any I/O crate directly.

pub mod backoff;
pub mod model;
pub mod scroll;
pub mod surface;
