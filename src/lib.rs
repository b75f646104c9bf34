// Logrep - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// programmatic use. The binary in `main.rs` is a thin CLI over this.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
