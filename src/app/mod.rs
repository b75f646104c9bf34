// Logrep - app/mod.rs
//
// Application layer: the scan pipeline that feeds files on disk to the
// core match engine.
// Dependencies: core layer.

pub mod scan;
pub mod settings;
