// Logrep - core/mod.rs
//
// Core business logic layer: the contextual match engine and its parts.
// Must NOT depend on: app or platform. File contents arrive as `BufRead`.

pub mod context;
pub mod discovery;
pub mod engine;
pub mod export;
pub mod model;
pub mod parser;
pub mod time_gate;
pub mod version;
