// Logrep - platform/mod.rs
//
// Platform abstraction layer: config directories, config.toml, output sinks.
// Dependencies: standard library, directories crate, util.
// Must NOT depend on: core, app.

pub mod config;
pub mod fs;
