//! Diagnostics core for `warden`'s installation doctor: checkers, fixers,
//! and the engine/registry/reporter/runner that tie them together.
//!
//! This crate is a plain library — no scripting-language bindings, no CLI
//! framing. `doctor_cli` is the thin binary that wires this core to a
//! terminal.

pub mod atomic;
pub mod checkers;
pub mod config;
pub mod ctx;
pub mod engine;
pub mod external;
pub mod fixers;
pub mod registry;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod settings;
pub mod xdg;
