//! Development-time diagnostics.
//!
//! Arbor itself only emits `tracing` events. This module installs a subscriber that prints
//! them, and a panic hook that routes panics (including the leaf `body` contract
//! violation) through the same output.

pub mod logging;

pub use logging::{install_panic_hook, install_tracing, set_log_level};
