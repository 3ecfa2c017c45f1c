//! Command Line Interface (CLI) layer for LIDARTERRAIN.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-frame and sequence
//! rendering. It wires user-provided options to the library functionality
//! exposed via `lidarterrain::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
