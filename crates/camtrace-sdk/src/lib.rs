//! Public, stable API over the camtrace analysis core.
//!
//! This crate is a facade: [`Trace`] wraps a loaded [`camtrace_types::TraceModel`]
//! and exposes every `camtrace-engine` stage as a method, and [`ScenarioFile`]
//! loads the JSON scenario config format (string shorthand or full step
//! objects) into the [`camtrace_types::Scenario`] the engine expects.

pub mod client;
pub mod error;
pub mod scenario_file;

pub use client::Trace;
pub use error::{Error, Result};
pub use scenario_file::ScenarioFile;

pub use camtrace_runtime::{load_in_background, run_parallel, CancellationToken};
pub use camtrace_types::{AnalysisConfig, Direction, Scenario, ScenarioStep};
