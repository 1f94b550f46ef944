// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] launches the external process with `tokio::process::Command`
//!   and turns its output and exit into a stream of [`RunEvent`]s.
//! - [`relay`] writes those events to the console.
//! - [`backend`] provides the `ProcessBackend` trait so tests can replace the
//!   real process launcher.

pub mod backend;
pub mod relay;
pub mod runner;

pub use backend::{ProcessBackend, TokioProcessBackend};
pub use relay::{RunSummary, Termination, relay_events};
pub use runner::{Canceller, ExitOutcome, RunEvent, RunHandle, StreamKind, spawn_process};
