// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The run loop talks to a `ProcessBackend` instead of spawning processes
//! directly, so tests can swap in a backend that replays scripted events
//! while production uses [`TokioProcessBackend`].

use crate::errors::Result;
use crate::exec::runner::{RunHandle, spawn_process};

/// Trait abstracting how the external process is launched.
pub trait ProcessBackend: Send {
    /// Launch `program` with `payload` as its only argument.
    ///
    /// Errors mean the process never started; no events follow.
    fn launch(&mut self, program: &str, payload: &str) -> Result<RunHandle>;
}

/// Real backend: spawns an OS process via `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessBackend;

impl ProcessBackend for TokioProcessBackend {
    fn launch(&mut self, program: &str, payload: &str) -> Result<RunHandle> {
        spawn_process(program, payload)
    }
}
