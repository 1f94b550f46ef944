// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod target;
pub mod task;
pub mod types;

use std::io::Write;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, ConfigOverrides, load_raw_or_default};
use crate::errors::Result;
use crate::exec::{ProcessBackend, RunSummary, TokioProcessBackend, relay_events};
use crate::task::{build_tasks, encode_payload};

/// Knobs for [`execute`] that don't come from the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Kill the external process when Ctrl-C is received.
    pub cancel_on_ctrl_c: bool,
}

/// Result of a CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    DryRun { payload: String },
    Finished(RunSummary),
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunReport::DryRun { .. } => 0,
            RunReport::Finished(summary) => summary.termination.process_exit_code(),
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - task building and payload encoding
/// - launching the external process
/// - relaying its output to stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<RunReport> {
    let cfg = resolve_config(args.config.as_deref(), &args.overrides())?;

    if args.dry_run {
        let payload = payload_for(&cfg)?;
        print_dry_run(&cfg, &payload);
        return Ok(RunReport::DryRun { payload });
    }

    let mut backend = TokioProcessBackend;
    let mut stdout = std::io::stdout();
    let options = RunOptions {
        cancel_on_ctrl_c: true,
    };

    let summary = execute(&cfg, &mut backend, &mut stdout, options).await?;
    Ok(RunReport::Finished(summary))
}

/// Load the config file (if any), apply overrides and validate.
pub fn resolve_config(
    path: Option<&std::path::Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw = load_raw_or_default(path)?;
    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

/// Build the task list for `cfg` and encode it.
pub fn payload_for(cfg: &ConfigFile) -> Result<String> {
    let tasks = build_tasks(&cfg.run.hosts, &cfg.run.login, &cfg.frecklet);
    info!(
        hosts = ?cfg.run.hosts,
        frecklet = cfg.frecklet.name(),
        tasks = tasks.len(),
        "built task list"
    );
    encode_payload(&tasks, cfg.run.envelope)
}

/// Build the payload, launch the external process through `backend` and
/// relay its events to `out` until it terminates.
pub async fn execute<B, W>(
    cfg: &ConfigFile,
    backend: &mut B,
    out: &mut W,
    options: RunOptions,
) -> Result<RunSummary>
where
    B: ProcessBackend,
    W: Write,
{
    let payload = payload_for(cfg)?;
    debug!(payload = %payload, "task payload");

    let mut handle = backend.launch(&cfg.run.executable, &payload)?;

    if options.cancel_on_ctrl_c {
        if let Some(canceller) = handle.take_canceller() {
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                info!("Ctrl+C received; cancelling external process");
                canceller.cancel();
            });
        }
    }

    let summary = relay_events(&mut handle, out).await?;
    info!(
        stdout_chunks = summary.stdout_chunks,
        stderr_chunks = summary.stderr_chunks,
        termination = ?summary.termination,
        "run finished"
    );
    Ok(summary)
}

/// Simple dry-run output: settings, targets and the payload.
fn print_dry_run(cfg: &ConfigFile, payload: &str) {
    println!("frecklaunch dry-run");
    println!("  run.executable = {}", cfg.run.executable);
    println!("  run.login = {}", cfg.run.login);
    println!("  run.envelope = {:?}", cfg.run.envelope);
    println!("  frecklet = {}", cfg.frecklet.name());
    println!();

    println!("targets ({}):", cfg.run.hosts.len());
    for host in cfg.run.hosts.iter() {
        println!("  - {}@{host}", cfg.run.login);
    }
    println!();

    println!("payload:");
    println!("{payload}");

    debug!("dry-run complete (no execution)");
}
