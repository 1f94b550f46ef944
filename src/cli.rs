// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `frecklaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "frecklaunch",
    version,
    about = "Build a freckles task list for a set of hosts and run it.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Frecklaunch.toml` in the current working directory if it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host to run against (repeatable). Replaces `[run].hosts`.
    ///
    /// There is no default host: with no `--host` and no `[run].hosts`,
    /// the executable is launched with an empty task list (`[]`).
    #[arg(long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Login prefixed to every host. Overrides `[run].login`.
    #[arg(long, value_name = "USER")]
    pub login: Option<String>,

    /// Executable to launch. Overrides `[run].executable`.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<String>,

    /// Payload shape: `plain` or `frecklecute`. Overrides `[run].envelope`.
    #[arg(long, value_name = "ENVELOPE")]
    pub envelope: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FRECKLAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the payload, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            hosts: self.hosts.clone(),
            login: self.login.clone(),
            executable: self.executable.clone(),
            envelope: self.envelope.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
