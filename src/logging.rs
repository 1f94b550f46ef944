// src/logging.rs

//! Logging setup for `frecklaunch`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (one level for everything)
//! 2. `FRECKLAUNCH_LOG`, either a bare level (`debug`, `warning`) or
//!    `tracing` directives such as `frecklaunch::exec=debug,info`
//! 3. `info`
//!
//! Everything goes to stderr: stdout belongs to the relayed `stdout: ...` /
//! `stderr: ...` lines and the exit line, which callers may pipe or parse.

use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "FRECKLAUNCH_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    if let Some(value) = rejected {
        warn!(var = LOG_ENV, value = %value, "invalid log filter; falling back to info");
    }
    Ok(())
}

/// Build the filter, returning the env value too if it had to be ignored.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(lvl) = cli_level {
        return (EnvFilter::new(level_directive(lvl)), None);
    }

    let Some(spec) = env.map(str::trim).filter(|s| !s.is_empty()) else {
        return (EnvFilter::new(DEFAULT_FILTER), None);
    };

    if let Some(lvl) = parse_level_str(spec) {
        return (EnvFilter::new(level_directive(lvl)), None);
    }

    match EnvFilter::try_new(spec) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new(DEFAULT_FILTER), Some(spec.to_string())),
    }
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<LogLevel> {
    match s.to_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    fn hint(cli: Option<LogLevel>, env: Option<&str>) -> (Option<LevelFilter>, Option<String>) {
        let (filter, rejected) = build_filter(cli, env);
        (filter.max_level_hint(), rejected)
    }

    #[test]
    fn cli_flag_wins_over_env() {
        assert_eq!(
            hint(Some(LogLevel::Error), Some("trace")),
            (Some(LevelFilter::ERROR), None)
        );
    }

    #[test]
    fn env_accepts_lenient_levels_and_directives() {
        assert_eq!(hint(None, Some(" WARNING ")), (Some(LevelFilter::WARN), None));
        assert_eq!(
            hint(None, Some("frecklaunch::exec=debug,warn")),
            (Some(LevelFilter::DEBUG), None)
        );
    }

    #[test]
    fn unset_or_invalid_env_falls_back_to_info() {
        assert_eq!(hint(None, None), (Some(LevelFilter::INFO), None));
        assert_eq!(hint(None, Some("  ")), (Some(LevelFilter::INFO), None));
        assert_eq!(
            hint(None, Some("frecklaunch=loud")),
            (Some(LevelFilter::INFO), Some("frecklaunch=loud".to_string()))
        );
    }
}
