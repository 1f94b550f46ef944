// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile, RunSection, RunSettings};
use crate::errors::{FrecklaunchError, Result};
use crate::target::{is_valid_user, parse_target};
use crate::task::{Frecklet, VarMap, VarValue, dedupe_hosts};
use crate::types::Envelope;

/// Run semantic validation against a raw configuration and produce the
/// validated [`ConfigFile`].
///
/// This checks:
/// - `executable` is non-empty
/// - `login` is a valid user name
/// - every host is non-empty, has no login of its own, and `login@host`
///   parses as a target
/// - `envelope` is valid ("plain" or "frecklecute")
/// - the frecklet name and, for frecklets we know, its options
/// - every option value has a JSON form (no TOML datetimes, no NaN/inf)
///
/// An empty host list is allowed (there is no default host) and only logs a
/// warning.
pub fn validate_config(raw: RawConfigFile) -> Result<ConfigFile> {
    let run = validate_run(raw.run)?;
    let vars = vars_from_toml(raw.frecklet.vars)?;
    let frecklet = Frecklet::from_parts(&raw.frecklet.name, vars)?;
    Ok(ConfigFile { run, frecklet })
}

fn validate_run(run: RunSection) -> Result<RunSettings> {
    let executable = run.executable.trim();
    if executable.is_empty() {
        return Err(FrecklaunchError::ConfigError(
            "[run].executable must not be empty".to_string(),
        ));
    }

    if !is_valid_user(&run.login) {
        return Err(FrecklaunchError::ConfigError(format!(
            "[run].login '{}' is not a valid user name",
            run.login
        )));
    }

    if run.hosts.is_empty() {
        warn!("no hosts configured; the task list will be empty");
    }
    for host in run.hosts.iter() {
        validate_host(&run.login, host)?;
    }

    let hosts = if run.dedupe_hosts {
        dedupe_hosts(&run.hosts)
    } else {
        if dedupe_hosts(&run.hosts).len() != run.hosts.len() {
            warn!(
                hosts = ?run.hosts,
                "host list contains duplicates and dedupe_hosts = false; targets will repeat"
            );
        }
        run.hosts
    };

    let envelope = run
        .envelope
        .parse::<Envelope>()
        .map_err(|e| FrecklaunchError::ConfigError(format!("[run].envelope: {e}")))?;

    Ok(RunSettings {
        executable: executable.to_string(),
        login: run.login,
        hosts,
        envelope,
    })
}

fn validate_host(login: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(FrecklaunchError::ConfigError(
            "[run].hosts contains an empty host".to_string(),
        ));
    }
    if host.contains('@') {
        return Err(FrecklaunchError::ConfigError(format!(
            "host '{host}' must not contain a login; set [run].login instead"
        )));
    }
    parse_target(&format!("{login}@{host}"))?;
    Ok(())
}

fn vars_from_toml(table: toml::Table) -> Result<VarMap> {
    table
        .into_iter()
        .map(|(key, value)| {
            let path = format!("[frecklet.vars].{key}");
            Ok((key, var_from_toml(&path, value)?))
        })
        .collect()
}

fn var_from_toml(path: &str, value: toml::Value) -> Result<VarValue> {
    let var = match value {
        toml::Value::String(s) => VarValue::Str(s),
        toml::Value::Integer(i) => VarValue::Int(i),
        toml::Value::Float(f) => VarValue::Float(f),
        toml::Value::Boolean(b) => VarValue::Bool(b),
        toml::Value::Datetime(dt) => {
            return Err(FrecklaunchError::ConfigError(format!(
                "{path}: TOML datetime {dt} has no JSON form; quote it as a string"
            )));
        }
        toml::Value::Array(items) => VarValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| var_from_toml(&format!("{path}[{i}]"), item))
                .collect::<Result<_>>()?,
        ),
        toml::Value::Table(table) => VarValue::Map(
            table
                .into_iter()
                .map(|(key, item)| {
                    let nested = format!("{path}.{key}");
                    Ok((key, var_from_toml(&nested, item)?))
                })
                .collect::<Result<_>>()?,
        ),
    };
    Ok(var)
}
