// src/target.rs

//! Target strings (`user@host`, `ssh://user@host:22`, `docker::web`, ...).
//!
//! The external tool accepts a small grammar for targets:
//!
//! - `[protocol://][user@]host[:port]` for plain SSH-style hosts
//! - `docker::[user@]container` for docker containers (user defaults to `root`)
//! - `lxd::container` for lxd containers (always `root`)
//!
//! We only parse and validate here; connecting is the external tool's job.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::errors::{FrecklaunchError, Result};

static HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("static host regex")
});

static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("static user regex"));

/// How the external tool connects to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Ssh,
    Docker,
    Lxd,
}

/// The parts of a parsed target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDetails {
    pub connection: ConnectionKind,
    pub protocol: Option<String>,
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

/// True if `host` is a plain hostname, container name or IPv4 address.
pub fn is_valid_host(host: &str) -> bool {
    HOST_RE.is_match(host)
}

/// True if `user` looks like a POSIX login name.
pub fn is_valid_user(user: &str) -> bool {
    USER_RE.is_match(user)
}

/// Parse a target string into its parts.
pub fn parse_target(target: &str) -> Result<TargetDetails> {
    let target = target.trim();
    if target.is_empty() {
        return Err(FrecklaunchError::InvalidTarget(
            "empty target string".to_string(),
        ));
    }

    if let Some((kind, rest)) = target.split_once("::") {
        return match kind {
            "docker" => parse_docker(target, rest),
            "lxd" => parse_lxd(target, rest),
            other => Err(FrecklaunchError::InvalidTarget(format!(
                "unknown connection type '{other}' in '{target}'"
            ))),
        };
    }

    parse_ssh(target)
}

fn parse_ssh(target: &str) -> Result<TargetDetails> {
    let (protocol, rest) = match target.split_once("://") {
        Some((p, rest)) => (Some(p.to_string()), rest),
        None => (None, target),
    };

    let (user, rest) = split_user(target, rest)?;

    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port)) => (host, Some(parse_port(target, port)?)),
        None => (rest, None),
    };

    check_host(target, host)?;

    Ok(TargetDetails {
        connection: ConnectionKind::Ssh,
        protocol,
        user,
        host: host.to_string(),
        port,
    })
}

fn parse_docker(target: &str, rest: &str) -> Result<TargetDetails> {
    let (user, host) = split_user(target, rest)?;
    check_host(target, host)?;

    Ok(TargetDetails {
        connection: ConnectionKind::Docker,
        protocol: None,
        user: Some(user.unwrap_or_else(|| "root".to_string())),
        host: host.to_string(),
        port: None,
    })
}

fn parse_lxd(target: &str, rest: &str) -> Result<TargetDetails> {
    let host = match rest.split_once('@') {
        Some((_, host)) => {
            warn!(
                target = %target,
                "'@' in lxd target; the lxd connection only supports the 'root' user"
            );
            host
        }
        None => rest,
    };
    check_host(target, host)?;

    Ok(TargetDetails {
        connection: ConnectionKind::Lxd,
        protocol: None,
        user: Some("root".to_string()),
        host: host.to_string(),
        port: None,
    })
}

fn split_user<'a>(target: &str, rest: &'a str) -> Result<(Option<String>, &'a str)> {
    match rest.split_once('@') {
        Some((user, host)) => {
            if !is_valid_user(user) {
                return Err(FrecklaunchError::InvalidTarget(format!(
                    "invalid user '{user}' in '{target}'"
                )));
            }
            Ok((Some(user.to_string()), host))
        }
        None => Ok((None, rest)),
    }
}

fn parse_port(target: &str, port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(FrecklaunchError::InvalidTarget(format!(
            "invalid port '{port}' in '{target}'"
        ))),
        Ok(p) => Ok(p),
    }
}

fn check_host(target: &str, host: &str) -> Result<()> {
    if is_valid_host(host) {
        Ok(())
    } else {
        Err(FrecklaunchError::InvalidTarget(format!(
            "invalid host '{host}' in '{target}'"
        )))
    }
}

impl fmt::Display for TargetDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connection {
            ConnectionKind::Docker => write!(f, "docker::")?,
            ConnectionKind::Lxd => return write!(f, "lxd::{}", self.host),
            ConnectionKind::Ssh => {}
        }
        if let Some(ref protocol) = self.protocol {
            write!(f, "{protocol}://")?;
        }
        if let Some(ref user) = self.user {
            write!(f, "{user}@")?;
        }
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}
