// src/config/model.rs

use serde::Deserialize;

use crate::errors::FrecklaunchError;
use crate::task::{BASIC_HARDENING, Frecklet};
use crate::types::Envelope;

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [run]
/// executable = "freckles"
/// login = "root"
/// hosts = ["dev.cutecode.co"]
///
/// [frecklet]
/// name = "basic-hardening"
///
/// [frecklet.vars]
/// fail2ban = true
/// ufw = true
/// ufw_open_tcp = [80, 443]
/// ```
///
/// All sections are optional and have reasonable defaults. Turn this into a
/// [`ConfigFile`] with `ConfigFile::try_from` to validate it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub frecklet: FreckletSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Executable to launch. Looked up on `PATH` when not a path.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Login prefixed to every host (`<login>@<host>`).
    #[serde(default = "default_login")]
    pub login: String,

    /// Hosts to run the frecklet against, in order.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Drop repeated hosts so every target appears once per run.
    #[serde(default = "default_dedupe_hosts")]
    pub dedupe_hosts: bool,

    /// `"plain"` or `"frecklecute"`.
    #[serde(default = "default_envelope")]
    pub envelope: String,
}

fn default_executable() -> String {
    "freckles".to_string()
}

fn default_login() -> String {
    "root".to_string()
}

fn default_dedupe_hosts() -> bool {
    true
}

fn default_envelope() -> String {
    "plain".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            login: default_login(),
            hosts: Vec::new(),
            dedupe_hosts: default_dedupe_hosts(),
            envelope: default_envelope(),
        }
    }
}

/// `[frecklet]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FreckletSection {
    #[serde(default = "default_frecklet_name")]
    pub name: String,

    /// Options for the frecklet, from `[frecklet.vars]`.
    ///
    /// Kept as TOML values until validation, which turns them into JSON-safe
    /// [`crate::task::VarValue`]s.
    #[serde(default)]
    pub vars: toml::Table,
}

fn default_frecklet_name() -> String {
    BASIC_HARDENING.to_string()
}

impl Default for FreckletSection {
    fn default() -> Self {
        Self {
            name: default_frecklet_name(),
            vars: toml::Table::new(),
        }
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `[run].hosts` when non-empty.
    pub hosts: Vec<String>,
    pub login: Option<String>,
    pub executable: Option<String>,
    pub envelope: Option<String>,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if !overrides.hosts.is_empty() {
            self.run.hosts = overrides.hosts.clone();
        }
        if let Some(ref login) = overrides.login {
            self.run.login = login.clone();
        }
        if let Some(ref executable) = overrides.executable {
            self.run.executable = executable.clone();
        }
        if let Some(ref envelope) = overrides.envelope {
            self.run.envelope = envelope.clone();
        }
    }
}

/// Validated run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub executable: String,
    pub login: String,
    /// Hosts after validation (and de-duplication, if enabled).
    pub hosts: Vec<String>,
    pub envelope: Envelope,
}

/// Validated configuration, ready to build tasks from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub run: RunSettings,
    pub frecklet: Frecklet,
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FrecklaunchError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        crate::config::validate::validate_config(raw)
    }
}
