#![allow(dead_code)]

use frecklaunch::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.config.run.hosts.push(host.to_string());
        self
    }

    pub fn with_hosts(mut self, hosts: &[&str]) -> Self {
        self.config
            .run
            .hosts
            .extend(hosts.iter().map(|h| h.to_string()));
        self
    }

    pub fn login(mut self, login: &str) -> Self {
        self.config.run.login = login.to_string();
        self
    }

    pub fn executable(mut self, executable: &str) -> Self {
        self.config.run.executable = executable.to_string();
        self
    }

    pub fn envelope(mut self, envelope: &str) -> Self {
        self.config.run.envelope = envelope.to_string();
        self
    }

    pub fn dedupe_hosts(mut self, val: bool) -> Self {
        self.config.run.dedupe_hosts = val;
        self
    }

    pub fn frecklet(mut self, name: &str) -> Self {
        self.config.frecklet.name = name.to_string();
        self
    }

    /// Set a `[frecklet.vars]` entry, as if it had been written in TOML.
    pub fn var(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.config
            .frecklet
            .vars
            .insert(key.to_string(), value.into());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
