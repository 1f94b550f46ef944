// src/config/mod.rs

//! Configuration loading and validation for frecklaunch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate hosts, run settings and frecklet options (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_raw_or_default};
pub use model::{
    ConfigFile, ConfigOverrides, FreckletSection, RawConfigFile, RunSection, RunSettings,
};
pub use validate::validate_config;
