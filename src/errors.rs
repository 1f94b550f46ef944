// src/errors.rs

//! Crate-wide error type. `anyhow` stays at the binary edge (`main.rs`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrecklaunchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Payload encoding error: {0}")]
    PayloadError(#[from] serde_json::Error),

    #[error("failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FrecklaunchError>;
