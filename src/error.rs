use std::path::PathBuf;

use thiserror::Error;

use crate::apply::NativeParam;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Option '{0}' is declared more than once")]
    DuplicateKey(String),

    #[error("Default '{value}' for '{key}' is not one of {choices:?}")]
    DefaultNotInChoices {
        key: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Value for '{key}' does not match its declared type ({expected})")]
    TypeMismatch { key: String, expected: String },

    #[error("Option '{key}' depends on undeclared option '{depends_on}'")]
    UnknownDependency { key: String, depends_on: String },

    #[error("Dependency cycle between options: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Native parameter {0:?} has no bound option and no platform constant")]
    UnboundNativeParam(NativeParam),

    #[error("Native layer rejected settings: {source}")]
    NativeApply {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in profile file")]
    UnknownKeys(Vec<SettingsError>),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("No config directory found for this user")]
    NoConfigDir,

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}

impl SettingsError {
    /// True for the errors raised while validating an option table.
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            SettingsError::DuplicateKey(_)
                | SettingsError::DefaultNotInChoices { .. }
                | SettingsError::TypeMismatch { .. }
                | SettingsError::UnknownDependency { .. }
                | SettingsError::DependencyCycle(_)
        )
    }
}
