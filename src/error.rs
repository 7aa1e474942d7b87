//! Error types of the planner.

use std::path::PathBuf;

/// Failure to read the postal-code reference dataset
#[derive(Debug, thiserror::Error)]
pub enum GeoIndexError {
    #[error("cannot read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse dataset '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to load or validate the planner configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure of a whole planning request
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("capacity must be a positive number of kilograms, got {0}")]
    InvalidCapacity(f64),
}

pub type PlanResult<T> = Result<T, PlanError>;
