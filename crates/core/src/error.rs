//! Error types for site configuration

use thiserror::Error;

/// Result type alias using the core Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown environment: {requested}. Available: {}", available.join(", "))]
    UnknownEnvironment {
        requested: String,
        available: Vec<String>,
    },

    #[error("Invalid site definition: {0}")]
    InvalidSite(String),

    #[error("Invalid page path '{path}': {reason}")]
    InvalidPagePath { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
