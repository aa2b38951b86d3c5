use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Path has no file name: {path}")]
    MissingFileName { path: String },

    #[error("Duplicate group '{base_name}' needs at least 2 files, got {count}")]
    TooFewFiles { base_name: String, count: usize },
}

/// Why two files could not be compared at all.
///
/// This is distinct from a similarity of 0: an incomparable pair has not been
/// shown to differ, it simply cannot be scored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IncomparableError {
    #[error("File does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("Cannot compare {left} with {right}: different media types")]
    MixedMedia { left: String, right: String },

    #[error("Unsupported media type for comparison: {extension}")]
    UnsupportedMedia { extension: String },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory does not exist: {path}")]
    MissingDirectory { path: String },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid file record: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Incomparable(#[from] IncomparableError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}
