//! Error types for scorediff operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScorediffError>;

#[derive(Error, Debug)]
pub enum ScorediffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Malformed cell at row {row}, column '{column}': '{value}' is not a number")]
    MalformedCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Snapshot store error: {message}")]
    Store { message: String },

    #[error("Fetch error: {message}")]
    Fetch { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("{0:#}")]
    Generic(#[from] anyhow::Error),
}

impl ScorediffError {
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
        }
    }

    pub fn malformed_cell(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedCell {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True for the errors that describe bad snapshot contents rather than
    /// a failing collaborator.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::MalformedCell { .. })
    }
}
