//! # Error Module
//!
//! Error types for the pair culling engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-item failures are recoverable** - catalog and scoring errors
//!   are collected as warnings, discard errors block the session

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PairCullError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("Discard error: {0}")]
    Discard(#[from] DiscardError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors that occur while building the image catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while scoring a pair
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Failed to score {path}: {reason}")]
    ScoringFailure { path: PathBuf, reason: String },

    #[error("Scoring was cancelled")]
    Cancelled,
}

/// Errors that occur when moving a rejected image aside
#[derive(Error, Debug)]
pub enum DiscardError {
    #[error("Cannot discard {path}: {destination} already exists")]
    Collision { path: PathBuf, destination: PathBuf },

    #[error("Failed to move {path} to {destination}: {source}")]
    Io {
        path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscardError {
    /// Path of the image that could not be discarded
    pub fn path(&self) -> &PathBuf {
        match self {
            DiscardError::Collision { path, .. } | DiscardError::Io { path, .. } => path,
        }
    }
}

/// Errors in user supplied configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PairCullError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_image_includes_path_and_reason() {
        let error = CatalogError::UnreadableImage {
            path: PathBuf::from("/photos/broken.png"),
            reason: "unknown format".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.png"));
        assert!(message.contains("unknown format"));
    }

    #[test]
    fn collision_names_destination() {
        let error = DiscardError::Collision {
            path: PathBuf::from("/photos/a.png"),
            destination: PathBuf::from("/photos/.discarded/a.png"),
        };
        assert!(error.to_string().contains(".discarded/a.png"));
        assert_eq!(error.path(), &PathBuf::from("/photos/a.png"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let error: PairCullError =
            ConfigError::InvalidConfiguration("resolution must be positive".to_string()).into();
        assert!(error.to_string().contains("resolution must be positive"));
    }
}
