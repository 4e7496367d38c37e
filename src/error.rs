//! Unified error type hierarchy for ScanCAM
//!
//! Provides structured error handling with BackendError, AssetError,
//! SessionError and ConfigError. Every error that reaches the user is turned
//! into an advisory through `user_message()`; nothing here is fatal.

use std::io;
use thiserror::Error;

/// Analysis backend communication errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Network-level failure (connection refused, reset, body read error)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {0}")]
    HttpStatus(u16),

    /// Response body was not the expected JSON shape
    #[error("Unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    /// Backend reported `status != "success"`
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Generic user-facing message for a failed analysis run.
    ///
    /// Details are deliberately left to the log; the alert stays generic.
    pub fn user_message(&self) -> String {
        "An error occurred during analysis. Check the backend console for details.".to_string()
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            BackendError::HttpStatus(status.as_u16())
        } else if e.is_decode() {
            BackendError::UnexpectedResponse(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

/// Errors raised while reading a user-selected asset from disk.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Failed to read '{path}': {reason}")]
    Read { path: String, reason: String },
}

impl AssetError {
    pub fn user_message(&self) -> String {
        match self {
            AssetError::Read { path, .. } => format!("Could not read the selected file: {}", path),
        }
    }
}

/// Run-request guard failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Either asset slot is empty at run time
    #[error("Missing assets (model: {model_missing}, image: {image_missing})")]
    MissingAssets {
        model_missing: bool,
        image_missing: bool,
    },

    /// A request is already in flight
    #[error("An analysis request is already in flight")]
    AlreadySubmitting,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingAssets { .. } => {
                "Please select both a model file and an image to analyze!".to_string()
            }
            SessionError::AlreadySubmitting => "Analysis is already running.".to_string(),
        }
    }
}

/// Configuration file parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error during config operations: {0}")]
    Io(#[from] io::Error),
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
