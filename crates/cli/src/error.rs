// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{SendError, StorageError, SyncError};

/// All possible errors that can occur in the outbox CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file not found: {0}\n  hint: create it or drop --config to use defaults")]
    ConfigNotFound(String),

    #[error("invalid remote URL '{0}'\n  hint: the remote URL must start with http:// or https://")]
    InvalidRemoteUrl(String),

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("no data directory available\n  hint: set [storage] dir in the config or OUTBOX_DATA_DIR")]
    NoDataDir,

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote error: {0}")]
    Send(#[from] SendError),

    #[error("{0}")]
    Core(#[from] outbox_core::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using the outbox CLI's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
