// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const OUTBOX_CONFIG: &str = "OUTBOX_CONFIG";
    pub const OUTBOX_TOKEN: &str = "OUTBOX_TOKEN";
    pub const OUTBOX_DATA_DIR: &str = "OUTBOX_DATA_DIR";
}

/// Returns the value of `OUTBOX_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::OUTBOX_CONFIG).map(PathBuf::from)
}

/// Returns the value of `OUTBOX_TOKEN` if set and non-empty.
pub fn token() -> Option<String> {
    non_empty(vars::OUTBOX_TOKEN)
}

/// Returns the value of `OUTBOX_DATA_DIR` if set.
pub fn data_dir() -> Option<PathBuf> {
    non_empty(vars::OUTBOX_DATA_DIR).map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
