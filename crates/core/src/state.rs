// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network status and the observable sync state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::message::{MessageStatus, QueuedMessage};

/// Process-wide connectivity status as seen by the sync manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Online,
    Offline,
    /// A drain cycle is running. Only reachable from online.
    Syncing,
}

impl NetworkStatus {
    /// Returns the string representation used in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Online => "online",
            NetworkStatus::Offline => "offline",
            NetworkStatus::Syncing => "syncing",
        }
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "online" => Ok(NetworkStatus::Online),
            "offline" => Ok(NetworkStatus::Offline),
            "syncing" => Ok(NetworkStatus::Syncing),
            _ => Err(Error::InvalidNetworkStatus(s.to_string())),
        }
    }
}

/// Read-only snapshot handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub status: NetworkStatus,
    /// When the last drain cycle completed, if ever.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Messages that are pending or sending.
    pub pending_count: usize,
    /// Messages that exhausted their retries.
    pub failed_count: usize,
    pub is_syncing: bool,
}

impl SyncState {
    /// Derives the observable state from the manager's internals.
    pub fn project(
        status: NetworkStatus,
        queue: &[QueuedMessage],
        last_sync_at: Option<DateTime<Utc>>,
    ) -> Self {
        let pending_count = queue.iter().filter(|m| m.status.is_outstanding()).count();
        let failed_count = queue
            .iter()
            .filter(|m| m.status == MessageStatus::Failed)
            .count();
        SyncState {
            status,
            last_sync_at,
            pending_count,
            failed_count,
            is_syncing: status == NetworkStatus::Syncing,
        }
    }

    /// Returns true if nothing is waiting to be delivered.
    pub fn is_settled(&self) -> bool {
        self.pending_count == 0 && !self.is_syncing
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
