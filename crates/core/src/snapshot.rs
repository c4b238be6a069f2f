// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted form of the offline queue.
//!
//! The whole queue plus the last sync time is serialized as one JSON blob and
//! written back in full on every mutation. The blob only has to round-trip
//! through this module; it is not a contract with any other system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::message::{MessageStatus, QueuedMessage};

/// Queue contents as stored between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineData {
    /// Queued messages in insertion order.
    #[serde(default)]
    pub messages: Vec<QueuedMessage>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl OfflineData {
    pub fn new(messages: Vec<QueuedMessage>, last_sync: Option<DateTime<Utc>>) -> Self {
        OfflineData {
            messages,
            last_sync,
        }
    }

    /// Serializes the blob.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a blob produced by [`OfflineData::encode`].
    ///
    /// Rejects blobs that repeat a message ID, since the queue addresses
    /// entries by ID.
    pub fn decode(blob: &str) -> Result<Self> {
        let data: OfflineData = serde_json::from_str(blob)?;
        if let Some(id) = first_duplicate_id(&data.messages) {
            return Err(Error::CorruptedData(format!("duplicate message id: {}", id)));
        }
        Ok(data)
    }

    /// Returns messages interrupted mid-send to pending.
    ///
    /// A message stored as sending belongs to a process that stopped before
    /// the remote answered, so delivery was never confirmed. The attempt is
    /// not counted against its retry budget.
    pub fn recover(mut self) -> Self {
        for msg in &mut self.messages {
            if msg.status == MessageStatus::Sending {
                msg.status = MessageStatus::Pending;
            }
        }
        self
    }
}

fn first_duplicate_id(messages: &[QueuedMessage]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .iter()
        .map(|m| m.id.as_str())
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
