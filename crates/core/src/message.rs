// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued message types.
//!
//! A [`QueuedMessage`] is an outgoing chat message whose delivery has not been
//! confirmed yet. It is never marked as sent: a confirmed send removes it
//! from the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::id::generate_message_id;

/// Delivery status of a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Waiting for the next drain cycle.
    Pending,
    /// Claimed by a drain cycle; a send attempt is in flight.
    Sending,
    /// Retries exhausted. Only an explicit retry or discard moves it.
    Failed,
}

impl MessageStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sending => "sending",
            MessageStatus::Failed => "failed",
        }
    }

    /// Returns true if the message still counts towards the pending total.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, MessageStatus::Pending | MessageStatus::Sending)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MessageStatus::Pending),
            "sending" => Ok(MessageStatus::Sending),
            "failed" => Ok(MessageStatus::Failed),
            _ => Err(Error::InvalidMessageStatus(s.to_string())),
        }
    }
}

/// An outgoing chat message buffered until the remote confirms delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Unique ID, see [`generate_message_id`].
    pub id: String,
    /// Destination conversation.
    pub chat_id: String,
    /// Text payload exactly as submitted.
    pub content: String,
    /// Client-side creation time. Display and ordering only.
    pub timestamp: DateTime<Utc>,
    /// Number of failed send attempts.
    pub retry_count: u32,
    pub status: MessageStatus,
}

impl QueuedMessage {
    /// Creates a new pending message with a freshly generated ID.
    pub fn new(chat_id: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        QueuedMessage {
            id: generate_message_id(&now),
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: now,
            retry_count: 0,
            status: MessageStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == MessageStatus::Failed
    }

    /// Records a failed send attempt.
    ///
    /// The message goes back to pending until `max_retries` attempts have
    /// failed, then it becomes failed. Returns the new status.
    pub fn record_failure(&mut self, max_retries: u32) -> MessageStatus {
        self.retry_count = self.retry_count.saturating_add(1);
        self.status = if self.retry_count >= max_retries {
            MessageStatus::Failed
        } else {
            MessageStatus::Pending
        };
        self.status
    }

    /// Puts a failed message back in line with a fresh retry budget.
    ///
    /// Returns false (and changes nothing) if the message is not failed.
    pub fn reset_for_retry(&mut self) -> bool {
        if !self.is_failed() {
            return false;
        }
        self.status = MessageStatus::Pending;
        self.retry_count = 0;
        true
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
