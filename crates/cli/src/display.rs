// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering for command output.

use chrono::{DateTime, Utc};
use outbox_core::{MessageStatus, QueuedMessage, SyncState};
use serde::Serialize;

use crate::sync::{DrainOutcome, DrainSummary};

/// Maximum characters of message content shown in list output.
const PREVIEW_WIDTH: usize = 60;

/// What happened to a message submitted with `outbox send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Accepted by the remote and removed from the queue.
    Delivered,
    /// Still queued; it will be retried.
    Queued,
    /// Retries exhausted.
    Failed,
}

impl Delivery {
    /// Derives the delivery from what is left in the queue.
    pub fn of(remaining: Option<&QueuedMessage>) -> Self {
        match remaining.map(|m| m.status) {
            None => Delivery::Delivered,
            Some(MessageStatus::Failed) => Delivery::Failed,
            Some(_) => Delivery::Queued,
        }
    }
}

/// JSON shape of a drain result.
#[derive(Debug, Serialize)]
pub struct DrainReport {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrying: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
}

impl From<DrainOutcome> for DrainReport {
    fn from(outcome: DrainOutcome) -> Self {
        let (name, summary) = match outcome {
            DrainOutcome::Offline => ("offline", None),
            DrainOutcome::Empty => ("empty", None),
            DrainOutcome::AlreadyRunning => ("already_running", None),
            DrainOutcome::Completed(s) => ("completed", Some(s)),
            DrainOutcome::Interrupted(s) => ("interrupted", Some(s)),
        };
        DrainReport {
            outcome: name,
            sent: summary.map(|s| s.sent),
            retrying: summary.map(|s| s.retrying),
            failed: summary.map(|s| s.failed),
        }
    }
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// Multi-line state summary.
pub fn format_state(state: &SyncState) -> String {
    format!(
        "Status: {}\nPending: {}\nFailed: {}\nLast sync: {}",
        state.status,
        state.pending_count,
        state.failed_count,
        format_timestamp(state.last_sync_at)
    )
}

/// One-line state summary for the watch log.
pub fn format_state_line(state: &SyncState) -> String {
    format!(
        "{} pending={} failed={} last_sync={}",
        state.status,
        state.pending_count,
        state.failed_count,
        format_timestamp(state.last_sync_at)
    )
}

/// Collapses content to one line of at most `PREVIEW_WIDTH` characters.
pub fn preview(content: &str) -> String {
    let line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= PREVIEW_WIDTH {
        return line;
    }
    let mut cut: String = line.chars().take(PREVIEW_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

/// List row: `<id>  <status>  <chat>  (<n> retries)  <preview>`.
pub fn format_message(msg: &QueuedMessage) -> String {
    let retries = match msg.retry_count {
        1 => "1 retry".to_string(),
        n => format!("{} retries", n),
    };
    format!(
        "{}  {:<7}  {}  ({})  {}",
        msg.id,
        msg.status.as_str(),
        msg.chat_id,
        retries,
        preview(&msg.content)
    )
}

fn format_counts(summary: &DrainSummary) -> String {
    format!(
        "sent {}, retrying {}, failed {}",
        summary.sent, summary.retrying, summary.failed
    )
}

pub fn format_outcome(outcome: DrainOutcome) -> String {
    match outcome {
        DrainOutcome::Offline => "Remote unreachable, nothing sent".to_string(),
        DrainOutcome::Empty => "Queue is empty".to_string(),
        DrainOutcome::AlreadyRunning => "A drain is already running".to_string(),
        DrainOutcome::Completed(s) => format!("Drain complete: {}", format_counts(&s)),
        DrainOutcome::Interrupted(s) => {
            format!("Drain interrupted (went offline): {}", format_counts(&s))
        }
    }
}

pub fn format_delivery(id: &str, delivery: Delivery) -> String {
    match delivery {
        Delivery::Delivered => format!("Delivered {}", id),
        Delivery::Queued => format!("Queued {} (will be sent when the remote is reachable)", id),
        Delivery::Failed => format!(
            "Failed {}\n  hint: run 'outbox retry {}' to try again",
            id, id
        ),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
