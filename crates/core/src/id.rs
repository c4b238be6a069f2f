// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix shared by every queued message ID.
pub const MESSAGE_ID_PREFIX: &str = "offline";

const SUFFIX_LEN: usize = 10;

/// Generate a queued message ID from its creation time.
/// Format: offline_{unix_millis}_{suffix} where suffix is 10 hex chars of a v4 UUID,
/// so two messages queued within the same millisecond still get distinct IDs.
pub fn generate_message_id(created_at: &DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let suffix = &random[..SUFFIX_LEN];
    format!(
        "{}_{}_{}",
        MESSAGE_ID_PREFIX,
        created_at.timestamp_millis(),
        suffix
    )
}

/// Returns true if the ID has the shape produced by [`generate_message_id`].
pub fn is_message_id(id: &str) -> bool {
    let mut parts = id.splitn(3, '_');
    let (Some(prefix), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == MESSAGE_ID_PREFIX
        && !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
