// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox discard`: drop a message without sending it.

use super::open_manager;
use crate::config::Config;
use crate::error::Result;
use crate::sync::SyncError;

pub fn run(config: &Config, id: &str) -> Result<()> {
    let manager = open_manager(config, false)?;
    if !manager.remove_failed_message(id) {
        return Err(SyncError::MessageNotFound(id.to_string()).into());
    }
    println!("Discarded {}", id);
    Ok(())
}
