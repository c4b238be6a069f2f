// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod discard;
pub mod drain;
pub mod list;
pub mod retry;
pub mod send;
pub mod status;
pub mod watch;

use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sync::{probe_once, FileStorage, HttpSender, SyncManager};

/// Builds the runtime a command's async work runs on.
pub fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))
}

/// Opens the persisted queue without background work.
///
/// `online` is the connectivity the manager starts with; commands that only
/// read or edit the queue pass `false` so nothing is sent.
pub fn open_manager(config: &Config, online: bool) -> Result<SyncManager> {
    let storage = FileStorage::open(config.data_dir()?)?;
    let sender = HttpSender::new(config.sender_config())?;
    Ok(SyncManager::new(
        config.sync_config(),
        Arc::new(storage),
        Arc::new(sender),
        online,
    ))
}

/// Probes the remote once.
pub async fn probe(config: &Config) -> Result<bool> {
    let probe = config.probe_config()?;
    let online = probe_once(&probe.address, probe.timeout).await;
    tracing::debug!(address = %probe.address, online, "probed remote");
    Ok(online)
}

/// Prints a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
