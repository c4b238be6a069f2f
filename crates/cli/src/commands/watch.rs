// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox watch`: long-running delivery until Ctrl-C.
//!
//! Runs the sync manager with its background worker, following a TCP
//! reachability probe, and prints one line per state change.

use std::sync::Arc;

use super::runtime;
use crate::config::Config;
use crate::display::format_state_line;
use crate::error::Result;
use crate::sync::{FileStorage, HttpSender, Reachability, SyncManager, TcpProbe};

pub fn run(config: &Config) -> Result<()> {
    runtime()?.block_on(async {
        let probe = TcpProbe::start(config.probe_config()?).await;
        let storage = FileStorage::open(config.data_dir()?)?;
        let sender = HttpSender::new(config.sender_config())?;
        let manager = SyncManager::start(
            config.sync_config(),
            Arc::new(storage),
            Arc::new(sender),
            &probe,
        )?;
        tracing::info!(
            data_dir = %config.data_dir()?.display(),
            online = probe.is_online(),
            "watching outbox"
        );

        println!("{}", format_state_line(&manager.state()));
        let subscription = manager.subscribe(|state| println!("{}", format_state_line(state)));

        // Anything queued by earlier runs goes out now rather than on the
        // first tick.
        tokio::spawn({
            let manager = manager.clone();
            async move { manager.drain().await }
        });

        tokio::signal::ctrl_c().await?;
        tracing::info!("interrupted, shutting down");

        probe.stop();
        manager.shutdown().await;
        manager.wait_idle().await;
        subscription.unsubscribe();
        Ok(())
    })
}
