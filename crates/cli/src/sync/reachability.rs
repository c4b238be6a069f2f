// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability signal.
//!
//! The manager only needs the current value at startup and a stream of
//! online/offline transitions afterwards, which a `watch` channel carries.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Source of online/offline transitions.
pub trait Reachability: Send + Sync {
    /// Current reachability.
    fn is_online(&self) -> bool;

    /// Receiver that observes every subsequent transition.
    fn watch(&self) -> watch::Receiver<bool>;
}

/// Reachability driven by the host application.
///
/// Use this when the platform already delivers connectivity events, or in
/// tests.
#[derive(Debug)]
pub struct ManualReachability {
    tx: watch::Sender<bool>,
}

impl ManualReachability {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        ManualReachability { tx }
    }

    /// Publishes a connectivity change. Repeating the current value is a no-op.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
    }
}

impl Reachability for ManualReachability {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Configuration for [`TcpProbe`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// `host:port` to connect to.
    pub address: String,
    /// Delay between probes.
    pub interval: Duration,
    /// How long a single connect may take before counting as offline.
    pub timeout: Duration,
}

/// Reachability derived from periodic TCP connects to the remote.
///
/// The probe loop runs until [`TcpProbe::stop`] is called or the probe is
/// dropped.
pub struct TcpProbe {
    tx: Arc<watch::Sender<bool>>,
    cancel: CancellationToken,
}

impl TcpProbe {
    /// Probes once to establish the initial value, then keeps probing in the
    /// background.
    pub async fn start(config: ProbeConfig) -> Self {
        let online = probe_once(&config.address, config.timeout).await;
        tracing::debug!(address = %config.address, online, "initial reachability probe");

        let (tx, _rx) = watch::channel(online);
        let tx = Arc::new(tx);
        let cancel = CancellationToken::new();

        tokio::spawn(run_probe_loop(config, Arc::clone(&tx), cancel.clone()));

        TcpProbe { tx, cancel }
    }

    /// Stops the background probe loop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TcpProbe {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Reachability for TcpProbe {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

async fn run_probe_loop(
    config: ProbeConfig,
    tx: Arc<watch::Sender<bool>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.interval) => {}
        }

        let online = probe_once(&config.address, config.timeout).await;
        let changed = tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            tracing::info!(address = %config.address, online, "reachability changed");
        }
    }
}

/// Returns true if a TCP connection to `address` opens within `timeout`.
pub async fn probe_once(address: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::trace!(address, error = %e, "probe connect failed");
            false
        }
        Err(_) => {
            tracing::trace!(address, "probe connect timed out");
            false
        }
    }
}
