// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the reachability sources.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use tokio::net::TcpListener;

use super::reachability::{probe_once, ManualReachability, ProbeConfig, Reachability, TcpProbe};

const WAIT: Duration = Duration::from_secs(5);

fn probe_config(address: String) -> ProbeConfig {
    ProbeConfig {
        address,
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(500),
    }
}

/// An address nothing listens on: bind an ephemeral port, then release it.
async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

#[test]
fn test_manual_initial_value() {
    assert!(ManualReachability::new(true).is_online());
    assert!(!ManualReachability::new(false).is_online());
}

#[tokio::test]
async fn test_manual_publishes_changes() {
    let reachability = ManualReachability::new(false);
    let mut rx = reachability.watch();

    reachability.set_online(true);

    tokio::time::timeout(WAIT, rx.changed())
        .await
        .expect("change not observed")
        .unwrap();
    assert!(*rx.borrow_and_update());
    assert!(reachability.is_online());
}

#[tokio::test]
async fn test_manual_repeated_value_is_not_a_change() {
    let reachability = ManualReachability::new(true);
    let rx = reachability.watch();

    reachability.set_online(true);

    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_probe_once_open_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    assert!(probe_once(&addr, Duration::from_millis(500)).await);
}

#[tokio::test]
async fn test_probe_once_closed_port() {
    let addr = closed_address().await;
    assert!(!probe_once(&addr, Duration::from_millis(500)).await);
}

#[tokio::test]
async fn test_tcp_probe_detects_listener_going_away() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let probe = TcpProbe::start(probe_config(addr)).await;
    assert!(probe.is_online());

    let mut rx = probe.watch();
    drop(listener);

    tokio::time::timeout(WAIT, rx.wait_for(|online| !*online))
        .await
        .expect("probe never reported offline")
        .unwrap();
    assert!(!probe.is_online());
    probe.stop();
}

#[tokio::test]
async fn test_tcp_probe_starts_offline_for_closed_port() {
    let addr = closed_address().await;
    let probe = TcpProbe::start(probe_config(addr)).await;
    assert!(!probe.is_online());
}
