// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first message delivery.
//!
//! Buffers outgoing chat messages while the network is unavailable and
//! delivers them in order once it comes back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌─────────────┐
//! │ SyncManager  │────►│ MessageSender │────►│   Remote    │
//! │   (queue)    │     │    (trait)    │     │   Server    │
//! └──────────────┘     └───────────────┘     └─────────────┘
//!    │        ▲
//!    ▼        │
//! ┌─────────┐ ┌──────────────┐
//! │ Storage │ │ Reachability │
//! │ (trait) │ │   (trait)    │
//! └─────────┘ └──────────────┘
//! ```
//!
//! # Features
//!
//! - Persisted queue, rewritten in full after every mutation
//! - FIFO drain cycles that never overlap
//! - Bounded retries with explicit retry and discard of failed messages
//! - Drain on reconnect, on enqueue, and on a periodic tick
//! - Listener callbacks and a `watch` channel for state changes
//! - Injectable sender, storage and reachability for testing

mod listeners;
mod manager;
mod reachability;
mod sender;
mod storage;

pub use listeners::Subscription;
pub use manager::{
    DrainOutcome, DrainSummary, SyncConfig, SyncError, SyncManager, SyncResult,
    DEFAULT_MAX_RETRY_COUNT, DEFAULT_STORAGE_KEY, DEFAULT_SYNC_INTERVAL,
};
pub use reachability::{probe_once, ManualReachability, ProbeConfig, Reachability, TcpProbe};
pub use sender::{HttpSender, HttpSenderConfig, MessageSender, SendError, SendFuture, SendResult};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};

#[cfg(test)]
mod test_helpers;



#[cfg(test)]
mod reachability_tests;
