// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outbox-core: data model for the outbox offline message queue.
//!
//! This crate provides the types shared by the sync manager and anything that
//! renders its state: queued messages, their delivery status, the derived
//! [`SyncState`] projection, and the codec for the persisted queue blob.

pub mod error;
pub mod id;
pub mod message;
pub mod snapshot;
pub mod state;

pub use error::{Error, Result};
pub use id::generate_message_id;
pub use message::{MessageStatus, QueuedMessage};
pub use snapshot::OfflineData;
pub use state::{NetworkStatus, SyncState};
