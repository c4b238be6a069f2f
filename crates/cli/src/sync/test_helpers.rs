// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use super::sender::{MessageSender, SendError, SendFuture};
use super::storage::{Storage, StorageError, StorageResult};

/// Scripted message sender that records every call.
pub struct MockSender {
    /// (chat_id, content) of every send, in call order.
    calls: Arc<Mutex<Vec<(String, String)>>>,
    /// Chats whose sends are rejected.
    failing_chats: Mutex<HashSet<String>>,
    /// Reject everything.
    fail_all: bool,
    /// Remaining failures before sends start succeeding.
    failures_left: Mutex<u32>,
    delay: Duration,
    /// When set, every send waits for one permit.
    gate: Option<Arc<Semaphore>>,
}

impl MockSender {
    pub fn succeeding() -> Self {
        MockSender {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_chats: Mutex::new(HashSet::new()),
            fail_all: false,
            failures_left: Mutex::new(0),
            delay: Duration::ZERO,
            gate: None,
        }
    }

    pub fn failing() -> Self {
        MockSender {
            fail_all: true,
            ..Self::succeeding()
        }
    }

    /// Fails the first `n` sends, then succeeds.
    pub fn failing_times(n: u32) -> Self {
        let sender = Self::succeeding();
        *sender.failures_left.lock().unwrap() = n;
        sender
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every send wait for a permit released through the returned gate.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn fail_chat(&self, chat_id: &str) {
        self.failing_chats
            .lock()
            .unwrap()
            .insert(chat_id.to_string());
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn should_fail(&self, chat_id: &str) -> bool {
        if self.fail_all || self.failing_chats.lock().unwrap().contains(chat_id) {
            return true;
        }
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return true;
        }
        false
    }
}

impl MessageSender for MockSender {
    fn send<'a>(&'a self, chat_id: &'a str, content: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((chat_id.to_string(), content.to_string()));
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.should_fail(chat_id) {
                Err(SendError::ConnectionFailed("mock failure".into()))
            } else {
                Ok(())
            }
        })
    }
}

/// Storage whose writes always fail. Reads return nothing.
pub struct BrokenStorage;

impl Storage for BrokenStorage {
    fn read(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
