// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline synchronization manager.
//!
//! Owns the queue of messages the user tried to send that the remote has not
//! confirmed yet, and drives delivery whenever the network allows it.
//!
//! # Drain cycles
//!
//! A drain claims pending messages one at a time in insertion order, marks the
//! claimed message `sending`, awaits the send, and then either removes the
//! message (success) or charges it one retry (failure). Messages that are
//! already `failed` are never picked up automatically. A message queued while
//! a cycle runs is picked up by that same cycle.
//!
//! Drains never overlap: an atomic flag is taken before the scan and released
//! under the state lock in the same step that ends the cycle. A second
//! `drain()` while one runs returns [`DrainOutcome::AlreadyRunning`].
//!
//! # Background worker
//!
//! [`SyncManager::start`] spawns one task that follows the reachability
//! signal, ticks every `sync_interval`, and reacts to wake-ups from
//! `enqueue`, `retry_message` and offline-to-online transitions. Each of these
//! spawns a drain when the manager is online with a non-empty queue.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use outbox_core::{MessageStatus, NetworkStatus, OfflineData, QueuedMessage, SyncState};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::listeners::{ListenerSet, Subscription};
use super::reachability::Reachability;
use super::sender::{MessageSender, SendResult};
use super::storage::Storage;

/// Attempts before a message is marked failed.
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 3;
/// Period of the background drain tick.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);
/// Storage key of the persisted queue.
pub const DEFAULT_STORAGE_KEY: &str = "offline_data";

/// Configuration for the sync manager.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Failed attempts after which a message stops being retried.
    pub max_retry_count: u32,
    /// Period of the background drain tick.
    pub sync_interval: Duration,
    /// Key the queue is persisted under.
    pub storage_key: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Error type for sync manager operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No queued message has this ID.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// Only failed messages can be retried.
    #[error("message {id} is {status}\n  hint: only failed messages can be retried")]
    NotRetryable { id: String, status: MessageStatus },

    /// `start` needs a tokio runtime to spawn its worker on.
    #[error("sync manager must be started from within a tokio runtime")]
    NoRuntime,

    /// The background tick needs a non-zero period.
    #[error("sync interval must be greater than zero")]
    ZeroInterval,
}

/// Result type for sync manager operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Per-cycle delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Messages delivered and removed from the queue.
    pub sent: usize,
    /// Messages that failed and went back to pending.
    pub retrying: usize,
    /// Messages that failed and ran out of retries.
    pub failed: usize,
}

/// Result of a [`SyncManager::drain`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing attempted: the manager is offline.
    Offline,
    /// Nothing attempted: the queue is empty.
    Empty,
    /// Nothing attempted: another drain is in progress.
    AlreadyRunning,
    /// The cycle went through every eligible message.
    Completed(DrainSummary),
    /// Connectivity was lost mid-cycle; remaining messages were left pending.
    Interrupted(DrainSummary),
}

/// A message claimed for one send attempt.
struct Claim {
    id: String,
    chat_id: String,
    content: String,
}

/// Next step of a drain cycle, decided under the state lock.
enum Step {
    Send(Claim),
    Finish(bool),
}

struct QueueState {
    status: NetworkStatus,
    queue: Vec<QueuedMessage>,
    last_sync_at: Option<DateTime<Utc>>,
    /// IDs claimed by the running cycle; each message gets one attempt per cycle.
    attempted: HashSet<String>,
}

impl QueueState {
    fn snapshot(&self) -> SyncState {
        SyncState::project(self.status, &self.queue, self.last_sync_at)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.queue.iter().position(|m| m.id == id)
    }

    fn claim_next(&mut self) -> Option<Claim> {
        if self.status == NetworkStatus::Offline {
            return None;
        }
        let attempted = &self.attempted;
        let msg = self
            .queue
            .iter_mut()
            .find(|m| m.is_pending() && !attempted.contains(&m.id))?;
        msg.status = MessageStatus::Sending;
        let claim = Claim {
            id: msg.id.clone(),
            chat_id: msg.chat_id.clone(),
            content: msg.content.clone(),
        };
        self.attempted.insert(claim.id.clone());
        Some(claim)
    }

    fn record_outcome(
        &mut self,
        id: &str,
        result: &SendResult<()>,
        max_retry_count: u32,
        summary: &mut DrainSummary,
    ) {
        let Some(pos) = self.position(id) else {
            tracing::debug!(id, "message removed while its send was in flight");
            return;
        };
        match result {
            Ok(()) => {
                self.queue.remove(pos);
                summary.sent += 1;
                tracing::debug!(id, "message delivered");
            }
            Err(e) => {
                let msg = &mut self.queue[pos];
                match msg.record_failure(max_retry_count) {
                    MessageStatus::Failed => {
                        summary.failed += 1;
                        tracing::warn!(id, attempts = msg.retry_count, error = %e, "message failed permanently");
                    }
                    _ => {
                        summary.retrying += 1;
                        tracing::debug!(id, attempts = msg.retry_count, error = %e, "send failed, will retry");
                    }
                }
            }
        }
    }
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Inner {
    config: SyncConfig,
    storage: Arc<dyn Storage>,
    sender: Arc<dyn MessageSender>,
    state: Mutex<QueueState>,
    /// Re-entrancy guard for drain cycles.
    draining: AtomicBool,
    /// Mirrors `draining` for async waiters.
    drain_active: watch::Sender<bool>,
    state_tx: watch::Sender<SyncState>,
    listeners: Arc<ListenerSet>,
    wake: Arc<Notify>,
    worker: Mutex<Option<Worker>>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the whole queue back to storage.
    ///
    /// A failed write is logged and otherwise ignored: the in-memory queue
    /// stays authoritative and the next mutation writes everything again.
    fn persist(&self, st: &QueueState) {
        let key = self.config.storage_key.as_str();
        let blob = match OfflineData::new(st.queue.clone(), st.last_sync_at).encode() {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to encode offline queue");
                return;
            }
        };
        if let Err(e) = self.storage.write(key, &blob) {
            tracing::warn!(key, error = %e, "failed to persist offline queue");
        }
    }

    /// Publishes the current state to `watch` receivers and stages it for the
    /// listeners. Called with the state lock held so both see states in
    /// mutation order.
    fn commit(&self, st: &QueueState) {
        let snapshot = st.snapshot();
        self.state_tx.send_replace(snapshot.clone());
        self.listeners.stage(snapshot);
    }

    /// Delivers staged states to the listeners. Must be called without the
    /// state lock.
    fn notify(&self) {
        self.listeners.flush();
    }

    /// Releases the drain flag. Called with the state lock held; `drain_active`
    /// is cleared first so the next cycle's `true` cannot be overwritten.
    fn release_drain(&self) {
        self.drain_active.send_replace(false);
        self.draining.store(false, Ordering::Release);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
        }
    }
}

/// Releases the drain flag if a cycle ends without finishing normally, e.g.
/// when its future is dropped mid-send.
struct DrainGuard<'a> {
    inner: &'a Inner,
    finished: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        {
            let mut st = self.inner.lock_state();
            let mut touched = false;
            for msg in st.queue.iter_mut() {
                if msg.status == MessageStatus::Sending {
                    msg.status = MessageStatus::Pending;
                    touched = true;
                }
            }
            if st.status == NetworkStatus::Syncing {
                st.status = NetworkStatus::Online;
                touched = true;
            }
            if touched {
                self.inner.persist(&st);
                self.inner.commit(&st);
            }
            self.inner.release_drain();
        }
        self.inner.notify();
    }
}

/// Handle to the offline queue. Cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct SyncManager {
    inner: Arc<Inner>,
}

impl SyncManager {
    /// Creates a manager without background work.
    ///
    /// The persisted queue is loaded from `storage`; unreadable or missing data
    /// yields an empty queue. The host drives connectivity with
    /// [`SyncManager::set_online`] and delivery with [`SyncManager::drain`].
    pub fn new(
        config: SyncConfig,
        storage: Arc<dyn Storage>,
        sender: Arc<dyn MessageSender>,
        online: bool,
    ) -> Self {
        let data = load_queue(storage.as_ref(), &config.storage_key);
        let status = if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        };
        let state = QueueState {
            status,
            queue: data.messages,
            last_sync_at: data.last_sync,
            attempted: HashSet::new(),
        };
        tracing::info!(queued = state.queue.len(), %status, "sync manager initialized");

        let (state_tx, _rx) = watch::channel(state.snapshot());
        let (drain_active, _rx) = watch::channel(false);

        SyncManager {
            inner: Arc::new(Inner {
                config,
                storage,
                sender,
                state: Mutex::new(state),
                draining: AtomicBool::new(false),
                drain_active,
                state_tx,
                listeners: ListenerSet::new(),
                wake: Arc::new(Notify::new()),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Creates a manager and spawns its background worker on the current
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRuntime`] when called outside a tokio runtime and
    /// [`SyncError::ZeroInterval`] when `sync_interval` is zero.
    pub fn start(
        config: SyncConfig,
        storage: Arc<dyn Storage>,
        sender: Arc<dyn MessageSender>,
        reachability: &dyn Reachability,
    ) -> SyncResult<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        if config.sync_interval.is_zero() {
            return Err(SyncError::ZeroInterval);
        }

        let mut online_rx = reachability.watch();
        let online = *online_rx.borrow_and_update();
        let interval = config.sync_interval;
        let manager = Self::new(config, storage, sender, online);

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_worker(
            Arc::downgrade(&manager.inner),
            Arc::clone(&manager.inner.wake),
            online_rx,
            cancel.clone(),
            interval,
        ));
        *manager
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Worker { cancel, handle });

        Ok(manager)
    }

    /// Returns the configuration the manager runs with.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Queues a message and returns its ID without waiting for delivery.
    ///
    /// When online, the background worker is woken to drain.
    pub fn enqueue(&self, chat_id: impl Into<String>, content: impl Into<String>) -> String {
        let message = QueuedMessage::new(chat_id, content, Utc::now());
        let id = message.id.clone();

        let online = {
            let mut st = self.inner.lock_state();
            st.queue.push(message);
            self.inner.persist(&st);
            self.inner.commit(&st);
            st.status == NetworkStatus::Online
        };
        self.inner.notify();
        tracing::debug!(id = %id, "message queued");

        if online {
            self.inner.wake.notify_one();
        }
        id
    }

    /// Runs one drain cycle.
    pub async fn drain(&self) -> DrainOutcome {
        let inner = self.inner.as_ref();
        if inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return DrainOutcome::AlreadyRunning;
        }
        let mut guard = DrainGuard {
            inner,
            finished: false,
        };
        inner.drain_active.send_replace(true);

        let started = {
            let mut st = inner.lock_state();
            if st.status == NetworkStatus::Offline {
                Err(DrainOutcome::Offline)
            } else if st.queue.is_empty() {
                Err(DrainOutcome::Empty)
            } else {
                st.status = NetworkStatus::Syncing;
                st.attempted.clear();
                inner.commit(&st);
                Ok(())
            }
        };
        if let Err(outcome) = started {
            return outcome;
        }
        inner.notify();

        let max_retry_count = inner.config.max_retry_count;
        let mut summary = DrainSummary::default();
        loop {
            let step = {
                let mut st = inner.lock_state();
                match st.claim_next() {
                    Some(claim) => {
                        inner.commit(&st);
                        Step::Send(claim)
                    }
                    None => {
                        let interrupted = st.status == NetworkStatus::Offline;
                        if !interrupted {
                            st.last_sync_at = Some(Utc::now());
                            st.status = NetworkStatus::Online;
                        }
                        st.attempted.clear();
                        inner.persist(&st);
                        inner.commit(&st);
                        // Released under the lock: a message queued after this
                        // point sees an idle manager and wakes a new cycle.
                        inner.release_drain();
                        guard.finished = true;
                        Step::Finish(interrupted)
                    }
                }
            };

            match step {
                Step::Send(claim) => {
                    inner.notify();
                    let result = inner.sender.send(&claim.chat_id, &claim.content).await;
                    {
                        let mut st = inner.lock_state();
                        st.record_outcome(&claim.id, &result, max_retry_count, &mut summary);
                        inner.persist(&st);
                        inner.commit(&st);
                    }
                    inner.notify();
                }
                Step::Finish(interrupted) => {
                    inner.notify();
                    tracing::info!(
                        sent = summary.sent,
                        retrying = summary.retrying,
                        failed = summary.failed,
                        interrupted,
                        "drain cycle finished"
                    );
                    return if interrupted {
                        DrainOutcome::Interrupted(summary)
                    } else {
                        DrainOutcome::Completed(summary)
                    };
                }
            }
        }
    }

    /// Gives a failed message a fresh retry budget and wakes the worker.
    ///
    /// # Errors
    ///
    /// [`SyncError::MessageNotFound`] if no message has this ID,
    /// [`SyncError::NotRetryable`] if it is not failed. The queue is unchanged
    /// in both cases.
    pub fn retry_message(&self, id: &str) -> SyncResult<()> {
        {
            let mut st = self.inner.lock_state();
            let msg = st
                .queue
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| SyncError::MessageNotFound(id.to_string()))?;
            if !msg.reset_for_retry() {
                return Err(SyncError::NotRetryable {
                    id: id.to_string(),
                    status: msg.status,
                });
            }
            st.attempted.remove(id);
            self.inner.persist(&st);
            self.inner.commit(&st);
        }
        self.inner.notify();
        tracing::info!(id, "retrying failed message");

        self.inner.wake.notify_one();
        Ok(())
    }

    /// Drops a message from the queue. Returns false if there was no such
    /// message, in which case nothing is persisted or notified.
    pub fn remove_failed_message(&self, id: &str) -> bool {
        {
            let mut st = self.inner.lock_state();
            let Some(pos) = st.position(id) else {
                return false;
            };
            st.queue.remove(pos);
            self.inner.persist(&st);
            self.inner.commit(&st);
        }
        self.inner.notify();
        tracing::info!(id, "message discarded");
        true
    }

    /// Applies a platform connectivity event.
    ///
    /// Going offline is allowed from any status and stops a running cycle
    /// from claiming further messages. Coming back online wakes the worker.
    pub fn set_online(&self, online: bool) {
        let next = {
            let mut st = self.inner.lock_state();
            let next = match (online, st.status) {
                (false, NetworkStatus::Offline) | (true, NetworkStatus::Online) => return,
                (true, NetworkStatus::Syncing) => return,
                (false, _) => NetworkStatus::Offline,
                (true, NetworkStatus::Offline) => {
                    if self.inner.draining.load(Ordering::Acquire) {
                        NetworkStatus::Syncing
                    } else {
                        NetworkStatus::Online
                    }
                }
            };
            st.status = next;
            self.inner.commit(&st);
            next
        };
        tracing::info!(status = %next, "connectivity changed");
        self.inner.notify();

        if online {
            self.inner.wake.notify_one();
        }
    }

    /// Current observable state.
    pub fn state(&self) -> SyncState {
        self.inner.lock_state().snapshot()
    }

    /// Registers a listener called with the new state after every mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncState) + Send + Sync + 'static,
    {
        self.inner.listeners.add(Arc::new(listener))
    }

    /// Receiver that always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.inner.state_tx.subscribe()
    }

    pub fn is_online(&self) -> bool {
        self.inner.lock_state().status == NetworkStatus::Online
    }

    pub fn is_offline(&self) -> bool {
        self.inner.lock_state().status == NetworkStatus::Offline
    }

    /// All queued messages in insertion order.
    pub fn messages(&self) -> Vec<QueuedMessage> {
        self.inner.lock_state().queue.clone()
    }

    /// Messages that ran out of retries.
    pub fn failed_messages(&self) -> Vec<QueuedMessage> {
        self.inner
            .lock_state()
            .queue
            .iter()
            .filter(|m| m.is_failed())
            .cloned()
            .collect()
    }

    /// Looks up one queued message.
    pub fn message(&self, id: &str) -> Option<QueuedMessage> {
        self.inner
            .lock_state()
            .queue
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Resolves once no drain cycle is running.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.drain_active.subscribe();
        while self.inner.draining.load(Ordering::Acquire) {
            if rx.wait_for(|active| !*active).await.is_err() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Stops the background worker. In-flight sends still complete.
    pub async fn shutdown(&self) {
        let worker = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };
        worker.cancel.cancel();
        if let Err(e) = worker.handle.await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "sync worker ended abnormally");
            }
        }
        tracing::debug!("sync manager shut down");
    }

    /// Spawns a drain if the manager is online with something queued.
    fn spawn_drain_if_due(&self) {
        let due = {
            let st = self.inner.lock_state();
            st.status == NetworkStatus::Online && !st.queue.is_empty()
        };
        if due {
            let manager = self.clone();
            tokio::spawn(async move {
                manager.drain().await;
            });
        }
    }
}

impl std::fmt::Debug for SyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncManager")
            .field("state", &self.state())
            .finish()
    }
}

fn load_queue(storage: &dyn Storage, key: &str) -> OfflineData {
    let blob = match storage.read(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return OfflineData::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "offline queue unreadable, starting empty");
            return OfflineData::default();
        }
    };
    match OfflineData::decode(&blob) {
        Ok(data) => data.recover(),
        Err(e) => {
            tracing::warn!(key, error = %e, "offline queue corrupted, starting empty");
            OfflineData::default()
        }
    }
}

enum WorkerEvent {
    Connectivity(bool),
    Tick,
    Wake,
}

async fn run_worker(
    inner: Weak<Inner>,
    wake: Arc<Notify>,
    mut online_rx: watch::Receiver<bool>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut signal_open = true;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            changed = online_rx.changed(), if signal_open => match changed {
                Ok(()) => WorkerEvent::Connectivity(*online_rx.borrow_and_update()),
                Err(_) => {
                    tracing::debug!("reachability signal closed");
                    signal_open = false;
                    continue;
                }
            },
            _ = ticker.tick() => WorkerEvent::Tick,
            _ = wake.notified() => WorkerEvent::Wake,
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let manager = SyncManager { inner };
        match event {
            WorkerEvent::Connectivity(online) => manager.set_online(online),
            WorkerEvent::Tick | WorkerEvent::Wake => manager.spawn_drain_if_due(),
        }
    }
    tracing::debug!("sync worker stopped");
}
