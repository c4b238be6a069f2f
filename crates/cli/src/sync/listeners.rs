// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observer registry for sync state changes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use outbox_core::SyncState;

type Listener = Arc<dyn Fn(&SyncState) + Send + Sync>;

/// States waiting to be delivered, in the order they were staged.
#[derive(Default)]
struct Backlog {
    states: VecDeque<SyncState>,
    /// Set while some thread is running the delivery loop.
    delivering: bool,
}

/// Registered state listeners, notified in registration order.
///
/// States are staged in commit order and delivered by one thread at a time,
/// so every listener sees them in that order even when mutations race.
#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
    backlog: Mutex<Backlog>,
}

impl ListenerSet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn add(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, listener));
        Subscription {
            id,
            set: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(entry_id, _)| *entry_id != id);
    }

    /// Queues `state` for delivery. Callers stage while holding whatever lock
    /// orders their mutations, then call [`ListenerSet::flush`] after
    /// releasing it.
    pub(crate) fn stage(&self, state: SyncState) {
        self.lock_backlog().states.push_back(state);
    }

    /// Delivers staged states until none are left.
    ///
    /// If another thread is already delivering, this returns at once and that
    /// thread picks up what was staged. A listener that mutates the manager
    /// from inside its callback lands here too; its state is delivered after
    /// the current one.
    pub(crate) fn flush(&self) {
        {
            let mut backlog = self.lock_backlog();
            if backlog.delivering {
                return;
            }
            backlog.delivering = true;
        }
        let _unwind = ResetOnPanic(self);
        loop {
            let next = {
                let mut backlog = self.lock_backlog();
                let next = backlog.states.pop_front();
                if next.is_none() {
                    backlog.delivering = false;
                }
                next
            };
            let Some(state) = next else {
                return;
            };
            self.deliver(&state);
        }
    }

    /// Stages `state` and flushes.
    #[cfg(test)]
    pub(crate) fn notify(&self, state: &SyncState) {
        self.stage(state.clone());
        self.flush();
    }

    /// Calls every listener with `state`. The registry lock is released
    /// before any listener runs, so listeners may subscribe or unsubscribe
    /// from inside the callback.
    fn deliver(&self, state: &SyncState) {
        let listeners: Vec<Listener> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_backlog(&self) -> std::sync::MutexGuard<'_, Backlog> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the delivering flag if a listener panics mid-delivery.
struct ResetOnPanic<'a>(&'a ListenerSet);

impl Drop for ResetOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock_backlog().delivering = false;
        }
    }
}

/// Handle returned by `SyncManager::subscribe`.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    set: Weak<ListenerSet>,
}

impl Subscription {
    /// Removes the listener. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        if let Some(set) = self.set.upgrade() {
            set.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
