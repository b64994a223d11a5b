//! Push-style snapshot notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::snapshot::SensorSnapshot;

/// Callback invoked once per published snapshot
pub type SnapshotCallback = Arc<dyn Fn(&Arc<SensorSnapshot>) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Registered callbacks, in registration order
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionHandle, SnapshotCallback)>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Arc<SensorSnapshot>) + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((handle, Arc::new(callback)));
        handle
    }

    /// Returns false if the handle was not (or no longer) registered
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(h, _)| *h != handle);
        callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `snapshot` to every subscriber.
    ///
    /// The list is copied out first so callbacks may subscribe, unsubscribe
    /// or stop the scheduler without deadlocking. A panicking callback is
    /// logged and skipped.
    pub fn notify(&self, snapshot: &Arc<SensorSnapshot>) {
        let callbacks: Vec<(SubscriptionHandle, SnapshotCallback)> =
            self.callbacks.lock().iter().cloned().collect();

        for (handle, callback) in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(snapshot))).is_err() {
                log::error!(
                    "Subscriber {} panicked while handling snapshot {}",
                    handle.id(),
                    snapshot.sequence
                );
            }
        }
    }
}
