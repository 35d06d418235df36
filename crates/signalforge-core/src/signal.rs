//! A single versioned, subscribable value cell.
//!
//! Each [`Signal`] carries its own entry lock guarding the value and the
//! subscriber table. The version counter lives outside that lock so pollers
//! can detect changes with a single atomic load:
//!
//! ```rust
//! use signalforge_core::{Signal, Value};
//!
//! let signal = Signal::new(Value::from(1.0));
//! let seen = signal.version();
//!
//! signal.write(Value::from(2.0));
//!
//! if signal.version() != seen {
//!     assert_eq!(signal.read(), Value::from(2.0));
//! }
//! ```

use crate::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

/// Change-notification callback. Invoked with the value produced by a write.
pub type Subscriber = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifier of one subscription, unique within its signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value together with the version of the write that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub value: Value,
    pub version: u64,
}

/// State guarded by the entry lock.
struct EntryState {
    value: Value,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_subscription: u64,
}

/// A mutable value cell with a monotonically increasing version.
///
/// Writes are linearized by the entry lock: `N` successful writes from any
/// mix of threads leave the version at exactly `N`. Subscribers run after the
/// lock is released, so a callback may read, write or (un)subscribe on the
/// same signal without deadlocking.
pub struct Signal {
    state: Mutex<EntryState>,
    version: AtomicU64,
    failed_notifications: AtomicU64,
}

impl Signal {
    /// Create a signal holding `initial` at version 0.
    pub fn new(initial: Value) -> Self {
        Self {
            state: Mutex::new(EntryState {
                value: initial,
                subscribers: BTreeMap::new(),
                next_subscription: 0,
            }),
            version: AtomicU64::new(0),
            failed_notifications: AtomicU64::new(0),
        }
    }

    /// Copy of the current value.
    pub fn read(&self) -> Value {
        self.state.lock().value.clone()
    }

    /// Current value and the version that produced it, read together.
    pub fn snapshot(&self) -> SignalSnapshot {
        let state = self.state.lock();
        SignalSnapshot {
            value: state.value.clone(),
            version: self.version.load(Ordering::Acquire),
        }
    }

    /// Replace the value, bump the version and notify subscribers.
    ///
    /// Returns the new version. The subscriber table is copied while the
    /// entry lock is held and the callbacks run after it is released. A
    /// panicking callback is caught and logged; the remaining subscribers
    /// still receive the value.
    pub fn write(&self, value: Value) -> u64 {
        let (version, delivery) = {
            let mut state = self.state.lock();
            state.value = value;
            // Release pairs with the Acquire in `version()`: a reader that
            // sees this version also sees the value stored above.
            let version = self.version.fetch_add(1, Ordering::Release) + 1;

            let delivery = if state.subscribers.is_empty() {
                None
            } else {
                let subscribers: Vec<(SubscriptionId, Subscriber)> = state
                    .subscribers
                    .iter()
                    .map(|(id, callback)| (*id, Arc::clone(callback)))
                    .collect();
                Some((state.value.clone(), subscribers))
            };
            (version, delivery)
        };

        trace!(version, "signal written");

        if let Some((current, subscribers)) = delivery {
            for (id, callback) in subscribers {
                self.deliver(id, version, &callback, &current);
            }
        }

        version
    }

    /// Register a callback for future writes.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.subscribers.insert(id, Arc::new(callback));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.lock().subscribers.remove(&id);
    }

    /// Lock-free version read for change detection.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Number of callback invocations that panicked over this signal's life.
    pub fn failed_notifications(&self) -> u64 {
        self.failed_notifications.load(Ordering::Relaxed)
    }

    fn deliver(&self, id: SubscriptionId, version: u64, callback: &Subscriber, value: &Value) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
            self.failed_notifications.fetch_add(1, Ordering::Relaxed);
            warn!(
                subscription = id.0,
                version,
                reason = panic_message(payload.as_ref()),
                "subscriber panicked; continuing delivery"
            );
        }
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("version", &self.version())
            .field("failed_notifications", &self.failed_notifications())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
