//! Signal Store - keyed registry of shared signals.
//!
//! Two lock scopes are involved and they never nest:
//! - the structural lock guards the id → signal table and is held only for
//!   map operations;
//! - each signal's entry lock guards its value and subscribers.
//!
//! Every value operation resolves its signal under the structural lock,
//! clones the `Arc`, releases the lock and only then touches the signal.
//! A slow subscriber on one signal therefore never blocks lookups of
//! another, and a concurrent delete cannot invalidate a handle that an
//! in-flight call already holds.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::signal::{Signal, SignalSnapshot, SubscriptionId};
use crate::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Unique identifier for a signal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId(pub String);

impl SignalId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SignalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SignalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Structural and value changes observed on a store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// A signal was created.
    Created { id: SignalId },
    /// A signal was written, producing `version`.
    Updated { id: SignalId, version: u64 },
    /// A signal was removed.
    Deleted { id: SignalId },
    /// The store was emptied.
    Cleared { count: usize },
    /// A batch finished applying.
    BatchApplied { applied: usize, skipped: usize },
}

/// Result of a batch update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Entries whose signal existed and was written.
    pub applied: usize,
    /// Entries whose id was not in the store.
    pub skipped: usize,
}

/// Thread-safe registry of signals.
///
/// The store is an ordinary value: construct as many as needed and share
/// one between threads with `Arc<SignalStore>`.
///
/// # Example
///
/// ```rust
/// use signalforge_core::{SignalStore, StoreError, Value};
///
/// let store = SignalStore::new();
/// let id = store.create_signal(Value::from(42.0));
/// assert_eq!(store.get_signal_version(&id).unwrap(), 0);
///
/// store.set_signal(&id, Value::from("hello")).unwrap();
/// assert_eq!(store.get_signal(&id).unwrap(), Value::from("hello"));
/// assert_eq!(store.get_signal_version(&id).unwrap(), 1);
///
/// store.delete_signal(&id);
/// assert!(matches!(store.get_signal(&id), Err(StoreError::NotFound(_))));
/// ```
pub struct SignalStore {
    config: StoreConfig,
    signals: RwLock<HashMap<SignalId, Arc<Signal>>>,
    next_id: AtomicU64,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl SignalStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            signals: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            next_id: AtomicU64::new(0),
            event_tx,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Subscribe to store events.
    ///
    /// Events cover writes made through the store (`set_signal`,
    /// `batch_update`). Writes made directly on a handle from
    /// [`signal`](Self::signal) bypass the store and emit nothing, so the
    /// `Updated` versions seen here can skip values.
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Create a signal holding `initial` at version 0 and return its id.
    pub fn create_signal(&self, initial: Value) -> SignalId {
        let id = self.generate_id();
        let signal = Arc::new(Signal::new(initial));

        self.signals.write().insert(id.clone(), signal);

        debug!(signal = %id, "signal created");
        self.emit(|| StoreEvent::Created { id: id.clone() });
        id
    }

    /// Current value of a signal.
    pub fn get_signal(&self, id: &SignalId) -> Result<Value> {
        Ok(self.signal(id)?.read())
    }

    /// Write a new value to a signal, notifying its subscribers.
    pub fn set_signal(&self, id: &SignalId, value: Value) -> Result<()> {
        let signal = self.signal(id)?;
        let version = signal.write(value);
        self.emit(|| StoreEvent::Updated {
            id: id.clone(),
            version,
        });
        Ok(())
    }

    pub fn has_signal(&self, id: &SignalId) -> bool {
        self.signals.read().contains_key(id)
    }

    /// Remove a signal. Returns whether an entry was removed; unknown ids
    /// are not an error.
    ///
    /// Handles already obtained through [`signal`](Self::signal) keep the
    /// signal alive until they are dropped.
    pub fn delete_signal(&self, id: &SignalId) -> bool {
        let removed = self.signals.write().remove(id);

        match removed {
            Some(_) => {
                debug!(signal = %id, "signal deleted");
                self.emit(|| StoreEvent::Deleted { id: id.clone() });
                true
            }
            None => false,
        }
    }

    /// Version of a signal, read without taking its entry lock.
    pub fn get_signal_version(&self, id: &SignalId) -> Result<u64> {
        Ok(self.signal(id)?.version())
    }

    /// Value and version of a signal, read together.
    pub fn snapshot(&self, id: &SignalId) -> Result<SignalSnapshot> {
        Ok(self.signal(id)?.snapshot())
    }

    /// Shared handle to a signal.
    ///
    /// Writes through the handle notify the signal's subscribers but do not
    /// produce [`StoreEvent::Updated`].
    pub fn signal(&self, id: &SignalId) -> Result<Arc<Signal>> {
        self.signals
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Register a change callback on a signal.
    pub fn subscribe<F>(&self, id: &SignalId, callback: F) -> Result<SubscriptionId>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Ok(self.signal(id)?.subscribe(callback))
    }

    /// Remove a change callback. An unknown subscription is ignored, an
    /// unknown signal is not.
    pub fn unsubscribe(&self, id: &SignalId, subscription: SubscriptionId) -> Result<()> {
        self.signal(id)?.unsubscribe(subscription);
        Ok(())
    }

    /// Apply several writes.
    ///
    /// Signals are resolved in one pass under the structural lock; ids that
    /// do not resolve are skipped without error. The writes then run in
    /// order after the lock is released, each one locking and notifying its
    /// own signal. This is not a transaction: a concurrent reader can see
    /// some entries written and others not yet, and nothing is rolled back.
    pub fn batch_update<I>(&self, updates: I) -> BatchOutcome
    where
        I: IntoIterator<Item = (SignalId, Value)>,
    {
        let updates: Vec<(SignalId, Value)> = updates.into_iter().collect();
        let total = updates.len();

        let resolved: Vec<(SignalId, Arc<Signal>, Value)> = {
            let signals = self.signals.read();
            updates
                .into_iter()
                .filter_map(|(id, value)| {
                    let signal = signals.get(&id).cloned()?;
                    Some((id, signal, value))
                })
                .collect()
        };

        let outcome = BatchOutcome {
            applied: resolved.len(),
            skipped: total - resolved.len(),
        };

        for (id, signal, value) in resolved {
            let version = signal.write(value);
            self.emit(|| StoreEvent::Updated { id, version });
        }

        debug!(
            applied = outcome.applied,
            skipped = outcome.skipped,
            "batch applied"
        );
        self.emit(|| StoreEvent::BatchApplied {
            applied: outcome.applied,
            skipped: outcome.skipped,
        });
        outcome
    }

    /// Number of signals in the store.
    pub fn get_signal_count(&self) -> usize {
        self.signals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get_signal_count() == 0
    }

    /// Ids of all signals, in no particular order.
    pub fn signal_ids(&self) -> Vec<SignalId> {
        self.signals.read().keys().cloned().collect()
    }

    /// Remove every signal. The id counter is not reset.
    pub fn clear(&self) {
        let removed = std::mem::replace(
            &mut *self.signals.write(),
            HashMap::with_capacity(self.config.initial_capacity),
        );
        let count = removed.len();
        drop(removed);

        debug!(count, "store cleared");
        self.emit(|| StoreEvent::Cleared { count });
    }

    fn generate_id(&self) -> SignalId {
        let counter = self.next_id.fetch_add(1, Ordering::Relaxed);
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        SignalId(format!("{}_{}_{}", self.config.id_prefix, counter, nanos))
    }

    fn emit(&self, event: impl FnOnce() -> StoreEvent) {
        if self.event_tx.receiver_count() > 0 {
            let _ = self.event_tx.send(event());
        }
    }
}

impl Default for SignalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalStore")
            .field("config", &self.config)
            .field("signals", &self.get_signal_count())
            .finish_non_exhaustive()
    }
}
