//! # signalforge-core
//!
//! Concurrent, versioned value store for shared reactive state.
//!
//! This crate provides:
//! - [`Value`]: a closed tagged scalar (undefined, null, boolean, number, string, object text)
//! - [`Signal`]: a self-synchronizing value cell with a version counter and subscribers
//! - [`SignalStore`]: a keyed registry of signals with single and batch mutation
//!
//! ## Locking
//!
//! The store lock guards only the id → signal table. Each signal has its own
//! entry lock for its value and subscribers. The two are never held together,
//! and subscriber callbacks run with neither held. Version reads take no lock
//! at all, which makes `version()` polling the cheap way to detect change.
//!
//! ## Example
//!
//! ```rust
//! use signalforge_core::{SignalId, SignalStore, Value};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let store = SignalStore::new();
//! let count = store.create_signal(Value::from(0.0));
//! let label = store.create_signal(Value::from("idle"));
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! store
//!     .subscribe(&count, move |_| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//!
//! let outcome = store.batch_update(vec![
//!     (count.clone(), Value::from(1.0)),
//!     (label.clone(), Value::from("busy")),
//!     (SignalId::from("gone"), Value::null()),
//! ]);
//!
//! assert_eq!(outcome.applied, 2);
//! assert_eq!(outcome.skipped, 1);
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! assert_eq!(store.get_signal_version(&label).unwrap(), 1);
//! ```

pub mod config;
pub mod error;
pub mod signal;
pub mod store;
pub mod value;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Result, StoreError};
pub use signal::{Signal, SignalSnapshot, Subscriber, SubscriptionId};
pub use store::{BatchOutcome, SignalId, SignalStore, StoreEvent};
pub use value::{Value, ValueKind};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::StoreError;
    pub use crate::signal::{Signal, SubscriptionId};
    pub use crate::store::{SignalId, SignalStore};
    pub use crate::value::Value;
}
