//! Error types for store operations.

use crate::store::SignalId;
use thiserror::Error;

/// Errors raised by [`SignalStore`](crate::SignalStore) operations.
///
/// A missing signal is the only failure the store itself reports. Argument
/// validation belongs to whatever adapter sits in front of the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Signal not found: {0}")]
    NotFound(SignalId),
}

impl StoreError {
    /// The id that failed to resolve.
    pub fn signal_id(&self) -> &SignalId {
        match self {
            StoreError::NotFound(id) => id,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
