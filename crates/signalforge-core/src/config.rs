//! Store configuration.

/// Configuration for a [`SignalStore`](crate::SignalStore).
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Prefix of generated signal ids (`<prefix>_<counter>_<nanos>`).
    pub id_prefix: String,
    /// Pre-allocated capacity of the signal table.
    pub initial_capacity: usize,
    /// Buffer size of the store event channel.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_prefix: "sig".to_string(),
            initial_capacity: 0,
            event_capacity: 100,
        }
    }
}

/// Builder for store configuration.
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.id_prefix = prefix.into();
        self
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Clamped to at least 1; the broadcast channel rejects a zero capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
