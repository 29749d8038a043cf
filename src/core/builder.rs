use crate::core::{Config, EventBus};
use crate::policies::{DetachedFailurePolicy, RetentionPolicy};

/// Builder for constructing an [`EventBus`].
#[derive(Clone, Debug, Default)]
pub struct EventBusBuilder {
    cfg: Config,
}

impl EventBusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Sets what happens to a registry once its last listener is removed.
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.cfg.retention = retention;
        self
    }

    /// Sets how fire-and-forget failures are handled.
    pub fn with_detached_failures(mut self, policy: DetachedFailurePolicy) -> Self {
        self.cfg.detached_failures = policy;
        self
    }

    /// Builds the bus.
    pub fn build(self) -> EventBus {
        EventBus::with_config(self.cfg)
    }
}
