//! # Bus configuration.
//!
//! Provides [`Config`] centralized settings for an [`EventBus`](crate::EventBus).
//!
//! Config is used in two ways:
//! 1. **Direct**: `EventBus::with_config(config)`
//! 2. **Builder**: `EventBus::builder().with_retention(..).build()`

use crate::policies::{DetachedFailurePolicy, RetentionPolicy};

/// Settings for one event bus.
///
/// ## Field semantics
/// - `retention`: keep or prune a label's registry after its last listener is removed
/// - `detached_failures`: fate of listener failures during fire-and-forget dispatch
///
/// ## Notes
/// Neither field changes what `on`/`off`/`emit*` return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Housekeeping for emptied registries.
    ///
    /// Default: [`RetentionPolicy::Keep`].
    pub retention: RetentionPolicy,

    /// Handling of failures nobody awaits.
    ///
    /// Default: [`DetachedFailurePolicy::Log`].
    pub detached_failures: DetachedFailurePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.retention, RetentionPolicy::Keep);
        assert_eq!(cfg.detached_failures, DetachedFailurePolicy::Log);
    }
}
