//! # Retention of empty registries.
//!
//! [`RetentionPolicy`] decides what happens to a label's registry once its
//! last listener is removed.
//!
//! - [`RetentionPolicy::Keep`] the registry stays, empty, until [`EventBus::clear`](crate::EventBus::clear) (default).
//! - [`RetentionPolicy::Prune`] the registry is dropped as soon as it becomes empty.
//!
//! Both policies are externally equivalent for `emit*` and `off`: an emptied
//! label and a never-seen label behave the same, and a pruned label's id
//! sequence carries over to its next registry, so an id removed before the
//! prune never names a later listener. The difference is visible only
//! through [`EventBus::labels`](crate::EventBus::labels) and memory use.

/// Policy controlling whether empty registries are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep empty registries for reuse.
    Keep,
    /// Drop a registry when its last listener is removed.
    Prune,
}

impl Default for RetentionPolicy {
    /// Returns [`RetentionPolicy::Keep`].
    fn default() -> Self {
        RetentionPolicy::Keep
    }
}

impl RetentionPolicy {
    /// True if an emptied registry should be dropped.
    pub fn prunes(self) -> bool {
        matches!(self, RetentionPolicy::Prune)
    }
}
