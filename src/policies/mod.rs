//! Bus policies.
//!
//! ## Contents
//! - [`RetentionPolicy`] keep or prune registries whose last listener was removed
//! - [`DetachedFailurePolicy`] what to do with failures from fire-and-forget dispatch
//!
//! ## Defaults
//! - `RetentionPolicy::Keep`
//! - `DetachedFailurePolicy::Log`

mod detached;
mod retention;

pub use detached::DetachedFailurePolicy;
pub use retention::RetentionPolicy;
