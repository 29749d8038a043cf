//! # Failures nobody waits for.
//!
//! Fire-and-forget dispatch (`emit`) never returns listener failures. What
//! happens to them instead is chosen by [`DetachedFailurePolicy`]:
//!
//! - [`DetachedFailurePolicy::Log`] emit a `tracing` warning (default).
//! - [`DetachedFailurePolicy::Ignore`] drop the failure silently.
//!
//! ## Example output (with a `tracing-subscriber` fmt layer)
//! ```text
//! WARN topicbus: detached listener failure label="user.joined" listener=2 kind=listener_failed error=error: db down
//! ```

use crate::core::ListenerId;
use crate::error::ListenerError;

/// Policy for listener failures observed during fire-and-forget dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachedFailurePolicy {
    /// Log through `tracing` at `warn` level.
    Log,
    /// Discard without a trace.
    Ignore,
}

impl Default for DetachedFailurePolicy {
    /// Returns [`DetachedFailurePolicy::Log`].
    fn default() -> Self {
        DetachedFailurePolicy::Log
    }
}

impl DetachedFailurePolicy {
    /// Reports one failure according to the policy.
    pub(crate) fn report(self, label: &str, id: &ListenerId, err: &ListenerError) {
        match self {
            DetachedFailurePolicy::Log => {
                tracing::warn!(
                    label,
                    listener = %id,
                    kind = err.as_label(),
                    error = %err.as_message(),
                    "detached listener failure"
                );
            }
            DetachedFailurePolicy::Ignore => {}
        }
    }
}
