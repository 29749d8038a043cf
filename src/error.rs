//! Error types used by listeners and dispatch.
//!
//! This module defines two main error enums:
//!
//! - [`ListenerError`] — a single listener failed (returned an error or panicked).
//! - [`DispatchError`] — what the caller of a waiting dispatch observes.
//!
//! Both types provide `as_label` for logs. Absence of a label or id is never
//! an error: `off` returns `false` and `emit*` are no-ops.

use std::any::Any;

use thiserror::Error;

use crate::core::ListenerId;

/// # Errors produced by a single listener invocation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener reported a failure.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The listener panicked, either while being called or while its
    /// completion was polled.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ListenerError {
    /// Builds a [`ListenerError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use topicbus::ListenerError;
    ///
    /// let err = ListenerError::fail("connection refused");
    /// assert_eq!(err.to_string(), "listener failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ListenerError::Failed {
            error: error.to_string(),
        }
    }

    /// Converts a caught panic payload into [`ListenerError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        ListenerError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use topicbus::ListenerError;
    ///
    /// assert_eq!(ListenerError::fail("x").as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Failed { error } => format!("error: {error}"),
            ListenerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True if the listener panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::Failed { error }
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::Failed {
            error: error.to_string(),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ListenerError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ListenerError::Failed {
            error: error.to_string(),
        }
    }
}

/// One failed listener inside a concurrent dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Id the listener was registered under.
    pub id: ListenerId,
    /// What went wrong.
    pub error: ListenerError,
}

/// # Errors observed by callers of `emit_blocking` / `emit_concurrent`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Sequential dispatch stopped at the first failing listener;
    /// listeners registered after it were not invoked.
    #[error("listener {id} on '{label}' failed: {source}")]
    Listener {
        /// Event label that was being dispatched.
        label: String,
        /// The failing listener.
        id: ListenerId,
        /// The listener's error.
        #[source]
        source: ListenerError,
    },

    /// At least one listener of a concurrent dispatch failed.
    /// All listeners were invoked and awaited before this was reported.
    #[error("{} of {total} listeners on '{label}' failed", .failures.len())]
    Concurrent {
        /// Event label that was being dispatched.
        label: String,
        /// Number of listeners that were invoked.
        total: usize,
        /// Every failure, in registration order.
        failures: Vec<ListenerFailure>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Listener { .. } => "dispatch_short_circuited",
            DispatchError::Concurrent { .. } => "dispatch_partial_failure",
        }
    }

    /// Event label the failed dispatch was for.
    pub fn label(&self) -> &str {
        match self {
            DispatchError::Listener { label, .. } | DispatchError::Concurrent { label, .. } => {
                label
            }
        }
    }

    /// Flattens the error into `(id, error)` pairs.
    pub fn failures(&self) -> Vec<(&ListenerId, &ListenerError)> {
        match self {
            DispatchError::Listener { id, source, .. } => vec![(id, source)],
            DispatchError::Concurrent { failures, .. } => {
                failures.iter().map(|f| (&f.id, &f.error)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let err = ListenerError::from_panic(Box::new("boom"));
        assert_eq!(
            err,
            ListenerError::Panicked {
                info: "boom".into()
            }
        );
        assert!(err.is_panic());
    }

    #[test]
    fn test_panic_payload_string() {
        let err = ListenerError::from_panic(Box::new(String::from("kaboom")));
        assert_eq!(err.as_message(), "panic: kaboom");
    }

    #[test]
    fn test_panic_payload_unknown() {
        let err = ListenerError::from_panic(Box::new(42_u8));
        assert_eq!(err.as_message(), "panic: unknown panic");
    }

    #[test]
    fn test_concurrent_display_counts_failures() {
        let err = DispatchError::Concurrent {
            label: "order.placed".into(),
            total: 3,
            failures: vec![ListenerFailure {
                id: ListenerId::from("2"),
                error: ListenerError::fail("nope"),
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 listeners on 'order.placed' failed");
        assert_eq!(err.as_label(), "dispatch_partial_failure");
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.label(), "order.placed");
    }

    #[test]
    fn test_listener_display() {
        let err = DispatchError::Listener {
            label: "tick".into(),
            id: ListenerId::from("1"),
            source: "late".into(),
        };
        assert_eq!(
            err.to_string(),
            "listener 1 on 'tick' failed: listener failed: late"
        );
    }
}
