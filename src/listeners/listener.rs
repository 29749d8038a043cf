//! # Listener abstraction.
//!
//! A [`Listener`] receives one payload per dispatch and answers with a
//! [`Completion`]. The common handle type is [`ListenerRef`], an
//! `Arc<dyn Listener<P>>` suitable for snapshotting during dispatch.

use std::sync::Arc;

use crate::error::ListenerError;
use crate::listeners::Completion;

/// # Unit of behavior invoked with a payload.
///
/// Implementors either finish inside `call` (return [`Completion::Ready`]) or
/// hand back the remaining work as [`Completion::Pending`].
///
/// # Example
/// ```
/// use topicbus::{Completion, Listener};
///
/// struct Audit;
///
/// impl Listener<String> for Audit {
///     fn call(&self, line: String) -> Completion {
///         if line.is_empty() {
///             return Completion::failed("empty audit line");
///         }
///         Completion::ready()
///     }
/// }
/// ```
pub trait Listener<P>: Send + Sync + 'static {
    /// Invokes the listener with its own copy of the payload.
    fn call(&self, payload: P) -> Completion;
}

/// Shared listener handle.
pub type ListenerRef<P> = Arc<dyn Listener<P>>;

impl<P, L> Listener<P> for Arc<L>
where
    L: Listener<P> + ?Sized,
{
    fn call(&self, payload: P) -> Completion {
        (**self).call(payload)
    }
}

/// Conversion from a listener body's return value into its outcome.
///
/// Implemented for `()` (always succeeds) and for `Result<(), E>` where the
/// error converts into [`ListenerError`].
pub trait IntoOutcome {
    /// Converts into the listener outcome.
    fn into_outcome(self) -> Result<(), ListenerError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<ListenerError>,
{
    fn into_outcome(self) -> Result<(), ListenerError> {
        self.map_err(Into::into)
    }
}
