//! # Completion signal returned by a listener call.
//!
//! A synchronous listener finishes inside `call` and returns
//! [`Completion::Ready`]. An asynchronous listener returns
//! [`Completion::Pending`] holding the rest of its work as a boxed future.
//! Dispatch code only ever deals with `Completion`, so both shapes share one
//! code path.
//!
//! ```text
//! listener.call(payload) ──► Completion::Ready(result)   (already done)
//!                        └─► Completion::Pending(future) (await to finish)
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures::FutureExt;

use crate::error::ListenerError;

/// Boxed, sendable future produced by an asynchronous listener.
pub type BoxCompletion = Pin<Box<dyn Future<Output = Result<(), ListenerError>> + Send + 'static>>;

/// Outcome of invoking a listener.
#[must_use = "a pending completion does nothing unless awaited or spawned"]
pub enum Completion {
    /// The listener already finished.
    Ready(Result<(), ListenerError>),
    /// The listener is still running; await the future to finish it.
    Pending(BoxCompletion),
}

impl Completion {
    /// Successful, already finished.
    pub fn ready() -> Self {
        Completion::Ready(Ok(()))
    }

    /// Failed, already finished.
    pub fn failed(err: impl Into<ListenerError>) -> Self {
        Completion::Ready(Err(err.into()))
    }

    /// Wraps a future that finishes the listener's work.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        Completion::Pending(Box::pin(fut))
    }

    /// True if no awaiting is needed.
    pub fn is_ready(&self) -> bool {
        matches!(self, Completion::Ready(_))
    }

    /// Drives the completion to its end.
    ///
    /// A panic raised while polling a pending completion is caught and
    /// reported as [`ListenerError::Panicked`].
    pub async fn wait(self) -> Result<(), ListenerError> {
        match self {
            Completion::Ready(res) => res,
            Completion::Pending(fut) => AssertUnwindSafe(fut)
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ListenerError::from_panic(panic))),
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Ready(res) => f.debug_tuple("Ready").field(res).finish(),
            Completion::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl From<Result<(), ListenerError>> for Completion {
    fn from(res: Result<(), ListenerError>) -> Self {
        Completion::Ready(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_resolves_immediately() {
        assert!(Completion::ready().is_ready());
        assert_eq!(Completion::ready().wait().await, Ok(()));
    }

    #[tokio::test]
    async fn test_failed_carries_error() {
        let res = Completion::failed("bad").wait().await;
        assert_eq!(res, Err(ListenerError::fail("bad")));
    }

    #[tokio::test]
    async fn test_pending_panic_is_caught() {
        let explode = true;
        let c = Completion::pending(async move {
            if explode {
                panic!("inside future");
            }
            Ok(())
        });
        assert!(!c.is_ready());
        let err = c.wait().await.unwrap_err();
        assert_eq!(
            err,
            ListenerError::Panicked {
                info: "inside future".into()
            }
        );
    }
}
