//! # Function-backed listeners
//!
//! [`ListenerFn`] wraps a synchronous closure `F: Fn(P) -> O`; its body runs
//! to completion inside `call`. [`AsyncListenerFn`] wraps `F: Fn(P) -> Fut`
//! and produces a fresh future per invocation, reported as
//! [`Completion::Pending`].
//!
//! `O` (or `Fut::Output`) is anything implementing [`IntoOutcome`]: `()` or
//! `Result<(), E>` with `E: Into<ListenerError>`.
//!
//! ## Example
//! ```rust
//! use topicbus::{AsyncListenerFn, Listener, ListenerError, ListenerFn};
//!
//! let sync_l = ListenerFn::new(|n: u32| {
//!     println!("got {n}");
//! });
//! assert!(sync_l.call(1).is_ready());
//!
//! let async_l = AsyncListenerFn::new(|n: u32| async move {
//!     if n == 0 {
//!         return Err(ListenerError::fail("zero"));
//!     }
//!     Ok(())
//! });
//! assert!(!async_l.call(1).is_ready());
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::listeners::{Completion, IntoOutcome, Listener};

/// Synchronous function-backed listener.
pub struct ListenerFn<F> {
    f: F,
}

impl<F> ListenerFn<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, P, O> Listener<P> for ListenerFn<F>
where
    F: Fn(P) -> O + Send + Sync + 'static,
    O: IntoOutcome,
    P: 'static,
{
    fn call(&self, payload: P) -> Completion {
        Completion::Ready((self.f)(payload).into_outcome())
    }
}

impl<F> std::fmt::Debug for ListenerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ListenerFn")
    }
}

/// Asynchronous function-backed listener.
///
/// Code in the closure before its `async` block runs at invocation time; the
/// future runs when the dispatcher awaits (or spawns) it.
pub struct AsyncListenerFn<F> {
    f: F,
}

impl<F> AsyncListenerFn<F> {
    /// Wraps a closure returning a future.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, P, Fut> Listener<P> for AsyncListenerFn<F>
where
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
    P: 'static,
{
    fn call(&self, payload: P) -> Completion {
        let fut = (self.f)(payload);
        Completion::pending(async move { fut.await.into_outcome() })
    }
}

impl<F> std::fmt::Debug for AsyncListenerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AsyncListenerFn")
    }
}
