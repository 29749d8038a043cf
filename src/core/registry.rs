//! # Registry - ordered listeners of one event label.
//!
//! A [`Registry`] owns the listeners registered for a single label, in
//! registration order, each under an id from its own [`IdGenerator`].
//!
//! ## Dispatch modes
//! ```text
//! execute(p)             invoke L1, L2, .. LN; pending work is spawned, never awaited
//! execute_blocking(p)    invoke L1 → await → invoke L2 → await → ..  (stops at first failure)
//! execute_concurrent(p)  invoke L1, L2, .. LN → await all            (fails if any failed)
//! ```
//!
//! ## Rules
//! - Every dispatch works on a snapshot taken when it starts: listeners added
//!   meanwhile are not invoked, listeners removed meanwhile still are.
//! - The internal lock is never held while a listener runs, so listeners may
//!   register or remove listeners (on this registry or any other).
//! - Panics in a listener are caught and treated as a listener failure.
//! - Zero listeners: every mode succeeds trivially.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;

use crate::core::id::{IdGenerator, ListenerId};
use crate::error::{DispatchError, ListenerError, ListenerFailure};
use crate::listeners::{Completion, ListenerRef};
use crate::policies::DetachedFailurePolicy;

struct Entries<P> {
    ids: IdGenerator,
    listeners: Vec<(ListenerId, ListenerRef<P>)>,
}

/// Ordered listener collection for one label.
pub struct Registry<P> {
    label: Arc<str>,
    detached: DetachedFailurePolicy,
    entries: Mutex<Entries<P>>,
}

impl<P> Registry<P>
where
    P: Clone + Send + 'static,
{
    /// Creates an empty registry for `label`.
    pub fn new(label: impl Into<Arc<str>>, detached: DetachedFailurePolicy) -> Self {
        Self::with_ids(label, detached, IdGenerator::new())
    }

    /// Creates an empty registry drawing ids from `ids`.
    pub fn with_ids(
        label: impl Into<Arc<str>>,
        detached: DetachedFailurePolicy,
        ids: IdGenerator,
    ) -> Self {
        Self {
            label: label.into(),
            detached,
            entries: Mutex::new(Entries {
                ids,
                listeners: Vec::new(),
            }),
        }
    }

    /// Label this registry serves.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Appends a listener and returns its fresh id.
    pub fn register(&self, listener: ListenerRef<P>) -> ListenerId {
        let mut entries = self.lock();
        let id = entries.ids.next();
        entries.listeners.push((id.clone(), listener));
        tracing::debug!(label = %self.label, listener = %id, "listener registered");
        id
    }

    /// Removes the listener with `id`. Unknown ids return `false`.
    pub fn remove(&self, id: &ListenerId) -> bool {
        let mut entries = self.lock();
        let Some(pos) = entries.listeners.iter().position(|(known, _)| known == id) else {
            return false;
        };
        entries.listeners.remove(pos);
        tracing::debug!(label = %self.label, listener = %id, "listener removed");
        true
    }

    /// Removes every listener; returns how many were removed.
    ///
    /// The id counter is not reset.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let n = entries.listeners.len();
        entries.listeners.clear();
        n
    }

    /// Counter value of the last id this registry issued.
    pub fn last_issued(&self) -> u64 {
        self.lock().ids.last_issued()
    }

    /// Current number of listeners.
    pub fn count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<ListenerId> {
        self.lock()
            .listeners
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Fire-and-forget dispatch.
    ///
    /// Returns once every listener has been invoked. Pending completions are
    /// spawned onto the current tokio runtime; without one they are dropped
    /// unpolled and a warning is logged. Failures go to the
    /// [`DetachedFailurePolicy`] and never reach the caller.
    pub fn execute(&self, payload: P) {
        let snapshot = self.snapshot();
        tracing::debug!(label = %self.label, listeners = snapshot.len(), "execute");

        for (id, listener) in snapshot {
            match invoke(&listener, payload.clone()) {
                Completion::Ready(Ok(())) => {}
                Completion::Ready(Err(err)) => self.detached.report(&self.label, &id, &err),
                pending @ Completion::Pending(_) => self.detach(id, pending),
            }
        }
    }

    /// Sequential dispatch: each listener completes before the next starts.
    ///
    /// The first failure is returned as [`DispatchError::Listener`] and the
    /// remaining listeners are not invoked.
    pub async fn execute_blocking(&self, payload: P) -> Result<(), DispatchError> {
        let snapshot = self.snapshot();
        tracing::debug!(label = %self.label, listeners = snapshot.len(), "execute_blocking");

        for (id, listener) in snapshot {
            if let Err(source) = invoke(&listener, payload.clone()).wait().await {
                return Err(DispatchError::Listener {
                    label: self.label.to_string(),
                    id,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Concurrent dispatch: invoke all in order, then await all.
    ///
    /// Returns the number of listeners that ran. If any failed, every failure
    /// is reported in [`DispatchError::Concurrent`] after all have finished.
    pub async fn execute_concurrent(&self, payload: P) -> Result<usize, DispatchError> {
        let snapshot = self.snapshot();
        let total = snapshot.len();
        tracing::debug!(label = %self.label, listeners = total, "execute_concurrent");

        let running: Vec<_> = snapshot
            .into_iter()
            .map(|(id, listener)| {
                let completion = invoke(&listener, payload.clone());
                async move { (id, completion.wait().await) }
            })
            .collect();

        let failures: Vec<ListenerFailure> = join_all(running)
            .await
            .into_iter()
            .filter_map(|(id, res)| res.err().map(|error| ListenerFailure { id, error }))
            .collect();

        if failures.is_empty() {
            Ok(total)
        } else {
            Err(DispatchError::Concurrent {
                label: self.label.to_string(),
                total,
                failures,
            })
        }
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Copy of the listener list at this instant.
    fn snapshot(&self) -> Vec<(ListenerId, ListenerRef<P>)> {
        self.lock().listeners.clone()
    }

    /// Hands a pending completion to the runtime.
    fn detach(&self, id: ListenerId, completion: Completion) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                label = %self.label,
                listener = %id,
                "no tokio runtime; pending listener completion dropped"
            );
            return;
        };

        let label = Arc::clone(&self.label);
        let policy = self.detached;
        handle.spawn(async move {
            if let Err(err) = completion.wait().await {
                policy.report(&label, &id, &err);
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, Entries<P>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> std::fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.label)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

/// Calls a listener, turning a synchronous panic into a failed completion.
fn invoke<P: 'static>(listener: &ListenerRef<P>, payload: P) -> Completion {
    catch_unwind(AssertUnwindSafe(|| listener.call(payload)))
        .unwrap_or_else(|panic| Completion::Ready(Err(ListenerError::from_panic(panic))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::{AsyncListenerFn, ListenerFn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> Registry<u32> {
        Registry::new("test", DetachedFailurePolicy::Ignore)
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> ListenerRef<u32> {
        let log = Arc::clone(log);
        ListenerFn::arc(move |n: u32| {
            log.lock().unwrap().push(format!("{tag}{n}"));
        })
    }

    #[test]
    fn test_register_and_remove() {
        let reg = registry();
        let a = reg.register(ListenerFn::arc(|_: u32| {}));
        let b = reg.register(ListenerFn::arc(|_: u32| {}));
        assert_ne!(a, b);
        assert_eq!(reg.count(), 2);

        assert!(reg.remove(&a));
        assert!(!reg.remove(&a));
        assert_eq!(reg.ids(), vec![b]);
    }

    #[test]
    fn test_remove_unknown_and_foreign_ids() {
        let reg = registry();
        let other = registry();
        reg.register(ListenerFn::arc(|_: u32| {}));
        other.register(ListenerFn::arc(|_: u32| {}));
        let foreign = other.register(ListenerFn::arc(|_: u32| {}));

        assert!(!reg.remove(&ListenerId::from("missing")));
        assert!(!reg.remove(&foreign));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let reg = registry();
        let a = reg.register(ListenerFn::arc(|_: u32| {}));
        reg.remove(&a);
        let b = reg.register(ListenerFn::arc(|_: u32| {}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let reg = registry();
        let a = reg.register(ListenerFn::arc(|_: u32| {}));
        reg.register(ListenerFn::arc(|_: u32| {}));
        assert_eq!(reg.clear(), 2);
        assert!(reg.is_empty());
        let c = reg.register(ListenerFn::arc(|_: u32| {}));
        assert_ne!(a, c);
        assert_eq!(c.as_str(), "3");
    }

    #[test]
    fn test_execute_in_registration_order() {
        let reg = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        reg.register(recorder(&log, "a"));
        reg.register(recorder(&log, "b"));
        reg.register(recorder(&log, "c"));

        reg.execute(7);
        assert_eq!(*log.lock().unwrap(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn test_execute_isolates_failures_and_panics() {
        let reg = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        reg.register(recorder(&log, "a"));
        reg.register(ListenerFn::arc(|_: u32| Err::<(), _>("nope")));
        reg.register(ListenerFn::arc(|n: u32| {
            if n > 0 {
                panic!("listener blew up");
            }
        }));
        reg.register(recorder(&log, "d"));

        reg.execute(1);
        assert_eq!(*log.lock().unwrap(), vec!["a1", "d1"]);
    }

    #[test]
    fn test_execute_without_runtime_drops_pending() {
        let reg = registry();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        reg.register(AsyncListenerFn::arc(move |_: u32| {
            let h = Arc::clone(&h);
            async move {
                h.fetch_add(1, Ordering::SeqCst);
            }
        }));

        reg.execute(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_registry_dispatch_is_trivial() {
        let reg = registry();
        reg.execute(0);
        assert_eq!(reg.execute_blocking(0).await, Ok(()));
        assert_eq!(reg.execute_concurrent(0).await, Ok(0));
    }

    #[tokio::test]
    async fn test_blocking_short_circuits() {
        let reg = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = reg.register(ListenerFn::arc(|_: u32| Err::<(), _>("first")));
        reg.register(recorder(&log, "b"));

        let err = reg.execute_blocking(3).await.unwrap_err();
        match err {
            DispatchError::Listener { label, id, source } => {
                assert_eq!(label, "test");
                assert_eq!(id, failing);
                assert_eq!(source, ListenerError::fail("first"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_collects_all_failures() {
        let reg = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = reg.register(ListenerFn::arc(|_: u32| Err::<(), _>("a")));
        reg.register(recorder(&log, "b"));
        let c = reg.register(AsyncListenerFn::arc(|_: u32| async {
            Err::<(), _>(ListenerError::fail("c"))
        }));

        let err = reg.execute_concurrent(5).await.unwrap_err();
        assert_eq!(*log.lock().unwrap(), vec!["b5"]);
        match err {
            DispatchError::Concurrent { total, failures, .. } => {
                assert_eq!(total, 3);
                let ids: Vec<_> = failures.into_iter().map(|f| f.id).collect();
                assert_eq!(ids, vec![a, c]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_reports_panic_as_failure() {
        let reg = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        let panicking = reg.register(ListenerFn::arc(|n: u32| {
            if n > 0 {
                panic!("x");
            }
        }));
        reg.register(recorder(&log, "b"));

        let err = reg.execute_concurrent(1).await.unwrap_err();
        assert_eq!(*log.lock().unwrap(), vec!["b1"]);
        let failures = err.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, &panicking);
        assert!(failures[0].1.is_panic());
    }

    #[tokio::test]
    async fn test_concurrent_reports_completed_count() {
        let reg = registry();
        reg.register(ListenerFn::arc(|_: u32| {}));
        reg.register(AsyncListenerFn::arc(|_: u32| async {}));
        assert_eq!(reg.execute_concurrent(1).await, Ok(2));
    }
}
