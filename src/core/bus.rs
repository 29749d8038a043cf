//! # EventBus - typed labels mapped to listener registries.
//!
//! [`EventBus`] keeps at most one [`Registry`] per [`Topic`]. A registry is
//! created lazily by the first `on` for its topic.
//!
//! ## Architecture
//! ```text
//! on(topic, l)  ──► registries[topic] (created if absent) ──► Registry::register ──► id
//! off(topic, id) ─► registries[topic]? ──► Registry::remove   (false if absent)
//! emit*(topic, p) ► registries[topic]? ──► Registry::execute* (no-op if absent)
//! ```
//!
//! ## Rules
//! - Unknown labels are never errors: `off` returns `false`, `emit*` succeed trivially.
//! - Ids are scoped to their topic; pass the same topic to `off` as to `on`.
//! - The label map lock is released before any listener runs.
//! - With [`RetentionPolicy::Prune`](crate::RetentionPolicy::Prune) a registry is
//!   dropped when `off` empties it; otherwise it is kept.
//! - A dropped registry's id counter is retired, not forgotten: a rebuilt
//!   registry for the same label continues after it, so stale ids never
//!   match a newer listener.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::{Config, EventBusBuilder, IdGenerator, ListenerId, Registry};
use crate::error::DispatchError;
use crate::listeners::{AsyncListenerFn, IntoOutcome, Listener, ListenerFn};
use crate::topic::{LabelKey, Topic};

/// Payload-independent view of a registry.
trait AnyRegistry: Send + Sync {
    fn last_issued(&self) -> u64;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<P> AnyRegistry for Registry<P>
where
    P: Clone + Send + 'static,
{
    fn last_issued(&self) -> u64 {
        Registry::last_issued(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

type ErasedRegistry = Arc<dyn AnyRegistry>;

/// Typed publish/subscribe hub.
///
/// `EventBus` is `Send + Sync`; share it as `Arc<EventBus>` when listeners
/// need to reach the bus themselves.
///
/// ## Example
/// ```rust
/// use topicbus::{EventBus, Topic};
///
/// #[derive(Clone, Debug)]
/// struct Tick(u64);
///
/// const TICK: Topic<Tick> = Topic::new("tick");
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = EventBus::new();
/// let id = bus.on_fn(&TICK, |t: Tick| println!("tick {}", t.0));
///
/// bus.emit(&TICK, Tick(1));
/// bus.emit_blocking(&TICK, Tick(2)).await.unwrap();
///
/// assert!(bus.off(&TICK, &id));
/// assert!(!bus.off(&TICK, &id));
/// # }
/// ```
pub struct EventBus {
    cfg: Config,
    registries: RwLock<HashMap<LabelKey, ErasedRegistry>>,
    /// Last issued id counter of labels whose registry was dropped.
    retired: Mutex<HashMap<LabelKey, u64>>,
}

impl EventBus {
    /// Creates a bus with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(cfg: Config) -> Self {
        Self {
            cfg,
            registries: RwLock::new(HashMap::new()),
            retired: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a builder starting from the default configuration.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registers `listener` for `topic` and returns its id.
    pub fn on<P, L>(&self, topic: &Topic<P>, listener: L) -> ListenerId
    where
        P: Clone + Send + 'static,
        L: Listener<P>,
    {
        let key = topic.key();
        let listener = Arc::new(listener);

        // Registration happens under the map lock so pruning cannot orphan it.
        {
            let map = self.read();
            if let Some(reg) = map.get(&key).and_then(downcast::<P>) {
                return reg.register(listener);
            }
        }

        let mut map = self.write();
        if let Some(reg) = map.get(&key).and_then(downcast::<P>) {
            return reg.register(listener);
        }
        let ids = match self.retired().remove(&key) {
            Some(last) => IdGenerator::resume_after(last),
            None => IdGenerator::new(),
        };
        let reg = Arc::new(Registry::<P>::with_ids(
            topic.name(),
            self.cfg.detached_failures,
            ids,
        ));
        let id = reg.register(listener);
        map.insert(key, reg);
        tracing::debug!(label = topic.name(), "registry created");
        id
    }

    /// Registers a synchronous closure. See [`ListenerFn`].
    pub fn on_fn<P, F, O>(&self, topic: &Topic<P>, f: F) -> ListenerId
    where
        P: Clone + Send + 'static,
        F: Fn(P) -> O + Send + Sync + 'static,
        O: IntoOutcome,
    {
        self.on(topic, ListenerFn::new(f))
    }

    /// Registers a closure returning a future. See [`AsyncListenerFn`].
    pub fn on_async<P, F, Fut>(&self, topic: &Topic<P>, f: F) -> ListenerId
    where
        P: Clone + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoOutcome,
    {
        self.on(topic, AsyncListenerFn::new(f))
    }

    /// Removes the listener `id` from `topic`.
    ///
    /// Returns `false` if the topic has no registry or the id is not in it.
    pub fn off<P>(&self, topic: &Topic<P>, id: &ListenerId) -> bool
    where
        P: Clone + Send + 'static,
    {
        let Some(reg) = self.registry(topic) else {
            return false;
        };
        let removed = reg.remove(id);
        if removed && self.cfg.retention.prunes() {
            self.prune(topic, &reg);
        }
        removed
    }

    /// Removes every listener of `topic`; returns how many were removed.
    pub fn off_all<P>(&self, topic: &Topic<P>) -> usize
    where
        P: Clone + Send + 'static,
    {
        let Some(reg) = self.registry(topic) else {
            return 0;
        };
        let removed = reg.clear();
        if self.cfg.retention.prunes() {
            self.prune(topic, &reg);
        }
        removed
    }

    /// Fire-and-forget dispatch to every listener of `topic`.
    ///
    /// Listener failures never reach the caller; see
    /// [`DetachedFailurePolicy`](crate::DetachedFailurePolicy).
    pub fn emit<P>(&self, topic: &Topic<P>, payload: P)
    where
        P: Clone + Send + 'static,
    {
        if let Some(reg) = self.registry(topic) {
            reg.execute(payload);
        }
    }

    /// Sequential dispatch; stops at the first failing listener.
    pub async fn emit_blocking<P>(&self, topic: &Topic<P>, payload: P) -> Result<(), DispatchError>
    where
        P: Clone + Send + 'static,
    {
        match self.registry(topic) {
            Some(reg) => reg.execute_blocking(payload).await,
            None => Ok(()),
        }
    }

    /// Concurrent dispatch; returns how many listeners ran, or every failure.
    pub async fn emit_concurrent<P>(
        &self,
        topic: &Topic<P>,
        payload: P,
    ) -> Result<usize, DispatchError>
    where
        P: Clone + Send + 'static,
    {
        match self.registry(topic) {
            Some(reg) => reg.execute_concurrent(payload).await,
            None => Ok(0),
        }
    }

    /// Number of listeners currently registered for `topic`.
    pub fn listener_count<P>(&self, topic: &Topic<P>) -> usize
    where
        P: Clone + Send + 'static,
    {
        self.registry(topic).map_or(0, |reg| reg.count())
    }

    /// True if `topic` has at least one listener.
    pub fn has_listeners<P>(&self, topic: &Topic<P>) -> bool
    where
        P: Clone + Send + 'static,
    {
        self.listener_count(topic) > 0
    }

    /// Sorted names of labels that currently own a registry.
    ///
    /// Under [`RetentionPolicy::Keep`](crate::RetentionPolicy::Keep) this
    /// includes labels whose listeners were all removed.
    ///
    /// A name shared by topics of different payload types is listed once.
    pub fn labels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().map(|k| k.name.to_string()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Drops every registry.
    ///
    /// Dispatches already in flight keep their snapshots and finish normally.
    pub fn clear(&self) {
        let mut map = self.write();
        let mut retired = self.retired();
        for (key, reg) in map.drain() {
            retired.insert(key, reg.last_issued());
        }
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn registry<P>(&self, topic: &Topic<P>) -> Option<Arc<Registry<P>>>
    where
        P: Clone + Send + 'static,
    {
        self.read().get(&topic.key()).and_then(downcast::<P>)
    }

    /// Drops `reg` if it is still the topic's registry and still empty.
    fn prune<P>(&self, topic: &Topic<P>, reg: &Arc<Registry<P>>)
    where
        P: Clone + Send + 'static,
    {
        let key = topic.key();
        let mut map = self.write();
        let current = map.get(&key).and_then(downcast::<P>);
        if current.is_some_and(|cur| Arc::ptr_eq(&cur, reg) && cur.is_empty()) {
            map.remove(&key);
            self.retired().insert(key, reg.last_issued());
            tracing::debug!(label = topic.name(), "empty registry pruned");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<LabelKey, ErasedRegistry>> {
        self.registries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<LabelKey, ErasedRegistry>> {
        self.registries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Always taken after the registry map's write lock.
    fn retired(&self) -> MutexGuard<'_, HashMap<LabelKey, u64>> {
        self.retired.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("cfg", &self.cfg)
            .field("labels", &self.labels())
            .finish()
    }
}

fn downcast<P>(erased: &ErasedRegistry) -> Option<Arc<Registry<P>>>
where
    P: Clone + Send + 'static,
{
    Arc::clone(erased).into_any().downcast::<Registry<P>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::RetentionPolicy;

    const NUM: Topic<u32> = Topic::new("num");

    #[test]
    fn test_on_creates_registry_lazily() {
        let bus = EventBus::new();
        assert!(bus.labels().is_empty());
        bus.on_fn(&NUM, |_: u32| {});
        assert_eq!(bus.labels(), vec!["num".to_string()]);
        assert_eq!(bus.listener_count(&NUM), 1);
    }

    #[test]
    fn test_keep_retains_empty_registry() {
        let bus = EventBus::new();
        let id = bus.on_fn(&NUM, |_: u32| {});
        assert!(bus.off(&NUM, &id));
        assert_eq!(bus.labels(), vec!["num".to_string()]);
        assert!(!bus.has_listeners(&NUM));
    }

    #[test]
    fn test_prune_drops_empty_registry() {
        let bus = EventBus::builder()
            .with_retention(RetentionPolicy::Prune)
            .build();
        let a = bus.on_fn(&NUM, |_: u32| {});
        let b = bus.on_fn(&NUM, |_: u32| {});

        assert!(bus.off(&NUM, &a));
        assert_eq!(bus.labels().len(), 1);
        assert!(bus.off(&NUM, &b));
        assert!(bus.labels().is_empty());
        assert!(!bus.off(&NUM, &b));
    }

    #[test]
    fn test_prune_keeps_id_sequence_for_new_registry() {
        let bus = EventBus::builder()
            .with_retention(RetentionPolicy::Prune)
            .build();
        let a = bus.on_fn(&NUM, |_: u32| {});
        assert!(bus.off(&NUM, &a));
        assert!(bus.labels().is_empty());

        let b = bus.on_fn(&NUM, |_: u32| {});
        assert_ne!(a, b);
        assert!(!bus.off(&NUM, &a));
        assert_eq!(bus.listener_count(&NUM), 1);
    }

    #[test]
    fn test_clear_keeps_id_sequence() {
        let bus = EventBus::new();
        let a = bus.on_fn(&NUM, |_: u32| {});
        bus.clear();

        let b = bus.on_fn(&NUM, |_: u32| {});
        assert_ne!(a, b);
        assert!(!bus.off(&NUM, &a));
        assert!(bus.off(&NUM, &b));
    }

    #[test]
    fn test_labels_lists_shared_name_once() {
        let bus = EventBus::new();
        let text: Topic<String> = Topic::new("num");
        bus.on_fn(&NUM, |_: u32| {});
        bus.on_fn(&text, |_: String| {});
        assert_eq!(bus.labels(), vec!["num".to_string()]);
    }

    #[test]
    fn test_off_all_and_clear() {
        let bus = EventBus::new();
        bus.on_fn(&NUM, |_: u32| {});
        bus.on_fn(&NUM, |_: u32| {});
        assert_eq!(bus.off_all(&NUM), 2);
        assert_eq!(bus.off_all(&Topic::<u32>::new("never")), 0);

        bus.on_fn(&NUM, |_: u32| {});
        bus.clear();
        assert!(bus.labels().is_empty());
        assert_eq!(bus.listener_count(&NUM), 0);
    }

    #[test]
    fn test_same_name_different_payload_are_separate() {
        let bus = EventBus::new();
        let text: Topic<String> = Topic::new("num");
        let id = bus.on_fn(&NUM, |_: u32| {});

        assert_eq!(bus.listener_count(&text), 0);
        assert!(!bus.off(&text, &id));
        assert_eq!(bus.listener_count(&NUM), 1);
    }
}
