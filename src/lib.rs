//! # topicbus
//!
//! **topicbus** is a small typed publish/subscribe library for Rust.
//!
//! Callers register listeners under a typed label ([`Topic`]) and later
//! trigger every listener of that label with a payload, in one of three
//! dispatch modes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     on(&TOPIC, listener) ──► id          off(&TOPIC, &id) ──► bool
//!            │                                    │
//!            ▼                                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus                                                         │
//! │  - one Registry per (label, payload type), created lazily         │
//! │  - RetentionPolicy: keep or prune emptied registries              │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Registry    │   │  Registry    │   │  Registry    │
//!     │ "user.joined"│   │ "order.paid" │   │    "tick"    │
//!     │ IdGenerator  │   │ IdGenerator  │   │ IdGenerator  │
//!     │ [(id, L)...] │   │ [(id, L)...] │   │ [(id, L)...] │
//!     └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ### Dispatch
//! ```text
//! emit(&T, p)            snapshot ─► call L1, L2, .. LN
//!                                     ├─ Ready(Err)  ─► DetachedFailurePolicy
//!                                     └─ Pending     ─► tokio::spawn (failures ─► DetachedFailurePolicy)
//!
//! emit_blocking(&T, p)   snapshot ─► call L1 ─► await ─► call L2 ─► await ─► ..
//!                                     └─ first failure ─► Err(DispatchError::Listener), rest skipped
//!
//! emit_concurrent(&T, p) snapshot ─► call L1, L2, .. LN ─► join_all
//!                                     └─ any failure ─► Err(DispatchError::Concurrent { failures })
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                              |
//! |-----------------|----------------------------------------------------------|-------------------------------------------------|
//! | **Bus**         | Register, remove and dispatch by typed label.            | [`EventBus`], [`Topic`]                         |
//! | **Listeners**   | Sync or async listeners behind one completion signal.    | [`Listener`], [`Completion`], [`ListenerFn`], [`AsyncListenerFn`] |
//! | **Registry**    | Ordered listeners of one label, usable standalone.       | [`Registry`], [`ListenerId`], [`IdGenerator`]   |
//! | **Policies**    | Empty-registry housekeeping, detached failure handling.  | [`RetentionPolicy`], [`DetachedFailurePolicy`]  |
//! | **Errors**      | Typed listener and dispatch errors.                      | [`ListenerError`], [`DispatchError`]            |
//! | **Configuration** | Bus settings and builder.                              | [`Config`], [`EventBusBuilder`]                 |
//!
//! ## Example
//! ```rust
//! use topicbus::{EventBus, ListenerError, Topic};
//!
//! #[derive(Clone, Debug)]
//! struct UserJoined {
//!     name: String,
//! }
//!
//! const USER_JOINED: Topic<UserJoined> = Topic::new("user.joined");
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new();
//!
//!     bus.on_fn(&USER_JOINED, |ev: UserJoined| println!("welcome, {}", ev.name));
//!     let mailer = bus.on_async(&USER_JOINED, |ev: UserJoined| async move {
//!         if ev.name.is_empty() {
//!             return Err(ListenerError::fail("no name"));
//!         }
//!         tokio::task::yield_now().await;
//!         Ok(())
//!     });
//!
//!     bus.emit_blocking(&USER_JOINED, UserJoined { name: "ada".into() }).await?;
//!     let ran = bus
//!         .emit_concurrent(&USER_JOINED, UserJoined { name: "lin".into() })
//!         .await?;
//!     assert_eq!(ran, 2);
//!
//!     assert!(bus.off(&USER_JOINED, &mailer));
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod listeners;
mod policies;
mod topic;

// ---- Public re-exports ----

pub use crate::core::{Config, EventBus, EventBusBuilder, IdGenerator, ListenerId, Registry};
pub use error::{DispatchError, ListenerError, ListenerFailure};
pub use listeners::{
    AsyncListenerFn, BoxCompletion, Completion, IntoOutcome, Listener, ListenerFn, ListenerRef,
};
pub use policies::{DetachedFailurePolicy, RetentionPolicy};
pub use topic::Topic;
