//! # Listener abstractions.
//!
//! This module provides the listener-related types:
//! - [`Listener`] - trait for anything that can be invoked with a payload
//! - [`Completion`] - the "invoke and obtain a completion signal" result
//! - [`ListenerFn`] / [`AsyncListenerFn`] - closure-backed listeners
//! - [`ListenerRef`] - shared reference to a listener (`Arc<dyn Listener<P>>`)

mod completion;
mod listener;
mod listener_fn;

pub use completion::{BoxCompletion, Completion};
pub use listener::{IntoOutcome, Listener, ListenerRef};
pub use listener_fn::{AsyncListenerFn, ListenerFn};
