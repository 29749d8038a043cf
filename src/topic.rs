//! # Typed event labels.
//!
//! A [`Topic<P>`] is an event label that also fixes the payload type `P`.
//! Declaring topics as constants gives every `on`/`emit` call site a
//! compile-time check that the payload matches the label:
//!
//! ```rust
//! use topicbus::Topic;
//!
//! #[derive(Clone)]
//! struct UserJoined { name: String }
//!
//! const USER_JOINED: Topic<UserJoined> = Topic::new("user.joined");
//! assert_eq!(USER_JOINED.name(), "user.joined");
//! ```
//!
//! Two topics with the same name but different payload types are different
//! labels; each gets its own registry.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Event label bound to a payload type.
pub struct Topic<P> {
    name: Cow<'static, str>,
    _payload: PhantomData<fn(P)>,
}

impl<P> Topic<P> {
    /// Creates a topic from a static name. Usable in `const` items.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _payload: PhantomData,
        }
    }

    /// Creates a topic from a name built at runtime.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            _payload: PhantomData,
        }
    }

    /// Label name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<P: 'static> Topic<P> {
    pub(crate) fn key(&self) -> LabelKey {
        LabelKey {
            name: self.name.clone(),
            payload: TypeId::of::<P>(),
        }
    }
}

impl<P> Clone for Topic<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P> fmt::Debug for Topic<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("payload", &std::any::type_name::<P>())
            .finish()
    }
}

impl<P> fmt::Display for Topic<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Map key: label name plus payload type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LabelKey {
    pub(crate) name: Cow<'static, str>,
    payload: TypeId,
}
