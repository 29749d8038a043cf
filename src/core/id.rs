//! # Listener identifiers.
//!
//! [`IdGenerator`] hands out [`ListenerId`]s for one registry. Ids are the
//! decimal rendering of a counter that starts at `1` and only ever grows, so a
//! removed listener's id is never issued again by the same generator.
//!
//! Ids are **not** globally unique: two registries each start at `"1"`. An id
//! only means something together with the label it was registered under.

use std::fmt;
use std::sync::Arc;

/// Opaque handle naming one registered listener.
///
/// Cheap to clone. Compare ids only within the label they were issued for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(Arc<str>);

impl ListenerId {
    /// Textual form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListenerId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ListenerId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for ListenerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotonic id source owned by a single registry.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `"1"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues a sequence whose last issued counter value was `last`.
    ///
    /// Used when a label's registry is rebuilt so ids handed out before the
    /// rebuild stay unique.
    pub fn resume_after(last: u64) -> Self {
        Self { last }
    }

    /// Counter value of the most recently issued id (`0` if none yet).
    pub fn last_issued(&self) -> u64 {
        self.last
    }

    /// Returns an id this generator has never returned before.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> ListenerId {
        self.last += 1;
        ListenerId::from(self.last.to_string())
    }
}
