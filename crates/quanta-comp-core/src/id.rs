//! Component identity.
//!
//! Every component carries exactly one [`CompId`] for its whole lifetime.
//! The id doubles as the host runtime's reconciliation key unless a key is
//! supplied explicitly. Ids are generated from a monotonic counter owned by
//! [`IdGenerator`], so no id is reused while the generator is alive.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stable, process-unique component identifier.
///
/// Cheap to clone; the string is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompId(Arc<str>);

impl CompId {
    /// Create an id from an explicit string.
    ///
    /// Used when application code pins identity (for example a dialog that
    /// must keep its id across rebuilds).
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompId({})", self.0)
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CompId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CompId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Monotonic id source.
///
/// Ids are plain base-10 counter values (`"1"`, `"2"`, ...). The counter
/// starts at zero and is pre-incremented, so the first generated id is `"1"`.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    /// Create a generator starting at zero.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Produce the next raw counter value.
    pub fn next_raw(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Produce the next id.
    pub fn next_id(&self) -> CompId {
        let id = CompId::from(self.next_raw().to_string());
        tracing::trace!(target: "quanta_comp::identity", %id, "generated component id");
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Short class name for a type: the last path segment of its type name,
/// with generic arguments stripped.
///
/// `quanta_comp::widgets::Div` becomes `Div`, `Panel<Foo>` becomes `Panel`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    short_name(std::any::type_name::<T>())
}

pub(crate) fn short_name(type_name: &'static str) -> &'static str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
