//! Injectable process-wide services.
//!
//! The component layer needs a few coordination points that are shared by
//! every component in a tree:
//!
//! - the id counter ([`IdGenerator`])
//! - the focus claim ([`FocusTracker`]): which single component currently
//!   intends to hold input focus
//! - the scroll gate ([`ScrollGate`]): whether scroll offsets may be written
//! - the render counter
//!
//! They live in a [`CompContext`] that components capture at construction,
//! rather than in module-level statics, so tests and independent component
//! trees can each own a fresh set.
//!
//! # Scroll gate discipline
//!
//! Callers that suspend scroll writes must restore the gate on every path,
//! including errors. [`CompContext::suspend_scroll_writes`] returns a guard
//! that does this on drop:
//!
//! ```
//! use quanta_comp_core::CompContext;
//!
//! let ctx = CompContext::new();
//! {
//!     let _suspended = ctx.suspend_scroll_writes();
//!     assert!(!ctx.scroll_gate().allows_writes());
//!     // ... bulk structural changes ...
//! }
//! assert!(ctx.scroll_gate().allows_writes());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::FrameworkConfig;
use crate::id::{CompId, IdGenerator};

/// Records which component currently claims input focus.
///
/// At most one id is claimed at a time; a later claim silently replaces an
/// earlier one.
#[derive(Debug, Default)]
pub struct FocusTracker {
    claimed: Mutex<Option<CompId>>,
}

impl FocusTracker {
    /// Create a tracker with no claim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim focus for `id`, returning the previous claimant.
    pub fn claim(&self, id: CompId) -> Option<CompId> {
        let previous = self.claimed.lock().replace(id.clone());
        tracing::trace!(target: "quanta_comp::focus", %id, ?previous, "focus claimed");
        previous
    }

    /// Whether `id` is the current claimant.
    pub fn is_claimed(&self, id: &CompId) -> bool {
        self.claimed.lock().as_ref() == Some(id)
    }

    /// The current claimant, if any.
    pub fn current(&self) -> Option<CompId> {
        self.claimed.lock().clone()
    }

    /// Drop the claim if `id` still holds it. Returns `true` if released.
    pub fn release(&self, id: &CompId) -> bool {
        let mut claimed = self.claimed.lock();
        if claimed.as_ref() == Some(id) {
            *claimed = None;
            true
        } else {
            false
        }
    }

    /// Drop any claim.
    pub fn clear(&self) {
        *self.claimed.lock() = None;
    }
}

/// Process-wide switch suspending all scroll-offset writes.
#[derive(Debug)]
pub struct ScrollGate {
    allowed: AtomicBool,
}

impl ScrollGate {
    /// Create a gate in the given state.
    pub fn new(allowed: bool) -> Self {
        Self {
            allowed: AtomicBool::new(allowed),
        }
    }

    /// Whether scroll writes are currently allowed.
    #[inline]
    pub fn allows_writes(&self) -> bool {
        self.allowed.load(Ordering::Acquire)
    }

    /// Set the gate, returning the previous state.
    ///
    /// Prefer [`CompContext::suspend_scroll_writes`], which cannot forget to
    /// re-open the gate.
    pub fn set_allowed(&self, allowed: bool) -> bool {
        let previous = self.allowed.swap(allowed, Ordering::AcqRel);
        tracing::debug!(target: "quanta_comp::scroll", allowed, previous, "scroll gate changed");
        previous
    }
}

impl Default for ScrollGate {
    fn default() -> Self {
        Self::new(true)
    }
}

struct ContextInner {
    config: FrameworkConfig,
    ids: IdGenerator,
    focus: FocusTracker,
    scroll_gate: ScrollGate,
    render_count: AtomicU64,
}

/// Shared handle to the framework services.
///
/// Cloning is cheap; clones refer to the same services.
#[derive(Clone)]
pub struct CompContext {
    inner: Arc<ContextInner>,
}

static_assertions::assert_impl_all!(CompContext: Send, Sync);

impl CompContext {
    /// Create a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameworkConfig::default())
    }

    /// Create a context with a specific configuration.
    pub fn with_config(config: FrameworkConfig) -> Self {
        let scroll_gate = ScrollGate::new(config.scroll_writes_enabled());
        Self {
            inner: Arc::new(ContextInner {
                config,
                ids: IdGenerator::new(),
                focus: FocusTracker::new(),
                scroll_gate,
                render_count: AtomicU64::new(0),
            }),
        }
    }

    /// The framework configuration.
    #[inline]
    pub fn config(&self) -> &FrameworkConfig {
        &self.inner.config
    }

    /// The id generator.
    #[inline]
    pub fn ids(&self) -> &IdGenerator {
        &self.inner.ids
    }

    /// Generate the next component id.
    pub fn next_id(&self) -> CompId {
        self.inner.ids.next_id()
    }

    /// The focus claim.
    #[inline]
    pub fn focus(&self) -> &FocusTracker {
        &self.inner.focus
    }

    /// The scroll-write gate.
    #[inline]
    pub fn scroll_gate(&self) -> &ScrollGate {
        &self.inner.scroll_gate
    }

    /// Close the scroll gate until the returned guard is dropped.
    ///
    /// The guard restores whatever state the gate had before, so nested
    /// suspensions compose.
    #[must_use = "scroll writes resume as soon as the guard is dropped"]
    pub fn suspend_scroll_writes(&self) -> ScrollSuspension {
        let previous = self.inner.scroll_gate.set_allowed(false);
        ScrollSuspension {
            ctx: self.clone(),
            previous,
        }
    }

    /// Record one component render, returning the new total.
    pub fn count_render(&self) -> u64 {
        self.inner.render_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total component renders recorded by this context.
    pub fn render_count(&self) -> u64 {
        self.inner.render_count.load(Ordering::Relaxed)
    }

    /// Whether two handles refer to the same services.
    pub fn same_as(&self, other: &CompContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for CompContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompContext")
            .field("config", &self.inner.config)
            .field("ids_issued", &self.inner.ids.issued())
            .field("focus", &self.inner.focus.current())
            .field("scroll_writes", &self.inner.scroll_gate.allows_writes())
            .field("render_count", &self.render_count())
            .finish()
    }
}

/// Guard returned by [`CompContext::suspend_scroll_writes`].
pub struct ScrollSuspension {
    ctx: CompContext,
    previous: bool,
}

impl Drop for ScrollSuspension {
    fn drop(&mut self) {
        self.ctx.scroll_gate().set_allowed(self.previous);
    }
}
