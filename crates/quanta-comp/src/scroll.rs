//! Scroll position persistence.
//!
//! A component opts in by returning a [`ScrollPos`] from
//! [`Component::scroll_pos`](crate::Component::scroll_pos). The store should
//! outlive the component instance (for example a field of the long-lived
//! panel model that builds the component), because instances are rebuilt
//! across renders while the panel is logically the same.
//!
//! With a store in place the framework:
//!
//! - applies the stored offset when the component attaches and installs a
//!   passive listener that records later offsets
//! - re-applies the stored offset before paint on every commit, so a
//!   re-render never resets the scroll
//!
//! These automatic writes, to the node or to the store, are skipped while
//! the context's scroll gate is closed (see
//! [`CompContext::suspend_scroll_writes`](quanta_comp_core::CompContext::suspend_scroll_writes)).

use std::cell::Cell;
use std::rc::Rc;

use quanta_comp_core::comp_log;
use quanta_comp_core::logging::targets;

use crate::component::CompBase;
use crate::host::LiveNode;

/// Shared backing store for a scroll offset.
///
/// Clones share the value.
#[derive(Debug, Clone, Default)]
pub struct ScrollPos(Rc<Cell<i64>>);

impl ScrollPos {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> i64 {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, top: i64) {
        self.0.set(top);
    }
}

fn loud(base: &CompBase) -> bool {
    base.is_debug() || base.context().config().debug_scrolling()
}

/// Apply the stored offset and start persisting scroll events.
pub(crate) fn attach(base: &CompBase, store: &ScrollPos, node: &Rc<dyn LiveNode>) {
    let ctx = base.context().clone();
    let label = base.label();
    let loud = loud(base);

    if ctx.scroll_gate().allows_writes() {
        node.set_scroll_top(store.get());
        comp_log!(loud, target: targets::SCROLL, component = %label, top = store.get(), "restored scroll on attach");
    }

    let store = store.clone();
    node.add_scroll_listener(Box::new(move |top| {
        if ctx.scroll_gate().allows_writes() {
            store.set(top);
            comp_log!(loud, target: targets::SCROLL, component = %label, top, "scroll persisted");
        } else {
            comp_log!(loud, target: targets::SCROLL, component = %label, top, "scroll gate closed; not persisted");
        }
    }));
}

/// Re-apply the stored offset before paint.
pub(crate) fn pre_paint(base: &CompBase, store: &ScrollPos) {
    if !base.context().scroll_gate().allows_writes() {
        return;
    }
    if let Some(node) = base.live_node() {
        node.set_scroll_top(store.get());
        comp_log!(loud(base), target: targets::SCROLL, component = %base.label(), top = store.get(), "re-applied scroll before paint");
    }
}

/// Record `top` in `store` (if any) and scroll the live node.
pub(crate) fn set_scroll_top(base: &CompBase, store: Option<&ScrollPos>, top: i64) {
    if let Some(store) = store {
        store.set(top);
    }
    if let Some(node) = base.live_node() {
        node.set_scroll_top(top);
        comp_log!(loud(base), target: targets::SCROLL, component = %base.label(), top, "set scroll top");
    }
}
