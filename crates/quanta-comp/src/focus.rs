//! Focus restoration.
//!
//! The host runtime may destroy and rebuild a component's native node
//! between renders, and the new node does not inherit input focus. The
//! framework therefore keeps its own record of which component should be
//! focused (the context's [`FocusTracker`](quanta_comp_core::FocusTracker))
//! and re-asserts focus whenever that component attaches.
//!
//! Claims are last-wins: a component whose claim was superseded before its
//! node attached does nothing.

use std::rc::Rc;

use quanta_comp_core::comp_log;
use quanta_comp_core::logging::targets;

use crate::component::CompBase;
use crate::host::LiveNode;

impl CompBase {
    /// Claim input focus for this component.
    ///
    /// Focus is applied now if the component is attached, or when it next
    /// attaches, provided no other component has claimed focus in between.
    pub fn focus(&mut self) {
        let ctx = self.context().clone();
        let id = self.id().clone();
        ctx.focus().claim(id.clone());

        self.on_mount(move |node| {
            if ctx.focus().is_claimed(&id) {
                tracing::trace!(target: targets::FOCUS, %id, "applying claimed focus");
                node.focus();
            } else {
                tracing::trace!(target: targets::FOCUS, %id, "focus claim superseded");
            }
        });
    }

    /// Whether this component holds the focus claim.
    pub fn has_focus_claim(&self) -> bool {
        self.context().focus().is_claimed(self.id())
    }

    /// Re-assert focus on `node` if this component holds the claim.
    pub(crate) fn maybe_focus(&self, node: &Rc<dyn LiveNode>) {
        if self.has_focus_claim() {
            comp_log!(self.is_debug(), target: targets::FOCUS, component = %self.label(), "restoring focus on attach");
            node.focus();
        }
    }
}
