//! The component capability trait.
//!
//! Concrete components implement [`Component`] by embedding a
//! [`CompBase`] and overriding the hook points they care about. Every hook
//! has a no-op default.

use std::any::Any;

use quanta_comp_core::CompResult;

use super::base::CompBase;
use crate::host::HostNode;
use crate::render::RenderCx;
use crate::scroll::ScrollPos;

/// Base trait for all components.
///
/// # Example
///
/// ```
/// use quanta_comp::{CompBase, Component};
/// use quanta_comp_core::{CompContext, CompResult};
/// use serde_json::json;
///
/// struct Heading {
///     base: CompBase,
/// }
///
/// impl Heading {
///     fn new(ctx: &CompContext, text: &str) -> CompResult<Self> {
///         let mut base = CompBase::new::<Self>(ctx, json!({"className": "heading"}))?;
///         base.set_tag("h2");
///         base.set_content(text);
///         Ok(Self { base })
///     }
/// }
///
/// impl Component for Heading {
///     fn base(&self) -> &CompBase { &self.base }
///     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
/// }
/// ```
pub trait Component: Any {
    // =========================================================================
    // Required Methods
    // =========================================================================

    /// Get a reference to the component's base.
    fn base(&self) -> &CompBase;

    /// Get a mutable reference to the component's base.
    fn base_mut(&mut self) -> &mut CompBase;

    // =========================================================================
    // Render
    // =========================================================================

    /// Prepare for rendering.
    ///
    /// The usual place to rebuild children from state. Returning `false`
    /// rejects this render: the component renders nothing and reports no
    /// live node until a later render is accepted.
    fn pre_render(&mut self) -> bool {
        true
    }

    /// Produce the materialized node.
    ///
    /// The default materializes the base's tag, attributes and children.
    /// Overrides build their root with [`RenderCx::element`] so the host
    /// fills the base's node ref. Errors are contained at this component: they are logged with the
    /// component's ancestry and the component renders as empty.
    fn comp_render(&mut self, cx: &RenderCx<'_>) -> CompResult<HostNode> {
        Ok(cx.materialize(self.base()))
    }

    // =========================================================================
    // Lifecycle Hooks
    // =========================================================================

    /// Called once when the component attaches, after its deferred
    /// callbacks have run.
    fn on_attach(&mut self) {}

    /// Called after every commit that rendered this component.
    fn on_update(&mut self) {}

    /// Called before paint on every commit that rendered this component.
    fn on_pre_update(&mut self) {}

    /// Called when the component detaches. Release anything acquired in
    /// [`on_attach`](Component::on_attach) here.
    fn on_remove(&mut self) {}

    // =========================================================================
    // Scroll Persistence
    // =========================================================================

    /// Backing store for this component's scroll offset.
    ///
    /// `None` (the default) opts out of scroll persistence. Components that
    /// persist scroll return a store that outlives the instance, so a
    /// rebuilt instance picks up where the old one left off.
    fn scroll_pos(&self) -> Option<ScrollPos> {
        None
    }

    /// Scroll to `top`, recording the offset when scroll is persisted.
    ///
    /// Use this instead of writing the live node's offset directly.
    fn set_scroll_top(&mut self, top: i64) {
        let store = self.scroll_pos();
        crate::scroll::set_scroll_top(self.base(), store.as_ref(), top);
    }
}
