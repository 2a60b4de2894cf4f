//! The lifecycle bridge.
//!
//! [`render_component`] is the single entry point a host runtime calls to
//! render a component. On every call it:
//!
//! 1. binds the component's state to the host's reactive cell
//! 2. registers the attach, update, pre-paint and detach effects, always
//!    all four and always in that order
//! 3. runs `pre_render`, then `comp_render`, containing any error or panic
//!    at this component
//!
//! The effects translate host notifications into the component's state
//! machine:
//!
//! ```text
//! Unattached --attach--> Mounted --detach--> Unattached
//!                         |   ^
//!                         +---+ update / pre-paint
//! ```
//!
//! Attach is guarded by the `mounted` flag, so hosts that deliver the
//! attach notification twice still drain the deferred queue and call
//! `on_attach` once.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use quanta_comp_core::logging::{span_names, targets};
use quanta_comp_core::{CompError, comp_log};

use crate::component::{Comp, WeakComp};
use crate::host::{Hooks, HostNode};
use crate::render::RenderCx;

/// Render `comp` for the host.
///
/// Never fails: a rejected, failing or panicking render yields
/// [`HostNode::Empty`] and the failure is logged with the component's
/// ancestry.
pub fn render_component(comp: &Comp, hooks: &mut dyn Hooks) -> HostNode {
    let span = tracing::trace_span!(target: targets::RENDER, span_names::RENDER, component = %comp.label());
    let _entered = span.enter();

    let (ctx, state, debug) = {
        let mut component = match comp.try_borrow_mut() {
            Ok(component) => component,
            Err(_) => {
                tracing::error!(
                    target: targets::RENDER,
                    component = %comp.label(),
                    ancestry = %comp.ancestry(),
                    "component is already borrowed; rendering nothing"
                );
                return HostNode::Empty;
            }
        };
        let base = component.base_mut();
        base.rendered = true;
        (base.context().clone(), base.state.clone(), base.is_debug())
    };

    let initial = state.as_ref().map(|s| s.record()).unwrap_or_default();
    let (current, setter) = hooks.use_state(&initial);
    if let Some(state) = &state {
        state.bind(current, setter);
    }

    let weak = comp.downgrade();
    hooks.use_attach_effect(effect(&weak, handle_attach));
    hooks.use_update_effect(effect(&weak, handle_update));
    hooks.use_pre_paint_effect(effect(&weak, handle_pre_paint));
    hooks.use_detach_effect(retained(comp, handle_detach));

    let count = ctx.count_render();
    comp_log!(debug, target: targets::RENDER, component = %comp.label(), count, "render");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut component = comp.borrow_mut();
        let accepted = component.pre_render();
        component.base_mut().pre_render_rejected = !accepted;
        if !accepted {
            return Ok(None);
        }
        let cx = RenderCx::new(comp);
        component.comp_render(&cx).map(Some)
    }));

    let result = match outcome {
        Ok(result) => result,
        Err(payload) => Err(CompError::RenderPanicked {
            component: comp.label(),
            message: panic_message(payload.as_ref()),
        }),
    };

    match result {
        Ok(Some(node)) => node,
        Ok(None) => {
            comp_log!(debug, target: targets::RENDER, component = %comp.label(), "pre_render rejected");
            HostNode::Empty
        }
        Err(err) => {
            let key = comp
                .try_borrow()
                .map(|c| c.base().key().to_string())
                .unwrap_or_default();
            tracing::error!(
                target: targets::RENDER,
                component = %comp.label(),
                key = %key,
                ancestry = %comp.ancestry(),
                error = %err,
                "failed to render component"
            );
            HostNode::Empty
        }
    }
}

fn effect(weak: &WeakComp, handler: fn(&Comp)) -> crate::host::Effect {
    let weak = weak.clone();
    Box::new(move || {
        if let Some(comp) = weak.upgrade() {
            handler(&comp);
        }
    })
}

/// The detach effect holds its component strongly: the host may run it
/// after the parent has already dropped the last other handle.
fn retained(comp: &Comp, handler: fn(&Comp)) -> crate::host::Effect {
    let comp = comp.clone();
    Box::new(move || handler(&comp))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn handle_attach(comp: &Comp) {
    let _span = tracing::trace_span!(target: targets::LIFECYCLE, span_names::LIFECYCLE, event = "attach", component = %comp.label()).entered();

    let (queued, node, debug) = {
        let Ok(mut component) = comp.try_borrow_mut() else {
            tracing::warn!(target: targets::LIFECYCLE, component = %comp.label(), "attach while borrowed; skipped");
            return;
        };
        let base = component.base_mut();
        if base.mounted {
            comp_log!(base.is_debug(), target: targets::LIFECYCLE, component = %comp.label(), "duplicate attach ignored");
            return;
        }
        base.mounted = true;
        let node = base.live_node();
        // Without a node the queue waits for the next attachment.
        let queued = if node.is_some() {
            base.mount_queue.take()
        } else {
            None
        };
        (queued, node, base.is_debug())
    };
    comp_log!(debug, target: targets::LIFECYCLE, component = %comp.label(), live = node.is_some(), "attached");

    if let (Some(callbacks), Some(node)) = (queued, &node) {
        crate::deferred::run_all(callbacks, node);
    }

    let Ok(mut component) = comp.try_borrow_mut() else {
        tracing::warn!(target: targets::LIFECYCLE, component = %comp.label(), "component borrowed by an on-mount callback");
        return;
    };
    component.on_attach();

    if let Some(node) = node {
        component.base().maybe_focus(&node);
        if let Some(store) = component.scroll_pos() {
            crate::scroll::attach(component.base(), &store, &node);
        }
    }
}

fn handle_update(comp: &Comp) {
    let Ok(mut component) = comp.try_borrow_mut() else {
        tracing::warn!(target: targets::LIFECYCLE, component = %comp.label(), "update while borrowed; skipped");
        return;
    };
    component.on_update();
}

fn handle_pre_paint(comp: &Comp) {
    let Ok(mut component) = comp.try_borrow_mut() else {
        tracing::warn!(target: targets::LIFECYCLE, component = %comp.label(), "pre-paint while borrowed; skipped");
        return;
    };
    component.on_pre_update();
    if let Some(store) = component.scroll_pos() {
        crate::scroll::pre_paint(component.base(), &store);
    }
}

fn handle_detach(comp: &Comp) {
    let Ok(mut component) = comp.try_borrow_mut() else {
        tracing::warn!(target: targets::LIFECYCLE, component = %comp.label(), "detach while borrowed; skipped");
        return;
    };
    let base = component.base_mut();
    base.mounted = false;
    comp_log!(base.is_debug(), target: targets::LIFECYCLE, component = %comp.label(), "detached");
    component.on_remove();
}
