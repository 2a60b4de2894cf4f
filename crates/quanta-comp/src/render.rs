//! Materialization.
//!
//! Turns a component's tag, attributes, content and children into a
//! [`HostNode`]. Child components are emitted as [`HostNode::Component`]
//! references and rendered by the host in their own right, so a failure in
//! one child's render is contained at that child and never reaches its
//! siblings or parent.

use quanta_comp_core::logging::targets;
use quanta_comp_core::{CompError, CompResult};

use crate::component::{Comp, CompBase};
use crate::host::{CompElement, ElementNode, HostChildren, HostNode};

/// Render context handed to [`Component::comp_render`](crate::Component::comp_render).
pub struct RenderCx<'a> {
    comp: &'a Comp,
}

impl<'a> RenderCx<'a> {
    pub(crate) fn new(comp: &'a Comp) -> Self {
        Self { comp }
    }

    /// The component being rendered.
    ///
    /// It is mutably borrowed for the duration of the render; use it only
    /// for identity and [`Comp::ancestry`].
    pub fn comp(&self) -> &Comp {
        self.comp
    }

    /// Materialize `base` as an element.
    ///
    /// Placeholders are skipped. A lone child is passed in single-child
    /// form. `content` becomes a text child when there are no child
    /// components. An element with inner HTML has no children at all.
    pub fn materialize(&self, base: &CompBase) -> HostNode {
        if base.attributes().inner_html().is_some() {
            return self.element(base, HostChildren::None);
        }
        let mut nodes: Vec<HostNode> = base
            .child_comps()
            .filter_map(|child| match self.child(child) {
                Ok(node) => Some(node),
                Err(err) => {
                    tracing::error!(
                        target: targets::RENDER,
                        error = %err,
                        ancestry = %self.comp.ancestry(),
                        "skipping child"
                    );
                    None
                }
            })
            .collect();

        if nodes.is_empty() {
            if let Some(content) = base.content() {
                nodes.push(HostNode::text(content));
            }
        }

        self.element(base, HostChildren::from_nodes(nodes))
    }

    /// An element with `base`'s tag, attributes and node ref around
    /// `children`.
    ///
    /// Custom renders should build their root element here: without the
    /// node ref the component has no live node, so deferred mount work,
    /// focus and scroll restoration never run.
    pub fn element(&self, base: &CompBase, children: HostChildren) -> HostNode {
        HostNode::Element(ElementNode {
            tag: base.tag().to_string(),
            attributes: base.attributes().clone(),
            node_ref: Some(base.node_ref().clone()),
            children,
        })
    }

    /// Emit a reference to `child` and record this component as its parent.
    pub fn child(&self, child: &Comp) -> CompResult<HostNode> {
        let key = match child.try_borrow() {
            Ok(component) => component.base().key().to_string(),
            Err(_) => {
                return Err(CompError::ChildUnavailable {
                    child: child.label(),
                });
            }
        };
        child.set_parent(self.comp);
        Ok(HostNode::Component(CompElement {
            comp: child.clone(),
            key,
        }))
    }
}
