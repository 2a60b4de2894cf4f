//! Interface to the host rendering runtime.
//!
//! The component layer does not diff or commit anything itself. A host
//! runtime owns that work and talks to components through three seams:
//!
//! - [`Hooks`]: per-render registration of the state cell and the four
//!   lifecycle effects, called in the same order on every render
//! - [`HostNode`]: the materialized description a component render returns
//! - [`LiveNode`] and [`NodeRef`]: access to the live node the host
//!   committed for a component
//!
//! [`crate::headless::HeadlessHost`] is a complete in-process implementation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use quanta_comp_core::{Attributes, StateRecord, StateSetter};

use crate::component::Comp;

/// A lifecycle effect registered with the host.
///
/// Effects may be invoked more than once by hosts that double-invoke
/// effects; the framework's handlers are idempotent where it matters.
pub type Effect = Box<dyn Fn()>;

/// Listener invoked with the new scroll offset when a live node scrolls.
pub type ScrollListener = Box<dyn Fn(i64)>;

/// Hook registration surface handed to a component render by the host.
///
/// A host must call the registered effects at these points of its commit:
///
/// 1. pre-paint effects, after the tree is committed and before paint
/// 2. attach effects, for instances committed for the first time
/// 3. update effects, after every commit that rendered the instance
/// 4. detach effects, when the instance leaves the tree
///
/// The framework calls `use_state` first, then the four `use_*_effect`
/// methods in declaration order, on every render of every component.
pub trait Hooks {
    /// Get the per-instance reactive cell, initializing it with `initial` on
    /// the first render.
    ///
    /// Returns the cell's current value and a setter that applies an
    /// updater and schedules a re-render.
    fn use_state(&mut self, initial: &StateRecord) -> (StateRecord, StateSetter);

    /// Register the effect run when the instance first attaches.
    fn use_attach_effect(&mut self, effect: Effect);

    /// Register the effect run after every commit of the instance.
    fn use_update_effect(&mut self, effect: Effect);

    /// Register the effect run before paint on every commit of the instance.
    fn use_pre_paint_effect(&mut self, effect: Effect);

    /// Register the effect run when the instance detaches.
    fn use_detach_effect(&mut self, effect: Effect);
}

/// A live, committed host node.
pub trait LiveNode {
    /// The node's `id` attribute, if any.
    fn id(&self) -> Option<String>;

    /// Whether the node is currently connected to the host's tree.
    fn is_connected(&self) -> bool;

    /// Give the node input focus.
    fn focus(&self);

    /// Current vertical scroll offset.
    fn scroll_top(&self) -> i64;

    /// Set the vertical scroll offset.
    fn set_scroll_top(&self, top: i64);

    /// Register a passive scroll listener.
    fn add_scroll_listener(&self, listener: ScrollListener);
}

/// Slot the host fills with a component's live node.
///
/// The host sets the slot when it commits the element carrying this ref and
/// clears it when the element is removed. Clones share the slot.
#[derive(Clone, Default)]
pub struct NodeRef {
    slot: Rc<RefCell<Option<Rc<dyn LiveNode>>>>,
}

impl NodeRef {
    /// Create an empty ref.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the committed live node.
    pub fn set(&self, node: Rc<dyn LiveNode>) {
        *self.slot.borrow_mut() = Some(node);
    }

    /// Clear the slot.
    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    /// The stored node, connected or not.
    pub fn current(&self) -> Option<Rc<dyn LiveNode>> {
        self.slot.borrow().clone()
    }

    /// The stored node, only if it is still connected.
    pub fn get_live_node(&self) -> Option<Rc<dyn LiveNode>> {
        self.current().filter(|node| node.is_connected())
    }

    /// Whether two refs share a slot.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.slot.borrow();
        f.debug_struct("NodeRef")
            .field("set", &node.is_some())
            .field("connected", &node.as_ref().is_some_and(|n| n.is_connected()))
            .finish()
    }
}

/// A materialized node description consumed by the host.
#[derive(Debug, Clone)]
pub enum HostNode {
    /// A host element.
    Element(ElementNode),
    /// A text node.
    Text(String),
    /// A child component, rendered by the host through
    /// [`render_component`](crate::render_component).
    Component(CompElement),
    /// Nothing.
    Empty,
}

impl HostNode {
    /// Build an element node without a node ref.
    ///
    /// Suitable for inner elements. A component's root element needs its
    /// base's node ref; build it with [`RenderCx::element`](crate::RenderCx::element).
    pub fn element(tag: impl Into<String>, attributes: Attributes, children: HostChildren) -> Self {
        HostNode::Element(ElementNode {
            tag: tag.into(),
            attributes,
            node_ref: None,
            children,
        })
    }

    /// Build a text node.
    pub fn text(text: impl Into<String>) -> Self {
        HostNode::Text(text.into())
    }

    /// Whether this is [`HostNode::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, HostNode::Empty)
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            HostNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// A host element description.
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Host tag.
    pub tag: String,
    /// Attributes, including the framework-managed `id` and `key`.
    pub attributes: Attributes,
    /// Ref the host fills with the committed node.
    pub node_ref: Option<NodeRef>,
    /// Child content.
    pub children: HostChildren,
}

impl ElementNode {
    /// Attach a node ref.
    pub fn with_node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }
}

/// Child content of an element.
///
/// A single child is passed directly rather than as a one-element list.
#[derive(Debug, Clone, Default)]
pub enum HostChildren {
    /// No children.
    #[default]
    None,
    /// Exactly one child.
    Single(Box<HostNode>),
    /// Two or more children.
    Many(Vec<HostNode>),
}

impl HostChildren {
    /// Build from a list, applying the single-child form.
    pub fn from_nodes(mut nodes: Vec<HostNode>) -> Self {
        match nodes.len() {
            0 => HostChildren::None,
            1 => match nodes.pop() {
                Some(node) => HostChildren::Single(Box::new(node)),
                None => HostChildren::None,
            },
            _ => HostChildren::Many(nodes),
        }
    }

    /// The children as a slice.
    pub fn as_slice(&self) -> &[HostNode] {
        match self {
            HostChildren::None => &[],
            HostChildren::Single(node) => std::slice::from_ref(node.as_ref()),
            HostChildren::Many(nodes) => nodes.as_slice(),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// A child component reference inside a materialized tree.
#[derive(Debug, Clone)]
pub struct CompElement {
    /// The component.
    pub comp: Comp,
    /// Reconciliation key.
    pub key: String,
}
