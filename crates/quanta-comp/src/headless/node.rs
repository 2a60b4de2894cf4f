//! Headless live nodes and the committed node arena.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use quanta_comp_core::Attributes;

use crate::host::{LiveNode, ScrollListener};

new_key_type! {
    /// Key of a committed node in a [`DomArena`].
    pub(crate) struct DomKey;
}

/// Which node currently has input focus, shared by every node of a host.
pub(crate) type FocusSink = Rc<RefCell<Option<FocusedNode>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FocusedNode {
    pub(crate) serial: u64,
    pub(crate) dom_id: Option<String>,
}

/// An in-memory live node.
pub struct HeadlessNode {
    serial: u64,
    dom_id: Option<String>,
    connected: Cell<bool>,
    scroll_top: Cell<i64>,
    listeners: RefCell<Vec<ScrollListener>>,
    focus_count: Cell<usize>,
    focus_sink: FocusSink,
}

impl HeadlessNode {
    pub(crate) fn new(serial: u64, dom_id: Option<String>, focus_sink: FocusSink) -> Rc<Self> {
        Rc::new(Self {
            serial,
            dom_id,
            connected: Cell::new(true),
            scroll_top: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            focus_count: Cell::new(0),
            focus_sink,
        })
    }

    /// A standalone node that was never connected to a host.
    pub fn detached(dom_id: &str) -> Rc<Self> {
        let node = Self::new(0, Some(dom_id.to_string()), FocusSink::default());
        node.connected.set(false);
        node
    }

    /// Host-unique serial; a recreated node gets a new one.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Number of times focus was applied while connected.
    pub fn focus_count(&self) -> usize {
        self.focus_count.get()
    }

    /// Number of registered scroll listeners.
    pub fn scroll_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Simulate the user scrolling to `top`, notifying listeners.
    pub fn user_scroll(&self, top: i64) {
        self.scroll_top.set(top);
        for listener in self.listeners.borrow().iter() {
            listener(top);
        }
    }

    pub(crate) fn disconnect(&self) {
        self.connected.set(false);
        let mut sink = self.focus_sink.borrow_mut();
        if sink.as_ref().is_some_and(|f| f.serial == self.serial) {
            *sink = None;
        }
    }
}

impl LiveNode for HeadlessNode {
    fn id(&self) -> Option<String> {
        self.dom_id.clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn focus(&self) {
        if !self.connected.get() {
            return;
        }
        self.focus_count.set(self.focus_count.get() + 1);
        *self.focus_sink.borrow_mut() = Some(FocusedNode {
            serial: self.serial,
            dom_id: self.dom_id.clone(),
        });
    }

    fn scroll_top(&self) -> i64 {
        self.scroll_top.get()
    }

    fn set_scroll_top(&self, top: i64) {
        self.scroll_top.set(top);
    }

    fn add_scroll_listener(&self, listener: ScrollListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessNode")
            .field("serial", &self.serial)
            .field("id", &self.dom_id)
            .field("connected", &self.connected.get())
            .field("scroll_top", &self.scroll_top.get())
            .finish()
    }
}

/// A committed node.
#[derive(Debug)]
pub(crate) enum DomNode {
    Element {
        tag: String,
        attributes: Attributes,
        children: Vec<DomKey>,
    },
    Text(String),
}

/// The committed tree of a host, rebuilt on every commit.
#[derive(Debug, Default)]
pub(crate) struct DomArena {
    nodes: SlotMap<DomKey, DomNode>,
    roots: Vec<DomKey>,
}

impl DomArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: DomNode) -> DomKey {
        self.nodes.insert(node)
    }

    pub(crate) fn get(&self, key: DomKey) -> Option<&DomNode> {
        self.nodes.get(key)
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<DomKey>) {
        self.roots = roots;
    }

    pub(crate) fn roots(&self) -> &[DomKey] {
        &self.roots
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
