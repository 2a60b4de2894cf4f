//! The headless host runtime.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use quanta_comp_core::logging::{span_names, targets};
use quanta_comp_core::{CompId, PerfSpan, StateRecord, StateSetter, StateUpdater};

use super::markup;
use super::node::{DomArena, DomKey, DomNode, FocusSink, HeadlessNode};
use crate::component::{Comp, WeakComp};
use crate::host::{Effect, Hooks, HostNode, LiveNode, NodeRef};
use crate::lifecycle::render_component;

/// Upper bound on re-render passes per flush. Components that write state
/// on every render would otherwise loop forever.
const MAX_FLUSH_PASSES: usize = 32;

type SharedEffect = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookKind {
    State,
    Attach,
    Update,
    PrePaint,
    Detach,
}

#[derive(Default, Clone)]
struct EffectSlots {
    attach: Option<SharedEffect>,
    update: Option<SharedEffect>,
    pre_paint: Option<SharedEffect>,
    detach: Option<SharedEffect>,
}

struct Instance {
    comp: WeakComp,
    /// `None` until the first `use_state` call.
    state: Rc<RefCell<Option<StateRecord>>>,
    effects: EffectSlots,
    signature: Option<Vec<HookKind>>,
    attached: bool,
    live: Option<Rc<HeadlessNode>>,
    node_ref: Option<NodeRef>,
    /// Whether an element claimed `live` during the current pass.
    live_claimed: bool,
}

impl Instance {
    fn new(comp: &Comp) -> Self {
        Self {
            comp: comp.downgrade(),
            state: Rc::new(RefCell::new(None)),
            effects: EffectSlots::default(),
            signature: None,
            attached: false,
            live: None,
            node_ref: None,
            live_claimed: false,
        }
    }

    fn release_live(&mut self) {
        if let Some(live) = self.live.take() {
            live.disconnect();
        }
        if let Some(node_ref) = self.node_ref.take() {
            node_ref.clear();
        }
    }
}

struct HostInner {
    root: RefCell<Option<Comp>>,
    instances: RefCell<HashMap<CompId, Instance>>,
    dirty: Cell<bool>,
    dom: RefCell<DomArena>,
    focus: FocusSink,
    next_serial: Cell<u64>,
    commits: Cell<u64>,
}

/// Hook slots for one render of one instance.
struct InstanceHooks {
    host: Weak<HostInner>,
    state: Rc<RefCell<Option<StateRecord>>>,
    effects: EffectSlots,
    signature: Vec<HookKind>,
}

impl Hooks for InstanceHooks {
    fn use_state(&mut self, initial: &StateRecord) -> (StateRecord, StateSetter) {
        self.signature.push(HookKind::State);
        let current = self
            .state
            .borrow_mut()
            .get_or_insert_with(|| initial.clone())
            .clone();

        let cell = Rc::clone(&self.state);
        let host = self.host.clone();
        let setter: StateSetter = Rc::new(move |updater: StateUpdater| {
            let previous = cell.borrow().clone().unwrap_or_default();
            let next = updater(&previous);
            *cell.borrow_mut() = Some(next);
            if let Some(host) = host.upgrade() {
                host.dirty.set(true);
            }
        });
        (current, setter)
    }

    fn use_attach_effect(&mut self, effect: Effect) {
        self.signature.push(HookKind::Attach);
        self.effects.attach = Some(Rc::from(effect));
    }

    fn use_update_effect(&mut self, effect: Effect) {
        self.signature.push(HookKind::Update);
        self.effects.update = Some(Rc::from(effect));
    }

    fn use_pre_paint_effect(&mut self, effect: Effect) {
        self.signature.push(HookKind::PrePaint);
        self.effects.pre_paint = Some(Rc::from(effect));
    }

    fn use_detach_effect(&mut self, effect: Effect) {
        self.signature.push(HookKind::Detach);
        self.effects.detach = Some(Rc::from(effect));
    }
}

/// Bookkeeping for one render pass.
struct RenderPass {
    arena: DomArena,
    seen: HashSet<CompId>,
    /// Rendered instances, children before parents.
    rendered: Vec<CompId>,
    /// Detach effects of instances replaced by a different component
    /// with the same id.
    replaced: Vec<SharedEffect>,
    connect_nodes: bool,
}

/// An in-process host runtime.
///
/// Renders a root component and its descendants through
/// [`render_component`], keeps per-instance hook slots, and runs effects in
/// commit order: detach for instances that left the tree, then pre-paint,
/// attach (first commit of an instance only) and update, children before
/// parents.
///
/// State writes mark the host dirty; [`flush`](HeadlessHost::flush)
/// re-renders until the tree settles.
///
/// ```
/// use quanta_comp::headless::HeadlessHost;
/// use quanta_comp::{Comp, CompBase, Component};
/// use quanta_comp_core::CompContext;
/// use serde_json::json;
///
/// struct Label {
///     base: CompBase,
/// }
///
/// impl Component for Label {
///     fn base(&self) -> &CompBase { &self.base }
///     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
/// }
///
/// let ctx = CompContext::new();
/// let mut base = CompBase::new::<Label>(&ctx, json!({"id": "greeting"}))?;
/// base.set_tag("span");
/// base.set_content("hello");
/// let label = Comp::new(Label { base });
///
/// let host = HeadlessHost::new();
/// host.mount(&label);
/// assert_eq!(host.markup(), r#"<span id="greeting">hello</span>"#);
/// assert!(label.borrow().base().is_mounted());
/// # Ok::<(), quanta_comp_core::CompError>(())
/// ```
#[derive(Clone)]
pub struct HeadlessHost {
    inner: Rc<HostInner>,
}

impl HeadlessHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HostInner {
                root: RefCell::new(None),
                instances: RefCell::new(HashMap::new()),
                dirty: Cell::new(false),
                dom: RefCell::new(DomArena::new()),
                focus: FocusSink::default(),
                next_serial: Cell::new(0),
                commits: Cell::new(0),
            }),
        }
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    /// Mount `root`, replacing any previous root, and flush.
    pub fn mount(&self, root: &Comp) {
        tracing::debug!(target: targets::HOST, root = %root.label(), "mount");
        *self.inner.root.borrow_mut() = Some(root.clone());
        self.inner.dirty.set(true);
        self.flush();
    }

    /// Remove the root; every instance detaches.
    pub fn unmount(&self) {
        tracing::debug!(target: targets::HOST, "unmount");
        self.inner.root.borrow_mut().take();
        self.inner.dirty.set(false);
        self.commit();
    }

    /// Whether a state write is waiting for a re-render.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Mark the tree for re-render without a state change.
    pub fn invalidate(&self) {
        self.inner.dirty.set(true);
    }

    /// Re-render and commit until no state writes are pending.
    ///
    /// Returns the number of commits performed.
    pub fn flush(&self) -> usize {
        let mut passes = 0;
        while self.inner.dirty.replace(false) {
            if passes == MAX_FLUSH_PASSES {
                tracing::warn!(
                    target: targets::HOST,
                    passes,
                    "tree did not settle; a component writes state on every render"
                );
                break;
            }
            self.commit();
            passes += 1;
        }
        passes
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Markup of the committed tree.
    pub fn markup(&self) -> String {
        markup::write_arena(&self.inner.dom.borrow())
    }

    /// Total commits performed.
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.get()
    }

    /// Number of live component instances.
    pub fn instance_count(&self) -> usize {
        self.inner.instances.borrow().len()
    }

    /// Number of committed nodes.
    pub fn node_count(&self) -> usize {
        self.inner.dom.borrow().len()
    }

    /// Whether the instance for `id` has been attached by this host.
    pub fn is_attached(&self, id: &CompId) -> bool {
        self.inner
            .instances
            .borrow()
            .get(id)
            .is_some_and(|instance| instance.attached)
    }

    /// The live node committed for `id`.
    pub fn live_node(&self, id: &CompId) -> Option<Rc<HeadlessNode>> {
        self.inner
            .instances
            .borrow()
            .get(id)
            .and_then(|instance| instance.live.clone())
    }

    /// The `id` attribute of the focused node.
    pub fn focused_id(&self) -> Option<String> {
        self.inner
            .focus
            .borrow()
            .as_ref()
            .and_then(|focused| focused.dom_id.clone())
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Deliver the attach notification for `id` again, as hosts that
    /// double-invoke effects do. Returns `false` if `id` is not attached.
    pub fn simulate_attach(&self, id: &CompId) -> bool {
        let effect = {
            let instances = self.inner.instances.borrow();
            match instances.get(id) {
                Some(instance) if instance.attached => instance.effects.attach.clone(),
                _ => None,
            }
        };
        match effect {
            Some(effect) => {
                effect();
                true
            }
            None => false,
        }
    }

    /// Destroy and rebuild the live node for `id`, as a host does when it
    /// remounts a logically unchanged component. The instance detaches and
    /// attaches again against a fresh node.
    pub fn recreate_node(&self, id: &CompId) -> bool {
        let (detach, attach) = {
            let mut instances = self.inner.instances.borrow_mut();
            let Some(instance) = instances.get_mut(id) else {
                return false;
            };
            let Some(old) = instance.live.take() else {
                return false;
            };
            old.disconnect();
            let fresh = self.new_node(old.id());
            if let Some(node_ref) = &instance.node_ref {
                node_ref.set(fresh.clone());
            }
            instance.live = Some(fresh);
            tracing::debug!(target: targets::HOST, %id, "recreated live node");
            (instance.effects.detach.clone(), instance.effects.attach.clone())
        };
        if let Some(detach) = detach {
            detach();
        }
        if let Some(attach) = attach {
            attach();
        }
        true
    }

    /// Simulate the user scrolling the live node of `id`.
    pub fn user_scroll(&self, id: &CompId, top: i64) -> bool {
        match self.live_node(id) {
            Some(node) => {
                node.user_scroll(top);
                true
            }
            None => false,
        }
    }

    fn render_static(&self, root: &Comp) -> String {
        let mut pass = RenderPass {
            arena: DomArena::new(),
            seen: HashSet::new(),
            rendered: Vec::new(),
            replaced: Vec::new(),
            connect_nodes: false,
        };
        let roots = self.render_tree(root, &mut pass);
        pass.arena.set_roots(roots);
        markup::write_arena(&pass.arena)
    }

    // =========================================================================
    // Commit
    // =========================================================================

    fn commit(&self) {
        let _perf = PerfSpan::new(span_names::COMMIT);
        let root = self.inner.root.borrow().clone();

        let mut pass = RenderPass {
            arena: DomArena::new(),
            seen: HashSet::new(),
            rendered: Vec::new(),
            replaced: Vec::new(),
            connect_nodes: true,
        };
        if let Some(root) = &root {
            let roots = self.render_tree(root, &mut pass);
            pass.arena.set_roots(roots);
        }

        self.release_unclaimed_nodes(&pass.rendered);
        let stale = self.remove_stale(&pass.seen);
        *self.inner.dom.borrow_mut() = pass.arena;
        self.inner.commits.set(self.inner.commits.get() + 1);

        for effect in pass.replaced.drain(..).chain(stale) {
            effect();
        }
        for id in &pass.rendered {
            self.run_effect(id, |slots| slots.pre_paint.clone());
        }
        for id in &pass.rendered {
            let attach = {
                let mut instances = self.inner.instances.borrow_mut();
                match instances.get_mut(id) {
                    Some(instance) if !instance.attached => {
                        instance.attached = true;
                        instance.effects.attach.clone()
                    }
                    _ => None,
                }
            };
            if let Some(attach) = attach {
                attach();
            }
        }
        for id in &pass.rendered {
            self.run_effect(id, |slots| slots.update.clone());
        }
        tracing::trace!(
            target: targets::HOST,
            rendered = pass.rendered.len(),
            commit = self.inner.commits.get(),
            "commit complete"
        );
    }

    fn run_effect(&self, id: &CompId, select: impl Fn(&EffectSlots) -> Option<SharedEffect>) {
        let effect = self
            .inner
            .instances
            .borrow()
            .get(id)
            .and_then(|instance| select(&instance.effects));
        if let Some(effect) = effect {
            effect();
        }
    }

    /// Drop instances that were not rendered, returning their detach
    /// effects.
    fn remove_stale(&self, seen: &HashSet<CompId>) -> Vec<SharedEffect> {
        let mut instances = self.inner.instances.borrow_mut();
        let stale: Vec<CompId> = instances
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();

        let mut effects = Vec::new();
        for id in stale {
            if let Some(mut instance) = instances.remove(&id) {
                tracing::trace!(target: targets::HOST, %id, "instance removed");
                instance.release_live();
                if instance.attached {
                    effects.extend(instance.effects.detach.take());
                }
            }
        }
        effects
    }

    fn release_unclaimed_nodes(&self, rendered: &[CompId]) {
        let mut instances = self.inner.instances.borrow_mut();
        for id in rendered {
            if let Some(instance) = instances.get_mut(id) {
                if !instance.live_claimed {
                    instance.release_live();
                }
                instance.live_claimed = false;
            }
        }
    }

    fn render_tree(&self, comp: &Comp, pass: &mut RenderPass) -> Vec<DomKey> {
        let id = comp.id().clone();
        if !pass.seen.insert(id.clone()) {
            tracing::error!(
                target: targets::HOST,
                component = %comp.label(),
                ancestry = %comp.ancestry(),
                "component appears twice in the tree; skipping repeat"
            );
            return Vec::new();
        }

        let state = {
            let mut instances = self.inner.instances.borrow_mut();
            let replaced = instances
                .get(&id)
                .is_some_and(|instance| !instance.comp.upgrade().is_some_and(|c| c.ptr_eq(comp)));
            if replaced {
                if let Some(mut old) = instances.remove(&id) {
                    tracing::debug!(target: targets::HOST, %id, "instance replaced by a new component with the same id");
                    old.release_live();
                    if old.attached {
                        pass.replaced.extend(old.effects.detach.take());
                    }
                }
            }
            let instance = instances
                .entry(id.clone())
                .or_insert_with(|| Instance::new(comp));
            Rc::clone(&instance.state)
        };

        let mut hooks = InstanceHooks {
            host: Rc::downgrade(&self.inner),
            state,
            effects: EffectSlots::default(),
            signature: Vec::new(),
        };
        let node = render_component(comp, &mut hooks);

        {
            let mut instances = self.inner.instances.borrow_mut();
            if let Some(instance) = instances.get_mut(&id) {
                match &instance.signature {
                    Some(signature) if *signature != hooks.signature => {
                        tracing::error!(
                            target: targets::HOST,
                            component = %comp.label(),
                            "hook order changed between renders"
                        );
                    }
                    Some(_) => {}
                    None => instance.signature = Some(hooks.signature.clone()),
                }
                instance.effects = hooks.effects;
            }
        }

        let keys = self.build_dom(&node, &id, pass);
        pass.rendered.push(id);
        keys
    }

    fn build_dom(&self, node: &HostNode, owner: &CompId, pass: &mut RenderPass) -> Vec<DomKey> {
        match node {
            HostNode::Empty => Vec::new(),
            HostNode::Text(text) => vec![pass.arena.insert(DomNode::Text(text.clone()))],
            HostNode::Component(element) => self.render_tree(&element.comp, pass),
            HostNode::Element(element) => {
                if pass.connect_nodes {
                    if let Some(node_ref) = &element.node_ref {
                        self.claim_live_node(owner, node_ref, element.attributes.id());
                    }
                }
                let mut children = Vec::with_capacity(element.children.len());
                if element.attributes.inner_html().is_some() {
                    if !element.children.is_empty() {
                        tracing::warn!(target: targets::HOST, %owner, "element has inner html; ignoring its children");
                    }
                } else {
                    for child in element.children.as_slice() {
                        children.extend(self.build_dom(child, owner, pass));
                    }
                }
                vec![pass.arena.insert(DomNode::Element {
                    tag: element.tag.clone(),
                    attributes: element.attributes.clone(),
                    children,
                })]
            }
        }
    }

    fn claim_live_node(&self, owner: &CompId, node_ref: &NodeRef, dom_id: Option<&str>) {
        let mut instances = self.inner.instances.borrow_mut();
        let Some(instance) = instances.get_mut(owner) else {
            return;
        };
        let live = match &instance.live {
            Some(live) => live.clone(),
            None => {
                let live = self.new_node(dom_id.map(str::to_string));
                instance.live = Some(live.clone());
                live
            }
        };
        node_ref.set(live);
        instance.node_ref = Some(node_ref.clone());
        instance.live_claimed = true;
    }

    fn new_node(&self, dom_id: Option<String>) -> Rc<HeadlessNode> {
        let serial = self.inner.next_serial.get() + 1;
        self.inner.next_serial.set(serial);
        HeadlessNode::new(serial, dom_id, Rc::clone(&self.inner.focus))
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("root", &*self.inner.root.borrow())
            .field("instances", &self.instance_count())
            .field("commits", &self.commit_count())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Render `root` to markup with a throwaway host.
///
/// No effects run and no live nodes are created.
pub fn render_to_markup(root: &Comp) -> String {
    HeadlessHost::new().render_static(root)
}
