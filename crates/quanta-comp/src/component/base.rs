//! Component base implementation.
//!
//! [`CompBase`] holds everything the framework tracks for a component:
//! identity, attributes, content, children, lifecycle flags, the deferred
//! attachment queue, the optional state container and the node ref.
//! Concrete components embed one and hand it out through
//! [`Component::base`](super::Component::base).

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use quanta_comp_core::logging::targets;
use quanta_comp_core::{
    Attributes, CompContext, CompError, CompId, CompResult, FIELD_ENABLED, FIELD_VISIBLE, State,
    StateRecord, comp_log, short_type_name,
};

use super::Comp;
use crate::deferred::{MountCallback, MountQueue};
use crate::host::{LiveNode, NodeRef};

/// State field written by [`CompBase::force_render`].
pub const FIELD_FORCE_RENDER: &str = "forceRender";

/// The base implementation shared by all components.
pub struct CompBase {
    /// Shared framework services.
    ctx: CompContext,

    /// Component id; fixed for the component's lifetime.
    id: CompId,

    /// Short class name used in labels and the debug class tag.
    class: &'static str,

    attributes: Attributes,

    /// Text rendered when there are no child components.
    content: Option<String>,

    /// Child components. `None` entries are positional placeholders.
    pub(crate) children: Vec<Option<Comp>>,

    tag: String,

    /// Sort key used by [`CompBase::ordinal_sort_children`].
    ordinal: Option<i32>,

    /// Raise this component's lifecycle logging to `debug`.
    debug: bool,

    // Lifecycle flags
    pub(crate) mounted: bool,
    pub(crate) rendered: bool,
    pub(crate) pre_render_rejected: bool,

    pub(crate) mount_queue: MountQueue,

    pub(crate) state: Option<State>,

    node_ref: NodeRef,
}

impl CompBase {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a base for component type `T`.
    ///
    /// `attributes` must be `null` or an object; strings and arrays are
    /// rejected with [`CompError::InvalidAttributes`] naming `T`.
    pub fn new<T: ?Sized>(ctx: &CompContext, attributes: Value) -> CompResult<Self> {
        Self::with_class(ctx, short_type_name::<T>(), attributes, None)
    }

    /// Create a base for component type `T` with a state container.
    pub fn with_state<T: ?Sized>(
        ctx: &CompContext,
        attributes: Value,
        state: State,
    ) -> CompResult<Self> {
        Self::with_class(ctx, short_type_name::<T>(), attributes, Some(state))
    }

    /// Create a base with an explicit class name.
    pub fn with_class(
        ctx: &CompContext,
        class: &'static str,
        attributes: Value,
        state: Option<State>,
    ) -> CompResult<Self> {
        let (id, attributes) = Attributes::prepare(attributes, class, ctx)?;
        tracing::trace!(target: targets::LIFECYCLE, %id, class, "component constructed");
        Ok(Self {
            tag: ctx.config().default_tag().to_string(),
            ctx: ctx.clone(),
            id,
            class,
            attributes,
            content: None,
            children: Vec::new(),
            ordinal: None,
            debug: false,
            mounted: false,
            rendered: false,
            pre_render_rejected: false,
            mount_queue: MountQueue::new(),
            state,
            node_ref: NodeRef::new(),
        })
    }

    // =========================================================================
    // Identity
    // =========================================================================

    #[inline]
    pub fn id(&self) -> &CompId {
        &self.id
    }

    #[inline]
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// `Class_id`, used to identify the component in logs.
    pub fn label(&self) -> String {
        format!("{}_{}", self.class, self.id)
    }

    /// The reconciliation key.
    pub fn key(&self) -> &str {
        self.attributes.key().unwrap_or(self.id.as_str())
    }

    /// The framework services this component was built with.
    #[inline]
    pub fn context(&self) -> &CompContext {
        &self.ctx
    }

    // =========================================================================
    // Attributes, Tag and Content
    // =========================================================================

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Attributes, for in-place changes before the next render.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Set the CSS class attribute.
    pub fn set_class(&mut self, class: impl Into<String>) {
        self.attributes.set_class(class);
    }

    /// Render sanitized `html` as this element's content.
    ///
    /// Replaces children and text content for as long as it is set.
    pub fn set_inner_html(&mut self, html: &str) {
        self.attributes.set_inner_html(html);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    pub fn clear_content(&mut self) {
        self.content = None;
    }

    pub fn ordinal(&self) -> Option<i32> {
        self.ordinal
    }

    pub fn set_ordinal(&mut self, ordinal: Option<i32>) {
        self.ordinal = ordinal;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Raise this component's lifecycle logging to `debug`.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Whether the component is attached.
    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether the component has rendered at least once.
    #[inline]
    pub fn has_rendered(&self) -> bool {
        self.rendered
    }

    /// Whether the most recent render was rejected by `pre_render`.
    #[inline]
    pub fn was_pre_render_rejected(&self) -> bool {
        self.pre_render_rejected
    }

    /// The ref the host fills with this component's live node.
    pub fn node_ref(&self) -> &NodeRef {
        &self.node_ref
    }

    /// The live node, only while attached and connected.
    ///
    /// Always `None` after a rejected render.
    pub fn live_node(&self) -> Option<Rc<dyn LiveNode>> {
        if self.pre_render_rejected {
            return None;
        }
        self.node_ref.get_live_node()
    }

    /// Run `callback` once the component's live node exists.
    ///
    /// If the node is live now, earlier queued callbacks are flushed and
    /// `callback` runs immediately. Otherwise it is queued and runs, in
    /// registration order, when the component next attaches.
    ///
    /// Callbacks must not borrow the component that owns them.
    pub fn on_mount(&mut self, callback: impl FnOnce(&Rc<dyn LiveNode>) + 'static) {
        if let Some(node) = self.live_node() {
            if let Some(queued) = self.mount_queue.take() {
                crate::deferred::run_all(queued, &node);
            }
            callback(&node);
            return;
        }

        self.mount_queue.push(Box::new(callback) as MountCallback);
        comp_log!(
            self.debug,
            target: targets::LIFECYCLE,
            component = %self.label(),
            queued = self.mount_queue.len(),
            "queued on-mount callback"
        );
    }

    /// Number of callbacks waiting for attachment.
    pub fn pending_mount_callbacks(&self) -> usize {
        self.mount_queue.len()
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether the component owns a state container.
    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// The state container, creating it if the component has not rendered.
    ///
    /// After the first render a missing container cannot be bound any more;
    /// the misuse is logged and `None` returned.
    pub fn check_state(&mut self) -> Option<&State> {
        if self.state.is_none() {
            if self.rendered {
                let err = CompError::StateUnavailable {
                    component: self.label(),
                };
                tracing::error!(target: targets::STATE, error = %err, "state misuse");
                return None;
            }
            self.state = Some(State::new());
        }
        self.state.as_ref()
    }

    /// Shallow-merge `partial` into the state and re-render.
    pub fn merge_state<T: Serialize + ?Sized>(&mut self, partial: &T) {
        let label = self.label();
        if let Some(state) = self.check_state() {
            if let Err(err) = state.merge(partial) {
                tracing::error!(target: targets::STATE, component = %label, error = %err, "merge_state failed");
            }
        }
    }

    /// Replace the state and re-render.
    pub fn set_state<T: Serialize + ?Sized>(&mut self, state: &T) {
        let label = self.label();
        if let Some(container) = self.check_state() {
            if let Err(err) = container.replace(state) {
                tracing::error!(target: targets::STATE, component = %label, error = %err, "set_state failed");
            }
        }
    }

    /// Shallow-merge a raw record into the state.
    pub fn merge_state_record(&mut self, partial: StateRecord) {
        if let Some(state) = self.check_state() {
            state.merge_record(partial);
        }
    }

    /// Read the state as `T`.
    ///
    /// `None` on state misuse or when the record does not fit `T`.
    pub fn get_state<T: DeserializeOwned>(&mut self) -> Option<T> {
        let label = self.label();
        let state = self.check_state()?;
        match state.get() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(target: targets::STATE, component = %label, error = %err, "get_state failed");
                None
            }
        }
    }

    /// Snapshot of the raw state record.
    pub fn state_record(&mut self) -> Option<StateRecord> {
        self.check_state().map(State::record)
    }

    /// Trigger a re-render without changing meaningful state.
    pub fn force_render(&mut self) {
        let marker = self.ctx.render_count() + 1;
        self.merge_state(&serde_json::json!({ FIELD_FORCE_RENDER: marker }));
    }

    /// Merge `visible` into the state.
    pub fn set_visible(&mut self, visible: bool) {
        self.merge_state(&serde_json::json!({ FIELD_VISIBLE: visible }));
    }

    /// Merge `enabled` into the state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.merge_state(&serde_json::json!({ FIELD_ENABLED: enabled }));
    }

    /// `visible` from the state; defaults to `true`.
    pub fn is_visible(&self) -> bool {
        self.state_flag(FIELD_VISIBLE)
    }

    /// `enabled` from the state; defaults to `true`.
    pub fn is_enabled(&self) -> bool {
        self.state_flag(FIELD_ENABLED)
    }

    /// Fill `visible` and `enabled` with `true` when absent.
    pub fn ensure_visibility_defaults(&mut self) {
        if let Some(state) = self.check_state() {
            state.ensure_visibility_defaults();
        }
    }

    fn state_flag(&self, field: &str) -> bool {
        self.state
            .as_ref()
            .and_then(|state| state.field(field))
            .and_then(|value| value.as_bool())
            .unwrap_or(true)
    }
}

impl std::fmt::Debug for CompBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompBase")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("tag", &self.tag)
            .field("children", &self.children.len())
            .field("mounted", &self.mounted)
            .field("rendered", &self.rendered)
            .field("has_state", &self.state.is_some())
            .finish()
    }
}
