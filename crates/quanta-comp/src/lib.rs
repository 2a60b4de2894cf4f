//! Quanta - an imperative component layer over hook-based host runtimes.
//!
//! Components are plain structs that own a [`CompBase`] and implement
//! [`Component`]. They keep their own children, attributes and state, and
//! are handed to a host runtime through [`Comp`] handles. The host renders
//! each component by calling [`render_component`], which bridges the
//! host's state cell and effect hooks onto the component's lifecycle
//! callbacks.
//!
//! On top of that bridge the framework provides:
//!
//! - a deferred queue for work that needs the live node ([`CompBase::on_mount`])
//! - focus that survives node recreation ([`CompBase::focus`])
//! - scroll offsets that survive re-creation of the component ([`ScrollPos`])
//! - per-component render error isolation
//!
//! # Example
//!
//! ```
//! use quanta_comp::headless::HeadlessHost;
//! use quanta_comp::{Comp, CompBase, Component};
//! use quanta_comp_core::CompContext;
//! use serde_json::json;
//!
//! struct Search {
//!     base: CompBase,
//! }
//!
//! impl Component for Search {
//!     fn base(&self) -> &CompBase { &self.base }
//!     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
//! }
//!
//! let ctx = CompContext::new();
//! let mut base = CompBase::new::<Search>(&ctx, json!({"id": "search"}))?;
//! base.set_tag("input");
//! base.focus();
//! let search = Comp::new(Search { base });
//!
//! let host = HeadlessHost::new();
//! host.mount(&search);
//! assert_eq!(host.focused_id().as_deref(), Some("search"));
//! # Ok::<(), quanta_comp_core::CompError>(())
//! ```

pub mod component;
mod deferred;
mod focus;
pub mod headless;
pub mod host;
mod lifecycle;
mod render;
mod scroll;
mod tree_debug;

pub use component::{Comp, CompBase, Component, FIELD_FORCE_RENDER, WeakComp};
pub use deferred::{MountCallback, MountQueue};
pub use host::{
    CompElement, Effect, ElementNode, Hooks, HostChildren, HostNode, LiveNode, NodeRef,
    ScrollListener,
};
pub use lifecycle::render_component;
pub use render::RenderCx;
pub use scroll::ScrollPos;
pub use tree_debug::{CompTreeDebug, TreeFormatOptions, TreeStyle};
