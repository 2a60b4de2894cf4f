//! Component system for Quanta.
//!
//! This module provides the imperative authoring layer:
//!
//! - [`Component`] trait: hook points a concrete component overrides
//! - [`CompBase`]: identity, attributes, children, lifecycle flags and state
//! - [`Comp`]: the shared handle the tree and the host pass around
//!
//! # Creating a Component
//!
//! 1. Define a struct with a `CompBase` field
//! 2. Implement the `Component` trait
//! 3. Override `pre_render` to build children, or `comp_render` to emit a
//!    custom node
//!
//! ```
//! use quanta_comp::{Comp, CompBase, Component};
//! use quanta_comp_core::{CompContext, CompResult};
//! use serde_json::{Value, json};
//!
//! struct Item {
//!     base: CompBase,
//! }
//!
//! impl Item {
//!     fn new(ctx: &CompContext, text: &str) -> CompResult<Comp> {
//!         let mut base = CompBase::new::<Self>(ctx, Value::Null)?;
//!         base.set_tag("li");
//!         base.set_content(text);
//!         Ok(Comp::new(Self { base }))
//!     }
//! }
//!
//! impl Component for Item {
//!     fn base(&self) -> &CompBase { &self.base }
//!     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
//! }
//!
//! struct List {
//!     base: CompBase,
//!     items: Vec<String>,
//! }
//!
//! impl Component for List {
//!     fn base(&self) -> &CompBase { &self.base }
//!     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
//!
//!     fn pre_render(&mut self) -> bool {
//!         let ctx = self.base.context().clone();
//!         self.base.clear_children();
//!         for item in &self.items {
//!             self.base.try_add_child(Item::new(&ctx, item));
//!         }
//!         true
//!     }
//! }
//!
//! let ctx = CompContext::new();
//! let mut base = CompBase::new::<List>(&ctx, json!({"className": "list"}))?;
//! base.set_tag("ul");
//! let list = Comp::new(List { base, items: vec!["a".into(), "b".into()] });
//! assert_eq!(list.class(), "List");
//! # Ok::<(), quanta_comp_core::CompError>(())
//! ```
//!
//! # Component Tree
//!
//! Parents hold children through [`Comp`] handles. Parent links are
//! recorded when a parent materializes its children and are used for
//! [`Comp::ancestry`] in render-failure logs.

mod base;
mod children;
mod handle;
mod tests;
mod traits;

pub use base::{CompBase, FIELD_FORCE_RENDER};
pub use handle::{Comp, WeakComp};
pub use traits::Component;
