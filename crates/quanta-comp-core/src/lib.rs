//! Core types for the Quanta component framework.
//!
//! This crate holds the pieces of the framework that do not depend on the
//! component tree itself:
//!
//! - **Identity**: [`CompId`] and the monotonic [`IdGenerator`]
//! - **Attributes**: validated, normalized attribute maps ([`Attributes`])
//! - **State**: the lazily bound, merge-based [`State`] container
//! - **Context**: injectable shared services ([`CompContext`]) for ids,
//!   focus claims, the scroll-write gate and render counting
//! - **Raw HTML**: escaping and the inner-HTML sanitizer ([`html`])
//! - **Configuration**: [`FrameworkConfig`], buildable in code or from TOML
//! - **Errors and logging**: [`CompError`] and the `tracing` targets used
//!   throughout the framework
//!
//! # Example
//!
//! ```
//! use quanta_comp_core::{Attributes, CompContext};
//! use serde_json::json;
//!
//! let ctx = CompContext::new();
//! let (id, attribs) = Attributes::prepare(json!({"className": "toolbar"}), "Toolbar", &ctx)?;
//!
//! assert_eq!(id.as_str(), "1");
//! assert_eq!(attribs.key(), Some("1"));
//! assert!(Attributes::prepare(json!("toolbar"), "Toolbar", &ctx).is_err());
//! # Ok::<(), quanta_comp_core::CompError>(())
//! ```

mod attributes;
mod config;
mod context;
mod error;
pub mod html;
mod id;
pub mod logging;
mod state;

pub use attributes::{
    ATTR_CLASS_NAME, ATTR_CLASS_TAG, ATTR_ID, ATTR_INNER_HTML, ATTR_KEY, ATTR_TITLE, Attributes,
};
pub use config::{DEFAULT_TAG, DEFAULT_TOOLTIP_PREFIX, FrameworkConfig};
pub use context::{CompContext, FocusTracker, ScrollGate, ScrollSuspension};
pub use error::{CompError, CompResult};
pub use id::{CompId, IdGenerator, short_type_name};
pub use logging::PerfSpan;
pub use state::{
    FIELD_ENABLED, FIELD_VISIBLE, State, StateRecord, StateSetter, StateTranslator, StateUpdater,
};

// Re-exported so downstream crates build attribute and state values with the
// same serde_json version.
pub use serde_json;
