//! Logging facilities for the Quanta component framework.
//!
//! The framework is instrumented with the `tracing` crate. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("quanta_comp::scroll=debug,quanta_comp::render=warn")
//!     .init();
//! ```
//!
//! Render failures are logged at `error` on [`targets::RENDER`] with the
//! failing component's ancestry; lifecycle and scroll bookkeeping log at
//! `trace`, or `debug` for components with their debug flag set.

/// Span names used for tracing.
pub mod span_names {
    /// A single component render.
    pub const RENDER: &str = "quanta_comp::render";
    /// A lifecycle effect (attach, update, pre-paint, detach).
    pub const LIFECYCLE: &str = "quanta_comp::lifecycle";
    /// A host commit of a component tree.
    pub const COMMIT: &str = "quanta_comp::commit";
}

/// Target names for log filtering.
pub mod targets {
    /// Framework root target.
    pub const ROOT: &str = "quanta_comp";
    /// Mount, update, pre-paint and detach effects.
    pub const LIFECYCLE: &str = "quanta_comp::lifecycle";
    /// Render entry, rejection and failure isolation.
    pub const RENDER: &str = "quanta_comp::render";
    /// State binding and writes.
    pub const STATE: &str = "quanta_comp::state";
    /// Focus claims and restoration.
    pub const FOCUS: &str = "quanta_comp::focus";
    /// Scroll persistence.
    pub const SCROLL: &str = "quanta_comp::scroll";
    /// Child list manipulation.
    pub const CHILDREN: &str = "quanta_comp::children";
    /// Host runtime bookkeeping.
    pub const HOST: &str = "quanta_comp::host";
    /// Id generation.
    pub const IDENTITY: &str = "quanta_comp::identity";
    /// Raw HTML sanitizing.
    pub const HTML: &str = "quanta_comp::html";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time renders and commits.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: "quanta_comp::perf", "perf", operation);
        Self {
            span: span.entered(),
        }
    }

    /// Enter a performance span tagged with a component label.
    pub fn for_component(operation: &'static str, component: &str) -> Self {
        let span =
            tracing::debug_span!(target: "quanta_comp::perf", "perf", operation, component);
        Self {
            span: span.entered(),
        }
    }
}

/// Log at `debug` when `$loud` is set, otherwise at `trace`.
///
/// Components carry a debug flag; messages about a flagged component are
/// promoted so they show up without enabling trace output globally.
#[macro_export]
macro_rules! comp_log {
    ($loud:expr, target: $target:expr, $($arg:tt)*) => {
        if $loud {
            tracing::debug!(target: $target, $($arg)*)
        } else {
            tracing::trace!(target: $target, $($arg)*)
        }
    };
}
