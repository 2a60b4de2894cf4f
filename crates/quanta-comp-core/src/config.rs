//! Framework configuration.
//!
//! [`FrameworkConfig`] carries the handful of switches the component layer
//! consults at construction and render time. It can be built in code with
//! the `with_*` builder methods or loaded from TOML:
//!
//! ```
//! use quanta_comp_core::FrameworkConfig;
//!
//! let config = FrameworkConfig::from_toml_str(r#"
//!     render_class_in_dom = true
//!     default_tag = "section"
//! "#).unwrap();
//!
//! assert!(config.render_class_in_dom());
//! assert_eq!(config.tooltip_prefix(), "Tip:\n\n");
//! ```

use serde::Deserialize;

use crate::error::CompResult;

/// Default prefix prepended to tooltip (`title`) attributes.
pub const DEFAULT_TOOLTIP_PREFIX: &str = "Tip:\n\n";

/// Default host tag for components that do not set one.
pub const DEFAULT_TAG: &str = "div";

/// Configuration for the component framework.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Stamp every component's class name into the `c` attribute.
    render_class_in_dom: bool,
    /// Prefix applied to `title` attributes at construction.
    tooltip_prefix: String,
    /// Host tag used when a component does not specify one.
    default_tag: String,
    /// Raise scroll-protocol logging from `trace` to `debug`.
    debug_scrolling: bool,
    /// Initial state of the scroll-write gate.
    scroll_writes_enabled: bool,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            render_class_in_dom: false,
            tooltip_prefix: DEFAULT_TOOLTIP_PREFIX.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            debug_scrolling: false,
            scroll_writes_enabled: true,
        }
    }
}

impl FrameworkConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> CompResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Enable or disable stamping class names into the `c` attribute.
    pub fn with_render_class_in_dom(mut self, enabled: bool) -> Self {
        self.render_class_in_dom = enabled;
        self
    }

    /// Set the tooltip prefix.
    pub fn with_tooltip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tooltip_prefix = prefix.into();
        self
    }

    /// Set the default host tag.
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    /// Enable verbose scroll-protocol logging.
    pub fn with_debug_scrolling(mut self, enabled: bool) -> Self {
        self.debug_scrolling = enabled;
        self
    }

    /// Set the initial scroll-write gate state.
    pub fn with_scroll_writes_enabled(mut self, enabled: bool) -> Self {
        self.scroll_writes_enabled = enabled;
        self
    }

    #[inline]
    pub fn render_class_in_dom(&self) -> bool {
        self.render_class_in_dom
    }

    #[inline]
    pub fn tooltip_prefix(&self) -> &str {
        &self.tooltip_prefix
    }

    #[inline]
    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    #[inline]
    pub fn debug_scrolling(&self) -> bool {
        self.debug_scrolling
    }

    #[inline]
    pub fn scroll_writes_enabled(&self) -> bool {
        self.scroll_writes_enabled
    }
}
