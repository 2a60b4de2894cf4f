//! Error types for the Quanta component framework.

/// Result type alias for component operations.
pub type CompResult<T> = std::result::Result<T, CompError>;

/// Errors that can occur while building, rendering, or mutating components.
///
/// Only [`CompError::InvalidAttributes`] and [`CompError::Config`] are ever
/// returned to callers as hard failures. Render and state errors are caught
/// at the component boundary and logged, so that one failing subtree
/// degrades to a blank area instead of aborting the render pass.
#[derive(Debug, thiserror::Error)]
pub enum CompError {
    /// A component was constructed with something other than an attribute map.
    #[error("{found} was passed for 'attribs' in {class}")]
    InvalidAttributes {
        /// Short class name of the component being constructed.
        class: &'static str,
        /// Description of the rejected value ("string", "array", ...).
        found: &'static str,
    },

    /// State was used after the first render without a bound container.
    #[error("non-state component {component} attempted to use state after rendering")]
    StateUnavailable { component: String },

    /// A state value did not serialize to a record (JSON object).
    #[error("state must be a record, got {found}")]
    StateNotRecord { found: &'static str },

    /// A state value could not be converted to or from a record.
    #[error("state serialization failed: {0}")]
    StateSerialization(#[from] serde_json::Error),

    /// A child component could not be borrowed while materializing its parent.
    #[error("child component {child} is unavailable (already borrowed)")]
    ChildUnavailable { child: String },

    /// A component's render returned an error.
    #[error("failed to render {component}: {message}")]
    Render { component: String, message: String },

    /// A component's render panicked.
    #[error("render of {component} panicked: {message}")]
    RenderPanicked { component: String, message: String },

    /// Framework configuration could not be parsed.
    #[error("invalid framework configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl CompError {
    /// Create a render error for a component label.
    pub fn render(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error indicates programmer misuse at construction time.
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidAttributes { .. })
    }
}

/// Describe a JSON value kind for error messages.
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_attributes_names_class() {
        let err = CompError::InvalidAttributes {
            class: "Button",
            found: "string",
        };
        assert_eq!(err.to_string(), "string was passed for 'attribs' in Button");
        assert!(err.is_construction_error());
    }

    #[test]
    fn test_render_error_message() {
        let err = CompError::render("Div_7", "boom");
        assert_eq!(err.to_string(), "failed to render Div_7: boom");
        assert!(!err.is_construction_error());
    }
}
