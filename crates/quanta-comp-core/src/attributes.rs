//! Component attribute maps.
//!
//! Attributes are an open key-value map handed to the host runtime with
//! every materialization. A few keys are managed by the framework:
//!
//! - `id`: the component id (generated when absent)
//! - `key`: the reconciliation key (defaults to the id)
//! - `c`: an optional debug class tag, present only when
//!   [`FrameworkConfig::render_class_in_dom`](crate::FrameworkConfig::render_class_in_dom)
//!   is enabled
//! - `dangerouslySetInnerHTML`: sanitized raw HTML that replaces the
//!   element's children (see [`Attributes::set_inner_html`])
//!
//! Construction validates the attribute value with [`Attributes::prepare`]:
//! raw strings and arrays are rejected.

use serde_json::{Map, Value};

use crate::context::CompContext;
use crate::error::{CompError, CompResult, value_kind};
use crate::html::sanitize_html;
use crate::id::CompId;

/// Framework-managed id attribute.
pub const ATTR_ID: &str = "id";
/// Framework-managed reconciliation key attribute.
pub const ATTR_KEY: &str = "key";
/// Debug class tag attribute.
pub const ATTR_CLASS_TAG: &str = "c";
/// Tooltip attribute.
pub const ATTR_TITLE: &str = "title";
/// CSS class attribute.
pub const ATTR_CLASS_NAME: &str = "className";
/// Raw inner HTML attribute, holding `{"__html": "..."}`.
pub const ATTR_INNER_HTML: &str = "dangerouslySetInnerHTML";

const INNER_HTML_FIELD: &str = "__html";

/// An ordered attribute map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    map: Map<String, Value>,
}

impl Attributes {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self { map: Map::new() }
    }

    /// Validate and normalize construction input for a component of class `class`.
    ///
    /// Accepts `null` (treated as an empty map) or an object. Anything else is
    /// a construction error naming the class. On success the map has its `id`
    /// and `key` filled in, the tooltip decorated, and the debug class tag
    /// stamped or stripped according to the context's configuration.
    pub fn prepare(
        value: Value,
        class: &'static str,
        ctx: &CompContext,
    ) -> CompResult<(CompId, Attributes)> {
        let mut attribs = match value {
            Value::Null => Attributes::new(),
            Value::Object(map) => Attributes { map },
            other => {
                return Err(CompError::InvalidAttributes {
                    class,
                    found: value_kind(&other),
                });
            }
        };
        let id = attribs.normalize(class, ctx);
        Ok((id, attribs))
    }

    /// Apply the construction-time rules to an already-typed map.
    pub(crate) fn normalize(&mut self, class: &'static str, ctx: &CompContext) -> CompId {
        let config = ctx.config();

        if let Some(Value::String(title)) = self.map.get_mut(ATTR_TITLE) {
            if !title.is_empty() {
                title.insert_str(0, config.tooltip_prefix());
            }
        }

        if config.render_class_in_dom() {
            // A caller-provided tag (e.g. naming a generic Div) wins.
            if !self.map.contains_key(ATTR_CLASS_TAG) {
                self.map
                    .insert(ATTR_CLASS_TAG.to_string(), Value::String(class.to_string()));
            }
        } else {
            self.map.remove(ATTR_CLASS_TAG);
        }

        // Caller-supplied raw HTML goes through the sanitizer like any other.
        if let Some(raw) = self.map.remove(ATTR_INNER_HTML) {
            let html = match raw {
                Value::String(html) => Some(html),
                Value::Object(mut inner) => match inner.remove(INNER_HTML_FIELD) {
                    Some(Value::String(html)) => Some(html),
                    _ => None,
                },
                _ => None,
            };
            if let Some(html) = html {
                self.set_inner_html(&html);
            }
        }

        let id = match self.map.get(ATTR_ID) {
            Some(Value::String(s)) if !s.is_empty() => CompId::new(s),
            Some(Value::Number(n)) => CompId::from(n.to_string()),
            _ => ctx.next_id(),
        };
        self.map
            .insert(ATTR_ID.to_string(), Value::String(id.to_string()));

        let key = match self.map.get(ATTR_KEY) {
            Some(Value::String(s)) if !s.is_empty() => None,
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => Some(id.to_string()),
        };
        if let Some(key) = key {
            self.map.insert(ATTR_KEY.to_string(), Value::String(key));
        }
        id
    }

    /// Get an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Get a string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(Value::as_str)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.map.insert(name.into(), value.into())
    }

    /// Remove an attribute.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.map.remove(name)
    }

    /// Whether an attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// The component id attribute.
    pub fn id(&self) -> Option<&str> {
        self.get_str(ATTR_ID)
    }

    /// The reconciliation key attribute.
    pub fn key(&self) -> Option<&str> {
        self.get_str(ATTR_KEY)
    }

    /// Sanitize `html` and store it as the element's inner HTML.
    ///
    /// Hosts render an element with inner HTML without children.
    pub fn set_inner_html(&mut self, html: &str) {
        let mut inner = Map::new();
        inner.insert(INNER_HTML_FIELD.to_string(), Value::String(sanitize_html(html)));
        self.map.insert(ATTR_INNER_HTML.to_string(), Value::Object(inner));
    }

    /// The sanitized inner HTML, if set.
    pub fn inner_html(&self) -> Option<&str> {
        self.map
            .get(ATTR_INNER_HTML)?
            .get(INNER_HTML_FIELD)?
            .as_str()
    }

    /// Set the CSS class attribute.
    pub fn set_class(&mut self, class: impl Into<String>) {
        self.set(ATTR_CLASS_NAME, class.into());
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl From<Attributes> for Value {
    fn from(attribs: Attributes) -> Self {
        Value::Object(attribs.map)
    }
}
