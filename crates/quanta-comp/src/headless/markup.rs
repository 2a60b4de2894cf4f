//! Markup serialization of a committed tree.

use std::fmt::Write as _;

use serde_json::Value;

use quanta_comp_core::html::escape_html;
use quanta_comp_core::{ATTR_CLASS_NAME, ATTR_INNER_HTML, ATTR_KEY, Attributes};

use super::node::{DomArena, DomKey, DomNode};

/// Serialize every root of `arena`.
pub(crate) fn write_arena(arena: &DomArena) -> String {
    let mut out = String::new();
    for &root in arena.roots() {
        write_node(arena, root, &mut out);
    }
    out
}

fn write_node(arena: &DomArena, key: DomKey, out: &mut String) {
    match arena.get(key) {
        Some(DomNode::Text(text)) => escape_html(text, false, out),
        Some(DomNode::Element {
            tag,
            attributes,
            children,
        }) => {
            out.push('<');
            out.push_str(tag);
            write_attributes(attributes, out);
            out.push('>');
            // Sanitized when set.
            if let Some(html) = attributes.inner_html() {
                out.push_str(html);
            }
            for &child in children {
                write_node(arena, child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
        None => {}
    }
}

fn write_attributes(attributes: &Attributes, out: &mut String) {
    for (name, value) in attributes.iter() {
        if name == ATTR_KEY || name == ATTR_INNER_HTML {
            continue;
        }
        let name = if name == ATTR_CLASS_NAME { "class" } else { name };
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            Value::String(s) => write_attribute(name, s, out),
            Value::Number(n) => write_attribute(name, &n.to_string(), out),
            other => write_attribute(name, &other.to_string(), out),
        }
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_html(value, true, out);
    out.push('"');
}
