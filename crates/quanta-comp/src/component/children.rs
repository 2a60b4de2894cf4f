//! Child list management.
//!
//! Children are stored as `Option<Comp>`: `None` is a placeholder that keeps
//! its position but renders nothing. Placeholders are only filtered when a
//! component is materialized, never in storage.

use std::cmp::Ordering;

use quanta_comp_core::CompResult;
use quanta_comp_core::logging::targets;

use super::Comp;
use super::base::CompBase;

impl CompBase {
    /// Append a child. `None` is ignored.
    pub fn add_child(&mut self, child: impl Into<Option<Comp>>) {
        if let Some(child) = child.into() {
            self.children.push(Some(child));
        }
    }

    /// Prepend a child. `None` is ignored.
    pub fn insert_first_child(&mut self, child: impl Into<Option<Comp>>) {
        if let Some(child) = child.into() {
            self.children.insert(0, Some(child));
        }
    }

    /// Append a list of children, placeholders included.
    pub fn add_children(&mut self, children: impl IntoIterator<Item = Option<Comp>>) {
        self.children.extend(children);
    }

    /// Append the result of building a child.
    ///
    /// A construction error is logged with this component's label and the
    /// child is left out; returns whether a child was added.
    pub fn try_add_child(&mut self, child: CompResult<Comp>) -> bool {
        match child {
            Ok(child) => {
                self.children.push(Some(child));
                true
            }
            Err(err) => {
                tracing::error!(
                    target: targets::CHILDREN,
                    parent = %self.label(),
                    error = %err,
                    "failed to construct child"
                );
                false
            }
        }
    }

    /// Replace the whole child list.
    pub fn set_children(&mut self, children: Vec<Option<Comp>>) {
        self.children = children;
    }

    /// Remove all children.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// The stored child list, placeholders included.
    pub fn children(&self) -> &[Option<Comp>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Option<Comp>> {
        &mut self.children
    }

    /// Iterate the non-placeholder children.
    pub fn child_comps(&self) -> impl Iterator<Item = &Comp> {
        self.children.iter().flatten()
    }

    /// Whether there is anything to render: content, or at least one
    /// non-placeholder child.
    pub fn has_children(&self) -> bool {
        self.content().is_some() || self.children.iter().any(Option::is_some)
    }

    /// Sort children by ordinal, ascending.
    ///
    /// The sort is stable. Children without an ordinal, placeholders and
    /// children that cannot be borrowed keep their relative order after all
    /// ordered children.
    pub fn ordinal_sort_children(&mut self) {
        self.children
            .sort_by_cached_key(|child| OrdinalKey(child.as_ref().and_then(child_ordinal)));
    }
}

fn child_ordinal(child: &Comp) -> Option<i32> {
    match child.try_borrow() {
        Ok(component) => component.base().ordinal(),
        Err(_) => {
            tracing::warn!(
                target: targets::CHILDREN,
                child = %child.label(),
                "child busy during ordinal sort; placing it last"
            );
            None
        }
    }
}

/// Orders `Some` ascending, then every `None`.
#[derive(PartialEq, Eq)]
struct OrdinalKey(Option<i32>);

impl Ord for OrdinalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for OrdinalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
