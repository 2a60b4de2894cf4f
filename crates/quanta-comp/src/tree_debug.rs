//! Debug visualization of component trees.
//!
//! ```
//! use quanta_comp::{Comp, CompBase, CompTreeDebug, Component, TreeFormatOptions};
//! use quanta_comp_core::CompContext;
//! use serde_json::Value;
//!
//! struct Panel { base: CompBase }
//! impl Component for Panel {
//!     fn base(&self) -> &CompBase { &self.base }
//!     fn base_mut(&mut self) -> &mut CompBase { &mut self.base }
//! }
//!
//! let ctx = CompContext::new();
//! let child = Comp::new(Panel { base: CompBase::new::<Panel>(&ctx, Value::Null)? });
//! let mut base = CompBase::new::<Panel>(&ctx, Value::Null)?;
//! base.add_children([None, Some(child)]);
//! let root = Comp::new(Panel { base });
//!
//! let output = CompTreeDebug::with_options(TreeFormatOptions::minimal()).format_subtree(&root);
//! assert_eq!(output, "Panel\n├── (null)\n└── Panel\n");
//! # Ok::<(), quanta_comp_core::CompError>(())
//! ```

use std::fmt::Write as _;

use crate::component::Comp;

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show component ids.
    pub show_ids: bool,
    /// Show lifecycle flags (mounted, state, rejected).
    pub show_flags: bool,
    /// Show child ordinals.
    pub show_ordinals: bool,
    /// Show `None` placeholders in child lists.
    pub show_placeholders: bool,
    /// Maximum depth to traverse (`None` for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_flags: true,
            show_ordinals: true,
            show_placeholders: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Class names and placeholders only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_flags: false,
            show_ordinals: false,
            ..Default::default()
        }
    }
}

/// Formats a component subtree for logs and test failure output.
#[derive(Debug, Clone, Default)]
pub struct CompTreeDebug {
    options: TreeFormatOptions,
}

impl CompTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format `root` and its descendants, one component per line.
    pub fn format_subtree(&self, root: &Comp) -> String {
        let mut output = String::new();
        let mut open = Vec::new();
        self.format_comp(root, &mut open, &mut output);
        output
    }

    fn format_comp(&self, comp: &Comp, open: &mut Vec<bool>, output: &mut String) {
        output.push_str(comp.class());
        if self.options.show_ids {
            let _ = write!(output, " [{}]", comp.id());
        }

        let Ok(component) = comp.try_borrow() else {
            output.push_str(" (busy)\n");
            return;
        };
        let base = component.base();

        if self.options.show_ordinals {
            if let Some(ordinal) = base.ordinal() {
                let _ = write!(output, " #{ordinal}");
            }
        }
        if self.options.show_flags {
            let flags: Vec<&str> = [
                (base.is_mounted(), "mounted"),
                (base.has_state(), "state"),
                (base.was_pre_render_rejected(), "rejected"),
            ]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect();
            if !flags.is_empty() {
                let _ = write!(output, " ({})", flags.join(", "));
            }
        }
        output.push('\n');

        if self.options.max_depth.is_some_and(|max| open.len() >= max) {
            return;
        }

        let children: Vec<Option<&Comp>> = base
            .children()
            .iter()
            .map(Option::as_ref)
            .filter(|child| self.options.show_placeholders || child.is_some())
            .collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i + 1 == count;
            self.write_prefix(open, is_last, output);
            match child {
                Some(child) => {
                    open.push(!is_last);
                    self.format_comp(child, open, output);
                    open.pop();
                }
                None => output.push_str("(null)\n"),
            }
        }
    }

    fn write_prefix(&self, open: &[bool], is_last: bool, output: &mut String) {
        let (pipe, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("  ", "  ", "  "),
        };
        for &continues in open {
            output.push_str(if continues { pipe } else { "    " });
        }
        output.push_str(if is_last { corner } else { tee });
    }
}
