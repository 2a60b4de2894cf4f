//! A headless reference host.
//!
//! [`HeadlessHost`] implements the host side of the framework entirely in
//! memory: hook slots per component instance, a committed node arena, live
//! nodes with focus and scroll, and markup output. It is what the test
//! suite mounts components into, and it doubles as a static renderer via
//! [`render_to_markup`].
//!
//! The host also exposes the churn real runtimes produce so the
//! framework's defenses against it can be exercised directly:
//! repeated attach notifications ([`HeadlessHost::simulate_attach`]),
//! node recreation ([`HeadlessHost::recreate_node`]) and user scrolling
//! ([`HeadlessHost::user_scroll`]).

mod markup;
mod node;
mod runtime;

pub use node::HeadlessNode;
pub use runtime::{HeadlessHost, render_to_markup};
