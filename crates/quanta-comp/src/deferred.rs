//! Deferred attachment queue.
//!
//! Many behaviors need a live host node (focusing an input, measuring an
//! element, wiring a native listener) that does not exist at construction
//! time. [`CompBase::on_mount`](crate::CompBase::on_mount) either runs a
//! callback now or parks it here until the component attaches.

use std::rc::Rc;

use crate::host::LiveNode;

/// A callback waiting for a live node.
pub type MountCallback = Box<dyn FnOnce(&Rc<dyn LiveNode>)>;

/// Per-component queue of [`MountCallback`]s.
///
/// Drained at most once per attachment; after a drain the queue is empty
/// until something new is queued.
#[derive(Default)]
pub struct MountQueue {
    pending: Option<Vec<MountCallback>>,
}

impl MountQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a callback.
    pub fn push(&mut self, callback: MountCallback) {
        self.pending.get_or_insert_with(Vec::new).push(callback);
    }

    /// Remove and return every queued callback, in registration order.
    pub fn take(&mut self) -> Option<Vec<MountCallback>> {
        self.pending.take()
    }

    pub fn len(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MountQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Run drained callbacks against `node`, in order.
pub(crate) fn run_all(callbacks: Vec<MountCallback>, node: &Rc<dyn LiveNode>) {
    for callback in callbacks {
        callback(node);
    }
}
