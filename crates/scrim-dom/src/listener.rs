#![forbid(unsafe_code)]

//! Listener registry and RAII listener handles.
//!
//! # Invariants
//!
//! 1. Listeners on one target run in registration order.
//! 2. Dropping a [`ListenerHandle`] removes its listener before the next
//!    delivery, including deliveries later in an in-flight dispatch.
//! 3. Destroying a node drops every listener attached to it; outstanding
//!    handles for those listeners become inert.

use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::document::DocumentInner;
use crate::event::{Event, EventTarget, EventType};
use crate::node::NodeId;

/// Listener callback.
pub type Listener = Rc<dyn Fn(&mut Event)>;

/// Unique listener identifier; strictly increasing per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

struct Entry {
    target: EventTarget,
    event_type: EventType,
    callback: Listener,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: AHashMap<ListenerId, Entry>,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        callback: Listener,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.insert(
            id,
            Entry {
                target,
                event_type,
                callback,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn is_registered(&self, id: ListenerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Listeners for `target`/`event_type` in registration order.
    pub(crate) fn snapshot(
        &self,
        target: EventTarget,
        event_type: EventType,
    ) -> Vec<(ListenerId, Listener)> {
        let mut matched: Vec<(ListenerId, Listener)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.target == target && e.event_type == event_type)
            .map(|(id, e)| (*id, Rc::clone(&e.callback)))
            .collect();
        matched.sort_unstable_by_key(|(id, _)| *id);
        matched
    }

    pub(crate) fn forget_nodes(&mut self, nodes: &[NodeId]) {
        self.entries.retain(|_, e| match e.target {
            EventTarget::Node(node) => !nodes.contains(&node),
            EventTarget::Window => true,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// RAII registration returned by [`crate::Document::add_listener`].
///
/// The listener stays attached exactly as long as the handle lives.
#[must_use = "dropping a ListenerHandle removes the listener immediately"]
pub struct ListenerHandle {
    document: Weak<DocumentInner>,
    id: ListenerId,
}

impl ListenerHandle {
    pub(crate) fn new(document: Weak<DocumentInner>, id: ListenerId) -> Self {
        Self { document, id }
    }

    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered with a live document.
    pub fn is_active(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|doc| doc.listeners.borrow().is_registered(self.id))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(doc) = self.document.upgrade() {
            doc.listeners.borrow_mut().remove(self.id);
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id.0)
            .field("active", &self.is_active())
            .finish()
    }
}
