#![forbid(unsafe_code)]

//! The live document a dialog engine runs against.
//!
//! [`Document`] is a cheap `Rc` handle; clones share one tree. Everything is
//! single-threaded and cooperative: no borrow of document state is held while
//! a listener or microtask runs, so callbacks may freely mutate the tree,
//! move focus, register listeners, or dispatch nested events.
//!
//! # Invariants
//!
//! - The `<html>` root and `<body>` always exist and cannot be removed.
//! - `active_element()` is either `None` (focus on body) or a connected node.
//! - Removing a subtree that contains the active element resets focus to body.
//! - Microtasks run in FIFO order, including tasks queued while draining.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::error::{DomError, Result};
use crate::event::{DispatchOutcome, Event, EventKind, EventTarget, EventType, Key, KeyEvent};
use crate::event::{Modifiers, MouseButton};
use crate::listener::{ListenerHandle, ListenerRegistry};
use crate::node::{Arena, NodeData, NodeId};
use crate::tabbable;

type Microtask = Box<dyn FnOnce()>;

pub(crate) struct Tree {
    arena: Arena,
    root: NodeId,
    body: NodeId,
    active: Option<NodeId>,
}

impl Tree {
    fn new() -> Self {
        let mut arena = Arena::default();
        let root = arena.insert(NodeData::new("html"));
        let body = arena.insert(NodeData::new("body"));
        if let Some(node) = arena.get_mut(body) {
            node.parent = Some(root);
        }
        if let Some(node) = arena.get_mut(root) {
            node.children.push(body);
        }
        Self {
            arena,
            root,
            body,
            active: None,
        }
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.arena.get(id).ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.arena.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    /// Inclusive ancestor test.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.arena.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn is_connected(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some() && self.contains(self.root, id)
    }

    fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Some(p) = self.arena.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
            self.node_mut(id)?.parent = None;
        }
        if self.active.is_some_and(|active| self.contains(id, active)) {
            self.active = None;
        }
        Ok(())
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.arena.get(next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }
}

pub(crate) struct DocumentInner {
    pub(crate) tree: RefCell<Tree>,
    pub(crate) listeners: RefCell<ListenerRegistry>,
    microtasks: RefCell<VecDeque<Microtask>>,
}

/// Shared handle to a live document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

/// Non-owning document handle for callbacks stored inside the document.
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<DocumentInner>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (`<html><body></body></html>`).
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                tree: RefCell::new(Tree::new()),
                listeners: RefCell::new(ListenerRegistry::default()),
                microtasks: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles share the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- Structure ---

    #[inline]
    pub fn root(&self) -> NodeId {
        self.inner.tree.borrow().root
    }

    #[inline]
    pub fn body(&self) -> NodeId {
        self.inner.tree.borrow().body
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.tree.borrow_mut().arena.insert(NodeData::new(tag))
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut tree = self.inner.tree.borrow_mut();
        tree.node(parent)?;
        tree.node(child)?;
        if tree.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        tree.detach(child)?;
        tree.node_mut(child)?.parent = Some(parent);
        tree.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Convenience: create `tag`, append under `parent`, return it.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let child = self.create_element(tag);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Detach `id` from its parent. The subtree stays alive and can be re-attached.
    pub fn remove(&self, id: NodeId) -> Result<()> {
        let mut tree = self.inner.tree.borrow_mut();
        if id == tree.root || id == tree.body {
            return Err(DomError::ProtectedNode(id));
        }
        tree.detach(id)
    }

    /// Detach `id` and free its whole subtree; all ids into it go stale.
    pub fn destroy(&self, id: NodeId) -> Result<()> {
        let freed = {
            let mut tree = self.inner.tree.borrow_mut();
            if id == tree.root || id == tree.body {
                return Err(DomError::ProtectedNode(id));
            }
            tree.detach(id)?;
            let subtree = tree.subtree(id);
            for node in &subtree {
                tree.arena.remove(*node);
            }
            subtree
        };
        self.inner.listeners.borrow_mut().forget_nodes(&freed);
        #[cfg(feature = "tracing")]
        trace!(node = %id, freed = freed.len(), "destroyed subtree");
        Ok(())
    }

    /// Whether `id` names a live (not destroyed) node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.inner.tree.borrow().arena.get(id).is_some()
    }

    /// Whether `id` is attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.inner.tree.borrow().is_connected(id)
    }

    /// Inclusive containment (`node == ancestor` counts).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.tree.borrow().contains(ancestor, node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner
            .tree
            .borrow()
            .arena
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.inner
            .tree
            .borrow()
            .arena
            .get(id)
            .and_then(|n| n.children.last().copied())
    }

    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.inner.tree.borrow().arena.get(id).map(|n| n.tag.clone())
    }

    /// Number of live nodes, attached or not (root and body included).
    pub fn node_count(&self) -> usize {
        self.inner.tree.borrow().arena.len()
    }

    /// Lazy preorder walk over the descendants of `root` (excluding `root`).
    pub fn descendants(&self, root: NodeId) -> Descendants {
        Descendants {
            document: self.clone(),
            stack: self.children(root).into_iter().rev().collect(),
        }
    }

    /// First connected element whose `id` attribute equals `element_id`.
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        let root = self.root();
        self.descendants(root)
            .find(|node| self.attribute(*node, "id").as_deref() == Some(element_id))
    }

    // --- Attributes ---

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.inner
            .tree
            .borrow()
            .arena
            .get(id)
            .and_then(|n| n.attribute(name).map(str::to_owned))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.inner
            .tree
            .borrow()
            .arena
            .get(id)
            .is_some_and(|n| n.attribute(name).is_some())
    }

    /// All attributes in insertion order.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, String)> {
        self.inner
            .tree
            .borrow()
            .arena
            .get(id)
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let mut tree = self.inner.tree.borrow_mut();
        let node = tree.node_mut(id)?;
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => node.attributes.push((name.to_owned(), value.to_owned())),
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Result<Option<String>> {
        let mut tree = self.inner.tree.borrow_mut();
        let node = tree.node_mut(id)?;
        let position = node.attributes.iter().position(|(n, _)| n == name);
        Ok(position.map(|i| node.attributes.remove(i).1))
    }

    // --- Text ---

    pub fn set_text(&self, id: NodeId, text: &str) -> Result<()> {
        let mut tree = self.inner.tree.borrow_mut();
        let node = tree.node_mut(id)?;
        node.text.clear();
        node.text.push_str(text);
        Ok(())
    }

    /// Own text followed by all descendant text in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let tree = self.inner.tree.borrow();
        tree.subtree(id)
            .into_iter()
            .filter_map(|n| tree.arena.get(n).map(|d| d.text.clone()))
            .collect()
    }

    // --- Focus ---

    /// Currently focused element; `None` means focus rests on the body.
    pub fn active_element(&self) -> Option<NodeId> {
        let tree = self.inner.tree.borrow();
        tree.active.filter(|id| tree.is_connected(*id))
    }

    /// Move focus to `id`.
    ///
    /// Returns `false` without side effects when the node is stale, detached,
    /// or not focusable. Dispatches `focusout` on the previous element and
    /// `focusin` on `id`; listeners may move focus again.
    pub fn focus(&self, id: NodeId) -> bool {
        if !self.is_connected(id) || !tabbable::is_focusable(self, id) {
            #[cfg(feature = "tracing")]
            trace!(node = %id, "focus rejected");
            return false;
        }
        let previous = self.active_element();
        if previous == Some(id) {
            return true;
        }
        self.inner.tree.borrow_mut().active = Some(id);
        #[cfg(feature = "tracing")]
        trace!(node = %id, ?previous, "focus moved");
        if let Some(previous) = previous {
            self.dispatch(previous, EventKind::FocusOut { related: Some(id) });
        }
        self.dispatch(id, EventKind::FocusIn { related: previous });
        true
    }

    /// Drop focus back to the body.
    pub fn blur(&self) {
        let previous = self.inner.tree.borrow_mut().active.take();
        if let Some(previous) = previous.filter(|p| self.is_connected(*p)) {
            self.dispatch(previous, EventKind::FocusOut { related: None });
        }
    }

    /// Next (or previous) element in native sequential focus order, in
    /// document order, starting after `from`. `None` means focus would leave
    /// the document.
    pub fn sequential_focus_target(&self, from: Option<NodeId>, backwards: bool) -> Option<NodeId> {
        let all: Vec<NodeId> = self.descendants(self.root()).collect();
        let origin = from.and_then(|f| all.iter().position(|n| *n == f));
        let is_candidate = |node: &&NodeId| tabbable::is_tabbable(self, **node);
        match (origin, backwards) {
            (None, false) => all.iter().find(is_candidate).copied(),
            (None, true) => all.iter().rev().find(is_candidate).copied(),
            (Some(i), false) => all[i + 1..].iter().find(is_candidate).copied(),
            (Some(i), true) => all[..i].iter().rev().find(is_candidate).copied(),
        }
    }

    // --- Events ---

    /// Register a listener; it stays attached while the handle lives.
    pub fn add_listener(
        &self,
        target: EventTarget,
        event_type: EventType,
        callback: impl Fn(&mut Event) + 'static,
    ) -> ListenerHandle {
        let id = self
            .inner
            .listeners
            .borrow_mut()
            .add(target, event_type, Rc::new(callback));
        ListenerHandle::new(Rc::downgrade(&self.inner), id)
    }

    /// Number of registered listeners across all targets.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Dispatch `kind` at `target`, bubbling to the window, then run the
    /// default action unless a listener prevented it.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> DispatchOutcome {
        let event_type = kind.event_type();
        let mut path: Vec<EventTarget> = {
            let tree = self.inner.tree.borrow();
            let mut path = Vec::new();
            let mut cursor = tree.arena.get(target).map(|_| target);
            while let Some(id) = cursor {
                path.push(EventTarget::Node(id));
                cursor = tree.arena.get(id).and_then(|n| n.parent);
            }
            path
        };
        path.push(EventTarget::Window);

        let mut event = Event::new(kind, target);
        let mut delivered = 0;
        for current in path {
            let snapshot = self.inner.listeners.borrow().snapshot(current, event_type);
            for (id, callback) in snapshot {
                if !self.inner.listeners.borrow().is_registered(id) {
                    continue;
                }
                event.set_current_target(current);
                callback(&mut event);
                delivered += 1;
            }
            if event.propagation_stopped() {
                break;
            }
        }

        let outcome = DispatchOutcome {
            default_prevented: event.default_prevented(),
            propagation_stopped: event.propagation_stopped(),
            delivered,
        };
        if !outcome.default_prevented {
            self.run_default_action(&event);
        }
        outcome
    }

    fn run_default_action(&self, event: &Event) {
        if let Some(KeyEvent { key: Key::Tab, .. }) = event.key() {
            let backwards = event.key().is_some_and(KeyEvent::shift);
            match self.sequential_focus_target(self.active_element(), backwards) {
                Some(next) => {
                    self.focus(next);
                }
                None => self.blur(),
            }
        }
    }

    /// Primary-button click on `id`.
    pub fn click(&self, id: NodeId) -> DispatchOutcome {
        self.dispatch(id, EventKind::Click(MouseButton::Primary))
    }

    /// Keydown at the focused element (or body).
    pub fn key_down(&self, key: Key, modifiers: Modifiers) -> DispatchOutcome {
        let target = self.active_element().unwrap_or_else(|| self.body());
        self.dispatch(
            target,
            EventKind::KeyDown(KeyEvent::new(key).with_modifiers(modifiers)),
        )
    }

    // --- Microtasks ---

    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.inner.microtasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn pending_microtasks(&self) -> usize {
        self.inner.microtasks.borrow().len()
    }

    /// Drain the microtask queue; returns how many tasks ran.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.microtasks.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .field("active", &self.active_element())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Lazy preorder iterator; re-borrows the document on every step, so the
/// tree may be mutated between calls to `next`.
pub struct Descendants {
    document: Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let children = {
                let tree = self.document.inner.tree.borrow();
                match tree.arena.get(id) {
                    Some(node) => node.children.clone(),
                    None => continue,
                }
            };
            self.stack.extend(children.into_iter().rev());
            return Some(id);
        }
        None
    }
}
