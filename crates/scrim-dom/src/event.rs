#![forbid(unsafe_code)]

//! Event types delivered through [`crate::Document::dispatch`].
//!
//! Dispatch is bubble-only: the event visits the target, each ancestor up to
//! the document root, and finally [`EventTarget::Window`]. Listeners may stop
//! propagation (the current target's remaining listeners still run) or cancel
//! the default action.

use crate::node::NodeId;
use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Logical key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Enter,
    /// A printable character.
    Character(char),
    /// Any other named key (`"ArrowDown"`, `"F5"`, ...).
    Named(String),
}

/// A keydown payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    /// Attach modifier state.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Pointer button that produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    KeyDown(KeyEvent),
    Click(MouseButton),
    /// Focus arrived at the target; `related` lost it.
    FocusIn { related: Option<NodeId> },
    /// Focus left the target; `related` is gaining it.
    FocusOut { related: Option<NodeId> },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::KeyDown(_) => EventType::KeyDown,
            Self::Click(_) => EventType::Click,
            Self::FocusIn { .. } => EventType::FocusIn,
            Self::FocusOut { .. } => EventType::FocusOut,
        }
    }
}

/// Listener registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    Click,
    FocusIn,
    FocusOut,
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    /// Global object above the document root; every bubbling event reaches it.
    Window,
}

/// An event in flight.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    current_target: EventTarget,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    pub(crate) fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: EventTarget::Node(target),
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Node the event was dispatched at.
    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Target whose listener is currently running.
    #[inline]
    pub fn current_target(&self) -> EventTarget {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, target: EventTarget) {
        self.current_target = target;
    }

    /// Stop bubbling past the current target.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Cancel the default action (native Tab navigation for keydown).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[inline]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    #[inline]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Key payload, if this is a keydown.
    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.kind {
            EventKind::KeyDown(key) => Some(key),
            _ => None,
        }
    }
}

/// Summary of a completed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// Number of listeners invoked.
    pub delivered: usize,
}
