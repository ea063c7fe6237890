#![forbid(unsafe_code)]

//! Per-open state.
//!
//! A [`DialogSession`] is created on every `Closed -> Open` transition and
//! dropped on the matching `Open -> Closed`. Every resource it holds
//! (portal, isolation, listeners) is RAII, so dropping a session in any state
//! releases everything it acquired.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use scrim_a11y::{SiblingIsolation, SiblingRecord};
use scrim_dom::NodeId;

use crate::dismiss::DismissListeners;
use crate::focus::FocusTrap;
use crate::portal::Portal;
use crate::props::FocusTarget;
use crate::render::RenderedDialog;

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct DialogSession {
    pub(crate) id: SessionId,
    pub(crate) portal: Portal,
    pub(crate) rendered: RenderedDialog,
    pub(crate) previously_focused: Option<NodeId>,
    pub(crate) initial_focus: Option<FocusTarget>,
    pub(crate) return_focus: Option<FocusTarget>,
    pub(crate) isolation: Option<SiblingIsolation>,
    pub(crate) dismiss: Option<DismissListeners>,
    pub(crate) focus_trap: Option<FocusTrap>,
    /// Initial focus has run and the trap is armed.
    pub(crate) settled: bool,
}

impl DialogSession {
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            portal: self.portal.node(),
            overlay: self.rendered.overlay,
            content: self.rendered.content,
            previously_focused: self.previously_focused,
            sibling_records: self
                .isolation
                .as_ref()
                .map(|isolation| isolation.records().to_vec())
                .unwrap_or_default(),
            settled: self.settled,
        }
    }
}

impl fmt::Debug for DialogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSession")
            .field("id", &self.id)
            .field("portal", &self.portal)
            .field("rendered", &self.rendered)
            .field("previously_focused", &self.previously_focused)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a session for hooks and attribute binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub portal: NodeId,
    pub overlay: NodeId,
    pub content: NodeId,
    /// Element focused when initial focus ran; `None` before that or if
    /// focus rested on the body.
    pub previously_focused: Option<NodeId>,
    /// Empty unless legacy modal mode is on.
    pub sibling_records: Vec<SiblingRecord>,
    /// Whether the deferred initial-focus step has completed.
    pub settled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_and_increasing() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert!(b > a);
        assert_eq!(a.to_string(), a.id().to_string());
    }
}
