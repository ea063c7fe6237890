#![forbid(unsafe_code)]

//! Focus Manager: initial focus, Tab trapping, focus restoration.
//!
//! # Invariants
//!
//! - Initial focus priority: explicit target, first `autofocus` descendant,
//!   first tabbable descendant, then the content root itself.
//!   Every candidate, the explicit one included, must lie inside the content
//!   root.
//! - While the trap is armed, sequential navigation never leaves the content
//!   root: Tab past the last entry wraps to the first, Shift+Tab before the
//!   first wraps to the last.
//! - The tabbable set is recomputed on every trap check; nothing is cached.
//!
//! # Failure Modes
//!
//! - No focusable target at all: focus is left where it was and the caller
//!   records `FocusTargetUnavailable`. Nothing panics or returns an error.
//! - Restore targets that were detached or destroyed while the dialog was
//!   open are skipped silently.

use scrim_dom::{
    Document, Event, EventTarget, EventType, Key, ListenerHandle, NodeId, TabbableSet,
    is_focusable,
};
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticLog, FocusPhase};
use crate::props::FocusTarget;

/// Marker attribute requesting initial focus.
pub const AUTOFOCUS: &str = "autofocus";

/// Result of the deferred initial-focus step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialFocus {
    /// Active element just before the move.
    pub previously_focused: Option<NodeId>,
    /// Element that received focus, if any did.
    pub focused: Option<NodeId>,
}

/// Pick the initial focus target inside `content` without moving focus.
pub fn initial_focus_target(
    doc: &Document,
    content: NodeId,
    initial: Option<&FocusTarget>,
) -> Option<NodeId> {
    let focusable = |node: &NodeId| doc.contains(content, *node) && is_focusable(doc, *node);

    if let Some(explicit) = initial.and_then(|target| target.resolve(doc)) {
        if focusable(&explicit) {
            return Some(explicit);
        }
        trace!(target = %explicit, "initial focus target outside content or not focusable");
    }
    doc.descendants(content)
        .filter(|node| doc.has_attribute(*node, AUTOFOCUS))
        .find(focusable)
        .or_else(|| TabbableSet::new(doc, content).first())
        .or_else(|| is_focusable(doc, content).then_some(content))
}

/// Record the active element, then move focus into `content`.
///
/// Must run after the render commit; on a detached `content` every
/// candidate is rejected and focus stays put.
pub fn capture_and_move_initial_focus(
    doc: &Document,
    content: NodeId,
    initial: Option<&FocusTarget>,
    diagnostics: &DiagnosticLog,
) -> InitialFocus {
    let previously_focused = doc.active_element();
    let focused = initial_focus_target(doc, content, initial).filter(|target| doc.focus(*target));
    match focused {
        Some(target) => debug!(target = %target, ?previously_focused, "initial focus moved"),
        None => diagnostics.record(Diagnostic::FocusTargetUnavailable {
            phase: FocusPhase::Initial,
        }),
    }
    InitialFocus {
        previously_focused,
        focused,
    }
}

/// Keep Tab / Shift+Tab inside `content`.
///
/// Returns `true` when the event's default was cancelled and focus wrapped.
pub fn trap_keydown(
    doc: &Document,
    content: NodeId,
    event: &mut Event,
    diagnostics: &DiagnosticLog,
) -> bool {
    let Some(key) = event.key() else {
        return false;
    };
    if key.key != Key::Tab || event.default_prevented() {
        return false;
    }
    let backwards = key.shift();

    let native = doc.sequential_focus_target(doc.active_element(), backwards);
    if native.is_some_and(|next| doc.contains(content, next)) {
        return false;
    }

    event.prevent_default();
    let tabbables = TabbableSet::new(doc, content);
    let wrap = if backwards {
        tabbables.last()
    } else {
        tabbables.first()
    }
    .or_else(|| is_focusable(doc, content).then_some(content));

    match wrap {
        Some(target) => {
            trace!(target = %target, backwards, "focus trap wrapped");
            doc.focus(target);
        }
        None => diagnostics.record(Diagnostic::FocusTargetUnavailable {
            phase: FocusPhase::Trap,
        }),
    }
    true
}

/// Move focus back out of the dialog on close.
///
/// Returns the element that received focus.
pub fn restore_focus(
    doc: &Document,
    return_target: Option<&FocusTarget>,
    previously_focused: Option<NodeId>,
) -> Option<NodeId> {
    let usable = |node: NodeId| doc.is_connected(node) && is_focusable(doc, node);
    let target = return_target
        .and_then(|target| target.resolve(doc))
        .filter(|node| usable(*node))
        .or_else(|| previously_focused.filter(|node| usable(*node)))?;
    if doc.focus(target) {
        debug!(target = %target, "focus restored");
        Some(target)
    } else {
        None
    }
}

/// Armed focus trap for one session: a Tab keydown listener and, when
/// `contain_focus` is on, a focusin guard. Both detach on drop.
#[must_use = "dropping a FocusTrap disarms it"]
pub struct FocusTrap {
    _keydown: ListenerHandle,
    _guard: Option<ListenerHandle>,
}

impl FocusTrap {
    pub fn arm(
        doc: &Document,
        content: NodeId,
        contain_focus: bool,
        diagnostics: &DiagnosticLog,
    ) -> Self {
        let weak = doc.downgrade();
        let log = diagnostics.clone();
        let keydown = doc.add_listener(EventTarget::Window, EventType::KeyDown, move |event| {
            if let Some(doc) = weak.upgrade() {
                trap_keydown(&doc, content, event, &log);
            }
        });

        let guard = contain_focus.then(|| {
            let weak = doc.downgrade();
            doc.add_listener(EventTarget::Window, EventType::FocusIn, move |event| {
                let Some(doc) = weak.upgrade() else {
                    return;
                };
                if !doc.is_connected(content) || doc.contains(content, event.target()) {
                    return;
                }
                let redirect = TabbableSet::new(&doc, content)
                    .first()
                    .or_else(|| is_focusable(&doc, content).then_some(content));
                if let Some(target) = redirect {
                    trace!(escaped = %event.target(), target = %target, "focus contained");
                    doc.focus(target);
                }
            })
        });

        Self {
            _keydown: keydown,
            _guard: guard,
        }
    }
}

impl std::fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTrap")
            .field("guarded", &self._guard.is_some())
            .finish()
    }
}
