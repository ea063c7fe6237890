#![forbid(unsafe_code)]

//! Degraded-path reporting.
//!
//! The engine never returns errors to the host. Conditions worth knowing
//! about are recorded here and logged instead.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use scrim_dom::{DomError, NodeId};
use tracing::{debug, warn};

/// Which focus operation found no usable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusPhase {
    Initial,
    Trap,
    Restore,
}

impl fmt::Display for FocusPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial focus",
            Self::Trap => "focus trap",
            Self::Restore => "focus restore",
        })
    }
}

/// A degraded but handled condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("no focus target available during {phase}")]
    FocusTargetUnavailable { phase: FocusPhase },

    #[error("sibling {element} already carried `{attribute}`; left untouched")]
    SiblingAttributeConflict {
        element: NodeId,
        attribute: &'static str,
    },

    #[error("open signal changed to {requested_open} mid-transition; queued")]
    DoubleTransition { requested_open: bool },

    #[error("dialog render failed: {error}")]
    RenderFailed { error: DomError },
}

impl Diagnostic {
    /// Whether this entry indicates host-visible breakage rather than
    /// expected bookkeeping.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RenderFailed { .. })
    }
}

/// Entries kept by a [`DiagnosticLog`] unless configured otherwise.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 64;

/// Shared, bounded diagnostic record for one dialog.
///
/// Holds at most `capacity` entries; recording past that evicts the oldest
/// entry and bumps [`dropped`](Self::dropped). Clones share the same log.
#[derive(Clone)]
pub struct DiagnosticLog {
    inner: Rc<RefCell<Ring>>,
}

struct Ring {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    dropped: u64,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that keeps the newest `capacity` entries. Zero keeps none; every
    /// diagnostic is still logged.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Ring {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_DIAGNOSTIC_CAPACITY)),
                capacity,
                dropped: 0,
            })),
        }
    }

    pub fn record(&self, diagnostic: Diagnostic) {
        if diagnostic.is_failure() {
            warn!(%diagnostic, "dialog diagnostic");
        } else {
            debug!(%diagnostic, "dialog diagnostic");
        }
        let mut ring = self.inner.borrow_mut();
        if ring.capacity == 0 {
            ring.dropped += 1;
            return;
        }
        if ring.entries.len() == ring.capacity {
            ring.entries.pop_front();
            ring.dropped += 1;
        }
        ring.entries.push_back(diagnostic);
    }

    /// Copy of every retained entry, oldest first.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.inner.borrow().entries.iter().cloned().collect()
    }

    pub fn count(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|d| predicate(*d))
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Entries evicted (or never retained) since creation or the last clear.
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }

    pub fn clear(&self) {
        let mut ring = self.inner.borrow_mut();
        ring.entries.clear();
        ring.dropped = 0;
    }
}

impl fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.inner.borrow();
        f.debug_struct("DiagnosticLog")
            .field("entries", &ring.entries)
            .field("capacity", &ring.capacity)
            .field("dropped", &ring.dropped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let log = DiagnosticLog::new();
        let view = log.clone();
        log.record(Diagnostic::DoubleTransition {
            requested_open: false,
        });
        assert_eq!(view.len(), 1);
        view.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn display_names_the_phase() {
        let d = Diagnostic::FocusTargetUnavailable {
            phase: FocusPhase::Restore,
        };
        assert_eq!(d.to_string(), "no focus target available during focus restore");
        assert!(!d.is_failure());
    }

    #[test]
    fn count_filters() {
        let doc = scrim_dom::Document::new();
        let log = DiagnosticLog::new();
        log.record(Diagnostic::RenderFailed {
            error: DomError::ProtectedNode(doc.body()),
        });
        log.record(Diagnostic::DoubleTransition {
            requested_open: true,
        });
        assert_eq!(log.count(Diagnostic::is_failure), 1);
    }

    #[test]
    fn full_log_evicts_oldest() {
        let log = DiagnosticLog::with_capacity(3);
        for i in 0..10 {
            log.record(Diagnostic::DoubleTransition {
                requested_open: i % 2 == 0,
            });
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped(), 7);
        // 7, 8, 9 survive.
        assert_eq!(
            log.entries(),
            vec![
                Diagnostic::DoubleTransition { requested_open: false },
                Diagnostic::DoubleTransition { requested_open: true },
                Diagnostic::DoubleTransition { requested_open: false },
            ]
        );
        log.clear();
        assert_eq!(log.dropped(), 0);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let log = DiagnosticLog::with_capacity(0);
        log.record(Diagnostic::DoubleTransition {
            requested_open: true,
        });
        assert!(log.is_empty());
        assert_eq!(log.dropped(), 1);
    }
}
