#![forbid(unsafe_code)]

//! Legacy modal mode: hide the dialog's background from assistive technology.
//!
//! On platforms without reliable `aria-modal` support, every top-level
//! sibling of the portal is marked `aria-hidden="true"` and `inert` while the
//! dialog is open.
//!
//! # Invariants
//!
//! 1. An attribute is removed on restore only if this isolation added it.
//! 2. Attributes present before isolation are never changed, in either direction.
//! 3. Diagnostic markers (`data-keep-hidden`, `data-keep-inert`) flag
//!    pre-existing attributes while isolated and are always cleared on restore.
//! 4. Restoration happens exactly once per isolation: explicitly through
//!    [`SiblingIsolation::restore`], or on drop.
//!
//! # Failure Modes
//!
//! - A sibling destroyed by the host while isolated is skipped on restore.
//! - A portal with no parent has no siblings; isolation is empty.

use bitflags::bitflags;
use scrim_dom::{Document, NodeId, WeakDocument};
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::aria::{ARIA_HIDDEN, INERT, KEEP_HIDDEN_MARKER, KEEP_INERT_MARKER};

const MARKER_VALUE: &str = "true";

bitflags! {
    /// Isolation attributes written on a sibling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IsolationAttrs: u8 {
        const ARIA_HIDDEN = 0b01;
        const INERT       = 0b10;
    }
}

/// What isolation found on, and did to, one sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingRecord {
    pub element: NodeId,
    pub had_aria_hidden: bool,
    pub had_inert: bool,
    applied: IsolationAttrs,
}

impl SiblingRecord {
    /// Attributes this isolation wrote and must remove.
    #[inline]
    pub fn applied(&self) -> IsolationAttrs {
        self.applied
    }

    /// Whether the engine changed this sibling at all.
    #[inline]
    pub fn engine_applied(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Whether the sibling carried an isolation attribute beforehand.
    #[inline]
    pub fn had_conflict(&self) -> bool {
        self.had_aria_hidden || self.had_inert
    }
}

/// Counts from a completed restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsolationReport {
    /// Siblings whose engine-applied attributes were removed.
    pub restored: usize,
    /// Siblings left untouched because nothing was applied to them.
    pub preserved: usize,
    /// Siblings that no longer exist.
    pub vanished: usize,
}

/// Active isolation of a portal's siblings.
#[must_use = "dropping a SiblingIsolation restores the siblings immediately"]
pub struct SiblingIsolation {
    document: WeakDocument,
    portal: NodeId,
    records: Vec<SiblingRecord>,
    markers: bool,
    released: bool,
}

impl SiblingIsolation {
    /// Isolate every sibling of `portal` under its mount point.
    ///
    /// With `markers` set, pre-existing attributes are flagged with the
    /// diagnostic markers for test observability.
    pub fn isolate(doc: &Document, portal: NodeId, markers: bool) -> Self {
        let siblings: Vec<NodeId> = doc
            .parent(portal)
            .map(|mount| doc.children(mount))
            .unwrap_or_default()
            .into_iter()
            .filter(|sibling| !doc.contains(portal, *sibling))
            .collect();

        let records: Vec<SiblingRecord> = siblings
            .into_iter()
            .map(|element| isolate_one(doc, element, markers))
            .collect();

        #[cfg(feature = "tracing")]
        debug!(
            portal = %portal,
            siblings = records.len(),
            conflicts = records.iter().filter(|r| r.had_conflict()).count(),
            "isolated portal siblings"
        );

        Self {
            document: doc.downgrade(),
            portal,
            records,
            markers,
            released: false,
        }
    }

    #[inline]
    pub fn portal(&self) -> NodeId {
        self.portal
    }

    /// One record per sibling, in document order.
    pub fn records(&self) -> &[SiblingRecord] {
        &self.records
    }

    #[inline]
    pub fn markers_enabled(&self) -> bool {
        self.markers
    }

    /// Undo this isolation now.
    pub fn restore(mut self) -> IsolationReport {
        self.release()
    }

    fn release(&mut self) -> IsolationReport {
        let mut report = IsolationReport::default();
        if self.released {
            return report;
        }
        self.released = true;
        let Some(doc) = self.document.upgrade() else {
            return report;
        };

        for record in &self.records {
            if !doc.is_alive(record.element) {
                report.vanished += 1;
                continue;
            }
            let mut removals: Vec<&str> = vec![KEEP_HIDDEN_MARKER, KEEP_INERT_MARKER];
            if record.applied.contains(IsolationAttrs::ARIA_HIDDEN) {
                removals.push(ARIA_HIDDEN);
            }
            if record.applied.contains(IsolationAttrs::INERT) {
                removals.push(INERT);
            }
            for name in removals {
                if let Err(_err) = doc.remove_attribute(record.element, name) {
                    #[cfg(feature = "tracing")]
                    warn!(element = %record.element, attribute = name, err = %_err, "restore failed");
                }
            }
            if record.engine_applied() {
                report.restored += 1;
            } else {
                report.preserved += 1;
            }
        }

        #[cfg(feature = "tracing")]
        debug!(
            portal = %self.portal,
            restored = report.restored,
            preserved = report.preserved,
            vanished = report.vanished,
            "restored portal siblings"
        );
        report
    }
}

impl Drop for SiblingIsolation {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SiblingIsolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiblingIsolation")
            .field("portal", &self.portal)
            .field("records", &self.records)
            .field("released", &self.released)
            .finish()
    }
}

fn isolate_one(doc: &Document, element: NodeId, markers: bool) -> SiblingRecord {
    let had_aria_hidden = doc.has_attribute(element, ARIA_HIDDEN);
    let had_inert = doc.has_attribute(element, INERT);
    let mut applied = IsolationAttrs::empty();

    let plan = [
        (had_aria_hidden, ARIA_HIDDEN, IsolationAttrs::ARIA_HIDDEN, KEEP_HIDDEN_MARKER),
        (had_inert, INERT, IsolationAttrs::INERT, KEEP_INERT_MARKER),
    ];
    for (present, name, flag, marker) in plan {
        let (attribute, value) = if present {
            if !markers {
                continue;
            }
            (marker, MARKER_VALUE)
        } else {
            (name, "true")
        };
        match doc.set_attribute(element, attribute, value) {
            Ok(()) if !present => applied |= flag,
            Ok(()) => {}
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(element = %element, attribute, err = %_err, "isolation skipped");
            }
        }
    }

    SiblingRecord {
        element,
        had_aria_hidden,
        had_inert,
        applied,
    }
}
