#![forbid(unsafe_code)]

//! Portal Mount: an owned rendering root appended to `<body>`.
//!
//! # Invariants
//!
//! - A portal is always appended as the last child of the body, so later
//!   portals follow earlier ones in paint order.
//! - A portal node is never reused; each mount creates a fresh element.
//! - The node is destroyed exactly once, on [`Portal::unmount`] or drop.

use scrim_dom::{Document, NodeId, Result, WeakDocument};
use tracing::{debug, trace};

use crate::session::SessionId;

#[must_use = "dropping a Portal removes it from the document"]
pub struct Portal {
    document: WeakDocument,
    node: NodeId,
    mounted: bool,
}

impl Portal {
    /// Create the portal node, tag it with `marker` (valued with the session
    /// id) and append it to the body.
    pub fn mount(doc: &Document, marker: &str, session: SessionId) -> Result<Self> {
        let node = doc.create_element("div");
        doc.set_attribute(node, marker, &session.to_string())?;
        doc.append_child(doc.body(), node)?;
        debug!(session = %session, portal = %node, "portal mounted");
        Ok(Self {
            document: doc.downgrade(),
            node,
            mounted: true,
        })
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Remove and destroy the portal with everything rendered into it.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        let Some(doc) = self.document.upgrade() else {
            return;
        };
        match doc.destroy(self.node) {
            Ok(()) => debug!(portal = %self.node, "portal unmounted"),
            // The host already tore it down.
            Err(err) => trace!(portal = %self.node, %err, "portal already gone"),
        }
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("node", &self.node)
            .field("mounted", &self.mounted)
            .finish()
    }
}
