#![forbid(unsafe_code)]

//! Seam between the engine and whatever produces dialog markup.

use scrim_dom::{Document, DomError, NodeId, Result};

/// Nodes the renderer built under the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderedDialog {
    /// Backdrop layer; clicks on it dismiss. Receives pass-through attributes.
    pub overlay: NodeId,
    /// Content root; receives the dialog ARIA attributes and is the trap boundary.
    pub content: NodeId,
}

impl RenderedDialog {
    /// Minimal `<div overlay><div content/></div>` under `portal`.
    pub fn scaffold(doc: &Document, portal: NodeId) -> Result<Self> {
        let overlay = doc.append_element(portal, "div")?;
        let content = doc.append_element(overlay, "div")?;
        Ok(Self { overlay, content })
    }

    /// Both roots must live inside the portal they were rendered into, and the
    /// content root must sit strictly below the overlay so content clicks are
    /// stopped before the overlay sees them.
    pub(crate) fn validate(&self, doc: &Document, portal: NodeId) -> Result<()> {
        for node in [self.overlay, self.content] {
            if !doc.is_alive(node) {
                return Err(DomError::StaleNode(node));
            }
            if !doc.contains(portal, node) {
                return Err(DomError::HierarchyRequest {
                    parent: portal,
                    child: node,
                });
            }
        }
        if self.overlay == self.content || !doc.contains(self.overlay, self.content) {
            return Err(DomError::HierarchyRequest {
                parent: self.overlay,
                child: self.content,
            });
        }
        Ok(())
    }
}

/// Renders dialog content into a freshly mounted portal.
///
/// Called once per session, synchronously, before any engine attribute
/// binding. The engine treats the next [`Document::run_microtasks`] as the
/// render commit.
pub trait DialogRenderer {
    fn render(&mut self, doc: &Document, portal: NodeId) -> Result<RenderedDialog>;
}

impl<F> DialogRenderer for F
where
    F: FnMut(&Document, NodeId) -> Result<RenderedDialog>,
{
    fn render(&mut self, doc: &Document, portal: NodeId) -> Result<RenderedDialog> {
        self(doc, portal)
    }
}
