#![forbid(unsafe_code)]

//! ARIA attribute names and dialog content bindings.

use scrim_dom::{Document, NodeId, Result};

pub const ROLE: &str = "role";
pub const ARIA_MODAL: &str = "aria-modal";
pub const ARIA_LABEL: &str = "aria-label";
pub const ARIA_LABELLEDBY: &str = "aria-labelledby";
pub const ARIA_HIDDEN: &str = "aria-hidden";
pub const INERT: &str = "inert";
pub const TABINDEX: &str = "tabindex";

/// Diagnostic marker: the sibling already had `aria-hidden` when isolated.
pub const KEEP_HIDDEN_MARKER: &str = "data-keep-hidden";
/// Diagnostic marker: the sibling already had `inert` when isolated.
pub const KEEP_INERT_MARKER: &str = "data-keep-inert";

/// Accessible name source for the dialog content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogLabel {
    /// Literal name (`aria-label`).
    Label(String),
    /// Id of the element that names the dialog (`aria-labelledby`).
    LabelledBy(String),
}

impl DialogLabel {
    /// Attribute name and value to write on the content root.
    pub fn attribute(&self) -> (&'static str, &str) {
        match self {
            Self::Label(text) => (ARIA_LABEL, text),
            Self::LabelledBy(id) => (ARIA_LABELLEDBY, id),
        }
    }
}

/// Attribute set bound onto the dialog content root.
///
/// Invariants:
/// - `role="dialog"` and `aria-modal="true"` are always present.
/// - `tabindex="-1"` keeps the root programmatically focusable so it can act
///   as the fallback focus target without joining the tab order.
/// - At most one of `aria-label` / `aria-labelledby` is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogAria {
    label: Option<DialogLabel>,
}

impl DialogAria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, label: Option<DialogLabel>) -> Self {
        self.label = label;
        self
    }

    pub fn content_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            (ROLE, "dialog".to_owned()),
            (ARIA_MODAL, "true".to_owned()),
            (TABINDEX, "-1".to_owned()),
        ];
        if let Some(label) = &self.label {
            let (name, value) = label.attribute();
            attrs.push((name, value.to_owned()));
        }
        attrs
    }

    /// Write the bindings onto `content`, replacing a stale opposite label.
    pub fn apply(&self, doc: &Document, content: NodeId) -> Result<()> {
        match &self.label {
            Some(DialogLabel::Label(_)) => {
                doc.remove_attribute(content, ARIA_LABELLEDBY)?;
            }
            Some(DialogLabel::LabelledBy(_)) => {
                doc.remove_attribute(content, ARIA_LABEL)?;
            }
            None => {}
        }
        for (name, value) in self.content_attributes() {
            doc.set_attribute(content, name, &value)?;
        }
        Ok(())
    }
}
