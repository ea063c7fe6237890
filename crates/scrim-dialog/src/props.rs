#![forbid(unsafe_code)]

//! Host inputs for one dialog.

use std::fmt;
use std::rc::Rc;

use scrim_a11y::DialogLabel;
use scrim_dom::{Document, NodeId};
use scrim_runtime::Observable;

use crate::session::SessionSnapshot;

/// Called when the user asks to dismiss the dialog (Escape, overlay click).
pub type DismissCallback = Rc<dyn Fn()>;

/// Called after a transition completes, with the session it concerned.
pub type LifecycleHook = Rc<dyn Fn(&SessionSnapshot)>;

/// Element the host wants focused on open or close.
///
/// `Id` is resolved when it is needed, so it may name an element the
/// renderer has not created yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    Node(NodeId),
    Id(String),
}

impl FocusTarget {
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        match self {
            Self::Node(id) => doc.is_alive(*id).then_some(*id),
            Self::Id(element_id) => doc.element_by_id(element_id),
        }
    }
}

impl From<NodeId> for FocusTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for FocusTarget {
    fn from(element_id: &str) -> Self {
        Self::Id(element_id.to_owned())
    }
}

impl From<String> for FocusTarget {
    fn from(element_id: String) -> Self {
        Self::Id(element_id)
    }
}

/// Everything the host supplies to a [`Dialog`](crate::Dialog).
///
/// The host owns `is_open`; the engine only observes it.
#[derive(Clone)]
pub struct DialogProps {
    pub(crate) is_open: Observable<bool>,
    pub(crate) on_dismiss: Option<DismissCallback>,
    pub(crate) initial_focus: Option<FocusTarget>,
    pub(crate) return_focus: Option<FocusTarget>,
    pub(crate) aria_modal_legacy: bool,
    pub(crate) label: Option<DialogLabel>,
    pub(crate) overlay_attributes: Vec<(String, String)>,
    pub(crate) on_open: Option<LifecycleHook>,
    pub(crate) on_close: Option<LifecycleHook>,
}

impl DialogProps {
    pub fn new(is_open: Observable<bool>) -> Self {
        Self {
            is_open,
            on_dismiss: None,
            initial_focus: None,
            return_focus: None,
            aria_modal_legacy: false,
            label: None,
            overlay_attributes: Vec::new(),
            on_open: None,
            on_close: None,
        }
    }

    pub fn on_dismiss(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_dismiss = Some(Rc::new(callback));
        self
    }

    pub fn initial_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.initial_focus = Some(target.into());
        self
    }

    pub fn return_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.return_focus = Some(target.into());
        self
    }

    /// Hide siblings of the portal from assistive technology while open.
    pub fn aria_modal_legacy(mut self, legacy: bool) -> Self {
        self.aria_modal_legacy = legacy;
        self
    }

    /// Name the dialog with `aria-label`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(DialogLabel::Label(label.into()));
        self
    }

    /// Name the dialog with `aria-labelledby`.
    pub fn labelled_by(mut self, element_id: impl Into<String>) -> Self {
        self.label = Some(DialogLabel::LabelledBy(element_id.into()));
        self
    }

    /// Pass-through attribute written on the overlay root after render.
    pub fn overlay_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overlay_attributes.push((name.into(), value.into()));
        self
    }

    pub fn on_open(mut self, hook: impl Fn(&SessionSnapshot) + 'static) -> Self {
        self.on_open = Some(Rc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn(&SessionSnapshot) + 'static) -> Self {
        self.on_close = Some(Rc::new(hook));
        self
    }

    /// The open signal this dialog follows.
    pub fn is_open(&self) -> &Observable<bool> {
        &self.is_open
    }
}

impl fmt::Debug for DialogProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogProps")
            .field("is_open", &self.is_open.get())
            .field("on_dismiss", &self.on_dismiss.is_some())
            .field("initial_focus", &self.initial_focus)
            .field("return_focus", &self.return_focus)
            .field("aria_modal_legacy", &self.aria_modal_legacy)
            .field("label", &self.label)
            .field("overlay_attributes", &self.overlay_attributes)
            .finish()
    }
}
