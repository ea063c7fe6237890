#![forbid(unsafe_code)]

//! Dialog Lifecycle State Machine.
//!
//! A [`Dialog`] follows the host's `is_open` signal and sequences the
//! managers on every transition:
//!
//! - `Closed -> Open`: allocate session, mount portal, render, bind ARIA and
//!   overlay attributes, isolate siblings (legacy mode), attach dismissal,
//!   then defer initial focus and trap arming to the next microtask.
//! - `Open -> Closed`: disarm trap, restore focus, detach dismissal, restore
//!   siblings, unmount portal, release session.
//!
//! # Invariants
//!
//! 1. The portal exists iff the state is `Open`.
//! 2. At most one session exists per dialog.
//! 3. Signal changes that arrive while a transition is running, or while the
//!    deferred initial focus is pending, are queued and applied in arrival
//!    order once the dialog settles. None are dropped.
//! 4. No internal borrow is held while host code runs (renderer excepted,
//!    which has exclusive use of the renderer slot), so hooks and dismissal
//!    callbacks may flip the signal re-entrantly.
//!
//! # Failure Modes
//!
//! - Renderer error: the half-built session is torn down, the dialog stays
//!   `Closed`, and `RenderFailed` is recorded.
//! - Dropping an open dialog runs the full close sequence.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use scrim_a11y::aria::{ARIA_HIDDEN, INERT};
use scrim_a11y::{DialogAria, SiblingIsolation};
use scrim_dom::{Document, Result};
use scrim_runtime::BindingScope;
use tracing::{debug, debug_span, trace};

use crate::config::DialogConfig;
use crate::diagnostics::{Diagnostic, DiagnosticLog, FocusPhase};
use crate::dismiss::DismissListeners;
use crate::focus::{self, FocusTrap};
use crate::portal::Portal;
use crate::props::DialogProps;
use crate::render::DialogRenderer;
use crate::session::{DialogSession, SessionId, SessionSnapshot};

/// Dialog state as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Closed,
    Open,
}

struct DialogShared {
    document: Document,
    config: DialogConfig,
    props: DialogProps,
    renderer: RefCell<Box<dyn DialogRenderer>>,
    session: RefCell<Option<DialogSession>>,
    diagnostics: DiagnosticLog,
    queued: RefCell<VecDeque<bool>>,
    /// A transition is executing synchronously.
    busy: Cell<bool>,
    /// The owning `Dialog` is being dropped; ignore further signals.
    disposed: Cell<bool>,
}

impl DialogShared {
    fn state(&self) -> LifecycleState {
        if self.session.borrow().is_some() {
            LifecycleState::Open
        } else {
            LifecycleState::Closed
        }
    }

    /// Open, with the deferred initial-focus step still outstanding.
    fn awaiting_commit(&self) -> bool {
        self.session
            .borrow()
            .as_ref()
            .is_some_and(|session| !session.settled)
    }

    fn on_signal(this: &Rc<Self>, open: bool) {
        if this.disposed.get() {
            return;
        }
        if this.busy.get() || this.awaiting_commit() {
            this.diagnostics.record(Diagnostic::DoubleTransition {
                requested_open: open,
            });
            this.queued.borrow_mut().push_back(open);
            return;
        }
        Self::apply(this, open);
        Self::drain(this);
    }

    fn apply(this: &Rc<Self>, open: bool) {
        match (this.state(), open) {
            (LifecycleState::Closed, true) => Self::open(this),
            (LifecycleState::Open, false) => Self::close(this),
            (state, _) => trace!(?state, open, "signal already satisfied"),
        }
    }

    fn drain(this: &Rc<Self>) {
        loop {
            if this.disposed.get() || this.busy.get() || this.awaiting_commit() {
                return;
            }
            let Some(open) = this.queued.borrow_mut().pop_front() else {
                return;
            };
            Self::apply(this, open);
        }
    }

    fn open(this: &Rc<Self>) {
        let span = debug_span!("dialog_transition", to = "open");
        let _enter = span.enter();

        this.busy.set(true);
        let opened = Self::build_session(this);
        this.busy.set(false);

        match opened {
            Ok(snapshot) => {
                if let Some(hook) = this.props.on_open.clone() {
                    hook(&snapshot);
                }
            }
            Err(error) => this.diagnostics.record(Diagnostic::RenderFailed { error }),
        }
    }

    fn build_session(this: &Rc<Self>) -> Result<SessionSnapshot> {
        let doc = &this.document;
        let id = SessionId::new();
        let portal = Portal::mount(doc, &this.config.portal_attribute, id)?;

        let rendered = this.renderer.borrow_mut().render(doc, portal.node())?;
        rendered.validate(doc, portal.node())?;

        DialogAria::new()
            .label(this.props.label.clone())
            .apply(doc, rendered.content)?;
        for (name, value) in &this.props.overlay_attributes {
            doc.set_attribute(rendered.overlay, name, value)?;
        }

        let isolation = this.props.aria_modal_legacy.then(|| {
            let isolation =
                SiblingIsolation::isolate(doc, portal.node(), this.config.diagnostic_markers);
            for record in isolation.records() {
                let conflicts = [
                    (record.had_aria_hidden, ARIA_HIDDEN),
                    (record.had_inert, INERT),
                ];
                for (_, attribute) in conflicts.into_iter().filter(|(had, _)| *had) {
                    this.diagnostics.record(Diagnostic::SiblingAttributeConflict {
                        element: record.element,
                        attribute,
                    });
                }
            }
            isolation
        });

        let dismiss = DismissListeners::attach(
            doc,
            rendered,
            &this.config,
            this.props.on_dismiss.clone(),
            id,
        );

        let session = DialogSession {
            id,
            portal,
            rendered,
            previously_focused: None,
            initial_focus: this.props.initial_focus.clone(),
            return_focus: this.props.return_focus.clone(),
            isolation,
            dismiss: Some(dismiss),
            focus_trap: None,
            settled: false,
        };
        let snapshot = session.snapshot();
        *this.session.borrow_mut() = Some(session);

        let weak = Rc::downgrade(this);
        doc.queue_microtask(move || {
            if let Some(shared) = weak.upgrade() {
                Self::settle(&shared, id);
            }
        });

        debug!(
            session = %id,
            portal = %snapshot.portal,
            content = %snapshot.content,
            legacy = this.props.aria_modal_legacy,
            "dialog opened"
        );
        Ok(snapshot)
    }

    /// Deferred half of the open transition: runs after the render commit.
    fn settle(this: &Rc<Self>, id: SessionId) {
        let (content, initial) = {
            let session = this.session.borrow();
            match session.as_ref() {
                Some(s) if s.id == id && !s.settled => (s.rendered.content, s.initial_focus.clone()),
                _ => return,
            }
        };

        let doc = &this.document;
        let outcome =
            focus::capture_and_move_initial_focus(doc, content, initial.as_ref(), &this.diagnostics);
        let trap = FocusTrap::arm(doc, content, this.config.contain_focus, &this.diagnostics);

        if let Some(session) = this.session.borrow_mut().as_mut().filter(|s| s.id == id) {
            session.previously_focused = outcome.previously_focused;
            session.focus_trap = Some(trap);
            session.settled = true;
            trace!(session = %id, "dialog settled");
        }
        Self::drain(this);
    }

    fn close(this: &Rc<Self>) {
        let span = debug_span!("dialog_transition", to = "closed");
        let _enter = span.enter();

        let Some(mut session) = this.session.borrow_mut().take() else {
            return;
        };
        this.busy.set(true);
        let snapshot = session.snapshot();
        let doc = &this.document;

        drop(session.focus_trap.take());

        let had_candidate = session.return_focus.is_some() || session.previously_focused.is_some();
        let restored =
            focus::restore_focus(doc, session.return_focus.as_ref(), session.previously_focused);
        if restored.is_none() && had_candidate {
            this.diagnostics.record(Diagnostic::FocusTargetUnavailable {
                phase: FocusPhase::Restore,
            });
        }

        drop(session.dismiss.take());
        if let Some(isolation) = session.isolation.take() {
            isolation.restore();
        }
        session.portal.unmount();

        this.busy.set(false);
        debug!(session = %snapshot.id, ?restored, "dialog closed");

        if let Some(hook) = this.props.on_close.clone() {
            hook(&snapshot);
        }
    }
}

/// An accessible modal dialog bound to a document and an open signal.
///
/// # Example
///
/// ```
/// use scrim_dialog::{Dialog, DialogProps, LifecycleState, RenderedDialog};
/// use scrim_dom::{Document, NodeId};
/// use scrim_runtime::Observable;
///
/// fn render(doc: &Document, portal: NodeId) -> scrim_dom::Result<RenderedDialog> {
///     let rendered = RenderedDialog::scaffold(doc, portal)?;
///     doc.append_element(rendered.content, "button")?;
///     Ok(rendered)
/// }
///
/// let doc = Document::new();
/// let is_open = Observable::new(false);
/// let dialog = Dialog::new(&doc, DialogProps::new(is_open.clone()), render);
///
/// is_open.set(true);
/// doc.run_microtasks();
/// assert_eq!(dialog.state(), LifecycleState::Open);
///
/// is_open.set(false);
/// assert_eq!(dialog.state(), LifecycleState::Closed);
/// ```
#[must_use = "dropping a Dialog closes it and stops following the signal"]
pub struct Dialog {
    shared: Rc<DialogShared>,
    _bindings: BindingScope,
}

impl Dialog {
    pub fn new(
        document: &Document,
        props: DialogProps,
        renderer: impl DialogRenderer + 'static,
    ) -> Self {
        Self::with_config(document, props, renderer, DialogConfig::default())
    }

    /// Bind a dialog. If the signal is already `true` the dialog opens
    /// immediately; initial focus still waits for the next microtask run.
    pub fn with_config(
        document: &Document,
        props: DialogProps,
        renderer: impl DialogRenderer + 'static,
        config: DialogConfig,
    ) -> Self {
        let diagnostics = DiagnosticLog::with_capacity(config.diagnostic_capacity);
        let shared = Rc::new(DialogShared {
            document: document.clone(),
            config,
            props,
            renderer: RefCell::new(Box::new(renderer)),
            session: RefCell::new(None),
            diagnostics,
            queued: RefCell::new(VecDeque::new()),
            busy: Cell::new(false),
            disposed: Cell::new(false),
        });

        let mut bindings = BindingScope::new();
        let weak = Rc::downgrade(&shared);
        bindings.subscribe(&shared.props.is_open, move |open| {
            if let Some(shared) = weak.upgrade() {
                DialogShared::on_signal(&shared, *open);
            }
        });

        if shared.props.is_open.get() {
            DialogShared::on_signal(&shared, true);
        }

        Self {
            shared,
            _bindings: bindings,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    pub fn is_open(&self) -> bool {
        self.state() == LifecycleState::Open
    }

    /// Current session, if open.
    pub fn session(&self) -> Option<SessionSnapshot> {
        self.shared.session.borrow().as_ref().map(DialogSession::snapshot)
    }

    /// Whether the deferred initial-focus step is still outstanding.
    pub fn awaiting_commit(&self) -> bool {
        self.shared.awaiting_commit()
    }

    /// Signal changes waiting for the dialog to settle.
    pub fn queued_transitions(&self) -> usize {
        self.shared.queued.borrow().len()
    }

    pub fn diagnostics(&self) -> DiagnosticLog {
        self.shared.diagnostics.clone()
    }

    pub fn config(&self) -> &DialogConfig {
        &self.shared.config
    }

    pub fn document(&self) -> &Document {
        &self.shared.document
    }
}

impl Drop for Dialog {
    fn drop(&mut self) {
        self.shared.disposed.set(true);
        self.shared.queued.borrow_mut().clear();
        DialogShared::close(&self.shared);
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("state", &self.state())
            .field("session", &self.shared.session.borrow())
            .field("queued", &self.shared.queued.borrow().len())
            .field("config", &self.shared.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderedDialog;
    use scrim_dom::{DomError, NodeId};
    use scrim_runtime::Observable;

    fn renderer(doc: &Document, portal: NodeId) -> Result<RenderedDialog> {
        let rendered = RenderedDialog::scaffold(doc, portal)?;
        let close = doc.append_element(rendered.content, "button")?;
        doc.set_text(close, "Close Dialog")?;
        Ok(rendered)
    }

    #[test]
    fn starts_closed_without_portal() {
        let doc = Document::new();
        let before = doc.node_count();
        let dialog = Dialog::new(&doc, DialogProps::new(Observable::new(false)), renderer);
        assert_eq!(dialog.state(), LifecycleState::Closed);
        assert!(dialog.session().is_none());
        assert_eq!(doc.node_count(), before);
    }

    #[test]
    fn initially_open_dialog_mounts_immediately() {
        let doc = Document::new();
        let dialog = Dialog::new(&doc, DialogProps::new(Observable::new(true)), renderer);
        assert!(dialog.is_open());
        assert!(dialog.awaiting_commit());
        assert_eq!(doc.active_element(), None);

        assert_eq!(doc.run_microtasks(), 1);
        assert!(!dialog.awaiting_commit());
        let session = dialog.session().unwrap();
        assert!(session.settled);
        assert_eq!(doc.text_content(doc.active_element().unwrap()), "Close Dialog");
    }

    #[test]
    fn close_while_pending_is_queued_until_commit() {
        let doc = Document::new();
        let is_open = Observable::new(false);
        let dialog = Dialog::new(&doc, DialogProps::new(is_open.clone()), renderer);

        is_open.set(true);
        is_open.set(false);
        assert!(dialog.is_open());
        assert_eq!(dialog.queued_transitions(), 1);

        doc.run_microtasks();
        assert!(!dialog.is_open());
        assert_eq!(dialog.queued_transitions(), 0);
        assert_eq!(
            dialog.diagnostics().count(|d| matches!(d, Diagnostic::DoubleTransition { .. })),
            1
        );
    }

    #[test]
    fn reopen_queued_behind_close_gets_fresh_session() {
        let doc = Document::new();
        let is_open = Observable::new(true);
        let dialog = Dialog::new(&doc, DialogProps::new(is_open.clone()), renderer);
        let first = dialog.session().unwrap().id;

        is_open.set(false);
        is_open.set(true);
        doc.run_microtasks();

        let second = dialog.session().unwrap();
        assert_ne!(second.id, first);
        assert!(second.settled);
    }

    #[test]
    fn render_failure_leaves_dialog_closed() {
        let doc = Document::new();
        let before = doc.node_count();
        let dialog = Dialog::new(
            &doc,
            DialogProps::new(Observable::new(true)),
            |doc: &Document, _portal: NodeId| -> Result<RenderedDialog> {
                Err(DomError::ProtectedNode(doc.body()))
            },
        );
        assert!(!dialog.is_open());
        assert_eq!(doc.node_count(), before);
        assert_eq!(doc.pending_microtasks(), 0);
        assert_eq!(dialog.diagnostics().count(Diagnostic::is_failure), 1);
    }

    #[test]
    fn drop_tears_down_open_dialog() {
        let doc = Document::new();
        let before = doc.node_count();
        let listeners = doc.listener_count();
        let dialog = Dialog::new(&doc, DialogProps::new(Observable::new(true)), renderer);
        doc.run_microtasks();
        drop(dialog);
        assert_eq!(doc.node_count(), before);
        assert_eq!(doc.listener_count(), listeners);
    }

    #[test]
    fn hooks_see_the_same_session() {
        let doc = Document::new();
        let is_open = Observable::new(false);
        let opened = Rc::new(Cell::new(None));
        let closed = Rc::new(Cell::new(None));
        let (o, c) = (Rc::clone(&opened), Rc::clone(&closed));
        let _dialog = Dialog::new(
            &doc,
            DialogProps::new(is_open.clone())
                .on_open(move |s| o.set(Some(s.id)))
                .on_close(move |s| c.set(Some(s.id))),
            renderer,
        );
        is_open.set(true);
        doc.run_microtasks();
        is_open.set(false);
        assert!(opened.get().is_some());
        assert_eq!(opened.get(), closed.get());
    }
}
