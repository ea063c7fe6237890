#![forbid(unsafe_code)]

//! Dismiss Controller: Escape and overlay clicks ask the host to close.
//!
//! The controller only notifies. Whether the dialog actually closes is up to
//! the host, which owns the open signal.
//!
//! # Invariants
//!
//! - Escape notifies exactly once per keydown, wherever focus is.
//! - A click inside the content root never reaches the overlay listener or
//!   any listener above it.
//! - An overlay click notifies once and does not bubble past the overlay.
//! - Listeners live exactly as long as the [`DismissListeners`] value.

use scrim_dom::{Document, EventKind, EventTarget, EventType, Key, ListenerHandle, MouseButton};
use tracing::debug;

use crate::config::DialogConfig;
use crate::props::DismissCallback;
use crate::render::RenderedDialog;
use crate::session::SessionId;

/// Session-scoped dismissal listeners.
#[must_use = "dropping DismissListeners detaches them"]
pub struct DismissListeners {
    handles: Vec<ListenerHandle>,
}

impl DismissListeners {
    pub fn attach(
        doc: &Document,
        rendered: RenderedDialog,
        config: &DialogConfig,
        on_dismiss: Option<DismissCallback>,
        session: SessionId,
    ) -> Self {
        let mut handles = Vec::with_capacity(3);

        if config.close_on_escape {
            let notify = on_dismiss.clone();
            handles.push(doc.add_listener(
                EventTarget::Window,
                EventType::KeyDown,
                move |event| {
                    if event.key().is_some_and(|k| k.key == Key::Escape) {
                        debug!(session = %session, "dismiss: escape");
                        if let Some(notify) = &notify {
                            notify();
                        }
                    }
                },
            ));
        }

        if config.close_on_backdrop {
            let notify = on_dismiss;
            handles.push(doc.add_listener(
                EventTarget::Node(rendered.overlay),
                EventType::Click,
                move |event| {
                    if *event.kind() != EventKind::Click(MouseButton::Primary) {
                        return;
                    }
                    event.stop_propagation();
                    debug!(session = %session, "dismiss: overlay click");
                    if let Some(notify) = &notify {
                        notify();
                    }
                },
            ));
        }

        // Content clicks stop here regardless of the backdrop policy.
        handles.push(doc.add_listener(
            EventTarget::Node(rendered.content),
            EventType::Click,
            |event| event.stop_propagation(),
        ));

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for DismissListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissListeners")
            .field("len", &self.handles.len())
            .finish()
    }
}
