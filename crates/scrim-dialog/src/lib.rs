#![forbid(unsafe_code)]

//! Accessible modal dialog engine.
//!
//! A [`Dialog`] watches a host-owned `Observable<bool>` and, while it is
//! `true`, keeps a WAI-ARIA modal dialog alive in a [`scrim_dom::Document`]:
//!
//! - [`portal`]: an owned root appended to `<body>` for the dialog markup.
//! - [`focus`]: initial focus, Tab trapping, and focus restoration.
//! - [`dismiss`]: Escape and overlay clicks notify the host.
//! - sibling isolation (legacy modal mode) from [`scrim_a11y`].
//! - [`lifecycle`]: sequences all of the above on every transition.
//!
//! Markup comes from a [`DialogRenderer`]. The engine never returns errors
//! to the host; degraded paths land in the dialog's [`DiagnosticLog`].

pub mod config;
pub mod diagnostics;
pub mod dismiss;
pub mod focus;
pub mod lifecycle;
pub mod portal;
pub mod props;
pub mod render;
pub mod session;

pub use config::{DEFAULT_PORTAL_ATTRIBUTE, DialogConfig};
pub use diagnostics::{DEFAULT_DIAGNOSTIC_CAPACITY, Diagnostic, DiagnosticLog, FocusPhase};
pub use dismiss::DismissListeners;
pub use focus::{FocusTrap, InitialFocus};
pub use lifecycle::{Dialog, LifecycleState};
pub use portal::Portal;
pub use props::{DialogProps, DismissCallback, FocusTarget, LifecycleHook};
pub use render::{DialogRenderer, RenderedDialog};
pub use session::{SessionId, SessionSnapshot};
