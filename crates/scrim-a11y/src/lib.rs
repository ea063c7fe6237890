#![forbid(unsafe_code)]

//! Accessibility layer for Scrim dialogs.
//!
//! - [`aria`]: attribute names and the dialog content bindings
//!   (`role="dialog"`, `aria-modal`, `tabindex`, label association).
//! - [`isolation`]: legacy modal mode, hiding background siblings from
//!   assistive technology while a dialog is open, reversibly.

pub mod aria;
pub mod isolation;

pub use aria::{DialogAria, DialogLabel};
pub use isolation::{IsolationAttrs, IsolationReport, SiblingIsolation, SiblingRecord};
