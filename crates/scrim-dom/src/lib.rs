#![forbid(unsafe_code)]

//! Live document model for Scrim.
//!
//! The dialog engine needs a small, honest slice of a browser document:
//! elements with attributes, focus, bubbling events with cancellable default
//! actions, listener registrations that can be revoked, and a microtask
//! queue for work that must wait for a render commit. This crate provides
//! exactly that, in-process and single-threaded.
//!
//! # Example
//!
//! ```
//! use scrim_dom::{Document, Key, Modifiers};
//!
//! let doc = Document::new();
//! let first = doc.append_element(doc.body(), "button").unwrap();
//! let second = doc.append_element(doc.body(), "button").unwrap();
//!
//! assert!(doc.focus(first));
//! doc.key_down(Key::Tab, Modifiers::empty());
//! assert_eq!(doc.active_element(), Some(second));
//! ```

pub mod document;
pub mod error;
pub mod event;
pub mod listener;
pub mod node;
pub mod tabbable;

pub use document::{Descendants, Document, WeakDocument};
pub use error::{DomError, Result};
pub use event::{
    DispatchOutcome, Event, EventKind, EventTarget, EventType, Key, KeyEvent, Modifiers,
    MouseButton,
};
pub use listener::{Listener, ListenerHandle, ListenerId};
pub use node::NodeId;
pub use tabbable::{TabbableSet, Tabbables, is_focusable, is_tabbable};
