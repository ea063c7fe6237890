#![forbid(unsafe_code)]

//! Host-facing runtime primitives for Scrim.
//!
//! The host owns every dialog's open/closed state. It exposes that state as
//! an [`Observable<bool>`](reactive::Observable) and the engine subscribes,
//! reacting to changes instead of mutating the flag itself.

pub mod reactive;

pub use reactive::{BindingScope, Observable, Subscription};
