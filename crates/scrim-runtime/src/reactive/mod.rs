#![forbid(unsafe_code)]

//! Change-tracked signals for driving dialog state.
//!
//! - [`Observable`]: shared, version-tracked value with change notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: owns a group of subscriptions and releases them together.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` callbacks and cleaned up lazily during
//! notification; the strong side lives in the [`Subscription`].
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. No internal borrow is held while a subscriber runs, so a subscriber may
//!    call `set` on the same observable. The nested change is delivered to
//!    every subscriber and supersedes the outer notification: subscribers
//!    never observe a value older than one they have already seen.
//! 5. Dropping a [`Subscription`] removes the callback before the next
//!    notification.

pub mod observable;
pub mod scope;

pub use observable::{Observable, Subscription};
pub use scope::BindingScope;
