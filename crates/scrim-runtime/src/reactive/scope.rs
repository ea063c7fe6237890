#![forbid(unsafe_code)]

use super::observable::{Observable, Subscription};

/// Collects subscriptions for one logical owner (a dialog, a host view).
///
/// When the scope is dropped or cleared, every held subscription is released
/// and none of its callbacks fire again.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep an existing subscription alive for the scope's lifetime.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe within this scope. Returns the scope for chaining.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        self.subscriptions.push(source.subscribe(callback));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release everything now; the scope stays usable.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("len", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn scope_drop_releases_subscriptions() {
        let open = Observable::new(false);
        let seen = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope.subscribe(&open, move |_| s.set(s.get() + 1));
            open.set(true);
        }
        open.set(false);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn clear_keeps_scope_reusable() {
        let open = Observable::new(false);
        let mut scope = BindingScope::new();
        let first = Rc::new(Cell::new(false));
        let f = Rc::clone(&first);
        scope.subscribe(&open, move |_| f.set(true));
        scope.clear();
        assert!(scope.is_empty());

        let second = Rc::new(Cell::new(false));
        let s = Rc::clone(&second);
        scope.hold(open.subscribe(move |_| s.set(true)));
        open.set(true);
        assert!(!first.get());
        assert!(second.get());
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn debug_reports_len() {
        let open = Observable::new(0);
        let mut scope = BindingScope::new();
        scope.subscribe(&open, |_| {}).subscribe(&open, |_| {});
        assert!(format!("{scope:?}").contains("len: 2"));
    }
}
