//! Cleanup handles acquired while a panel is alive.
//!
//! A [`Disposable`] wraps a one-shot release callback. A [`DisposableStack`]
//! collects them in acquisition order and releases them last-in, first-out.

use std::fmt;

/// A one-shot release callback.
///
/// Dropping a `Disposable` without calling [`Disposable::dispose`] does not
/// run the callback. Ownership moves into the stack that releases it.
pub struct Disposable {
    release: Option<Box<dyn FnOnce()>>,
}

impl Disposable {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Run the release callback. Calling this more than once is a no-op.
    pub fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.release.is_none()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Key for releasing a single entry from a [`DisposableStack`] early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisposableKey(u64);

/// Handles released in reverse acquisition order.
#[derive(Debug, Default)]
pub struct DisposableStack {
    entries: Vec<(DisposableKey, Disposable)>,
    next_key: u64,
}

impl DisposableStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a handle on top of the stack.
    pub fn push(&mut self, disposable: Disposable) -> DisposableKey {
        let key = DisposableKey(self.next_key);
        self.next_key += 1;
        self.entries.push((key, disposable));
        key
    }

    /// Release one handle ahead of the rest. Returns false if the key is no
    /// longer on the stack.
    pub fn release(&mut self, key: DisposableKey) -> bool {
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                let (_, mut disposable) = self.entries.remove(index);
                disposable.dispose();
                true
            }
            None => false,
        }
    }

    /// Pop and release every handle, newest first.
    ///
    /// Each entry leaves the stack before its callback runs, so a callback
    /// that re-enters teardown sees only the handles still pending.
    pub fn dispose_all(&mut self) {
        while let Some((_, mut disposable)) = self.entries.pop() {
            disposable.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for DisposableStack {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Disposable {
        let log = log.clone();
        Disposable::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn test_dispose_runs_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = recording(&log, "a");
        d.dispose();
        d.dispose();
        assert!(d.is_disposed());
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_stack_releases_newest_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stack = DisposableStack::new();
        stack.push(recording(&log, "first"));
        stack.push(recording(&log, "second"));
        stack.push(recording(&log, "third"));

        stack.dispose_all();
        assert_eq!(*log.borrow(), vec!["third", "second", "first"]);
        assert!(stack.is_empty());

        stack.dispose_all();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_release_single_entry() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stack = DisposableStack::new();
        let a = stack.push(recording(&log, "a"));
        stack.push(recording(&log, "b"));

        assert!(stack.release(a));
        assert!(!stack.release(a));
        assert_eq!(stack.len(), 1);

        stack.dispose_all();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_releases_pending() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut stack = DisposableStack::new();
            stack.push(recording(&log, "x"));
            stack.push(Disposable::noop());
        }
        assert_eq!(*log.borrow(), vec!["x"]);
    }
}
