//! Listener registry used by panel containers for their message and
//! dispose events.

use std::cell::RefCell;
use std::rc::Rc;

use crate::disposable::Disposable;

struct Registry<A: ?Sized> {
    listeners: Vec<(u64, Rc<dyn Fn(&A)>)>,
    next_id: u64,
}

/// A single-threaded event source.
///
/// Listeners are snapshotted before each fire, so a listener may subscribe,
/// unsubscribe or fire again without tripping a borrow.
pub struct Emitter<A: ?Sized> {
    registry: Rc<RefCell<Registry<A>>>,
}

impl<A: ?Sized + 'static> Emitter<A> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Add a listener. Disposing the returned handle removes it.
    pub fn subscribe(&self, listener: impl Fn(&A) + 'static) -> Disposable {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak = Rc::downgrade(&self.registry);
        Disposable::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().listeners.retain(|(i, _)| *i != id);
            }
        })
    }

    pub fn fire(&self, arg: &A) {
        let snapshot: Vec<Rc<dyn Fn(&A)>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in snapshot {
            listener(arg);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl<A: ?Sized + 'static> Default for Emitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Clone for Emitter<A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}
