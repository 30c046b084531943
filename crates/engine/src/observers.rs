use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct ObserverList<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

impl<E> ObserverList<E> {
    fn remove(&mut self, id: u64) {
        self.callbacks.retain(|(existing, _)| *existing != id);
    }
}

/// Single-threaded list of event callbacks owned by the observed object.
pub struct Observers<E> {
    list: Rc<RefCell<ObserverList<E>>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            list: Rc::new(RefCell::new(ObserverList {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E: 'static> Observers<E> {
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let mut list = self.list.borrow_mut();
        let id = list.next_id;
        list.next_id = list.next_id.saturating_add(1);
        let callback: Callback<E> = Rc::new(RefCell::new(callback));
        list.callbacks.push((id, callback));

        let weak: Weak<RefCell<ObserverList<E>>> = Rc::downgrade(&self.list);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(list) = weak.upgrade() {
                    list.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Invokes every callback registered at the time of the call. Callbacks
    /// may subscribe or unsubscribe while being notified.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .list
            .borrow()
            .callbacks
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            // A callback that re-enters its own observable is skipped instead of panicking.
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(event);
            }
        }
    }
}

impl<E> Observers<E> {
    pub fn subscriber_count(&self) -> usize {
        self.list.borrow().callbacks.len()
    }
}

/// Keeps a callback registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Leaves the callback registered for as long as the observable lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
