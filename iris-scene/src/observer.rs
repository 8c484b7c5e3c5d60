//! Observer lists with scoped unsubscription.
//!
//! An [ObserverList] is the notification primitive used throughout the
//! scene and theming layers: a plain list of callbacks that fire in
//! registration order. Subscribing yields a [Subscription] guard;
//! dropping the guard removes the callback, so observers can never
//! outlive the state they capture by accident.
//!
//! Lists are single-threaded, like the rest of the scene tree.
//! Notification iterates over a snapshot of the callbacks, so an
//! observer may subscribe or unsubscribe (including itself) while a
//! notification is in flight.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A callback stored in an [ObserverList].
type Observer<T> = Rc<dyn Fn(&T)>;

struct ListInner<T> {
    next_id: u64,
    entries: Vec<(u64, Observer<T>)>,
}

/// An ordered list of callbacks observing a value of type `T`.
pub struct ObserverList<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T: 'static> ObserverList<T> {
    /// Creates an empty observer list.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers an observer and returns the guard keeping it alive.
    ///
    /// The observer fires on every [ObserverList::notify] until the
    /// returned [Subscription] is dropped or cancelled.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(observer)));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Calls every registered observer with `value`, in registration order.
    ///
    /// Iterates over a snapshot taken before the first call, so
    /// observers registered during notification fire on the next
    /// notification, and removals take effect immediately after the
    /// snapshot.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Observer<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in snapshot {
            observer(value);
        }
    }

    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns `true` if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl<T: 'static> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.len())
            .finish()
    }
}

/// Guard tying an observer registration to a scope.
///
/// Dropping the subscription removes the observer from its list. The
/// guard holds only a weak handle to the list, so it is safe to keep
/// after the list itself is gone.
#[must_use = "dropping the subscription unsubscribes the observer"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Removes the observer now instead of at the end of scope.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
