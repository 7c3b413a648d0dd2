//! Engine-owned reactive state cells.
//!
//! Each shared value crossing the host boundary (element collection, active
//! tool, in-progress element, drag bookkeeping) lives in a [`Store`]:
//! whole-value replace plus synchronous change notification, single-threaded,
//! no locks. Mutation is always a complete `set`, never a partial in-place
//! edit, so observers only ever see consistent snapshots.

use std::fmt;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Single-threaded reactive cell with get / set / subscribe.
pub struct Store<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// The current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the whole value and synchronously notify every subscriber.
    pub fn set(&mut self, value: T) {
        self.value = value;
        for (_, callback) in &mut self.subscribers {
            callback(&self.value);
        }
    }

    /// Register a change observer, run on the caller's stack at every `set`.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_replaces_and_notifies() {
        let mut store = Store::new(vec![1, 2]);
        let seen: Rc<RefCell<Vec<Vec<i32>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        store.subscribe(move |v| sink.borrow_mut().push(v.clone()));

        store.set(vec![3]);
        store.set(vec![4, 5]);

        assert_eq!(*store.get(), vec![4, 5]);
        assert_eq!(*seen.borrow(), vec![vec![3], vec![4, 5]]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::new(0u32);
        let count = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&count);
        let id = store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.set(1);
        assert!(store.unsubscribe(id));
        store.set(2);

        assert_eq!(*count.borrow(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_multiple_subscribers_all_run() {
        let mut store = Store::new(());
        let count = Rc::new(RefCell::new(0u32));
        for _ in 0..3 {
            let sink = Rc::clone(&count);
            store.subscribe(move |_| *sink.borrow_mut() += 1);
        }
        assert_eq!(store.subscriber_count(), 3);
        store.set(());
        assert_eq!(*count.borrow(), 3);
    }
}
