//! Reactive state stores consumed by the UI layer.
//!
//! DESIGN
//! ======
//! Each store owns a plain `Clone + Default` state struct and publishes a
//! snapshot over a `tokio::sync::watch` channel after every mutation. Actions
//! borrow the store mutably, so at most one action per store is in flight and
//! overlapping requests cannot overwrite each other's results.
//!
//! Backend handles are passed into every action; stores never own them.

pub mod catalog;
pub mod session;

use std::ops::{Deref, DerefMut};

/// A store whose actions toggle a shared busy flag.
pub(crate) trait BusyStore {
    /// Busy on, previous error cleared.
    fn begin(&mut self);
    /// Busy off.
    fn end(&mut self);
    /// Push the current state to subscribers.
    fn publish(&self);
}

/// Holds a store busy for the lifetime of one action.
///
/// Dropping the guard clears the busy flag, including when the action's
/// future is dropped mid-request.
pub(crate) struct BusyGuard<'a, S: BusyStore> {
    store: &'a mut S,
}

impl<'a, S: BusyStore> BusyGuard<'a, S> {
    pub(crate) fn start(store: &'a mut S) -> Self {
        store.begin();
        store.publish();
        Self { store }
    }
}

impl<S: BusyStore> Deref for BusyGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: BusyStore> DerefMut for BusyGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: BusyStore> Drop for BusyGuard<'_, S> {
    fn drop(&mut self) {
        self.store.end();
        self.store.publish();
    }
}
