//! Membership hooks
//!
//! Items that report their own changes (observers, channels, callbacks) need to be
//! wired up when they join a collection and unwired when they leave. A subscriber
//! receives exactly one `attach` per entry and one `detach` per exit.

use std::sync::Arc;

/// Receives membership changes of an indexed collection
pub trait ItemSubscriber<T> {
    /// `item` entered the collection
    fn attach(&mut self, item: &Arc<T>);

    /// `item` left the collection (remove, clear or reset)
    fn detach(&mut self, item: &Arc<T>);
}

impl<T, A, D> ItemSubscriber<T> for (A, D)
where
    A: FnMut(&Arc<T>),
    D: FnMut(&Arc<T>),
{
    fn attach(&mut self, item: &Arc<T>) {
        (self.0)(item)
    }

    fn detach(&mut self, item: &Arc<T>) {
        (self.1)(item)
    }
}
