//! # Current Value Subject
//!
//! A subject that stores its most recent value (or seed) and replays it to
//! each new subscriber as their first emission.

use crate::fanout::Fanout;
use rill_core::violation::locked;
use rill_core::{Completion, Publisher, Subject, Subscriber};
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

/// A subject seeded with an initial value.
///
/// On subscribe, the stored value is replayed to the new subscriber as its
/// first emission, consuming one unit of whatever demand `on_subscribe`
/// established (a subscriber that requested nothing misses the replay under
/// the usual no-buffer policy, but can still read [`value`](Self::value)).
/// `send` updates the stored value and broadcasts it as one serialized
/// step, so the replay and the fan-out can never deliver the same send
/// twice.
pub struct CurrentValueSubject<T, E = Infallible> {
    inner: Arc<Fanout<T, E>>,
    value: Arc<RwLock<T>>,
}

impl<T, E> CurrentValueSubject<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
{
    /// Create a subject holding `seed` as its current value.
    #[must_use]
    pub fn new(seed: T) -> Self {
        Self {
            inner: Arc::new(Fanout::new()),
            value: Arc::new(RwLock::new(seed)),
        }
    }

    /// The stored value. Pure accessor, independent of subscription state.
    #[must_use]
    pub fn value(&self) -> T {
        locked(self.value.read()).clone()
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}

impl<T, E> Clone for CurrentValueSubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T, E> Publisher for CurrentValueSubject<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        // Registration and the seed read are one serialized step on the
        // node's delivery queue: a racing send lands either before it (and
        // becomes the seed) or after it (and follows the seed as a
        // broadcast), never as a duplicate.
        self.inner.subscribe_with_replay(subscriber, || self.value());
    }
}

impl<T, E> Subject for CurrentValueSubject<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + 'static,
{
    fn send(&self, value: T) {
        let stored = value.clone();
        self.inner
            .send_with(value, || *locked(self.value.write()) = stored);
    }

    fn send_completion(&self, completion: Completion<E>) {
        self.inner.send_completion(completion);
    }
}
