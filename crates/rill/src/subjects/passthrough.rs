//! # Passthrough Subject
//!
//! Relays sent values to current subscribers without storing anything.

use crate::fanout::Fanout;
use rill_core::{Completion, Publisher, Subject, Subscriber};
use std::convert::Infallible;
use std::sync::Arc;

/// A subject that passes values straight through to its subscribers.
///
/// Cloning yields another handle to the same subscriber set, so producers
/// and subscribing code can hold the subject independently.
pub struct PassthroughSubject<T, E = Infallible> {
    inner: Arc<Fanout<T, E>>,
}

impl<T, E> PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create an empty subject.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Fanout::new()),
        }
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}

impl<T, E> Default for PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for PassthroughSubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Publisher for PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        self.inner.subscribe(subscriber);
    }
}

impl<T, E> Subject for PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn send(&self, value: T) {
        self.inner.send(value);
    }

    fn send_completion(&self, completion: Completion<E>) {
        self.inner.send_completion(completion);
    }
}
