//! # Publisher Composition Surface
//!
//! Chaining adaptors over any [`Publisher`].

use crate::operators::{Filter, Map};
use crate::share::Share;
use crate::sink::Sink;
use rill_core::{Cancellable, Completion, Publisher};

/// Combinators available on every publisher.
pub trait PublisherExt: Publisher + Sized {
    /// Transform every value with `transform`. 1:1, no demand compensation.
    fn map<T, F>(self, transform: F) -> Map<Self, F>
    where
        F: FnMut(Self::Output) -> T + Clone + Send + 'static,
    {
        Map::new(self, transform)
    }

    /// Keep only values for which `predicate` is true, compensating
    /// upstream demand for each rejected value.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        F: FnMut(&Self::Output) -> bool + Clone + Send + 'static,
    {
        Filter::new(self, predicate)
    }

    /// Convert this cold publisher into a hot, reference-counted one.
    fn share(self) -> Share<Self>
    where
        Self: Send + Sync + 'static,
        Self::Output: Clone + Send + 'static,
        Self::Failure: Clone + Send + 'static,
    {
        Share::new(self)
    }

    /// Attach an unlimited-demand sink; the returned token cancels the
    /// subscription when dropped.
    fn sink<FV, FC>(&self, receive_value: FV, receive_completion: FC) -> Cancellable
    where
        FV: FnMut(Self::Output) + Send + 'static,
        FC: FnMut(Completion<Self::Failure>) + Send + 'static,
        Self::Output: 'static,
        Self::Failure: 'static,
    {
        let (sink, token) = Sink::new(receive_value, receive_completion);
        self.subscribe(sink);
        token
    }
}

impl<P> PublisherExt for P where P: Publisher + Sized {}
