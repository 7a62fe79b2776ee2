//! # Map Operator
//!
//! 1:1 value transformation. Demand needs no compensation: every upstream
//! value becomes exactly one downstream value, so downstream's returned
//! demand flows upstream unchanged.

use rill_core::{Completion, Demand, Publisher, Subscriber, SubscriptionHandle};
use std::marker::PhantomData;

/// Publisher transforming each upstream value with a closure.
pub struct Map<P, F> {
    upstream: P,
    transform: F,
}

impl<P, F> Map<P, F> {
    /// Wrap `upstream`, applying `transform` to each value.
    pub fn new(upstream: P, transform: F) -> Self {
        Self {
            upstream,
            transform,
        }
    }
}

impl<P, F, T> Publisher for Map<P, F>
where
    P: Publisher,
    P::Output: 'static,
    F: FnMut(P::Output) -> T + Clone + Send + 'static,
{
    type Output = T;
    type Failure = P::Failure;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = P::Failure> + 'static,
    {
        self.upstream.subscribe(MapSubscriber {
            downstream: subscriber,
            transform: self.transform.clone(),
            _input: PhantomData,
        });
    }
}

/// Intermediate subscriber interposed between upstream and downstream.
struct MapSubscriber<I, S, F> {
    downstream: S,
    transform: F,
    _input: PhantomData<fn(I)>,
}

impl<I, S, F> Subscriber for MapSubscriber<I, S, F>
where
    S: Subscriber,
    F: FnMut(I) -> S::Input + Send,
{
    type Input = I;
    type Failure = S::Failure;

    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
        // Requests and cancellation forward upstream untouched.
        self.downstream.on_subscribe(subscription);
    }

    fn on_value(&mut self, value: I) -> Demand {
        self.downstream.on_value((self.transform)(value))
    }

    fn on_completion(&mut self, completion: Completion<S::Failure>) {
        self.downstream.on_completion(completion);
    }
}
