//! # Filter Operator
//!
//! Predicate filter with demand compensation. Upstream consumes one unit
//! of demand for every value it emits, including values the predicate
//! rejects; without compensation a downstream request of `max(n)` would
//! silently under-deliver. The operator therefore returns exactly `max(1)`
//! from its value hook for each rejected value — one replacement unit,
//! applied by upstream under the demand algebra before its emit returns.

use rill_core::{Completion, Demand, Publisher, Subscriber, SubscriptionHandle};

/// Publisher forwarding only values that satisfy a predicate.
pub struct Filter<P, F> {
    upstream: P,
    predicate: F,
}

impl<P, F> Filter<P, F> {
    /// Wrap `upstream`, keeping values for which `predicate` is true.
    pub fn new(upstream: P, predicate: F) -> Self {
        Self {
            upstream,
            predicate,
        }
    }
}

impl<P, F> Publisher for Filter<P, F>
where
    P: Publisher,
    P::Output: 'static,
    F: FnMut(&P::Output) -> bool + Clone + Send + 'static,
{
    type Output = P::Output;
    type Failure = P::Failure;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = P::Output, Failure = P::Failure> + 'static,
    {
        self.upstream.subscribe(FilterSubscriber {
            downstream: subscriber,
            predicate: self.predicate.clone(),
        });
    }
}

/// Intermediate subscriber interposed between upstream and downstream.
struct FilterSubscriber<S, F> {
    downstream: S,
    predicate: F,
}

impl<S, F> Subscriber for FilterSubscriber<S, F>
where
    S: Subscriber,
    F: FnMut(&S::Input) -> bool + Send,
{
    type Input = S::Input;
    type Failure = S::Failure;

    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
        // Requests and cancellation forward upstream untouched.
        self.downstream.on_subscribe(subscription);
    }

    fn on_value(&mut self, value: S::Input) -> Demand {
        if (self.predicate)(&value) {
            self.downstream.on_value(value)
        } else {
            // Compensation for the unit upstream consumed on this value.
            Demand::max(1)
        }
    }

    fn on_completion(&mut self, completion: Completion<S::Failure>) {
        self.downstream.on_completion(completion);
    }
}
