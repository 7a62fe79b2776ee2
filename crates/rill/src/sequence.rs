//! # Sequence Source
//!
//! A cold, demand-honoring publisher over an iterable. Unlike a subject it
//! never drops: values are emitted only while outstanding demand is
//! positive, emission pauses when demand runs out and resumes on the next
//! `request`, and iterator exhaustion sends `Finished` exactly once.
//!
//! The per-subscription drain is a trampoline: a subscriber that requests
//! more demand from inside its value hook extends the active drain loop
//! instead of recursing, so an unlimited synchronous chain runs in
//! constant stack.

use rill_core::violation::locked;
use rill_core::{
    Completion, Demand, Publisher, Subscriber, Subscription, SubscriptionHandle, SubscriptionId,
};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Cold publisher emitting the items of a cloneable iterable.
///
/// Each `subscribe` clones the iterable, so every subscriber walks its own
/// independent iterator from the start.
pub struct Sequence<I> {
    items: I,
}

impl<I> Sequence<I>
where
    I: IntoIterator + Clone,
{
    /// Publisher over `items`.
    pub fn from_iter(items: I) -> Self {
        Self { items }
    }
}

impl<I> Publisher for Sequence<I>
where
    I: IntoIterator + Clone,
    I::IntoIter: Send + 'static,
    I::Item: 'static,
{
    type Output = I::Item;
    type Failure = Infallible;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = I::Item, Failure = Infallible> + 'static,
    {
        let subscription = Arc::new(SequenceSubscription {
            id: SubscriptionId::new(),
            // Pre-claimed drain: requests made inside on_subscribe only
            // accumulate demand; the drain below delivers them.
            state: Mutex::new(DrainState {
                iter: self.items.clone().into_iter(),
                demand: Demand::None,
                phase: Phase::Active,
                draining: true,
            }),
            subscriber: Mutex::new(subscriber),
        });

        let handle = SubscriptionHandle::new(subscription.clone());
        locked(subscription.subscriber.lock()).on_subscribe(handle);
        subscription.drain();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Cancelled,
    Completed,
}

struct DrainState<It> {
    iter: It,
    demand: Demand,
    phase: Phase,
    draining: bool,
}

/// One subscriber's live link to a sequence.
struct SequenceSubscription<It, S> {
    id: SubscriptionId,
    state: Mutex<DrainState<It>>,
    subscriber: Mutex<S>,
}

enum Step<V> {
    Emit(V),
    Finish,
    Idle,
}

impl<It, S> SequenceSubscription<It, S>
where
    It: Iterator + Send,
    S: Subscriber<Input = It::Item, Failure = Infallible>,
{
    /// Deliver values until demand or the iterator runs out.
    ///
    /// Caller must have set `draining`; the flag is cleared on every exit
    /// path. The state lock is never held while a subscriber hook runs.
    fn drain(&self) {
        loop {
            let step = {
                let mut state = locked(self.state.lock());
                if state.phase != Phase::Active || state.demand.is_exhausted() {
                    state.draining = false;
                    Step::Idle
                } else {
                    match state.iter.next() {
                        Some(value) => {
                            state.demand.consume_one();
                            Step::Emit(value)
                        }
                        None => {
                            state.phase = Phase::Completed;
                            state.draining = false;
                            Step::Finish
                        }
                    }
                }
            };

            match step {
                Step::Idle => return,
                Step::Finish => {
                    debug!(subscription_id = %self.id, "Sequence exhausted");
                    locked(self.subscriber.lock()).on_completion(Completion::Finished);
                    return;
                }
                Step::Emit(value) => {
                    let extra = locked(self.subscriber.lock()).on_value(value);
                    let mut state = locked(self.state.lock());
                    if state.phase == Phase::Active {
                        state.demand += extra;
                    } else {
                        state.draining = false;
                        return;
                    }
                }
            }
        }
    }
}

impl<It, S> Subscription for SequenceSubscription<It, S>
where
    It: Iterator + Send,
    S: Subscriber<Input = It::Item, Failure = Infallible>,
{
    fn request(&self, demand: Demand) {
        {
            let mut state = locked(self.state.lock());
            if state.phase != Phase::Active {
                return;
            }
            state.demand += demand;
            if state.draining || state.demand.is_exhausted() {
                // An active drain (possibly this very call stack, re-entered
                // from a value hook) picks the new demand up.
                return;
            }
            state.draining = true;
        }
        self.drain();
    }

    fn cancel(&self) {
        let mut state = locked(self.state.lock());
        if state.phase != Phase::Active {
            return;
        }
        state.phase = Phase::Cancelled;
        drop(state);
        debug!(subscription_id = %self.id, "Sequence subscription cancelled");
    }

    fn id(&self) -> SubscriptionId {
        self.id
    }
}
