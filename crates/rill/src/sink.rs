//! # Sink
//!
//! The canonical consumer of the protocol: a subscriber that requests
//! `Unlimited` demand once on attach and forwards every value and the
//! completion to caller-supplied closures. Built through
//! [`PublisherExt::sink`](crate::ext::PublisherExt::sink), which returns
//! the [`Cancellable`] token owning the subscription.

use rill_core::violation::locked;
use rill_core::{Cancellable, Completion, Demand, Subscriber, SubscriptionHandle};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

type Slot = Arc<Mutex<Option<SubscriptionHandle>>>;

/// Closure-driven unlimited-demand subscriber.
pub struct Sink<T, E, FV, FC> {
    receive_value: FV,
    receive_completion: FC,
    slot: Slot,
    _marker: PhantomData<fn(T, E)>,
}

impl<T, E, FV, FC> Sink<T, E, FV, FC>
where
    FV: FnMut(T) + Send,
    FC: FnMut(Completion<E>) + Send,
{
    /// Build the sink and the token that cancels its subscription.
    pub(crate) fn new(receive_value: FV, receive_completion: FC) -> (Self, Cancellable) {
        let slot: Slot = Arc::new(Mutex::new(None));
        let token_slot = slot.clone();
        let token = Cancellable::new(move || {
            if let Some(handle) = locked(token_slot.lock()).take() {
                handle.cancel();
            }
        });
        (
            Self {
                receive_value,
                receive_completion,
                slot,
                _marker: PhantomData,
            },
            token,
        )
    }
}

impl<T, E, FV, FC> Subscriber for Sink<T, E, FV, FC>
where
    FV: FnMut(T) + Send,
    FC: FnMut(Completion<E>) + Send,
{
    type Input = T;
    type Failure = E;

    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
        *locked(self.slot.lock()) = Some(subscription.clone());
        subscription.request(Demand::Unlimited);
    }

    fn on_value(&mut self, value: T) -> Demand {
        (self.receive_value)(value);
        // Demand was established once as Unlimited.
        Demand::None
    }

    fn on_completion(&mut self, completion: Completion<E>) {
        // Terminal: the token has nothing left to cancel.
        locked(self.slot.lock()).take();
        (self.receive_completion)(completion);
    }
}
