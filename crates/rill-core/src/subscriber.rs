//! # Subscriber Capability
//!
//! The consuming side of the protocol: accepts a subscription, receives
//! values (returning additional demand), and receives the one terminal
//! completion event.

use crate::completion::Completion;
use crate::demand::Demand;
use crate::subscription::SubscriptionHandle;

/// Consumer of values and completion, source of demand signals.
///
/// A subscriber may only be connected to a publisher whose `Output` and
/// `Failure` match its `Input` and `Failure`; the [`Publisher::subscribe`]
/// bound enforces this at composition time.
///
/// [`Publisher::subscribe`]: crate::publisher::Publisher::subscribe
pub trait Subscriber: Send {
    /// Type of values this subscriber consumes.
    type Input;

    /// Type of failure this subscriber understands.
    type Failure;

    /// Called exactly once, before any value, with the live subscription.
    ///
    /// This is where a subscriber establishes its initial demand; until it
    /// requests something, nothing will be delivered.
    fn on_subscribe(&mut self, subscription: SubscriptionHandle);

    /// Called once per delivered value, on the producer's calling thread.
    ///
    /// The returned demand is added to the subscription's outstanding
    /// counter before the producer's send returns; returning
    /// [`Demand::Unlimited`] or `Demand::max(1)` is the standard way to
    /// sustain a stream. Calling `request` on the held subscription from
    /// inside this hook is equally legal.
    fn on_value(&mut self, value: Self::Input) -> Demand;

    /// Called at most once, after which nothing further is delivered.
    fn on_completion(&mut self, completion: Completion<Self::Failure>);
}
