//! # Publisher Capability
//!
//! The producing side of the protocol. A publisher is a capability, not
//! necessarily a stored object: "cold" publishers build independent state
//! per subscriber, "hot" publishers (subjects, share) fan one upstream
//! state out to many subscribers.

use crate::completion::Completion;
use crate::subscriber::Subscriber;

/// Source of typed values and one terminal completion event.
pub trait Publisher {
    /// Type of values this publisher emits.
    type Output;

    /// Type of failure this publisher can complete with.
    ///
    /// Publishers that cannot fail use [`std::convert::Infallible`].
    type Failure;

    /// Attach `subscriber` to this publisher.
    ///
    /// The publisher constructs a subscription and hands it to the
    /// subscriber via `on_subscribe` before this call returns. Values flow
    /// only once the subscriber requests demand.
    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static;
}

/// A publisher that is also externally pushable.
///
/// Subjects are hot and multicast by construction: every registered,
/// non-terminal subscriber with outstanding demand receives each sent
/// value. The entry points are invoked by arbitrary producer code, not by
/// the protocol itself.
pub trait Subject: Publisher {
    /// Deliver `value` to every registered subscriber with outstanding
    /// demand. Subscribers whose demand is exhausted at delivery time miss
    /// this value; subjects do not buffer.
    fn send(&self, value: Self::Output);

    /// Deliver the terminal completion to every registered subscriber and
    /// clear the subscriber set. Later sends are no-ops.
    fn send_completion(&self, completion: Completion<Self::Failure>);
}
