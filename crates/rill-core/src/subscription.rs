//! # Subscription
//!
//! The live link between one publisher and one subscriber. The publisher
//! side owns demand accounting; the subscriber side holds a non-owning
//! [`SubscriptionHandle`] through which it requests values and cancels.
//!
//! Lifecycle: `Unconnected → Active → Terminal(Finished | Failed |
//! Cancelled)`. `request` on a terminal subscription is a no-op, not an
//! error; `cancel` is idempotent and synchronous.

use crate::demand::Demand;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one subscription, the key of a subject's subscriber set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability of the publisher-held side of a live subscription.
///
/// Implementations own the demand counter and the terminal flag; all
/// methods take `&self` so a handle can be shared between the subscriber
/// and any cancellation token holding it.
pub trait Subscription: Send + Sync {
    /// Add `demand` to the outstanding counter.
    ///
    /// Legal any number of times while active, including re-entrantly from
    /// inside the subscriber's value hook. No-op once terminal. Requesting
    /// [`Demand::None`] is legal and leaves the counter untouched.
    fn request(&self, demand: Demand);

    /// Tear the subscription down.
    ///
    /// The first call transitions to the cancelled terminal state and
    /// releases upstream resources synchronously before returning; further
    /// calls are no-ops. No value or completion follows cancellation.
    fn cancel(&self);

    /// This subscription's identity.
    fn id(&self) -> SubscriptionId;
}

/// Cheap clonable handle to a [`Subscription`], handed to the subscriber
/// in `on_subscribe`.
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<dyn Subscription>,
}

impl SubscriptionHandle {
    /// Wrap a concrete subscription.
    pub fn new(subscription: Arc<dyn Subscription>) -> Self {
        Self {
            inner: subscription,
        }
    }

    /// See [`Subscription::request`].
    pub fn request(&self, demand: Demand) {
        self.inner.request(demand);
    }

    /// See [`Subscription::cancel`].
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// See [`Subscription::id`].
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.inner.id()
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id())
            .finish()
    }
}
