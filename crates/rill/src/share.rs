//! # Share
//!
//! Converts a cold publisher into a hot one holding at most one upstream
//! subscription, reference-counted by downstream subscriber count.
//!
//! ## Upstream demand policy
//!
//! The internal tap requests `Unlimited` upstream once; per-downstream
//! backpressure is the fan-out engine's zero-demand-drop policy. Late
//! joiners get no replay. Upstream completion latches the node terminal:
//! it is broadcast to all current subscribers, and any later subscriber is
//! handed that completion immediately and no values. When the last
//! downstream subscriber cancels, the upstream subscription is cancelled
//! synchronously and the node returns to idle; a later subscriber re-arms
//! it with a fresh upstream subscription.

use crate::fanout::{Fanout, SubscribeOutcome};
use rill_core::violation::locked;
use rill_core::{Completion, Demand, Publisher, Subscriber, SubscriptionHandle};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// Hot, reference-counted wrapper around a cold upstream publisher.
///
/// Clones share the same upstream subscription and subscriber set.
pub struct Share<P>
where
    P: Publisher,
{
    inner: Arc<ShareInner<P>>,
}

/// Tap lifecycle. `Armed` holds the upstream handle once the upstream
/// publisher has delivered it.
enum TapState {
    Idle,
    Armed(Option<SubscriptionHandle>),
}

struct ShareInner<P>
where
    P: Publisher,
{
    upstream: P,
    fanout: Arc<Fanout<P::Output, P::Failure>>,
    tap: Mutex<TapState>,
}

impl<P> Share<P>
where
    P: Publisher + Send + Sync + 'static,
    P::Output: Clone + Send + 'static,
    P::Failure: Clone + Send + 'static,
{
    /// Share `upstream` among any number of subscribers.
    #[must_use]
    pub fn new(upstream: P) -> Self {
        let inner = Arc::new(ShareInner {
            upstream,
            fanout: Arc::new(Fanout::new()),
            tap: Mutex::new(TapState::Idle),
        });

        // Last downstream cancelled: tear the upstream link down.
        let weak = Arc::downgrade(&inner);
        inner.fanout.set_empty_hook(move || {
            if let Some(inner) = weak.upgrade() {
                inner.disarm();
            }
        });

        Self { inner }
    }

    /// Number of currently registered downstream subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.fanout.subscriber_count()
    }
}

impl<P> Clone for Share<P>
where
    P: Publisher,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P> ShareInner<P>
where
    P: Publisher + Send + Sync + 'static,
    P::Output: Clone + Send + 'static,
    P::Failure: Clone + Send + 'static,
{
    /// Cancel and drop the upstream subscription, returning to idle.
    fn disarm(&self) {
        let handle = {
            let mut tap = locked(self.tap.lock());
            match std::mem::replace(&mut *tap, TapState::Idle) {
                TapState::Idle => None,
                TapState::Armed(handle) => handle,
            }
        };
        if let Some(handle) = handle {
            debug!(subscription_id = %handle.id(), "Share upstream torn down");
            handle.cancel();
        }
    }
}

impl<P> Publisher for Share<P>
where
    P: Publisher + Send + Sync + 'static,
    P::Output: Clone + Send + 'static,
    P::Failure: Clone + Send + 'static,
{
    type Output = P::Output;
    type Failure = P::Failure;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = P::Output, Failure = P::Failure> + 'static,
    {
        // Register downstream first so values flowing from the tap during
        // arming already reach it. A terminal node hands the stored
        // completion over inside subscribe; a subscriber that cancelled in
        // on_subscribe never joined, so there is nothing to feed.
        match self.inner.fanout.subscribe(subscriber) {
            SubscribeOutcome::Registered => {}
            SubscribeOutcome::Terminal | SubscribeOutcome::Cancelled => return,
        }

        let arm = {
            let mut tap = locked(self.inner.tap.lock());
            match *tap {
                TapState::Idle => {
                    *tap = TapState::Armed(None);
                    true
                }
                TapState::Armed(_) => false,
            }
        };

        if arm {
            debug!("Share arming upstream subscription");
            self.inner.upstream.subscribe(ShareTap {
                inner: Arc::downgrade(&self.inner),
            });
        }
    }
}

/// The single internal subscriber attached to the upstream publisher.
struct ShareTap<P>
where
    P: Publisher,
{
    inner: Weak<ShareInner<P>>,
}

impl<P> Subscriber for ShareTap<P>
where
    P: Publisher + Send + Sync + 'static,
    P::Output: Clone + Send + 'static,
    P::Failure: Clone + Send + 'static,
{
    type Input = P::Output;
    type Failure = P::Failure;

    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
        let Some(inner) = self.inner.upgrade() else {
            subscription.cancel();
            return;
        };
        {
            let mut tap = locked(inner.tap.lock());
            match &mut *tap {
                // Disarmed while the upstream subscribe was in flight.
                TapState::Idle => {
                    subscription.cancel();
                    return;
                }
                TapState::Armed(slot) => *slot = Some(subscription.clone()),
            }
        }
        subscription.request(Demand::Unlimited);
    }

    fn on_value(&mut self, value: P::Output) -> Demand {
        if let Some(inner) = self.inner.upgrade() {
            inner.fanout.send(value);
        }
        // Upstream demand was established once as Unlimited.
        Demand::None
    }

    fn on_completion(&mut self, completion: Completion<P::Failure>) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        {
            let mut tap = locked(inner.tap.lock());
            *tap = TapState::Idle;
        }
        inner.fanout.send_completion(completion);
    }
}
