//! # Cancellation Tokens
//!
//! A [`Cancellable`] is the externally visible "this subscription is alive"
//! token. Dropping it cancels the underlying subscription exactly once,
//! synchronously; storing tokens in a collection and dropping the
//! collection cancels all of them.

use crate::subscription::SubscriptionHandle;
use std::sync::Mutex;
use tracing::debug;

type CancelFn = Box<dyn FnOnce() + Send>;

/// Scope-triggered cancellation token.
///
/// Cancellation runs on every exit path, including early return and panic
/// unwinding, and never runs twice.
pub struct Cancellable {
    action: Mutex<Option<CancelFn>>,
}

impl Cancellable {
    /// Token running an arbitrary teardown action once.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Token cancelling `handle` once.
    #[must_use]
    pub fn from_handle(handle: SubscriptionHandle) -> Self {
        Self::new(move || {
            debug!(subscription_id = %handle.id(), "Subscription cancelled by token");
            handle.cancel();
        })
    }

    /// Cancel now instead of at drop time. Idempotent.
    pub fn cancel(&self) {
        let action = match self.action.lock() {
            Ok(mut slot) => slot.take(),
            // Poisoned during unwind: the action either ran or is lost with
            // the panicking thread; nothing safe left to do.
            Err(_) => None,
        };
        if let Some(action) = action {
            action();
        }
    }

    /// Move this token into `bag`, tying the subscription's lifetime to it.
    pub fn store(self, bag: &mut Vec<Cancellable>) {
        bag.push(self);
    }
}

impl Drop for Cancellable {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self
            .action
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("Cancellable").field("live", &live).finish()
    }
}
