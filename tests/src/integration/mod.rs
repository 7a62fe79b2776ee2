//! # Integration Tests
//!
//! Cross-crate scenarios exercising the subscription/demand protocol
//! through real pipelines.

pub mod multicast;
pub mod pipelines;

#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use rill_core::{Completion, Demand, Subscriber, SubscriptionHandle};
#[cfg(test)]
use std::sync::Arc;

/// Install a fmt subscriber once so `RUST_LOG=debug` surfaces the
/// library's lifecycle logs during test runs.
#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test subscriber recording everything it observes, with an injectable
/// demand policy and a shared handle slot for driving requests externally.
#[cfg(test)]
pub(crate) struct Probe<T, E> {
    pub values: Arc<Mutex<Vec<T>>>,
    pub completions: Arc<Mutex<Vec<Completion<E>>>>,
    pub handle: Arc<Mutex<Option<SubscriptionHandle>>>,
    pub initial: Demand,
    pub per_value: Demand,
}

#[cfg(test)]
impl<T, E> Probe<T, E> {
    pub fn new(initial: Demand, per_value: Demand) -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            completions: Arc::new(Mutex::new(Vec::new())),
            handle: Arc::new(Mutex::new(None)),
            initial,
            per_value,
        }
    }

    pub fn handle(&self) -> Arc<Mutex<Option<SubscriptionHandle>>> {
        self.handle.clone()
    }
}

#[cfg(test)]
impl<T, E> Subscriber for Probe<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Input = T;
    type Failure = E;

    fn on_subscribe(&mut self, subscription: SubscriptionHandle) {
        subscription.request(self.initial);
        *self.handle.lock() = Some(subscription);
    }

    fn on_value(&mut self, value: T) -> Demand {
        self.values.lock().push(value);
        self.per_value
    }

    fn on_completion(&mut self, completion: Completion<E>) {
        self.completions.lock().push(completion);
    }
}
