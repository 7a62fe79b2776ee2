//! # Multicast Fan-Out Engine
//!
//! Shared machinery behind every hot node (subjects and share): a
//! uuid-keyed subscriber registry with per-subscription demand accounting,
//! a trampolined delivery queue that serializes sends per node, and a
//! terminal latch that makes completion one-shot.
//!
//! ## Serialization
//!
//! All `send`/`send_completion` fan-out goes through the node's delivery
//! queue: the first thread to arrive drains it iteratively, any re-entrant
//! or concurrent send only enqueues. No subscriber observes interleaved
//! values from two sends, and a value hook that pushes back into the same
//! node extends the active drain instead of recursing.
//!
//! Registration is serialized on the same queue lock, and every broadcast
//! carries the queue clock reading from its enqueue. An entry only accepts
//! broadcasts stamped after its registration, so a subscriber racing a
//! concurrent send sees that value at most once — through its seed replay
//! or through the fan-out, never both.
//!
//! ## Re-entrancy
//!
//! Fan-out iterates a snapshot of the registry and holds no registry lock
//! while a subscriber hook runs, so hooks may re-enter `request`, `cancel`,
//! or `subscribe` freely. Per-entry state is locked only around the demand
//! check-and-consume, never across the hook.

use rill_core::violation::locked;
use rill_core::{
    Completion, Demand, Subscriber, Subscription, SubscriptionHandle, SubscriptionId,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock, Weak};
use tracing::{debug, warn};

/// Lifecycle of one registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Cancelled,
    Completed,
}

struct EntryState {
    demand: Demand,
    phase: Phase,
    /// Queue clock reading at registration. Broadcasts stamped earlier
    /// never reach this entry; `u64::MAX` until registered.
    birth: u64,
}

/// One registered subscriber and its demand accounting.
struct Entry<T, E> {
    id: SubscriptionId,
    state: Mutex<EntryState>,
    subscriber: Mutex<Box<dyn Subscriber<Input = T, Failure = E>>>,
}

impl<T, E> Entry<T, E> {
    fn new(subscriber: Box<dyn Subscriber<Input = T, Failure = E>>) -> Self {
        Self {
            id: SubscriptionId::new(),
            state: Mutex::new(EntryState {
                demand: Demand::None,
                phase: Phase::Active,
                birth: u64::MAX,
            }),
            subscriber: Mutex::new(subscriber),
        }
    }

    /// Deliver a broadcast value if this entry was registered before the
    /// broadcast was enqueued, is active, and has demand.
    fn deliver(&self, value: T, stamp: u64) {
        {
            let mut state = locked(self.state.lock());
            if state.phase != Phase::Active || state.birth > stamp {
                return;
            }
            if state.demand.is_exhausted() {
                debug!(subscription_id = %self.id, "Value dropped (demand exhausted)");
                return;
            }
            state.demand.consume_one();
        }
        self.emit(value);
    }

    /// Deliver a value aimed at this entry alone (seed replay).
    fn deliver_direct(&self, value: T) {
        {
            let mut state = locked(self.state.lock());
            if state.phase != Phase::Active {
                return;
            }
            if state.demand.is_exhausted() {
                debug!(subscription_id = %self.id, "Value dropped (demand exhausted)");
                return;
            }
            state.demand.consume_one();
        }
        self.emit(value);
    }

    /// Run the value hook outside the state lock, so the hook may re-enter
    /// `request` or `cancel`; the demand it returns is applied afterwards,
    /// unless the entry went terminal in between.
    fn emit(&self, value: T) {
        let extra = locked(self.subscriber.lock()).on_value(value);
        let mut state = locked(self.state.lock());
        if state.phase == Phase::Active {
            state.demand += extra;
        }
    }

    /// Deliver the terminal completion once; later calls are no-ops.
    fn complete(&self, completion: Completion<E>) {
        {
            let mut state = locked(self.state.lock());
            if state.phase != Phase::Active {
                return;
            }
            state.phase = Phase::Completed;
        }
        locked(self.subscriber.lock()).on_completion(completion);
    }
}

enum Action<T, E> {
    /// Broadcast to every entry registered before `stamp`.
    Value { value: T, stamp: u64 },
    /// Seed replay for one just-registered subscriber.
    Replay { id: SubscriptionId, value: T },
    Complete(Completion<E>),
}

struct DeliveryQueue<T, E> {
    actions: VecDeque<Action<T, E>>,
    draining: bool,
    /// Monotonic counter ordering broadcasts against registrations.
    clock: u64,
}

/// Result of registering a subscriber with a hot node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubscribeOutcome {
    /// Registered; the entry is live in the registry.
    Registered,
    /// The subscriber cancelled synchronously inside `on_subscribe` and
    /// was never registered.
    Cancelled,
    /// The node was already terminal; the subscriber has been handed the
    /// stored completion and was never registered.
    Terminal,
}

enum Registration<E> {
    Terminal(Completion<E>),
    Cancelled,
    Live,
}

/// Hot multicast node state shared by subjects and share.
pub(crate) struct Fanout<T, E> {
    registry: RwLock<HashMap<SubscriptionId, Arc<Entry<T, E>>>>,
    queue: Mutex<DeliveryQueue<T, E>>,
    terminal: Mutex<Option<Completion<E>>>,
    /// Invoked after a cancellation empties the registry (share teardown).
    empty_hook: Mutex<Option<Box<dyn Fn() + Send>>>,
}

impl<T, E> Fanout<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            queue: Mutex::new(DeliveryQueue {
                actions: VecDeque::new(),
                draining: false,
                clock: 0,
            }),
            terminal: Mutex::new(None),
            empty_hook: Mutex::new(None),
        }
    }

    /// Register the teardown hook run when the last subscriber cancels.
    pub(crate) fn set_empty_hook(&self, hook: impl Fn() + Send + 'static) {
        *locked(self.empty_hook.lock()) = Some(Box::new(hook));
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        locked(self.registry.read()).len()
    }

    pub(crate) fn is_terminal(&self) -> bool {
        locked(self.terminal.lock()).is_some()
    }

    /// Register `subscriber` and hand it its subscription.
    ///
    /// If the node is already terminal the subscriber still receives its
    /// subscription, then immediately the stored completion and no values.
    pub(crate) fn subscribe<S>(self: &Arc<Self>, subscriber: S) -> SubscribeOutcome
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        self.register(subscriber, None::<fn() -> T>)
    }

    /// Register `subscriber` and queue a replay of `seed()` for it, as one
    /// serialized step on the delivery queue.
    ///
    /// The seed is read under the queue lock, so a send racing this call
    /// either lands before the registration (and becomes the seed) or after
    /// it (and arrives as a broadcast after the seed) — never both.
    pub(crate) fn subscribe_with_replay<S, F>(
        self: &Arc<Self>,
        subscriber: S,
        seed: F,
    ) -> SubscribeOutcome
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
        F: FnOnce() -> T,
    {
        self.register(subscriber, Some(seed))
    }

    fn register<S, F>(self: &Arc<Self>, subscriber: S, replay: Option<F>) -> SubscribeOutcome
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
        F: FnOnce() -> T,
    {
        let entry = Arc::new(Entry::new(Box::new(subscriber)));
        // The handle points at the entry itself, so demand requested inside
        // on_subscribe lands before the entry is visible to any fan-out.
        let handle = SubscriptionHandle::new(Arc::new(FanoutSubscription {
            id: entry.id,
            entry: Arc::downgrade(&entry),
            node: Arc::downgrade(self),
        }));

        locked(entry.subscriber.lock()).on_subscribe(handle);

        let (registration, run) = {
            // Lock order: queue, then terminal, then entry state, then
            // registry.
            let mut queue = locked(self.queue.lock());
            let terminal = locked(self.terminal.lock());
            match terminal.clone() {
                Some(completion) => (Registration::Terminal(completion), false),
                None => {
                    let mut state = locked(entry.state.lock());
                    // on_subscribe may have cancelled synchronously.
                    if state.phase != Phase::Active {
                        (Registration::Cancelled, false)
                    } else {
                        queue.clock += 1;
                        state.birth = queue.clock;
                        drop(state);
                        locked(self.registry.write()).insert(entry.id, entry.clone());

                        let mut run = false;
                        if let Some(seed) = replay {
                            queue.actions.push_back(Action::Replay {
                                id: entry.id,
                                value: seed(),
                            });
                            if !queue.draining {
                                queue.draining = true;
                                run = true;
                            }
                        }
                        (Registration::Live, run)
                    }
                }
            }
        };

        match registration {
            Registration::Terminal(completion) => {
                debug!(subscription_id = %entry.id, "Subscriber joined terminal node");
                entry.complete(completion);
                SubscribeOutcome::Terminal
            }
            Registration::Cancelled => {
                debug!(subscription_id = %entry.id, "Subscriber cancelled during attach");
                SubscribeOutcome::Cancelled
            }
            Registration::Live => {
                if run {
                    self.drain();
                }
                debug!(subscription_id = %entry.id, "New subscription registered");
                SubscribeOutcome::Registered
            }
        }
    }

    /// Fan one value out to every registered subscriber with demand.
    pub(crate) fn send(&self, value: T) {
        self.send_with(value, || {});
    }

    /// Fan `value` out; `store` runs under the delivery-queue lock before
    /// the value is enqueued, letting callers update replay state
    /// atomically with the broadcast.
    pub(crate) fn send_with(&self, value: T, store: impl FnOnce()) {
        let run = {
            let mut queue = locked(self.queue.lock());
            store();
            queue.clock += 1;
            let stamp = queue.clock;
            queue.actions.push_back(Action::Value { value, stamp });
            if queue.draining {
                false
            } else {
                queue.draining = true;
                true
            }
        };
        if run {
            self.drain();
        }
    }

    /// Broadcast the terminal completion and clear the registry.
    pub(crate) fn send_completion(&self, completion: Completion<E>) {
        let run = {
            let mut queue = locked(self.queue.lock());
            queue.actions.push_back(Action::Complete(completion));
            if queue.draining {
                false
            } else {
                queue.draining = true;
                true
            }
        };
        if run {
            self.drain();
        }
    }

    /// Flat drain loop: a hook that sends into this node again extends the
    /// current drain rather than growing the stack.
    fn drain(&self) {
        loop {
            let action = {
                let mut queue = locked(self.queue.lock());
                match queue.actions.pop_front() {
                    Some(action) => action,
                    None => {
                        queue.draining = false;
                        return;
                    }
                }
            };
            match action {
                Action::Value { value, stamp } => self.fan_out(value, stamp),
                Action::Replay { id, value } => self.replay(id, value),
                Action::Complete(completion) => self.complete(completion),
            }
        }
    }

    fn fan_out(&self, value: T, stamp: u64) {
        if self.is_terminal() {
            debug!("Value dropped (node already terminal)");
            return;
        }

        // Snapshot: hooks may cancel or subscribe mid-iteration without
        // corrupting the registry walk.
        let entries: Vec<Arc<Entry<T, E>>> =
            locked(self.registry.read()).values().cloned().collect();

        if entries.is_empty() {
            warn!("Value dropped (no subscribers)");
            return;
        }

        for entry in entries {
            entry.deliver(value.clone(), stamp);
        }
    }

    fn replay(&self, id: SubscriptionId, value: T) {
        // Gone from the registry means cancelled or completed in between.
        let entry = locked(self.registry.read()).get(&id).cloned();
        if let Some(entry) = entry {
            entry.deliver_direct(value);
        }
    }

    fn complete(&self, completion: Completion<E>) {
        {
            let mut terminal = locked(self.terminal.lock());
            if terminal.is_some() {
                debug!("Completion ignored (node already terminal)");
                return;
            }
            *terminal = Some(completion.clone());
        }

        let entries: Vec<Arc<Entry<T, E>>> = locked(self.registry.write())
            .drain()
            .map(|(_, entry)| entry)
            .collect();

        debug!(subscribers = entries.len(), completion = %DisplayKind(&completion), "Node completed");
        for entry in entries {
            entry.complete(completion.clone());
        }
    }

    fn remove(&self, id: SubscriptionId) {
        locked(self.registry.write()).remove(&id);
    }

    fn notify_if_empty(&self) {
        if self.subscriber_count() > 0 {
            return;
        }
        let hook = locked(self.empty_hook.lock());
        if let Some(hook) = hook.as_ref() {
            hook();
        }
    }
}

/// Completion kind without requiring `E: Display`.
struct DisplayKind<'a, E>(&'a Completion<E>);

impl<E> std::fmt::Display for DisplayKind<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Completion::Finished => write!(f, "finished"),
            Completion::Failure(_) => write!(f, "failure"),
        }
    }
}

/// Subscriber-held side of one fan-out registration.
struct FanoutSubscription<T, E> {
    id: SubscriptionId,
    entry: Weak<Entry<T, E>>,
    node: Weak<Fanout<T, E>>,
}

impl<T, E> Subscription for FanoutSubscription<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn request(&self, demand: Demand) {
        if demand == Demand::None {
            return;
        }
        let Some(entry) = self.entry.upgrade() else {
            return;
        };
        let mut state = locked(entry.state.lock());
        if state.phase == Phase::Active {
            state.demand += demand;
        }
    }

    fn cancel(&self) {
        let Some(entry) = self.entry.upgrade() else {
            return;
        };
        {
            let mut state = locked(entry.state.lock());
            if state.phase != Phase::Active {
                // Already cancelled or completed.
                return;
            }
            state.phase = Phase::Cancelled;
        }
        debug!(subscription_id = %self.id, "Subscription cancelled");
        if let Some(node) = self.node.upgrade() {
            node.remove(self.id);
            node.notify_if_empty();
        }
    }

    fn id(&self) -> SubscriptionId {
        self.id
    }
}
