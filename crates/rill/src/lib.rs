//! # Rill - Reactive Publish/Subscribe Pipelines
//!
//! The pipeline layer over [`rill_core`]: hot multicast subjects, cold
//! transformation operators, cold-to-hot sharing, a demand-honoring
//! sequence source, and the sink consumer surface.
//!
//! ## Topology
//!
//! ```text
//! Sequence ──→ Map ──→ Filter ──→ Share ──┬──→ Sink
//!   (cold)    (cold)   (cold)     (hot)   ├──→ Sink
//!                                         └──→ Sink
//!
//! PassthroughSubject / CurrentValueSubject ──→ fan-out ──→ subscribers
//!   (hot, externally pushable)
//! ```
//!
//! Cold stages build independent upstream state per subscriber; hot stages
//! hold one shared state and fan values out to every registered subscriber
//! with outstanding demand. Delivery is synchronous and re-entrant: values
//! are delivered on the producing thread, and the demand a value hook
//! returns is applied before the producing call returns.
//!
//! ## Backpressure Policy
//!
//! Hot nodes never buffer and never block the producer: a subscriber whose
//! demand is exhausted at delivery time misses that value (documented lossy
//! behavior). The [`Sequence`] source is the non-lossy counterpart: it
//! pauses when demand runs out and resumes on the next request.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub(crate) mod fanout;

pub mod ext;
pub mod operators;
pub mod sequence;
pub mod share;
pub mod sink;
pub mod subjects;

// Protocol layer
pub use rill_core::{
    Cancellable, Completion, Demand, ProtocolViolation, Publisher, Subject, Subscriber,
    Subscription, SubscriptionHandle, SubscriptionId,
};

// Re-export main types
pub use ext::PublisherExt;
pub use operators::{Filter, Map};
pub use sequence::Sequence;
pub use share::Share;
pub use sink::Sink;
pub use subjects::{CurrentValueSubject, PassthroughSubject};
