//! # Rill Core - Reactive Publish/Subscribe Protocol
//!
//! Defines the protocol layer of Rill: the demand algebra, the terminal
//! completion event, the publisher/subscriber/subscription capability traits,
//! and scope-triggered cancellation tokens.
//!
//! ## Protocol
//!
//! ```text
//! ┌──────────────┐                         ┌──────────────┐
//! │  Publisher   │                         │  Subscriber  │
//! │              │ ── on_subscribe(sub) ─→ │              │
//! │              │ ←──── request(d) ────── │              │
//! │              │ ── on_value(v) ───────→ │ (returns     │
//! │              │ ←─ returned Demand ──── │  extra       │
//! │              │ ── on_completion(c) ──→ │  demand)     │
//! └──────────────┘                         └──────────────┘
//! ```
//!
//! A subscriber attaches to a publisher; the publisher constructs a
//! subscription and hands it over via `on_subscribe`. The subscriber calls
//! `request` any number of times; the publisher emits values only while
//! outstanding demand is positive, each delivery consuming one unit and
//! adding back whatever demand the value hook returns. Exactly one
//! completion event (or a cancellation) ends the subscription.
//!
//! ## Contract Violations
//!
//! Emitting with zero demand, consuming demand below zero, or delivering
//! anything on a terminal subscription is a core-protocol bug, not a
//! data-level error. These fail fast through [`violation::fail`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod cancellable;
pub mod completion;
pub mod demand;
pub mod publisher;
pub mod subscriber;
pub mod subscription;
pub mod violation;

// Re-export main types
pub use cancellable::Cancellable;
pub use completion::Completion;
pub use demand::Demand;
pub use publisher::{Publisher, Subject};
pub use subscriber::Subscriber;
pub use subscription::{Subscription, SubscriptionHandle, SubscriptionId};
pub use violation::ProtocolViolation;
