//! # Completion Event
//!
//! The single terminal event of a subscription: either the publisher
//! finished normally or it failed with an error. At most one completion
//! ever flows per subscription; after it, the subscription is terminal.

use std::fmt;

/// Terminal event delivered to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion<E> {
    /// The publisher finished normally; no more values will be delivered.
    Finished,

    /// The publisher failed; no more values will be delivered.
    Failure(E),
}

impl<E> Completion<E> {
    /// True for [`Completion::Finished`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// True for [`Completion::Failure`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The carried failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&E> {
        match self {
            Self::Finished => None,
            Self::Failure(e) => Some(e),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Completion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "finished"),
            Self::Failure(e) => write!(f, "failure({e})"),
        }
    }
}
