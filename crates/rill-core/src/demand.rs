//! # Demand Algebra
//!
//! Backpressure credit for one subscription. Demand only grows through
//! `request` and through the value hook's return, and only shrinks one unit
//! at a time as values are delivered.

use crate::violation::{self, ProtocolViolation};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Backpressure credit requested by a subscriber.
///
/// Addition saturates: `None` is the identity, `Max` values saturate at
/// `u64::MAX`, and `Unlimited` absorbs everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// No outstanding demand. A producer must not emit.
    None,

    /// A finite number of values may still be delivered.
    ///
    /// Construct through [`Demand::max`], which normalizes zero to
    /// [`Demand::None`] so exhausted demand has a single representation.
    Max(u64),

    /// The subscriber accepts values without limit.
    Unlimited,
}

impl Demand {
    /// Finite demand for `n` values. `max(0)` normalizes to `None`.
    #[must_use]
    pub fn max(n: u64) -> Self {
        if n == 0 {
            Self::None
        } else {
            Self::Max(n)
        }
    }

    /// True when no value may currently be delivered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::None | Self::Max(0))
    }

    /// True for [`Demand::Unlimited`].
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Consume one unit for a delivered value.
    ///
    /// `Unlimited` is invariant under consumption. Consuming from exhausted
    /// demand is a contract violation: a producer checked (or should have
    /// checked) `is_exhausted` before emitting.
    pub fn consume_one(&mut self) {
        match self {
            Self::Unlimited => {}
            Self::Max(n) if *n > 1 => *n -= 1,
            Self::Max(n) if *n == 1 => *self = Self::None,
            _ => violation::fail(ProtocolViolation::DemandUnderflow),
        }
    }
}

impl Add for Demand {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Unlimited, _) | (_, Self::Unlimited) => Self::Unlimited,
            (Self::None, Self::None) => Self::None,
            // Through the normalizing constructor, so a literal `Max(0)`
            // operand cannot leak a second representation of exhaustion.
            (Self::None, Self::Max(n)) | (Self::Max(n), Self::None) => Self::max(n),
            (Self::Max(a), Self::Max(b)) => Self::max(a.saturating_add(b)),
        }
    }
}

impl AddAssign for Demand {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Max(n) => write!(f, "max({n})"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
