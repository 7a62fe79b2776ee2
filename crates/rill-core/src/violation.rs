//! # Protocol Contract Violations
//!
//! Violations of the demand protocol are core bugs, never data-level errors:
//! a correct publisher cannot produce them. They fail fast through a single
//! panic site instead of being silently swallowed.

use thiserror::Error;

/// A violation of the subscription/demand contract.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// One unit of demand was consumed with none outstanding.
    #[error("demand underflow: value emitted with no outstanding demand")]
    DemandUnderflow,

    /// A producer attempted to emit without checking outstanding demand.
    #[error("emit without demand: producer did not honor backpressure")]
    EmitWithoutDemand,

    /// A value or completion was delivered on a terminal subscription.
    #[error("delivery after terminal: subscription already completed or cancelled")]
    DeliveryAfterTerminal,

    /// A protocol lock was poisoned by a panicking hook.
    #[error("lock poisoned: a subscriber hook panicked while the protocol state was held")]
    LockPoisoned,
}

/// Fail fast on a contract violation.
///
/// The caller location is preserved so the panic points at the producer that
/// broke the contract, not at this function.
#[track_caller]
pub fn fail(violation: ProtocolViolation) -> ! {
    panic!("protocol violation: {violation}");
}

/// Unwrap a std lock acquisition, failing fast on poisoning.
///
/// A poisoned protocol lock means a subscriber hook panicked mid-delivery;
/// continuing would hand out corrupted demand accounting.
#[track_caller]
pub fn locked<T>(result: Result<T, std::sync::PoisonError<T>>) -> T {
    result.unwrap_or_else(|_| fail(ProtocolViolation::LockPoisoned))
}
