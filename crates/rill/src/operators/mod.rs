//! # Transformation Operators
//!
//! Cold operators: each `subscribe` builds an independent upstream
//! subscription through an intermediate subscriber. Both operators hand
//! the upstream subscription handle straight to the downstream subscriber,
//! so `request` and `cancel` forward upstream unchanged and completion
//! forwards downstream unchanged.

mod filter;
mod map;

pub use filter::Filter;
pub use map::Map;
