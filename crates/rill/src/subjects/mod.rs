//! # Subjects
//!
//! Hot, externally pushable multicast publishers. Any producer code may
//! call `send`/`send_completion`; every registered subscriber with
//! outstanding demand receives each value. Subjects never buffer: a
//! subscriber whose demand is exhausted misses that value.

mod current_value;
mod passthrough;

pub use current_value::CurrentValueSubject;
pub use passthrough::PassthroughSubject;
