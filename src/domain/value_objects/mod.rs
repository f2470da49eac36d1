//! Value Objects
//!
//! Immutable types without identity.

mod role;

pub use role::{Actor, Policy, Role};
