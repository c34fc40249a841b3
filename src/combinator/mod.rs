//! Aggregation combinators over collections of futures.
//!
//! Both combinators build a new [`Future`](crate::Future) whose deferred
//! computation drives the inputs in their given order; nothing is forced
//! until the result itself is forced.
//!
//! - [`all`] / [`all_except`]: resolve every input, collecting values in
//!   input order; failures matched by the filter are swallowed, any other
//!   failure aborts the aggregation.
//! - [`race`] / [`race_except`]: return the first input that resolves
//!   successfully; failures matched by the filter are skipped, any other
//!   failure terminates the race.

pub mod all;
pub mod race;

pub use all::{all, all_except};
pub use race::{race, race_except};
