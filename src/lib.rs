//! Deferral: lazily-evaluated, memoizing deferred values.
//!
//! # Overview
//!
//! A [`Future`] represents a computation that is either already settled (to
//! a value or a captured failure) or will be settled on first demand by
//! invoking a stored computation exactly once, with the outcome cached for
//! all subsequent observers. There is no scheduler: resolution is
//! synchronous and happens on the calling context the first time the value
//! is requested.
//!
//! # Core Guarantees
//!
//! - **Exactly-once evaluation**: the stored computation runs at most once,
//!   even under concurrent first access from several threads
//! - **Permanent memoization**: once settled, a future never changes state;
//!   every `get` returns the same value or re-signals the same failure
//! - **Faithful failure re-signaling**: a memoized failure carries the same
//!   kind, message, and shared source on every access
//! - **Lazy composition**: [`then`](Future::then) and the aggregation
//!   combinators build futures without forcing anything; chains execute
//!   only when the outermost result is forced
//!
//! # Module Structure
//!
//! - [`future`]: the core primitive ([`Future`], [`FutureBuilder`])
//! - [`combinator`]: ordered aggregation ([`all`]) and first-winner
//!   selection ([`race`]) with selective failure suppression
//! - [`filter`]: failure filters for the combinators ([`ErrorFilter`])
//! - [`error`]: error types ([`Error`], [`ErrorKind`])
//!
//! # Example
//!
//! ```
//! use deferral::{all, Future};
//!
//! let parsed = Future::deferred(|| Ok("21".parse::<u32>().unwrap()));
//! let doubled = parsed.then(|n| Ok(n * 2));
//!
//! // Nothing has run yet; forcing the chain runs the parse once.
//! assert!(parsed.is_unresolved());
//! assert_eq!(doubled.get().unwrap(), 42);
//!
//! let joined = all([Future::resolved(1), Future::resolved(2)]);
//! assert_eq!(joined.get().unwrap(), vec![1, 2]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod error;
pub mod filter;
pub mod future;

pub use combinator::{all, all_except, race, race_except};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use filter::ErrorFilter;
pub use future::{Future, FutureBuilder, FutureState};
