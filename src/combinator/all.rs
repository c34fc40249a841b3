//! All combinator: resolve every future, collecting values in order.
//!
//! # Semantics
//!
//! ```text
//! all_except([f0, f1, ..., fn], filter):
//!   resolved ← []
//!   for f in inputs, in order:
//!     match f.get():
//!       Ok(v)                      → resolved.push(v)
//!       Err(e) if filter matches e → skip (contributes nothing)
//!       Err(e)                     → fail with e; later inputs not forced
//!   return resolved
//! ```
//!
//! Filtered failures shrink the result: the output length may be less than
//! the input count. The surfaced failure, when there is one, is always the
//! first unmatched failure in iteration order.

use tracing::debug;

use crate::filter::ErrorFilter;
use crate::future::Future;

/// Builds a future resolving to the values of every input, in input order.
///
/// Any input failure propagates; see [`all_except`] to swallow selected
/// failure kinds. Forcing the result forces the inputs; construction forces
/// nothing.
///
/// # Example
///
/// ```
/// use deferral::{all, Future};
///
/// let joined = all([Future::resolved(1), Future::resolved(2), Future::resolved(3)]);
/// assert_eq!(joined.get().unwrap(), vec![1, 2, 3]);
/// ```
pub fn all<T>(futures: impl IntoIterator<Item = Future<T>>) -> Future<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    all_except(futures, ErrorFilter::None)
}

/// Builds a future resolving to the values of every input whose failure is
/// not matched by `filter`.
///
/// Inputs failing with a matched error contribute nothing to the result. An
/// unmatched failure propagates immediately and the remaining inputs are
/// never forced.
pub fn all_except<T>(
    futures: impl IntoIterator<Item = Future<T>>,
    filter: ErrorFilter,
) -> Future<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();
    Future::deferred(move || {
        let mut resolved = Vec::with_capacity(futures.len());
        for future in &futures {
            match future.get() {
                Ok(value) => resolved.push(value),
                Err(error) if filter.matches(&error) => {
                    debug!(%error, "swallowing filtered failure");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(resolved)
    })
}
