//! Race combinator: first successful future wins.
//!
//! # Semantics
//!
//! ```text
//! race_except([f0, f1, ..., fn], filter):
//!   for f in inputs, in order:
//!     match f.get():
//!       Ok(v)                      → return v; later inputs not forced
//!       Err(e) if filter matches e → skip, try the next input
//!       Err(e)                     → fail with e, terminating the race
//!   // every input failed with a matched error:
//!   return f0.get()   // re-signal the first input's failure
//! ```
//!
//! Filtering affects winner selection only, never final-failure reporting:
//! when every input fails with a matched error, the race surfaces the
//! *first* input's failure in original order, even though that failure was
//! nominally filtered. This gives a stable, reproducible diagnostic instead
//! of an arbitrary survivor.

use tracing::debug;

use crate::error::Error;
use crate::filter::ErrorFilter;
use crate::future::Future;

/// Builds a future resolving to the first input that succeeds.
///
/// Any input failure terminates the race; see [`race_except`] to skip
/// selected failure kinds. Forcing the result forces inputs in order until a
/// winner is found; construction forces nothing.
///
/// An empty input is a precondition violation: the returned future fails
/// with a [`Configuration`](crate::ErrorKind::Configuration) error.
///
/// # Example
///
/// ```
/// use deferral::{race, Future};
///
/// let winner = race([Future::resolved(7), Future::resolved(9)]);
/// assert_eq!(winner.get().unwrap(), 7);
/// ```
pub fn race<T>(futures: impl IntoIterator<Item = Future<T>>) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
{
    race_except(futures, ErrorFilter::None)
}

/// Builds a future resolving to the first input that either succeeds or
/// fails with an error not matched by `filter`.
///
/// Inputs failing with a matched error are skipped and the next is tried.
/// If every input fails with a matched error, the result re-signals the
/// first input's failure in original input order.
pub fn race_except<T>(
    futures: impl IntoIterator<Item = Future<T>>,
    filter: ErrorFilter,
) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();
    if futures.is_empty() {
        return Future::failed(Error::configuration("race requires at least one future"));
    }
    Future::deferred(move || {
        for future in &futures {
            match future.get() {
                Ok(value) => return Ok(value),
                Err(error) if filter.matches(&error) => {
                    debug!(%error, "skipping filtered failure");
                }
                Err(error) => return Err(error),
            }
        }
        // Every input failed with a filtered error; surface the first
        // input's memoized failure for a stable diagnostic.
        futures[0].get()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn first_success_wins() {
        let winner = race([Future::resolved(1), Future::resolved(2)]);
        assert_eq!(winner.get().expect("value"), 1);
    }

    #[test]
    fn later_inputs_are_not_forced_after_a_winner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loser = {
            let calls = Arc::clone(&calls);
            Future::deferred(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
        };

        let winner = race([Future::resolved(1), loser.clone()]);
        assert_eq!(winner.get().expect("value"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(loser.is_unresolved());
    }

    #[test]
    fn filtered_failure_is_skipped() {
        let winner = race_except(
            [
                Future::failed(Error::new(ErrorKind::NotFound)),
                Future::resolved(7),
            ],
            ErrorFilter::kind(ErrorKind::NotFound),
        );
        assert_eq!(winner.get().expect("value"), 7);
    }

    #[test]
    fn unmatched_failure_terminates_the_race() {
        let calls = Arc::new(AtomicUsize::new(0));
        let unreached = {
            let calls = Arc::clone(&calls);
            Future::deferred(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(9)
            })
        };

        let winner = race_except(
            [
                Future::failed(Error::new(ErrorKind::Unavailable).with_message("down")),
                unreached,
            ],
            ErrorFilter::kind(ErrorKind::NotFound),
        );

        let err = winner.get().expect_err("failure");
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.message(), Some("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn all_filtered_resignals_first_failure() {
        let winner: Future<i32> = race_except(
            [
                Future::failed(Error::new(ErrorKind::NotFound).with_message("first")),
                Future::failed(Error::new(ErrorKind::NotFound).with_message("second")),
            ],
            ErrorFilter::kind(ErrorKind::NotFound),
        );

        let err = winner.get().expect_err("failure");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), Some("first"));
    }

    #[test]
    fn all_filtered_failure_is_stable_across_calls() {
        let winner: Future<i32> = race_except(
            [
                Future::failed(Error::new(ErrorKind::NotFound).with_message("first")),
                Future::failed(Error::new(ErrorKind::NotFound).with_message("second")),
            ],
            ErrorFilter::kind(ErrorKind::NotFound),
        );

        let first = winner.get().expect_err("failure");
        let second = winner.get().expect_err("failure");
        assert_eq!(first.message(), Some("first"));
        assert_eq!(second.message(), Some("first"));
    }

    #[test]
    fn empty_input_is_a_configuration_error() {
        let winner = race(Vec::<Future<i32>>::new());
        let err = winner.get().expect_err("failure");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn construction_forces_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let input = {
            let calls = Arc::clone(&calls);
            Future::deferred(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
        };

        let winner = race([input]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(winner.get().expect("value"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
