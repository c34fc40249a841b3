//! The deferred-value primitive.
//!
//! A [`Future`] stores a value, a captured failure, or a computation to be
//! run later. The computation runs at most once, on the calling context of
//! the first [`get`](Future::get); the outcome is memoized and every later
//! observer sees the same value or the same failure.
//!
//! # Semantics
//!
//! ```text
//! get():
//!   if settled: return memoized outcome
//!   claim the unresolved -> resolving transition (compare-and-set)
//!   winner: run the computation, store the outcome, wake waiters
//!   loser:  block until the winner settles, then read the outcome
//! ```
//!
//! The transition out of the unresolved state is irreversible. A computation
//! that panics still settles the cell (as a failure of kind
//! [`ErrorKind::Panicked`](crate::ErrorKind::Panicked)), so no call sequence
//! can run the computation twice.
//!
//! # Laziness
//!
//! Construction is cheap and effect-free. [`then`](Future::then) and the
//! aggregation combinators build new futures whose stored computation pulls
//! on existing ones, so chains are composed, not executed, until the
//! outermost `get`.
//!
//! # Concurrency
//!
//! There is no scheduler and no parallelism here: `get` either returns
//! immediately or runs the stored computation to completion synchronously.
//! Concurrent first access from several threads is safe; losers of the claim
//! race block until the winner settles. A computation that forces its own
//! future deadlocks on that claim.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// State values for the cell.
const UNRESOLVED: u8 = 0;
const RESOLVING: u8 = 1;
const SETTLED: u8 = 2;

/// A stored computation, run at most once.
type Compute<T> = Box<dyn FnOnce() -> Result<T> + Send>;

/// The observable state of a [`Future`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    /// Not yet forced; the stored computation has not completed.
    Unresolved,
    /// Settled with a value.
    Resolved,
    /// Settled with a captured failure.
    Failed,
}

struct Inner<T> {
    /// Current state (UNRESOLVED, RESOLVING, or SETTLED).
    state: AtomicU8,
    /// The computation, taken by the thread that claims the transition.
    compute: Mutex<Option<Compute<T>>>,
    /// The memoized outcome, set exactly once.
    outcome: OnceLock<Result<T>>,
    /// Wakes claim-race losers once the outcome is in place.
    settled: Condvar,
}

impl<T> Inner<T> {
    fn settled_with(outcome: Result<T>) -> Self {
        let inner = Self {
            state: AtomicU8::new(SETTLED),
            compute: Mutex::new(None),
            outcome: OnceLock::new(),
            settled: Condvar::new(),
        };
        let _ = inner.outcome.set(outcome);
        inner
    }
}

/// A single-assignment, lazily-evaluated container for a value, a captured
/// failure, or a pending computation.
///
/// Handles are cheap to clone and share one cell; forcing any handle forces
/// them all.
///
/// # Example
///
/// ```
/// use deferral::Future;
///
/// let future = Future::deferred(|| Ok("expensive".len()));
/// assert!(future.is_unresolved());
///
/// assert_eq!(future.get().unwrap(), 9);
/// assert!(future.is_resolved());
///
/// // Later calls return the memoized value without recomputation.
/// assert_eq!(future.get().unwrap(), 9);
/// ```
pub struct Future<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Future<T> {
    /// Creates a future already settled with a value.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Self {
            inner: Arc::new(Inner::settled_with(Ok(value))),
        }
    }

    /// Creates a future already settled with a failure.
    ///
    /// Every `get` re-signals the same failure: same kind, same message,
    /// same shared source.
    #[must_use]
    pub fn failed(error: Error) -> Self {
        Self {
            inner: Arc::new(Inner::settled_with(Err(error))),
        }
    }

    /// Creates a future that runs `compute` on first demand.
    ///
    /// Construction does not invoke `compute`; only the first `get` does.
    #[must_use]
    pub fn deferred<F>(compute: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self::from_compute(Box::new(compute))
    }

    fn from_compute(compute: Compute<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU8::new(UNRESOLVED),
                compute: Mutex::new(Some(compute)),
                outcome: OnceLock::new(),
                settled: Condvar::new(),
            }),
        }
    }

    /// Returns the observable state without forcing evaluation.
    #[must_use]
    pub fn state(&self) -> FutureState {
        if self.inner.state.load(Ordering::Acquire) != SETTLED {
            return FutureState::Unresolved;
        }
        match self.inner.outcome.get() {
            Some(Ok(_)) => FutureState::Resolved,
            Some(Err(_)) | None => FutureState::Failed,
        }
    }

    /// Returns true if the future has not yet settled.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.state() == FutureState::Unresolved
    }

    /// Returns true if the future settled with a value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state() == FutureState::Resolved
    }

    /// Returns true if the future settled with a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state() == FutureState::Failed
    }

    /// Returns the settled value without forcing evaluation.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        if self.inner.state.load(Ordering::Acquire) != SETTLED {
            return None;
        }
        match self.inner.outcome.get() {
            Some(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the captured failure without forcing evaluation.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        if self.inner.state.load(Ordering::Acquire) != SETTLED {
            return None;
        }
        match self.inner.outcome.get() {
            Some(Err(error)) => Some(error),
            _ => None,
        }
    }
}

impl<T: Clone> Future<T> {
    /// Returns the value, forcing evaluation if still unresolved.
    ///
    /// - Already resolved: returns the stored value, no recomputation.
    /// - Already failed: re-signals the stored failure, faithfully, on
    ///   every call.
    /// - Unresolved: runs the stored computation exactly once on this
    ///   thread, memoizes the outcome, and returns it. A panic in the
    ///   computation settles the future as failed with
    ///   [`ErrorKind::Panicked`](crate::ErrorKind::Panicked).
    ///
    /// Under concurrent first access the computation still runs at most
    /// once; threads that lose the claim block until it settles.
    ///
    /// # Deadlock
    ///
    /// A computation that calls `get` on its own future blocks forever.
    pub fn get(&self) -> Result<T> {
        if self.inner.state.load(Ordering::Acquire) == SETTLED {
            trace!("serving memoized outcome");
            return self.memoized();
        }

        match self.inner.state.compare_exchange(
            UNRESOLVED,
            RESOLVING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                // We claimed the transition; the computation slot is ours.
                let compute = self
                    .inner
                    .compute
                    .lock()
                    .take()
                    .expect("unresolved future missing its computation");

                let outcome = panic::catch_unwind(AssertUnwindSafe(compute))
                    .unwrap_or_else(|payload| Err(Error::from_panic(payload.as_ref())));
                debug!(ok = outcome.is_ok(), "future settled");

                let _ = self.inner.outcome.set(outcome);
                {
                    // Publish under the lock so a waiter cannot check the
                    // state between its test and its wait.
                    let _guard = self.inner.compute.lock();
                    self.inner.state.store(SETTLED, Ordering::Release);
                }
                self.inner.settled.notify_all();
                self.memoized()
            }
            Err(RESOLVING) => {
                // Another thread is running the computation; wait it out.
                self.wait_settled();
                self.memoized()
            }
            Err(_) => self.memoized(),
        }
    }

    fn wait_settled(&self) {
        let mut guard = self.inner.compute.lock();
        while self.inner.state.load(Ordering::Acquire) != SETTLED {
            self.inner.settled.wait(&mut guard);
        }
    }

    fn memoized(&self) -> Result<T> {
        match self
            .inner
            .outcome
            .get()
            .expect("settled future missing its outcome")
        {
            Ok(value) => Ok(value.clone()),
            Err(error) => Err(error.clone()),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// Returns a future that, when forced, forces the receiver and applies
    /// `on_value` to its value.
    ///
    /// A failure raised by `on_value` propagates unmodified. If the receiver
    /// fails, its failure is re-signaled unchanged (the default pass-through
    /// error handler); use [`then_or_else`](Self::then_or_else) to intercept
    /// it.
    ///
    /// Chaining is lazy: building the chained future does not touch the
    /// receiver.
    pub fn then<U, F>(&self, on_value: F) -> Future<U>
    where
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let receiver = self.clone();
        Future::deferred(move || receiver.get().and_then(on_value))
    }

    /// Like [`then`](Self::then), but with an explicit error handler.
    ///
    /// When forcing the receiver fails, `on_error` is called with the
    /// captured failure instead of `on_value`; its result settles the new
    /// future.
    pub fn then_or_else<U, F, H>(&self, on_value: F, on_error: H) -> Future<U>
    where
        F: FnOnce(T) -> Result<U> + Send + 'static,
        H: FnOnce(Error) -> Result<U> + Send + 'static,
    {
        let receiver = self.clone();
        Future::deferred(move || match receiver.get() {
            Ok(value) => on_value(value),
            Err(error) => on_error(error),
        })
    }

    /// Returns a future applying an infallible transform to the value.
    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.then(move |value| Ok(f(value)))
    }

    /// Returns a future that passes values through and hands failures to
    /// `on_error`.
    pub fn recover<H>(&self, on_error: H) -> Self
    where
        H: FnOnce(Error) -> Result<T> + Send + 'static,
    {
        self.then_or_else(Ok, on_error)
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Future");
        if self.inner.state.load(Ordering::Acquire) == SETTLED {
            match self.inner.outcome.get() {
                Some(Ok(value)) => d.field("value", value),
                Some(Err(error)) => d.field("error", error),
                None => d.field("state", &format_args!("<settling>")),
            };
        } else {
            d.field("state", &format_args!("<unresolved>"));
        }
        d.finish()
    }
}

/// Builder for dynamic construction from exactly one of a value, an error,
/// or a computation.
///
/// The three static constructors ([`Future::resolved`], [`Future::failed`],
/// [`Future::deferred`]) cover call sites that know their source at compile
/// time. The builder exists for the dynamic case and enforces the
/// exactly-one contract: [`build`](Self::build) fails with a
/// [`Configuration`](crate::ErrorKind::Configuration) error when zero or
/// more than one source was supplied.
///
/// # Example
///
/// ```
/// use deferral::FutureBuilder;
///
/// let future = FutureBuilder::new().value(42).build().unwrap();
/// assert_eq!(future.get().unwrap(), 42);
///
/// let err = FutureBuilder::<i32>::new().build().unwrap_err();
/// assert!(err.is_configuration());
/// ```
pub struct FutureBuilder<T> {
    value: Option<T>,
    error: Option<Error>,
    compute: Option<Compute<T>>,
}

impl<T> FutureBuilder<T> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: None,
            error: None,
            compute: None,
        }
    }

    /// Supplies an already-resolved value.
    #[must_use]
    pub fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    /// Supplies an already-captured failure.
    #[must_use]
    pub fn error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Supplies a deferred computation.
    #[must_use]
    pub fn compute<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.compute = Some(Box::new(f));
        self
    }

    /// Builds the future.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error unless exactly one of value, error,
    /// or computation was supplied.
    pub fn build(self) -> Result<Future<T>> {
        let supplied = usize::from(self.value.is_some())
            + usize::from(self.error.is_some())
            + usize::from(self.compute.is_some());
        match supplied {
            0 => Err(Error::configuration(
                "future requires a value, an error, or a computation",
            )),
            1 => {
                if let Some(value) = self.value {
                    Ok(Future::resolved(value))
                } else if let Some(error) = self.error {
                    Ok(Future::failed(error))
                } else {
                    let compute = self.compute.expect("one source supplied");
                    Ok(Future::from_compute(compute))
                }
            }
            _ => Err(Error::configuration(
                "future accepts exactly one of value, error, or computation",
            )),
        }
    }
}

impl<T> Default for FutureBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FutureBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureBuilder")
            .field("value", &self.value.is_some())
            .field("error", &self.error.is_some())
            .field("compute", &self.compute.is_some())
            .finish()
    }
}
