//! Error types and error handling strategy for deferral.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - A memoized failure re-signals identically on every access: `Error` is
//!   cheap to clone and clones share the source chain, so the kind, message,
//!   and source identity observed on the tenth `get` are the same as on the
//!   first
//! - Panics inside supplied computations are isolated and converted to
//!   [`ErrorKind::Panicked`] rather than poisoning the cell
//!
//! # Error Categories
//!
//! - **Configuration**: a construction contract was violated (a future built
//!   with zero or multiple sources, a race over an empty input). Fatal at
//!   construction, never recovered internally.
//! - **Computation**: a supplied computation or continuation failed.
//! - Caller-assignable kinds ([`ErrorKind::NotFound`],
//!   [`ErrorKind::Unavailable`], [`ErrorKind::Timeout`]) exist so that
//!   [`ErrorFilter::Kind`](crate::ErrorFilter) has concrete kinds to match
//!   when collaborators classify their failures.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A future or combinator was constructed in violation of its contract.
    Configuration,
    /// A supplied computation or continuation failed.
    Computation,
    /// A supplied computation panicked.
    Panicked,
    /// A requested resource does not exist (caller-assignable).
    NotFound,
    /// A collaborator is temporarily unavailable (caller-assignable).
    Unavailable,
    /// A collaborator operation timed out (caller-assignable).
    Timeout,
}

impl ErrorKind {
    /// Returns a human-readable name for the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration",
            Self::Computation => "Computation",
            Self::Panicked => "Panicked",
            Self::NotFound => "NotFound",
            Self::Unavailable => "Unavailable",
            Self::Timeout => "Timeout",
        }
    }
}

/// The main error type for deferral operations.
///
/// Cloning is cheap: the source chain is shared behind an `Arc`, which is
/// what lets a failed future hand out the same failure identity to every
/// observer.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<Arc<str>>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(Arc::from(msg.into()));
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true if this error is a construction contract violation.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration)
    }

    /// Returns true if this error came from a panicking computation.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self.kind, ErrorKind::Panicked)
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(detail)
    }

    /// Creates a computation error.
    #[must_use]
    pub fn computation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Computation).with_message(detail)
    }

    /// Creates an error from a caught panic payload.
    ///
    /// Extracts the conventional `&str` / `String` panic messages; anything
    /// else is reported as an opaque payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload.downcast_ref::<&str>().map_or_else(
            || {
                payload
                    .downcast_ref::<String>()
                    .map_or("opaque panic payload", String::as_str)
            },
            |s| *s,
        );
        Self::new(ErrorKind::Panicked).with_message(message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Attach a context message on error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
    /// Attach a context message computed lazily on error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_message(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_message(f()))
    }
}

/// A specialized Result type for deferral operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Underlying;

    impl fmt::Display for Underlying {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "underlying")
        }
    }

    impl std::error::Error for Underlying {}

    #[test]
    fn display_without_message() {
        let err = Error::new(ErrorKind::Computation);
        assert_eq!(err.to_string(), "Computation");
    }

    #[test]
    fn display_with_message() {
        let err = Error::new(ErrorKind::NotFound).with_message("no such entry");
        assert_eq!(err.to_string(), "NotFound: no such entry");
    }

    #[test]
    fn source_chain_is_exposed() {
        let err = Error::computation("outer").with_source(Underlying);
        let source = err.source().expect("source missing");
        assert_eq!(source.to_string(), "underlying");
    }

    #[test]
    fn clone_preserves_identity() {
        let err = Error::new(ErrorKind::Unavailable)
            .with_message("backend down")
            .with_source(Underlying);
        let clone = err.clone();

        assert_eq!(clone.kind(), err.kind());
        assert_eq!(clone.message(), err.message());
    }

    #[test]
    fn predicates_match_kind() {
        assert!(Error::configuration("bad").is_configuration());
        assert!(!Error::configuration("bad").is_panic());
        assert!(Error::from_panic(&"boom").is_panic());
    }

    #[test]
    fn from_panic_extracts_str_and_string() {
        let from_str = Error::from_panic(&"boom");
        assert_eq!(from_str.message(), Some("boom"));

        let from_string = Error::from_panic(&("dynamic ".to_owned() + "boom"));
        assert_eq!(from_string.message(), Some("dynamic boom"));

        let from_other = Error::from_panic(&42_u32);
        assert_eq!(from_other.message(), Some("opaque panic payload"));
    }

    #[test]
    fn result_ext_adds_message() {
        let res: core::result::Result<(), Error> = Err(Error::new(ErrorKind::Timeout));
        let err = res.context("fetch failed").expect_err("expected err");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Timeout: fetch failed");
    }
}
