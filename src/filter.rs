//! Failure filters for the aggregation combinators.
//!
//! [`all_except`](crate::combinator::all_except) and
//! [`race_except`](crate::combinator::race_except) take an [`ErrorFilter`]
//! that decides which failures are swallowed during aggregation. The neutral
//! filter matches nothing, so by default no failure is ever silently dropped.
//!
//! Filters classify failures; they never transform them. A failure that a
//! filter matches is skipped for selection purposes only — see the race
//! combinator for the one place a matched failure still surfaces.

use core::fmt;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};

/// A predicate over failures, used to select which errors an aggregation
/// combinator swallows.
///
/// # Example
///
/// ```
/// use deferral::{Error, ErrorFilter, ErrorKind};
///
/// let filter = ErrorFilter::kind(ErrorKind::NotFound);
/// assert!(filter.matches(&Error::new(ErrorKind::NotFound)));
/// assert!(!filter.matches(&Error::new(ErrorKind::Timeout)));
///
/// // The default filter matches nothing.
/// assert!(!ErrorFilter::default().matches(&Error::new(ErrorKind::NotFound)));
/// ```
#[derive(Clone, Default)]
pub enum ErrorFilter {
    /// Matches nothing; no failure is swallowed.
    #[default]
    None,
    /// Matches failures of exactly one kind.
    Kind(ErrorKind),
    /// Matches failures of any of the listed kinds.
    Kinds(Vec<ErrorKind>),
    /// Matches failures accepted by a caller-supplied predicate.
    ///
    /// The predicate is opaque to the combinators; it may inspect the kind,
    /// message, or source chain.
    Matcher(Arc<dyn Fn(&Error) -> bool + Send + Sync>),
}

impl ErrorFilter {
    /// Creates a filter matching a single error kind.
    #[must_use]
    pub const fn kind(kind: ErrorKind) -> Self {
        Self::Kind(kind)
    }

    /// Creates a filter matching any of the given error kinds.
    #[must_use]
    pub fn kinds(kinds: impl Into<Vec<ErrorKind>>) -> Self {
        Self::Kinds(kinds.into())
    }

    /// Creates a filter from a caller-supplied predicate.
    pub fn matcher(f: impl Fn(&Error) -> bool + Send + Sync + 'static) -> Self {
        Self::Matcher(Arc::new(f))
    }

    /// Returns true if this filter matches the given failure.
    #[must_use]
    pub fn matches(&self, error: &Error) -> bool {
        match self {
            Self::None => false,
            Self::Kind(kind) => error.kind() == *kind,
            Self::Kinds(kinds) => kinds.contains(&error.kind()),
            Self::Matcher(predicate) => predicate(error),
        }
    }

    /// Returns true if this is the neutral match-nothing filter.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for ErrorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "ErrorFilter::None"),
            Self::Kind(kind) => f.debug_tuple("ErrorFilter::Kind").field(kind).finish(),
            Self::Kinds(kinds) => f.debug_tuple("ErrorFilter::Kinds").field(kinds).finish(),
            Self::Matcher(_) => write!(f, "ErrorFilter::Matcher(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_matches_nothing() {
        let filter = ErrorFilter::None;
        assert!(!filter.matches(&Error::new(ErrorKind::NotFound)));
        assert!(!filter.matches(&Error::new(ErrorKind::Panicked)));
        assert!(filter.is_none());
    }

    #[test]
    fn kind_matches_only_its_kind() {
        let filter = ErrorFilter::kind(ErrorKind::NotFound);
        assert!(filter.matches(&Error::new(ErrorKind::NotFound)));
        assert!(!filter.matches(&Error::new(ErrorKind::Unavailable)));
    }

    #[test]
    fn kinds_match_any_listed() {
        let filter = ErrorFilter::kinds([ErrorKind::NotFound, ErrorKind::Timeout]);
        assert!(filter.matches(&Error::new(ErrorKind::NotFound)));
        assert!(filter.matches(&Error::new(ErrorKind::Timeout)));
        assert!(!filter.matches(&Error::new(ErrorKind::Unavailable)));
    }

    #[test]
    fn matcher_sees_the_whole_error() {
        let filter = ErrorFilter::matcher(|e| e.message() == Some("transient"));
        assert!(filter.matches(&Error::computation("transient")));
        assert!(!filter.matches(&Error::computation("permanent")));
    }

    #[test]
    fn default_is_neutral() {
        assert!(ErrorFilter::default().is_none());
    }

    #[test]
    fn debug_does_not_force_matcher() {
        let filter = ErrorFilter::matcher(|_| true);
        assert_eq!(format!("{filter:?}"), "ErrorFilter::Matcher(..)");
    }
}
