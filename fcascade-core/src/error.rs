//! Error taxonomy for fcascade.
//!
//! Every failure is detected synchronously and handed back to the immediate
//! caller. Nothing is retried. Public operations return `anyhow::Result` and
//! wrap one of these variants, so callers can `downcast_ref::<CascadeError>()`
//! when they need to tell configuration errors from lookup misses.

use thiserror::Error;

/// Errors raised while building or querying a cascading index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// The promotion stride would make promoted lists grow linearly.
    #[error("invalid unit fraction denominator {0}: must be greater than 1")]
    InvalidFraction(usize),

    /// Binary search was asked to look inside an empty array.
    #[error("attempting binary search on empty array")]
    EmptyInput,

    /// Binary search collapsed without finding the value.
    #[error("value {value} cannot be found during binary search (left: {left}, right: {right})")]
    NotFound {
        /// The searched value
        value: i64,
        /// Left bound when the search range collapsed
        left: isize,
        /// Right bound when the search range collapsed
        right: isize,
    },

    /// No base lists were supplied.
    #[error("at least one base list is required")]
    NoDimensions,

    /// A base list has no elements.
    #[error("base list {dimension} is empty")]
    EmptyList {
        /// Zero-based dimension of the offending list
        dimension: usize,
    },

    /// Base lists must all have the same length.
    #[error("base list {dimension} has {actual} elements, expected {expected}")]
    LengthMismatch {
        /// Zero-based dimension of the offending list
        dimension: usize,
        /// Length of the first base list
        expected: usize,
        /// Length of this list
        actual: usize,
    },

    /// A base list is not sorted by key.
    #[error("base list {dimension} is not sorted by key at position {position}")]
    Unsorted {
        /// Zero-based dimension of the offending list
        dimension: usize,
        /// First position whose key is smaller than its predecessor's
        position: usize,
    },

    /// Attribute codes other than 0 (key) and 1 (auxiliary).
    #[error("invalid attribute code {0}: expected 0 (key) or 1 (auxiliary)")]
    InvalidAttribute(u8),

    /// The cascade reached a dimension that does not hold the value.
    #[error("value {value} is absent from dimension {dimension}")]
    MissingInDimension {
        /// The searched value
        value: i64,
        /// Zero-based dimension where the value is missing
        dimension: usize,
    },

    /// A promoted list was requested for a level that does not exist.
    #[error("promoted level {level} out of range: index has {levels} promoted lists")]
    LevelOutOfRange {
        /// Requested level
        level: usize,
        /// Number of promoted lists (dimensions - 1)
        levels: usize,
    },
}
