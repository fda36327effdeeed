//! Error types reported by carousel operations.
//!
//! An empty item source is not an error: operations that need a valid
//! position report [`TransitionOutcome::EmptySource`](crate::TransitionOutcome)
//! instead.
use std::fmt;

use thiserror::Error;

/// Which index range an operation validated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// Element access, valid in `0..count`.
    Element,
    /// Insertion slot, valid in `0..=count`.
    Insertion,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => f.write_str("0..count"),
            Self::Insertion => f.write_str("0..=count"),
        }
    }
}

/// Errors returned by carousel entry points.
///
/// Every variant is returned before any state is mutated.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    /// The index lies outside the range accepted by the operation.
    #[error("index {index} is out of range for {count} items (expected {kind})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Item count at the time of the request.
        count: usize,
        /// Range the index was checked against.
        kind: IndexKind,
    },
    /// A transition is still in flight; transitions are serialized.
    #[error("a transition to page {target} is still pending")]
    TransitionPending {
        /// Target of the in-flight transition.
        target: usize,
    },
    /// The native widget has been released.
    #[error("carousel is detached from its native widget")]
    Detached,
}

impl CarouselError {
    pub(crate) fn element(index: usize, count: usize) -> Self {
        Self::OutOfRange {
            index,
            count,
            kind: IndexKind::Element,
        }
    }

    pub(crate) fn insertion(index: usize, count: usize) -> Self {
        Self::OutOfRange {
            index,
            count,
            kind: IndexKind::Insertion,
        }
    }
}

/// Checks `index` against `0..count`.
pub(crate) fn check_element(index: usize, count: usize) -> Result<(), CarouselError> {
    if index < count {
        Ok(())
    } else {
        Err(CarouselError::element(index, count))
    }
}

/// Checks `index` against `0..=count`.
pub(crate) fn check_insertion(index: usize, count: usize) -> Result<(), CarouselError> {
    if index <= count {
        Ok(())
    } else {
        Err(CarouselError::insertion(index, count))
    }
}
