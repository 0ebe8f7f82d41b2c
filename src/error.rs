//! Errors reported by [`BpTree`](crate::BpTree).
//!
//! Only [`Error::InvalidDegree`], [`Error::DuplicateKey`] and
//! [`Error::KeyNotFound`] occur during normal use. The remaining variants are
//! produced by [`BpTree::validate`](crate::BpTree::validate) when an audit finds
//! a structural defect; a tree manipulated only through the public API never
//! produces them.

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The degree limit is below [`Degree::MIN`](crate::Degree::MIN).
    #[error("degree limit must be at least {min}, got {degree}")]
    InvalidDegree { degree: usize, min: usize },

    /// The key is already present; the tree was not modified.
    #[error("key is already present")]
    DuplicateKey,

    /// The key is not present; the tree was not modified.
    #[error("key is not present")]
    KeyNotFound,

    /// A node's keys are not strictly increasing.
    #[error("node {node} holds keys out of order")]
    UnsortedKeys { node: usize },

    /// A non-root node holds fewer or more entries than the degree allows.
    #[error("node {node} holds {count} entries, expected {min}..={max}")]
    Occupancy { node: usize, count: usize, min: usize, max: usize },

    /// Leaves were found at different distances from the root.
    #[error("leaf {node} sits at depth {found}, expected {expected}")]
    UnevenDepth { node: usize, expected: usize, found: usize },

    /// A child's parent link does not point at the branch that owns it.
    #[error("node {node} does not point back at its parent")]
    BrokenParentLink { node: usize },

    /// A key lies outside the range its ancestors' separators allow.
    #[error("node {node} holds a key outside its separator range")]
    SeparatorOutOfRange { node: usize },

    /// The leaf chain skips, repeats or misorders leaves.
    #[error("leaf chain is broken at leaf {position}")]
    BrokenChain { position: usize },

    /// The tracked entry count disagrees with the leaves.
    #[error("tree reports {expected} entries but leaves hold {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// A `Result` using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
