use crate::error::{Error, Result};

/// The degree limit `m` of a [`BpTree`](crate::BpTree).
///
/// A leaf holds at most `m` keys and a branch at most `m + 1` children. Both
/// minimums derive from `m`; the root is exempt from them.
///
/// # Examples
///
/// ```
/// use bptree::Degree;
///
/// let degree = Degree::new(4).unwrap();
/// assert_eq!(degree.max_leaf_keys(), 4);
/// assert_eq!(degree.min_leaf_keys(), 2);
/// assert_eq!(degree.max_children(), 5);
/// assert_eq!(degree.min_children(), 3);
///
/// assert!(Degree::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Degree(usize);

impl Degree {
    /// Smallest degree that still allows a leaf to split into two non-empty halves.
    pub const MIN: usize = 2;

    /// Validates `m` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDegree`] if `m < Degree::MIN`.
    pub const fn new(m: usize) -> Result<Self> {
        if m < Self::MIN {
            return Err(Error::InvalidDegree {
                degree: m,
                min: Self::MIN,
            });
        }
        Ok(Self(m))
    }

    /// Returns `m`.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn max_leaf_keys(self) -> usize {
        self.0
    }

    /// A leaf split leaves `floor((m + 1) / 2)` keys in the new right leaf, so
    /// that is also the least a non-root leaf may hold.
    #[inline]
    #[must_use]
    pub const fn min_leaf_keys(self) -> usize {
        (self.0 + 1) / 2
    }

    #[inline]
    #[must_use]
    pub const fn max_children(self) -> usize {
        self.0 + 1
    }

    /// `ceil((m + 1) / 2)`, the child count of the right half of a branch split.
    #[inline]
    #[must_use]
    pub const fn min_children(self) -> usize {
        (self.0 + 1).div_ceil(2)
    }
}

impl Default for Degree {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<usize> for Degree {
    type Error = Error;

    fn try_from(m: usize) -> Result<Self> {
        Self::new(m)
    }
}
