use alloc::format;
use core::fmt;

use crate::error::{Error, Result};

/// The minimum degree `t` of a B-tree.
///
/// Every node other than the root holds between `t - 1` and `2t - 1` entries, and an
/// internal node with `k` entries has `k + 1` children. The degree is fixed when the tree is
/// built and shared by all of its nodes.
///
/// # Examples
///
/// ```
/// use btree_multiset::MinDegree;
///
/// let degree = MinDegree::new(3).unwrap();
/// assert_eq!(degree.min_entries(), 2);
/// assert_eq!(degree.max_entries(), 5);
///
/// assert!(MinDegree::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MinDegree(usize);

impl MinDegree {
    /// The smallest valid degree, which yields a 2-3-4 tree.
    pub const MIN: MinDegree = MinDegree(2);

    /// The degree used by [`BTreeMultiset::default`](crate::BTreeMultiset::default).
    pub const DEFAULT: MinDegree = MinDegree(6);

    /// Validates `t` as a minimum degree.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `t` is smaller than [`MinDegree::MIN`].
    pub fn new(t: usize) -> Result<Self> {
        if t < Self::MIN.0 {
            return Err(Error::InvalidArgument(format!(
                "minimum degree must be at least {}, got {t}",
                Self::MIN.0
            )));
        }
        Ok(MinDegree(t))
    }

    /// Returns `t`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// The entry count at which a node splits, `2t - 1`.
    #[must_use]
    pub const fn max_entries(self) -> usize {
        self.0.saturating_mul(2) - 1
    }

    /// The fewest entries a non-root node may hold, `t - 1`.
    #[must_use]
    pub const fn min_entries(self) -> usize {
        self.0 - 1
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for MinDegree {
    type Error = Error;

    fn try_from(t: usize) -> Result<Self> {
        Self::new(t)
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
