use super::BTreeMultiset;
use crate::degree::MinDegree;
use crate::raw::RawTree;

impl<T> BTreeMultiset<T> {
    /// Creates an empty multiset with node storage reserved for about `capacity` distinct keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::{BTreeMultiset, MinDegree};
    ///
    /// let set: BTreeMultiset<u64> = BTreeMultiset::with_capacity(MinDegree::MIN, 64);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 64);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(degree: MinDegree, capacity: usize) -> Self {
        BTreeMultiset {
            raw: RawTree::with_capacity(degree, capacity),
        }
    }

    /// Returns how many nodes the tree can hold before its node table reallocates.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
