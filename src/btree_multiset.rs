use core::borrow::Borrow;
use core::fmt;

use crate::degree::MinDegree;
use crate::error::Result;
use crate::raw::RawTree;

mod capacity;
mod render;

/// An ordered multiset based on a classical B-tree.
///
/// Each distinct key is stored once, as an entry carrying its multiplicity; inserting a key
/// that is already present bumps that count instead of adding a second entry. The tree is
/// parameterised by its [`MinDegree`] `t`: every node except the root holds between `t - 1`
/// and `2t - 1` entries and all leaves sit at the same depth, so [`insert`], [`remove`] and
/// [`find`] each visit `O(log n)` nodes.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the multiset.
///
/// [`insert`]: BTreeMultiset::insert
/// [`remove`]: BTreeMultiset::remove
/// [`find`]: BTreeMultiset::find
///
/// # Examples
///
/// ```
/// use btree_multiset::{BTreeMultiset, Error};
///
/// let mut words = BTreeMultiset::new(2)?;
/// for word in ["to", "be", "or", "not", "to", "be"] {
///     words.insert(word);
/// }
///
/// assert_eq!(words.find("to"), Some(2));
/// assert_eq!(words.find("or"), Some(1));
/// assert_eq!(words.len(), 4);
/// assert_eq!(words.total_count(), 6);
///
/// assert_eq!(words.remove("to"), Ok(1));
/// assert_eq!(words.remove("to"), Ok(0));
/// assert_eq!(words.remove("to"), Err(Error::NotFound));
/// # Ok::<(), Error>(())
/// ```
pub struct BTreeMultiset<T> {
    raw: RawTree<T>,
}

impl<T> BTreeMultiset<T> {
    /// Creates an empty multiset whose nodes have minimum degree `min_degree`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `min_degree < 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// assert!(BTreeMultiset::<i32>::new(2).is_ok());
    /// assert!(BTreeMultiset::<i32>::new(1).is_err());
    /// ```
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::with_degree(MinDegree::new(min_degree)?))
    }

    /// Creates an empty multiset with an already validated degree.
    #[must_use]
    pub fn with_degree(degree: MinDegree) -> Self {
        BTreeMultiset {
            raw: RawTree::new(degree),
        }
    }

    /// Returns the minimum degree shared by all nodes.
    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.raw.degree()
    }

    /// Returns the number of distinct keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// let set = BTreeMultiset::from([1, 1, 2]);
    /// assert_eq!(set.len(), 2);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns the number of stored copies, i.e. the sum of all multiplicities.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// let set = BTreeMultiset::from([1, 1, 2]);
    /// assert_eq!(set.total_count(), 3);
    /// ```
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.raw.total()
    }

    /// Returns `true` if the multiset holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree. An empty or single-node tree has height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the number of nodes currently allocated.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Removes every key, leaving a single empty root.
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<T: Ord> BTreeMultiset<T> {
    /// Adds one copy of `key` and returns its multiplicity afterwards.
    ///
    /// # Panics
    ///
    /// Only if the tree's internal structure is corrupt; see [`try_insert`](Self::try_insert).
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// let mut set = BTreeMultiset::new(3).unwrap();
    /// assert_eq!(set.insert('x'), 1);
    /// assert_eq!(set.insert('x'), 2);
    /// ```
    pub fn insert(&mut self, key: T) -> usize {
        match self.raw.insert(key) {
            Ok(multiplicity) => multiplicity,
            Err(err) => panic!("`BTreeMultiset::insert()` - {err}"),
        }
    }

    /// Adds one copy of `key`, reporting a corrupt tree as an error instead of panicking.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`](crate::Error::InvariantViolation) if a split found the
    /// tree in an impossible shape.
    pub fn try_insert(&mut self, key: T) -> Result<usize> {
        self.raw.insert(key)
    }

    /// Removes one copy of `key` and returns how many copies remain.
    ///
    /// The key leaves the multiset when its last copy is removed.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if `key` is not present; the multiset is
    /// left unchanged. [`Error::InvariantViolation`](crate::Error::InvariantViolation) only if
    /// the tree was already corrupt.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::{BTreeMultiset, Error};
    ///
    /// let mut set = BTreeMultiset::from([5, 5]);
    /// assert_eq!(set.remove(&5), Ok(1));
    /// assert_eq!(set.remove(&5), Ok(0));
    /// assert_eq!(set.remove(&5), Err(Error::NotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the multiplicity of `key`, or `None` if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// let set = BTreeMultiset::from([String::from("a"), String::from("a")]);
    /// assert_eq!(set.find("a"), Some(2));
    /// assert_eq!(set.find("b"), None);
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.multiplicity(key)
    }

    /// Returns `true` if at least one copy of `key` is present.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Checks the B-tree invariants: node fill bounds, child counts, parent links, uniform
    /// leaf depth, strictly ascending in-order keys and the cached counters.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`](crate::Error::InvariantViolation) describing every
    /// violation found.
    pub fn validate(&self) -> Result<()> {
        self.raw.validate()
    }
}

impl<T> Default for BTreeMultiset<T> {
    /// Creates an empty multiset with [`MinDegree::DEFAULT`].
    fn default() -> Self {
        Self::with_degree(MinDegree::DEFAULT)
    }
}

impl<T: Clone> Clone for BTreeMultiset<T> {
    fn clone(&self) -> Self {
        BTreeMultiset { raw: self.raw.clone() }
    }
}

impl<T> fmt::Debug for BTreeMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTreeMultiset")
            .field("min_degree", &self.min_degree().get())
            .field("len", &self.len())
            .field("total_count", &self.total_count())
            .field("height", &self.height())
            .finish()
    }
}

impl<T: Ord> Extend<T> for BTreeMultiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for BTreeMultiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for BTreeMultiset<T> {
    /// Builds a multiset with the default degree from an array of keys.
    ///
    /// ```
    /// use btree_multiset::BTreeMultiset;
    ///
    /// let set = BTreeMultiset::from([3, 1, 3]);
    /// assert_eq!(set.find(&3), Some(2));
    /// ```
    fn from(keys: [T; N]) -> Self {
        keys.into_iter().collect()
    }
}
