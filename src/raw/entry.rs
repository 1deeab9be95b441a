use core::cmp::Ordering;

/// One distinct key and the number of times it has been inserted.
///
/// Equality and ordering look at the key only; two entries with the same key but different
/// multiplicities compare equal.
#[derive(Clone, Debug)]
pub(crate) struct Entry<T> {
    key: T,
    multiplicity: usize,
}

impl<T> Entry<T> {
    /// A fresh entry with multiplicity 1.
    pub(crate) const fn new(key: T) -> Self {
        Self { key, multiplicity: 1 }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &T {
        &self.key
    }

    #[inline]
    pub(crate) const fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    /// Records one more insertion and returns the new multiplicity.
    pub(crate) fn increment(&mut self) -> usize {
        self.multiplicity += 1;
        self.multiplicity
    }

    /// Records one removal and returns the remaining multiplicity.
    ///
    /// Only called while the multiplicity is above 1; the last copy is erased with the entry.
    pub(crate) fn decrement(&mut self) -> usize {
        debug_assert!(self.multiplicity > 1, "last copy must be erased, not decremented");
        self.multiplicity -= 1;
        self.multiplicity
    }
}

impl<T: PartialEq> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Eq> Eq for Entry<T> {}

impl<T: PartialOrd> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

impl<T: Ord> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
