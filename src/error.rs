//! Error types for `btree_multiset`.

use alloc::string::String;

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong inside a [`BTreeMultiset`](crate::BTreeMultiset).
///
/// [`Error::NotFound`] is the only variant a caller should expect to handle routinely.
/// The others are contract violations: [`Error::InvalidArgument`] is a bad constructor
/// argument, while [`Error::IndexOutOfRange`] and [`Error::InvariantViolation`] reaching a
/// caller mean the engine itself has a bug.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A constructor argument was rejected (e.g. a minimum degree below 2).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested key is not in the tree.
    #[error("key not found")]
    NotFound,

    /// A node accessor was given an index past the end of its entries or children.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the sequence that was indexed.
        len: usize,
    },

    /// A structural operation found the tree in a shape it should never be in.
    #[error("B-tree invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Error::InvariantViolation(message.into())
    }

    pub(crate) const fn out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange { index, len }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn error_display() {
        assert_eq!(Error::NotFound.to_string(), "key not found");
        assert_eq!(Error::out_of_range(4, 3).to_string(), "index 4 is out of range for length 3");
        assert_eq!(
            Error::invariant("node#3 has no parent").to_string(),
            "B-tree invariant violated: node#3 has no parent"
        );
        assert_eq!(
            Error::InvalidArgument("minimum degree must be at least 2, got 1".into()).to_string(),
            "invalid argument: minimum degree must be at least 2, got 1"
        );
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(Error::out_of_range(1, 0), Error::IndexOutOfRange { index: 1, len: 0 });
        assert_ne!(Error::NotFound, Error::invariant(""));
        assert_eq!(format!("{:?}", Error::NotFound), "NotFound");
    }
}
