//! An order-`t` B-tree multiset for Rust.
//!
//! This crate provides [`BTreeMultiset`], an ordered container that stores each distinct key
//! once together with its multiplicity:
//!
//! - [`insert`](BTreeMultiset::insert) - Add a copy of a key, splitting full nodes on the way
//! - [`remove`](BTreeMultiset::remove) - Drop a copy of a key, rotating or merging underfull nodes
//! - [`find`](BTreeMultiset::find) - Look up how many copies of a key are stored
//!
//! # Example
//!
//! ```
//! use btree_multiset::{BTreeMultiset, Error};
//!
//! let mut tree = BTreeMultiset::new(2)?;
//! for i in 1..=100 {
//!     tree.insert(i);
//!     tree.insert(i);
//! }
//! assert_eq!(tree.find(&42), Some(2));
//!
//! for i in 1..=100 {
//!     tree.remove(&i)?;
//! }
//! for i in 1..=50 {
//!     tree.remove(&i)?;
//! }
//! assert_eq!(tree.find(&42), None);
//! assert_eq!(tree.find(&51), Some(1));
//! assert_eq!(tree.len(), 50);
//! tree.validate()?;
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable degree** - Any [`MinDegree`] `t >= 2`, down to 2-3-4 trees
//! - **Compact duplicates** - Repeated keys bump a counter instead of adding entries
//! - **Diagnostics** - [`Display`](core::fmt::Display) draws the tree shape and
//!   [`validate`](BTreeMultiset::validate) checks every structural invariant
//!
//! # Implementation
//!
//! Nodes live in a slot arena and refer to their parent and children by index, so there are
//! no reference cycles. Splits after an insertion and rotations or merges after a removal
//! are driven by loops that climb parent links from the node that first broke its fill
//! bounds, which bounds the work by the tree height. Repair steps emit `log` records at
//! `trace` and `debug` level.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod degree;
mod error;
mod raw;

pub mod btree_multiset;

pub use btree_multiset::BTreeMultiset;
pub use degree::MinDegree;
pub use error::{Error, Result};
