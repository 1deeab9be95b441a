use alloc::format;
use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::entry::Entry;
use super::handle::Handle;
use crate::degree::MinDegree;
use crate::error::{Error, Result};

/// Entries held inline before a node spills to the heap. Sized for the default degree.
pub(crate) const INLINE_ENTRIES: usize = MinDegree::DEFAULT.max_entries();

pub(crate) type Entries<T> = SmallVec<[Entry<T>; INLINE_ENTRIES]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_ENTRIES + 1]>;

/// A B-tree node: sorted entries, child handles (empty for a leaf) and a parent link.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    entries: Entries<T>,
    // Empty for a leaf, otherwise exactly one longer than `entries`.
    children: Children,
    // Non-owning. `None` only for the root.
    parent: Option<Handle>,
}

/// Result of searching for a key in a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is its lower bound, which is also the child to descend into.
    NotFound(usize),
}

impl<T> Node<T> {
    /// Creates an empty leaf.
    pub(crate) fn new_leaf(parent: Option<Handle>) -> Self {
        Self::from_parts(Entries::new(), Children::new(), parent)
    }

    pub(crate) fn from_parts(entries: Entries<T>, children: Children, parent: Option<Handle>) -> Self {
        Self {
            entries,
            children,
            parent,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn entry_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Returns the entry at `index`.
    pub(crate) fn entry(&self, index: usize) -> Result<&Entry<T>> {
        let len = self.entries.len();
        self.entries.get(index).ok_or(Error::out_of_range(index, len))
    }

    /// Returns the entry at `index` mutably.
    pub(crate) fn entry_mut(&mut self, index: usize) -> Result<&mut Entry<T>> {
        let len = self.entries.len();
        self.entries.get_mut(index).ok_or(Error::out_of_range(index, len))
    }

    /// Returns the child handle at `index`.
    pub(crate) fn child(&self, index: usize) -> Result<Handle> {
        self.children
            .get(index)
            .copied()
            .ok_or(Error::out_of_range(index, self.children.len()))
    }

    /// Returns the position of `child` among this node's children.
    pub(crate) fn child_index(&self, child: Handle) -> Result<usize> {
        self.children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| Error::invariant(format!("{child} is missing from its parent's children")))
    }

    /// Inserts `entry` at `index`. `index` comes from a search, so it is at most `entry_count()`.
    pub(crate) fn insert_entry_at(&mut self, index: usize, entry: Entry<T>) {
        self.entries.insert(index, entry);
    }

    /// Removes and returns the entry at `index`.
    pub(crate) fn erase_entry(&mut self, index: usize) -> Result<Entry<T>> {
        self.entry(index)?;
        Ok(self.entries.remove(index))
    }

    /// Puts `entry` at `index` and returns the entry it displaced.
    pub(crate) fn replace_entry(&mut self, index: usize, entry: Entry<T>) -> Result<Entry<T>> {
        Ok(mem::replace(self.entry_mut(index)?, entry))
    }

    /// Cuts the node at its median.
    ///
    /// The node keeps the entries before the median and the children up to and including
    /// the median's left child. Returns the median together with the right-hand entries and
    /// children.
    pub(crate) fn split_off(&mut self) -> Result<(Entry<T>, Entries<T>, Children)> {
        if self.entries.is_empty() {
            return Err(Error::invariant("cannot split a node without entries"));
        }
        let mid = self.entries.len() / 2;
        let right_entries: Entries<T> = self.entries.drain(mid + 1..).collect();
        let median = self.entries.remove(mid);
        let right_children: Children = if self.is_leaf() {
            Children::new()
        } else {
            self.children.drain(mid + 1..).collect()
        };
        Ok((median, right_entries, right_children))
    }

    /// Empties the node and returns what it held.
    pub(crate) fn take_contents(&mut self) -> (Entries<T>, Children) {
        (mem::take(&mut self.entries), mem::take(&mut self.children))
    }

    pub(crate) fn into_contents(self) -> (Entries<T>, Children) {
        (self.entries, self.children)
    }

    pub(crate) fn replace_contents(&mut self, entries: Entries<T>, children: Children) {
        self.entries = entries;
        self.children = children;
    }

    /// Removes the first entry and, for an internal node, the first child.
    pub(crate) fn pop_front(&mut self) -> Option<(Entry<T>, Option<Handle>)> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries.remove(0);
        let child = if self.is_leaf() {
            None
        } else {
            Some(self.children.remove(0))
        };
        Some((entry, child))
    }

    /// Removes the last entry and, for an internal node, the last child.
    pub(crate) fn pop_back(&mut self) -> Option<(Entry<T>, Option<Handle>)> {
        let entry = self.entries.pop()?;
        Some((entry, self.children.pop()))
    }

    pub(crate) fn push_front(&mut self, entry: Entry<T>, child: Option<Handle>) {
        self.entries.insert(0, entry);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    pub(crate) fn push_back(&mut self, entry: Entry<T>, child: Option<Handle>) {
        self.entries.push(entry);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Inserts a separator lifted out of a split child at `index`, with the new right
    /// sibling directly after the child it was split from.
    pub(crate) fn insert_separator(&mut self, index: usize, entry: Entry<T>, right: Handle) {
        self.entries.insert(index, entry);
        self.children.insert(index + 1, right);
    }

    /// Removes the entry at `entry_index` and the child at `child_index` together.
    pub(crate) fn remove_separator(&mut self, entry_index: usize, child_index: usize) -> Result<(Entry<T>, Handle)> {
        self.entry(entry_index)?;
        self.child(child_index)?;
        Ok((self.entries.remove(entry_index), self.children.remove(child_index)))
    }

    /// Concatenates `separator` and a right sibling's contents onto this node.
    pub(crate) fn append(&mut self, separator: Entry<T>, entries: Entries<T>, children: Children) {
        self.entries.push(separator);
        self.entries.extend(entries);
        self.children.extend(children);
    }

    /// Concatenates a left sibling's contents and `separator` in front of this node.
    pub(crate) fn prepend(&mut self, mut entries: Entries<T>, mut children: Children, separator: Entry<T>) {
        entries.push(separator);
        entries.extend(mem::take(&mut self.entries));
        children.extend(mem::take(&mut self.children));
        self.entries = entries;
        self.children = children;
    }

    /// Binary search over the entries by key.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.entries.binary_search_by(|entry| entry.key().borrow().cmp(key)) {
            Ok(index) => SearchResult::Found(index),
            Err(index) => SearchResult::NotFound(index),
        }
    }

    /// First index whose key is `>= key`, or `entry_count()` if there is none.
    #[inline]
    pub(crate) fn lower_bound_index<Q>(&self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(index) | SearchResult::NotFound(index) => index,
        }
    }

    /// Index of the entry whose key equals `key`.
    pub(crate) fn index_of<Q>(&self, key: &Q) -> Result<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(index) => Ok(index),
            SearchResult::NotFound(_) => Err(Error::NotFound),
        }
    }
}
