use alloc::format;

use smallvec::smallvec;

use super::entry::Entry;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use super::raw_tree::RawTree;
use crate::error::{Error, Result};

impl<T: Ord> RawTree<T> {
    /// Inserts `key` into the node at `handle` and returns the key's multiplicity afterwards.
    ///
    /// An equal key already in the node gains a copy; otherwise a new entry goes in at its
    /// lower bound and the node is split if that filled it.
    pub(super) fn insert_entry(&mut self, handle: Handle, key: T) -> Result<usize> {
        let node = self.node_mut(handle);
        match node.search(&key) {
            SearchResult::Found(index) => {
                let multiplicity = node.entry_mut(index)?.increment();
                self.total += 1;
                log::warn!("key already present in {handle}; multiplicity is now {multiplicity}");
                Ok(multiplicity)
            }
            SearchResult::NotFound(index) => {
                node.insert_entry_at(index, Entry::new(key));
                self.len += 1;
                self.total += 1;
                self.split(handle)?;
                Ok(1)
            }
        }
    }
}

impl<T> RawTree<T> {
    /// Splits `handle` if it is full, then keeps splitting ancestors that the lifted
    /// median filled up. Stops at the first node with room, or after splitting the root.
    pub(super) fn split(&mut self, handle: Handle) -> Result<()> {
        let max = self.degree.max_entries();
        let mut current = handle;
        while self.node(current).entry_count() >= max {
            match self.node(current).parent() {
                None => {
                    self.split_root(current)?;
                    break;
                }
                Some(parent) => {
                    self.split_child(current, parent)?;
                    current = parent;
                }
            }
        }
        Ok(())
    }

    /// Moves both halves of the root into two new children, leaving only the median in
    /// the root. This is the only way the tree grows taller.
    fn split_root(&mut self, handle: Handle) -> Result<()> {
        if handle != self.root {
            return Err(Error::invariant(format!("{handle} has no parent but is not the root")));
        }
        let root = self.node_mut(handle);
        let (median, right_entries, right_children) = root.split_off()?;
        let (left_entries, left_children) = root.take_contents();

        let left = self.nodes.alloc(Node::from_parts(left_entries, left_children, Some(handle)));
        let right = self.nodes.alloc(Node::from_parts(right_entries, right_children, Some(handle)));
        self.adopt_children(left);
        self.adopt_children(right);
        self.node_mut(handle).replace_contents(smallvec![median], smallvec![left, right]);

        log::debug!("split root into {left} and {right}; height is now {}", self.height());
        Ok(())
    }

    /// Splits a non-root node: it keeps the left half, a new right sibling takes the rest
    /// and the median moves up into `parent` between them.
    fn split_child(&mut self, handle: Handle, parent: Handle) -> Result<()> {
        let position = self.node(parent).child_index(handle)?;
        let (median, right_entries, right_children) = self.node_mut(handle).split_off()?;

        let sibling = self.nodes.alloc(Node::from_parts(right_entries, right_children, Some(parent)));
        self.adopt_children(sibling);
        self.node_mut(parent).insert_separator(position, median, sibling);

        log::trace!("split {handle}; new sibling {sibling} under {parent}");
        Ok(())
    }
}
