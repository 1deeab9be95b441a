use alloc::format;

use super::handle::Handle;
use super::raw_tree::RawTree;
use crate::error::{Error, Result};

impl<T> RawTree<T> {
    /// Removes one copy of the entry at `index` in `handle` and returns the copies left.
    ///
    /// The last copy erases the entry, after which the node is repaired if it underflowed.
    pub(super) fn remove_entry_at(&mut self, handle: Handle, index: usize) -> Result<usize> {
        let node = self.node_mut(handle);
        let entry = node.entry_mut(index)?;
        if entry.multiplicity() > 1 {
            let remaining = entry.decrement();
            self.total -= 1;
            return Ok(remaining);
        }
        node.erase_entry(index)?;
        self.len -= 1;
        self.total -= 1;
        if self.node(handle).entry_count() < self.degree.min_entries() {
            self.fix_underflow(handle)?;
        }
        Ok(0)
    }

    /// Exchanges entry `index` of `handle` with the last entry of `leaf`.
    ///
    /// `leaf` must be the rightmost leaf of the subtree left of that entry, so the swap moves
    /// the doomed entry into a leaf without disturbing the order of the remaining keys.
    pub(super) fn swap_with_predecessor(&mut self, handle: Handle, index: usize, leaf: Handle) -> Result<()> {
        if !self.node(leaf).is_leaf() {
            return Err(Error::invariant(format!("predecessor {leaf} is not a leaf")));
        }
        self.node(handle).entry(index)?;
        let (predecessor, _) = self
            .node_mut(leaf)
            .pop_back()
            .ok_or_else(|| Error::invariant(format!("predecessor leaf {leaf} is empty")))?;
        let target = self.node_mut(handle).replace_entry(index, predecessor)?;
        self.node_mut(leaf).push_back(target, None);
        Ok(())
    }

    /// Restores the minimum fill of `handle` and of every ancestor that the repair drains.
    ///
    /// Each step borrows from a sibling that can spare an entry (left first), or else merges
    /// with a sibling (right first), and then moves on to the parent. An internal root left
    /// without entries is collapsed into its only child.
    ///
    /// Every step checks its own preconditions before touching the tree. On a corrupt tree an
    /// error part-way up leaves the lower steps applied.
    pub(super) fn fix_underflow(&mut self, handle: Handle) -> Result<()> {
        let min = self.degree.min_entries();
        let mut current = handle;
        while self.node(current).entry_count() < min {
            let Some(parent) = self.node(current).parent() else {
                let root = self.node(current);
                if root.entry_count() == 0 && !root.is_leaf() {
                    self.collapse_root(current)?;
                }
                return Ok(());
            };

            let siblings = self.node(parent);
            let position = siblings.child_index(current)?;
            let left = match position.checked_sub(1) {
                Some(index) => Some(siblings.child(index)?),
                None => None,
            };
            let right = siblings.children().get(position + 1).copied();

            match (left, right) {
                (Some(left), _) if self.can_lend(left) => self.rotate_right(current, left, position)?,
                (_, Some(right)) if self.can_lend(right) => self.rotate_left(current, right, position)?,
                (_, Some(right)) => self.merge_with_right(current, right, position)?,
                (Some(left), None) => self.merge_with_left(current, left, position)?,
                (None, None) => return Err(Error::invariant(format!("{current} has no siblings"))),
            }
            current = parent;
        }
        Ok(())
    }

    fn can_lend(&self, handle: Handle) -> bool {
        self.node(handle).entry_count() > self.degree.min_entries()
    }

    /// Siblings sit on the same level, so they are either both leaves or both internal.
    fn check_same_level(&self, handle: Handle, sibling: Handle) -> Result<()> {
        if self.node(handle).is_leaf() == self.node(sibling).is_leaf() {
            Ok(())
        } else {
            Err(Error::invariant(format!("{handle} and {sibling} are on different levels")))
        }
    }

    /// Child `position` of `handle`'s parent must be `sibling`; returns the parent.
    fn check_sibling(&self, handle: Handle, sibling: Handle, position: Option<usize>) -> Result<Handle> {
        let parent = self.parent_of(handle)?;
        let adjacent = match position {
            Some(position) => self.node(parent).children().get(position) == Some(&sibling),
            None => false,
        };
        if !adjacent {
            return Err(Error::invariant(format!("{sibling} is not adjacent to {handle}")));
        }
        self.check_same_level(handle, sibling)?;
        Ok(parent)
    }

    /// Moves the separator left of child `position` down to the front of `handle`, and the
    /// last entry (and last child) of `left` up into its place.
    pub(super) fn rotate_right(&mut self, handle: Handle, left: Handle, position: usize) -> Result<()> {
        let parent = self.check_sibling(handle, left, position.checked_sub(1))?;
        let separator_index = position - 1;
        self.node(parent).entry(separator_index)?;

        let (donated, donated_child) = self
            .node_mut(left)
            .pop_back()
            .ok_or_else(|| Error::invariant(format!("{left} has no entry to lend")))?;
        let separator = self.node_mut(parent).replace_entry(separator_index, donated)?;
        self.node_mut(handle).push_front(separator, donated_child);
        if let Some(child) = donated_child {
            self.node_mut(child).set_parent(Some(handle));
        }

        log::trace!("rotated one entry from {left} into {handle}");
        Ok(())
    }

    /// Moves the separator right of child `position` down to the back of `handle`, and the
    /// first entry (and first child) of `right` up into its place.
    pub(super) fn rotate_left(&mut self, handle: Handle, right: Handle, position: usize) -> Result<()> {
        let parent = self.check_sibling(handle, right, position.checked_add(1))?;
        self.node(parent).entry(position)?;

        let (donated, donated_child) = self
            .node_mut(right)
            .pop_front()
            .ok_or_else(|| Error::invariant(format!("{right} has no entry to lend")))?;
        let separator = self.node_mut(parent).replace_entry(position, donated)?;
        self.node_mut(handle).push_back(separator, donated_child);
        if let Some(child) = donated_child {
            self.node_mut(child).set_parent(Some(handle));
        }

        log::trace!("rotated one entry from {right} into {handle}");
        Ok(())
    }

    /// Pulls the separator right of child `position` down into `handle`, followed by all of
    /// `right`, and frees `right`.
    pub(super) fn merge_with_right(&mut self, handle: Handle, right: Handle, position: usize) -> Result<()> {
        let parent = self.check_sibling(handle, right, position.checked_add(1))?;
        let (separator, _) = self.node_mut(parent).remove_separator(position, position + 1)?;
        let (entries, children) = self.nodes.take(right).into_contents();
        self.node_mut(handle).append(separator, entries, children);
        self.adopt_children(handle);

        log::trace!("merged {right} into {handle}");
        Ok(())
    }

    /// Pulls all of `left` followed by the separator left of child `position` into the front
    /// of `handle`, and frees `left`.
    pub(super) fn merge_with_left(&mut self, handle: Handle, left: Handle, position: usize) -> Result<()> {
        let parent = self.check_sibling(handle, left, position.checked_sub(1))?;
        let separator_index = position - 1;
        let (separator, _) = self.node_mut(parent).remove_separator(separator_index, separator_index)?;
        let (entries, children) = self.nodes.take(left).into_contents();
        self.node_mut(handle).prepend(entries, children, separator);
        self.adopt_children(handle);

        log::trace!("merged {left} into {handle}");
        Ok(())
    }

    /// Replaces an empty internal root with the contents of its only child. This is the only
    /// way the tree gets shorter; the root keeps its handle.
    pub(super) fn collapse_root(&mut self, handle: Handle) -> Result<()> {
        let root = self.node(handle);
        if !root.is_root() || root.entry_count() != 0 || root.child_count() != 1 {
            return Err(Error::invariant(format!(
                "{handle} cannot collapse: {} entries, {} children",
                root.entry_count(),
                root.child_count()
            )));
        }
        let child = root.child(0)?;
        let (entries, children) = self.nodes.take(child).into_contents();
        self.node_mut(handle).replace_contents(entries, children);
        self.adopt_children(handle);

        log::debug!("collapsed root into {handle}; height is now {}", self.height());
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::degree::MinDegree;
    use alloc::vec;
    use alloc::vec::Vec;

    fn keys_of(tree: &RawTree<i32>, handle: Handle) -> Vec<i32> {
        tree.node(handle).entries().iter().map(|entry| *entry.key()).collect()
    }

    fn level(tree: &RawTree<i32>, handle: Handle) -> Vec<Vec<i32>> {
        tree.node(handle).children().iter().map(|&child| keys_of(tree, child)).collect()
    }

    fn filled(t: usize, keys: impl IntoIterator<Item = i32>) -> RawTree<i32> {
        let mut tree = RawTree::new(MinDegree::new(t).unwrap());
        for key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    // Root [2, 4] over leaves [1] [3] [5].
    fn three_leaves() -> RawTree<i32> {
        filled(2, 1..=5)
    }

    #[test]
    fn merge_right_when_no_sibling_can_lend() {
        let mut tree = three_leaves();
        assert_eq!(tree.remove(&1), Ok(0));
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [4]);
        assert_eq!(level(&tree, root), [vec![2, 3], vec![5]]);
        assert_eq!(tree.node_count(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn merge_left_for_rightmost_child() {
        let mut tree = three_leaves();
        assert_eq!(tree.remove(&5), Ok(0));
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [2]);
        assert_eq!(level(&tree, root), [vec![1], vec![3, 4]]);
        tree.validate().unwrap();
    }

    #[test]
    fn rotate_right_borrows_from_left_sibling() {
        let mut tree = three_leaves();
        tree.remove(&1).unwrap();
        tree.remove(&5).unwrap();
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [3]);
        assert_eq!(level(&tree, root), [[2], [4]]);
        tree.validate().unwrap();
    }

    #[test]
    fn rotate_left_borrows_from_right_sibling() {
        let mut tree = three_leaves();
        tree.insert(6).unwrap();
        tree.remove(&3).unwrap();
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [2, 5]);
        assert_eq!(level(&tree, root), [[1], [4], [6]]);
        tree.validate().unwrap();
    }

    #[test]
    fn internal_delete_ends_in_root_collapse() {
        let mut tree = three_leaves();
        tree.remove(&1).unwrap();
        tree.remove(&5).unwrap();
        let root = tree.root();
        assert_eq!(tree.remove(&3), Ok(0));
        assert_eq!(tree.root(), root);
        assert_eq!(keys_of(&tree, root), [2, 4]);
        assert!(tree.node(root).is_leaf());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn internal_rotation_moves_a_child_across() {
        // Root [4] over [2] and [6, 8]; deleting 1 drains the left half.
        let mut tree = filled(2, 1..=10);
        tree.remove(&1).unwrap();
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [6]);
        assert_eq!(level(&tree, root), [[4], [8]]);
        let left = tree.node(root).children()[0];
        assert_eq!(level(&tree, left), [vec![2, 3], vec![5]]);
        let moved = tree.node(left).children()[1];
        assert_eq!(tree.node(moved).parent(), Some(left));
        tree.validate().unwrap();
    }

    #[test]
    fn cascading_merge_shrinks_height() {
        let mut tree = filled(2, 1..=7);
        assert_eq!(tree.height(), 3);
        tree.remove(&1).unwrap();
        assert_eq!(tree.height(), 2);
        let root = tree.root();
        assert_eq!(keys_of(&tree, root), [4, 6]);
        assert_eq!(level(&tree, root), [vec![2, 3], vec![5], vec![7]]);
        tree.validate().unwrap();
    }

    #[test]
    fn last_key_leaves_an_empty_root_leaf() {
        let mut tree = filled(2, [42]);
        assert_eq!(tree.remove(&42), Ok(0));
        assert!(tree.is_empty());
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.find(&42), None);
        tree.validate().unwrap();
    }

    #[test]
    fn rotate_right_on_leftmost_child_is_rejected() {
        let mut tree = three_leaves();
        let root = tree.root();
        let first = tree.node(root).children()[0];
        let second = tree.node(root).children()[1];
        let err = tree.rotate_right(first, second, 0).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert_eq!(level(&tree, root), [[1], [3], [5]]);
    }

    #[test]
    fn merge_with_non_adjacent_sibling_is_rejected() {
        let mut tree = three_leaves();
        let root = tree.root();
        let first = tree.node(root).children()[0];
        let third = tree.node(root).children()[2];
        assert!(tree.merge_with_right(first, third, 0).is_err());
        assert!(tree.merge_with_left(third, first, 2).is_err());
        assert_eq!(tree.node_count(), 4);
        tree.validate().unwrap();
    }

    #[test]
    fn structural_ops_on_root_are_rejected() {
        let mut tree = three_leaves();
        let root = tree.root();
        let first = tree.node(root).children()[0];
        assert!(matches!(tree.rotate_left(root, first, 0), Err(Error::InvariantViolation(_))));
        assert!(matches!(tree.collapse_root(root), Err(Error::InvariantViolation(_))));
        assert!(matches!(tree.collapse_root(first), Err(Error::InvariantViolation(_))));
        tree.validate().unwrap();
    }

    #[test]
    fn empty_donor_is_rejected_before_mutation() {
        let mut tree = three_leaves();
        let root = tree.root();
        let first = tree.node(root).children()[0];
        let second = tree.node(root).children()[1];
        tree.node_mut(first).erase_entry(0).unwrap();
        assert!(tree.rotate_right(second, first, 1).is_err());
        assert_eq!(keys_of(&tree, root), [2, 4]);
        assert_eq!(keys_of(&tree, second), [3]);
    }

    #[test]
    fn swap_with_predecessor_requires_leaf() {
        let mut tree = filled(2, 1..=7);
        let root = tree.root();
        let left = tree.node(root).children()[0];
        assert!(tree.swap_with_predecessor(root, 0, left).is_err());
        assert!(tree.swap_with_predecessor(root, 5, left).is_err());
        tree.validate().unwrap();
    }
}
