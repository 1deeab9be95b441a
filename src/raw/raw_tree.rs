use core::borrow::Borrow;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::degree::MinDegree;
use crate::error::{Error, Result};

/// The arena-backed B-tree behind `BTreeMultiset`.
///
/// Nodes refer to each other by [`Handle`]; the tree is the sole owner of every node.
/// Structural repair walks parent handles upward in a loop, so its depth is bounded by
/// the tree height.
#[derive(Clone, Debug)]
pub(crate) struct RawTree<T> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<T>>,
    /// Handle to the root node. Allocated once; only its contents change.
    pub(super) root: Handle,
    pub(super) degree: MinDegree,
    /// Number of distinct keys.
    pub(super) len: usize,
    /// Sum of all multiplicities.
    pub(super) total: usize,
}

impl<T> RawTree<T> {
    /// Creates a tree holding a single empty root leaf.
    pub(crate) fn new(degree: MinDegree) -> Self {
        Self::from_arena(Arena::new(), degree)
    }

    /// Creates an empty tree with node slots reserved for roughly `capacity` distinct keys.
    pub(crate) fn with_capacity(degree: MinDegree, capacity: usize) -> Self {
        let slots = capacity.div_ceil(degree.min_entries()).max(1);
        Self::from_arena(Arena::with_capacity(slots), degree)
    }

    fn from_arena(mut nodes: Arena<Node<T>>, degree: MinDegree) -> Self {
        let root = nodes.alloc(Node::new_leaf(None));
        Self {
            nodes,
            root,
            degree,
            len: 0,
            total: 0,
        }
    }

    pub(crate) const fn degree(&self) -> MinDegree {
        self.degree
    }

    /// Number of distinct keys.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Sum of all multiplicities.
    pub(crate) const fn total(&self) -> usize {
        self.total
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of live nodes.
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels; a lone root leaf has height 1.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.node(self.root);
        while let Some(&first) = current.children().first() {
            current = self.node(first);
            height += 1;
        }
        height
    }

    /// Drops every node and starts over with a fresh empty root.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf(None));
        self.len = 0;
        self.total = 0;
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(super) fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        self.nodes.get_mut(handle)
    }

    pub(super) fn parent_of(&self, handle: Handle) -> Result<Handle> {
        self.node(handle)
            .parent()
            .ok_or_else(|| Error::invariant(alloc::format!("{handle} has no parent")))
    }

    /// Points every child of `handle` back at `handle`.
    pub(super) fn adopt_children(&mut self, handle: Handle) {
        for index in 0..self.node(handle).child_count() {
            let child = self.node(handle).children()[index];
            self.node_mut(child).set_parent(Some(handle));
        }
    }

    /// The rightmost leaf under child `index` of `handle`, which holds the in-order
    /// predecessor of entry `index`.
    pub(super) fn predecessor_leaf(&self, handle: Handle, index: usize) -> Result<Handle> {
        let mut current = self.node(handle).child(index)?;
        loop {
            let node = self.node(current);
            match node.children().last() {
                Some(&last) => current = last,
                None => return Ok(current),
            }
        }
    }
}

impl<T: Ord> RawTree<T> {
    /// Locates the node and index holding `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            let node = self.node(current);
            match node.search(key) {
                SearchResult::Found(index) => return Some((current, index)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(index) => current = node.children()[index],
            }
        }
    }

    /// Returns the multiplicity of `key`, if present.
    pub(crate) fn multiplicity<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, index) = self.find(key)?;
        Some(self.node(handle).entries()[index].multiplicity())
    }

    /// Inserts one copy of `key` and returns its multiplicity afterwards.
    ///
    /// An equal key met anywhere on the way down absorbs the insertion; otherwise the key
    /// lands in a leaf, which may split.
    pub(crate) fn insert(&mut self, key: T) -> Result<usize> {
        let mut current = self.root;
        loop {
            let node = self.node(current);
            let index = node.lower_bound_index(&key);
            let duplicate = node.entries().get(index).is_some_and(|entry| *entry.key() == key);
            if duplicate || node.is_leaf() {
                break;
            }
            current = node.children()[index];
        }
        self.insert_entry(current, key)
    }

    /// Removes one copy of `key` and returns how many copies remain.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `key` is absent, with the tree untouched.
    /// [`Error::InvariantViolation`] if the tree is already corrupt. Lookup and predecessor
    /// substitution fail without mutating, but a repair cascade that hits corruption part-way
    /// up keeps the steps it already made.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Result<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (mut holder, mut index) = self.find(key).ok_or(Error::NotFound)?;
        let node = self.node(holder);
        // Extra copies are dropped in place; only erasing an entry has to happen in a leaf.
        if !node.is_leaf() && node.entry(index)?.multiplicity() == 1 {
            let leaf = self.predecessor_leaf(holder, index)?;
            self.swap_with_predecessor(holder, index, leaf)?;
            // Keys are unique per entry, so the exact search can only hit the moved entry.
            match self.node(leaf).index_of(key) {
                Ok(moved) => {
                    index = moved;
                    holder = leaf;
                }
                Err(_) => {
                    // Swapping again restores both entries.
                    self.swap_with_predecessor(holder, index, leaf)?;
                    return Err(Error::invariant(alloc::format!(
                        "entry moved into {leaf} is not where its key sorts"
                    )));
                }
            }
        }
        self.remove_entry_at(holder, index)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::entry::Entry;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn tree(t: usize) -> RawTree<i32> {
        RawTree::new(MinDegree::new(t).unwrap())
    }

    fn root_keys(tree: &RawTree<i32>) -> Vec<i32> {
        tree.node(tree.root()).entries().iter().map(|entry| *entry.key()).collect()
    }

    #[test]
    fn new_tree_is_a_single_empty_leaf() {
        let tree = tree(2);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.find(&1), None);
        tree.validate().unwrap();
    }

    #[test]
    fn third_insert_splits_the_root_in_place() {
        let mut tree = tree(2);
        let root = tree.root();
        for key in 1..=3 {
            assert_eq!(tree.insert(key), Ok(1));
        }
        assert_eq!(tree.root(), root);
        assert_eq!(root_keys(&tree), [2]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 3);
        tree.validate().unwrap();
    }

    #[test]
    fn duplicate_in_internal_node_does_not_descend() {
        let mut tree = tree(2);
        for key in 1..=3 {
            tree.insert(key).unwrap();
        }
        let nodes_before = tree.node_count();
        assert_eq!(tree.insert(2), Ok(2));
        assert_eq!(tree.find(&2), Some((tree.root(), 0)));
        assert_eq!(tree.multiplicity(&2), Some(2));
        assert_eq!(tree.node_count(), nodes_before);
        assert_eq!((tree.len(), tree.total()), (3, 4));
    }

    #[test]
    fn predecessor_is_rightmost_leaf_of_left_child() {
        let mut tree = tree(2);
        for key in 1..=10 {
            tree.insert(key).unwrap();
        }
        let (holder, index) = tree.find(&4).unwrap();
        assert!(!tree.node(holder).is_leaf());
        let leaf = tree.predecessor_leaf(holder, index).unwrap();
        assert!(tree.node(leaf).is_leaf());
        assert_eq!(tree.node(leaf).entries().last().map(|entry| *entry.key()), Some(3));
    }

    #[test]
    fn removing_internal_key_keeps_its_neighbours() {
        let mut tree = tree(2);
        for key in 1..=10 {
            tree.insert(key).unwrap();
        }
        tree.insert(3).unwrap();
        assert_eq!(tree.remove(&4), Ok(0));
        tree.validate().unwrap();
        assert_eq!(tree.find(&4), None);
        assert_eq!(tree.multiplicity(&3), Some(2));
        assert_eq!(tree.multiplicity(&5), Some(1));
    }

    #[test]
    fn removing_duplicated_internal_key_only_decrements() {
        let mut tree = tree(2);
        for key in [1, 2, 3, 2, 2] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.remove(&2), Ok(2));
        assert_eq!(tree.remove(&2), Ok(1));
        tree.validate().unwrap();
        assert_eq!(tree.multiplicity(&2), Some(1));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn empty_predecessor_leaf_fails_before_swapping() {
        let mut tree = tree(2);
        for key in 1..=5 {
            tree.insert(key).unwrap();
        }
        // Corrupt the tree: the leaf left of separator 2 loses its only entry.
        let root = tree.root();
        let first = tree.node(root).children()[0];
        tree.node_mut(first).erase_entry(0).unwrap();

        assert!(matches!(tree.remove(&2), Err(Error::InvariantViolation(_))));
        assert_eq!(root_keys(&tree), [2, 4]);
        assert_eq!((tree.len(), tree.total()), (5, 5));
        assert_eq!(tree.multiplicity(&2), Some(1));
    }

    #[test]
    fn misplaced_predecessor_is_swapped_back() {
        let mut tree = tree(2);
        for key in 1..=5 {
            tree.insert(key).unwrap();
        }
        // Corrupt the tree: the leaf left of separator 2 becomes [7, 8, 1].
        let root = tree.root();
        let first = tree.node(root).children()[0];
        tree.node_mut(first).insert_entry_at(0, Entry::new(7));
        tree.node_mut(first).insert_entry_at(1, Entry::new(8));

        assert!(matches!(tree.remove(&2), Err(Error::InvariantViolation(_))));
        assert_eq!(root_keys(&tree), [2, 4]);
        let leaf: Vec<i32> = tree.node(first).entries().iter().map(|entry| *entry.key()).collect();
        assert_eq!(leaf, [7, 8, 1]);
        assert_eq!((tree.len(), tree.total()), (5, 5));
    }

    #[test]
    fn remove_absent_key_fails_without_mutation() {
        let mut tree = tree(3);
        for key in 0..20 {
            tree.insert(key * 2).unwrap();
        }
        let total = tree.total();
        assert_eq!(tree.remove(&7), Err(Error::NotFound));
        assert_eq!(tree.total(), total);
        tree.validate().unwrap();
    }

    #[test]
    fn clear_resets_to_empty_root() {
        let mut tree = tree(2);
        for key in 0..50 {
            tree.insert(key).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.total(), 0);
        assert_eq!(tree.node_count(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn with_capacity_reserves_node_slots() {
        let tree: RawTree<i32> = RawTree::with_capacity(MinDegree::new(3).unwrap(), 100);
        assert!(tree.capacity() >= 50);
        assert_eq!(tree.node_count(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..300).prop_map(Op::Insert),
            2 => (0i32..300).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_matches_counting_model(
            t in 2usize..6,
            ops in prop::collection::vec(op_strategy(), 0..600),
        ) {
            let mut tree = tree(t);
            let mut model: BTreeMap<i32, usize> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let count = model.entry(key).or_insert(0);
                        *count += 1;
                        prop_assert_eq!(tree.insert(key), Ok(*count));
                    }
                    Op::Remove(key) => match model.get_mut(&key) {
                        Some(count) => {
                            *count -= 1;
                            let remaining = *count;
                            if remaining == 0 {
                                model.remove(&key);
                            }
                            prop_assert_eq!(tree.remove(&key), Ok(remaining));
                        }
                        None => prop_assert_eq!(tree.remove(&key), Err(Error::NotFound)),
                    },
                }
                prop_assert_eq!(tree.validate(), Ok(()));
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.total(), model.values().sum::<usize>());
            }

            for (key, count) in &model {
                prop_assert_eq!(tree.multiplicity(key), Some(*count));
            }
        }
    }
}
