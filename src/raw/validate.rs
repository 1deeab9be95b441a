use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::handle::Handle;
use super::raw_tree::RawTree;
use crate::error::{Error, Result};

/// Facts gathered while walking the tree.
struct Walk<'a, T> {
    leaf_depth: Option<usize>,
    /// Keys in in-order sequence.
    keys: Vec<&'a T>,
    total: usize,
    reachable: usize,
}

impl<T: Ord> RawTree<T> {
    /// Checks every structural invariant and reports all violations at once.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] listing each problem on its own line.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut problems: Vec<String> = Vec::new();
        let mut walk = Walk {
            leaf_depth: None,
            keys: Vec::new(),
            total: 0,
            reachable: 0,
        };

        match self.nodes.try_get(self.root) {
            None => problems.push(format!("root {} is not allocated", self.root)),
            Some(root) => {
                if let Some(parent) = root.parent() {
                    problems.push(format!("root {} has parent {parent}", self.root));
                }
                if root.entry_count() == 0 && !root.is_leaf() {
                    problems.push(format!("internal root {} has no entries", self.root));
                }
                self.validate_node(self.root, 0, &mut walk, &mut problems);
            }
        }

        for (i, pair) in walk.keys.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                problems.push(format!("in-order keys not strictly ascending at positions {i} and {}", i + 1));
            }
        }
        if walk.keys.len() != self.len {
            problems.push(format!("len mismatch: self.len={}, actual={}", self.len, walk.keys.len()));
        }
        if walk.total != self.total {
            problems.push(format!("total mismatch: self.total={}, actual={}", self.total, walk.total));
        }
        if walk.reachable != self.nodes.len() {
            problems.push(format!(
                "{} nodes allocated but {} reachable from the root",
                self.nodes.len(),
                walk.reachable
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvariantViolation(problems.join("\n")))
        }
    }

    fn validate_node<'a>(&'a self, handle: Handle, depth: usize, walk: &mut Walk<'a, T>, problems: &mut Vec<String>) {
        // Deeper than the node count means a cycle.
        if depth > self.nodes.len() {
            problems.push(format!("{handle} is reachable through a cycle"));
            return;
        }
        let Some(node) = self.nodes.try_get(handle) else {
            problems.push(format!("{handle} is linked but not allocated"));
            return;
        };
        walk.reachable += 1;

        let count = node.entry_count();
        if count > self.degree.max_entries() || (!node.is_root() && count < self.degree.min_entries()) {
            problems.push(format!(
                "{handle} holds {count} entries, outside [{}, {}]",
                self.degree.min_entries(),
                self.degree.max_entries()
            ));
        }
        if node.entries().iter().any(|entry| entry.multiplicity() == 0) {
            problems.push(format!("{handle} holds an entry with multiplicity 0"));
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    problems.push(format!("leaf {handle} at depth {depth}, expected {expected}"));
                }
                Some(_) => {}
            }
            for entry in node.entries() {
                walk.keys.push(entry.key());
                walk.total += entry.multiplicity();
            }
            return;
        }

        if node.child_count() != count + 1 {
            problems.push(format!("{handle} has {count} entries but {} children", node.child_count()));
            return;
        }
        for (i, &child) in node.children().iter().enumerate() {
            let parent = self.nodes.try_get(child).and_then(|child| child.parent());
            if parent != Some(handle) {
                problems.push(format!("{child} under {handle} points at parent {parent:?}"));
            }
            self.validate_node(child, depth + 1, walk, problems);
            if let Some(entry) = node.entries().get(i) {
                walk.keys.push(entry.key());
                walk.total += entry.multiplicity();
            }
        }
    }
}
