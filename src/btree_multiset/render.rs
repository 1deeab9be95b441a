//! Human-readable dump of the tree shape, for debugging. Not a stable format.

use alloc::string::String;
use core::fmt::{self, Write};

use super::BTreeMultiset;
use crate::raw::{Handle, Node, RawTree};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const GAP: &str = "    ";

/// Draws the tree depth-first, one node per line.
///
/// Each entry is shown as a bracketed group holding its key once per copy; children hang
/// below their parent on tree-drawing connectors.
///
/// ```
/// use btree_multiset::BTreeMultiset;
///
/// let mut set = BTreeMultiset::new(2).unwrap();
/// set.extend([1, 2, 3, 4, 5, 2]);
///
/// assert_eq!(
///     set.to_string(),
///     "[2 2] [4]\n\
///      ├── [1]\n\
///      ├── [3]\n\
///      └── [5]\n"
/// );
/// ```
impl<T: fmt::Display> fmt::Display for BTreeMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.raw.root();
        write_entries(f, self.raw.node(root))?;
        f.write_char('\n')?;
        write_children(f, &self.raw, root, &mut String::new())
    }
}

fn write_entries<T: fmt::Display>(f: &mut fmt::Formatter<'_>, node: &Node<T>) -> fmt::Result {
    if node.entry_count() == 0 {
        return f.write_str("[]");
    }
    for (i, entry) in node.entries().iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        f.write_char('[')?;
        for copy in 0..entry.multiplicity() {
            if copy > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{}", entry.key())?;
        }
        f.write_char(']')?;
    }
    Ok(())
}

fn write_children<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    raw: &RawTree<T>,
    handle: Handle,
    prefix: &mut String,
) -> fmt::Result {
    let children = raw.node(handle).children();
    for (i, &child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        f.write_str(prefix)?;
        f.write_str(if last { LAST_BRANCH } else { BRANCH })?;
        write_entries(f, raw.node(child))?;
        f.write_char('\n')?;

        let depth = prefix.len();
        prefix.push_str(if last { GAP } else { PIPE });
        write_children(f, raw, child, prefix)?;
        prefix.truncate(depth);
    }
    Ok(())
}
