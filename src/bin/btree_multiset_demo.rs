//! Runs a fixed workload against a 2-3-4 tree and prints the resulting shape.
//!
//! Set `RUST_LOG=trace` to watch every split, rotation and merge.

use btree_multiset::{BTreeMultiset, Result};

const LOWER_BOUND: i32 = 1;
const UPPER_BOUND: i32 = 100;

fn main() -> Result<()> {
    env_logger::init();

    let mut tree = BTreeMultiset::new(2)?;
    for key in LOWER_BOUND..=UPPER_BOUND {
        tree.insert(key);
    }
    for key in LOWER_BOUND..=UPPER_BOUND {
        tree.insert(key);
    }
    for key in LOWER_BOUND..=UPPER_BOUND {
        tree.remove(&key)?;
    }
    for key in LOWER_BOUND..=UPPER_BOUND / 2 {
        tree.remove(&key)?;
    }

    log::info!(
        "{} keys left in {} nodes, height {}",
        tree.len(),
        tree.node_count(),
        tree.height()
    );
    print!("{tree}");
    Ok(())
}
