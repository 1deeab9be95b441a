mod arena;
mod entry;
mod handle;
mod node;
mod raw_tree;
mod split;
mod underflow;
mod validate;

pub(crate) use handle::Handle;
pub(crate) use node::Node;
pub(crate) use raw_tree::RawTree;
