mod arena;
mod branch;
mod handle;
mod leaf;
mod node;
mod raw_bptree;
mod validate;

pub(crate) use handle::Handle;
pub(crate) use raw_bptree::RawBpTree;
