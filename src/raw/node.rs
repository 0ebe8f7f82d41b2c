use alloc::string::String;
use core::fmt::{self, Write};

use super::branch::BranchNode;
use super::handle::Handle;
use super::leaf::LeafNode;
use crate::Degree;

/// Keys stored inline before a node spills to the heap. A leaf briefly holds `m + 1`
/// keys before splitting, so this covers every degree up to 7.
pub(crate) const INLINE_KEYS: usize = 8;
pub(crate) const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

pub(crate) enum Node<K, V> {
    Branch(BranchNode<K>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> Node<K, V> {
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_branch(&self) -> &BranchNode<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected branch node"),
        }
    }

    pub(crate) fn as_branch_mut(&mut self) -> &mut BranchNode<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected branch node"),
        }
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Branch(branch) => branch.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Branch(branch) => branch.parent(),
            Node::Leaf(leaf) => leaf.parent(),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Branch(branch) => branch.set_parent(parent),
            Node::Leaf(leaf) => leaf.set_parent(parent),
        }
    }

    /// Entries counted against the degree: keys for a leaf, children for a branch.
    pub(crate) fn occupancy(&self) -> usize {
        match self {
            Node::Branch(branch) => branch.child_count(),
            Node::Leaf(leaf) => leaf.len(),
        }
    }

    pub(crate) fn min_occupancy(&self, degree: Degree) -> usize {
        match self {
            Node::Branch(_) => degree.min_children(),
            Node::Leaf(_) => degree.min_leaf_keys(),
        }
    }

    pub(crate) fn max_occupancy(&self, degree: Degree) -> usize {
        match self {
            Node::Branch(_) => degree.max_children(),
            Node::Leaf(_) => degree.max_leaf_keys(),
        }
    }

    /// True once a node holds more than `m` keys and must split.
    pub(crate) fn is_limit_exceeded(&self, degree: Degree) -> bool {
        self.keys().len() > degree.get()
    }

    pub(crate) fn is_full_enough(&self, degree: Degree) -> bool {
        self.occupancy() >= self.min_occupancy(degree)
    }

    /// True if giving one entry to a sibling keeps this node at or above its minimum.
    pub(crate) fn is_redistributable(&self, degree: Degree) -> bool {
        self.occupancy() > self.min_occupancy(degree)
    }

    /// True if `other` entries can be merged into this node without overflowing it.
    pub(crate) fn is_coalescible(&self, other: usize, degree: Degree) -> bool {
        self.occupancy() + other <= self.max_occupancy(degree)
    }
}

impl<K: Ord, V> Node<K, V> {
    pub(crate) fn has_key(&self, key: &K) -> bool {
        self.index_of_key(key).is_some()
    }

    pub(crate) fn index_of_key(&self, key: &K) -> Option<usize> {
        self.keys().binary_search(key).ok()
    }
}

impl<K: fmt::Display, V> Node<K, V> {
    /// Renders the keys as `[k1,k2,...]`.
    pub(crate) fn keys_to_string(&self) -> String {
        let mut out = String::from("[");
        for (i, key) in self.keys().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            // Writing into a `String` cannot fail.
            let _ = write!(out, "{key}");
        }
        out.push(']');
        out
    }
}
