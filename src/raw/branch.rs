use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::{INLINE_CHILDREN, INLINE_KEYS};

/// Interior node: `k` separator keys and `k + 1` child handles.
///
/// Child `i` holds keys in `[keys[i - 1], keys[i])`; a key equal to a separator
/// routes to the child on its right.
pub(crate) struct BranchNode<K> {
    parent: Option<Handle>,
    keys: SmallVec<[K; INLINE_KEYS]>,
    children: SmallVec<[Handle; INLINE_CHILDREN]>,
}

impl<K> BranchNode<K> {
    /// Creates a branch whose only child is `child`. Used for root promotion.
    pub(crate) fn with_child(child: Handle) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self {
            parent: None,
            keys: SmallVec::new(),
            children,
        }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn first_child(&self) -> Handle {
        self.children[0]
    }

    pub(crate) fn last_child(&self) -> Handle {
        self.children[self.children.len() - 1]
    }

    /// Slot of `child` in this node, if it is one of ours.
    pub(crate) fn position_of(&self, child: Handle) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// Splits an overflowing branch. This node keeps `ceil(m / 2)` keys; the new
    /// right node takes the upper `floor(m / 2)` keys and the children after the
    /// middle key, which is removed from both and returned for promotion.
    ///
    /// The moved children still point at this node; the caller reparents them.
    pub(crate) fn split(&mut self) -> (K, BranchNode<K>) {
        let mid = self.keys.len() / 2;
        let right = BranchNode {
            parent: self.parent,
            keys: self.keys.drain(mid + 1..).collect(),
            children: self.children.drain(mid + 1..).collect(),
        };
        let Some(promoted) = self.keys.pop() else {
            unreachable!("`BranchNode::split()` - called on a branch without keys");
        };
        (promoted, right)
    }

    /// Removes the last key and last child.
    pub(crate) fn pop_back(&mut self) -> Option<(K, Handle)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Removes the first key and first child.
    pub(crate) fn pop_front(&mut self) -> Option<(K, Handle)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Prepends `child` with `key` as the separator between it and the current first child.
    pub(crate) fn push_front(&mut self, key: K, child: Handle) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Appends `child` with `key` as the separator between the current last child and it.
    pub(crate) fn push_back(&mut self, key: K, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Absorbs `right`, pulling `separator` down between the two key runs.
    pub(crate) fn append(&mut self, separator: K, right: BranchNode<K>) {
        self.keys.push(separator);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }

    /// Absorbs `left`, pulling `separator` down between the two key runs.
    pub(crate) fn prepend(&mut self, left: BranchNode<K>, separator: K) {
        self.keys.insert(0, separator);
        self.keys.insert_many(0, left.keys);
        self.children.insert_many(0, left.children);
        debug_assert_eq!(self.keys.len() + 1, self.children.len());
    }
}

impl<K: Ord> BranchNode<K> {
    /// Routes a descent: the child before the first separator strictly greater than `key`.
    #[inline]
    pub(crate) fn next_node<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.children[self.keys.partition_point(|k| k.borrow() <= key)]
    }

    /// Inserts `key` in order with `child` immediately to its right.
    /// Reparenting `child` is left to the caller, which owns the arena.
    pub(crate) fn insert_key(&mut self, key: K, child: Handle) {
        let index = self.keys.partition_point(|k| *k < key);
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes `key` and one adjacent child: the right one when `pivot >= key`,
    /// otherwise the left one. Returns the removed child, or `None` if `key` is
    /// not a separator here.
    pub(crate) fn remove_key(&mut self, key: &K, pivot: &K) -> Option<Handle> {
        let index = self.keys.binary_search(key).ok()?;
        let child_index = if pivot >= &self.keys[index] { index + 1 } else { index };
        self.keys.remove(index);
        Some(self.children.remove(child_index))
    }
}

impl<K: Clone> BranchNode<K> {
    /// Copies the separators; children are filled in by the caller.
    pub(crate) fn duplicate_keys(&self, parent: Option<Handle>) -> Self {
        Self {
            parent,
            keys: self.keys.clone(),
            children: SmallVec::with_capacity(self.children.len()),
        }
    }

    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }
}
