use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;

use super::arena::Arena;
use super::branch::BranchNode;
use super::handle::Handle;
use super::leaf::LeafNode;
use super::node::Node;
use crate::Degree;
use crate::error::{Error, Result};

/// The core B+Tree backing `BpTree`.
///
/// Every node lives in `nodes`; parent, child and leaf-chain relations are
/// handles into it. The root always exists: an empty tree is a single empty leaf.
pub(crate) struct RawBpTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Handle,
    degree: Degree,
    /// Number of key/value pairs in the tree.
    len: usize,
}

impl<K, V> RawBpTree<K, V> {
    pub(crate) fn new(degree: Degree) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            degree,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn degree(&self) -> Degree {
        self.degree
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Drops every node and starts over with an empty leaf root.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::Leaf(LeafNode::new()));
        self.len = 0;
    }

    /// Number of levels, counting the leaf level.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.first_child();
            height += 1;
        }
        height
    }

    /// Leftmost leaf, reached down the left spine.
    pub(crate) fn first_leaf(&self) -> Handle {
        let mut current = self.root;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.first_child();
        }
        current
    }

    /// Rightmost leaf, reached down the right spine.
    pub(crate) fn last_leaf(&self) -> Handle {
        let mut current = self.root;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.last_child();
        }
        current
    }

    /// Parent of `handle` and the slot `handle` occupies in it.
    fn slot(&self, handle: Handle) -> Option<(Handle, usize)> {
        let parent = self.nodes.get(handle).parent()?;
        let index = self
            .nodes
            .get(parent)
            .as_branch()
            .position_of(handle)
            .expect("`RawBpTree::slot()` - node is missing from its parent's children");
        Some((parent, index))
    }

    pub(crate) fn left_sibling(&self, handle: Handle) -> Option<Handle> {
        let (parent, index) = self.slot(handle)?;
        let index = index.checked_sub(1)?;
        Some(self.nodes.get(parent).as_branch().child(index))
    }

    pub(crate) fn right_sibling(&self, handle: Handle) -> Option<Handle> {
        let (parent, index) = self.slot(handle)?;
        let parent = self.nodes.get(parent).as_branch();
        (index + 1 < parent.child_count()).then(|| parent.child(index + 1))
    }

    /// All leaves in ascending key order, found by walking the tree (not the chain).
    pub(crate) fn leaves(&self) -> Vec<Handle> {
        let mut leaves = Vec::new();
        let mut stack = alloc::vec![self.root];
        while let Some(handle) = stack.pop() {
            match self.nodes.get(handle) {
                Node::Leaf(_) => leaves.push(handle),
                Node::Branch(branch) => stack.extend(branch.children().iter().rev()),
            }
        }
        leaves
    }

    /// Rebuilds every `prev`/`next` link from the tree's leaf order.
    fn link_leaves(&mut self) {
        let leaves = self.leaves();
        for (i, &leaf) in leaves.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| leaves[p]);
            let next = leaves.get(i + 1).copied();
            let leaf = self.nodes.get_mut(leaf).as_leaf_mut();
            leaf.set_prev(prev);
            leaf.set_next(next);
        }
    }

    /// Points every child of `branch` back at it.
    fn adopt_children(&mut self, branch: Handle) {
        for i in 0..self.nodes.get(branch).as_branch().child_count() {
            let child = self.nodes.get(branch).as_branch().child(i);
            self.nodes.get_mut(child).set_parent(Some(branch));
        }
    }

    /// Returns the parent of `handle`, first growing a new root above it if it has none.
    fn parent_or_promote_root(&mut self, handle: Handle) -> Handle {
        if let Some(parent) = self.nodes.get(handle).parent() {
            return parent;
        }
        let root = self.nodes.alloc(Node::Branch(BranchNode::with_child(handle)));
        self.nodes.get_mut(handle).set_parent(Some(root));
        self.root = root;
        tracing::debug!(root = %root, height = self.height(), "promoted new root");
        root
    }

    /// Replaces a branch root that has a single child with that child.
    fn collapse_root(&mut self) {
        loop {
            let Node::Branch(root) = self.nodes.get(self.root) else {
                return;
            };
            if root.child_count() != 1 {
                return;
            }
            let child = root.first_child();
            self.nodes.take(self.root);
            self.nodes.get_mut(child).set_parent(None);
            self.root = child;
            tracing::debug!(root = %child, height = self.height(), "demoted root");
        }
    }
}

impl<K: Ord, V> RawBpTree<K, V> {
    fn find_leaf<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.next_node(key);
        }
        current
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.nodes.get(self.find_leaf(key)).as_leaf().get(key)
    }
}

impl<K: Ord + Clone, V> RawBpTree<K, V> {
    /// Inserts a new pair, splitting and propagating upward on overflow.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if `key` is present; the tree is left untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        let leaf = self.find_leaf(&key);
        let node = self.nodes.get_mut(leaf);
        if node.has_key(&key) {
            return Err(Error::DuplicateKey);
        }
        node.as_leaf_mut().insert(key, value);
        self.len += 1;

        if node.is_limit_exceeded(self.degree) {
            self.split_leaf(leaf);
        }
        Ok(())
    }

    fn split_leaf(&mut self, handle: Handle) {
        let parent = self.parent_or_promote_root(handle);

        let leaf = self.nodes.get_mut(handle).as_leaf_mut();
        let mut right = leaf.split();
        let old_next = leaf.next();
        right.set_prev(Some(handle));
        right.set_next(old_next);
        let Some(separator) = right.first_key().cloned() else {
            unreachable!("`RawBpTree::split_leaf()` - split produced an empty leaf");
        };

        let right = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(handle).as_leaf_mut().set_next(Some(right));
        if let Some(next) = old_next {
            self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(right));
        }
        tracing::trace!(leaf = %handle, right = %right, "split leaf");

        self.insert_into_branch(parent, separator, right);
    }

    /// Inserts `key` and `child` into `branch`, splitting each overflowing ancestor in turn.
    fn insert_into_branch(&mut self, mut branch: Handle, mut key: K, mut child: Handle) {
        loop {
            self.nodes.get_mut(child).set_parent(Some(branch));
            let node = self.nodes.get_mut(branch);
            node.as_branch_mut().insert_key(key, child);
            if !node.is_limit_exceeded(self.degree) {
                return;
            }

            let parent = self.parent_or_promote_root(branch);
            let (promoted, right) = self.nodes.get_mut(branch).as_branch_mut().split();
            let right = self.nodes.alloc(Node::Branch(right));
            self.adopt_children(right);
            tracing::trace!(branch = %branch, right = %right, "split branch");

            branch = parent;
            key = promoted;
            child = right;
        }
    }

    /// Removes `key`, then repairs any underflow from the leaf up.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if `key` is absent; the tree is left untouched.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let leaf = self.find_leaf(key);
        let (removed, value) = self.nodes.get_mut(leaf).as_leaf_mut().remove(key).ok_or(Error::KeyNotFound)?;
        self.len -= 1;

        let anchor = self.rebalance(leaf, removed);
        if anchor == self.root {
            self.collapse_root();
        }
        Ok(value)
    }

    /// Repairs `handle` after it lost an entry, climbing while merges empty a
    /// separator out of the parent. `removed` is the key most recently deleted
    /// from `handle`. Returns the last node touched.
    ///
    /// Repair order: borrow from the left sibling, borrow from the right, merge
    /// into the left, merge into the right. A node with no usable sibling stays
    /// underfull; only the root is ever in that position.
    fn rebalance(&mut self, mut handle: Handle, mut removed: K) -> Handle {
        loop {
            let node = self.nodes.get(handle);
            if node.is_full_enough(self.degree) {
                return handle;
            }
            let Some((parent, slot)) = self.slot(handle) else {
                return handle;
            };
            let occupancy = node.occupancy();
            let pivot = node.keys().first().cloned().unwrap_or(removed);
            let left = self.left_sibling(handle);
            let right = self.right_sibling(handle);

            if let Some(left) = left.filter(|&h| self.nodes.get(h).is_redistributable(self.degree)) {
                self.redistribute_from_left(handle, left, parent, slot);
                return handle;
            }
            if let Some(right) = right.filter(|&h| self.nodes.get(h).is_redistributable(self.degree)) {
                self.redistribute_from_right(handle, right, parent, slot);
                return handle;
            }

            let separator = if let Some(left) =
                left.filter(|&h| self.nodes.get(h).is_coalescible(occupancy, self.degree))
            {
                self.coalesce_into_left(handle, left, parent, slot)
            } else if let Some(right) =
                right.filter(|&h| self.nodes.get(h).is_coalescible(occupancy, self.degree))
            {
                self.coalesce_into_right(handle, right, parent, slot)
            } else {
                return handle;
            };

            let detached = self.nodes.get_mut(parent).as_branch_mut().remove_key(&separator, &pivot);
            assert_eq!(
                detached,
                Some(handle),
                "`RawBpTree::rebalance()` - separator did not detach the merged node"
            );

            handle = parent;
            removed = separator;
        }
    }

    /// Moves the last entry of `left` to the front of `handle`.
    fn redistribute_from_left(&mut self, handle: Handle, left: Handle, parent: Handle, slot: usize) {
        let separator = match self.nodes.get_mut(left) {
            Node::Leaf(sibling) => {
                let (key, value) = sibling.pop_back().expect("`RawBpTree::redistribute_from_left()` - empty sibling");
                self.nodes.get_mut(handle).as_leaf_mut().push_front(key.clone(), value);
                key
            }
            Node::Branch(sibling) => {
                let (key, child) = sibling.pop_back().expect("`RawBpTree::redistribute_from_left()` - empty sibling");
                let down = self.nodes.get(parent).as_branch().key(slot - 1).clone();
                self.nodes.get_mut(handle).as_branch_mut().push_front(down, child);
                self.nodes.get_mut(child).set_parent(Some(handle));
                key
            }
        };
        self.nodes.get_mut(parent).as_branch_mut().set_key(slot - 1, separator);
        tracing::trace!(node = %handle, sibling = %left, "borrowed from left sibling");
    }

    /// Moves the first entry of `right` to the back of `handle`.
    fn redistribute_from_right(&mut self, handle: Handle, right: Handle, parent: Handle, slot: usize) {
        let separator = match self.nodes.get_mut(right) {
            Node::Leaf(sibling) => {
                let (key, value) = sibling.pop_front().expect("`RawBpTree::redistribute_from_right()` - empty sibling");
                let next_first = sibling
                    .first_key()
                    .cloned()
                    .expect("`RawBpTree::redistribute_from_right()` - sibling emptied by lending");
                self.nodes.get_mut(handle).as_leaf_mut().push_back(key, value);
                next_first
            }
            Node::Branch(sibling) => {
                let (key, child) = sibling.pop_front().expect("`RawBpTree::redistribute_from_right()` - empty sibling");
                let down = self.nodes.get(parent).as_branch().key(slot).clone();
                self.nodes.get_mut(handle).as_branch_mut().push_back(down, child);
                self.nodes.get_mut(child).set_parent(Some(handle));
                key
            }
        };
        self.nodes.get_mut(parent).as_branch_mut().set_key(slot, separator);
        tracing::trace!(node = %handle, sibling = %right, "borrowed from right sibling");
    }

    /// Empties `handle` into `left` and frees it. Returns the separator between them,
    /// which the caller removes from `parent`.
    fn coalesce_into_left(&mut self, handle: Handle, left: Handle, parent: Handle, slot: usize) -> K {
        let separator = self.nodes.get(parent).as_branch().key(slot - 1).clone();
        match self.nodes.take(handle) {
            Node::Leaf(leaf) => {
                let next = leaf.next();
                let sibling = self.nodes.get_mut(left).as_leaf_mut();
                sibling.append(leaf);
                sibling.set_next(next);
                if let Some(next) = next {
                    self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(left));
                }
            }
            Node::Branch(branch) => {
                self.nodes.get_mut(left).as_branch_mut().append(separator.clone(), branch);
                self.adopt_children(left);
            }
        }
        tracing::trace!(node = %handle, into = %left, "merged into left sibling");
        separator
    }

    /// Empties `handle` into `right` and frees it. Returns the separator between them,
    /// which the caller removes from `parent`.
    fn coalesce_into_right(&mut self, handle: Handle, right: Handle, parent: Handle, slot: usize) -> K {
        let separator = self.nodes.get(parent).as_branch().key(slot).clone();
        match self.nodes.take(handle) {
            Node::Leaf(leaf) => {
                let prev = leaf.prev();
                let sibling = self.nodes.get_mut(right).as_leaf_mut();
                sibling.prepend(leaf);
                sibling.set_prev(prev);
                if let Some(prev) = prev {
                    self.nodes.get_mut(prev).as_leaf_mut().set_next(Some(right));
                }
            }
            Node::Branch(branch) => {
                self.nodes.get_mut(right).as_branch_mut().prepend(branch, separator.clone());
                self.adopt_children(right);
            }
        }
        tracing::trace!(node = %handle, into = %right, "merged into right sibling");
        separator
    }
}

impl<K: Clone, V: Clone> RawBpTree<K, V> {
    /// Deep-copies every node from the root down, then rebuilds the leaf chain
    /// from the copy's own leaf order. Handles in the copy are unrelated to ours.
    pub(crate) fn duplicate(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.nodes.len());
        let mut root = None;
        // (source node, parent in the copy)
        let mut stack: Vec<(Handle, Option<Handle>)> = alloc::vec![(self.root, None)];

        while let Some((source, parent)) = stack.pop() {
            let copy = match self.nodes.get(source) {
                Node::Leaf(leaf) => nodes.alloc(Node::Leaf(leaf.duplicate(parent))),
                Node::Branch(branch) => {
                    let copy = nodes.alloc(Node::Branch(branch.duplicate_keys(parent)));
                    stack.extend(branch.children().iter().rev().map(|&child| (child, Some(copy))));
                    copy
                }
            };
            match parent {
                Some(parent) => nodes.get_mut(parent).as_branch_mut().push_child(copy),
                None => root = Some(copy),
            }
        }

        let mut tree = Self {
            nodes,
            root: root.expect("`RawBpTree::duplicate()` - source tree has no root"),
            degree: self.degree,
            len: self.len,
        };
        tree.link_leaves();
        tracing::debug!(nodes = tree.nodes.len(), len = tree.len, "duplicated tree");
        tree
    }
}

impl<K: fmt::Display, V> RawBpTree<K, V> {
    /// Breadth-first key layout: one line per level, nodes separated by spaces.
    pub(crate) fn render_keys(&self) -> String {
        let mut out = String::new();
        let mut level = alloc::vec![self.root];
        while !level.is_empty() {
            let mut next = Vec::new();
            for (i, &handle) in level.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                let node = self.nodes.get(handle);
                out.push_str(&node.keys_to_string());
                if let Node::Branch(branch) = node {
                    next.extend_from_slice(branch.children());
                }
            }
            out.push('\n');
            level = next;
        }
        out
    }
}

#[cfg(test)]
impl<K, V> RawBpTree<K, V> {
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn set_len_for_test(&mut self, len: usize) {
        self.len = len;
    }

    pub(crate) fn node_mut_for_test(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use pretty_assertions::assert_eq;

    fn tree(m: usize, keys: &[i32]) -> RawBpTree<i32, String> {
        let mut tree = RawBpTree::new(Degree::new(m).unwrap());
        for &key in keys {
            tree.insert(key, key.to_string()).unwrap();
        }
        tree
    }

    fn chain_keys(tree: &RawBpTree<i32, String>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = Some(tree.first_leaf());
        while let Some(handle) = current {
            let leaf = tree.node(handle).as_leaf();
            keys.extend_from_slice(leaf.keys());
            current = leaf.next();
        }
        keys
    }

    #[test]
    fn first_overflow_promotes_a_root() {
        let tree = tree(4, &[30, 130, 9, 81, 150]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.render_keys(), "[130]\n[9,30,81] [130,150]\n");
        assert!(tree.node(tree.root()).parent().is_none());
    }

    #[test]
    fn branch_split_promotes_without_duplicating() {
        let tree = tree(2, &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.render_keys(), "[5]\n[3] [7]\n[1,2] [3,4] [5,6] [7]\n");
        assert_eq!(tree.height(), 3);
        assert_eq!(chain_keys(&tree), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = tree(3, &[1, 2, 3, 4]);
        let before = tree.render_keys();
        assert_eq!(tree.insert(3, "x".to_string()), Err(Error::DuplicateKey));
        assert_eq!(tree.render_keys(), before);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(&3).map(String::as_str), Some("3"));
    }

    #[test]
    fn siblings_follow_the_parent_slots() {
        let tree = tree(2, &[1, 2, 3]);
        // [3] -> [1,2] [3]
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(tree.left_sibling(leaves[0]), None);
        assert_eq!(tree.right_sibling(leaves[0]), Some(leaves[1]));
        assert_eq!(tree.left_sibling(leaves[1]), Some(leaves[0]));
        assert_eq!(tree.right_sibling(leaves[1]), None);
        assert_eq!(tree.left_sibling(tree.root()), None);
    }

    #[test]
    fn remove_borrows_from_left_sibling() {
        // m = 3: [3] -> [1,2] [3,4]; adding 0 gives [0,1,2] [3,4].
        let mut tree = tree(3, &[1, 2, 3, 4, 0]);
        assert_eq!(tree.render_keys(), "[3]\n[0,1,2] [3,4]\n");
        assert_eq!(tree.remove(&4).unwrap(), "4");
        assert_eq!(tree.render_keys(), "[2]\n[0,1] [2,3]\n");
        assert_eq!(chain_keys(&tree), [0, 1, 2, 3]);
    }

    #[test]
    fn remove_borrows_from_right_sibling() {
        let mut tree = tree(3, &[1, 2, 3, 4, 5]);
        assert_eq!(tree.render_keys(), "[3]\n[1,2] [3,4,5]\n");
        tree.remove(&1).unwrap();
        assert_eq!(tree.render_keys(), "[4]\n[2,3] [4,5]\n");
    }

    #[test]
    fn merge_cascades_to_root_demotion() {
        let mut tree = tree(3, &[1, 2, 3, 4]);
        assert_eq!(tree.render_keys(), "[3]\n[1,2] [3,4]\n");
        tree.remove(&4).unwrap();
        assert_eq!(tree.render_keys(), "[1,2,3]\n");
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(tree.root()).parent().is_none());
    }

    #[test]
    fn merge_into_right_sibling_relinks_chain() {
        let mut tree = tree(3, &[1, 2, 3, 4]);
        tree.remove(&1).unwrap();
        assert_eq!(tree.render_keys(), "[2,3,4]\n");
        assert_eq!(chain_keys(&tree), [2, 3, 4]);
        let leaf = tree.node(tree.root()).as_leaf();
        assert_eq!((leaf.prev(), leaf.next()), (None, None));
    }

    #[test]
    fn removing_the_last_key_leaves_an_empty_root() {
        let mut tree = tree(4, &[7]);
        assert_eq!(tree.remove(&7).unwrap(), "7");
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.render_keys(), "[]\n");
        assert_eq!(tree.get(&7), None);
        assert_eq!(tree.remove(&7), Err(Error::KeyNotFound));
    }

    #[test]
    fn duplicate_is_independent_and_relinked() {
        let source = tree(2, &[5, 1, 4, 2, 3, 6, 0]);
        let mut copy = source.duplicate();
        assert_eq!(copy.render_keys(), source.render_keys());
        assert_eq!(chain_keys(&copy), chain_keys(&source));

        copy.remove(&4).unwrap();
        copy.insert(10, "10".to_string()).unwrap();
        assert_eq!(source.get(&4).map(String::as_str), Some("4"));
        assert_eq!(source.get(&10), None);
        assert_eq!(chain_keys(&copy), [0, 1, 2, 3, 5, 6, 10]);
    }

    #[test]
    fn clear_resets_to_an_empty_leaf() {
        let mut tree = tree(2, &[1, 2, 3, 4, 5, 6]);
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        tree.insert(1, "1".to_string()).unwrap();
        assert_eq!(chain_keys(&tree), [1]);
    }
}
