use core::iter::FusedIterator;

use crate::raw::{Handle, RawBpTree};

/// An iterator over the pairs of a [`BpTree`](crate::BpTree), in key order.
///
/// Created by [`BpTree::iter`](crate::BpTree::iter). Both ends walk the leaf
/// chain; `remaining` keeps them from crossing.
pub struct Iter<'a, K, V> {
    tree: &'a RawBpTree<K, V>,
    front_leaf: Handle,
    front_index: usize,
    back_leaf: Handle,
    /// One past the next pair yielded from the back.
    back_index: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawBpTree<K, V>) -> Self {
        let back_leaf = tree.last_leaf();
        Self {
            tree,
            front_leaf: tree.first_leaf(),
            front_index: 0,
            back_leaf,
            back_index: tree.node(back_leaf).as_leaf().len(),
            remaining: tree.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        loop {
            let leaf = tree.node(self.front_leaf).as_leaf();
            if self.front_index < leaf.len() {
                let entry = leaf.entry(self.front_index);
                self.front_index += 1;
                self.remaining -= 1;
                return Some(entry);
            }
            self.front_leaf = leaf.next()?;
            self.front_index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn count(self) -> usize {
        self.remaining
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        loop {
            let leaf = tree.node(self.back_leaf).as_leaf();
            if self.back_index > 0 {
                self.back_index -= 1;
                self.remaining -= 1;
                return Some(leaf.entry(self.back_index));
            }
            self.back_leaf = leaf.prev()?;
            self.back_index = tree.node(self.back_leaf).as_leaf().len();
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [`BpTree`](crate::BpTree), in order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`BpTree`](crate::BpTree), in key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}
