use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::INLINE_KEYS;

/// Terminal node: parallel key/value sequences plus the leaf-chain links.
///
/// `prev` and `next` are navigation only; the arena owns every leaf.
pub(crate) struct LeafNode<K, V> {
    parent: Option<Handle>,
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: SmallVec<[K; INLINE_KEYS]>,
    values: SmallVec<[V; INLINE_KEYS]>,
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            prev: None,
            next: None,
            keys: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> (&K, &V) {
        (&self.keys[index], &self.values[index])
    }

    /// Keeps the lower `ceil(len / 2)` pairs and returns a new leaf holding the
    /// upper `floor(len / 2)`. Chain links are left to the caller.
    pub(crate) fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len().div_ceil(2);
        let mut right = LeafNode::new();
        right.keys = self.keys.drain(mid..).collect();
        right.values = self.values.drain(mid..).collect();
        right.parent = self.parent;
        right
    }

    pub(crate) fn pop_back(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.values.remove(0)))
    }

    pub(crate) fn push_back(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn push_front(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    /// Appends every pair of `right`, which must hold larger keys.
    pub(crate) fn append(&mut self, right: LeafNode<K, V>) {
        self.keys.extend(right.keys);
        self.values.extend(right.values);
    }

    /// Prepends every pair of `left`, which must hold smaller keys.
    pub(crate) fn prepend(&mut self, left: LeafNode<K, V>) {
        self.keys.insert_many(0, left.keys);
        self.values.insert_many(0, left.values);
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.keys.binary_search_by(|k| k.borrow().cmp(key)).ok()?;
        Some(&self.values[index])
    }

    /// Inserts at the sorted position. The caller has already checked that `key` is absent.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let index = self.keys.partition_point(|k| *k < key);
        debug_assert!(self.keys.get(index) != Some(&key), "`LeafNode::insert()` - duplicate key");
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.keys.binary_search_by(|k| k.borrow().cmp(key)).ok()?;
        Some((self.keys.remove(index), self.values.remove(index)))
    }
}

impl<K: Clone, V: Clone> LeafNode<K, V> {
    /// Copies keys and values; links are cleared and rebuilt by the caller.
    pub(crate) fn duplicate(&self, parent: Option<Handle>) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            keys: self.keys.clone(),
            values: self.values.clone(),
        }
    }
}
