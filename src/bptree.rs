use alloc::string::String;
use core::borrow::Borrow;
use core::fmt::{self, Write};

use crate::Degree;
use crate::error::Result;
use crate::raw::RawBpTree;

mod iter;

pub use iter::{Iter, Keys, Values};

/// An ordered key/value index backed by a B+ tree with a configurable degree.
///
/// Every pair lives in a leaf; branches hold only separator keys. Leaves form a
/// doubly linked chain in key order, so iteration never climbs back through the
/// branches. Lookups, insertions and removals are `O(log_m n)`.
///
/// Unlike `BTreeMap`, inserting an existing key is refused rather than
/// overwriting it, and the degree `m` is chosen per tree.
///
/// # Examples
///
/// ```
/// use bptree::BpTree;
///
/// let mut tree = BpTree::new(4);
/// for (key, value) in [(30, "A"), (130, "B"), (9, "C"), (81, "D"), (150, "E"), (40, "F"), (1, "G")] {
///     assert!(tree.insert(key, value));
/// }
///
/// assert_eq!(tree.find(&81), Some(&"D"));
/// assert_eq!(tree.find(&999), None);
///
/// let values: Vec<_> = tree.values().copied().collect();
/// assert_eq!(values, ["G", "C", "A", "F", "D", "B", "E"]);
/// ```
pub struct BpTree<K, V> {
    raw: RawBpTree<K, V>,
}

impl<K, V> BpTree<K, V> {
    /// Creates an empty tree with degree `m`: leaves hold at most `m` keys and
    /// branches at most `m + 1` children.
    ///
    /// # Panics
    ///
    /// Panics if `m < 2`. Use [`BpTree::try_new`] to handle that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let tree: BpTree<i32, String> = BpTree::new(3);
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.degree().get(), 3);
    /// ```
    #[must_use]
    pub fn new(m: usize) -> Self {
        match Degree::new(m) {
            Ok(degree) => Self::with_degree(degree),
            Err(err) => panic!("`BpTree::new()` - {err}"),
        }
    }

    /// Creates an empty tree with degree `m`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDegree`](crate::Error::InvalidDegree) if `m < 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::{BpTree, Error};
    ///
    /// assert!(BpTree::<i32, i32>::try_new(4).is_ok());
    /// assert_eq!(BpTree::<i32, i32>::try_new(1).err(), Some(Error::InvalidDegree { degree: 1, min: 2 }));
    /// ```
    pub fn try_new(m: usize) -> Result<Self> {
        Ok(Self::with_degree(Degree::new(m)?))
    }

    /// Creates an empty tree with an already validated degree.
    #[must_use]
    pub fn with_degree(degree: Degree) -> Self {
        BpTree {
            raw: RawBpTree::new(degree),
        }
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.raw.degree()
    }

    /// Returns the number of pairs in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of levels, counting the leaf level. An empty tree has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(2);
    /// assert_eq!(tree.height(), 1);
    /// for key in 0..3 {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every pair, keeping the degree.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns an iterator over the pairs in ascending key order.
    ///
    /// The iterator follows the leaf chain from either end and is double-ended.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(3);
    /// tree.insert(2, 'b');
    /// tree.insert(1, 'a');
    /// tree.insert(3, 'c');
    ///
    /// let pairs: Vec<_> = tree.iter().collect();
    /// assert_eq!(pairs, [(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    /// assert_eq!(tree.iter().next_back(), Some((&3, &'c')));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values in ascending key order.
    ///
    /// The walk starts at the leftmost leaf and follows the leaf chain.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }
}

impl<K: Ord, V> BpTree<K, V> {
    /// Returns the value stored under `key`, or `None` if it is absent.
    ///
    /// A stored empty value is returned as `Some`, never confused with absence.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(3);
    /// tree.insert(1, String::new());
    /// assert_eq!(tree.find(&1).map(String::as_str), Some(""));
    /// assert_eq!(tree.find(&2), None);
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key).is_some()
    }

    /// Audits the structure: sorted keys, occupancy bounds, equal leaf depth,
    /// parent links, separator ranges, the leaf chain in both directions and
    /// the entry count.
    ///
    /// A tree changed only through this API always validates; this exists for
    /// tests and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found.
    pub fn validate(&self) -> Result<()> {
        self.raw.validate()
    }
}

impl<K: Ord + Clone, V> BpTree<K, V> {
    /// Inserts `key` with `value`. Returns `false` and leaves the tree unchanged
    /// if `key` is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(3);
    /// assert!(tree.insert(7, "seven"));
    /// assert!(!tree.insert(7, "SEVEN"));
    /// assert_eq!(tree.find(&7), Some(&"seven"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value).is_ok()
    }

    /// Inserts `key` with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if `key` is
    /// already present; the tree is not modified.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        self.raw.insert(key, value)
    }

    /// Removes `key`. Returns `false` if it was absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(3);
    /// tree.insert(1, ());
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).is_ok()
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if `key` is
    /// absent; the tree is not modified.
    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }
}

impl<K: fmt::Display, V> BpTree<K, V> {
    /// Renders the key layout breadth-first: one line per level, each node as
    /// `[k1,k2,...]`, nodes separated by a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BpTree;
    ///
    /// let mut tree = BpTree::new(4);
    /// for key in [30, 130, 9, 81, 150, 40, 1] {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.render_keys(), "[40,130]\n[1,9,30] [40,81] [130,150]\n");
    /// ```
    #[must_use]
    pub fn render_keys(&self) -> String {
        self.raw.render_keys()
    }
}

impl<K, V: fmt::Display> BpTree<K, V> {
    /// Renders every value on its own line in ascending key order.
    #[must_use]
    pub fn render_values(&self) -> String {
        let mut out = String::new();
        for value in self.values() {
            // Writing into a `String` cannot fail.
            let _ = writeln!(out, "{value}");
        }
        out
    }
}

impl<K: Clone, V: Clone> Clone for BpTree<K, V> {
    /// Deep-copies every node and rebuilds the copy's leaf chain. The copy shares
    /// nothing with `self`.
    fn clone(&self) -> Self {
        BpTree {
            raw: self.raw.duplicate(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.raw = source.raw.duplicate();
    }
}

impl<K, V> Default for BpTree<K, V> {
    /// Creates an empty tree of degree 3.
    fn default() -> Self {
        Self::with_degree(Degree::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BpTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a BpTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BpTree<K, V> {
    /// Inserts every pair; pairs whose key is already present are skipped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
