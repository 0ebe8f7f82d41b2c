use alloc::vec::Vec;

use super::handle::Handle;
use super::node::Node;
use super::raw_bptree::RawBpTree;
use crate::error::{Error, Result};

/// One pending node of the audit walk and the bounds its keys must respect.
struct Frame<'a, K> {
    node: Handle,
    parent: Option<Handle>,
    depth: usize,
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K: Ord, V> RawBpTree<K, V> {
    /// Audits the whole structure: key order, occupancy, leaf depth, parent links,
    /// separator ranges, the leaf chain in both directions and the entry count.
    pub(crate) fn validate(&self) -> Result<()> {
        let leaves = self.validate_nodes()?;
        self.validate_chain(&leaves)
    }

    /// Walks the ownership tree and returns its leaves in key order.
    fn validate_nodes(&self) -> Result<Vec<Handle>> {
        let degree = self.degree();
        let mut leaves = Vec::new();
        let mut leaf_depth = None;
        let mut count = 0;
        let mut stack = alloc::vec![Frame {
            node: self.root(),
            parent: None,
            depth: 0,
            lower: None,
            upper: None,
        }];

        while let Some(frame) = stack.pop() {
            let id = frame.node.to_index();
            let node = self.node(frame.node);
            if node.parent() != frame.parent {
                return Err(Error::BrokenParentLink { node: id });
            }

            let keys = node.keys();
            if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(Error::UnsortedKeys { node: id });
            }
            let in_range = |key: &K| {
                frame.lower.is_none_or(|lower| key >= lower) && frame.upper.is_none_or(|upper| key < upper)
            };
            if !keys.iter().all(in_range) {
                return Err(Error::SeparatorOutOfRange { node: id });
            }

            let (min, max) = match (node, frame.parent) {
                (_, Some(_)) => (node.min_occupancy(degree), node.max_occupancy(degree)),
                (Node::Leaf(_), None) => (0, degree.max_leaf_keys()),
                (Node::Branch(_), None) => (2, degree.max_children()),
            };
            let occupancy = node.occupancy();
            if occupancy < min || occupancy > max {
                return Err(Error::Occupancy {
                    node: id,
                    count: occupancy,
                    min,
                    max,
                });
            }

            match node {
                Node::Leaf(leaf) => {
                    let expected = *leaf_depth.get_or_insert(frame.depth);
                    if frame.depth != expected {
                        return Err(Error::UnevenDepth {
                            node: id,
                            expected,
                            found: frame.depth,
                        });
                    }
                    if leaf.values().len() != leaf.len() {
                        return Err(Error::LengthMismatch {
                            expected: leaf.len(),
                            found: leaf.values().len(),
                        });
                    }
                    count += leaf.len();
                    leaves.push(frame.node);
                }
                Node::Branch(branch) => {
                    let keys = branch.keys();
                    if branch.child_count() != keys.len() + 1 {
                        return Err(Error::Occupancy {
                            node: id,
                            count: branch.child_count(),
                            min: keys.len() + 1,
                            max: keys.len() + 1,
                        });
                    }
                    for (i, &child) in branch.children().iter().enumerate().rev() {
                        stack.push(Frame {
                            node: child,
                            parent: Some(frame.node),
                            depth: frame.depth + 1,
                            lower: if i == 0 { frame.lower } else { Some(&keys[i - 1]) },
                            upper: keys.get(i).or(frame.upper),
                        });
                    }
                }
            }
        }

        if count != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                found: count,
            });
        }
        Ok(leaves)
    }

    /// Checks that the chain visits exactly `leaves`, in order, both ways.
    fn validate_chain(&self, leaves: &[Handle]) -> Result<()> {
        let mut prev: Option<Handle> = None;
        let mut current = Some(self.first_leaf());
        for (position, &expected) in leaves.iter().enumerate() {
            if current != Some(expected) {
                return Err(Error::BrokenChain { position });
            }
            let leaf = self.node(expected).as_leaf();
            if leaf.prev() != prev {
                return Err(Error::BrokenChain { position });
            }
            if let (Some(before), Some(first)) = (prev, leaf.first_key()) {
                let before = self.node(before).as_leaf();
                if before.keys().last().is_some_and(|last| last >= first) {
                    return Err(Error::BrokenChain { position });
                }
            }
            prev = Some(expected);
            current = leaf.next();
        }
        if current.is_some() {
            return Err(Error::BrokenChain { position: leaves.len() });
        }

        let mut current = Some(self.last_leaf());
        for (position, &expected) in leaves.iter().enumerate().rev() {
            if current != Some(expected) {
                return Err(Error::BrokenChain { position });
            }
            current = self.node(expected).as_leaf().prev();
        }
        Ok(())
    }
}
