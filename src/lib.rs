//! An in-memory B+ tree index with a configurable degree.
//!
//! [`BpTree`] maps unique, totally ordered keys to values. All pairs live in the
//! leaves, which are chained in key order; interior branches only route. The
//! degree `m` (at least 2) bounds every node: a leaf holds at most `m` keys and
//! a branch at most `m + 1` children.
//!
//! # Example
//!
//! ```
//! use bptree::BpTree;
//!
//! let mut index = BpTree::new(4);
//! for (key, value) in [(30, "A"), (130, "B"), (9, "C"), (81, "D"), (150, "E"), (40, "F"), (1, "G")] {
//!     index.insert(key, value);
//! }
//!
//! // Duplicate keys are refused and leave the tree untouched.
//! assert!(!index.insert(81, "X"));
//! assert_eq!(index.find(&81), Some(&"D"));
//!
//! // Removal rebalances by borrowing from or merging with siblings.
//! assert!(index.remove(&130));
//! assert_eq!(index.len(), 6);
//! assert!(index.validate().is_ok());
//!
//! // The leaf chain yields values in key order.
//! assert_eq!(index.render_values(), "G\nC\nA\nF\nD\nE\n");
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Degree per tree** - Any `m >= 2`, checked once by [`Degree`]
//! - **Arena storage** - Nodes address each other by index, so parent and
//!   sibling links need no reference counting
//! - **Self-audit** - [`BpTree::validate`] checks every structural invariant
//!
//! # Logging
//!
//! Structural changes (splits, borrows, merges, root promotion and demotion)
//! emit [`tracing`] events at `trace` and `debug` level. They cost nothing
//! unless a subscriber is installed.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod degree;
mod error;
mod raw;

pub mod bptree;

pub use bptree::BpTree;
pub use degree::Degree;
pub use error::{Error, Result};
