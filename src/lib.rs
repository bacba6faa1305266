//! Binomial Heap for Rust
//!
//! This crate provides a mergeable min-priority queue built as a forest of
//! binomial trees, supporting:
//!
//! - **insert**: O(log n)
//! - **extract_min**: O(log n)
//! - **decrease_key**: O(log n), handle based
//! - **delete** of an arbitrary element: O(log n), handle based
//! - **union** of two heaps: O(log n) forest union
//! - **find_node** by priority: O(n) breadth-first search
//!
//! Nodes are kept in a `slotmap` arena with parent/child links stored as ids.
//! Handles are identity tokens, so elements with equal priorities are never
//! confused with each other.
//!
//! # Example
//!
//! ```rust
//! use rust_binomial_heap::binomial::BinomialHeap;
//!
//! let mut a = BinomialHeap::new();
//! for key in [5, 4, 3, 6, 8, 9] {
//!     a.insert(key, ());
//! }
//! let mut b = BinomialHeap::new();
//! let two = b.insert(2, ());
//! b.insert(10, ());
//!
//! let mut heap = a.union(b);
//! assert_eq!(heap.len(), 8);
//! heap.decrease_key(&two, 1).unwrap();
//! assert_eq!(heap.extract_min(), Some((1, ())));
//! assert_eq!(heap.extract_min(), Some((3, ())));
//! ```
//!
//! # Features
//!
//! - `strict-invariants`: validate the whole structure after every mutating
//!   operation and panic on the first violation. Intended for tests.

pub mod binomial;
mod node;
pub mod traits;
pub mod tree;

// Re-export the main types for convenience
pub use binomial::{BinomialHandle, BinomialHeap};
pub use traits::{DecreaseKeyHeap, Heap, HeapError, InvariantViolation};
pub use tree::Tree;
