//! Common traits and error types for the heap
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`Heap`]: push/pop/peek/merge, compatible with Rust's standard heap API patterns
//! - [`DecreaseKeyHeap`]: adds handle-based `decrease_key`
//!
//! Generic code (and most of the integration tests) drives the binomial heap
//! through these traits, while the inherent methods on
//! [`BinomialHeap`](crate::binomial::BinomialHeap) expose the full surface
//! (`delete`, `find_node`, `extract_min`, `union`).

use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The new priority is not less than the current priority
    PriorityNotDecreased,
    /// The handle does not refer to an element of this heap (it was removed,
    /// or it belongs to another heap)
    InvalidHandle,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::PriorityNotDecreased => {
                write!(f, "new priority is not less than current priority")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle does not refer to an element in this heap")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A structural invariant that failed during validation
///
/// Returned by [`BinomialHeap::check_invariants`](crate::binomial::BinomialHeap::check_invariants).
/// Seeing one of these means the heap is corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node of a degree-`expected` position has a different child count
    ChildCount { expected: usize, found: usize },
    /// A child's priority is smaller than its parent's
    HeapOrder,
    /// A child does not point back at its parent, or a root has a parent
    ParentLink,
    /// The forest is not strictly ascending by degree
    ForestOrder { degree: usize },
    /// The trees hold a different number of nodes than the heap owns
    Length { expected: usize, found: usize },
    /// The entry position index disagrees with the node arena
    PositionIndex,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::ChildCount { expected, found } => {
                write!(f, "expected {} children, found {}", expected, found)
            }
            InvariantViolation::HeapOrder => write!(f, "child priority below parent priority"),
            InvariantViolation::ParentLink => write!(f, "inconsistent parent link"),
            InvariantViolation::ForestOrder { degree } => {
                write!(f, "forest not strictly ascending at degree {}", degree)
            }
            InvariantViolation::Length { expected, found } => {
                write!(f, "heap owns {} nodes but trees hold {}", expected, found)
            }
            InvariantViolation::PositionIndex => write!(f, "entry position index out of sync"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// A handle to an element in the heap, used for decrease_key and delete
///
/// Handles identify an element, not a priority: two elements with equal
/// priorities always have distinct handles.
pub trait Handle: Clone + PartialEq + Eq {}

/// Base trait for heap/priority queue data structures
///
/// This trait provides a simple API similar to Rust's `BinaryHeap`:
/// - `push` inserts an element (returns `()`)
/// - `pop` removes and returns the minimum
/// - `peek` returns the minimum without removing it
///
/// The heap stores (priority, item) pairs to separate the ordering key from the data.
///
/// # Example
///
/// ```rust
/// use rust_binomial_heap::Heap;
/// use rust_binomial_heap::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// Note that `BinaryHeap` is a max-heap, while this heap is a min-heap.
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    fn pop(&mut self) -> Option<(P, T)>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use rust_binomial_heap::{DecreaseKeyHeap, Heap};
/// use rust_binomial_heap::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Decreases the priority of an element identified by the handle
    ///
    /// # Errors
    /// Returns `HeapError::InvalidHandle` if the element is no longer in the
    /// heap, and `HeapError::PriorityNotDecreased` if the new priority is not
    /// less than the current priority. The heap is unchanged on error.
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;
}
