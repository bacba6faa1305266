//! Binomial Heap implementation
//!
//! A binomial heap is a collection of binomial trees with:
//! - O(log n) insert and extract_min
//! - O(log n) decrease_key
//! - O(log n) union of the tree forests
//!
//! # Algorithm Overview
//!
//! The heap maintains a forest of binomial trees, where:
//! - Each tree satisfies the heap property
//! - The forest is sorted by ascending degree
//! - At most one tree of each degree (0, 1, 2, ..., log n) after every operation
//!
//! **Key Operations**:
//! - **Insert**: wrap the element in a degree-0 tree and union it into the forest
//! - **Union**: concatenate both forests, sort by degree, link adjacent trees of
//!   equal degree in one left-to-right pass, sort again
//! - **Extract-min**: detach the tree with the smallest root, explode its children
//!   into a forest, union that forest back
//! - **Decrease-key**: overwrite the priority and bubble it up its tree
//! - **Delete**: move the element to the root of its tree, then remove that root
//!   exactly like extract-min does
//!
//! # Storage
//!
//! Nodes live in a `slotmap` arena owned by the heap (see the `node` module).
//! Bubbling swaps entries between arena positions instead of relinking nodes, so
//! the binomial shape never changes during decrease_key or delete. Each entry
//! carries a unique id and the heap tracks where every id currently sits, which
//! is what a [`BinomialHandle`] resolves through.
//!
//! Uniting two heaps moves the nodes of the smaller heap into the arena of the
//! larger one. Handles from either side remain valid in the result.

use crate::node::{EntryId, NodeArena};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError, InvariantViolation};
use crate::tree::Tree;
use log::{debug, trace};
use std::fmt;
use std::mem;

/// Handle to an element in a Binomial heap
///
/// Handles are plain identity tokens. A handle whose element was removed stays
/// harmless: operations on it return [`HeapError::InvalidHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinomialHandle {
    id: EntryId,
}

impl Handle for BinomialHandle {}

/// Binomial Heap
///
/// # Example
///
/// ```rust
/// use rust_binomial_heap::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"item")));
/// assert_eq!(heap.delete(&handle), Ok((1, "item")));
/// assert_eq!(heap.extract_min(), Some((3, "other")));
/// ```
pub struct BinomialHeap<T, P: Ord> {
    nodes: NodeArena<T, P>,
    /// Sorted by ascending degree, one tree per degree
    forest: Vec<Tree>,
}

impl<T, P: Ord> Default for BinomialHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Ord> BinomialHeap<T, P> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::default(),
            forest: Vec::new(),
        }
    }

    /// Creates an empty heap whose arena can hold `capacity` elements without
    /// reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            forest: Vec::new(),
        }
    }

    /// Number of elements in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Removes every element. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.forest.clear();
    }

    /// Inserts an element, returning a handle to it
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// The element becomes a degree-0 tree which is unioned into the forest.
    pub fn insert(&mut self, priority: P, item: T) -> BinomialHandle {
        let (node, id) = self.nodes.alloc(priority, item);
        let forest = mem::take(&mut self.forest);
        self.forest = union_forests(&mut self.nodes, forest, vec![Tree::singleton(node)]);
        self.validate();
        BinomialHandle { id }
    }

    /// Unites two heaps into a new one
    ///
    /// **Time Complexity**: O(log n) for the forest union, plus moving the
    /// nodes of the smaller heap into the larger heap's arena
    ///
    /// Both inputs are consumed. Handles issued by either heap refer to the
    /// same elements in the result.
    pub fn union(mut self, mut other: Self) -> Self {
        if other.nodes.len() > self.nodes.len() {
            // keep the forests in place so ties still resolve in favour of `self`
            mem::swap(&mut self.nodes, &mut other.nodes);
            let remap = self.nodes.absorb(mem::take(&mut other.nodes));
            for tree in &mut self.forest {
                tree.set_root(remap[&tree.root()]);
            }
        } else {
            let remap = self.nodes.absorb(mem::take(&mut other.nodes));
            for tree in &mut other.forest {
                tree.set_root(remap[&tree.root()]);
            }
        }
        trace!(
            "uniting forests of {} and {} trees",
            self.forest.len(),
            other.forest.len()
        );

        let forest = mem::take(&mut self.forest);
        self.forest = union_forests(&mut self.nodes, forest, other.forest);
        self.validate();
        self
    }

    /// Finds the first element whose priority equals `priority`
    ///
    /// Trees are scanned in forest order, each one breadth-first. With
    /// duplicate priorities the match is whichever element the scan reaches
    /// first, so prefer the handle returned by [`insert`](Self::insert) when the
    /// exact element matters.
    pub fn find_node(&self, priority: &P) -> Option<BinomialHandle> {
        self.forest.iter().find_map(|tree| {
            tree.find_node(&self.nodes, priority).map(|node| BinomialHandle {
                id: self.nodes[node].entry.id,
            })
        })
    }

    /// The tree whose root holds the minimum priority
    ///
    /// The first tree wins among equal roots. None for an empty heap.
    pub fn min_tree(&self) -> Option<&Tree> {
        self.min_tree_index().map(|index| &self.forest[index])
    }

    fn min_tree_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, tree) in self.forest.iter().enumerate() {
            let is_smaller = match best {
                Some(b) => {
                    self.nodes[tree.root()].priority() < self.nodes[self.forest[b].root()].priority()
                }
                None => true,
            };
            if is_smaller {
                best = Some(index);
            }
        }
        best
    }

    /// Returns the minimum priority and its item without removing it
    ///
    /// **Time Complexity**: O(log n), a scan over the tree roots
    pub fn peek(&self) -> Option<(&P, &T)> {
        let index = self.min_tree_index()?;
        let entry = &self.nodes[self.forest[index].root()].entry;
        Some((&entry.priority, &entry.item))
    }

    /// Removes and returns the minimum element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**:
    /// 1. Find the tree with the minimum root
    /// 2. Remove it from the forest by position
    /// 3. Explode its root's children into a forest of degrees 0..k-1
    /// 4. Union that forest back into the heap
    pub fn extract_min(&mut self) -> Option<(P, T)> {
        let index = self.min_tree_index()?;
        let removed = self.remove_root(index);
        self.validate();
        removed
    }

    /// Decreases the priority of an element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// The new priority is written in place and bubbled up. Binomial heaps
    /// never cut subtrees, so the forest shape is unchanged.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is not in this heap
    /// - [`HeapError::PriorityNotDecreased`] if `new_priority` is not strictly
    ///   smaller than the current priority
    pub fn decrease_key(&mut self, handle: &BinomialHandle, new_priority: P) -> Result<(), HeapError> {
        let node = self
            .nodes
            .locate(handle.id)
            .ok_or(HeapError::InvalidHandle)?;
        if new_priority >= *self.nodes[node].priority() {
            return Err(HeapError::PriorityNotDecreased);
        }

        self.nodes.set_priority(node, new_priority);
        self.nodes.bubble_up(node);
        self.validate();
        Ok(())
    }

    /// Removes an arbitrary element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// The element is moved to the root of its tree, each ancestor shifting down
    /// one level on the way, and that root is then removed like a minimum. No
    /// "minus infinity" priority is needed, so any `Ord` priority type works.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the element is not in this heap.
    pub fn delete(&mut self, handle: &BinomialHandle) -> Result<(P, T), HeapError> {
        let node = self
            .nodes
            .locate(handle.id)
            .ok_or(HeapError::InvalidHandle)?;
        let root = self.nodes.sift_to_root(node);
        let index = self
            .forest
            .iter()
            .position(|tree| tree.root() == root)
            .ok_or(HeapError::InvalidHandle)?;

        let removed = self.remove_root(index).ok_or(HeapError::InvalidHandle)?;
        debug!("deleted element at tree index {}", index);
        self.validate();
        Ok(removed)
    }

    /// Returns true if the handle's element is still in this heap
    pub fn contains(&self, handle: &BinomialHandle) -> bool {
        self.nodes.locate(handle.id).is_some()
    }

    /// Returns the priority and item of the handle's element
    pub fn get(&self, handle: &BinomialHandle) -> Option<(&P, &T)> {
        let node = self.nodes.locate(handle.id)?;
        let entry = &self.nodes[node].entry;
        Some((&entry.priority, &entry.item))
    }

    /// The forest, in ascending degree order
    pub fn trees(&self) -> &[Tree] {
        &self.forest
    }

    /// Degrees of the trees in the forest, ascending
    pub fn degrees(&self) -> Vec<usize> {
        self.forest.iter().map(Tree::degree).collect()
    }

    /// Drains the heap in ascending priority order
    pub fn into_sorted_vec(mut self) -> Vec<(P, T)> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(entry) = self.extract_min() {
            out.push(entry);
        }
        out
    }

    /// Checks every structural invariant of the heap
    ///
    /// - every tree is a binomial tree of its degree with consistent parent links
    /// - heap order holds inside every tree
    /// - degrees strictly ascend across the forest
    /// - the trees hold exactly the nodes the heap owns
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for pair in self.forest.windows(2) {
            if pair[0].degree() >= pair[1].degree() {
                return Err(InvariantViolation::ForestOrder {
                    degree: pair[1].degree(),
                });
            }
        }

        let mut found = 0;
        for tree in &self.forest {
            found += tree.check_shape(&self.nodes)?;
        }
        if found != self.nodes.len() {
            return Err(InvariantViolation::Length {
                expected: self.nodes.len(),
                found,
            });
        }

        if !self.nodes.positions_consistent() {
            return Err(InvariantViolation::PositionIndex);
        }
        Ok(())
    }

    /// Detaches the root of `forest[index]` and unions its children back
    fn remove_root(&mut self, index: usize) -> Option<(P, T)> {
        let tree = self.forest.remove(index);
        let (root, children) = tree.extract_min(&mut self.nodes);
        trace!(
            "removed root of degree-{} tree, reinserting {} subtrees",
            tree.degree(),
            children.len()
        );

        let forest = mem::take(&mut self.forest);
        self.forest = union_forests(&mut self.nodes, forest, children);
        self.nodes
            .free(root)
            .map(|entry| (entry.priority, entry.item))
    }

    #[inline]
    fn validate(&self) {
        #[cfg(feature = "strict-invariants")]
        if let Err(violation) = self.check_invariants() {
            panic!("binomial heap invariant violated: {}", violation);
        }
    }
}

impl<T, P: Ord + fmt::Display> BinomialHeap<T, P> {
    /// Renders every tree of the forest in parenthesized list notation
    ///
    /// One string per tree, in forest order. See the `tree` module for the
    /// format; there is no parser for it.
    pub fn newick_strings(&self) -> Vec<String> {
        self.forest
            .iter()
            .map(|tree| tree.newick_string(&self.nodes))
            .collect()
    }
}

/// Unites two forests that share one arena
///
/// The forests are concatenated and stably sorted by degree. A single pass then
/// walks left to right: whenever two adjacent trees have equal degree they are
/// linked in place and the pass continues at the same position with one tree
/// fewer, never rescanning from the start. The forest is sorted again at the
/// end.
///
/// A carry produced by a link can end up behind a lower-degree tree, e.g.
/// uniting degrees {0, 1, 2} with {0, 1} leaves [2, 1, 2] after one pass. The
/// pass and sort therefore repeat until no two adjacent degrees are equal; most
/// unions finish after the first round.
pub(crate) fn union_forests<T, P: Ord>(
    nodes: &mut NodeArena<T, P>,
    mut forest: Vec<Tree>,
    other: Vec<Tree>,
) -> Vec<Tree> {
    forest.extend(other);
    forest.sort_by_key(Tree::degree);

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut i = 0;
        while i + 1 < forest.len() {
            if forest[i].degree() == forest[i + 1].degree() {
                let next = forest.remove(i + 1);
                forest[i].merge(next, nodes);
            } else {
                i += 1;
            }
        }
        forest.sort_by_key(Tree::degree);

        if !forest.windows(2).any(|w| w[0].degree() == w[1].degree()) {
            break;
        }
    }
    if rounds > 1 {
        trace!("forest union needed {} link passes", rounds);
    }
    forest
}

impl<T, P: Ord> fmt::Debug for BinomialHeap<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinomialHeap")
            .field("len", &self.len())
            .field("degrees", &self.degrees())
            .finish()
    }
}

impl<T, P: Ord> Extend<(P, T)> for BinomialHeap<T, P> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.insert(priority, item);
        }
    }
}

impl<T, P: Ord> FromIterator<(P, T)> for BinomialHeap<T, P> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = BinomialHeap::new();
        heap.extend(iter);
        heap
    }
}

impl<T, P: Ord> Heap<T, P> for BinomialHeap<T, P> {
    fn new() -> Self {
        BinomialHeap::new()
    }

    fn is_empty(&self) -> bool {
        BinomialHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        BinomialHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        BinomialHeap::peek(self)
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        let this = mem::take(self);
        *self = this.union(other);
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for BinomialHeap<T, P> {
    type Handle = BinomialHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        BinomialHeap::decrease_key(self, handle, new_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_of(priorities: &[i32]) -> BinomialHeap<(), i32> {
        priorities.iter().map(|&p| (p, ())).collect()
    }

    #[test]
    fn test_degrees_follow_binary_representation() {
        for n in 0..64usize {
            let heap = heap_of(&(0..n as i32).collect::<Vec<_>>());
            let expected: Vec<usize> = (0..usize::BITS as usize).filter(|b| n & (1 << b) != 0).collect();
            assert_eq!(heap.degrees(), expected, "n = {}", n);
            assert_eq!(heap.check_invariants(), Ok(()));
        }
    }

    #[test]
    fn test_union_forests_repeats_pass_for_misplaced_carry() {
        // degrees {0, 1, 2} and {0, 1}: the first pass leaves [2, 1, 2]
        let heap = heap_of(&[1, 2, 3, 4, 5, 6, 7]).union(heap_of(&[8, 9, 10]));
        assert_eq!(heap.degrees(), vec![1, 3]);
        assert_eq!(heap.len(), 10);
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_min_tree_first_wins_ties() {
        let mut heap = BinomialHeap::new();
        heap.insert(2, "a");
        heap.insert(9, "b");
        heap.insert(2, "c");
        // degrees [0, 1]: "c" alone, then "a" over "b"
        let min = heap.min_tree().unwrap();
        assert_eq!(min.degree(), 0);
        assert_eq!(heap.peek(), Some((&2, &"c")));
    }

    #[test]
    fn test_min_tree_empty() {
        let heap: BinomialHeap<(), i32> = BinomialHeap::new();
        assert!(heap.min_tree().is_none());
        assert!(heap.peek().is_none());
    }

    #[test]
    fn test_union_keeps_handles_from_both_sides() {
        let mut small = BinomialHeap::new();
        let s = small.insert(50, "small");
        let mut large = BinomialHeap::new();
        let l = large.insert(40, "large");
        for i in 0..10 {
            large.insert(100 + i, "filler");
        }

        // small absorbs into large's arena
        let mut heap = small.union(large);
        assert_eq!(heap.get(&s), Some((&50, &"small")));
        assert_eq!(heap.get(&l), Some((&40, &"large")));
        heap.decrease_key(&s, 1).unwrap();
        assert_eq!(heap.extract_min(), Some((1, "small")));
        assert_eq!(heap.delete(&l), Ok((40, "large")));
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_decrease_key_errors_leave_heap_untouched() {
        let mut heap = BinomialHeap::new();
        let h = heap.insert(10, ());
        heap.insert(20, ());

        assert_eq!(heap.decrease_key(&h, 10), Err(HeapError::PriorityNotDecreased));
        assert_eq!(heap.decrease_key(&h, 11), Err(HeapError::PriorityNotDecreased));
        assert_eq!(heap.get(&h), Some((&10, &())));

        heap.delete(&h).unwrap();
        assert_eq!(heap.decrease_key(&h, 0), Err(HeapError::InvalidHandle));
        assert_eq!(heap.delete(&h), Err(HeapError::InvalidHandle));
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_handle_follows_entry_through_bubbling() {
        let mut heap = BinomialHeap::new();
        let handles: Vec<BinomialHandle> = (0..16).map(|i| heap.insert(i * 10, i)).collect();
        heap.decrease_key(&handles[15], -1).unwrap();
        heap.decrease_key(&handles[7], -2).unwrap();

        for (i, handle) in handles.iter().enumerate() {
            let (_, item) = heap.get(handle).unwrap();
            assert_eq!(*item, i as i32);
        }
        assert_eq!(heap.peek(), Some((&-2, &7)));
    }

    #[test]
    fn test_find_node_matches_by_priority() {
        let heap = heap_of(&[5, 4, 3, 6, 8, 9]);
        let handle = heap.find_node(&8).unwrap();
        assert_eq!(heap.get(&handle), Some((&8, &())));
        assert!(heap.find_node(&7).is_none());
    }

    #[test]
    fn test_newick_strings() {
        let heap = heap_of(&[5, 4, 3]);
        assert_eq!(heap.newick_strings(), vec!["(3);".to_string(), "(4,(5));".to_string()]);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut heap = heap_of(&[3, 1, 2]);
        let h = heap.find_node(&1).unwrap();
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(&h));
        heap.insert(7, ());
        assert_eq!(heap.extract_min(), Some((7, ())));
    }

    #[test]
    fn test_debug_output() {
        let heap = heap_of(&[1, 2, 3]);
        assert_eq!(format!("{:?}", heap), "BinomialHeap { len: 3, degrees: [0, 1] }");
    }
}
