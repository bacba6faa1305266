//! Arena-backed nodes for binomial trees
//!
//! Every node of a heap lives in a [`NodeArena`], a `slotmap` keyed by
//! [`NodeId`]. Parent and child links are stored as ids instead of
//! references, so the tree graph carries no ownership cycles.
//!
//! A node slot is a *position* in a tree. The data a caller inserted (its
//! priority, item and [`EntryId`]) is the node's *entry*. Restoring heap order
//! swaps entries between positions and never relinks slots, which keeps the
//! binomial shape untouched. The arena maintains an `EntryId -> NodeId` index
//! so a handle always finds its entry, wherever bubbling has moved it.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::mem;
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Position of a node inside a [`NodeArena`]
    pub(crate) struct NodeId;
}

/// Source of entry ids. Process-wide so that ids minted by different heaps
/// stay distinct after a union.
static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Identity token of an inserted element
///
/// Unlike priorities, two entries never share an id, even when their
/// priorities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The user-visible payload of a node
#[derive(Debug)]
pub(crate) struct Entry<T, P> {
    pub(crate) id: EntryId,
    pub(crate) priority: P,
    pub(crate) item: T,
}

/// Children of a node, index `i` rooting a binomial tree of degree `i`
pub(crate) type Children = SmallVec<[NodeId; 8]>;

/// A single tree position
#[derive(Debug)]
pub(crate) struct Node<T, P> {
    pub(crate) entry: Entry<T, P>,
    /// None for tree roots
    pub(crate) parent: Option<NodeId>,
    /// Ordered by attachment, which is also ascending degree
    pub(crate) children: Children,
}

impl<T, P> Node<T, P> {
    #[inline]
    pub(crate) fn priority(&self) -> &P {
        &self.entry.priority
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owner of every node of one heap
#[derive(Debug)]
pub(crate) struct NodeArena<T, P> {
    nodes: SlotMap<NodeId, Node<T, P>>,
    /// Where each live entry currently sits
    positions: FxHashMap<EntryId, NodeId>,
}

impl<T, P> Default for NodeArena<T, P> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            positions: FxHashMap::default(),
        }
    }
}

impl<T, P> Index<NodeId> for NodeArena<T, P> {
    type Output = Node<T, P>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id]
    }
}

impl<T, P> NodeArena<T, P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut positions = FxHashMap::default();
        positions.reserve(capacity);
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            positions,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.positions.clear();
    }

    /// Allocates a detached node holding a fresh entry
    pub(crate) fn alloc(&mut self, priority: P, item: T) -> (NodeId, EntryId) {
        let id = EntryId::next();
        let node = self.nodes.insert(Node {
            entry: Entry { id, priority, item },
            parent: None,
            children: Children::new(),
        });
        self.positions.insert(id, node);
        (node, id)
    }

    /// Removes a node and forgets its entry
    ///
    /// The node must already be detached: no parent link pointing at it and no
    /// children left.
    pub(crate) fn free(&mut self, node: NodeId) -> Option<Entry<T, P>> {
        let removed = self.nodes.remove(node)?;
        debug_assert!(removed.is_leaf(), "freed node still has children");
        self.positions.remove(&removed.entry.id);
        Some(removed.entry)
    }

    /// Current position of an entry, if it is still in the heap
    #[inline]
    pub(crate) fn locate(&self, id: EntryId) -> Option<NodeId> {
        self.positions.get(&id).copied()
    }

    #[inline]
    pub(crate) fn get(&self, node: NodeId) -> Option<&Node<T, P>> {
        self.nodes.get(node)
    }

    pub(crate) fn set_priority(&mut self, node: NodeId, priority: P) {
        self.nodes[node].entry.priority = priority;
    }

    /// Appends `child` to `parent`'s children and points `child` back at it
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Takes every child of `node`, clearing their parent links
    pub(crate) fn detach_children(&mut self, node: NodeId) -> Children {
        let children = mem::take(&mut self.nodes[node].children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        children
    }

    /// Exchanges the entries held by two positions
    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if let Some([x, y]) = self.nodes.get_disjoint_mut([a, b]) {
            mem::swap(&mut x.entry, &mut y.entry);
            self.positions.insert(x.entry.id, a);
            self.positions.insert(y.entry.id, b);
        }
    }

    /// Moves an entry to the root of its tree regardless of priority
    ///
    /// Every displaced ancestor entry shifts down one level, which keeps heap
    /// order everywhere except at the root. Returns the root position.
    pub(crate) fn sift_to_root(&mut self, mut node: NodeId) -> NodeId {
        while let Some(parent) = self.nodes[node].parent {
            self.swap_entries(node, parent);
            node = parent;
        }
        node
    }

    /// Moves every node of `other` into this arena
    ///
    /// Returns the old-to-new id mapping so the caller can rewrite the roots it
    /// held for `other`. Entry ids are preserved.
    pub(crate) fn absorb(&mut self, other: NodeArena<T, P>) -> FxHashMap<NodeId, NodeId> {
        let mut remap = FxHashMap::default();
        remap.reserve(other.nodes.len());
        for (old, node) in other.nodes {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
        }
        for &new in remap.values() {
            let node = &mut self.nodes[new];
            node.parent = node.parent.map(|p| remap[&p]);
            for child in node.children.iter_mut() {
                *child = remap[child];
            }
            self.positions.insert(node.entry.id, new);
        }
        remap
    }

    /// Checks that the position index agrees with the arena contents
    pub(crate) fn positions_consistent(&self) -> bool {
        self.positions.len() == self.nodes.len()
            && self
                .nodes
                .iter()
                .all(|(node, n)| self.positions.get(&n.entry.id) == Some(&node))
    }
}

impl<T, P: Ord> NodeArena<T, P> {
    /// Restores heap order above `node` after its priority decreased
    ///
    /// While the node's priority is smaller than its parent's, the two entries
    /// swap and the walk continues from the parent position. Returns the
    /// position the entry ends at.
    pub(crate) fn bubble_up(&mut self, mut node: NodeId) -> NodeId {
        while let Some(parent) = self.nodes[node].parent {
            if self.nodes[node].priority() >= self.nodes[parent].priority() {
                break;
            }
            self.swap_entries(node, parent);
            node = parent;
        }
        node
    }
}
