//! Binomial trees
//!
//! A [`Tree`] is a root position plus the root's degree. The nodes themselves
//! live in the heap's [`NodeArena`]; a tree is a lightweight view that
//! exclusively owns the subtree hanging from its root.
//!
//! **Binomial Tree Bₖ**:
//! - B₀ is a single node
//! - Bₖ is two B_{k-1} trees linked root to root
//! - The root of Bₖ has k children; child i roots a Bᵢ
//! - Bₖ has exactly 2ᵏ nodes

use crate::binomial::union_forests;
use crate::node::{NodeArena, NodeId};
use crate::traits::InvariantViolation;
use log::trace;
use std::collections::VecDeque;
use std::fmt::{self, Write};

/// One tree of a binomial forest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tree {
    degree: usize,
    root: NodeId,
}

impl Tree {
    /// Wraps a detached node as a degree-0 tree
    pub(crate) fn singleton(root: NodeId) -> Self {
        Self { degree: 0, root }
    }

    /// Order of the tree: the number of children under its root
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of nodes, always 2^degree
    #[inline]
    pub fn len(&self) -> usize {
        1 << self.degree
    }

    #[inline]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Binomial link of two trees of equal degree
    ///
    /// The root with the larger priority becomes the last child of the other
    /// root. On equal priorities `self` keeps its root. The surviving tree's
    /// degree grows by one.
    ///
    /// The degrees must match; linking mismatched trees produces a tree that is
    /// not binomial. Only the forest union calls this, and it guarantees the
    /// precondition.
    pub(crate) fn merge<T, P: Ord>(&mut self, other: Tree, nodes: &mut NodeArena<T, P>) {
        debug_assert_eq!(self.degree, other.degree, "linking trees of unequal degree");

        if nodes[self.root].priority() <= nodes[other.root].priority() {
            nodes.add_child(self.root, other.root);
        } else {
            nodes.add_child(other.root, self.root);
            self.root = other.root;
        }
        self.degree += 1;
        trace!("linked two trees into degree {}", self.degree);
    }

    /// Detaches the root and turns its children into a forest
    ///
    /// Child `i` becomes a degree-`i` tree with its parent link cleared. The
    /// children are unioned into the returned forest one at a time. Since their
    /// degrees are distinct this never links anything, but it goes through the
    /// same path as every other union.
    pub(crate) fn extract_min<T, P: Ord>(self, nodes: &mut NodeArena<T, P>) -> (NodeId, Vec<Tree>) {
        let children = nodes.detach_children(self.root);
        debug_assert_eq!(children.len(), self.degree);

        let mut forest = Vec::with_capacity(children.len());
        for (degree, child) in children.into_iter().enumerate() {
            let tree = Tree {
                degree,
                root: child,
            };
            forest = union_forests(nodes, forest, vec![tree]);
        }
        (self.root, forest)
    }

    /// Breadth-first search for the first node whose priority equals `priority`
    pub(crate) fn find_node<T, P: Ord>(&self, nodes: &NodeArena<T, P>, priority: &P) -> Option<NodeId> {
        let mut queue = VecDeque::with_capacity(self.degree + 1);
        queue.push_back(self.root);
        while let Some(node) = queue.pop_front() {
            if nodes[node].priority() == priority {
                return Some(node);
            }
            queue.extend(nodes[node].children.iter().copied());
        }
        None
    }

    /// Validates binomial shape, parent links and heap order
    ///
    /// Returns the number of nodes in the tree.
    pub(crate) fn check_shape<T, P: Ord>(&self, nodes: &NodeArena<T, P>) -> Result<usize, InvariantViolation> {
        let root = nodes.get(self.root).ok_or(InvariantViolation::ParentLink)?;
        if root.parent.is_some() {
            return Err(InvariantViolation::ParentLink);
        }
        check_subtree(nodes, self.root, self.degree)
    }

    /// Renders the tree in parenthesized list notation
    ///
    /// Each node is written as `(key,child,child,...)`, children in degree
    /// order, and the whole tree is terminated by `;`. A single node is `(7);`.
    pub(crate) fn newick_string<T, P: fmt::Display>(&self, nodes: &NodeArena<T, P>) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = write_newick(nodes, self.root, &mut out);
        out.push(';');
        out
    }
}

fn check_subtree<T, P: Ord>(
    nodes: &NodeArena<T, P>,
    node: NodeId,
    degree: usize,
) -> Result<usize, InvariantViolation> {
    let current = &nodes[node];
    if current.children.len() != degree {
        return Err(InvariantViolation::ChildCount {
            expected: degree,
            found: current.children.len(),
        });
    }

    let mut count = 1;
    for (child_degree, &child) in current.children.iter().enumerate() {
        let child_node = nodes.get(child).ok_or(InvariantViolation::ParentLink)?;
        if child_node.parent != Some(node) {
            return Err(InvariantViolation::ParentLink);
        }
        if child_node.priority() < current.priority() {
            return Err(InvariantViolation::HeapOrder);
        }
        count += check_subtree(nodes, child, child_degree)?;
    }
    Ok(count)
}

fn write_newick<T, P: fmt::Display>(
    nodes: &NodeArena<T, P>,
    node: NodeId,
    out: &mut String,
) -> fmt::Result {
    write!(out, "({}", nodes[node].priority())?;
    for &child in &nodes[node].children {
        out.push(',');
        write_newick(nodes, child, out)?;
    }
    out.push(')');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(nodes: &mut NodeArena<(), i32>, priority: i32) -> Tree {
        Tree::singleton(nodes.alloc(priority, ()).0)
    }

    /// Builds a degree-`log2(len)` tree by pairwise linking
    fn build(nodes: &mut NodeArena<(), i32>, priorities: &[i32]) -> Tree {
        let mut trees: Vec<Tree> = priorities.iter().map(|&p| leaf(nodes, p)).collect();
        while trees.len() > 1 {
            let mut next = Vec::new();
            for pair in trees.chunks(2) {
                let mut tree = pair[0];
                tree.merge(pair[1], nodes);
                next.push(tree);
            }
            trees = next;
        }
        trees[0]
    }

    #[test]
    fn test_merge_smaller_root_survives() {
        let mut nodes = NodeArena::default();
        let mut a = leaf(&mut nodes, 5);
        let b = leaf(&mut nodes, 2);
        a.merge(b, &mut nodes);

        assert_eq!(a.degree(), 1);
        assert_eq!(a.root(), b.root());
        assert_eq!(*nodes[a.root()].priority(), 2);
        assert_eq!(a.check_shape(&nodes), Ok(2));
    }

    #[test]
    fn test_merge_tie_keeps_self() {
        let mut nodes = NodeArena::default();
        let mut a = leaf(&mut nodes, 3);
        let original = a.root();
        let b = leaf(&mut nodes, 3);
        a.merge(b, &mut nodes);
        assert_eq!(a.root(), original);
        assert_eq!(nodes[original].children.as_slice(), &[b.root()]);
    }

    #[test]
    fn test_merge_appends_child_in_degree_order() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(tree.degree(), 3);
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.check_shape(&nodes), Ok(8));

        let root = &nodes[tree.root()];
        let child_degrees: Vec<usize> = root.children.iter().map(|&c| nodes[c].children.len()).collect();
        assert_eq!(child_degrees, vec![0, 1, 2]);
    }

    #[test]
    fn test_extract_min_explodes_children() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[4, 8, 1, 6, 7, 3, 5, 2]);
        let (root, forest) = tree.extract_min(&mut nodes);

        assert_eq!(*nodes[root].priority(), 1);
        assert!(nodes[root].is_leaf());
        let degrees: Vec<usize> = forest.iter().map(Tree::degree).collect();
        assert_eq!(degrees, vec![0, 1, 2]);
        let count: usize = forest.iter().map(|t| t.check_shape(&nodes).unwrap()).sum();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_extract_min_of_singleton() {
        let mut nodes = NodeArena::default();
        let tree = leaf(&mut nodes, 9);
        let (root, forest) = tree.extract_min(&mut nodes);
        assert_eq!(root, tree.root());
        assert!(forest.is_empty());
    }

    #[test]
    fn test_find_node_breadth_first() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[1, 2, 3, 4]);
        // shape: 1 -> [2, 3 -> [4]]
        let found = tree.find_node(&nodes, &4).unwrap();
        assert_eq!(*nodes[found].priority(), 4);
        assert!(tree.find_node(&nodes, &10).is_none());
    }

    #[test]
    fn test_find_node_returns_shallowest_duplicate() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[1, 7, 2, 7]);
        // shape: 1 -> [7, 2 -> [7]]
        let found = tree.find_node(&nodes, &7).unwrap();
        assert_eq!(nodes[found].parent, Some(tree.root()));
    }

    #[test]
    fn test_check_shape_detects_heap_order_violation() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[1, 2]);
        let child = nodes[tree.root()].children[0];
        nodes.set_priority(child, 0);
        assert_eq!(tree.check_shape(&nodes), Err(InvariantViolation::HeapOrder));
    }

    #[test]
    fn test_check_shape_detects_wrong_degree() {
        let mut nodes = NodeArena::default();
        let tree = build(&mut nodes, &[1, 2]);
        let lying = Tree {
            degree: 2,
            root: tree.root(),
        };
        assert_eq!(
            lying.check_shape(&nodes),
            Err(InvariantViolation::ChildCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_newick_string() {
        let mut nodes = NodeArena::default();
        assert_eq!(leaf(&mut nodes, 7).newick_string(&nodes), "(7);");

        let tree = build(&mut nodes, &[1, 2, 3, 4]);
        assert_eq!(tree.newick_string(&nodes), "(1,(2),(3,(4)));");
    }
}
