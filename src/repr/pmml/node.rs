//! Tree nodes.
//!
//! A [`Node`] either splits into exactly two owned children (left, then
//! right) or terminates in a score. Predicates are reference counted so
//! structurally identical conditions can be shared between nodes and
//! trees; the nodes themselves are never shared.

use std::fmt;
use std::sync::Arc;

use super::Predicate;

/// Node identifier.
///
/// Equal to the node's position in the flat arrays it was converted from.
pub type NodeId = u32;

/// Internal node with two children.
///
/// Dropping, cloning, comparing and formatting walk the subtree with a heap
/// stack, so none of them are limited by tree depth.
pub struct BranchNode {
    pub id: NodeId,
    pub predicate: Arc<Predicate>,
    /// Always exactly two: left, then right.
    children: Vec<Node>,
}

impl BranchNode {
    pub fn new(id: NodeId, predicate: Arc<Predicate>, left: Node, right: Node) -> Self {
        Self {
            id,
            predicate,
            children: vec![left, right],
        }
    }

    #[inline]
    pub fn left(&self) -> &Node {
        &self.children[0]
    }

    #[inline]
    pub fn right(&self) -> &Node {
        &self.children[1]
    }

    /// Left and right child.
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl Drop for BranchNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Branch(mut branch) = node {
                pending.append(&mut branch.children);
            }
        }
    }
}

impl Clone for BranchNode {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            predicate: Arc::clone(&self.predicate),
            children: self.children.to_vec(),
        }
    }
}

impl PartialEq for BranchNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.predicate == other.predicate && self.children == other.children
    }
}

impl fmt::Debug for BranchNode {
    /// Shallow: children are shown by id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchNode")
            .field("id", &self.id)
            .field("predicate", &self.predicate)
            .field("children", &[self.left().id(), self.right().id()])
            .finish()
    }
}

/// Terminal node carrying the tree's output for rows that reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub id: NodeId,
    pub predicate: Arc<Predicate>,
    pub score: f64,
}

impl LeafNode {
    pub fn new(id: NodeId, predicate: Arc<Predicate>, score: f64) -> Self {
        Self {
            id,
            predicate,
            score,
        }
    }
}

/// A node of a decision tree.
pub enum Node {
    Branch(BranchNode),
    Leaf(LeafNode),
}

/// Work item of [`Node::clone`].
enum CloneFrame<'a> {
    Enter(&'a Node),
    Exit(&'a BranchNode),
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut done: Vec<Node> = Vec::new();
        let mut stack = vec![CloneFrame::Enter(self)];

        while let Some(frame) = stack.pop() {
            match frame {
                CloneFrame::Enter(Node::Leaf(leaf)) => done.push(Node::Leaf(leaf.clone())),
                CloneFrame::Enter(Node::Branch(branch)) => {
                    stack.push(CloneFrame::Exit(branch));
                    stack.extend(branch.children.iter().rev().map(CloneFrame::Enter));
                }
                CloneFrame::Exit(branch) => {
                    let children = done.split_off(done.len() - branch.children.len());
                    done.push(Node::Branch(BranchNode {
                        id: branch.id,
                        predicate: Arc::clone(&branch.predicate),
                        children,
                    }));
                }
            }
        }

        match done.pop() {
            Some(node) => node,
            None => unreachable!("clone produced no root"),
        }
    }
}

impl PartialEq for Node {
    /// Pre-order sequences of shallow nodes determine a binary tree, so the
    /// comparison walks both sequences side by side.
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(Node::Leaf(x)), Some(Node::Leaf(y))) if x == y => {}
                (Some(Node::Branch(x)), Some(Node::Branch(y)))
                    if x.id == y.id && x.predicate == y.predicate => {}
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for Node {
    /// A leaf as itself, a branch as the pre-order list of its subtree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            Node::Branch(_) => f.debug_list().entries(self.iter().map(shallow)).finish(),
        }
    }
}

fn shallow(node: &Node) -> &dyn fmt::Debug {
    match node {
        Node::Branch(branch) => branch,
        Node::Leaf(leaf) => leaf,
    }
}

impl Node {
    #[inline]
    pub fn id(&self) -> NodeId {
        match self {
            Node::Branch(b) => b.id,
            Node::Leaf(l) => l.id,
        }
    }

    /// Condition under which evaluation enters this node.
    #[inline]
    pub fn predicate(&self) -> &Arc<Predicate> {
        match self {
            Node::Branch(b) => &b.predicate,
            Node::Leaf(l) => &l.predicate,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Children in evaluation order; empty for leaves.
    #[inline]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Branch(b) => b.children.as_slice(),
            Node::Leaf(_) => &[],
        }
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes in the subtree rooted here.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of leaves in the subtree rooted here.
    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.children().iter().map(|c| (c, depth + 1)));
        }
        max_depth
    }
}

/// Pre-order node iterator, see [`Node::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Right first so the left subtree is visited next.
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
