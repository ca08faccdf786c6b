//! Tree nodes and the lightweight traversal cursor.
//!
//! Nodes are immutable once built. A tree "modification" copies the nodes on
//! one root-to-leaf path and shares every other subtree through `Arc`.

use std::fmt;
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::entry::Entry;
use crate::geometry::Geometry;

/// Anything with a bounding rectangle that a node can hold.
///
/// Implemented for entries (leaf contents) and shared nodes (non-leaf
/// contents) so the splitters can work on either.
pub trait Bounded {
    /// Returns the bounding rectangle of the item.
    fn bounds(&self) -> BoundingBox;
}

impl<V, G: Geometry> Bounded for Entry<V, G> {
    fn bounds(&self) -> BoundingBox {
        self.mbr()
    }
}

impl<V, G> Bounded for Arc<Node<V, G>> {
    fn bounds(&self) -> BoundingBox {
        *self.geometry()
    }
}

/// Node types in the R-Tree
///
/// Nodes can only be built inside the crate, which keeps the cached `mbr`
/// equal to the union of the contents.
pub enum Node<V, G> {
    /// Leaf node containing actual entries
    #[non_exhaustive]
    Leaf {
        entries: Vec<Entry<V, G>>,
        mbr: BoundingBox,
    },
    /// Non-leaf node containing shared child nodes
    #[non_exhaustive]
    NonLeaf {
        children: Vec<Arc<Node<V, G>>>,
        mbr: BoundingBox,
    },
}

impl<V, G: Geometry> Node<V, G> {
    /// Builds a leaf from its complete list of entries.
    pub(crate) fn leaf(entries: Vec<Entry<V, G>>) -> Self {
        debug_assert!(!entries.is_empty(), "leaf nodes are never empty");
        let mbr = BoundingBox::union_all(entries.iter().map(Entry::mbr)).unwrap_or_default();
        Node::Leaf { entries, mbr }
    }
}

impl<V, G> Node<V, G> {
    /// Builds a non-leaf node from its complete list of children.
    pub(crate) fn non_leaf(children: Vec<Arc<Node<V, G>>>) -> Self {
        debug_assert!(!children.is_empty(), "non-leaf nodes are never empty");
        let mbr = BoundingBox::union_all(children.iter().map(|c| *c.geometry())).unwrap_or_default();
        Node::NonLeaf { children, mbr }
    }

    /// The cached bounding rectangle covering all children or entries.
    pub fn geometry(&self) -> &BoundingBox {
        match self {
            Node::Leaf { mbr, .. } | Node::NonLeaf { mbr, .. } => mbr,
        }
    }

    /// Number of entries (leaf) or children (non-leaf).
    pub fn count(&self) -> usize {
        match self {
            Node::Leaf { entries, .. } => entries.len(),
            Node::NonLeaf { children, .. } => children.len(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Returns the i-th child of a non-leaf node.
    pub fn child(&self, i: usize) -> Option<&Arc<Node<V, G>>> {
        self.children().get(i)
    }

    /// Returns the i-th entry of a leaf node.
    pub fn entry(&self, i: usize) -> Option<&Entry<V, G>> {
        self.entries().get(i)
    }

    /// Entries of a leaf; empty for a non-leaf node.
    pub fn entries(&self) -> &[Entry<V, G>] {
        match self {
            Node::Leaf { entries, .. } => entries,
            Node::NonLeaf { .. } => &[],
        }
    }

    /// Children of a non-leaf node; empty for a leaf.
    pub fn children(&self) -> &[Arc<Node<V, G>>] {
        match self {
            Node::Leaf { .. } => &[],
            Node::NonLeaf { children, .. } => children,
        }
    }

    /// Height of the subtree rooted here; leaves are 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self;
        while let Some(first) = current.child(0) {
            height += 1;
            current = first;
        }
        height
    }

    /// Collects every entry below this node, in depth-first order.
    pub(crate) fn collect_entries(&self, out: &mut Vec<Entry<V, G>>) {
        let mut stack: Vec<&Node<V, G>> = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { entries, .. } => out.extend(entries.iter().cloned()),
                Node::NonLeaf { children, .. } => {
                    stack.extend(children.iter().rev().map(|c| c.as_ref()))
                }
            }
        }
    }
}

impl<V: fmt::Debug, G: fmt::Debug> fmt::Debug for Node<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { entries, mbr } => f
                .debug_struct("Leaf")
                .field("mbr", mbr)
                .field("entries", entries)
                .finish(),
            Node::NonLeaf { children, mbr } => f
                .debug_struct("NonLeaf")
                .field("mbr", mbr)
                .field("children", children)
                .finish(),
        }
    }
}

/// A cursor into a node: which child or entry slot a traversal is at.
///
/// The cursor borrows the node and never changes it; advancing produces a
/// new cursor. Traversals keep a stack of these instead of recursing, which
/// lets them stop and resume between items.
pub struct NodePosition<'a, V, G> {
    node: &'a Node<V, G>,
    position: usize,
}

impl<'a, V, G> NodePosition<'a, V, G> {
    pub fn new(node: &'a Node<V, G>, position: usize) -> Self {
        Self { node, position }
    }

    pub fn node(&self) -> &'a Node<V, G> {
        self.node
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a cursor advanced by one slot.
    pub fn next_position(&self) -> Self {
        Self::new(self.node, self.position + 1)
    }

    /// True when every slot of the node has been visited.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.node.count()
    }
}

impl<V, G> Clone for NodePosition<'_, V, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, G> Copy for NodePosition<'_, V, G> {}
