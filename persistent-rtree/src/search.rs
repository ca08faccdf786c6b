//! Lazy search over one tree snapshot.
//!
//! Both iterators borrow the snapshot they were created from, so a reader
//! keeps seeing exactly the entries of that snapshot no matter how many new
//! trees are derived from it meanwhile. Dropping an iterator cancels the search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use crate::bounding_box::BoundingBox;
use crate::entry::Entry;
use crate::filter::SpatialFilter;
use crate::geometry::Geometry;
use crate::node::{Node, NodePosition};

/// Depth-first filter search.
///
/// Keeps a stack of [`NodePosition`] cursors, one per level of the current
/// path. Subtrees whose rectangle fails the filter's node test are never
/// visited.
pub struct Search<'a, V, G, F> {
    stack: Vec<NodePosition<'a, V, G>>,
    filter: F,
}

impl<'a, V, G, F> Search<'a, V, G, F>
where
    F: SpatialFilter<G>,
{
    pub(crate) fn new(root: Option<&'a Node<V, G>>, filter: F) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = root {
            if filter.matches_node(root.geometry()) {
                stack.push(NodePosition::new(root, 0));
            }
        }
        Self { stack, filter }
    }
}

impl<'a, V, G, F> Iterator for Search<'a, V, G, F>
where
    F: SpatialFilter<G>,
{
    type Item = &'a Entry<V, G>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            if top.is_exhausted() {
                self.stack.pop();
                continue;
            }

            let current = *top;
            *top = current.next_position();

            match current.node() {
                Node::Leaf { entries, .. } => {
                    let entry = &entries[current.position()];
                    if self.filter.matches_entry(entry.geometry()) {
                        return Some(entry);
                    }
                }
                Node::NonLeaf { children, .. } => {
                    let child = &children[current.position()];
                    if self.filter.matches_node(child.geometry()) {
                        self.stack.push(NodePosition::new(child.as_ref(), 0));
                    }
                }
            }
        }
        None
    }
}

impl<V, G, F: SpatialFilter<G>> FusedIterator for Search<'_, V, G, F> {}

enum Frontier<'a, V, G> {
    Node(&'a Node<V, G>),
    Entry(&'a Entry<V, G>),
}

/// Heap element. `distance` is a lower bound for nodes and exact for entries.
struct Candidate<'a, V, G> {
    distance: f64,
    sequence: u64,
    item: Frontier<'a, V, G>,
}

impl<V, G> PartialEq for Candidate<'_, V, G> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V, G> Eq for Candidate<'_, V, G> {}

impl<V, G> PartialOrd for Candidate<'_, V, G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V, G> Ord for Candidate<'_, V, G> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the max-heap pops the closest, earliest-pushed candidate
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Best-first nearest-neighbour search.
///
/// Entries come out in non-decreasing distance from the query rectangle.
/// Equal distances are resolved by the order candidates were discovered
/// (child order within a node). The search stops after `k` results or at
/// the first candidate beyond `max_distance`.
pub struct Nearest<'a, V, G> {
    query: BoundingBox,
    heap: BinaryHeap<Candidate<'a, V, G>>,
    remaining: Option<usize>,
    max_distance: f64,
    sequence: u64,
}

impl<'a, V, G: Geometry> Nearest<'a, V, G> {
    pub(crate) fn new(
        root: Option<&'a Node<V, G>>,
        query: BoundingBox,
        k: Option<usize>,
        max_distance: Option<f64>,
    ) -> Self {
        let mut nearest = Self {
            query,
            heap: BinaryHeap::new(),
            remaining: k,
            max_distance: max_distance.unwrap_or(f64::INFINITY),
            sequence: 0,
        };
        if let Some(root) = root {
            let distance = root.geometry().distance_to(&query);
            nearest.push(distance, Frontier::Node(root));
        }
        nearest
    }

    fn push(&mut self, distance: f64, item: Frontier<'a, V, G>) {
        if distance > self.max_distance {
            return;
        }
        self.heap.push(Candidate {
            distance,
            sequence: self.sequence,
            item,
        });
        self.sequence += 1;
    }

    fn expand(&mut self, node: &'a Node<V, G>) {
        match node {
            Node::Leaf { entries, .. } => {
                for entry in entries {
                    let distance = entry.geometry().distance(&self.query);
                    self.push(distance, Frontier::Entry(entry));
                }
            }
            Node::NonLeaf { children, .. } => {
                for child in children {
                    let distance = child.geometry().distance_to(&self.query);
                    self.push(distance, Frontier::Node(child.as_ref()));
                }
            }
        }
    }

    /// Like `next`, but also returns the entry's distance to the query.
    pub fn next_with_distance(&mut self) -> Option<(&'a Entry<V, G>, f64)> {
        if self.remaining == Some(0) {
            return None;
        }
        while let Some(candidate) = self.heap.pop() {
            match candidate.item {
                Frontier::Node(node) => self.expand(node),
                Frontier::Entry(entry) => {
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                        if *remaining == 0 {
                            self.heap.clear();
                        }
                    }
                    return Some((entry, candidate.distance));
                }
            }
        }
        None
    }
}

impl<'a, V, G: Geometry> Iterator for Nearest<'a, V, G> {
    type Item = &'a Entry<V, G>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_distance().map(|(entry, _)| entry)
    }
}

impl<V, G: Geometry> FusedIterator for Nearest<'_, V, G> {}
