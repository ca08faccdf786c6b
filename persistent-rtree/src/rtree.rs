//! The persistent tree.
//!
//! An [`RTree`] is an immutable value. `insert` and `delete` return a new tree
//! and leave the receiver untouched; the two share every node that is not on
//! the rewritten root-to-leaf path.

use std::fmt::{self, Display};
use std::sync::Arc;

use log::{debug, trace};

use crate::bounding_box::BoundingBox;
use crate::config::{RTreeBuilder, RTreeConfig};
use crate::entry::Entry;
use crate::errors::SpatialResult;
use crate::filter::{AllFilter, IntersectsFilter, NearFilter, SpatialFilter, WithinFilter};
use crate::geometry::Geometry;
use crate::node::{Node, NodePosition};
use crate::search::{Nearest, Search};
use crate::splitter::Splitter;
use crate::stats::{self, IntegrityReport, RTreeStats};

/// Persistent R-Tree.
///
/// Cloning is O(1). A tree can be searched from any number of threads while
/// other threads derive new trees from it.
///
/// ## Example
///
/// ```rust
/// use persistent_rtree::{BoundingBox, Entry, Point, RTree};
///
/// let empty: RTree<&str, Point> = RTree::new();
/// let one = empty.insert(Entry::new("a", Point::new(1.0, 1.0)).unwrap());
/// let two = one.insert(Entry::new("b", Point::new(5.0, 5.0)).unwrap());
///
/// assert_eq!(empty.size(), 0);
/// assert_eq!(one.size(), 1);
/// let hits: Vec<_> = two
///     .search_intersecting(&BoundingBox::new(0.0, 0.0, 2.0, 2.0))
///     .map(|e| *e.value())
///     .collect();
/// assert_eq!(hits, vec!["a"]);
/// ```
pub struct RTree<V, G> {
    root: Option<Arc<Node<V, G>>>,
    size: usize,
    config: RTreeConfig,
}

/// Something waiting to be placed in the tree: an entry (goes into a leaf)
/// or a detached subtree (goes into a node one level above its own height).
enum Orphan<V, G> {
    Entry(Entry<V, G>),
    Subtree(Arc<Node<V, G>>),
}

impl<V, G: Geometry> Orphan<V, G> {
    fn bounds(&self) -> BoundingBox {
        match self {
            Orphan::Entry(entry) => entry.mbr(),
            Orphan::Subtree(node) => *node.geometry(),
        }
    }

    /// Height of the node that will hold this orphan.
    fn container_height(&self) -> usize {
        match self {
            Orphan::Entry(_) => 0,
            Orphan::Subtree(node) => node.height() + 1,
        }
    }
}

impl<V, G> RTree<V, G> {
    /// Creates an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RTreeConfig::default())
    }

    /// Creates an empty tree with the given configuration.
    pub fn with_config(config: RTreeConfig) -> Self {
        Self {
            root: None,
            size: 0,
            config,
        }
    }

    pub(crate) fn from_parts(root: Option<Arc<Node<V, G>>>, size: usize, config: RTreeConfig) -> Self {
        Self { root, size, config }
    }

    /// Returns a builder for configuring a new tree.
    pub fn builder() -> RTreeBuilder {
        RTreeBuilder::new()
    }

    /// Number of entries in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&Arc<Node<V, G>>> {
        self.root.as_ref()
    }

    /// Number of levels; 0 for an empty tree, 1 when the root is a leaf.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height() + 1)
    }

    /// Bounding rectangle of every entry, or `None` for an empty tree.
    pub fn mbr(&self) -> Option<BoundingBox> {
        self.root.as_ref().map(|root| *root.geometry())
    }

    /// Counts nodes, leaves and entries.
    pub fn stats(&self) -> RTreeStats {
        stats::collect_stats(self.root.as_deref())
    }

    /// Lazily yields the entries that pass `filter`.
    pub fn search<F: SpatialFilter<G>>(&self, filter: F) -> Search<'_, V, G, F> {
        Search::new(self.root.as_deref(), filter)
    }

    /// Lazily yields every entry.
    pub fn entries(&self) -> Search<'_, V, G, AllFilter> {
        self.search(AllFilter)
    }
}

impl<V, G: Geometry> RTree<V, G> {
    /// Returns a tree holding this tree's entries plus `entry`.
    pub fn insert(&self, entry: Entry<V, G>) -> Self {
        trace!("inserting entry at {}", entry.mbr());
        let root = Self::insert_orphan(self.root.as_ref(), Orphan::Entry(entry), &self.config);
        Self {
            root: Some(root),
            size: self.size + 1,
            config: self.config.clone(),
        }
    }

    /// Inserts every entry in turn.
    pub fn insert_all<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<V, G>>,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, entry| tree.insert(entry))
    }

    /// Builds an entry from `value` and `geometry` and inserts it.
    ///
    /// # Errors
    /// Returns `SpatialError::InvalidGeometry` if the geometry is unusable.
    pub fn add(&self, value: V, geometry: G) -> SpatialResult<Self> {
        Ok(self.insert(Entry::new(value, geometry)?))
    }

    /// Lazily yields entries whose geometry intersects `rect`.
    pub fn search_intersecting(&self, rect: &BoundingBox) -> Search<'_, V, G, IntersectsFilter> {
        self.search(IntersectsFilter::new(*rect))
    }

    /// Lazily yields entries whose bounding rectangle lies within `rect`.
    pub fn search_contained(&self, rect: &BoundingBox) -> Search<'_, V, G, WithinFilter> {
        self.search(WithinFilter::new(*rect))
    }

    /// Lazily yields entries within `max_distance` of `rect`.
    pub fn search_within_distance(
        &self,
        rect: &BoundingBox,
        max_distance: f64,
    ) -> Search<'_, V, G, NearFilter> {
        self.search(NearFilter::new(*rect, max_distance))
    }

    /// Up to `k` entries closest to `query`, nearest first, optionally
    /// limited to `max_distance`.
    pub fn nearest(
        &self,
        query: &BoundingBox,
        k: usize,
        max_distance: Option<f64>,
    ) -> Nearest<'_, V, G> {
        Nearest::new(self.root.as_deref(), *query, Some(k), max_distance)
    }

    /// Every entry ordered by distance to `query`.
    pub fn nearest_iter(&self, query: &BoundingBox) -> Nearest<'_, V, G> {
        Nearest::new(self.root.as_deref(), *query, None, None)
    }

    /// Checks cached rectangles, node occupancy, balance and size.
    pub fn check_integrity(&self) -> IntegrityReport {
        stats::check_integrity(self.root.as_deref(), &self.config, self.size)
    }

    /// Places an orphan in the tree rooted at `root` and returns the new root.
    ///
    /// The orphan's container height must not exceed the root's height.
    fn insert_orphan(
        root: Option<&Arc<Node<V, G>>>,
        orphan: Orphan<V, G>,
        config: &RTreeConfig,
    ) -> Arc<Node<V, G>> {
        let Some(root) = root else {
            return match orphan {
                Orphan::Entry(entry) => Arc::new(Node::leaf(vec![entry])),
                Orphan::Subtree(node) => node,
            };
        };

        let bounds = orphan.bounds();
        let target = orphan.container_height();
        let root_height = root.height();
        debug_assert!(target <= root_height, "orphan is taller than the tree");

        let mut path: Vec<(&Arc<Node<V, G>>, usize)> = Vec::with_capacity(root_height);
        let mut current = root;
        for _ in target..root_height {
            let index = choose_subtree(current.children(), &bounds);
            trace!("descending into child {} of {}", index, current.geometry());
            path.push((current, index));
            current = &current.children()[index];
        }

        let mut replacements = match orphan {
            Orphan::Entry(entry) => {
                let mut entries = current.entries().to_vec();
                entries.push(entry);
                Self::leaves(entries, config)
            }
            Orphan::Subtree(node) => {
                let mut children = current.children().to_vec();
                children.push(node);
                Self::branches(children, config)
            }
        };

        while let Some((parent, index)) = path.pop() {
            let mut children = parent.children().to_vec();
            children.splice(index..=index, replacements);
            replacements = Self::branches(children, config);
        }

        Self::into_root(replacements)
    }

    /// One leaf, or two when `entries` overflows.
    fn leaves(entries: Vec<Entry<V, G>>, config: &RTreeConfig) -> Vec<Arc<Node<V, G>>> {
        if entries.len() <= config.max_children() {
            return vec![Arc::new(Node::leaf(entries))];
        }
        let (first, second) = config.splitter().split(entries, config.min_children());
        debug!(
            "split leaf into {} and {} entries using {} splitter",
            first.len(),
            second.len(),
            config.splitter()
        );
        vec![Arc::new(Node::leaf(first)), Arc::new(Node::leaf(second))]
    }

    /// One non-leaf node, or two when `children` overflows.
    fn branches(children: Vec<Arc<Node<V, G>>>, config: &RTreeConfig) -> Vec<Arc<Node<V, G>>> {
        if children.len() <= config.max_children() {
            return vec![Arc::new(Node::non_leaf(children))];
        }
        let (first, second) = config.splitter().split(children, config.min_children());
        debug!(
            "split non-leaf node into {} and {} children using {} splitter",
            first.len(),
            second.len(),
            config.splitter()
        );
        vec![Arc::new(Node::non_leaf(first)), Arc::new(Node::non_leaf(second))]
    }

    /// The new root: the single replacement, or a new level above two.
    fn into_root(mut nodes: Vec<Arc<Node<V, G>>>) -> Arc<Node<V, G>> {
        if nodes.len() == 1 {
            if let Some(root) = nodes.pop() {
                return root;
            }
        }
        let root = Arc::new(Node::non_leaf(nodes));
        debug!("root split, tree height is now {}", root.height() + 1);
        root
    }

    /// Drops NonLeaf roots with a single child.
    fn collapse(mut root: Option<Arc<Node<V, G>>>) -> Option<Arc<Node<V, G>>> {
        while let Some(only_child) = root
            .as_ref()
            .filter(|node| !node.is_leaf() && node.count() == 1)
            .and_then(|node| node.child(0).cloned())
        {
            debug!("collapsing single-child root");
            root = Some(only_child);
        }
        root
    }

    /// Puts orphans back, tallest first. Subtrees that would not fit below
    /// the current root are broken up into their entries.
    fn reinsert(
        mut root: Option<Arc<Node<V, G>>>,
        mut orphans: Vec<Orphan<V, G>>,
        config: &RTreeConfig,
    ) -> Option<Arc<Node<V, G>>> {
        if orphans.is_empty() {
            return root;
        }
        debug!("reinserting {} orphaned items", orphans.len());
        orphans.sort_by_key(|orphan| std::cmp::Reverse(orphan.container_height()));

        for orphan in orphans {
            let root_height = root.as_ref().map_or(0, |r| r.height());
            match orphan {
                Orphan::Subtree(node) if root.is_some() && node.height() + 1 > root_height => {
                    let mut entries = Vec::new();
                    node.collect_entries(&mut entries);
                    trace!("subtree too tall to reattach, reinserting {} entries", entries.len());
                    for entry in entries {
                        root = Some(Self::insert_orphan(root.as_ref(), Orphan::Entry(entry), config));
                    }
                }
                orphan => root = Some(Self::insert_orphan(root.as_ref(), orphan, config)),
            }
        }
        Self::collapse(root)
    }
}

impl<V: PartialEq, G: Geometry + PartialEq> RTree<V, G> {
    /// Returns a tree without one entry structurally equal to `entry`.
    ///
    /// If no such entry exists the result is an unchanged copy.
    pub fn delete(&self, entry: &Entry<V, G>) -> Self {
        let Some(root) = self.root.as_ref() else {
            return self.clone();
        };
        let Some(mut path) = Self::find_leaf(root, entry) else {
            trace!("entry at {} not found, nothing to delete", entry.mbr());
            return self.clone();
        };

        let min = self.config.min_children();
        let mut orphans: Vec<Orphan<V, G>> = Vec::new();

        // the last cursor is the leaf, positioned on the entry
        let mut replacement = match path.pop() {
            Some(leaf) => {
                let mut entries = leaf.node().entries().to_vec();
                entries.remove(leaf.position());
                if entries.is_empty() {
                    None
                } else if !path.is_empty() && entries.len() < min {
                    orphans.extend(entries.into_iter().map(Orphan::Entry));
                    None
                } else {
                    Some(Arc::new(Node::leaf(entries)))
                }
            }
            None => return self.clone(),
        };

        while let Some(cursor) = path.pop() {
            let mut children = cursor.node().children().to_vec();
            match replacement.take() {
                Some(node) => children[cursor.position()] = node,
                None => {
                    children.remove(cursor.position());
                }
            }
            replacement = if children.is_empty() {
                None
            } else if !path.is_empty() && children.len() < min {
                orphans.extend(children.into_iter().map(Orphan::Subtree));
                None
            } else {
                Some(Arc::new(Node::non_leaf(children)))
            };
        }

        let root = Self::collapse(replacement);
        let root = Self::reinsert(root, orphans, &self.config);
        Self {
            root,
            size: self.size - 1,
            config: self.config.clone(),
        }
    }

    /// Returns a tree without any entry structurally equal to `entry`.
    pub fn delete_all(&self, entry: &Entry<V, G>) -> Self {
        let mut tree = self.clone();
        loop {
            let next = tree.delete(entry);
            if next.size == tree.size {
                return tree;
            }
            tree = next;
        }
    }

    /// Deletes one occurrence of each given entry.
    pub fn delete_entries<'e, I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = &'e Entry<V, G>>,
        V: 'e,
        G: 'e,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, entry| tree.delete(entry))
    }

    /// Returns true if a structurally equal entry is in the tree.
    pub fn contains(&self, entry: &Entry<V, G>) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| Self::find_leaf(root, entry).is_some())
    }

    /// Depth-first search for a leaf holding `entry`, pruning subtrees whose
    /// rectangle cannot contain it. Returns the cursor path from the root;
    /// each cursor sits on the child (or, for the leaf, the entry) on the path.
    fn find_leaf<'a>(
        root: &'a Node<V, G>,
        entry: &Entry<V, G>,
    ) -> Option<Vec<NodePosition<'a, V, G>>> {
        let target = entry.mbr();
        if !root.geometry().contains(&target) {
            return None;
        }

        let mut stack = vec![NodePosition::new(root, 0)];
        while let Some(&top) = stack.last() {
            if top.is_exhausted() {
                stack.pop();
                advance(&mut stack);
                continue;
            }
            match top.node() {
                Node::Leaf { entries, .. } => {
                    if entries[top.position()] == *entry {
                        return Some(stack);
                    }
                    advance(&mut stack);
                }
                Node::NonLeaf { children, .. } => {
                    let child = &children[top.position()];
                    if child.geometry().contains(&target) {
                        stack.push(NodePosition::new(child.as_ref(), 0));
                    } else {
                        advance(&mut stack);
                    }
                }
            }
        }
        None
    }
}

fn advance<V, G>(stack: &mut [NodePosition<'_, V, G>]) {
    if let Some(top) = stack.last_mut() {
        *top = top.next_position();
    }
}

/// Child needing the least area enlargement to cover `bounds`; ties go to
/// the smaller resulting area, then to the lowest index.
fn choose_subtree<V, G>(children: &[Arc<Node<V, G>>], bounds: &BoundingBox) -> usize {
    let mut best = 0;
    let mut best_enlargement = f64::INFINITY;
    let mut best_area = f64::INFINITY;
    for (index, child) in children.iter().enumerate() {
        let mbr = child.geometry();
        let area = mbr.union(bounds).area();
        let enlargement = area - mbr.area();
        if enlargement < best_enlargement || (enlargement == best_enlargement && area < best_area) {
            best = index;
            best_enlargement = enlargement;
            best_area = area;
        }
    }
    best
}

impl<V: Display, G: Display> RTree<V, G> {
    /// Renders the tree one node or entry per line, indented by depth.
    pub fn as_string(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root.as_deref() else {
            return out;
        };

        let mut stack: Vec<(&Node<V, G>, usize)> = vec![(root, 0)];
        while let Some((node, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            out.push_str(&format!("{}mbr={}\n", indent, node.geometry()));
            match node {
                Node::Leaf { entries, .. } => {
                    for entry in entries {
                        out.push_str(&format!("{}  entry={}\n", indent, entry));
                    }
                }
                Node::NonLeaf { children, .. } => {
                    stack.extend(children.iter().rev().map(|c| (c.as_ref(), depth + 1)));
                }
            }
        }
        out
    }
}

impl<V, G> Clone for RTree<V, G> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
            config: self.config.clone(),
        }
    }
}

impl<V, G> Default for RTree<V, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, G: fmt::Debug> fmt::Debug for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("size", &self.size)
            .field("config", &self.config)
            .field("root", &self.root)
            .finish()
    }
}

impl<V, G> Display for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTree(size={}, height={})", self.size, self.height())
    }
}
