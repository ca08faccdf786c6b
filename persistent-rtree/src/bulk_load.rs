//! Bottom-up packing of a whole entry set into a tree.
//!
//! Entries are ordered along a Hilbert curve and cut into consecutive runs,
//! one run per leaf; the leaves are then packed the same way, level by
//! level, until a single root remains. Every leaf ends up at the same depth,
//! and the tree is never taller than `max_children` forces it to be.

use std::sync::Arc;

use log::debug;

use crate::bounding_box::BoundingBox;
use crate::config::RTreeConfig;
use crate::entry::Entry;
use crate::geometry::Geometry;
use crate::hilbert::hilbert_key;
use crate::node::Node;
use crate::rtree::RTree;

/// Builds a packed tree from `entries`.
pub(crate) fn bulk_load<V, G: Geometry>(mut entries: Vec<Entry<V, G>>, config: RTreeConfig) -> RTree<V, G> {
    let size = entries.len();
    let Some(bounds) = BoundingBox::union_all(entries.iter().map(Entry::mbr)) else {
        return RTree::with_config(config);
    };

    entries.sort_by_cached_key(|entry| hilbert_key(&entry.mbr(), &bounds));

    let capacity = node_capacity(&config);
    let max = config.max_children();
    let groups = group_count(size, capacity, max);
    let mut level: Vec<Arc<Node<V, G>>> = pack(entries, groups)
        .into_iter()
        .map(|group| Arc::new(Node::leaf(group)))
        .collect();
    debug!("bulk load: {} entries packed into {} leaves", size, level.len());

    while level.len() > 1 {
        let groups = group_count(level.len(), capacity, max);
        level = pack(level, groups)
            .into_iter()
            .map(|group| Arc::new(Node::non_leaf(group)))
            .collect();
        debug!("bulk load: packed level of {} nodes", level.len());
    }

    RTree::from_parts(level.pop(), size, config)
}

/// Target fill of a packed node: `max_children * loading_factor`, kept
/// between `2 * min_children` and `max_children`.
///
/// The lower bound means evenly sized runs never drop below `min_children`.
pub(crate) fn node_capacity(config: &RTreeConfig) -> usize {
    let target = (config.max_children() as f64 * config.loading_factor()).round() as usize;
    target.clamp(2 * config.min_children(), config.max_children())
}

/// Number of nodes to pack `n` items of one level into.
///
/// Aims for runs of `capacity` items, but never uses more nodes than the
/// levels above can hold with `max_children` fan-out, so the packed tree has
/// the fewest levels any tree of `n` items can have.
fn group_count(n: usize, capacity: usize, max_children: usize) -> usize {
    // smallest span = max_children^h with span >= n
    let mut span = max_children;
    while span < n {
        span = span.saturating_mul(max_children);
    }
    let limit = span / max_children;
    n.div_ceil(capacity).min(limit).max(n.div_ceil(max_children)).max(1)
}

/// Cuts `items` into `groups` consecutive runs whose lengths differ by at
/// most one.
fn pack<T>(items: Vec<T>, groups: usize) -> Vec<Vec<T>> {
    let n = items.len();
    let base = n / groups;
    let extra = n % groups;

    let mut out = Vec::with_capacity(groups);
    let mut items = items.into_iter();
    for g in 0..groups {
        let len = if g < extra { base + 1 } else { base };
        out.push(items.by_ref().take(len).collect());
    }
    out
}
