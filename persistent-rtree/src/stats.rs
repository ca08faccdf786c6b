//! Structural statistics and integrity checking.

use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::config::RTreeConfig;
use crate::entry::Entry;
use crate::geometry::Geometry;
use crate::node::Node;

/// Statistics about the shape of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTreeStats {
    pub total_entries: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    pub tree_height: usize,
}

impl RTreeStats {
    /// Average number of entries per leaf (0 for an empty tree).
    pub fn average_leaf_fill(&self) -> f64 {
        if self.leaf_count == 0 {
            0.0
        } else {
            self.total_entries as f64 / self.leaf_count as f64
        }
    }
}

/// Result of integrity check operation
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total nodes checked
    pub nodes_checked: usize,
    /// Total entries reached from the root
    pub entries_checked: usize,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            entries_checked: 0,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn record_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn collect_stats<V, G>(root: Option<&Node<V, G>>) -> RTreeStats {
    let mut stats = RTreeStats::default();
    let Some(root) = root else {
        return stats;
    };
    stats.tree_height = root.height() + 1;

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        stats.node_count += 1;
        match node {
            Node::Leaf { entries, .. } => {
                stats.leaf_count += 1;
                stats.total_entries += entries.len();
            }
            Node::NonLeaf { children, .. } => stack.extend(children.iter().map(|c| c.as_ref())),
        }
    }
    stats
}

/// Verifies cached rectangles, node occupancy, balance and the entry count.
pub(crate) fn check_integrity<V, G: Geometry>(
    root: Option<&Node<V, G>>,
    config: &RTreeConfig,
    size: usize,
) -> IntegrityReport {
    let mut report = IntegrityReport::new();
    let Some(root) = root else {
        if size != 0 {
            report.record_error(format!("empty tree reports size {}", size));
        }
        return report;
    };

    let mut leaf_depth: Option<usize> = None;
    let mut stack: Vec<(&Node<V, G>, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        report.nodes_checked += 1;
        let is_root = depth == 0;

        let count = node.count();
        if count == 0 {
            report.record_error(format!("empty node at depth {}", depth));
        }
        if count > config.max_children() {
            report.record_error(format!(
                "node at depth {} holds {} items, more than {}",
                depth,
                count,
                config.max_children()
            ));
        }
        if !is_root && count < config.min_children() {
            report.record_error(format!(
                "node at depth {} holds {} items, fewer than {}",
                depth,
                count,
                config.min_children()
            ));
        }

        let expected = match node {
            Node::Leaf { entries, .. } => {
                report.entries_checked += entries.len();
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(d) if d != depth => report.record_error(format!(
                        "leaf at depth {} but other leaves are at depth {}",
                        depth, d
                    )),
                    Some(_) => {}
                }
                BoundingBox::union_all(entries.iter().map(Entry::mbr))
            }
            Node::NonLeaf { children, .. } => {
                stack.extend(children.iter().map(|c| (c.as_ref(), depth + 1)));
                BoundingBox::union_all(children.iter().map(|c| *c.geometry()))
            }
        };
        if let Some(expected) = expected {
            if expected != *node.geometry() {
                report.record_error(format!(
                    "node at depth {} caches {} but its contents span {}",
                    depth,
                    node.geometry(),
                    expected
                ));
            }
        }
    }

    if report.entries_checked != size {
        report.record_error(format!(
            "tree reports size {} but holds {} entries",
            size, report.entries_checked
        ));
    }
    report
}
