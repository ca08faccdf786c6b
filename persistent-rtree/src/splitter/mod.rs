//! Node split strategies.
//!
//! When a node overflows, its `max_children + 1` items are divided into two
//! groups, each holding between `min_children` and `max_children` items.
//! The strategy is picked once per tree through [`SplitterKind`].

mod linear;
mod quadratic;
mod star;

pub use linear::LinearSplitter;
pub use quadratic::QuadraticSplitter;
pub use star::RStarSplitter;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::bounding_box::BoundingBox;
use crate::errors::SpatialError;
use crate::node::Bounded;

/// Divides an overflowing list of items into two groups.
///
/// Implementations must be deterministic: the same input always gives the
/// same split. Both groups keep the relative order the items had in the input.
pub trait Splitter {
    fn split<T: Bounded>(&self, items: Vec<T>, min_children: usize) -> (Vec<T>, Vec<T>);
}

/// Identifies a split strategy by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitterKind {
    /// Guttman's quadratic split.
    #[default]
    Quadratic,
    /// Guttman's linear split.
    Linear,
    /// The R*-tree topological split.
    RStar,
}

impl SplitterKind {
    pub const ALL: [SplitterKind; 3] = [
        SplitterKind::Quadratic,
        SplitterKind::Linear,
        SplitterKind::RStar,
    ];

    /// The registry name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            SplitterKind::Quadratic => "quadratic",
            SplitterKind::Linear => "linear",
            SplitterKind::RStar => "rstar",
        }
    }
}

impl Splitter for SplitterKind {
    fn split<T: Bounded>(&self, items: Vec<T>, min_children: usize) -> (Vec<T>, Vec<T>) {
        match self {
            SplitterKind::Quadratic => QuadraticSplitter.split(items, min_children),
            SplitterKind::Linear => LinearSplitter.split(items, min_children),
            SplitterKind::RStar => RStarSplitter.split(items, min_children),
        }
    }
}

impl FromStr for SplitterKind {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        SplitterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                SpatialError::InvalidConfiguration(format!("unknown splitter: {}", s))
            })
    }
}

impl Display for SplitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the items left over after seeding are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignOrder {
    /// Guttman's PickNext: the item with the strongest preference goes first.
    PickNext,
    /// Input order.
    Sequential,
}

/// Grows two groups from the given seeds and returns each item's group.
pub(crate) fn assign_from_seeds(
    boxes: &[BoundingBox],
    seeds: (usize, usize),
    min_children: usize,
    order: AssignOrder,
) -> Vec<u8> {
    let (first, second) = seeds;
    let mut assignment = vec![0u8; boxes.len()];
    assignment[second] = 1;

    let mut mbrs = [boxes[first], boxes[second]];
    let mut sizes = [1usize, 1usize];
    let mut remaining: Vec<usize> = (0..boxes.len())
        .filter(|&i| i != first && i != second)
        .collect();

    while !remaining.is_empty() {
        // a group that needs every remaining item to reach the minimum takes them all
        if let Some(group) = (0..2).find(|&g| sizes[g] + remaining.len() <= min_children) {
            for i in remaining.drain(..) {
                assignment[i] = group as u8;
                mbrs[group] = mbrs[group].union(&boxes[i]);
                sizes[group] += 1;
            }
            break;
        }

        let position = match order {
            AssignOrder::Sequential => 0,
            AssignOrder::PickNext => pick_next(boxes, &remaining, &mbrs),
        };
        let i = remaining.remove(position);
        let group = preferred_group(&mbrs, &boxes[i]);
        assignment[i] = group as u8;
        mbrs[group] = mbrs[group].union(&boxes[i]);
        sizes[group] += 1;
    }

    assignment
}

/// Position (within `remaining`) of the item with the largest difference in
/// enlargement between the two groups; the lowest position wins ties.
fn pick_next(boxes: &[BoundingBox], remaining: &[usize], mbrs: &[BoundingBox; 2]) -> usize {
    let mut best = 0;
    let mut best_diff = f64::NEG_INFINITY;
    for (position, &i) in remaining.iter().enumerate() {
        let diff = (mbrs[0].enlargement(&boxes[i]) - mbrs[1].enlargement(&boxes[i])).abs();
        if diff > best_diff {
            best_diff = diff;
            best = position;
        }
    }
    best
}

/// Group whose rectangle grows least when `item` is added. Ties go to the
/// smaller resulting area, then to the first group.
pub(crate) fn preferred_group(mbrs: &[BoundingBox; 2], item: &BoundingBox) -> usize {
    let e0 = mbrs[0].enlargement(item);
    let e1 = mbrs[1].enlargement(item);
    if e0 < e1 {
        return 0;
    }
    if e1 < e0 {
        return 1;
    }
    let a0 = mbrs[0].union(item).area();
    let a1 = mbrs[1].union(item).area();
    if a1 < a0 {
        1
    } else {
        0
    }
}

/// Moves the items into their groups, keeping input order within each group.
pub(crate) fn partition<T>(items: Vec<T>, assignment: &[u8]) -> (Vec<T>, Vec<T>) {
    let mut first = Vec::with_capacity(items.len());
    let mut second = Vec::with_capacity(items.len());
    for (item, &group) in items.into_iter().zip(assignment) {
        if group == 0 {
            first.push(item);
        } else {
            second.push(item);
        }
    }
    (first, second)
}
