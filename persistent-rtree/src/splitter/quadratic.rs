use super::{assign_from_seeds, partition, AssignOrder, Splitter};
use crate::bounding_box::BoundingBox;
use crate::node::Bounded;

/// Guttman's quadratic split.
///
/// Seeds are the pair of items that would waste the most area if grouped
/// together. The rest are assigned with PickNext.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticSplitter;

impl QuadraticSplitter {
    /// The first pair in index order wins ties.
    fn pick_seeds(boxes: &[BoundingBox]) -> (usize, usize) {
        let mut seeds = (0, 1);
        let mut worst = f64::NEG_INFINITY;
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let waste = boxes[i].union(&boxes[j]).area() - boxes[i].area() - boxes[j].area();
                if waste > worst {
                    worst = waste;
                    seeds = (i, j);
                }
            }
        }
        seeds
    }
}

impl Splitter for QuadraticSplitter {
    fn split<T: Bounded>(&self, items: Vec<T>, min_children: usize) -> (Vec<T>, Vec<T>) {
        debug_assert!(items.len() >= 2, "cannot split fewer than two items");
        let boxes: Vec<BoundingBox> = items.iter().map(Bounded::bounds).collect();
        let seeds = Self::pick_seeds(&boxes);
        let assignment = assign_from_seeds(&boxes, seeds, min_children, AssignOrder::PickNext);
        partition(items, &assignment)
    }
}
