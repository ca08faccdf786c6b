use super::{assign_from_seeds, partition, AssignOrder, Splitter};
use crate::bounding_box::BoundingBox;
use crate::node::Bounded;

/// Guttman's linear split.
///
/// Seeds are the two items that lie furthest apart along the axis of
/// greatest normalized separation; the rest are assigned in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSplitter;

/// Seed candidates along one axis with their normalized separation.
struct AxisSeeds {
    low: usize,
    high: usize,
    separation: f64,
}

impl LinearSplitter {
    fn axis_seeds(boxes: &[BoundingBox], lower: fn(&BoundingBox) -> f64, upper: fn(&BoundingBox) -> f64) -> AxisSeeds {
        // item with the highest low side
        let mut high = 0;
        for (i, b) in boxes.iter().enumerate() {
            if lower(b) > lower(&boxes[high]) {
                high = i;
            }
        }

        // item with the lowest high side, other than `high`
        let mut low = if high == 0 { 1 } else { 0 };
        for (i, b) in boxes.iter().enumerate() {
            if i != high && upper(b) < upper(&boxes[low]) {
                low = i;
            }
        }

        let min = boxes.iter().map(lower).fold(f64::INFINITY, f64::min);
        let max = boxes.iter().map(upper).fold(f64::NEG_INFINITY, f64::max);
        let width = max - min;
        let gap = lower(&boxes[high]) - upper(&boxes[low]);
        let separation = if width > 0.0 { gap / width } else { 0.0 };

        AxisSeeds { low, high, separation }
    }

    fn pick_seeds(boxes: &[BoundingBox]) -> (usize, usize) {
        let x = Self::axis_seeds(boxes, |b| b.min_x, |b| b.max_x);
        let y = Self::axis_seeds(boxes, |b| b.min_y, |b| b.max_y);
        let best = if y.separation > x.separation { y } else { x };
        (best.low, best.high)
    }
}

impl Splitter for LinearSplitter {
    fn split<T: Bounded>(&self, items: Vec<T>, min_children: usize) -> (Vec<T>, Vec<T>) {
        debug_assert!(items.len() >= 2, "cannot split fewer than two items");
        let boxes: Vec<BoundingBox> = items.iter().map(Bounded::bounds).collect();
        let seeds = Self::pick_seeds(&boxes);
        let assignment = assign_from_seeds(&boxes, seeds, min_children, AssignOrder::Sequential);
        partition(items, &assignment)
    }
}
