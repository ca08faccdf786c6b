use super::{partition, Splitter};
use crate::bounding_box::BoundingBox;
use crate::node::Bounded;

/// The R*-tree split (Beckmann et al.).
///
/// For each axis the items are sorted by lower and by upper coordinate and
/// every legal distribution of the sorted list is scored. The axis with the
/// smallest total margin wins; on that axis the distribution with the least
/// overlap is used, ties broken by the least total area.
#[derive(Debug, Clone, Copy, Default)]
pub struct RStarSplitter;

/// One candidate split: the first `k` items of sorted order number `order`
/// form the first group.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Distribution {
    order: usize,
    k: usize,
    overlap: f64,
    area: f64,
}

type Key = fn(&BoundingBox) -> f64;

fn min_x(b: &BoundingBox) -> f64 {
    b.min_x
}

fn max_x(b: &BoundingBox) -> f64 {
    b.max_x
}

fn min_y(b: &BoundingBox) -> f64 {
    b.min_y
}

fn max_y(b: &BoundingBox) -> f64 {
    b.max_y
}

const X_KEYS: [Key; 2] = [min_x, max_x];
const Y_KEYS: [Key; 2] = [min_y, max_y];

impl RStarSplitter {
    fn sorted_by(boxes: &[BoundingBox], key: Key) -> Vec<usize> {
        let mut order: Vec<usize> = (0..boxes.len()).collect();
        order.sort_by(|&a, &b| key(&boxes[a]).total_cmp(&key(&boxes[b])));
        order
    }

    /// Scores every split of `order` with at least `min` items per side and
    /// returns them along with their total margin. Each candidate refers back
    /// to `order` through `index`.
    fn distributions(boxes: &[BoundingBox], order: &[usize], index: usize, min: usize) -> (f64, Vec<Distribution>) {
        let n = order.len();
        let mut prefix = Vec::with_capacity(n);
        let mut acc = boxes[order[0]];
        for &i in order {
            acc = acc.union(&boxes[i]);
            prefix.push(acc);
        }
        let mut suffix = vec![boxes[order[n - 1]]; n];
        let mut acc = boxes[order[n - 1]];
        for pos in (0..n).rev() {
            acc = acc.union(&boxes[order[pos]]);
            suffix[pos] = acc;
        }

        let mut margin = 0.0;
        let mut distributions = Vec::with_capacity(n - 2 * min + 1);
        for k in min..=(n - min) {
            let first = prefix[k - 1];
            let second = suffix[k];
            margin += first.margin() + second.margin();
            distributions.push(Distribution {
                order: index,
                k,
                overlap: first.intersection_area(&second),
                area: first.area() + second.area(),
            });
        }
        (margin, distributions)
    }

    fn choose(boxes: &[BoundingBox], min_children: usize) -> Vec<u8> {
        let n = boxes.len();
        let min = min_children.clamp(1, n / 2);

        // axis with the least total margin; x wins ties
        let mut best_axis: Option<(f64, [Vec<usize>; 2], Vec<Distribution>)> = None;
        for keys in [X_KEYS, Y_KEYS] {
            let orders = keys.map(|key| Self::sorted_by(boxes, key));
            let mut margin = 0.0;
            let mut candidates = Vec::new();
            for (index, order) in orders.iter().enumerate() {
                let (m, d) = Self::distributions(boxes, order, index, min);
                margin += m;
                candidates.extend(d);
            }
            if best_axis.as_ref().map_or(true, |(best, _, _)| margin < *best) {
                best_axis = Some((margin, orders, candidates));
            }
        }

        // least overlap, then least area; the first candidate wins ties
        let mut assignment = vec![0u8; n];
        if let Some((_, orders, candidates)) = best_axis {
            let chosen = candidates.into_iter().min_by(|a, b| {
                a.overlap
                    .total_cmp(&b.overlap)
                    .then(a.area.total_cmp(&b.area))
            });
            if let Some(distribution) = chosen {
                for &i in &orders[distribution.order][distribution.k..] {
                    assignment[i] = 1;
                }
            }
        }
        assignment
    }
}

impl Splitter for RStarSplitter {
    fn split<T: Bounded>(&self, items: Vec<T>, min_children: usize) -> (Vec<T>, Vec<T>) {
        debug_assert!(items.len() >= 2, "cannot split fewer than two items");
        let boxes: Vec<BoundingBox> = items.iter().map(Bounded::bounds).collect();
        let assignment = Self::choose(&boxes, min_children);
        partition(items, &assignment)
    }
}
