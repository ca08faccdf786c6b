//! Hilbert curve ordering used by the bulk loader.
//!
//! Points that are close in 2D space stay close along the Hilbert curve, so
//! sorting entries by the curve position of their rectangle centres and
//! cutting the sorted run into consecutive groups yields compact nodes.

use crate::bounding_box::BoundingBox;

/// Highest supported curve order (bits per dimension).
const MAX_HILBERT_ORDER: u32 = 32;

/// Curve order used for bulk loading: a 65536 x 65536 grid.
pub const BULK_LOAD_ORDER: u32 = 16;

/// Position along a Hilbert curve of the given order for a point of the
/// unit square.
///
/// # Example
/// ```rust
/// use persistent_rtree::hilbert::hilbert_index;
///
/// assert_eq!(hilbert_index(0.0, 0.0, 8), 0);
/// assert!(hilbert_index(0.5, 0.5, 16) < (1u64 << 32));
/// ```
pub fn hilbert_index(x: f64, y: f64, order: u32) -> u64 {
    debug_assert!((0.0..=1.0).contains(&x), "x must be in [0,1]");
    debug_assert!((0.0..=1.0).contains(&y), "y must be in [0,1]");
    debug_assert!(order > 0 && order <= MAX_HILBERT_ORDER, "order must be 1-32");

    let side = 1u64 << order;
    let last = side - 1;
    let xi = ((x * side as f64) as u64).min(last);
    let yi = ((y * side as f64) as u64).min(last);
    xy2d(side, xi, yi)
}

/// Hilbert position of `(x, y)` after normalizing it into `bounds`.
///
/// Coordinates outside the bounds are clamped; a degenerate axis maps to
/// its middle.
pub fn hilbert_index_bounded(x: f64, y: f64, bounds: &BoundingBox, order: u32) -> u64 {
    hilbert_index(
        normalize(x, bounds.min_x, bounds.max_x),
        normalize(y, bounds.min_y, bounds.max_y),
        order,
    )
}

/// Hilbert position of a rectangle's centre within `bounds`.
pub fn hilbert_key(rect: &BoundingBox, bounds: &BoundingBox) -> u64 {
    let (x, y) = rect.center();
    hilbert_index_bounded(x, y, bounds, BULK_LOAD_ORDER)
}

/// Position of `value` within `[min, max]` as a fraction of the range.
///
/// A degenerate or overflowing range (or a NaN ratio) maps to the middle.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        return 0.5;
    }
    let ratio = (value - min) / range;
    if ratio.is_nan() {
        0.5
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Maps grid cell `(x, y)` of a `side x side` grid to its curve distance.
fn xy2d(side: u64, mut x: u64, mut y: u64) -> u64 {
    let mut d = 0u64;
    let mut s = side / 2;
    while s > 0 {
        let rx = u64::from((x & s) > 0);
        let ry = u64::from((y & s) > 0);
        d += s * s * ((3 * rx) ^ ry);
        rotate(side, &mut x, &mut y, rx, ry);
        s /= 2;
    }
    d
}

/// Rotates or reflects a quadrant so the sub-curve has the right orientation.
fn rotate(side: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = side - 1 - *x;
            *y = side - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}
