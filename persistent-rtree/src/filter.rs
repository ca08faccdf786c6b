//! Spatial filters for querying the tree.
//!
//! This module provides filter types for spatial queries:
//! - `IntersectsFilter` - finds geometries that intersect a rectangle
//! - `WithinFilter` - finds geometries contained within a rectangle
//! - `NearFilter` - finds geometries within a distance of a rectangle or point
//! - `PredicateFilter` - applies a caller-supplied test
//! - `AllFilter` - matches every entry
//!
//! ## Two-Phase Query Execution
//!
//! Every filter answers two questions:
//! 1. **Node test**: can the subtree under this bounding rectangle contain a
//!    match? A `false` answer prunes the whole subtree.
//! 2. **Entry test**: does this stored geometry match? This is the precise
//!    check that removes bounding-rectangle false positives.

use std::fmt;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;

/// A search predicate over node rectangles and entry geometries.
///
/// The node test must never reject a rectangle that encloses a geometry the
/// entry test would accept.
pub trait SpatialFilter<G> {
    /// Returns true if the subtree bounded by `mbr` may hold matches.
    fn matches_node(&self, mbr: &BoundingBox) -> bool;

    /// Returns true if the stored geometry matches.
    fn matches_entry(&self, geometry: &G) -> bool;
}

impl<G, F: SpatialFilter<G> + ?Sized> SpatialFilter<G> for &F {
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        (**self).matches_node(mbr)
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        (**self).matches_entry(geometry)
    }
}

impl<G, F: SpatialFilter<G> + ?Sized> SpatialFilter<G> for Box<F> {
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        (**self).matches_node(mbr)
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        (**self).matches_entry(geometry)
    }
}

/// Filter that finds geometries intersecting a rectangle.
///
/// Touching counts as intersecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectsFilter {
    rect: BoundingBox,
}

impl IntersectsFilter {
    pub fn new(rect: BoundingBox) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> &BoundingBox {
        &self.rect
    }
}

impl<G: Geometry> SpatialFilter<G> for IntersectsFilter {
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        self.rect.intersects(mbr)
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        geometry.intersects(&self.rect)
    }
}

impl fmt::Display for IntersectsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intersects {}", self.rect)
    }
}

/// Filter that finds geometries whose bounding rectangle lies entirely
/// within a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithinFilter {
    rect: BoundingBox,
}

impl WithinFilter {
    pub fn new(rect: BoundingBox) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> &BoundingBox {
        &self.rect
    }
}

impl<G: Geometry> SpatialFilter<G> for WithinFilter {
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        self.rect.intersects(mbr)
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        self.rect.contains(&geometry.mbr())
    }
}

impl fmt::Display for WithinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "within {}", self.rect)
    }
}

/// Filter that finds geometries within a distance of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFilter {
    rect: BoundingBox,
    max_distance: f64,
}

impl NearFilter {
    pub fn new(rect: BoundingBox, max_distance: f64) -> Self {
        Self { rect, max_distance }
    }

    /// Creates a filter matching geometries within `max_distance` of a point.
    pub fn around_point(x: f64, y: f64, max_distance: f64) -> Self {
        Self::new(BoundingBox::from_point(x, y), max_distance)
    }

    pub fn rect(&self) -> &BoundingBox {
        &self.rect
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }
}

impl<G: Geometry> SpatialFilter<G> for NearFilter {
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        mbr.distance_to(&self.rect) <= self.max_distance
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        geometry.distance(&self.rect) <= self.max_distance
    }
}

impl fmt::Display for NearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "within {} of {}", self.max_distance, self.rect)
    }
}

/// Filter backed by a closure.
///
/// The closure sees node rectangles (as `BoundingBox` geometries) during
/// descent and entry geometries at the leaves, so it must accept any
/// rectangle enclosing a geometry it accepts.
#[derive(Clone)]
pub struct PredicateFilter<F> {
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(&dyn Geometry) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<G, F> SpatialFilter<G> for PredicateFilter<F>
where
    G: Geometry,
    F: Fn(&dyn Geometry) -> bool,
{
    fn matches_node(&self, mbr: &BoundingBox) -> bool {
        (self.predicate)(mbr)
    }

    fn matches_entry(&self, geometry: &G) -> bool {
        (self.predicate)(geometry)
    }
}

impl<F> fmt::Debug for PredicateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFilter")
    }
}

/// Filter that matches every entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllFilter;

impl<G> SpatialFilter<G> for AllFilter {
    fn matches_node(&self, _mbr: &BoundingBox) -> bool {
        true
    }

    fn matches_entry(&self, _geometry: &G) -> bool {
        true
    }
}
