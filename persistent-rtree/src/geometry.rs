//! Geometry capability and the concrete shapes shipped with the index.
//!
//! The tree never looks inside a shape. Everything it needs is expressed by
//! the [`Geometry`] trait:
//! - `mbr()` - the minimum bounding rectangle
//! - `intersects(rect)` - an exact test against a rectangle
//! - `distance(rect)` - the minimum distance to a rectangle
//!
//! Points, rectangles ([`BoundingBox`]) and circles are provided; hosts can
//! plug in their own shapes by implementing the trait.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::bounding_box::BoundingBox;

/// Capability contract for anything that can be stored in or used to query the tree.
///
/// Implementations must keep `distance(rect)` greater than or equal to
/// `self.mbr().distance_to(rect)`; nearest-neighbour pruning relies on a
/// node's bounding rectangle never being farther away than its contents.
pub trait Geometry {
    /// Returns the minimum bounding rectangle of this geometry.
    fn mbr(&self) -> BoundingBox;

    /// Returns true if this geometry shares any point with `rect`.
    fn intersects(&self, rect: &BoundingBox) -> bool;

    /// Returns the minimum Euclidean distance from this geometry to `rect`.
    fn distance(&self, rect: &BoundingBox) -> f64;
}

impl<T: Geometry + ?Sized> Geometry for &T {
    fn mbr(&self) -> BoundingBox {
        (**self).mbr()
    }

    fn intersects(&self, rect: &BoundingBox) -> bool {
        (**self).intersects(rect)
    }

    fn distance(&self, rect: &BoundingBox) -> f64 {
        (**self).distance(rect)
    }
}

/// Hashes a float so that `0.0` and `-0.0` (which compare equal) hash equally.
pub(crate) fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    (value + 0.0).to_bits().hash(state);
}

/// A 2D coordinate (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another coordinate.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_f64(self.x, state);
        hash_f64(self.y, state);
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D point geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    coordinate: Coordinate,
}

impl Point {
    /// Creates a new point at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            coordinate: Coordinate::new(x, y),
        }
    }

    /// Creates a point from a coordinate.
    pub fn from_coordinate(coord: Coordinate) -> Self {
        Self { coordinate: coord }
    }

    /// Gets the x coordinate.
    pub fn x(&self) -> f64 {
        self.coordinate.x
    }

    /// Gets the y coordinate.
    pub fn y(&self) -> f64 {
        self.coordinate.y
    }

    /// Gets the coordinate.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Euclidean distance to another point.
    pub fn distance_to_point(&self, other: &Point) -> f64 {
        self.coordinate.distance(&other.coordinate)
    }
}

impl Geometry for Point {
    fn mbr(&self) -> BoundingBox {
        BoundingBox::from_point(self.x(), self.y())
    }

    fn intersects(&self, rect: &BoundingBox) -> bool {
        rect.contains_point(self.x(), self.y())
    }

    fn distance(&self, rect: &BoundingBox) -> f64 {
        rect.distance_to_point(self.x(), self.y())
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.coordinate.x, self.coordinate.y)
    }
}

/// A circle given by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    center: Coordinate,
    radius: f64,
}

impl Circle {
    /// Creates a new circle. A negative radius yields an invalid bounding
    /// rectangle, which entry construction rejects.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Coordinate::new(x, y),
            radius,
        }
    }

    /// Gets the center coordinate.
    pub fn center(&self) -> &Coordinate {
        &self.center
    }

    /// Gets the radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns true if the point lies inside or on the circle.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.center.distance(&Coordinate::new(x, y)) <= self.radius
    }
}

impl Eq for Circle {}

impl Hash for Circle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.center.hash(state);
        hash_f64(self.radius, state);
    }
}

impl Geometry for Circle {
    fn mbr(&self) -> BoundingBox {
        BoundingBox::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn intersects(&self, rect: &BoundingBox) -> bool {
        rect.distance_to_point(self.center.x, self.center.y) <= self.radius
    }

    fn distance(&self, rect: &BoundingBox) -> f64 {
        (rect.distance_to_point(self.center.x, self.center.y) - self.radius).max(0.0)
    }
}

impl Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CIRCLE({} {}, {})", self.center.x, self.center.y, self.radius)
    }
}
