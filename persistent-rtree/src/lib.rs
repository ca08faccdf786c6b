//! # Persistent R-Tree - Immutable Spatial Index
//!
//! This crate provides an in-memory R-Tree whose every version is an
//! immutable value. Inserting or deleting an entry returns a new tree that
//! shares all untouched nodes with the old one, so readers can keep
//! searching an old snapshot while writers build the next.
//!
//! ## Features
//!
//! - **Structural Sharing**: Only the root-to-leaf path is copied per change
//! - **Pluggable Splits**: Quadratic, linear and R* node splitting
//! - **Lazy Search**: Filter and nearest-neighbour iterators over a snapshot
//! - **Two-Phase Search**: Bounding rectangle pruning followed by precise geometry refinement
//! - **Bulk Loading**: Hilbert-ordered packing of large entry sets
//! - **Snapshot Publishing**: Optional `SharedRTree` for multi-threaded hosts
//!
//! ## Quick Start
//!
//! ```rust
//! use persistent_rtree::{BoundingBox, Entry, Point, RTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = RTree::<&str, Point>::builder().max_children(8).create()?;
//! let tree = tree
//!     .add("cafe", Point::new(1.0, 1.0))?
//!     .add("park", Point::new(4.0, 2.0))?
//!     .add("pier", Point::new(9.0, 9.0))?;
//!
//! // Entries intersecting a rectangle
//! let hits: Vec<&str> = tree
//!     .search_intersecting(&BoundingBox::new(0.0, 0.0, 5.0, 5.0))
//!     .map(|e| *e.value())
//!     .collect();
//! assert_eq!(hits.len(), 2);
//!
//! // Closest entry to a point
//! let closest = tree
//!     .nearest(&BoundingBox::from_point(8.0, 8.0), 1, None)
//!     .next()
//!     .map(|e| *e.value());
//! assert_eq!(closest, Some("pier"));
//!
//! // Older versions are untouched
//! let smaller = tree.delete(&Entry::new("pier", Point::new(9.0, 9.0))?);
//! assert_eq!((tree.size(), smaller.size()), (3, 2));
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
mod bulk_load;
pub mod config;
pub mod entry;
pub mod errors;
pub mod filter;
pub mod geometry;
pub mod hilbert;
pub mod node;
pub mod rtree;
pub mod search;
pub mod shared;
pub mod splitter;
pub mod stats;

// Re-export core types
pub use bounding_box::BoundingBox;
pub use config::{RTreeBuilder, RTreeConfig};
pub use entry::Entry;
pub use errors::{SpatialError, SpatialResult};
pub use node::{Bounded, Node, NodePosition};
pub use rtree::RTree;
pub use shared::SharedRTree;
pub use stats::{IntegrityReport, RTreeStats};

// Re-export geometry types
pub use geometry::{Circle, Coordinate, Geometry, Point};

// Re-export search types
pub use filter::{AllFilter, IntersectsFilter, NearFilter, PredicateFilter, SpatialFilter, WithinFilter};
pub use search::{Nearest, Search};

// Re-export split strategies
pub use splitter::{LinearSplitter, QuadraticSplitter, RStarSplitter, Splitter, SplitterKind};
