//! A ready-made publisher for hosts that share one evolving tree between
//! threads.
//!
//! Readers take a snapshot (an O(1) clone of the current tree) and search it
//! without holding any lock. Writers are serialized: each one derives the
//! successor of the latest tree and publishes it atomically.

use std::sync::Arc;

use log::trace;
use parking_lot::{Mutex, RwLock};

use crate::entry::Entry;
use crate::errors::SpatialResult;
use crate::geometry::Geometry;
use crate::rtree::RTree;

/// Thread-safe handle to the current version of a tree.
///
/// ## Example
///
/// ```rust
/// use persistent_rtree::{Entry, Point, RTree, SharedRTree};
///
/// let shared = SharedRTree::new(RTree::new());
/// let before = shared.snapshot();
/// shared.insert(Entry::new("a", Point::new(0.0, 0.0)).unwrap());
///
/// assert_eq!(before.size(), 0);
/// assert_eq!(shared.snapshot().size(), 1);
/// ```
pub struct SharedRTree<V, G> {
    inner: Arc<SharedRTreeInner<V, G>>,
}

struct SharedRTreeInner<V, G> {
    current: RwLock<RTree<V, G>>,
    writer: Mutex<()>,
}

impl<V, G> SharedRTree<V, G> {
    pub fn new(tree: RTree<V, G>) -> Self {
        Self {
            inner: Arc::new(SharedRTreeInner {
                current: RwLock::new(tree),
                writer: Mutex::new(()),
            }),
        }
    }

    /// The most recently published tree.
    pub fn snapshot(&self) -> RTree<V, G> {
        self.inner.current.read().clone()
    }

    /// Number of entries in the most recently published tree.
    pub fn size(&self) -> usize {
        self.inner.current.read().size()
    }

    /// Replaces the current tree.
    pub fn publish(&self, tree: RTree<V, G>) {
        let _writer = self.inner.writer.lock();
        *self.inner.current.write() = tree;
    }

    /// Derives a successor from the current tree and publishes it.
    ///
    /// Concurrent updates are applied one after another, each seeing the
    /// result of the previous one. Returns the published tree.
    pub fn update<F>(&self, f: F) -> RTree<V, G>
    where
        F: FnOnce(&RTree<V, G>) -> RTree<V, G>,
    {
        let _writer = self.inner.writer.lock();
        let next = f(&self.snapshot());
        *self.inner.current.write() = next.clone();
        trace!("published tree with {} entries", next.size());
        next
    }

    /// Like [`update`](Self::update), but leaves the current tree in place
    /// when `f` fails.
    pub fn try_update<F>(&self, f: F) -> SpatialResult<RTree<V, G>>
    where
        F: FnOnce(&RTree<V, G>) -> SpatialResult<RTree<V, G>>,
    {
        let _writer = self.inner.writer.lock();
        let next = f(&self.snapshot())?;
        *self.inner.current.write() = next.clone();
        Ok(next)
    }
}

impl<V, G: Geometry> SharedRTree<V, G> {
    pub fn insert(&self, entry: Entry<V, G>) -> RTree<V, G> {
        self.update(|tree| tree.insert(entry))
    }
}

impl<V: PartialEq, G: Geometry + PartialEq> SharedRTree<V, G> {
    pub fn delete(&self, entry: &Entry<V, G>) -> RTree<V, G> {
        self.update(|tree| tree.delete(entry))
    }
}

impl<V, G> Clone for SharedRTree<V, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, G> Default for SharedRTree<V, G> {
    fn default() -> Self {
        Self::new(RTree::new())
    }
}
