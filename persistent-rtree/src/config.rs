//! Tree configuration module.
//!
//! This module provides the validated, immutable settings shared by every
//! snapshot of a tree, and the fluent [`RTreeBuilder`] used to create trees.

use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::errors::{SpatialError, SpatialResult};
use crate::geometry::Geometry;
use crate::rtree::RTree;
use crate::splitter::SplitterKind;

/// Default maximum number of children per node
pub const DEFAULT_MAX_CHILDREN: usize = 4;

/// Smallest accepted maximum number of children per node
pub const MIN_MAX_CHILDREN: usize = 4;

/// Default minimum children as a fraction of the maximum
pub const DEFAULT_MIN_CHILDREN_RATIO: f64 = 0.4;

/// Default fill ratio of bulk-loaded nodes
pub const DEFAULT_LOADING_FACTOR: f64 = 0.7;

/// R-Tree configuration.
///
/// A cloneable, validated configuration. Every tree derived from another by
/// insert or delete shares its configuration handle.
///
/// # Example
///
/// ```rust
/// use persistent_rtree::{RTreeConfig, SplitterKind};
///
/// let config = RTreeConfig::new(8, 3, SplitterKind::RStar, 0.7).unwrap();
/// assert_eq!(config.max_children(), 8);
/// ```
#[derive(Clone)]
pub struct RTreeConfig {
    inner: Arc<RTreeConfigInner>,
}

/// Internal configuration storage.
#[derive(PartialEq)]
struct RTreeConfigInner {
    /// Most children (or entries) a node may hold.
    max_children: usize,

    /// Fewest children (or entries) a non-root node may hold.
    min_children: usize,

    /// Strategy used when a node overflows.
    splitter: SplitterKind,

    /// Fill ratio of bulk-loaded nodes.
    loading_factor: f64,
}

impl RTreeConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// Returns `SpatialError::InvalidConfiguration` if `max_children < 4`,
    /// `min_children` is 0 or more than half of `max_children`, or
    /// `loading_factor` is outside `(0, 1]`.
    pub fn new(
        max_children: usize,
        min_children: usize,
        splitter: SplitterKind,
        loading_factor: f64,
    ) -> SpatialResult<Self> {
        if max_children < MIN_MAX_CHILDREN {
            return Err(SpatialError::InvalidConfiguration(format!(
                "max_children must be at least {}, got {}",
                MIN_MAX_CHILDREN, max_children
            )));
        }
        if min_children < 1 {
            return Err(SpatialError::InvalidConfiguration(
                "min_children must be at least 1".to_string(),
            ));
        }
        if min_children * 2 > max_children {
            return Err(SpatialError::InvalidConfiguration(format!(
                "min_children ({}) must not exceed half of max_children ({})",
                min_children, max_children
            )));
        }
        if !(loading_factor > 0.0 && loading_factor <= 1.0) {
            return Err(SpatialError::InvalidConfiguration(format!(
                "loading_factor must be in (0, 1], got {}",
                loading_factor
            )));
        }

        Ok(Self {
            inner: Arc::new(RTreeConfigInner {
                max_children,
                min_children,
                splitter,
                loading_factor,
            }),
        })
    }

    /// The default `min_children` for a given `max_children`.
    pub fn default_min_children(max_children: usize) -> usize {
        ((max_children as f64 * DEFAULT_MIN_CHILDREN_RATIO).round() as usize).max(1)
    }

    #[inline]
    pub fn max_children(&self) -> usize {
        self.inner.max_children
    }

    #[inline]
    pub fn min_children(&self) -> usize {
        self.inner.min_children
    }

    #[inline]
    pub fn splitter(&self) -> SplitterKind {
        self.inner.splitter
    }

    #[inline]
    pub fn loading_factor(&self) -> f64 {
        self.inner.loading_factor
    }
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            inner: Arc::new(RTreeConfigInner {
                max_children: DEFAULT_MAX_CHILDREN,
                min_children: Self::default_min_children(DEFAULT_MAX_CHILDREN),
                splitter: SplitterKind::default(),
                loading_factor: DEFAULT_LOADING_FACTOR,
            }),
        }
    }
}

impl PartialEq for RTreeConfig {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl fmt::Debug for RTreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTreeConfig")
            .field("max_children", &self.inner.max_children)
            .field("min_children", &self.inner.min_children)
            .field("splitter", &self.inner.splitter)
            .field("loading_factor", &self.inner.loading_factor)
            .finish()
    }
}

/// Fluent builder for trees.
///
/// Setters never fail; the first invalid setting is remembered and reported
/// by [`create`](RTreeBuilder::create) or [`bulk_load`](RTreeBuilder::bulk_load).
///
/// # Example
///
/// ```rust
/// use persistent_rtree::{Entry, Point, RTree};
///
/// let tree = RTree::<&str, Point>::builder()
///     .max_children(8)
///     .splitter_name("rstar")
///     .create::<&str, Point>()
///     .unwrap();
/// let tree = tree.insert(Entry::new("a", Point::new(1.0, 1.0)).unwrap());
/// assert_eq!(tree.size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RTreeBuilder {
    error: Option<SpatialError>,
    max_children: usize,
    min_children: Option<usize>,
    splitter: SplitterKind,
    loading_factor: f64,
}

impl RTreeBuilder {
    pub fn new() -> Self {
        Self {
            error: None,
            max_children: DEFAULT_MAX_CHILDREN,
            min_children: None,
            splitter: SplitterKind::default(),
            loading_factor: DEFAULT_LOADING_FACTOR,
        }
    }

    /// Sets the maximum number of children per node.
    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// Sets the minimum number of children per non-root node. When unset it
    /// defaults to 40% of `max_children`.
    pub fn min_children(mut self, min_children: usize) -> Self {
        self.min_children = Some(min_children);
        self
    }

    /// Sets the split strategy.
    pub fn splitter(mut self, splitter: SplitterKind) -> Self {
        self.splitter = splitter;
        self
    }

    /// Sets the split strategy by registry name.
    pub fn splitter_name(mut self, name: &str) -> Self {
        match name.parse() {
            Ok(splitter) => self.splitter = splitter,
            Err(e) => self.capture(e),
        }
        self
    }

    /// Shortcut for the R* split strategy.
    pub fn star(self) -> Self {
        self.splitter(SplitterKind::RStar)
    }

    /// Sets the fill ratio used by bulk loading.
    pub fn loading_factor(mut self, loading_factor: f64) -> Self {
        self.loading_factor = loading_factor;
        self
    }

    fn capture(&mut self, error: SpatialError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Validates the settings and returns the resulting configuration.
    pub fn build_config(&self) -> SpatialResult<RTreeConfig> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let min_children = self
            .min_children
            .unwrap_or_else(|| RTreeConfig::default_min_children(self.max_children));
        RTreeConfig::new(self.max_children, min_children, self.splitter, self.loading_factor)
    }

    /// Creates an empty tree with these settings.
    pub fn create<V, G: Geometry>(&self) -> SpatialResult<RTree<V, G>> {
        Ok(RTree::with_config(self.build_config()?))
    }

    /// Creates a packed tree holding `entries`.
    pub fn bulk_load<V, G, I>(&self, entries: I) -> SpatialResult<RTree<V, G>>
    where
        G: Geometry,
        I: IntoIterator<Item = Entry<V, G>>,
    {
        let config = self.build_config()?;
        Ok(crate::bulk_load::bulk_load(entries.into_iter().collect(), config))
    }
}

impl Default for RTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_defaults() {
        let config = RTreeConfig::default();
        assert_eq!(config.max_children(), 4);
        assert_eq!(config.min_children(), 2);
        assert_eq!(config.splitter(), SplitterKind::Quadratic);
        assert_eq!(config.loading_factor(), 0.7);
        assert_eq!(RTreeBuilder::new().build_config().unwrap(), config);
    }

    #[test]
    fn test_default_min_children() {
        assert_eq!(RTreeConfig::default_min_children(4), 2);
        assert_eq!(RTreeConfig::default_min_children(5), 2);
        assert_eq!(RTreeConfig::default_min_children(10), 4);
        assert_eq!(RTreeConfig::default_min_children(32), 13);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let invalid = [
            RTreeConfig::new(3, 1, SplitterKind::Quadratic, 0.7),
            RTreeConfig::new(8, 0, SplitterKind::Quadratic, 0.7),
            RTreeConfig::new(8, 5, SplitterKind::Quadratic, 0.7),
            RTreeConfig::new(8, 3, SplitterKind::Quadratic, 0.0),
            RTreeConfig::new(8, 3, SplitterKind::Quadratic, 1.5),
            RTreeConfig::new(8, 3, SplitterKind::Quadratic, f64::NAN),
        ];
        for result in invalid {
            assert!(matches!(result, Err(SpatialError::InvalidConfiguration(_))));
        }
        assert!(RTreeConfig::new(8, 4, SplitterKind::Linear, 1.0).is_ok());
    }

    #[test]
    fn test_builder_reports_first_error() {
        let result = RTreeBuilder::new()
            .splitter_name("bogus")
            .splitter_name("also-bogus")
            .create::<u32, Point>();
        match result {
            Err(SpatialError::InvalidConfiguration(msg)) => assert!(msg.contains("bogus")),
            other => panic!("unexpected result: {:?}", other.map(|t| t.size())),
        }
    }

    #[test]
    fn test_builder_validates_on_create() {
        assert!(RTree::<u32, Point>::builder().max_children(2).create::<u32, Point>().is_err());
        assert!(RTreeBuilder::new().min_children(3).create::<u32, Point>().is_err());

        let tree = RTreeBuilder::new()
            .max_children(16)
            .star()
            .loading_factor(0.5)
            .create::<u32, Point>()
            .unwrap();
        assert_eq!(tree.config().max_children(), 16);
        assert_eq!(tree.config().min_children(), 6);
        assert_eq!(tree.config().splitter(), SplitterKind::RStar);
    }

    #[test]
    fn test_config_handle_is_shared() {
        let config = RTreeConfig::new(6, 2, SplitterKind::Linear, 0.9).unwrap();
        let copy = config.clone();
        assert!(Arc::ptr_eq(&config.inner, &copy.inner));
        assert_eq!(config, copy);
        assert_eq!(
            format!("{:?}", config),
            "RTreeConfig { max_children: 6, min_children: 2, splitter: Linear, loading_factor: 0.9 }"
        );
    }
}
