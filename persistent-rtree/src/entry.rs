//! Index entries: an immutable pairing of a user value with its geometry.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::errors::{SpatialError, SpatialResult};
use crate::geometry::Geometry;

/// An entry in the R-Tree which has a spatial representation.
///
/// The value may be of any type (including `Option<T>` for "no value"); the
/// geometry is mandatory. Entries are immutable and cheap to clone: the
/// pair lives behind an `Arc`, so copying a leaf during path rebuilding never
/// copies user values.
///
/// Equality and hashing are structural over value and geometry.
///
/// ## Example
///
/// ```rust
/// use persistent_rtree::{Entry, Point};
///
/// let entry = Entry::new("cafe", Point::new(1.0, 2.0)).unwrap();
/// assert_eq!(*entry.value(), "cafe");
/// assert_eq!(entry.geometry().x(), 1.0);
/// ```
pub struct Entry<V, G> {
    inner: Arc<EntryInner<V, G>>,
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct EntryInner<V, G> {
    value: V,
    geometry: G,
}

impl<V, G: Geometry> Entry<V, G> {
    /// Creates a new entry.
    ///
    /// # Errors
    /// Returns `SpatialError::InvalidGeometry` if the geometry's bounding
    /// rectangle has non-finite coordinates or is inverted.
    pub fn new(value: V, geometry: G) -> SpatialResult<Self> {
        Self::validate_geometry(&geometry)?;
        Ok(Self {
            inner: Arc::new(EntryInner { value, geometry }),
        })
    }

    /// Creates a new entry from a geometry that may be absent.
    ///
    /// # Errors
    /// Returns `SpatialError::InvalidGeometry` if `geometry` is `None` or unusable.
    pub fn from_optional(value: V, geometry: Option<G>) -> SpatialResult<Self> {
        match geometry {
            Some(geometry) => Self::new(value, geometry),
            None => Err(SpatialError::InvalidGeometry(
                "an entry requires a geometry".to_string(),
            )),
        }
    }

    fn validate_geometry(geometry: &G) -> SpatialResult<()> {
        let mbr = geometry.mbr();
        if !mbr.is_valid() {
            return Err(SpatialError::InvalidGeometry(format!(
                "bounding rectangle must be finite with min <= max, got: {}",
                mbr
            )));
        }
        Ok(())
    }

    /// Returns the minimum bounding rectangle of the entry's geometry.
    pub fn mbr(&self) -> BoundingBox {
        self.inner.geometry.mbr()
    }
}

impl<V, G> Entry<V, G> {
    /// Returns the value wrapped by this entry.
    pub fn value(&self) -> &V {
        &self.inner.value
    }

    /// Returns the geometry of the value.
    pub fn geometry(&self) -> &G {
        &self.inner.geometry
    }
}

impl<V, G> Clone for Entry<V, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: PartialEq, G: PartialEq> PartialEq for Entry<V, G> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl<V: Eq, G: Eq> Eq for Entry<V, G> {}

impl<V: Hash, G: Hash> Hash for Entry<V, G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<V: fmt::Debug, G: fmt::Debug> fmt::Debug for Entry<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("value", &self.inner.value)
            .field("geometry", &self.inner.geometry)
            .finish()
    }
}

impl<V: Display, G: Display> Display for Entry<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry [value={}, geometry={}]",
            self.inner.value, self.inner.geometry
        )
    }
}

impl<V: Serialize, G: Serialize> Serialize for Entry<V, G> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de, V, G> Deserialize<'de> for Entry<V, G>
where
    V: Deserialize<'de>,
    G: Deserialize<'de> + Geometry,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let inner = EntryInner::<V, G>::deserialize(deserializer)?;
        Entry::new(inner.value, inner.geometry).map_err(serde::de::Error::custom)
    }
}
