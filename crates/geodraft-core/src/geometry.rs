//! Geometric primitives shared across the import pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Represents a 2D point with X and Y coordinates.
///
/// No unit is enforced at this level; depending on the source the
/// components are drawing units, degrees of longitude/latitude, or
/// local planar meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box over a set of coordinates.
///
/// A collection with zero coordinates yields the degenerate box
/// `(0,0)-(0,0)`. Callers must check the owning result's `success` /
/// count fields rather than trusting bounds alone; the degenerate box is
/// a sentinel, never NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::degenerate()
    }
}

impl Bounds {
    /// The `(0,0)-(0,0)` sentinel used when there are no coordinates.
    pub fn degenerate() -> Self {
        Self {
            min: Point::new(0.0, 0.0),
            max: Point::new(0.0, 0.0),
        }
    }

    /// A box spanning exactly one point.
    pub fn at(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Component-wise min/max over every point in the iterator.
    ///
    /// Returns the degenerate box when the iterator is empty.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut bounds: Option<Bounds> = None;
        for point in points {
            match bounds.as_mut() {
                Some(b) => b.expand(point),
                None => bounds = Some(Bounds::at(point)),
            }
        }
        bounds.unwrap_or_else(Bounds::degenerate)
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// True for the `(0,0)-(0,0)` sentinel.
    pub fn is_degenerate(&self) -> bool {
        self.min == Point::new(0.0, 0.0) && self.max == Point::new(0.0, 0.0)
    }
}

/// Collects the set of distinct layer names from a sequence of
/// layer-tagged items. Insertion order is irrelevant; the set is kept
/// sorted so repeated runs produce identical output.
pub fn distinct_layers<'a, I>(layers: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    layers.into_iter().map(|name| name.to_string()).collect()
}
