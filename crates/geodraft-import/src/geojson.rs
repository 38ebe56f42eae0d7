//! GeoJSON feature normalization.
//!
//! Validates and coerces arbitrary geographic-feature input into a
//! canonical feature collection. The shape check is deliberately
//! shallow: a `FeatureCollection` only needs its `features` array, and
//! a malformed individual feature keeps its slot with no geometry
//! rather than failing the document. The untyped `serde_json::Value`
//! form never leaves this module - everything downstream works on the
//! typed [`GeoGeometry`] variants.

use crate::error::{GeoJsonError, GeoJsonResult, Validation};
use geodraft_core::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A geographic geometry with its coordinates at the nesting depth the
/// variant prescribes (0 for `Point` up to 3 for `MultiPolygon`;
/// collections recurse per member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeoGeometry {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
    MultiPolygon(Vec<Vec<Vec<Point>>>),
    GeometryCollection(Vec<GeoGeometry>),
}

impl GeoGeometry {
    /// The GeoJSON `type` tag for this variant.
    pub fn geometry_type(&self) -> &'static str {
        match self {
            GeoGeometry::Point(_) => "Point",
            GeoGeometry::MultiPoint(_) => "MultiPoint",
            GeoGeometry::LineString(_) => "LineString",
            GeoGeometry::MultiLineString(_) => "MultiLineString",
            GeoGeometry::Polygon(_) => "Polygon",
            GeoGeometry::MultiPolygon(_) => "MultiPolygon",
            GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Visits every position in the geometry. One routine shared by
    /// bounds and projection so the two cannot drift apart.
    pub fn for_each_point<F>(&self, f: &mut F)
    where
        F: FnMut(Point),
    {
        match self {
            GeoGeometry::Point(p) => f(*p),
            GeoGeometry::MultiPoint(line) | GeoGeometry::LineString(line) => {
                line.iter().for_each(|p| f(*p));
            }
            GeoGeometry::MultiLineString(rings) | GeoGeometry::Polygon(rings) => {
                rings.iter().flatten().for_each(|p| f(*p));
            }
            GeoGeometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().for_each(|p| f(*p));
            }
            GeoGeometry::GeometryCollection(members) => {
                members.iter().for_each(|g| g.for_each_point(f));
            }
        }
    }

    /// Rebuilds the geometry with every position transformed.
    pub fn map_points<F>(&self, f: &mut F) -> GeoGeometry
    where
        F: FnMut(Point) -> Point,
    {
        match self {
            GeoGeometry::Point(p) => GeoGeometry::Point(f(*p)),
            GeoGeometry::MultiPoint(line) => {
                GeoGeometry::MultiPoint(line.iter().map(|p| f(*p)).collect())
            }
            GeoGeometry::LineString(line) => {
                GeoGeometry::LineString(line.iter().map(|p| f(*p)).collect())
            }
            GeoGeometry::MultiLineString(lines) => GeoGeometry::MultiLineString(
                lines
                    .iter()
                    .map(|line| line.iter().map(|p| f(*p)).collect())
                    .collect(),
            ),
            GeoGeometry::Polygon(rings) => GeoGeometry::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| f(*p)).collect())
                    .collect(),
            ),
            GeoGeometry::MultiPolygon(polygons) => GeoGeometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| {
                        rings
                            .iter()
                            .map(|ring| ring.iter().map(|p| f(*p)).collect())
                            .collect()
                    })
                    .collect(),
            ),
            GeoGeometry::GeometryCollection(members) => GeoGeometry::GeometryCollection(
                members.iter().map(|g| g.map_points(f)).collect(),
            ),
        }
    }

    /// Maps an untyped geometry object into a typed variant.
    ///
    /// Returns `None` when the value is not an object with a known
    /// `type`, or when its coordinates do not sit at the nesting depth
    /// the type prescribes. Positions read their first two components;
    /// an altitude third element is ignored.
    pub fn from_json(value: &Value) -> Option<GeoGeometry> {
        let obj = value.as_object()?;
        let geometry_type = obj.get("type")?.as_str()?;
        if geometry_type == "GeometryCollection" {
            let members = obj.get("geometries")?.as_array()?;
            let parsed: Option<Vec<GeoGeometry>> =
                members.iter().map(GeoGeometry::from_json).collect();
            return Some(GeoGeometry::GeometryCollection(parsed?));
        }

        let coordinates = obj.get("coordinates")?;
        match geometry_type {
            "Point" => Some(GeoGeometry::Point(parse_position(coordinates)?)),
            "MultiPoint" => Some(GeoGeometry::MultiPoint(parse_positions(coordinates)?)),
            "LineString" => Some(GeoGeometry::LineString(parse_positions(coordinates)?)),
            "MultiLineString" => Some(GeoGeometry::MultiLineString(parse_position_lists(
                coordinates,
            )?)),
            "Polygon" => Some(GeoGeometry::Polygon(parse_position_lists(coordinates)?)),
            "MultiPolygon" => {
                let outer = coordinates.as_array()?;
                let polygons: Option<Vec<Vec<Vec<Point>>>> =
                    outer.iter().map(parse_position_lists).collect();
                Some(GeoGeometry::MultiPolygon(polygons?))
            }
            _ => None,
        }
    }

    /// Renders the geometry back to a GeoJSON-shaped value.
    pub fn to_json(&self) -> Value {
        match self {
            GeoGeometry::GeometryCollection(members) => json!({
                "type": "GeometryCollection",
                "geometries": members.iter().map(GeoGeometry::to_json).collect::<Vec<_>>(),
            }),
            _ => json!({
                "type": self.geometry_type(),
                "coordinates": self.coordinates_json(),
            }),
        }
    }

    fn coordinates_json(&self) -> Value {
        fn pos(p: &Point) -> Value {
            json!([p.x, p.y])
        }
        match self {
            GeoGeometry::Point(p) => pos(p),
            GeoGeometry::MultiPoint(line) | GeoGeometry::LineString(line) => {
                Value::Array(line.iter().map(pos).collect())
            }
            GeoGeometry::MultiLineString(rings) | GeoGeometry::Polygon(rings) => Value::Array(
                rings
                    .iter()
                    .map(|ring| Value::Array(ring.iter().map(pos).collect()))
                    .collect(),
            ),
            GeoGeometry::MultiPolygon(polygons) => Value::Array(
                polygons
                    .iter()
                    .map(|rings| {
                        Value::Array(
                            rings
                                .iter()
                                .map(|ring| Value::Array(ring.iter().map(pos).collect()))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            GeoGeometry::GeometryCollection(_) => Value::Null,
        }
    }
}

fn parse_position(value: &Value) -> Option<Point> {
    let parts = value.as_array()?;
    if parts.len() < 2 {
        return None;
    }
    let x = parts[0].as_f64()?;
    let y = parts[1].as_f64()?;
    let point = Point::new(x, y);
    point.is_finite().then_some(point)
}

fn parse_positions(value: &Value) -> Option<Vec<Point>> {
    value.as_array()?.iter().map(parse_position).collect()
}

fn parse_position_lists(value: &Value) -> Option<Vec<Vec<Point>>> {
    value.as_array()?.iter().map(parse_positions).collect()
}

/// A geographic feature: optional geometry plus a free-form property
/// bag. A feature whose geometry failed shape checking keeps its slot
/// with `geometry == None` and contributes nothing to bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Option<GeoGeometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Lenient element conversion used for feature-collection members;
    /// nothing about the element is required.
    fn from_element(value: &Value) -> Feature {
        Feature {
            geometry: value.get("geometry").and_then(GeoGeometry::from_json),
            properties: value
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry.as_ref().map(GeoGeometry::to_json).unwrap_or(Value::Null),
            "properties": Value::Object(self.properties.clone()),
        })
    }
}

/// An ordered group of features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Coordinate-wise bounding box over every geometry; degenerate
    /// when the collection holds no coordinates.
    pub fn bounds(&self) -> Bounds {
        let mut bounds: Option<Bounds> = None;
        for feature in &self.features {
            if let Some(geometry) = &feature.geometry {
                geometry.for_each_point(&mut |point| match bounds.as_mut() {
                    Some(b) => b.expand(point),
                    None => bounds = Some(Bounds::at(point)),
                });
            }
        }
        bounds.unwrap_or_else(Bounds::degenerate)
    }

    /// Rebuilds the collection with every position transformed;
    /// properties and geometry-less features pass through unchanged.
    pub fn map_points<F>(&self, f: &mut F) -> FeatureCollection
    where
        F: FnMut(Point) -> Point,
    {
        FeatureCollection {
            features: self
                .features
                .iter()
                .map(|feature| Feature {
                    geometry: feature.geometry.as_ref().map(|g| g.map_points(f)),
                    properties: feature.properties.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(Feature::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Result of normalizing one geographic-feature document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoImport {
    pub collection: FeatureCollection,
    pub bounds: Bounds,
    pub feature_count: usize,
    pub success: bool,
    pub error: Option<String>,
}

impl GeoImport {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            collection: FeatureCollection::new(),
            bounds: Bounds::degenerate(),
            feature_count: 0,
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Normalizer for geographic-feature documents.
#[derive(Debug, Default)]
pub struct GeoJsonImporter;

impl GeoJsonImporter {
    pub fn new() -> Self {
        Self
    }

    /// Normalizes `content` into a canonical feature collection.
    ///
    /// Fail-soft: invalid JSON produces `success == false`; a document
    /// that parses but matches no recognized shape coerces to an empty
    /// collection and is still a success (validation is where that case
    /// is surfaced).
    pub fn normalize(&self, content: &str) -> GeoImport {
        let collection = match canonicalize(content) {
            Ok(collection) => collection,
            Err(GeoJsonError::Unrecognized { reason }) => {
                tracing::debug!("document matched no GeoJSON shape: {}", reason);
                FeatureCollection::new()
            }
            Err(err) => {
                tracing::warn!("GeoJSON normalization failed: {}", err);
                return GeoImport::failure(err.to_string());
            }
        };
        let bounds = collection.bounds();
        let feature_count = collection.len();
        GeoImport {
            collection,
            bounds,
            feature_count,
            success: true,
            error: None,
        }
    }

    /// Cheap upfront check. Unlike [`Self::normalize`], a structurally
    /// valid but featureless document fails here - an empty geographic
    /// dataset is never useful downstream.
    pub fn validate(&self, content: &str) -> Validation {
        match canonicalize(content) {
            Err(err) => Validation::fail(err.to_string()),
            Ok(collection) if collection.is_empty() => {
                Validation::fail("contains no importable features")
            }
            Ok(_) => Validation::ok(),
        }
    }
}

/// Parses and coerces `content` into the canonical collection form.
fn canonicalize(content: &str) -> GeoJsonResult<FeatureCollection> {
    let value: Value = serde_json::from_str(content)?;
    coerce_collection(&value).ok_or_else(|| GeoJsonError::Unrecognized {
        reason: "no recognized top-level type".to_string(),
    })
}

/// Coerces any recognized top-level shape into a feature collection:
/// a bare feature is wrapped, a bare geometry is wrapped twice, a
/// collection passes through.
fn coerce_collection(value: &Value) -> Option<FeatureCollection> {
    let obj = value.as_object()?;
    let declared = obj.get("type")?.as_str()?;
    match declared {
        "FeatureCollection" => {
            let features = obj.get("features")?.as_array()?;
            Some(FeatureCollection {
                features: features.iter().map(Feature::from_element).collect(),
            })
        }
        "Feature" => {
            // A feature must carry a geometry with a type; the geometry
            // body itself may still fail the depth check.
            obj.get("geometry")?.as_object()?.get("type")?;
            Some(FeatureCollection {
                features: vec![Feature::from_element(value)],
            })
        }
        "GeometryCollection" => {
            obj.get("geometries")?.as_array()?;
            Some(wrap_bare_geometry(value))
        }
        "Point" | "LineString" | "Polygon" | "MultiPoint" | "MultiLineString" | "MultiPolygon" => {
            obj.get("coordinates")?.as_array()?;
            Some(wrap_bare_geometry(value))
        }
        _ => None,
    }
}

fn wrap_bare_geometry(value: &Value) -> FeatureCollection {
    FeatureCollection {
        features: vec![Feature {
            geometry: GeoGeometry::from_json(value),
            properties: Map::new(),
        }],
    }
}

/// Runtime kind of a property value, named the way dynamic filters
/// present them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl PropertyKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => PropertyKind::Null,
            Value::Bool(_) => PropertyKind::Boolean,
            Value::Number(_) => PropertyKind::Number,
            Value::String(_) => PropertyKind::String,
            Value::Array(_) => PropertyKind::Array,
            Value::Object(_) => PropertyKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Null => "null",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Number => "number",
            PropertyKind::String => "string",
            PropertyKind::Array => "array",
            PropertyKind::Object => "object",
        }
    }
}

/// One pass over every feature's property bag, recording the value
/// kinds observed per key. Used by callers to build attribute filters.
pub fn extract_properties(
    collection: &FeatureCollection,
) -> BTreeMap<String, BTreeSet<PropertyKind>> {
    let mut kinds: BTreeMap<String, BTreeSet<PropertyKind>> = BTreeMap::new();
    for feature in &collection.features {
        for (key, value) in &feature.properties {
            kinds
                .entry(key.clone())
                .or_default()
                .insert(PropertyKind::of(value));
        }
    }
    kinds
}
