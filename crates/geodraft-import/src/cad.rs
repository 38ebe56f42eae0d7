//! CAD entity normalization.
//!
//! Turns raw DXF records into flat entities whose geometry is a
//! concrete coordinate sequence: closed polylines get their first
//! vertex duplicated at the end, circles and arcs are sampled with a
//! fixed step count so two runs over the same drawing produce identical
//! output. The entry point is fail-soft - one corrupt file must not
//! crash a batch import, so parse failures come back as a result with
//! `success == false` instead of an error.

use crate::dxf_parser::{DxfEntity, DxfParser, DxfPolyline};
use crate::error::Validation;
use geodraft_core::geometry::{distinct_layers, Bounds, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::TAU;

/// Angular steps used to approximate a full circle. The closing point
/// repeats the first, so a sampled circle has `CIRCLE_SEGMENTS + 1`
/// coordinates. Fixed counts are a determinism contract.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Angular steps used to approximate an arc (`ARC_SEGMENTS + 1`
/// coordinates, endpoints included).
pub const ARC_SEGMENTS: usize = 16;

/// A line segment: exactly two coordinates, start then end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadLine {
    pub points: Vec<Point>,
    pub layer: String,
    pub color: Option<i32>,
}

/// A vertex chain. When `closed` the first coordinate is duplicated as
/// the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadPolyline {
    pub points: Vec<Point>,
    pub closed: bool,
    pub layer: String,
    pub color: Option<i32>,
}

/// A circle, kept analytically and as its sampled closed ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadCircle {
    pub points: Vec<Point>,
    pub center: Point,
    pub radius: f64,
    pub layer: String,
    pub color: Option<i32>,
}

/// An arc, kept analytically (angles in degrees) and as its sampled
/// open polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadArc {
    pub points: Vec<Point>,
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub layer: String,
    pub color: Option<i32>,
}

/// Discriminant for [`CadEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CadEntityKind {
    Line,
    Polyline,
    LwPolyline,
    Circle,
    Arc,
}

impl CadEntityKind {
    /// Lowercase tag used in feature properties.
    pub fn as_str(&self) -> &'static str {
        match self {
            CadEntityKind::Line => "line",
            CadEntityKind::Polyline => "polyline",
            CadEntityKind::LwPolyline => "lwpolyline",
            CadEntityKind::Circle => "circle",
            CadEntityKind::Arc => "arc",
        }
    }
}

/// One normalized CAD primitive. Created once per source record and
/// immutable afterwards; owned exclusively by the [`CadImport`] that
/// contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CadEntity {
    Line(CadLine),
    Polyline(CadPolyline),
    LwPolyline(CadPolyline),
    Circle(CadCircle),
    Arc(CadArc),
}

impl CadEntity {
    pub fn kind(&self) -> CadEntityKind {
        match self {
            CadEntity::Line(_) => CadEntityKind::Line,
            CadEntity::Polyline(_) => CadEntityKind::Polyline,
            CadEntity::LwPolyline(_) => CadEntityKind::LwPolyline,
            CadEntity::Circle(_) => CadEntityKind::Circle,
            CadEntity::Arc(_) => CadEntityKind::Arc,
        }
    }

    /// The concrete coordinate sequence (always at least one point).
    pub fn points(&self) -> &[Point] {
        match self {
            CadEntity::Line(e) => &e.points,
            CadEntity::Polyline(e) | CadEntity::LwPolyline(e) => &e.points,
            CadEntity::Circle(e) => &e.points,
            CadEntity::Arc(e) => &e.points,
        }
    }

    pub fn layer(&self) -> &str {
        match self {
            CadEntity::Line(e) => &e.layer,
            CadEntity::Polyline(e) | CadEntity::LwPolyline(e) => &e.layer,
            CadEntity::Circle(e) => &e.layer,
            CadEntity::Arc(e) => &e.layer,
        }
    }

    pub fn color(&self) -> Option<i32> {
        match self {
            CadEntity::Line(e) => e.color,
            CadEntity::Polyline(e) | CadEntity::LwPolyline(e) => e.color,
            CadEntity::Circle(e) => e.color,
            CadEntity::Arc(e) => e.color,
        }
    }

    /// True for closed polylines and circles.
    pub fn is_closed(&self) -> bool {
        match self {
            CadEntity::Polyline(e) | CadEntity::LwPolyline(e) => e.closed,
            CadEntity::Circle(_) => true,
            _ => false,
        }
    }
}

/// Result of normalizing one CAD document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadImport {
    pub entities: Vec<CadEntity>,
    pub bounds: Bounds,
    pub layers: BTreeSet<String>,
    /// Source records dropped because their primitive type has no
    /// normalization rule or their fields were incomplete.
    pub skipped: usize,
    pub success: bool,
    pub error: Option<String>,
}

impl CadImport {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            entities: Vec::new(),
            bounds: Bounds::degenerate(),
            layers: BTreeSet::new(),
            skipped: 0,
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Normalizer for CAD drawing-exchange documents.
pub struct CadImporter {
    /// Uniform scale applied to the raw drawing before normalization.
    pub scale: f64,
}

impl Default for CadImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CadImporter {
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }

    /// Normalizes `content` into flat entities with bounds and layers.
    ///
    /// Total with respect to the caller: parse failures produce a
    /// result with `success == false` and empty collections. A document
    /// with zero entities is a success - an intentionally empty
    /// selection is valid.
    pub fn normalize(&self, content: &str) -> CadImport {
        let mut file = match DxfParser::parse(content) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!("DXF normalization failed: {}", err);
                return CadImport::failure(err.to_string());
            }
        };
        if self.scale != 1.0 {
            file.scale(self.scale);
        }

        let entities: Vec<CadEntity> = file.entities.iter().map(normalize_record).collect();
        let bounds = Bounds::from_points(
            entities
                .iter()
                .flat_map(|entity| entity.points().iter().copied()),
        );
        let layers = distinct_layers(entities.iter().map(|entity| entity.layer()));

        CadImport {
            entities,
            bounds,
            layers,
            skipped: file.skipped,
            success: true,
            error: None,
        }
    }

    /// Cheap upfront check: does the text parse and contain at least
    /// one record of a supported primitive type? Does not build the
    /// normalized result.
    pub fn validate(&self, content: &str) -> Validation {
        match DxfParser::parse(content) {
            Err(err) => Validation::fail(err.to_string()),
            Ok(file) if file.entities.is_empty() => {
                Validation::fail("contains no importable entities")
            }
            Ok(_) => Validation::ok(),
        }
    }
}

fn normalize_record(record: &DxfEntity) -> CadEntity {
    match record {
        DxfEntity::Line(line) => CadEntity::Line(CadLine {
            points: vec![line.start, line.end],
            layer: line.layer.clone(),
            color: line.color,
        }),
        DxfEntity::Polyline(poly) => CadEntity::Polyline(normalize_polyline(poly)),
        DxfEntity::LwPolyline(poly) => CadEntity::LwPolyline(normalize_polyline(poly)),
        DxfEntity::Circle(circle) => CadEntity::Circle(CadCircle {
            points: sample_circle(circle.center, circle.radius),
            center: circle.center,
            radius: circle.radius,
            layer: circle.layer.clone(),
            color: circle.color,
        }),
        DxfEntity::Arc(arc) => CadEntity::Arc(CadArc {
            points: sample_arc(arc.center, arc.radius, arc.start_angle, arc.end_angle),
            center: arc.center,
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
            layer: arc.layer.clone(),
            color: arc.color,
        }),
    }
}

fn normalize_polyline(poly: &DxfPolyline) -> CadPolyline {
    let mut points = poly.vertices.clone();
    if poly.closed {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    CadPolyline {
        points,
        closed: poly.closed,
        layer: poly.layer.clone(),
        color: poly.color,
    }
}

/// Closed ring of `CIRCLE_SEGMENTS + 1` points; the last sample lands
/// on 2π and closes the ring.
fn sample_circle(center: Point, radius: f64) -> Vec<Point> {
    (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let theta = i as f64 * TAU / CIRCLE_SEGMENTS as f64;
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}

/// Open polyline of `ARC_SEGMENTS + 1` points from `start_deg` to
/// `end_deg`. Arc angles are counter-clockwise and may wrap past 0°;
/// when the end angle compares below the start a full turn is added so
/// the sweep always runs in the increasing direction.
fn sample_arc(center: Point, radius: f64, start_deg: f64, end_deg: f64) -> Vec<Point> {
    let start = start_deg.to_radians();
    let mut end = end_deg.to_radians();
    if end < start {
        end += TAU;
    }
    let step = (end - start) / ARC_SEGMENTS as f64;
    (0..=ARC_SEGMENTS)
        .map(|i| {
            let theta = start + i as f64 * step;
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}
