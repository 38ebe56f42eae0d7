//! Conversion of normalized CAD entities into geographic features.
//!
//! Gives CAD and GIS imports one downstream representation: lines and
//! arcs become line strings, closed shapes become polygons, and the
//! entity's layer, type tag and variant fields travel along as feature
//! properties.

use crate::cad::CadEntity;
use crate::geojson::{Feature, FeatureCollection, GeoGeometry};
use serde_json::{json, Map, Value};

/// Maps entities to features. Entities with fewer than two coordinates
/// are skipped - a degenerate geometry cannot be represented.
pub fn entities_to_features(entities: &[CadEntity]) -> FeatureCollection {
    let features = entities
        .iter()
        .filter_map(|entity| {
            if entity.points().len() < 2 {
                tracing::debug!(
                    "skipping degenerate {} entity with {} coordinate(s)",
                    entity.kind().as_str(),
                    entity.points().len()
                );
                return None;
            }
            Some(Feature {
                geometry: Some(entity_geometry(entity)),
                properties: entity_properties(entity),
            })
        })
        .collect();
    FeatureCollection { features }
}

/// Closed polylines with more than three coordinates and circles become
/// polygons; everything else becomes a line string.
fn entity_geometry(entity: &CadEntity) -> GeoGeometry {
    let points = entity.points().to_vec();
    match entity {
        CadEntity::Polyline(p) | CadEntity::LwPolyline(p) if p.closed && points.len() > 3 => {
            GeoGeometry::Polygon(vec![points])
        }
        CadEntity::Circle(_) => GeoGeometry::Polygon(vec![points]),
        _ => GeoGeometry::LineString(points),
    }
}

/// Layer and type tag first, then the entity's own fields; the entity
/// fields win on a key collision.
fn entity_properties(entity: &CadEntity) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("layer".to_string(), json!(entity.layer()));
    properties.insert("entity_type".to_string(), json!(entity.kind().as_str()));

    match entity {
        CadEntity::Line(_) => {}
        CadEntity::Polyline(p) | CadEntity::LwPolyline(p) => {
            properties.insert("closed".to_string(), json!(p.closed));
        }
        CadEntity::Circle(c) => {
            properties.insert("center".to_string(), json!([c.center.x, c.center.y]));
            properties.insert("radius".to_string(), json!(c.radius));
        }
        CadEntity::Arc(a) => {
            properties.insert("center".to_string(), json!([a.center.x, a.center.y]));
            properties.insert("radius".to_string(), json!(a.radius));
            properties.insert("start_angle".to_string(), json!(a.start_angle));
            properties.insert("end_angle".to_string(), json!(a.end_angle));
        }
    }
    if let Some(color) = entity.color() {
        properties.insert("color".to_string(), json!(color));
    }
    properties
}
