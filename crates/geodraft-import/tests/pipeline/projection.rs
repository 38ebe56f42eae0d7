use geodraft_core::geometry::Point;
use geodraft_import::geojson::{GeoGeometry, GeoJsonImporter};
use geodraft_import::projection::{project_to_local, METERS_PER_DEGREE};
use serde_json::json;

fn normalize(content: &str) -> geodraft_import::geojson::FeatureCollection {
    let result = GeoJsonImporter::new().normalize(content);
    assert!(result.success);
    result.collection
}

#[test]
fn test_center_coordinate_maps_to_origin() {
    let collection = normalize(
        &json!({"type": "Point", "coordinates": [4.9041, 52.3676]}).to_string(),
    );
    let projected = project_to_local(&collection, Point::new(4.9041, 52.3676));
    match projected.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::Point(p) => {
            assert!(p.x.abs() < 1e-9);
            assert!(p.y.abs() < 1e-9);
        }
        other => panic!("expected a point, got {}", other.geometry_type()),
    }
}

#[test]
fn test_longitude_shrinks_with_latitude() {
    let collection = normalize(
        &json!({"type": "Point", "coordinates": [1.0, 60.0]}).to_string(),
    );
    let projected = project_to_local(&collection, Point::new(0.0, 60.0));
    match projected.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::Point(p) => {
            let expected = METERS_PER_DEGREE * 60.0f64.to_radians().cos();
            assert!((p.x - expected).abs() < 1e-6);
            assert!(p.y.abs() < 1e-9);
        }
        other => panic!("expected a point, got {}", other.geometry_type()),
    }
}

#[test]
fn test_projection_recurses_through_polygon_rings() {
    let collection = normalize(
        &json!({
            "type": "Polygon",
            "coordinates": [[[10.0, 50.0], [10.1, 50.0], [10.1, 50.1], [10.0, 50.0]]],
        })
        .to_string(),
    );
    let projected = project_to_local(&collection, Point::new(10.0, 50.0));
    match projected.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::Polygon(rings) => {
            assert_eq!(rings[0][0], Point::new(0.0, 0.0));
            // 0.1 degree of latitude north of the reference.
            assert!((rings[0][2].y - METERS_PER_DEGREE * 0.1).abs() < 1e-6);
        }
        other => panic!("expected a polygon, got {}", other.geometry_type()),
    }
}

#[test]
fn test_projection_recurses_through_geometry_collection() {
    let collection = normalize(
        &json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [5.0, 45.0]},
                {"type": "MultiLineString", "coordinates": [[[5.0, 45.0], [5.0, 45.1]]]},
            ],
        })
        .to_string(),
    );
    let projected = project_to_local(&collection, Point::new(5.0, 45.0));
    match projected.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::GeometryCollection(members) => {
            assert_eq!(members[0], GeoGeometry::Point(Point::new(0.0, 0.0)));
            match &members[1] {
                GeoGeometry::MultiLineString(lines) => {
                    assert!((lines[0][1].y - METERS_PER_DEGREE * 0.1).abs() < 1e-6);
                }
                other => panic!("expected a multi line string, got {}", other.geometry_type()),
            }
        }
        other => panic!("expected a collection, got {}", other.geometry_type()),
    }
}

#[test]
fn test_properties_survive_projection() {
    let collection = normalize(
        &json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [3.0, 47.0]},
            "properties": {"name": "survey-1", "height": 12.5},
        })
        .to_string(),
    );
    let projected = project_to_local(&collection, Point::new(3.0, 47.0));
    assert_eq!(projected.features[0].properties["name"], json!("survey-1"));
    assert_eq!(projected.features[0].properties["height"], json!(12.5));
}
