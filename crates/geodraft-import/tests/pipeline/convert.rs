use geodraft_core::geometry::Point;
use geodraft_import::cad::CadImporter;
use geodraft_import::convert::entities_to_features;
use geodraft_import::geojson::GeoGeometry;
use serde_json::json;

fn dxf(entities: &str) -> String {
    format!("0\nSECTION\n2\nENTITIES\n{}0\nENDSEC\n0\nEOF", entities)
}

#[test]
fn test_single_line_round_trip() {
    let importer = CadImporter::new();
    let result = importer.normalize(&dxf("0\nLINE\n10\n1.0\n20\n2.0\n11\n3.0\n21\n4.0\n"));
    let collection = entities_to_features(&result.entities);

    assert_eq!(collection.len(), 1);
    match collection.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::LineString(points) => {
            assert_eq!(points, &[Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        }
        other => panic!("expected a line string, got {}", other.geometry_type()),
    }
}

#[test]
fn test_closed_polyline_becomes_polygon() {
    let importer = CadImporter::new();
    let result = importer.normalize(&dxf(
        "0\nLWPOLYLINE\n8\noutline\n70\n1\n10\n0.0\n20\n0.0\n10\n4.0\n20\n0.0\n10\n4.0\n20\n3.0\n",
    ));
    let collection = entities_to_features(&result.entities);

    match collection.features[0].geometry.as_ref().unwrap() {
        GeoGeometry::Polygon(rings) => {
            assert_eq!(rings.len(), 1);
            // Ring completion happened during normalization.
            assert_eq!(rings[0].len(), 4);
            assert_eq!(rings[0][0], rings[0][3]);
        }
        other => panic!("expected a polygon, got {}", other.geometry_type()),
    }
    assert_eq!(collection.features[0].properties["closed"], json!(true));
}

#[test]
fn test_circle_becomes_polygon_with_analytic_properties() {
    let importer = CadImporter::new();
    let result = importer.normalize(&dxf("0\nCIRCLE\n8\nholes\n62\n3\n10\n2.0\n20\n2.0\n40\n0.5\n"));
    let collection = entities_to_features(&result.entities);

    let feature = &collection.features[0];
    assert!(matches!(feature.geometry, Some(GeoGeometry::Polygon(_))));
    assert_eq!(feature.properties["layer"], json!("holes"));
    assert_eq!(feature.properties["entity_type"], json!("circle"));
    assert_eq!(feature.properties["center"], json!([2.0, 2.0]));
    assert_eq!(feature.properties["radius"], json!(0.5));
    assert_eq!(feature.properties["color"], json!(3));
}

#[test]
fn test_arc_becomes_linestring_with_angles() {
    let importer = CadImporter::new();
    let result = importer.normalize(&dxf(
        "0\nARC\n8\ncurves\n10\n0.0\n20\n0.0\n40\n2.0\n50\n0.0\n51\n90.0\n",
    ));
    let collection = entities_to_features(&result.entities);

    let feature = &collection.features[0];
    assert!(matches!(feature.geometry, Some(GeoGeometry::LineString(_))));
    assert_eq!(feature.properties["entity_type"], json!("arc"));
    assert_eq!(feature.properties["start_angle"], json!(0.0));
    assert_eq!(feature.properties["end_angle"], json!(90.0));
}

#[test]
fn test_mixed_drawing_feature_count() {
    let importer = CadImporter::new();
    let result = importer.normalize(&dxf(concat!(
        "0\nLINE\n10\n0.0\n20\n0.0\n11\n1.0\n21\n1.0\n",
        "0\nCIRCLE\n10\n0.0\n20\n0.0\n40\n1.0\n",
        "0\nARC\n10\n0.0\n20\n0.0\n40\n1.0\n50\n10.0\n51\n80.0\n",
    )));
    let collection = entities_to_features(&result.entities);
    assert_eq!(collection.len(), 3);
}
