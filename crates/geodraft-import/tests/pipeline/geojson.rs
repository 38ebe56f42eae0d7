use geodraft_core::geometry::Point;
use geodraft_import::geojson::{extract_properties, GeoGeometry, GeoJsonImporter, PropertyKind};
use serde_json::json;

#[test]
fn test_malformed_json_fails_soft() {
    let importer = GeoJsonImporter::new();
    let result = importer.normalize("{not json");
    assert!(!result.success);
    assert!(result.error.as_deref().is_some_and(|m| !m.is_empty()));
    assert_eq!(result.feature_count, 0);
    assert!(result.bounds.is_degenerate());
}

#[test]
fn test_feature_collection_passes_through() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [4.0, 52.0]},
                "properties": {"name": "station"},
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 2.0]]},
                "properties": {},
            },
        ],
    })
    .to_string();

    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 2);
    assert_eq!(result.bounds.min, Point::new(0.0, 0.0));
    assert_eq!(result.bounds.max, Point::new(4.0, 52.0));
}

#[test]
fn test_empty_collection_is_success_but_invalid() {
    let importer = GeoJsonImporter::new();
    let content = json!({"type": "FeatureCollection", "features": []}).to_string();

    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 0);
    assert!(result.bounds.is_degenerate());

    let validation = importer.validate(&content);
    assert!(!validation.valid);
    assert_eq!(
        validation.message.as_deref(),
        Some("contains no importable features")
    );
}

#[test]
fn test_bare_feature_is_wrapped() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
        "properties": {"kind": "tree"},
    })
    .to_string();

    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 1);
    assert_eq!(
        result.collection.features[0].geometry,
        Some(GeoGeometry::Point(Point::new(1.0, 2.0)))
    );
}

#[test]
fn test_bare_geometry_is_wrapped_with_empty_properties() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "LineString",
        "coordinates": [[0.0, 0.0], [3.0, 4.0]],
    })
    .to_string();

    let result = importer.normalize(&content);
    assert_eq!(result.feature_count, 1);
    let feature = &result.collection.features[0];
    assert!(feature.properties.is_empty());
    assert!(matches!(
        feature.geometry,
        Some(GeoGeometry::LineString(_))
    ));
}

#[test]
fn test_unrecognized_document_coerces_to_empty() {
    let importer = GeoJsonImporter::new();
    let content = json!({"type": "Banana", "coordinates": []}).to_string();

    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 0);

    let validation = importer.validate(&content);
    assert!(!validation.valid);
}

#[test]
fn test_feature_without_geometry_type_is_rejected() {
    let importer = GeoJsonImporter::new();
    let content = json!({"type": "Feature", "geometry": {}}).to_string();
    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 0);
}

#[test]
fn test_malformed_member_keeps_slot_without_bounds() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                // Point coordinates at the wrong depth.
                "geometry": {"type": "Point", "coordinates": [[1.0, 2.0]]},
                "properties": {"broken": true},
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [7.0, 8.0]},
                "properties": {},
            },
        ],
    })
    .to_string();

    let result = importer.normalize(&content);
    assert!(result.success);
    assert_eq!(result.feature_count, 2);
    assert!(result.collection.features[0].geometry.is_none());
    // Bounds come from the one well-formed geometry only.
    assert_eq!(result.bounds.min, Point::new(7.0, 8.0));
    assert_eq!(result.bounds.max, Point::new(7.0, 8.0));
}

#[test]
fn test_multipolygon_bounds() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "MultiPolygon",
        "coordinates": [
            [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]],
            [[[5.0, 5.0], [6.0, 5.0], [6.0, 7.0], [5.0, 5.0]]],
        ],
    })
    .to_string();

    let result = importer.normalize(&content);
    assert_eq!(result.bounds.min, Point::new(0.0, 0.0));
    assert_eq!(result.bounds.max, Point::new(6.0, 7.0));
}

#[test]
fn test_geometry_collection_wraps_and_bounds() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "GeometryCollection",
        "geometries": [
            {"type": "Point", "coordinates": [-1.0, -2.0]},
            {"type": "MultiPoint", "coordinates": [[3.0, 1.0], [0.5, 4.0]]},
        ],
    })
    .to_string();

    let result = importer.normalize(&content);
    assert_eq!(result.feature_count, 1);
    assert_eq!(result.bounds.min, Point::new(-1.0, -2.0));
    assert_eq!(result.bounds.max, Point::new(3.0, 4.0));
}

#[test]
fn test_extract_properties_records_value_kinds() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": null, "properties": {"a": 1}},
            {"type": "Feature", "geometry": null, "properties": {"a": "x", "b": true}},
        ],
    })
    .to_string();

    let result = importer.normalize(&content);
    let properties = extract_properties(&result.collection);

    let a_kinds = properties.get("a").unwrap();
    assert_eq!(a_kinds.len(), 2);
    assert!(a_kinds.contains(&PropertyKind::Number));
    assert!(a_kinds.contains(&PropertyKind::String));

    let b_kinds = properties.get("b").unwrap();
    assert_eq!(b_kinds.len(), 1);
    assert!(b_kinds.contains(&PropertyKind::Boolean));
}

#[test]
fn test_collection_to_json_round_shape() {
    let importer = GeoJsonImporter::new();
    let content = json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [1.5, 2.5]},
        "properties": {"name": "marker"},
    })
    .to_string();

    let result = importer.normalize(&content);
    let rendered = result.collection.to_json();
    assert_eq!(rendered["type"], "FeatureCollection");
    assert_eq!(rendered["features"][0]["type"], "Feature");
    assert_eq!(
        rendered["features"][0]["geometry"]["coordinates"],
        json!([1.5, 2.5])
    );
    assert_eq!(rendered["features"][0]["properties"]["name"], "marker");
}

#[test]
fn test_top_level_array_is_not_a_document() {
    let importer = GeoJsonImporter::new();
    let result = importer.normalize("[1, 2, 3]");
    assert!(result.success);
    assert_eq!(result.feature_count, 0);
    assert!(!importer.validate("[1, 2, 3]").valid);
}
