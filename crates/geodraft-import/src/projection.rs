//! Local planar projection of geographic coordinates.
//!
//! Equirectangular small-extent approximation: degrees of
//! longitude/latitude become meters relative to a reference point. Not
//! a general geodesic projection - it is only valid over areas where
//! curvature-induced error is acceptable, which is the regime the
//! import pipeline operates in.

use crate::geojson::FeatureCollection;
use geodraft_core::geometry::Point;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_319.9;

/// Reprojects every coordinate of `collection` into a local planar
/// frame centered at `center` (longitude, latitude), returning a deep
/// copy; the input collection is left unmodified.
///
/// Longitude offsets are scaled by `cos(center.lat)` to correct for the
/// shrinking of a degree of longitude away from the equator.
pub fn project_to_local(collection: &FeatureCollection, center: Point) -> FeatureCollection {
    let lon_scale = METERS_PER_DEGREE * center.y.to_radians().cos();
    collection.map_points(&mut |point| {
        Point::new(
            (point.x - center.x) * lon_scale,
            (point.y - center.y) * METERS_PER_DEGREE,
        )
    })
}
