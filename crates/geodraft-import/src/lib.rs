//! # Geodraft Import
//!
//! This crate ingests externally authored CAD and GIS files and
//! normalizes them into the shared Geodraft geometry model, ready for
//! rendering, filtering and further computation.
//!
//! ## Core Components
//!
//! ### CAD Pipeline
//! - **Raw parsing**: the DXF group-code grammar into typed records
//! - **Normalization**: flat entities with concrete coordinates -
//!   closed rings completed, circles and arcs deterministically sampled
//! - **Aggregation**: bounding box and distinct layer set per import
//!
//! ### GIS Pipeline
//! - **Shape checking**: tolerant validation of GeoJSON documents
//! - **Coercion**: bare geometries and features into one canonical
//!   feature collection
//! - **Property scanning**: observed value kinds per property key for
//!   attribute filters
//!
//! ### Unification
//! - **Conversion**: CAD entities to geographic features
//! - **Projection**: longitude/latitude into a local planar frame
//!
//! ## Contract
//!
//! Both normalizers are total functions over their input text: they
//! never panic and never return `Err`. All failure information lands in
//! the returned result's `success`/`error` fields, so one corrupt file
//! in a batch import cannot take down the rest. The cheap `validate`
//! entry points share one [`Validation`] shape across both formats.
//!
//! Everything here is synchronous and pure - no I/O, no shared state.
//! Reading bytes and choosing a normalizer by file extension is the
//! caller's job.

pub mod cad;
pub mod convert;
pub mod dxf_parser;
pub mod error;
pub mod geojson;
pub mod projection;

pub use cad::{
    CadArc, CadCircle, CadEntity, CadEntityKind, CadImport, CadImporter, CadLine, CadPolyline,
    ARC_SEGMENTS, CIRCLE_SEGMENTS,
};
pub use convert::entities_to_features;
pub use dxf_parser::{
    DxfArc, DxfCircle, DxfEntity, DxfEntityType, DxfFile, DxfHeader, DxfLine, DxfParser,
    DxfPolyline, DxfUnit,
};
pub use error::{DxfParseError, DxfResult, GeoJsonError, GeoJsonResult, Validation};
pub use geojson::{
    extract_properties, Feature, FeatureCollection, GeoGeometry, GeoImport, GeoJsonImporter,
    PropertyKind,
};
pub use projection::{project_to_local, METERS_PER_DEGREE};
