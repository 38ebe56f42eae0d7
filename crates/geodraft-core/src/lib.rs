//! # Geodraft Core
//!
//! Shared geometry vocabulary for Geodraft. Provides the fundamental
//! value types (points, bounding boxes, layer sets) that the import
//! pipeline and downstream consumers agree on.
//!
//! Everything in this crate is a plain owned value: no interior
//! mutability, no I/O, no global state. Results built from these types
//! can be moved freely between threads.

pub mod geometry;

pub use geometry::{distinct_layers, Bounds, Point};
