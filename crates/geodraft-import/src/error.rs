//! Error types for the import pipeline.
//!
//! The public normalizer entry points never return these directly; they
//! catch them and fold the message into the fail-soft result structs.
//! The typed forms exist for the internal parsing layers and for callers
//! that drive the raw parser themselves.

use thiserror::Error;

/// Errors raised while reading the drawing-exchange grammar.
///
/// These cover structural breakage only. A single record that is merely
/// missing fields or carries an unsupported primitive type is skipped,
/// not raised.
#[derive(Error, Debug, Clone)]
pub enum DxfParseError {
    /// The text does not look like a drawing-exchange document at all.
    #[error("Not a DXF document: {reason}")]
    NotDxf {
        /// Why the header check rejected the text.
        reason: String,
    },

    /// A group-code line did not parse as an integer.
    #[error("Invalid group code '{value}' at line {line}")]
    InvalidGroupCode {
        /// The offending line number (1-based).
        line: usize,
        /// The raw text found where a group code was expected.
        value: String,
    },

    /// A group code was not followed by a value line.
    #[error("Group code {code} at line {line} is missing its value")]
    MissingValue {
        /// The group code that lacked a value.
        code: i32,
        /// The line number of the group code.
        line: usize,
    },

    /// A section or entity sequence ended before its terminator.
    #[error("Unexpected end of input inside {context}")]
    UnexpectedEof {
        /// What was being parsed when input ran out.
        context: &'static str,
    },

    /// A structural marker appeared where another was required.
    #[error("Malformed document structure: {reason}")]
    MalformedStructure {
        /// Description of the structural violation.
        reason: String,
    },
}

/// Result type for raw DXF parsing.
pub type DxfResult<T> = Result<T, DxfParseError>;

/// Errors raised while reading a geographic-feature document.
#[derive(Error, Debug)]
pub enum GeoJsonError {
    /// The text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parses but matches no recognized GeoJSON shape.
    #[error("Unrecognized GeoJSON document: {reason}")]
    Unrecognized {
        /// Why the shape check rejected the document.
        reason: String,
    },
}

/// Result type for GeoJSON document handling.
pub type GeoJsonResult<T> = Result<T, GeoJsonError>;

/// Outcome of the cheap upfront checks (`CadImporter::validate`,
/// `GeoJsonImporter::validate`).
///
/// Both validators share this shape and both require at least one usable
/// item, so callers can treat the two formats uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: Option<String>,
}

impl Validation {
    /// A passing check.
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// A failing check with a human-readable reason.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}
