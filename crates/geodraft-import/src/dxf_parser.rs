//! Raw DXF (Drawing Exchange Format) parsing.
//!
//! Reads the ASCII group-code/value pair grammar into typed entity
//! records. Only the primitive types the normalization pipeline
//! understands are materialized (LINE, CIRCLE, ARC, LWPOLYLINE,
//! POLYLINE); every other record is skipped and counted. Curved
//! primitives stay in their analytic form here - sampling into point
//! sequences happens in the [`crate::cad`] normalizer.
//!
//! Structural breakage (a value line missing, a non-integer group code,
//! a section without its terminator) aborts the parse with a
//! [`DxfParseError`]. A single record that is merely incomplete is
//! dropped without aborting the rest of the document.

use crate::error::{DxfParseError, DxfResult};
use geodraft_core::geometry::{distinct_layers, Bounds, Point};

/// Drawing units declared by the `$INSUNITS` header variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxfUnit {
    /// No unit information in the file.
    Unitless,
    Inches,
    Feet,
    Millimeters,
    Centimeters,
    Meters,
}

impl DxfUnit {
    /// Maps the `$INSUNITS` integer code to a unit.
    ///
    /// Unknown codes fall back to `Unitless` rather than failing the
    /// parse; units are advisory metadata.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Inches,
            2 => Self::Feet,
            4 => Self::Millimeters,
            5 => Self::Centimeters,
            6 => Self::Meters,
            _ => Self::Unitless,
        }
    }

    /// Multiplier converting one of this unit into millimeters.
    pub fn to_mm_factor(&self) -> f64 {
        match self {
            Self::Unitless => 1.0,
            Self::Inches => 25.4,
            Self::Feet => 304.8,
            Self::Millimeters => 1.0,
            Self::Centimeters => 10.0,
            Self::Meters => 1000.0,
        }
    }
}

/// Header variables extracted from the `HEADER` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfHeader {
    /// `$ACADVER` version string.
    pub version: String,
    /// `$INSUNITS` drawing units.
    pub unit: DxfUnit,
}

impl Default for DxfHeader {
    fn default() -> Self {
        Self {
            version: "AC1021".to_string(),
            unit: DxfUnit::Millimeters,
        }
    }
}

/// A LINE record: two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfLine {
    pub start: Point,
    pub end: Point,
    pub layer: String,
    pub color: Option<i32>,
}

/// A CIRCLE record in analytic form.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfCircle {
    pub center: Point,
    pub radius: f64,
    pub layer: String,
    pub color: Option<i32>,
}

/// An ARC record. Angles are degrees, counter-clockwise from east,
/// exactly as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub layer: String,
    pub color: Option<i32>,
}

/// Vertex list shared by LWPOLYLINE and POLYLINE records.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfPolyline {
    pub vertices: Vec<Point>,
    pub closed: bool,
    pub layer: String,
    pub color: Option<i32>,
}

/// Discriminant for [`DxfEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxfEntityType {
    Line,
    Circle,
    Arc,
    Polyline,
    LwPolyline,
}

/// One supported record from the ENTITIES section.
#[derive(Debug, Clone, PartialEq)]
pub enum DxfEntity {
    Line(DxfLine),
    Circle(DxfCircle),
    Arc(DxfArc),
    Polyline(DxfPolyline),
    LwPolyline(DxfPolyline),
}

impl DxfEntity {
    pub fn entity_type(&self) -> DxfEntityType {
        match self {
            DxfEntity::Line(_) => DxfEntityType::Line,
            DxfEntity::Circle(_) => DxfEntityType::Circle,
            DxfEntity::Arc(_) => DxfEntityType::Arc,
            DxfEntity::Polyline(_) => DxfEntityType::Polyline,
            DxfEntity::LwPolyline(_) => DxfEntityType::LwPolyline,
        }
    }

    pub fn layer(&self) -> &str {
        match self {
            DxfEntity::Line(e) => &e.layer,
            DxfEntity::Circle(e) => &e.layer,
            DxfEntity::Arc(e) => &e.layer,
            DxfEntity::Polyline(e) | DxfEntity::LwPolyline(e) => &e.layer,
        }
    }

    /// Uniformly scales every coordinate (and radius) of the record.
    fn scale(&mut self, factor: f64) {
        let scale_point = |p: &mut Point| {
            p.x *= factor;
            p.y *= factor;
        };
        match self {
            DxfEntity::Line(e) => {
                scale_point(&mut e.start);
                scale_point(&mut e.end);
            }
            DxfEntity::Circle(e) => {
                scale_point(&mut e.center);
                e.radius *= factor;
            }
            DxfEntity::Arc(e) => {
                scale_point(&mut e.center);
                e.radius *= factor;
            }
            DxfEntity::Polyline(e) | DxfEntity::LwPolyline(e) => {
                for v in &mut e.vertices {
                    scale_point(v);
                }
            }
        }
    }

    /// Extent of the record. Arcs use the full circle extent, which is
    /// conservative; the normalizer computes exact bounds from sampled
    /// coordinates.
    fn extent(&self) -> Option<Bounds> {
        match self {
            DxfEntity::Line(e) => Some(Bounds::from_points([e.start, e.end])),
            DxfEntity::Circle(e) => Some(Bounds::from_points([
                Point::new(e.center.x - e.radius, e.center.y - e.radius),
                Point::new(e.center.x + e.radius, e.center.y + e.radius),
            ])),
            DxfEntity::Arc(e) => Some(Bounds::from_points([
                Point::new(e.center.x - e.radius, e.center.y - e.radius),
                Point::new(e.center.x + e.radius, e.center.y + e.radius),
            ])),
            DxfEntity::Polyline(e) | DxfEntity::LwPolyline(e) => {
                if e.vertices.is_empty() {
                    None
                } else {
                    Some(Bounds::from_points(e.vertices.iter().copied()))
                }
            }
        }
    }
}

/// A parsed drawing: header variables plus the supported entity records.
#[derive(Debug, Clone, Default)]
pub struct DxfFile {
    pub header: DxfHeader,
    pub entities: Vec<DxfEntity>,
    /// Records dropped because their type has no rule or their fields
    /// were incomplete.
    pub skipped: usize,
}

impl DxfFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: DxfEntity) {
        self.entities.push(entity);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Distinct layer names in sorted order.
    pub fn layer_names(&self) -> Vec<String> {
        distinct_layers(self.entities.iter().map(|e| e.layer()))
            .into_iter()
            .collect()
    }

    /// Uniformly scales the whole drawing.
    pub fn scale(&mut self, factor: f64) {
        for entity in &mut self.entities {
            entity.scale(factor);
        }
    }

    /// Rescales the drawing from one unit system to another.
    pub fn convert_units(&mut self, from: DxfUnit, to: DxfUnit) {
        let factor = from.to_mm_factor() / to.to_mm_factor();
        self.scale(factor);
    }

    /// Extent of all records, with circles and arcs taken at their full
    /// circle extent. Empty drawings yield the `(0,0)-(0,0)` box.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut bounds: Option<Bounds> = None;
        for entity in &self.entities {
            if let Some(extent) = entity.extent() {
                bounds = Some(match bounds {
                    Some(b) => b.union(&extent),
                    None => extent,
                });
            }
        }
        let bounds = bounds.unwrap_or_else(Bounds::degenerate);
        (bounds.min, bounds.max)
    }
}

/// Pull-based reader over the alternating group-code/value line pairs.
struct CodePairs<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: Option<(i32, &'a str)>,
}

impl<'a> CodePairs<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            pending: None,
        }
    }

    fn next_pair(&mut self) -> DxfResult<Option<(i32, &'a str)>> {
        if let Some(pair) = self.pending.take() {
            return Ok(Some(pair));
        }
        // Group codes are right-justified in fixed columns; blank lines
        // before one are tolerated, a blank line in place of one is EOF
        // only when nothing follows.
        let (line_no, code_text) = loop {
            match self.lines.next() {
                Some((_, raw)) if raw.trim().is_empty() => continue,
                Some((idx, raw)) => break (idx + 1, raw.trim()),
                None => return Ok(None),
            }
        };
        let code = code_text
            .parse::<i32>()
            .map_err(|_| DxfParseError::InvalidGroupCode {
                line: line_no,
                value: code_text.to_string(),
            })?;
        let value = match self.lines.next() {
            Some((_, raw)) => raw.trim(),
            None => {
                return Err(DxfParseError::MissingValue {
                    code,
                    line: line_no,
                })
            }
        };
        Ok(Some((code, value)))
    }

    fn put_back(&mut self, pair: (i32, &'a str)) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(pair);
    }
}

/// Accumulates one entity record's fields until the next group 0.
#[derive(Default)]
struct RecordFields {
    layer: Option<String>,
    color: Option<i32>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    end_x: Option<f64>,
    end_y: Option<f64>,
    radius: Option<f64>,
    start_angle: Option<f64>,
    end_angle: Option<f64>,
    flags: i32,
    malformed: bool,
}

impl RecordFields {
    fn closed(&self) -> bool {
        self.flags & 0x01 == 0x01
    }

    /// Layer field, or `"default"` when absent or empty.
    fn layer_name(&self) -> String {
        match self.layer.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "default".to_string(),
        }
    }

    fn apply(&mut self, code: i32, value: &str) {
        match code {
            8 => self.layer = Some(value.to_string()),
            62 => match value.parse::<i32>() {
                Ok(color) => self.color = Some(color),
                Err(_) => self.malformed = true,
            },
            10 => self.push_f64(value, |f, v| f.xs.push(v)),
            20 => self.push_f64(value, |f, v| f.ys.push(v)),
            11 => self.push_f64(value, |f, v| f.end_x = Some(v)),
            21 => self.push_f64(value, |f, v| f.end_y = Some(v)),
            40 => self.push_f64(value, |f, v| f.radius = Some(v)),
            50 => self.push_f64(value, |f, v| f.start_angle = Some(v)),
            51 => self.push_f64(value, |f, v| f.end_angle = Some(v)),
            70 => match value.parse::<i32>() {
                Ok(flags) => self.flags = flags,
                Err(_) => self.malformed = true,
            },
            // Z components and the long tail of styling codes carry
            // nothing the planar model uses.
            _ => {}
        }
    }

    fn push_f64(&mut self, value: &str, store: impl FnOnce(&mut Self, f64)) {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => store(self, v),
            _ => self.malformed = true,
        }
    }

    /// First (x, y) coordinate pair, when both halves arrived.
    fn point(&self, index: usize) -> Option<Point> {
        match (self.xs.get(index), self.ys.get(index)) {
            (Some(&x), Some(&y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// All paired vertices, or `None` when the 10/20 counts disagree.
    fn vertices(&self) -> Option<Vec<Point>> {
        if self.xs.len() != self.ys.len() {
            return None;
        }
        Some(
            self.xs
                .iter()
                .zip(self.ys.iter())
                .map(|(&x, &y)| Point::new(x, y))
                .collect(),
        )
    }
}

/// Parser for ASCII DXF documents.
pub struct DxfParser;

impl DxfParser {
    /// Parses `content` into a [`DxfFile`].
    ///
    /// Structural breakage returns an error; incomplete or unsupported
    /// records are dropped and counted in [`DxfFile::skipped`]. A
    /// document with no ENTITIES section parses to an empty file.
    pub fn parse(content: &str) -> DxfResult<DxfFile> {
        let mut pairs = CodePairs::new(content);
        let mut file = DxfFile::new();

        while let Some((code, value)) = pairs.next_pair()? {
            if code != 0 {
                return Err(DxfParseError::MalformedStructure {
                    reason: format!("expected group 0 at top level, found group {}", code),
                });
            }
            match value {
                "SECTION" => {
                    let (name_code, name) =
                        pairs
                            .next_pair()?
                            .ok_or(DxfParseError::UnexpectedEof {
                                context: "SECTION header",
                            })?;
                    if name_code != 2 {
                        return Err(DxfParseError::MalformedStructure {
                            reason: format!(
                                "SECTION name must use group 2, found group {}",
                                name_code
                            ),
                        });
                    }
                    match name {
                        "HEADER" => Self::parse_header(&mut pairs, &mut file.header)?,
                        "ENTITIES" => Self::parse_entities(&mut pairs, &mut file)?,
                        _ => Self::skip_section(&mut pairs)?,
                    }
                }
                "EOF" => break,
                other => {
                    return Err(DxfParseError::MalformedStructure {
                        reason: format!("expected SECTION or EOF, found '{}'", other),
                    });
                }
            }
        }

        Ok(file)
    }

    /// Cheap check that `content` carries the drawing-exchange skeleton,
    /// without building any records.
    pub fn validate_header(content: &str) -> DxfResult<()> {
        let has_section = content.lines().any(|line| line.trim() == "SECTION");
        if has_section {
            Ok(())
        } else {
            Err(DxfParseError::NotDxf {
                reason: "no SECTION marker found".to_string(),
            })
        }
    }

    fn parse_header(pairs: &mut CodePairs<'_>, header: &mut DxfHeader) -> DxfResult<()> {
        let mut current: Option<String> = None;
        loop {
            let (code, value) = pairs.next_pair()?.ok_or(DxfParseError::UnexpectedEof {
                context: "HEADER section",
            })?;
            match (code, value) {
                (0, "ENDSEC") => break,
                (9, name) => current = Some(name.to_string()),
                (1, v) if current.as_deref() == Some("$ACADVER") => {
                    header.version = v.to_string();
                }
                (70, v) if current.as_deref() == Some("$INSUNITS") => {
                    if let Ok(unit_code) = v.parse::<i32>() {
                        header.unit = DxfUnit::from_code(unit_code);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn skip_section(pairs: &mut CodePairs<'_>) -> DxfResult<()> {
        loop {
            match pairs.next_pair()? {
                Some((0, "ENDSEC")) => return Ok(()),
                Some(_) => continue,
                None => {
                    return Err(DxfParseError::UnexpectedEof {
                        context: "SECTION body",
                    })
                }
            }
        }
    }

    fn parse_entities(pairs: &mut CodePairs<'_>, file: &mut DxfFile) -> DxfResult<()> {
        loop {
            let (code, value) = pairs.next_pair()?.ok_or(DxfParseError::UnexpectedEof {
                context: "ENTITIES section",
            })?;
            if code != 0 {
                return Err(DxfParseError::MalformedStructure {
                    reason: format!("expected an entity marker, found group {}", code),
                });
            }
            match value {
                "ENDSEC" => return Ok(()),
                "LINE" => Self::finish_record(file, Self::parse_line(pairs)?, "LINE"),
                "CIRCLE" => Self::finish_record(file, Self::parse_circle(pairs)?, "CIRCLE"),
                "ARC" => Self::finish_record(file, Self::parse_arc(pairs)?, "ARC"),
                "LWPOLYLINE" => {
                    Self::finish_record(file, Self::parse_lwpolyline(pairs)?, "LWPOLYLINE")
                }
                "POLYLINE" => Self::finish_record(file, Self::parse_polyline(pairs)?, "POLYLINE"),
                // Stray sequence terminator outside a POLYLINE.
                "SEQEND" => Self::skip_record(pairs)?,
                other => {
                    tracing::debug!("skipping unsupported DXF entity {}", other);
                    file.skipped += 1;
                    Self::skip_record(pairs)?;
                }
            }
        }
    }

    fn finish_record(file: &mut DxfFile, record: Option<DxfEntity>, kind: &str) {
        match record {
            Some(entity) => file.add_entity(entity),
            None => {
                tracing::debug!("dropping incomplete {} record", kind);
                file.skipped += 1;
            }
        }
    }

    /// Consumes field pairs until the next group 0, which is put back.
    fn collect_record(pairs: &mut CodePairs<'_>) -> DxfResult<RecordFields> {
        let mut fields = RecordFields::default();
        loop {
            match pairs.next_pair()? {
                Some((0, value)) => {
                    pairs.put_back((0, value));
                    return Ok(fields);
                }
                Some((code, value)) => fields.apply(code, value),
                None => return Ok(fields),
            }
        }
    }

    fn skip_record(pairs: &mut CodePairs<'_>) -> DxfResult<()> {
        Self::collect_record(pairs).map(|_| ())
    }

    fn parse_line(pairs: &mut CodePairs<'_>) -> DxfResult<Option<DxfEntity>> {
        let fields = Self::collect_record(pairs)?;
        if fields.malformed {
            return Ok(None);
        }
        let start = fields.point(0);
        let end = match (fields.end_x, fields.end_y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        };
        Ok(match (start, end) {
            (Some(start), Some(end)) => Some(DxfEntity::Line(DxfLine {
                start,
                end,
                layer: fields.layer_name(),
                color: fields.color,
            })),
            _ => None,
        })
    }

    fn parse_circle(pairs: &mut CodePairs<'_>) -> DxfResult<Option<DxfEntity>> {
        let fields = Self::collect_record(pairs)?;
        if fields.malformed {
            return Ok(None);
        }
        Ok(match (fields.point(0), fields.radius) {
            (Some(center), Some(radius)) => Some(DxfEntity::Circle(DxfCircle {
                center,
                radius,
                layer: fields.layer_name(),
                color: fields.color,
            })),
            _ => None,
        })
    }

    fn parse_arc(pairs: &mut CodePairs<'_>) -> DxfResult<Option<DxfEntity>> {
        let fields = Self::collect_record(pairs)?;
        if fields.malformed {
            return Ok(None);
        }
        Ok(
            match (
                fields.point(0),
                fields.radius,
                fields.start_angle,
                fields.end_angle,
            ) {
                (Some(center), Some(radius), Some(start_angle), Some(end_angle)) => {
                    Some(DxfEntity::Arc(DxfArc {
                        center,
                        radius,
                        start_angle,
                        end_angle,
                        layer: fields.layer_name(),
                        color: fields.color,
                    }))
                }
                _ => None,
            },
        )
    }

    fn parse_lwpolyline(pairs: &mut CodePairs<'_>) -> DxfResult<Option<DxfEntity>> {
        let fields = Self::collect_record(pairs)?;
        if fields.malformed {
            return Ok(None);
        }
        let vertices = match fields.vertices() {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(None),
        };
        Ok(Some(DxfEntity::LwPolyline(DxfPolyline {
            vertices,
            closed: fields.closed(),
            layer: fields.layer_name(),
            color: fields.color,
        })))
    }

    /// Heavy POLYLINE: a header record followed by VERTEX records and a
    /// SEQEND terminator.
    fn parse_polyline(pairs: &mut CodePairs<'_>) -> DxfResult<Option<DxfEntity>> {
        let header = Self::collect_record(pairs)?;
        let mut vertices: Vec<Point> = Vec::new();
        let mut malformed = header.malformed;

        loop {
            match pairs.next_pair()? {
                Some((0, "VERTEX")) => {
                    let vertex = Self::collect_record(pairs)?;
                    match vertex.point(0) {
                        Some(point) if !vertex.malformed => vertices.push(point),
                        _ => malformed = true,
                    }
                }
                Some((0, "SEQEND")) => {
                    Self::skip_record(pairs)?;
                    break;
                }
                Some((0, value)) => {
                    // Missing SEQEND; let the caller see the next marker.
                    pairs.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }

        if malformed || vertices.is_empty() {
            return Ok(None);
        }
        Ok(Some(DxfEntity::Polyline(DxfPolyline {
            vertices,
            closed: header.closed(),
            layer: header.layer_name(),
            color: header.color,
        })))
    }
}
