//! In-memory SVG document backing the vector output surface

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::collections::VecDeque;
use std::fmt;
use visioncortex::{Color, CompoundPath, PointF64};

/// Comment placed after the XML declaration of every exported document
pub const GENERATOR_COMMENT: &str = "<!-- Generator: visioncortex VTracer -->";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A single filled path element
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    /// Path data, relative to `offset`
    pub d: String,
    /// Fill color as `#rrggbb`
    pub fill: String,
    pub offset: (f64, f64),
}

impl SvgPath {
    pub fn new(d: impl Into<String>, fill: impl Into<String>, offset: (f64, f64)) -> Self {
        Self {
            d: d.into(),
            fill: fill.into(),
            offset,
        }
    }

    /// Render a traced compound path
    pub fn from_compound(path: &CompoundPath, color: &Color, precision: Option<u32>) -> Self {
        let (d, offset) = path.to_svg_string(true, PointF64::default(), precision);
        Self::new(d, color.to_hex_string(), (offset.x, offset.y))
    }
}

impl fmt::Display for SvgPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            r#"<path d="{}" transform="translate({},{})" style="fill: {};"/>"#,
            escape(&self.d),
            self.offset.0,
            self.offset.1,
            escape(&self.fill)
        )
    }
}

/// The document the engines draw into.
///
/// Paths are prepended, so the last traced shape ends up first in document
/// order and is painted underneath everything traced before it.
#[derive(Debug, Clone, Default)]
pub struct SvgDocument {
    id: String,
    width: usize,
    height: usize,
    paths: VecDeque<SvgPath>,
}

impl SvgDocument {
    pub fn new(id: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            paths: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn prepend(&mut self, path: SvgPath) {
        self.paths.push_front(path);
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &SvgPath> {
        self.paths.iter()
    }

    /// Self-contained document: XML declaration, generator comment, `<svg>`
    pub fn export_document(&self) -> String {
        format!("{}\n{}\n{}", XML_DECLARATION, GENERATOR_COMMENT, self)
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            r#"<svg xmlns="{}" version="1.1" id="{}" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            SVG_NAMESPACE,
            escape(&self.id),
            self.width,
            self.height,
            self.width,
            self.height
        )?;

        for path in &self.paths {
            write!(f, "{}", path)?;
        }

        write!(f, "</svg>")
    }
}

/// Download name for an export made at `at`, e.g. `export-2020-10-05T142301.svg`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("export-{}.svg", at.format("%Y-%m-%dT%H%M%S"))
}
