//! Shapes read from a slide's shape tree.

use crate::chart::ChartData;
use crate::xml::XmlElement;
use slidekit_core::BoundingBox;

/// Content of a single slide, in shape-tree order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideContent {
    /// Text of the first title placeholder, if any.
    pub title: Option<String>,
    pub shapes: Vec<Shape>,
}

/// A visual element on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// The shape's name from its non-visual properties.
    pub name: String,
    /// Set when the shape is a placeholder.
    pub placeholder: Option<Placeholder>,
    pub bbox: BoundingBox,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn is_title(&self) -> bool {
        self.placeholder.as_ref().is_some_and(Placeholder::is_title)
    }
}

/// A `p:ph` reference: the placeholder's type and index on its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Placeholder type (`title`, `body`, ...); `body` when unspecified.
    pub kind: String,
    /// Index matching the placeholder on the slide layout; `0` when unspecified.
    pub idx: u32,
}

impl Placeholder {
    pub fn new(kind: impl Into<String>, idx: u32) -> Self {
        Self {
            kind: kind.into(),
            idx,
        }
    }

    pub(crate) fn from_element(ph: &XmlElement) -> Self {
        Self {
            kind: ph.attr("type").unwrap_or("body").to_string(),
            idx: ph.attr("idx").and_then(|i| i.parse().ok()).unwrap_or(0),
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_str(), "title" | "ctrTitle")
    }

    /// The type a master placeholder is looked up by: centered titles
    /// inherit from `title`, content-like placeholders from `body`.
    pub fn base_kind(&self) -> &str {
        match self.kind.as_str() {
            "title" | "ctrTitle" => "title",
            "dt" | "ftr" | "sldNum" | "hdr" | "sldImg" => self.kind.as_str(),
            _ => "body",
        }
    }
}

/// What a shape contains.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// A shape with a text frame.
    Text(TextFrame),
    /// A table, row-major, one string per cell.
    Table(Vec<Vec<String>>),
    /// A chart with its cached data.
    Chart(ChartData),
    /// A picture; the image bytes live in the referenced package part.
    Picture { part: String },
}

/// Paragraphs of a text frame, each a list of run texts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFrame {
    pub paragraphs: Vec<Vec<String>>,
}

impl TextFrame {
    /// All runs in reading order.
    pub fn runs(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().flatten().map(String::as_str)
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
