//! Domain types for representing an extracted presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The kind of content an [`Entity`] was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A single text run.
    Text,
    /// A table, linearized as a bordered grid.
    Table,
    /// A chart's data, linearized as a bordered grid.
    Chart,
    /// Text recognized in an embedded picture.
    Image,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Text => "text",
            EntityKind::Table => "table",
            EntityKind::Chart => "chart",
            EntityKind::Image => "image",
        }
    }

    /// Tables and charts carry tabular data.
    pub fn is_tabular(&self) -> bool {
        matches!(self, EntityKind::Table | EntityKind::Chart)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundingBox {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);
        BoundingBox::new(left, top, right - left, bottom - top)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left, self.top, self.width, self.height
        )
    }
}

/// A typed content fragment on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    kind: EntityKind,
    text: String,
    bbox: BoundingBox,
}

impl Entity {
    pub fn new(kind: EntityKind, text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            kind,
            text: text.into(),
            bbox,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }
}

/// One extracted slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position of the slide in the source presentation.
    pub number: usize,

    /// Title placeholder text; empty when the slide has none.
    pub title: String,

    /// Synthesized full text of the slide.
    pub text: String,

    /// Entities in shape order.
    pub entities: Vec<Entity>,

    /// Embedding of `text`, when embedding was requested.
    pub embedding: Option<Vec<f32>>,

    /// Token count of `text`.
    pub tokens: usize,

    /// Similarity to the most recent query.
    #[serde(skip)]
    pub similarity: f32,
}

impl Slide {
    pub fn new(number: usize, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            text: text.into(),
            entities: Vec::new(),
            embedding: None,
            tokens: 0,
            similarity: 0.0,
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_tokens(mut self, tokens: usize) -> Self {
        self.tokens = tokens;
        self
    }

    /// Entities of the given kind, in shape order.
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }
}

/// How a presentation is split into retrievable units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// One unit per slide.
    #[default]
    Slide,
}

/// Options controlling a single extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub method: ExtractionMethod,

    /// Name of the OCR engine used for pictures.
    pub ocr_engine: String,

    /// Run OCR (or chart recognition) on pictures.
    pub extract_from_image: bool,

    /// Treat pictures as charts and recover their data table instead of OCR.
    pub chart_from_image: bool,

    /// Keep content in shape order instead of grouping it by kind.
    pub maintain_order: bool,

    /// Request an embedding for every slide.
    pub embed: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::Slide,
            ocr_engine: "tesseract".to_string(),
            extract_from_image: false,
            chart_from_image: false,
            maintain_order: false,
            embed: true,
        }
    }
}

/// Presentation-level properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub last_modified_by: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub slide_width: Option<i64>,
    pub slide_height: Option<i64>,
}

/// An extracted presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    path: PathBuf,
    config: ExtractionConfig,
    metadata: DocumentMetadata,
    slides: Vec<Slide>,
    total_tokens: usize,
}

impl Document {
    pub fn new(
        path: impl Into<PathBuf>,
        config: ExtractionConfig,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            path: path.into(),
            config,
            metadata,
            slides: Vec::new(),
            total_tokens: 0,
        }
    }

    /// Append a slide, adding its tokens to the running total.
    pub fn add_slide(&mut self, slide: Slide) {
        self.total_tokens += slide.tokens;
        self.slides.push(slide);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Look up a slide by its number.
    pub fn slide(&self, number: usize) -> Option<&Slide> {
        self.slides.iter().find(|s| s.number == number)
    }

    /// Store a similarity score on every slide, in slide order.
    ///
    /// Extra scores are ignored; slides without a score keep theirs.
    pub fn assign_similarities(&mut self, scores: &[f32]) {
        for (slide, score) in self.slides.iter_mut().zip(scores) {
            slide.similarity = *score;
        }
    }

    /// Metadata header followed by every slide's text.
    pub fn combined_text(&self) -> String {
        let meta = &self.metadata;
        let fmt_date = |d: &Option<DateTime<Utc>>| d.map(|d| d.to_rfc3339()).unwrap_or_default();

        let mut out = format!(
            "Presentation Title : {}\nPresentation Author : {}\nSubject : {}\nKeywords : {}\n\
             Last Modified By : {}\nCreated Date : {}\nModified Date : {}\n\n",
            meta.title,
            meta.author,
            meta.subject,
            meta.keywords,
            meta.last_modified_by,
            fmt_date(&meta.created),
            fmt_date(&meta.modified),
        );

        for slide in &self.slides {
            out.push_str(&format!(
                "------------------------------ SLIDE {} ------------------------------\n\n",
                slide.number
            ));
            out.push_str(&slide.text);
            out.push_str("\n\n");
        }

        out
    }
}
