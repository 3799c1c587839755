//! Turns a presentation file into a [`Document`] of slides and entities.

use crate::blob::SlideTextBuilder;
use slidekit_ai::{CancelToken, EmbeddingProvider, ImageTextExtractor, TokenCounter};
use slidekit_core::{
    Document, Entity, EntityKind, Error, ExtractionConfig, Grid, Result, Slide, TextNormalizer,
};
use slidekit_pptx::{PptxFile, PptxParser, ShapeKind};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Walks every slide of a presentation, collecting entities, the slide
/// text, its token count and (optionally) its embedding.
///
/// A slide that fails to extract is logged and left out of the document;
/// the remaining slides keep their source numbers.
pub struct Extractor<'a> {
    config: ExtractionConfig,
    counter: TokenCounter,
    embedder: Option<Box<dyn EmbeddingProvider + 'a>>,
    image_reader: Option<Box<dyn ImageTextExtractor + 'a>>,
    normalizer: TextNormalizer,
    cancel: CancelToken,
}

impl<'a> Extractor<'a> {
    pub fn new(config: ExtractionConfig, counter: TokenCounter) -> Self {
        Self {
            config,
            counter,
            embedder: None,
            image_reader: None,
            normalizer: TextNormalizer::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Provider used when `config.embed` is set.
    pub fn with_embedder(mut self, embedder: impl EmbeddingProvider + 'a) -> Self {
        self.embedder = Some(Box::new(embedder));
        self
    }

    /// OCR or chart reader used when `config.extract_from_image` is set.
    pub fn with_image_reader(mut self, reader: impl ImageTextExtractor + 'a) -> Self {
        self.image_reader = Some(Box::new(reader));
        self
    }

    /// Stop between slides once `cancel` fires.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the presentation at `path`.
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        log::info!("Extracting {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        self.extract_reader(reader, path)
    }

    /// Extract a presentation from any seekable reader, recording `path` as
    /// its source.
    pub fn extract_reader<R: Read + Seek>(&self, reader: R, path: &Path) -> Result<Document> {
        self.check_providers()?;

        let mut file = PptxParser::new().open(reader)?;
        let mut document = Document::new(path, self.config.clone(), file.metadata().clone());

        for index in 0..file.slide_count() {
            self.cancel.check()?;
            let number = index + 1;
            match self.extract_slide(&mut file, index) {
                Ok(slide) => {
                    log::debug!(
                        "Slide {}: {} entities, {} tokens",
                        number,
                        slide.entities.len(),
                        slide.tokens
                    );
                    document.add_slide(slide);
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => log::error!("Skipping slide {}: {}", number, e),
            }
        }

        log::info!(
            "Extracted {} of {} slides ({} tokens)",
            document.slide_count(),
            file.slide_count(),
            document.total_tokens()
        );
        Ok(document)
    }

    fn check_providers(&self) -> Result<()> {
        if self.config.embed && self.embedder.is_none() {
            return Err(Error::InvalidArgument(
                "Embedding was requested but no embedding provider is configured".to_string(),
            ));
        }
        if self.config.extract_from_image && self.image_reader.is_none() {
            return Err(Error::DependencyMissing(format!(
                "Image extraction was requested but no '{}' engine is configured",
                self.config.ocr_engine
            )));
        }
        Ok(())
    }

    fn extract_slide<R: Read + Seek>(&self, file: &mut PptxFile<R>, index: usize) -> Result<Slide> {
        let number = index + 1;
        let content = file.read_slide(index)?;
        let title = content.title.clone().unwrap_or_default();

        let mut text = SlideTextBuilder::new(number, &title, self.config.maintain_order);
        let mut entities = Vec::new();

        for shape in &content.shapes {
            match &shape.kind {
                ShapeKind::Text(frame) => {
                    for paragraph in &frame.paragraphs {
                        for run in paragraph {
                            text.push_run(run);
                            entities.push(Entity::new(EntityKind::Text, run.as_str(), shape.bbox));
                        }
                        text.end_paragraph();
                    }
                }
                ShapeKind::Table(rows) => {
                    let grid = Grid::from_rows(rows.clone()).render();
                    text.push_table(&grid);
                    entities.push(Entity::new(EntityKind::Table, grid, shape.bbox));
                }
                ShapeKind::Chart(chart) => {
                    let chart_text = chart.to_text();
                    text.push_chart(&chart_text);
                    entities.push(Entity::new(EntityKind::Chart, chart_text, shape.bbox));
                }
                ShapeKind::Picture { part } => {
                    let Some(reader) = self.image_reader() else {
                        continue;
                    };
                    let image = file.read_media(part)?;
                    let recognized = reader.extract_text(&image).map_err(|e| match e {
                        Error::Extraction { message, .. } => Error::Extraction {
                            slide: number,
                            message,
                        },
                        other => other,
                    })?;
                    let recognized = self.normalizer.normalize(&recognized);
                    text.push_image_text(&recognized);
                    entities.push(Entity::new(EntityKind::Image, recognized, shape.bbox));
                }
            }
        }

        let text = text.finish();
        let tokens = self.counter.count(&text);
        let embedding = match self.embedder() {
            Some(embedder) => Some(embedder.embed(&text)?),
            None => None,
        };

        let mut slide = Slide::new(number, title, text)
            .with_entities(entities)
            .with_tokens(tokens);
        if let Some(embedding) = embedding {
            slide = slide.with_embedding(embedding);
        }
        Ok(slide)
    }

    fn embedder(&self) -> Option<&(dyn EmbeddingProvider + 'a)> {
        if self.config.embed {
            self.embedder.as_deref()
        } else {
            None
        }
    }

    fn image_reader(&self) -> Option<&(dyn ImageTextExtractor + 'a)> {
        if self.config.extract_from_image {
            self.image_reader.as_deref()
        } else {
            None
        }
    }
}
