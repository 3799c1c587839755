//! Serialization of extracted documents.
//!
//! The tabular export has one row per non-text entity plus one row per slide
//! aggregating all of that slide's text runs.

use crate::{BoundingBox, Document, EntityKind, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// One row of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRow {
    pub slide_number: usize,
    pub kind: EntityKind,
    pub text: String,
    /// The slide's embedding as a JSON array, empty when absent.
    pub embedding: String,
    /// Bounding box formatted as `[left, top, width, height]`.
    pub position: String,
}

/// Flatten a document into export rows.
pub fn entity_rows(document: &Document) -> Result<Vec<EntityRow>> {
    let mut rows = Vec::new();

    for slide in document.slides() {
        let embedding = match &slide.embedding {
            Some(v) => serde_json::to_string(v)?,
            None => String::new(),
        };

        let mut text = String::new();
        let mut text_box: Option<BoundingBox> = None;

        for entity in &slide.entities {
            if entity.kind() == EntityKind::Text {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(entity.text());
                text_box = Some(match text_box {
                    Some(b) => b.union(&entity.bbox()),
                    None => entity.bbox(),
                });
            } else {
                rows.push(EntityRow {
                    slide_number: slide.number,
                    kind: entity.kind(),
                    text: entity.text().to_string(),
                    embedding: embedding.clone(),
                    position: entity.bbox().to_string(),
                });
            }
        }

        rows.push(EntityRow {
            slide_number: slide.number,
            kind: EntityKind::Text,
            text,
            embedding,
            position: text_box.unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

/// Write the tabular export as CSV.
pub fn write_csv<W: Write>(document: &Document, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in entity_rows(document)? {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Serialize the whole document as pretty-printed JSON.
pub fn to_json(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Write one `{number}.txt` file per slide holding its text and entities.
pub fn write_slide_metadata(document: &Document, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    for slide in document.slides() {
        let entities = slide
            .entities
            .iter()
            .map(|e| format!("{} {} {:?}", e.kind(), e.bbox(), e.text()))
            .collect::<Vec<_>>()
            .join("\n");

        let path = dir.join(format!("{}.txt", slide.number));
        fs::write(&path, format!("{}\n\n{}", slide.text, entities))?;
        log::debug!("Wrote slide metadata to {}", path.display());
    }

    Ok(())
}
