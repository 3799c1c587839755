//! Copies of a deck with every extracted entity highlighted.

use crate::parser::PptxFile;
use crate::xml::XmlElement;
use slidekit_core::{BoundingBox, Document, EntityKind, Error, Result};
use std::collections::HashMap;
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const FILL_COLOR: &str = "FBF4DE";
const FILL_ALPHA: u32 = 44000;

/// Write a copy of `file` to `writer` with a translucent rectangle, labeled
/// with the entity kind, over every entity of `document`.
///
/// Entities of one kind sharing a box (the runs of one text frame) get a
/// single rectangle. Returns the number of rectangles drawn.
pub fn write_highlighted<R, W>(
    file: &mut PptxFile<R>,
    document: &Document,
    writer: W,
) -> Result<usize>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut marks: HashMap<String, Vec<(EntityKind, BoundingBox)>> = HashMap::new();
    for slide in document.slides() {
        let Some(part) = slide.number.checked_sub(1).and_then(|i| file.slide_part(i)) else {
            log::warn!("Slide {} is not in the package, not highlighted", slide.number);
            continue;
        };
        let entries = marks.entry(part.to_string()).or_default();
        for entity in &slide.entities {
            let mark = (entity.kind(), entity.bbox());
            if !entries.contains(&mark) {
                entries.push(mark);
            }
        }
    }

    let package = file.package_mut();
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);
    let mut drawn = 0;

    for name in package.part_names()? {
        if name.ends_with('/') {
            zip.add_directory(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", name, e)))?;
            continue;
        }

        let mut content = package.read_bytes(&name)?;
        if let Some(entries) = marks.get(&name).filter(|e| !e.is_empty()) {
            let xml = String::from_utf8(content).map_err(|e| {
                Error::CorruptedFile(format!("Part '{}' is not UTF-8: {}", name, e))
            })?;
            content = highlight_slide(&xml, entries)?.into_bytes();
            drawn += entries.len();
            log::debug!("Highlighted {} entities on '{}'", entries.len(), name);
        }

        zip.start_file(name.as_str(), options)
            .map_err(|e| Error::Zip(format!("Failed to write '{}': {}", name, e)))?;
        zip.write_all(&content)?;
    }

    zip.finish()
        .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
    log::info!("Highlighted {} entities", drawn);
    Ok(drawn)
}

/// Append one highlight shape per entry to the end of a slide's shape tree.
fn highlight_slide(xml: &str, entries: &[(EntityKind, BoundingBox)]) -> Result<String> {
    let root = XmlElement::parse(xml)?;
    let first_id = root
        .find_all("cNvPr")
        .iter()
        .filter_map(|c| c.attr_i64("id"))
        .max()
        .unwrap_or(0)
        + 1;

    let (insert_at, prefix) = shape_tree_end(xml)
        .ok_or_else(|| Error::CorruptedFile("Slide has no shape tree".to_string()))?;

    let shapes: String = entries
        .iter()
        .zip(first_id..)
        .map(|((kind, bbox), id)| highlight_shape(prefix, id, *kind, bbox))
        .collect();

    let mut out = String::with_capacity(xml.len() + shapes.len());
    out.push_str(&xml[..insert_at]);
    out.push_str(&shapes);
    out.push_str(&xml[insert_at..]);
    Ok(out)
}

/// Offset of the closing `spTree` tag and the element prefix it uses.
fn shape_tree_end(xml: &str) -> Option<(usize, &str)> {
    let name_at = xml.rfind("spTree>")?;
    let open_at = xml[..name_at].rfind("</")?;
    let prefix = &xml[open_at + 2..name_at];
    let namespace = prefix.strip_suffix(':').unwrap_or(prefix);
    let valid = namespace.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if prefix.is_empty() || (prefix.ends_with(':') && valid) {
        Some((open_at, prefix))
    } else {
        None
    }
}

fn highlight_shape(p: &str, id: i64, kind: EntityKind, bbox: &BoundingBox) -> String {
    format!(
        concat!(
            r#"<{p}sp xmlns:a="{ns}">"#,
            r#"<{p}nvSpPr><{p}cNvPr id="{id}" name="Highlight {id}"/><{p}cNvSpPr/><{p}nvPr/></{p}nvSpPr>"#,
            r#"<{p}spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#,
            r#"<a:solidFill><a:srgbClr val="{color}"><a:alpha val="{alpha}"/></a:srgbClr></a:solidFill>"#,
            r#"</{p}spPr>"#,
            r#"<{p}txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{label}</a:t></a:r></a:p></{p}txBody>"#,
            r#"</{p}sp>"#,
        ),
        p = p,
        ns = DRAWING_NS,
        id = id,
        x = bbox.left,
        y = bbox.top,
        cx = bbox.width,
        cy = bbox.height,
        color = FILL_COLOR,
        alpha = FILL_ALPHA,
        label = kind.as_str(),
    )
}
