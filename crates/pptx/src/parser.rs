//! PPTX file parser implementation.

use crate::chart::{read_workbook, ChartData};
use crate::layout::{parse_xfrm, PlaceholderBoxes};
use crate::package::{Package, Relationships};
use crate::shapes::{Placeholder, Shape, ShapeKind, SlideContent, TextFrame};
use crate::xml::XmlElement;
use chrono::{DateTime, Utc};
use slidekit_core::{BoundingBox, DocumentMetadata, Error, Result};
use std::collections::HashMap;
use std::io::{Read, Seek};

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const DEFAULT_CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open a PPTX package, reading its metadata and slide order.
    ///
    /// Slides themselves are parsed on demand with [`PptxFile::read_slide`],
    /// so a broken slide does not prevent reading the others.
    pub fn open<R: Read + Seek>(&self, reader: R) -> Result<PptxFile<R>> {
        let mut package = Package::open(reader)?;
        let root_rels = package.relationships("")?;

        let presentation_part = root_rels
            .first_of_type("officeDocument")
            .map(|r| r.target.clone())
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());
        if !package.has_part(&presentation_part) {
            return Err(Error::CorruptedFile(format!(
                "Presentation part '{}' is missing",
                presentation_part
            )));
        }

        let presentation = package.read_xml(&presentation_part)?;
        let presentation_rels = package.relationships(&presentation_part)?;
        let slide_parts = slide_order(&presentation, &presentation_rels);

        let mut metadata = read_core_properties(&mut package, &root_rels)?;
        if let Some(size) = presentation.child("sldSz") {
            metadata.slide_width = size.attr_i64("cx");
            metadata.slide_height = size.attr_i64("cy");
        }

        log::debug!(
            "Opened PPTX package: {} slides listed in '{}'",
            slide_parts.len(),
            presentation_part
        );

        Ok(PptxFile {
            package,
            slide_parts,
            metadata,
            layouts: HashMap::new(),
        })
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// An opened PPTX package.
pub struct PptxFile<R> {
    package: Package<R>,
    slide_parts: Vec<String>,
    metadata: DocumentMetadata,
    /// Placeholder boxes per layout part, loaded on first use.
    layouts: HashMap<String, PlaceholderBoxes>,
}

impl<R: Read + Seek> PptxFile<R> {
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Number of slides listed by the presentation.
    pub fn slide_count(&self) -> usize {
        self.slide_parts.len()
    }

    /// Part name of the slide at `index` (0-based, presentation order).
    pub fn slide_part(&self, index: usize) -> Option<&str> {
        self.slide_parts.get(index).map(String::as_str)
    }

    /// Parse the slide at `index` (0-based, presentation order).
    pub fn read_slide(&mut self, index: usize) -> Result<SlideContent> {
        let part = self
            .slide_parts
            .get(index)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("No slide at index {}", index)))?;

        let root = self.package.read_xml(&part)?;
        let rels = self.package.relationships(&part)?;
        let tree = root
            .path(&["cSld", "spTree"])
            .ok_or_else(|| Error::CorruptedFile(format!("Slide '{}' has no shape tree", part)))?;
        let inherited = self.placeholder_boxes(&rels)?;

        let mut shapes = Vec::new();
        self.collect_shapes(tree, &rels, &inherited, &mut shapes)?;

        let title = shapes.iter().find(|s| s.is_title()).and_then(|s| match &s.kind {
            ShapeKind::Text(frame) => Some(frame.text()),
            _ => None,
        });

        log::debug!("Parsed '{}': {} shapes", part, shapes.len());
        Ok(SlideContent { title, shapes })
    }

    /// Read the bytes of a picture's image part.
    pub fn read_media(&mut self, part: &str) -> Result<Vec<u8>> {
        self.package.read_bytes(part)
    }

    pub(crate) fn package_mut(&mut self) -> &mut Package<R> {
        &mut self.package
    }

    /// Placeholder boxes of the slide's layout and master, cached by layout.
    fn placeholder_boxes(&mut self, slide_rels: &Relationships) -> Result<PlaceholderBoxes> {
        let Some(layout_part) = slide_rels.first_of_type("slideLayout").map(|r| r.target.clone())
        else {
            return Ok(PlaceholderBoxes::default());
        };
        if let Some(boxes) = self.layouts.get(&layout_part) {
            return Ok(boxes.clone());
        }

        let layout = self.read_optional_xml(&layout_part)?;
        let master_part = self
            .package
            .relationships(&layout_part)?
            .first_of_type("slideMaster")
            .map(|r| r.target.clone());
        let master = match master_part {
            Some(part) => self.read_optional_xml(&part)?,
            None => None,
        };

        let boxes = PlaceholderBoxes::new(layout.as_ref(), master.as_ref());
        log::debug!(
            "Loaded placeholder boxes from '{}' (empty: {})",
            layout_part,
            boxes.is_empty()
        );
        self.layouts.insert(layout_part, boxes.clone());
        Ok(boxes)
    }

    fn read_optional_xml(&mut self, part: &str) -> Result<Option<XmlElement>> {
        if !self.package.has_part(part) {
            log::warn!("Part '{}' is referenced but missing", part);
            return Ok(None);
        }
        self.package.read_xml(part).map(Some)
    }

    /// Walk a shape tree (or group), appending shapes in document order.
    fn collect_shapes(
        &mut self,
        tree: &XmlElement,
        rels: &Relationships,
        inherited: &PlaceholderBoxes,
        shapes: &mut Vec<Shape>,
    ) -> Result<()> {
        for element in &tree.children {
            match element.name.as_str() {
                "sp" => {
                    if let Some(shape) = parse_text_shape(element, inherited) {
                        shapes.push(shape);
                    }
                }
                "pic" => {
                    if let Some(shape) = parse_picture(element, rels, inherited) {
                        shapes.push(shape);
                    }
                }
                "graphicFrame" => {
                    if let Some(shape) = self.parse_graphic_frame(element, rels, inherited)? {
                        shapes.push(shape);
                    }
                }
                "grpSp" => self.collect_shapes(element, rels, inherited, shapes)?,
                "AlternateContent" => {
                    let branch = element
                        .child("Choice")
                        .or_else(|| element.child("Fallback"));
                    if let Some(branch) = branch {
                        self.collect_shapes(branch, rels, inherited, shapes)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_graphic_frame(
        &mut self,
        frame: &XmlElement,
        rels: &Relationships,
        inherited: &PlaceholderBoxes,
    ) -> Result<Option<Shape>> {
        let Some(data) = frame.path(&["graphic", "graphicData"]) else {
            return Ok(None);
        };
        let (name, placeholder) = non_visual_props(frame, "nvGraphicFramePr");
        let bbox = shape_bbox(frame.child("xfrm"), placeholder.as_ref(), inherited);

        if let Some(table) = data.child("tbl") {
            let rows = table
                .children_named("tr")
                .map(|tr| {
                    tr.children_named("tc")
                        .map(|tc| {
                            tc.child("txBody")
                                .map(|b| text_frame(b).text())
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .collect();
            return Ok(Some(Shape {
                name,
                placeholder,
                bbox,
                kind: ShapeKind::Table(rows),
            }));
        }

        if let Some(chart_ref) = data.child("chart") {
            let rel_id = chart_ref.prefixed_attr("id").ok_or_else(|| {
                Error::CorruptedFile(format!("Chart frame '{}' has no relationship id", name))
            })?;
            let target = rels
                .get(rel_id)
                .map(|r| r.target.clone())
                .ok_or_else(|| {
                    Error::CorruptedFile(format!("Chart relationship '{}' not found", rel_id))
                })?;
            let root = self.package.read_xml(&target)?;
            let mut chart = ChartData::from_element(&root)?;
            chart.workbook = self.chart_workbook(&target, &root)?;
            return Ok(Some(Shape {
                name,
                placeholder,
                bbox,
                kind: ShapeKind::Chart(chart),
            }));
        }

        log::debug!("Skipping unsupported graphic frame '{}'", name);
        Ok(None)
    }

    /// Rows of the workbook embedded behind a chart's `c:externalData`.
    ///
    /// A missing or unreadable workbook leaves the chart on its cached values.
    fn chart_workbook(
        &mut self,
        chart_part: &str,
        chart: &XmlElement,
    ) -> Result<Option<Vec<Vec<String>>>> {
        let Some(rel_id) = chart.child("externalData").and_then(|e| e.prefixed_attr("id")) else {
            return Ok(None);
        };
        let rels = self.package.relationships(chart_part)?;
        let Some(target) = rels.get(rel_id).map(|r| r.target.clone()) else {
            log::debug!("Chart '{}' links an external workbook, using cached values", chart_part);
            return Ok(None);
        };
        if !self.package.has_part(&target) {
            log::warn!("Workbook '{}' of chart '{}' is missing", target, chart_part);
            return Ok(None);
        }

        let bytes = self.package.read_bytes(&target)?;
        match read_workbook(bytes) {
            Ok(rows) if rows.is_empty() => Ok(None),
            Ok(rows) => Ok(Some(rows)),
            Err(e) => {
                log::warn!("Ignoring workbook of chart '{}': {}", chart_part, e);
                Ok(None)
            }
        }
    }
}

/// Slide part names in presentation order, from `p:sldIdLst`.
fn slide_order(presentation: &XmlElement, rels: &Relationships) -> Vec<String> {
    let Some(list) = presentation.child("sldIdLst") else {
        return Vec::new();
    };

    list.children_named("sldId")
        .filter_map(|sld| {
            let rel_id = sld.prefixed_attr("id")?;
            match rels.get(rel_id) {
                Some(rel) => Some(rel.target.clone()),
                None => {
                    log::warn!("Slide relationship '{}' not found, skipping", rel_id);
                    None
                }
            }
        })
        .collect()
}

fn read_core_properties<R: Read + Seek>(
    package: &mut Package<R>,
    root_rels: &Relationships,
) -> Result<DocumentMetadata> {
    let part = root_rels
        .first_of_type("core-properties")
        .map(|r| r.target.clone())
        .unwrap_or_else(|| DEFAULT_CORE_PROPERTIES_PART.to_string());
    if !package.has_part(&part) {
        log::debug!("No core properties part, metadata left empty");
        return Ok(DocumentMetadata::default());
    }

    let root = package.read_xml(&part)?;
    let text = |name: &str| {
        root.child(name)
            .map(|e| e.text().trim().to_string())
            .unwrap_or_default()
    };
    let date = |name: &str| {
        root.child(name)
            .and_then(|e| DateTime::parse_from_rfc3339(e.text().trim()).ok())
            .map(|d| d.with_timezone(&Utc))
    };

    Ok(DocumentMetadata {
        title: text("title"),
        author: text("creator"),
        subject: text("subject"),
        keywords: text("keywords"),
        last_modified_by: text("lastModifiedBy"),
        created: date("created"),
        modified: date("modified"),
        slide_width: None,
        slide_height: None,
    })
}

fn parse_text_shape(sp: &XmlElement, inherited: &PlaceholderBoxes) -> Option<Shape> {
    let body = sp.child("txBody")?;
    let (name, placeholder) = non_visual_props(sp, "nvSpPr");
    let bbox = shape_bbox(sp.path(&["spPr", "xfrm"]), placeholder.as_ref(), inherited);

    Some(Shape {
        name,
        placeholder,
        bbox,
        kind: ShapeKind::Text(text_frame(body)),
    })
}

fn parse_picture(
    pic: &XmlElement,
    rels: &Relationships,
    inherited: &PlaceholderBoxes,
) -> Option<Shape> {
    let (name, placeholder) = non_visual_props(pic, "nvPicPr");
    let rel_id = pic.path(&["blipFill", "blip"])?.prefixed_attr("embed")?;
    let Some(rel) = rels.get(rel_id) else {
        log::warn!("Picture '{}' references missing image '{}'", name, rel_id);
        return None;
    };
    let bbox = shape_bbox(pic.path(&["spPr", "xfrm"]), placeholder.as_ref(), inherited);

    Some(Shape {
        name,
        placeholder,
        bbox,
        kind: ShapeKind::Picture {
            part: rel.target.clone(),
        },
    })
}

/// The shape's own transform, else the box its placeholder inherits.
fn shape_bbox(
    xfrm: Option<&XmlElement>,
    placeholder: Option<&Placeholder>,
    inherited: &PlaceholderBoxes,
) -> BoundingBox {
    if let Some(xfrm) = xfrm {
        return parse_xfrm(xfrm);
    }
    placeholder
        .and_then(|ph| inherited.lookup(ph))
        .unwrap_or_default()
}

/// Shape name and placeholder from the non-visual properties block.
fn non_visual_props(shape: &XmlElement, block: &str) -> (String, Option<Placeholder>) {
    let Some(nv) = shape.child(block) else {
        return (String::new(), None);
    };
    let name = nv
        .child("cNvPr")
        .and_then(|c| c.attr("name"))
        .unwrap_or_default()
        .to_string();
    let placeholder = nv.path(&["nvPr", "ph"]).map(Placeholder::from_element);
    (name, placeholder)
}

/// Runs of every paragraph in a text body. Only `a:r` runs count; fields
/// and line breaks are not runs.
fn text_frame(body: &XmlElement) -> TextFrame {
    let paragraphs = body
        .children_named("p")
        .map(|p| {
            p.children_named("r")
                .map(|r| r.child("t").map(|t| t.text().to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    TextFrame { paragraphs }
}
