//! OPC package access: parts and relationships inside the ZIP container.

use crate::xml::XmlElement;
use slidekit_core::{Error, Result};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A relationship from one part to another, with its target resolved to an
/// absolute part name (no leading slash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Relationships declared by a single part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Internal relationship with the given id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id && !r.external)
    }

    /// First internal relationship whose type URI ends with `/{suffix}`.
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.items
            .iter()
            .find(|r| !r.external && r.rel_type.rsplit('/').next() == Some(suffix))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A ZIP-backed OPC package.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;
        Ok(Self { archive })
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.archive.file_names().any(|n| n == path)
    }

    /// Names of every entry in the archive, in archive order.
    pub fn part_names(&mut self) -> Result<Vec<String>> {
        (0..self.archive.len())
            .map(|i| {
                self.archive
                    .by_index(i)
                    .map(|file| file.name().to_string())
                    .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))
            })
            .collect()
    }

    /// Read a part as UTF-8 text.
    pub fn read_string(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::CorruptedFile(format!("Part '{}' is not UTF-8: {}", path, e)))
    }

    /// Read a part's raw bytes.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|e| Error::Zip(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)
            .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }

    /// Read and parse an XML part.
    pub fn read_xml(&mut self, path: &str) -> Result<XmlElement> {
        let content = self.read_string(path)?;
        XmlElement::parse(&content)
            .map_err(|e| Error::Xml(format!("Failed to parse '{}': {}", path, e)))
    }

    /// Relationships of `part`. A part without a `.rels` file has none.
    ///
    /// Pass `""` for the package-level relationships.
    pub fn relationships(&mut self, part: &str) -> Result<Relationships> {
        let rels_path = rels_path_for(part);
        if !self.has_part(&rels_path) {
            return Ok(Relationships::default());
        }

        let root = self.read_xml(&rels_path)?;
        let items = root
            .children_named("Relationship")
            .filter_map(|rel| {
                let id = rel.attr("Id")?;
                let target = rel.attr("Target")?;
                let external = rel.attr("TargetMode") == Some("External");
                Some(Relationship {
                    id: id.to_string(),
                    rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                    target: if external {
                        target.to_string()
                    } else {
                        resolve_target(part, target)
                    },
                    external,
                })
            })
            .collect();

        Ok(Relationships { items })
    }
}

/// Path of the relationships part for `part`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the directory of `source`.
fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(rels_path_for("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
        assert_eq!(rels_path_for("ppt/slides/slide3.xml"), "ppt/slides/_rels/slide3.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        let slide = "ppt/slides/slide1.xml";
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide1.xml"), slide);
        assert_eq!(resolve_target(slide, "../charts/chart2.xml"), "ppt/charts/chart2.xml");
        assert_eq!(resolve_target(slide, "/ppt/media/image1.png"), "ppt/media/image1.png");
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "./img.png"), "ppt/slides/img.png");
    }

    #[test]
    fn test_relationship_lookup() {
        let rels = Relationships {
            items: vec![
                Relationship {
                    id: "rId1".into(),
                    rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout".into(),
                    target: "ppt/slideLayouts/slideLayout1.xml".into(),
                    external: false,
                },
                Relationship {
                    id: "rId2".into(),
                    rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image".into(),
                    target: "https://example.com/a.png".into(),
                    external: true,
                },
            ],
        };
        assert_eq!(rels.len(), 2);
        assert!(rels.get("rId2").is_none());
        assert_eq!(
            rels.first_of_type("slideLayout").map(|r| r.target.as_str()),
            Some("ppt/slideLayouts/slideLayout1.xml")
        );
        assert!(rels.first_of_type("slide").is_none());
    }
}
