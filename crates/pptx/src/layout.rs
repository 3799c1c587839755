//! Placeholder positions inherited from slide layouts and masters.
//!
//! A placeholder on a slide often carries an empty `p:spPr`; its position
//! then comes from the matching placeholder on the slide's layout, or from
//! the layout's master.

use crate::shapes::Placeholder;
use crate::xml::XmlElement;
use slidekit_core::BoundingBox;

/// Placeholder boxes declared by one layout and its master.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderBoxes {
    layout: Vec<(Placeholder, BoundingBox)>,
    master: Vec<(Placeholder, BoundingBox)>,
}

impl PlaceholderBoxes {
    /// Collect placeholder boxes from a layout and master part root.
    ///
    /// Layout placeholders without their own transform take the master
    /// placeholder of the same base type.
    pub fn new(layout: Option<&XmlElement>, master: Option<&XmlElement>) -> Self {
        let master: Vec<(Placeholder, BoundingBox)> = master
            .map(placeholders)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(ph, bbox)| Some((ph, bbox?)))
            .collect();

        let layout = layout
            .map(placeholders)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(ph, bbox)| {
                let bbox = bbox.or_else(|| by_base_kind(&master, &ph))?;
                Some((ph, bbox))
            })
            .collect();

        Self { layout, master }
    }

    /// Inherited box for a slide placeholder: the layout placeholder with
    /// the same index, else the same type, else the master's.
    pub fn lookup(&self, placeholder: &Placeholder) -> Option<BoundingBox> {
        self.layout
            .iter()
            .find(|(ph, _)| ph.idx == placeholder.idx && ph.base_kind() == placeholder.base_kind())
            .or_else(|| self.layout.iter().find(|(ph, _)| ph.kind == placeholder.kind))
            .map(|(_, bbox)| *bbox)
            .or_else(|| by_base_kind(&self.master, placeholder))
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty() && self.master.is_empty()
    }
}

fn by_base_kind(
    entries: &[(Placeholder, BoundingBox)],
    placeholder: &Placeholder,
) -> Option<BoundingBox> {
    entries
        .iter()
        .find(|(ph, _)| ph.base_kind() == placeholder.base_kind())
        .map(|(_, bbox)| *bbox)
}

/// Placeholders of a part's shape tree with their own transform, if any.
fn placeholders(root: &XmlElement) -> Vec<(Placeholder, Option<BoundingBox>)> {
    let mut out = Vec::new();
    if let Some(tree) = root.path(&["cSld", "spTree"]) {
        collect(tree, &mut out);
    }
    out
}

fn collect(tree: &XmlElement, out: &mut Vec<(Placeholder, Option<BoundingBox>)>) {
    for element in &tree.children {
        let (block, xfrm) = match element.name.as_str() {
            "sp" => ("nvSpPr", element.path(&["spPr", "xfrm"])),
            "pic" => ("nvPicPr", element.path(&["spPr", "xfrm"])),
            "graphicFrame" => ("nvGraphicFramePr", element.child("xfrm")),
            "grpSp" => {
                collect(element, out);
                continue;
            }
            _ => continue,
        };
        if let Some(ph) = element.path(&[block, "nvPr", "ph"]) {
            out.push((Placeholder::from_element(ph), xfrm.map(parse_xfrm)));
        }
    }
}

/// Position and size from an `a:xfrm`/`p:xfrm` element's `off` and `ext`.
pub(crate) fn parse_xfrm(xfrm: &XmlElement) -> BoundingBox {
    let (left, top) = xfrm
        .child("off")
        .map(|o| (o.attr_i64("x").unwrap_or(0), o.attr_i64("y").unwrap_or(0)))
        .unwrap_or((0, 0));
    let (width, height) = xfrm
        .child("ext")
        .map(|e| (e.attr_i64("cx").unwrap_or(0), e.attr_i64("cy").unwrap_or(0)))
        .unwrap_or((0, 0));
    BoundingBox::new(left, top, width, height)
}
