//! Minimal element tree over quick-xml events.
//!
//! Slide XML nests shapes inside groups and alternate-content blocks, so the
//! parser builds a small owned tree instead of tracking flat reader state.
//! Element names are stored without their namespace prefix.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidekit_core::{Error, Result};

/// An XML element with its attributes, children and direct text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local name, e.g. `sp` for `<p:sp>`.
    pub name: String,
    /// Attributes keyed by their qualified name, e.g. `r:id`.
    attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e, &reader)),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e, &reader);
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("Unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Bad text content: {}", e)))?;
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }
        root.ok_or_else(|| Error::Xml("Document has no root element".to_string()))
    }

    /// Look up an attribute by its exact qualified name (`x`, `r:id`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a namespaced attribute by local name, whatever its prefix.
    ///
    /// Relationship references (`r:id`, `r:embed`) live next to plain
    /// attributes of the same local name, so unprefixed keys never match.
    pub fn prefixed_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| matches!(k.split_once(':'), Some((_, l)) if l == local))
            .map(|(_, v)| v.as_str())
    }

    /// Parse an integer attribute.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Text directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a chain of direct children.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    /// First descendant (depth-first, excluding self) with the given local name.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }
}

fn element_from_start<B>(e: &BytesStart<'_>, reader: &Reader<B>) -> XmlElement {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(reader)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Extract the local name from a potentially namespaced XML name.
pub fn local_name(name: &str) -> &str {
    name.split_once(':').map(|(_, l)| l).unwrap_or(name)
}
