//! Parsed XML response documents.
//!
//! Responses are parsed into a small owned element tree rather than typed
//! structs: the item pipeline only reads a handful of paths, and the
//! passthrough and text outputs need the whole document intact.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::trace;

/// One XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Creates an element with no content.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Qualified name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    /// Follows a path of child names, taking the first match at each step.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Text of the element at `path`, if the element exists.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.find(path).map(Element::text)
    }

    /// True when the element carries neither children nor text.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.trim().is_empty()
    }
}

/// A parsed response. A document without a root stands for "no response".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// The absent document.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// Parses a response body.
    ///
    /// An empty or whitespace-only body yields [`Document::empty`]; anything
    /// that is not well-formed XML is a [`Error::Parse`].
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(e) => stack.push(start_element(&e)?),
                Event::Empty(e) => attach(&mut stack, &mut root, start_element(&e)?)?,
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape().map_err(parse_error)?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Parse(format!("unclosed element <{}>", open.name)));
        }

        trace!("Parsed document with root {:?}", root.as_ref().map(Element::name));
        Ok(Self { root })
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// True for the absent document and for a root with no content.
    pub fn is_empty(&self) -> bool {
        self.root.as_ref().map_or(true, Element::is_empty)
    }

    /// Follows `path` from the root element.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        self.root.as_ref().and_then(|root| root.find(path))
    }

    /// Serializes the document back to XML.
    pub fn to_xml(&self) -> Result<String> {
        let Some(root) = &self.root else {
            return Ok(String::new());
        };

        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(serialize_error)?;
        write_element(&mut writer, root)?;

        String::from_utf8(writer.into_inner()).map_err(serialize_error)
    }

    /// JSON mirror of the document.
    ///
    /// Leaf elements become strings, repeated siblings become arrays and
    /// attributes are kept under `@attributes`. The root element's name is
    /// not part of the output.
    pub fn to_json(&self) -> Value {
        self.root.as_ref().map_or(Value::Null, element_to_json)
    }

    /// Pretty-printed [`Document::to_json`].
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json()).map_err(serialize_error)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

fn parse_error(e: impl fmt::Display) -> Error {
    Error::Parse(e.to_string())
}

fn serialize_error(e: impl fmt::Display) -> Error {
    Error::Serialize(e.to_string())
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr.map_err(parse_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(parse_error)?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::Parse("multiple root elements".to_string())),
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(serialize_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(serialize_error)?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text))).map_err(serialize_error)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(serialize_error)?;

    Ok(())
}

fn element_to_json(element: &Element) -> Value {
    if element.children.is_empty() && element.attributes.is_empty() {
        return Value::String(element.text.clone());
    }

    let mut map = Map::new();
    if !element.attributes.is_empty() {
        let attributes = element
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<_, _>>();
        map.insert("@attributes".to_string(), Value::Object(attributes));
    }
    if element.children.is_empty() && !element.text.is_empty() {
        map.insert("@text".to_string(), Value::String(element.text.clone()));
    }

    for child in &element.children {
        let key = child.local_name().to_string();
        let value = element_to_json(child);
        match map.remove(&key) {
            None => {
                map.insert(key, value);
            }
            Some(Value::Array(mut items)) => {
                items.push(value);
                map.insert(key, Value::Array(items));
            }
            Some(existing) => {
                map.insert(key, Value::Array(vec![existing, value]));
            }
        }
    }

    Value::Object(map)
}
