//! Owned XML tree with event-based parse and serialization.
//!
//! The tree is deliberately small: each element owns an ordered child list,
//! so insertion and removal are plain `Vec` splices with no sibling-pointer
//! bookkeeping. Whitespace-only text is dropped at parse time and the
//! serializer re-indents, so edits never have to patch surrounding
//! formatting. Comments inside elements survive; other prolog content is
//! best-effort.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Malformed or structurally unusable XML input.
#[derive(Debug, Error)]
#[error("malformed XML at byte {offset}: {message}")]
pub struct XmlError {
    pub offset: usize,
    pub message: String,
}

/// A parsed XML document: the root element plus whether the input carried
/// an XML declaration to re-emit.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub has_decl: bool,
    pub root: Element,
}

/// Tagged container with an ordered sequence of owned children.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// One entry in an element's child list.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element with a single text child, the common leaf shape in a POM.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::Text(text.into()));
        element
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text content of direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    pub fn push_element(&mut self, element: Element) -> &mut Element {
        self.children.push(Node::Element(element));
        match self.children.last_mut() {
            Some(Node::Element(element)) => element,
            _ => unreachable!("just pushed an element child"),
        }
    }
}

impl Document {
    /// Parse one XML document from raw bytes.
    pub fn parse(input: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut has_decl = false;
        let mut root: Option<Element> = None;
        // Open elements, outermost first. The root is pushed here too and
        // moved out when its end tag arrives.
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let event = reader.read_event_into(&mut buf).map_err(|err| XmlError {
                offset,
                message: err.to_string(),
            })?;
            match event {
                Event::Decl(_) => has_decl = true,
                Event::Start(start) => {
                    let element = element_from_start(&start, offset)?;
                    if root.is_some() && stack.is_empty() {
                        return Err(XmlError {
                            offset,
                            message: "content after the root element".into(),
                        });
                    }
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, offset)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(XmlError {
                                offset,
                                message: "content after the root element".into(),
                            });
                        }
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| XmlError {
                        offset,
                        message: "unmatched closing tag".into(),
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|err| XmlError {
                        offset,
                        message: err.to_string(),
                    })?;
                    if let Some(parent) = stack.last_mut() {
                        if !text.trim().is_empty() {
                            parent.children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(data.as_ref()).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(comment.as_ref()).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                // DOCTYPE and processing instructions are dropped (best-effort).
                Event::DocType(_) | Event::PI(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(XmlError {
                offset: input.len(),
                message: format!("unclosed element <{}>", open.name),
            });
        }
        let root = root.ok_or_else(|| XmlError {
            offset: input.len(),
            message: "document has no root element".into(),
        })?;
        Ok(Self { has_decl, root })
    }

    /// Serialize the document with two-space indentation.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        if self.has_decl {
            write_event(
                &mut writer,
                Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            )?;
        }
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>, offset: usize) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError {
            offset,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError {
                offset,
                message: err.to_string(),
            })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    write_event(writer, Event::Start(start))?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            Node::Comment(text) => {
                write_event(writer, Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer.write_event(event).map_err(|err| XmlError {
        offset: 0,
        message: err.to_string(),
    })
}
