//! Owned XML tree for the package parts the engine rewrites.
//!
//! Parsing goes through `quick-xml`; serialisation is a straight walk of the
//! tree. Anything the document model does not understand (comments, CDATA,
//! processing instructions) is kept as raw markup so a part round-trips.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("XML part has no root element")]
    MissingRoot,

    #[error("unbalanced closing tag: {0}")]
    UnbalancedTag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    /// Comment, CDATA or processing instruction, delimiters included.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing the value in place if the key exists.
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Child elements, skipping text and raw nodes.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Removes and returns the first child element with the given name.
    pub fn take_child(&mut self, name: &str) -> Option<XmlElement> {
        let index = self
            .children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(el) if el.name == name))?;
        match self.children.remove(index) {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl XmlNode {
    pub fn write_to(&self, out: &mut String) {
        match self {
            XmlNode::Element(el) => el.write_to(out),
            XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
            XmlNode::Raw(raw) => out.push_str(raw),
        }
    }
}

/// A parsed package part: optional XML declaration plus the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlPart {
    pub declaration: Option<String>,
    pub root: XmlElement,
}

impl XmlPart {
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader
                .read_event()
                .map_err(|e| XmlError::Parse(e.to_string()))?
            {
                Event::Decl(decl) => {
                    declaration = Some(String::from_utf8_lossy(&decl).into_owned());
                }
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let el = element_from(&start)?;
                    attach(&mut stack, &mut root, el);
                }
                Event::End(end) => {
                    let el = stack.pop().ok_or_else(|| {
                        XmlError::UnbalancedTag(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                    })?;
                    attach(&mut stack, &mut root, el);
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| XmlError::Parse(e.to_string()))?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => push_raw(
                    &mut stack,
                    format!("<![CDATA[{}]]>", String::from_utf8_lossy(&data)),
                ),
                Event::Comment(comment) => push_raw(
                    &mut stack,
                    format!("<!--{}-->", String::from_utf8_lossy(&comment)),
                ),
                Event::PI(pi) => {
                    push_raw(&mut stack, format!("<?{}?>", String::from_utf8_lossy(&pi)))
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Parse(format!("unclosed element <{}>", open.name)));
        }

        Ok(Self {
            declaration,
            root: root.ok_or(XmlError::MissingRoot)?,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.declaration {
            out.push_str("<?");
            out.push_str(decl);
            out.push_str("?>\r\n");
        }
        self.root.write_to(&mut out);
        out
    }
}

fn element_from(start: &BytesStart) -> Result<XmlElement, XmlError> {
    let mut el = XmlElement::new(&String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Parse(e.to_string()))?;
        el.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(el)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, el: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(el)),
        None => {
            if root.is_none() {
                *root = Some(el);
            }
        }
    }
}

// Markup outside the root element is dropped.
fn push_raw(stack: &mut [XmlElement], raw: String) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Raw(raw));
    }
}
