use super::run::Run;
use super::Twips;
use crate::xml::{XmlElement, XmlNode};

/// `w:pPr` children that the schema orders after `w:ind`.
const PPR_AFTER_IND: &[&str] = &[
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Paragraph-level content: runs, hyperlinks wrapping runs, and anything else
/// (bookmarks, proofing marks, fields) kept as raw nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Hyperlink(Hyperlink),
    Other(XmlNode),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hyperlink {
    pub attributes: Vec<(String, String)>,
    pub content: Vec<Inline>,
}

/// A `w:p` element: optional paragraph properties followed by inline content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub attributes: Vec<(String, String)>,
    pub properties: Option<XmlElement>,
    pub content: Vec<Inline>,
}

impl Paragraph {
    /// Creates a bare paragraph. Empty text produces a paragraph with no runs.
    pub fn new(text: &str) -> Self {
        let mut paragraph = Self::default();
        if !text.is_empty() {
            paragraph.append_text(text);
        }
        paragraph
    }

    pub fn from_element(el: XmlElement) -> Self {
        let mut paragraph = Self {
            attributes: el.attributes,
            properties: None,
            content: Vec::new(),
        };

        for node in el.children {
            match node {
                XmlNode::Element(child) if child.name == "w:pPr" && paragraph.properties.is_none() => {
                    paragraph.properties = Some(child);
                }
                other => paragraph.content.push(inline_from(other)),
            }
        }

        paragraph
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:p");
        el.attributes = self.attributes.clone();
        if let Some(props) = &self.properties {
            el.children.push(XmlNode::Element(props.clone()));
        }
        el.children
            .extend(self.content.iter().map(Inline::to_node));
        el
    }

    /// Visible text: the concatenation of every run, including runs nested in
    /// hyperlinks. Run boundaries carry no meaning here.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.content, &mut text);
        text
    }

    /// Direct runs of this paragraph.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|inline| match inline {
            Inline::Run(run) => Some(run),
            _ => None,
        })
    }

    /// Removes runs and hyperlinks. Paragraph properties and every other
    /// inline (bookmarks, fields, tracked changes, content controls) stay in
    /// place. Returns the index the first removed inline occupied.
    pub fn clear(&mut self) -> usize {
        let at = self
            .content
            .iter()
            .position(Inline::carries_text)
            .unwrap_or(self.content.len());
        self.content.retain(|inline| !inline.carries_text());
        at
    }

    /// Replaces the runs with one unstyled run carrying `text`, placed where
    /// the first run was.
    pub fn set_text(&mut self, text: &str) {
        let at = self.clear();
        self.content.insert(at, Inline::Run(Run::new(text)));
    }

    /// Appends a new unstyled run.
    pub fn append_text(&mut self, text: &str) {
        self.content.push(Inline::Run(Run::new(text)));
    }

    pub fn left_indent(&self) -> Option<Twips> {
        self.properties
            .as_ref()?
            .child("w:ind")?
            .attribute("w:left")?
            .parse()
            .ok()
            .map(Twips)
    }

    pub fn set_left_indent(&mut self, indent: Twips) {
        let props = self
            .properties
            .get_or_insert_with(|| XmlElement::new("w:pPr"));

        if props.child("w:ind").is_none() {
            let at = insertion_point(props, PPR_AFTER_IND);
            props
                .children
                .insert(at, XmlNode::Element(XmlElement::new("w:ind")));
        }

        if let Some(ind) = props.child_mut("w:ind") {
            let value = indent.0.to_string();
            ind.set_attribute("w:left", &value);
            if ind.attribute("w:start").is_some() {
                ind.set_attribute("w:start", &value);
            }
        }
    }

    /// The section properties this paragraph closes, if it ends a section.
    pub fn section_break(&self) -> Option<&XmlElement> {
        self.properties.as_ref()?.child("w:sectPr")
    }

    pub fn take_section_break(&mut self) -> Option<XmlElement> {
        self.properties.as_mut()?.take_child("w:sectPr")
    }

    pub fn set_section_break(&mut self, sect_pr: XmlElement) {
        let props = self
            .properties
            .get_or_insert_with(|| XmlElement::new("w:pPr"));
        props.take_child("w:sectPr");
        let at = insertion_point(props, &["w:pPrChange"]);
        props.children.insert(at, XmlNode::Element(sect_pr));
    }
}

impl Hyperlink {
    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:hyperlink");
        el.attributes = self.attributes.clone();
        el.children
            .extend(self.content.iter().map(Inline::to_node));
        el
    }
}

impl Inline {
    fn carries_text(&self) -> bool {
        matches!(self, Inline::Run(_) | Inline::Hyperlink(_))
    }

    fn to_node(&self) -> XmlNode {
        match self {
            Inline::Run(run) => XmlNode::Element(run.to_element()),
            Inline::Hyperlink(link) => XmlNode::Element(link.to_element()),
            Inline::Other(node) => node.clone(),
        }
    }
}

fn inline_from(node: XmlNode) -> Inline {
    match node {
        XmlNode::Element(el) if el.name == "w:r" => Inline::Run(Run::from_element(el)),
        XmlNode::Element(el) if el.name == "w:hyperlink" => Inline::Hyperlink(Hyperlink {
            attributes: el.attributes,
            content: el.children.into_iter().map(inline_from).collect(),
        }),
        other => Inline::Other(other),
    }
}

fn collect_text(content: &[Inline], out: &mut String) {
    for inline in content {
        match inline {
            Inline::Run(run) => out.push_str(&run.text()),
            Inline::Hyperlink(link) => collect_text(&link.content, out),
            Inline::Other(_) => {}
        }
    }
}

/// Index of the first child named in `later`, or the end of the element.
fn insertion_point(el: &XmlElement, later: &[&str]) -> usize {
    el.children
        .iter()
        .position(|node| matches!(node, XmlNode::Element(child) if later.contains(&child.name.as_str())))
        .unwrap_or(el.children.len())
}
