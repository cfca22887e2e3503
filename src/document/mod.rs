//! Document object model over a `.docx` package.
//!
//! A [`Document`] owns one [`Story`] for the body and one per header/footer
//! part. Each story is an ordered [`Container`] of blocks; paragraphs hold
//! runs, tables hold rows of cells which are containers again. Everything the
//! model does not interpret is carried as raw XML so a load/save cycle keeps
//! the package intact.

pub mod container;
pub mod output;
pub mod package;
pub mod paragraph;
pub mod run;
pub mod sample;
pub mod table;

use std::path::Path;

use tracing::warn;

use crate::engine::error::TemplateError;
use crate::xml::{XmlElement, XmlNode, XmlPart};

pub use container::{Block, Container};
pub use output::PendingOutput;
pub use package::Package;
pub use paragraph::{Hyperlink, Inline, Paragraph};
pub use run::{Run, RunContent};
pub use sample::create_sample_template;
pub use table::{Cell, Row, Table};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const HEADER_REL: &str = "/header";
const FOOTER_REL: &str = "/footer";

/// Length in twentieths of a point, the unit of `w:ind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Twips(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    Body,
    Header,
    Footer,
}

/// A part with block-level content: the main body, a header or a footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub part_name: String,
    pub kind: StoryKind,
    pub content: Container,
    declaration: Option<String>,
    // Root element with the content taken out.
    shell: XmlElement,
}

impl Story {
    fn load(part_name: &str, kind: StoryKind, part: XmlPart) -> Result<Self, TemplateError> {
        let XmlPart {
            declaration,
            mut root,
        } = part;

        let holder = match kind {
            StoryKind::Body => {
                let prefix = wordprocessing_prefix(&root).map(str::to_string);
                root.child_mut("w:body").ok_or_else(|| match prefix {
                    Some(prefix) if !prefix.is_empty() && prefix != "w" => TemplateError::MalformedDocument(format!(
                        "{part_name}: WordprocessingML is bound to prefix {prefix:?}, expected w:"
                    )),
                    _ => TemplateError::MalformedDocument(format!("{part_name} has no w:body")),
                })?
            }
            StoryKind::Header | StoryKind::Footer => &mut root,
        };
        let content = Container::from_nodes(std::mem::take(&mut holder.children));

        Ok(Self {
            part_name: part_name.to_string(),
            kind,
            content,
            declaration,
            shell: root,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut root = self.shell.clone();
        let nodes = self.content.to_nodes();
        match self.kind {
            StoryKind::Body => {
                if let Some(body) = root.child_mut("w:body") {
                    body.children = nodes;
                }
            }
            StoryKind::Header | StoryKind::Footer => root.children = nodes,
        }

        XmlPart {
            declaration: self.declaration.clone(),
            root,
        }
        .to_xml()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFooterType {
    Default,
    First,
    Even,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryRef {
    pub kind: HeaderFooterType,
    pub part_name: String,
}

/// One `w:sectPr` and the header/footer parts it references.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub headers: Vec<StoryRef>,
    pub footers: Vec<StoryRef>,
}

impl Section {
    fn from_properties(sect_pr: &XmlElement, targets: &[(String, String)]) -> Self {
        let mut section = Section::default();

        for reference in sect_pr.elements() {
            let is_header = match reference.name.as_str() {
                "w:headerReference" => true,
                "w:footerReference" => false,
                _ => continue,
            };
            let Some(part_name) = reference
                .attribute("r:id")
                .and_then(|id| targets.iter().find(|(rid, _)| rid == id))
                .map(|(_, part)| part.clone())
            else {
                continue;
            };
            let kind = match reference.attribute("w:type") {
                Some("first") => HeaderFooterType::First,
                Some("even") => HeaderFooterType::Even,
                _ => HeaderFooterType::Default,
            };

            let story_ref = StoryRef { kind, part_name };
            if is_header {
                section.headers.push(story_ref);
            } else {
                section.footers.push(story_ref);
            }
        }

        section
    }

    /// Part name of the default header this section declares itself.
    pub fn header(&self) -> Option<&str> {
        default_ref(&self.headers)
    }

    pub fn footer(&self) -> Option<&str> {
        default_ref(&self.footers)
    }
}

/// Prefix bound to the WordprocessingML namespace on `root`; `""` when it
/// is the default namespace.
fn wordprocessing_prefix(root: &XmlElement) -> Option<&str> {
    root.attributes
        .iter()
        .find(|(_, value)| value == W_NS)
        .map(|(key, _)| key.strip_prefix("xmlns:").unwrap_or(""))
}

// The model matches elements by their `w:` names only.
fn check_vocabulary(story: &Story) {
    match wordprocessing_prefix(&story.shell) {
        Some("w") | None => {}
        Some(prefix) => warn!(
            part = %story.part_name,
            prefix,
            "WordprocessingML is bound to a prefix other than w:, content will pass through unchanged"
        ),
    }
    let empty = story.content.paragraphs().next().is_none() && story.content.tables().next().is_none();
    if empty && story.kind == StoryKind::Body {
        warn!(part = %story.part_name, "document body has no paragraphs or tables");
    }
}

fn default_ref(refs: &[StoryRef]) -> Option<&str> {
    refs.iter()
        .find(|r| r.kind == HeaderFooterType::Default)
        .map(|r| r.part_name.as_str())
}

/// An in-memory `.docx` document.
#[derive(Debug, Clone)]
pub struct Document {
    package: Package,
    body: Story,
    parts: Vec<Story>,
    // Relationship id to header/footer part name, from the main part rels.
    targets: Vec<(String, String)>,
}

impl Document {
    /// Loads a document from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TemplateError::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let package = Package::from_bytes(bytes)?;
        let main = package.main_document_part()?;

        let body_xml = package
            .part_xml(&main)?
            .ok_or_else(|| TemplateError::MalformedDocument(format!("{main} is missing")))?;
        let body = Story::load(&main, StoryKind::Body, body_xml)?;
        check_vocabulary(&body);

        let mut parts: Vec<Story> = Vec::new();
        let mut targets = Vec::new();
        for rel in package.relationships(&main)? {
            if rel.external {
                continue;
            }
            let kind = if rel.rel_type.ends_with(HEADER_REL) {
                StoryKind::Header
            } else if rel.rel_type.ends_with(FOOTER_REL) {
                StoryKind::Footer
            } else {
                continue;
            };

            targets.push((rel.id.clone(), rel.target.clone()));
            if parts.iter().any(|story| story.part_name == rel.target) {
                continue;
            }
            if let Some(xml) = package.part_xml(&rel.target)? {
                let story = Story::load(&rel.target, kind, xml)?;
                check_vocabulary(&story);
                parts.push(story);
            }
        }

        Ok(Self {
            package,
            body,
            parts,
            targets,
        })
    }

    pub fn body(&self) -> &Container {
        &self.body.content
    }

    pub fn body_mut(&mut self) -> &mut Container {
        &mut self.body.content
    }

    /// Top-level body paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.content.paragraphs()
    }

    /// Top-level body tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.content.tables()
    }

    /// Sections in document order, read from the current body.
    pub fn sections(&self) -> Vec<Section> {
        self.body
            .content
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => p.section_break(),
                Block::Other(XmlNode::Element(el)) if el.name == "w:sectPr" => Some(el),
                _ => None,
            })
            .map(|sect_pr| Section::from_properties(sect_pr, &self.targets))
            .collect()
    }

    /// Default header content for the section at `index`. A section without
    /// its own header inherits the previous section's.
    pub fn header(&self, index: usize) -> Option<&Container> {
        self.linked_story(index, Section::header)
    }

    pub fn footer(&self, index: usize) -> Option<&Container> {
        self.linked_story(index, Section::footer)
    }

    fn linked_story(&self, index: usize, pick: fn(&Section) -> Option<&str>) -> Option<&Container> {
        let sections = self.sections();
        let last = index.min(sections.len().checked_sub(1)?);
        sections[..=last]
            .iter()
            .rev()
            .find_map(pick)
            .and_then(|part| self.story(part))
            .map(|story| &story.content)
    }

    pub fn story(&self, part_name: &str) -> Option<&Story> {
        std::iter::once(&self.body)
            .chain(self.parts.iter())
            .find(|story| story.part_name == part_name)
    }

    /// Body first, then every header and footer part once.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        std::iter::once(&self.body).chain(self.parts.iter())
    }

    pub fn stories_mut(&mut self) -> impl Iterator<Item = &mut Story> {
        std::iter::once(&mut self.body).chain(self.parts.iter_mut())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TemplateError> {
        let mut package = self.package.clone();
        for story in self.stories() {
            package.set_part(&story.part_name, story.to_xml().into_bytes());
        }
        package.to_bytes()
    }

    /// Writes the document to `path`. The destination is replaced only once
    /// the whole package has been written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let pending = PendingOutput::create(path.as_ref())?;
        let bytes = self.to_bytes()?;
        pending.commit(&bytes)
    }
}
