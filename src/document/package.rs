use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::engine::error::TemplateError;
use crate::xml::XmlPart;

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// One archive member, kept in its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    pub stored: bool,
    pub is_dir: bool,
}

/// A relationship from a part's `.rels` file, with the target resolved to
/// a package part name for internal targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// The zip container of a `.docx` file.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
                data,
            });
        }

        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TemplateError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&entry.data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    pub fn part_xml(&self, name: &str) -> Result<Option<XmlPart>, TemplateError> {
        let Some(data) = self.part(name) else {
            return Ok(None);
        };
        let text = std::str::from_utf8(data)
            .map_err(|e| TemplateError::MalformedDocument(format!("{name}: {e}")))?;
        Ok(Some(XmlPart::parse(text)?))
    }

    /// Replaces a part's bytes, appending a new entry if the part is absent.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                stored: false,
                is_dir: false,
            }),
        }
    }

    /// Name of the main document part, from the package relationships.
    pub fn main_document_part(&self) -> Result<String, TemplateError> {
        let main = self
            .relationships("")?
            .into_iter()
            .find(|rel| !rel.external && rel.rel_type.ends_with(OFFICE_DOCUMENT_REL))
            .map(|rel| rel.target)
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        if self.part(&main).is_none() {
            return Err(TemplateError::MalformedDocument(format!(
                "main document part {main} is missing"
            )));
        }
        Ok(main)
    }

    /// Relationships declared by `source` (`""` for the package itself).
    /// A part without a `.rels` file has none.
    pub fn relationships(&self, source: &str) -> Result<Vec<Relationship>, TemplateError> {
        let Some(part) = self.part_xml(&rels_part_name(source))? else {
            return Ok(Vec::new());
        };

        let base = part_directory(source);
        let rels = part
            .root
            .elements()
            .filter(|el| el.name == "Relationship")
            .filter_map(|el| {
                let id = el.attribute("Id")?.to_string();
                let rel_type = el.attribute("Type")?.to_string();
                let raw_target = el.attribute("Target")?;
                let external = el.attribute("TargetMode") == Some("External");
                let target = if external {
                    raw_target.to_string()
                } else {
                    resolve_target(base, raw_target)
                };
                Some(Relationship {
                    id,
                    rel_type,
                    target,
                    external,
                })
            })
            .collect();

        Ok(rels)
    }
}

fn rels_part_name(source: &str) -> String {
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if source.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{source}.rels"),
    }
}

fn part_directory(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn resolve_target(base: &str, target: &str) -> String {
    let (mut segments, rest): (Vec<&str>, &str) = match target.strip_prefix('/') {
        Some(absolute) => (Vec::new(), absolute),
        None => (
            base.split('/').filter(|s| !s.is_empty()).collect(),
            target,
        ),
    };

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_part_name() {
        assert_eq!(rels_part_name(""), "_rels/.rels");
        assert_eq!(rels_part_name("word/document.xml"), "word/_rels/document.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word", "header1.xml"), "word/header1.xml");
        assert_eq!(resolve_target("word", "../customXml/item1.xml"), "customXml/item1.xml");
        assert_eq!(resolve_target("word", "/word/footer2.xml"), "word/footer2.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(Package::from_bytes(b"not a zip").is_err());
    }

    #[test]
    fn test_round_trip_keeps_entry_order() {
        let mut package = Package::default();
        package.set_part("b.xml", b"<b/>".to_vec());
        package.set_part("a.xml", b"<a/>".to_vec());

        let reloaded = Package::from_bytes(&package.to_bytes().unwrap()).unwrap();
        let names: Vec<&str> = reloaded.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.xml", "a.xml"]);
        assert_eq!(reloaded.part("a.xml"), Some(&b"<a/>"[..]));
    }

    #[test]
    fn test_missing_main_part_is_malformed() {
        let package = Package::default();
        assert!(matches!(
            package.main_document_part(),
            Err(TemplateError::MalformedDocument(_))
        ));
    }
}
