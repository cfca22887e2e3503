//! A small template with every kind of placeholder, for trying the engine
//! out without a real act or contract at hand.

use std::path::Path;

use super::{Block, Container, Package, Paragraph, PendingOutput, Table};
use crate::engine::error::TemplateError;
use crate::xml::{XmlElement, XmlNode, XmlPart};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const DECLARATION: &str = r#"xml version="1.0" encoding="UTF-8" standalone="yes""#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style></w:styles>"#;

// A4 portrait, 2 cm margins.
const GRID_COLUMN_TWIPS: u32 = 4819;

/// Body of the sample template: a title, contract and wagon fields, a list
/// placeholder, a sum placeholder and a two-by-two table.
pub fn sample_body() -> Container {
    let mut title = Paragraph::new("Тестовый документ");
    title.properties = Some(
        XmlElement::new("w:pPr").with_child(XmlElement::new("w:pStyle").with_attribute("w:val", "Title")),
    );

    let mut body = Container::default();
    body.push_paragraph(title);
    for text in [
        "Договор № [договоры.номер]",
        "от [договоры.дата]",
        "",
        "Вагон № [вагоны.номер]",
        "Подразделение: [вагоны.подразделение]",
        "",
        "Список работ: [список_работ(договоры.номер)]",
        "Сумма: [сумма(договоры.номер)]",
    ] {
        body.push_paragraph(Paragraph::new(text));
    }
    body.blocks.push(Block::Table(grid(&[
        ["Номер договора", "[договоры.номер]"],
        ["Дата договора", "[договоры.дата]"],
    ])));
    body
}

/// Serialised `.docx` bytes of [`sample_body`].
pub fn sample_template() -> Result<Vec<u8>, TemplateError> {
    let mut body = XmlElement::new("w:body");
    body.children = sample_body().to_nodes();
    body.children.push(XmlNode::Element(section_properties()));

    let document = XmlPart {
        declaration: Some(DECLARATION.to_string()),
        root: XmlElement::new("w:document")
            .with_attribute("xmlns:w", W_NS)
            .with_attribute("xmlns:r", R_NS)
            .with_child(body),
    };

    let mut package = Package::default();
    package.set_part("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
    package.set_part("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec());
    package.set_part("word/document.xml", document.to_xml().into_bytes());
    package.set_part("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec());
    package.set_part("word/styles.xml", STYLES.as_bytes().to_vec());
    package.to_bytes()
}

/// Writes the sample template to `path`, replacing any existing file.
pub fn create_sample_template(path: impl AsRef<Path>) -> Result<(), TemplateError> {
    let pending = PendingOutput::create(path.as_ref())?;
    pending.commit(&sample_template()?)
}

fn grid<const N: usize>(rows: &[[&str; N]]) -> Table {
    let mut grid = XmlElement::new("w:tblGrid");
    for _ in 0..N {
        grid = grid.with_child(XmlElement::new("w:gridCol").with_attribute("w:w", &GRID_COLUMN_TWIPS.to_string()));
    }

    let mut table = XmlElement::new("w:tbl")
        .with_child(
            XmlElement::new("w:tblPr")
                .with_child(XmlElement::new("w:tblStyle").with_attribute("w:val", "TableGrid"))
                .with_child(XmlElement::new("w:tblW").with_attribute("w:w", "0").with_attribute("w:type", "auto")),
        )
        .with_child(grid);

    for cells in rows {
        let mut row = XmlElement::new("w:tr");
        for text in cells {
            let cell = XmlElement::new("w:tc")
                .with_child(
                    XmlElement::new("w:tcPr").with_child(
                        XmlElement::new("w:tcW")
                            .with_attribute("w:w", &GRID_COLUMN_TWIPS.to_string())
                            .with_attribute("w:type", "dxa"),
                    ),
                )
                .with_child(Paragraph::new(text).to_element());
            row = row.with_child(cell);
        }
        table = table.with_child(row);
    }

    Table::from_element(table)
}

fn section_properties() -> XmlElement {
    XmlElement::new("w:sectPr")
        .with_child(
            XmlElement::new("w:pgSz")
                .with_attribute("w:w", "11906")
                .with_attribute("w:h", "16838"),
        )
        .with_child(
            XmlElement::new("w:pgMar")
                .with_attribute("w:top", "1134")
                .with_attribute("w:right", "1134")
                .with_attribute("w:bottom", "1134")
                .with_attribute("w:left", "1134")
                .with_attribute("w:header", "708")
                .with_attribute("w:footer", "708")
                .with_attribute("w:gutter", "0"),
        )
}
