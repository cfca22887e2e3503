pub mod config;
pub mod error;
pub mod mapping;
pub mod report;
pub mod scanner;
pub mod substitute;

use std::path::Path;

use tracing::info;

use crate::document::output::output_directory;
use crate::document::{Document, PendingOutput};

pub use config::{EngineConfig, ListConfig};
pub use error::TemplateError;
pub use mapping::{Mapping, Value};
pub use report::SubstitutionReport;
pub use scanner::{collect_markers, extract_placeholders, markers_in_text};
pub use substitute::{substitute, PassStats, Substitutor};

/// Fills the template at `input` and writes the result to `output`.
///
/// Checked in order, before the document is touched: the two paths differ,
/// the template exists, the output directory accepts a new file. The output
/// path only ever holds a complete document; on any failure it is left as
/// it was.
pub fn replace_placeholders(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mapping: &Mapping,
    config: &EngineConfig,
) -> Result<SubstitutionReport, TemplateError> {
    let (input, output) = (input.as_ref(), output.as_ref());

    if input == output {
        return Err(TemplateError::SamePath(output.to_path_buf()));
    }
    if !input.exists() {
        return Err(TemplateError::FileNotFound(input.to_path_buf()));
    }
    if same_file(input, output) {
        return Err(TemplateError::SamePath(output.to_path_buf()));
    }

    let pending = PendingOutput::create(output)?;
    let mut document = Document::open(input)?;
    let report = substitute(&mut document, mapping, config);
    report.log();

    pending.commit(&document.to_bytes()?)?;
    info!(input = %input.display(), output = %output.display(), "template filled");
    Ok(report)
}

/// In-memory variant of [`replace_placeholders`].
pub fn fill_bytes(
    template: &[u8],
    mapping: &Mapping,
    config: &EngineConfig,
) -> Result<(Vec<u8>, SubstitutionReport), TemplateError> {
    let mut document = Document::from_bytes(template)?;
    let report = substitute(&mut document, mapping, config);
    report.log();
    Ok((document.to_bytes()?, report))
}

/// Sorted placeholders of the template at `path`.
pub fn scan_template(path: impl AsRef<Path>) -> Result<Vec<String>, TemplateError> {
    Ok(extract_placeholders(&Document::open(path)?))
}

/// Whether two different spellings name the same file. The output may not
/// exist yet, so its directory is resolved instead.
fn same_file(input: &Path, output: &Path) -> bool {
    let Ok(input) = input.canonicalize() else {
        return false;
    };
    if let Ok(output) = output.canonicalize() {
        return input == output;
    }
    let Some(name) = output.file_name() else {
        return false;
    };
    output_directory(output)
        .canonicalize()
        .map(|dir| dir.join(name) == input)
        .unwrap_or(false)
}
