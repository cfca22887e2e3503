use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::xml::XmlError;

/// Failures of loading, filling or saving a template.
///
/// The first three kinds are the ones callers are expected to present to a
/// user; the rest describe a broken template or an unexpected I/O failure.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Output path is the same file as the template: {0}")]
    SamePath(PathBuf),

    #[error("Output directory is not writable: {dir}")]
    OutputNotWritable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TemplateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::FileNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TemplateError::SamePath(_))
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, TemplateError::OutputNotWritable { .. })
    }
}

impl From<XmlError> for TemplateError {
    fn from(err: XmlError) -> Self {
        TemplateError::MalformedDocument(err.to_string())
    }
}

impl From<zip::result::ZipError> for TemplateError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => TemplateError::Io(io_err),
            other => TemplateError::MalformedDocument(other.to_string()),
        }
    }
}
