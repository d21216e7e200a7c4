//! Error types for document loading and section extraction.

use std::path::PathBuf;

use cda_model::TimestampError;
use thiserror::Error;

/// Errors raised while building a [`Document`](crate::Document) from XML.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// The XML is not well formed or could not be decoded.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening a document file failed.
    #[error("Failed to open document {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input contains no element at all.
    #[error("Document has no root element")]
    Empty,

    /// A second top-level element follows the root.
    #[error("Unexpected top-level element '{name}' after the root element")]
    MultipleRoots { name: String },

    /// An end tag closes an element that is not open.
    #[error("Unexpected end tag '{name}'")]
    UnexpectedEnd { name: String },

    /// The input ends while elements are still open.
    #[error("Element '{name}' is not closed")]
    Unclosed { name: String },
}

impl DocumentError {
    pub(crate) fn xml(error: impl Into<quick_xml::Error>) -> Self {
        Self::Xml(error.into())
    }
}

/// Errors raised while extracting a section.
///
/// A missing section, entry, component or attribute is never an error; it
/// shows up as an empty list or a `None` field instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// An entry's `effectiveTime/@value` is present but malformed.
    #[error("Section {template_id}, entry {entry}: {source}")]
    Timestamp {
        /// Template identifier of the section being extracted.
        template_id: String,
        /// Zero-based index of the `entry` element in document order,
        /// counting entries that yield no group.
        entry: usize,
        #[source]
        source: TimestampError,
    },
}

/// Result type alias for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
