//! Section extraction engine for CDA/CCD clinical documents.
//!
//! The engine locates a section by template id, walks its entries and
//! components in document order, and reads codified results without
//! inventing values for missing attributes. All operations are pure reads
//! of an immutable [`Document`]; extractors may run on the same document
//! from several threads.

pub mod document;
pub mod error;
pub mod extract;
pub mod sections;
pub mod tags;
pub mod template;
pub mod timestamp;

pub use document::{Document, Node, NodeId};
pub use error::{DocumentError, ExtractError, Result};
pub use extract::{ExtractOptions, SectionLayout, TimestampPolicy, extract, extract_with_options};
pub use sections::SectionMapping;
pub use tags::local_part;
pub use template::{detect, find_by_template};
pub use timestamp::{parse_hl7, parse_timestamp};
