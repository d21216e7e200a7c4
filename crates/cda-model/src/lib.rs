//! Data model for facts extracted from CDA clinical documents.

pub mod document;
pub mod error;
pub mod observation;
pub mod timestamp;

pub use document::{C32_TEMPLATE_ID, CCDA_TEMPLATE_ID, DocumentKind};
pub use error::{InvalidTimestamp, Result, TimestampError};
pub use observation::{ObservationGroup, ResultRecord};
pub use timestamp::{PartialTimestamp, Precision};
