use std::fmt;

use serde::{Deserialize, Serialize};

/// Template identifier declared on the header of an HL7 C32 document.
pub const C32_TEMPLATE_ID: &str = "2.16.840.1.113883.3.88.11.32.1";

/// Template identifier declared on the header of a Consolidated CDA document.
pub const CCDA_TEMPLATE_ID: &str = "2.16.840.1.113883.10.20.22.1.1";

/// Family of clinical document, as declared by its header templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    C32,
    Ccda,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::C32 => "c32",
            Self::Ccda => "ccda",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
