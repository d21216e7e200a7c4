//! Built-in section mappings.

pub mod vitals;

use cda_model::ObservationGroup;

use crate::document::Document;
use crate::error::Result;
use crate::extract::{ExtractOptions, SectionLayout, extract_with_options};

/// A named section kind: its template id and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMapping {
    pub name: &'static str,
    pub description: &'static str,
    pub template_id: &'static str,
    pub layout: SectionLayout,
}

impl SectionMapping {
    /// All mappings shipped with the crate.
    pub fn builtin() -> &'static [SectionMapping] {
        BUILTIN
    }

    /// Looks up a built-in mapping by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static SectionMapping> {
        BUILTIN
            .iter()
            .find(|mapping| mapping.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn extract(&self, document: &Document) -> Result<Vec<ObservationGroup>> {
        self.extract_with_options(document, &ExtractOptions::default())
    }

    pub fn extract_with_options(
        &self,
        document: &Document,
        options: &ExtractOptions,
    ) -> Result<Vec<ObservationGroup>> {
        extract_with_options(document, self.template_id, &self.layout, options)
    }
}

const BUILTIN: &[SectionMapping] = &[vitals::VITALS, vitals::VITALS_ORGANIZER];
