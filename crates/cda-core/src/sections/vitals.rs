//! Vital signs section.

use cda_model::ObservationGroup;

use crate::document::Document;
use crate::error::Result;
use crate::extract::SectionLayout;

use super::SectionMapping;

/// C-CDA Vital Signs Section (entries required).
pub const SECTION_TEMPLATE_ID: &str = "2.16.840.1.113883.10.20.22.2.4.1";

/// Vitals with components directly under each entry.
pub const VITALS: SectionMapping = SectionMapping {
    name: "vitals",
    description: "Vital signs, components directly under each entry",
    template_id: SECTION_TEMPLATE_ID,
    layout: SectionLayout::FLAT,
};

/// Vitals recorded through a vital signs organizer.
pub const VITALS_ORGANIZER: SectionMapping = SectionMapping {
    name: "vitals-organizer",
    description: "Vital signs, entry/organizer with component/observation results",
    template_id: SECTION_TEMPLATE_ID,
    layout: SectionLayout::ORGANIZER,
};

/// Extracts the vital signs recorded in `document`.
pub fn process(document: &Document) -> Result<Vec<ObservationGroup>> {
    VITALS.extract(document)
}
