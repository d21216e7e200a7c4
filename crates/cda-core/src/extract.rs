//! Generic section extraction.
//!
//! Every clinical section that records measured results has the same
//! shape: a section element found by template id, repeated entries each
//! stamped with an `effectiveTime`, and repeated components each carrying a
//! `code` and a `value`. Sections differ only in where those elements sit,
//! which a [`SectionLayout`] declares as tag paths.

use cda_model::{ObservationGroup, PartialTimestamp, ResultRecord, TimestampError};
use tracing::{debug, debug_span, warn};

use crate::document::{Document, Node};
use crate::error::{ExtractError, Result};
use crate::template::find_by_template;
use crate::timestamp::parse_timestamp;

/// Where entries, timestamps and results live inside a section.
///
/// Every path is a sequence of local tag names followed from the previous
/// level. An empty path means "this element".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    /// From the section element to each entry.
    pub entry_path: &'static [&'static str],
    /// From an entry to the element describing one observation event.
    /// Entries without it contribute no group.
    pub event_path: &'static [&'static str],
    /// From the event to the element whose `value` attribute is its timestamp.
    pub effective_time_path: &'static [&'static str],
    /// From the event to each component (one measured result).
    pub component_path: &'static [&'static str],
    /// From a component to the element holding the `code` and `value` children.
    pub result_path: &'static [&'static str],
}

impl SectionLayout {
    /// Components sit directly under the entry and hold `code`/`value`
    /// themselves.
    pub const FLAT: Self = Self {
        entry_path: &["entry"],
        event_path: &[],
        effective_time_path: &["effectiveTime"],
        component_path: &["component"],
        result_path: &[],
    };

    /// C-CDA result organizer: `entry/organizer` carries the timestamp and
    /// each `component/observation` carries one result. An `entry` with no
    /// `organizer` is skipped but still counts towards entry indices.
    pub const ORGANIZER: Self = Self {
        entry_path: &["entry"],
        event_path: &["organizer"],
        effective_time_path: &["effectiveTime"],
        component_path: &["component"],
        result_path: &["observation"],
    };
}

/// What to do with an entry whose timestamp is present but malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Abort extraction with [`ExtractError::Timestamp`].
    #[default]
    Fail,
    /// Leave the entry out of the result.
    SkipEntry,
    /// Keep the entry with no date.
    TreatAsAbsent,
}

/// Options controlling extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub on_malformed_timestamp: TimestampPolicy,
}

impl ExtractOptions {
    #[must_use]
    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.on_malformed_timestamp = policy;
        self
    }
}

/// Extracts the section declaring `template_id`, failing on malformed
/// timestamps.
///
/// A document without the section yields an empty list.
pub fn extract(
    document: &Document,
    template_id: &str,
    layout: &SectionLayout,
) -> Result<Vec<ObservationGroup>> {
    extract_with_options(document, template_id, layout, &ExtractOptions::default())
}

/// Extracts the section declaring `template_id`.
pub fn extract_with_options(
    document: &Document,
    template_id: &str,
    layout: &SectionLayout,
    options: &ExtractOptions,
) -> Result<Vec<ObservationGroup>> {
    let span = debug_span!("extract", template_id = %template_id);
    let _guard = span.enter();

    let Some(section) = find_by_template(document.root(), template_id) else {
        debug!("section not present");
        return Ok(Vec::new());
    };

    let entries = section.all_by_path(layout.entry_path);
    let mut groups = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(event) = entry.first_by_path(layout.event_path) else {
            debug!(entry = index, "entry has no observation event");
            continue;
        };
        let date = match entry_date(&event, layout) {
            Ok(date) => date,
            Err(source) => match options.on_malformed_timestamp {
                TimestampPolicy::Fail => {
                    return Err(ExtractError::Timestamp {
                        template_id: template_id.to_string(),
                        entry: index,
                        source,
                    });
                }
                TimestampPolicy::SkipEntry => {
                    warn!(entry = index, "skipping entry with malformed effectiveTime");
                    continue;
                }
                TimestampPolicy::TreatAsAbsent => {
                    warn!(entry = index, "ignoring malformed effectiveTime");
                    None
                }
            },
        };
        let results = event
            .all_by_path(layout.component_path)
            .iter()
            .map(|component| read_result(component, layout))
            .collect();
        groups.push(ObservationGroup::new(date, results));
    }

    debug!(
        entries = entries.len(),
        groups = groups.len(),
        "section extracted"
    );
    Ok(groups)
}

fn entry_date(
    event: &Node<'_>,
    layout: &SectionLayout,
) -> std::result::Result<Option<PartialTimestamp>, TimestampError> {
    let value = event
        .first_by_path(layout.effective_time_path)
        .and_then(|time| time.attribute("value"));
    parse_timestamp(value)
}

fn read_result(component: &Node<'_>, layout: &SectionLayout) -> ResultRecord {
    let holder = component.first_by_path(layout.result_path);
    let code = holder.and_then(|node| node.first_child_by_tag("code"));
    let value = holder.and_then(|node| node.first_child_by_tag("value"));
    let code_attr = |name: &str| code.and_then(|node| node.attribute(name)).map(str::to_owned);
    let value_attr = |name: &str| value.and_then(|node| node.attribute(name)).map(str::to_owned);
    ResultRecord {
        name: code_attr("displayName"),
        code: code_attr("code"),
        code_system: code_attr("codeSystem"),
        code_system_name: code_attr("codeSystemName"),
        value: value_attr("value"),
        unit: value_attr("unit"),
    }
}
