use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use tracing::{info, info_span, trace};

use cda_core::{Document, ExtractOptions, SectionMapping, detect, extract_with_options};
use cda_model::{DocumentKind, ObservationGroup};

use crate::cli::{DetectArgs, ExtractArgs};
use crate::logging::redact_value;

/// Runs `cda extract` and returns the JSON to print.
pub fn run_extract(args: &ExtractArgs) -> Result<String> {
    let groups = extract_groups(args)?;
    let json = if args.compact {
        serde_json::to_string(&groups)
    } else {
        serde_json::to_string_pretty(&groups)
    };
    json.context("serialize extracted section")
}

/// Loads the document named by `args` and extracts the requested section.
pub fn extract_groups(args: &ExtractArgs) -> Result<Vec<ObservationGroup>> {
    let mapping = SectionMapping::by_name(&args.section).ok_or_else(|| {
        anyhow!(
            "unknown section '{}' (run `cda sections` for the list)",
            args.section
        )
    })?;
    let template_id = args.template_id.as_deref().unwrap_or(mapping.template_id);
    let span = info_span!(
        "extract",
        file = %args.file.display(),
        section = mapping.name,
        template_id = %template_id
    );
    let _guard = span.enter();

    let document = Document::open(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    let options = ExtractOptions::default().with_timestamp_policy(args.on_malformed.into());
    let groups = extract_with_options(&document, template_id, &mapping.layout, &options)
        .with_context(|| format!("extract section '{}'", mapping.name))?;

    for (index, group) in groups.iter().enumerate() {
        for result in &group.results {
            trace!(
                entry = index,
                code = redact_value(result.code.as_deref().unwrap_or_default()),
                value = redact_value(result.value.as_deref().unwrap_or_default()),
                "result"
            );
        }
    }
    let result_count: usize = groups.iter().map(|group| group.results.len()).sum();
    info!(
        entries = groups.len(),
        results = result_count,
        "extraction complete"
    );
    Ok(groups)
}

/// Runs `cda detect`.
pub fn run_detect(args: &DetectArgs) -> Result<DocumentKind> {
    let document = Document::open(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    Ok(detect(&document))
}

/// Table of built-in section mappings for `cda sections`.
pub fn sections_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Section", "Template ID", "Description"]);
    for mapping in SectionMapping::builtin() {
        table.add_row(vec![mapping.name, mapping.template_id, mapping.description]);
    }
    table
}
