//! Location settings -> import jobs

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::enquete::convert::Vocabularies;
use crate::enquete::{ConfigError, ImportJob, MappingDefinition, MappingSelector};

use super::catalog::{MappingCatalog, is_mapping_definition};
use super::mapping::{resolve_language_variants, resolve_mapping, sanitize_reference};
use super::normalize::apply_value_conversions;

/// Everything a location contributes to job resolution
#[derive(Debug, Clone, Copy)]
pub struct JobSettings<'a> {
    pub catalog: &'a MappingCatalog,
    /// Plain mapping reference (location first, then organization)
    pub mapping_reference: Option<&'a JsonValue>,
    /// Table used by jobs that do not override it
    pub default_table: &'a str,
    pub imports: Option<&'a JsonValue>,
    pub language_column: Option<&'a str>,
    pub language_mappings: Option<&'a JsonValue>,
    pub value_conversions: Option<&'a JsonValue>,
}

impl<'a> JobSettings<'a> {
    pub fn new(catalog: &'a MappingCatalog, default_table: &'a str) -> Self {
        JobSettings {
            catalog,
            mapping_reference: None,
            default_table,
            imports: None,
            language_column: None,
            language_mappings: None,
            value_conversions: None,
        }
    }
}

/// One `imports` entry after classification
struct JobEntry<'a> {
    table: String,
    reference: Option<&'a JsonValue>,
    language_column: Option<&'a str>,
    language_mappings: Option<&'a JsonValue>,
}

/// Resolve the import jobs of one location.
///
/// Without `imports` there is exactly one job. Otherwise each entry is
/// either a job descriptor (`table`, `mapping`, language keys), a mapping
/// name, or an inline mapping definition, and resolves on its own.
pub fn resolve_jobs(
    settings: &JobSettings<'_>,
    vocabularies: &Vocabularies,
) -> Result<Vec<ImportJob>, ConfigError> {
    let items = match settings.imports {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Array(items)) if !items.is_empty() => Some(items),
        Some(JsonValue::Array(_)) => None,
        Some(_) => {
            return Err(ConfigError::InvalidImports(
                "'imports' must be a list".to_string(),
            ));
        }
    };

    let entries: Vec<JobEntry<'_>> = match items {
        Some(items) => items
            .iter()
            .map(|item| classify_entry(item, settings))
            .collect(),
        None => vec![JobEntry {
            table: settings.default_table.to_string(),
            reference: sanitize_reference(settings.mapping_reference),
            language_column: settings.language_column,
            language_mappings: settings.language_mappings,
        }],
    };

    entries
        .into_iter()
        .map(|entry| resolve_entry(entry, settings, vocabularies))
        .collect()
}

fn classify_entry<'a>(item: &'a JsonValue, settings: &JobSettings<'a>) -> JobEntry<'a> {
    let descriptor = item.as_object().filter(|_| !is_mapping_definition(item));
    match descriptor {
        Some(map) => JobEntry {
            table: map
                .get("table")
                .and_then(JsonValue::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(settings.default_table)
                .to_string(),
            reference: if map.contains_key("mapping") {
                sanitize_reference(map.get("mapping"))
            } else {
                Some(item)
            },
            language_column: map
                .get("language_column")
                .and_then(JsonValue::as_str)
                .or(settings.language_column),
            language_mappings: map.get("language_mappings").or(settings.language_mappings),
        },
        None => JobEntry {
            table: settings.default_table.to_string(),
            reference: sanitize_reference(Some(item)),
            language_column: settings.language_column,
            language_mappings: settings.language_mappings,
        },
    }
}

fn resolve_entry(
    entry: JobEntry<'_>,
    settings: &JobSettings<'_>,
    vocabularies: &Vocabularies,
) -> Result<ImportJob, ConfigError> {
    let label = match entry.reference {
        Some(JsonValue::String(name)) => Some(name.trim().to_string()),
        _ => None,
    };

    let language_column = entry
        .language_column
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let selector = match language_column {
        Some(column) => {
            let mut variants = resolve_language_variants(
                settings.catalog,
                column,
                entry.language_mappings,
                entry.reference,
                vocabularies,
            )?;
            if let Some(overrides) = settings.value_conversions {
                for mapping in variants.variants.values_mut() {
                    apply_value_conversions(mapping, overrides, vocabularies)?;
                }
                if let Some(mapping) = variants.default.as_mut() {
                    apply_value_conversions(mapping, overrides, vocabularies)?;
                }
            }
            MappingSelector::ByLanguage(variants)
        }
        None => {
            let mut mapping = resolve_mapping(settings.catalog, entry.reference, vocabularies)?;
            if let Some(overrides) = settings.value_conversions {
                apply_value_conversions(&mut mapping, overrides, vocabularies)?;
            }
            MappingSelector::Single(mapping)
        }
    };

    Ok(ImportJob::new(entry.table, selector).with_label(label))
}

/// Headers needed by any job, fetched once per location
pub fn required_headers(jobs: &[ImportJob]) -> BTreeSet<String> {
    jobs.iter()
        .flat_map(|job| job.selector.required_headers())
        .collect()
}
