//! Mapping references -> resolved mappings and language variant sets

use serde_json::Value as JsonValue;

use crate::enquete::convert::{Vocabularies, normalize_discriminator, normalize_str};
use crate::enquete::{ConfigError, LanguageVariants, MappingDefinition};

use super::catalog::{DEFAULT_MAPPING, MappingCatalog};
use super::normalize::normalize_mapping;

/// Drop null and blank-string references
pub fn sanitize_reference(reference: Option<&JsonValue>) -> Option<&JsonValue> {
    match reference {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

/// Resolve a mapping reference against a merged catalog.
///
/// `None` means `"default"`, a string is looked up by name and a map is an
/// inline definition. Root-level shared conversions are merged in before
/// normalization, the mapping's own entries winning.
pub fn resolve_mapping(
    catalog: &MappingCatalog,
    reference: Option<&JsonValue>,
    vocabularies: &Vocabularies,
) -> Result<MappingDefinition, ConfigError> {
    let raw = match sanitize_reference(reference) {
        None => lookup(catalog, DEFAULT_MAPPING)?,
        Some(JsonValue::String(name)) => lookup(catalog, name.trim())?,
        Some(inline @ JsonValue::Object(_)) => inline,
        Some(other) => {
            return Err(ConfigError::InvalidReference(format!(
                "expected a mapping name or definition, got {}",
                other
            )));
        }
    };

    let mut merged = match raw {
        JsonValue::Object(map) => map.clone(),
        JsonValue::Null => serde_json::Map::new(),
        other => {
            return Err(ConfigError::InvalidReference(format!(
                "mapping entries must be maps, got {}",
                other
            )));
        }
    };
    for (key, value) in catalog.shared_conversions() {
        merged.entry(key.clone()).or_insert_with(|| value.clone());
    }

    normalize_mapping(&JsonValue::Object(merged), vocabularies)
}

fn lookup<'a>(catalog: &'a MappingCatalog, name: &str) -> Result<&'a JsonValue, ConfigError> {
    catalog
        .get(name)
        .ok_or_else(|| ConfigError::UnknownMapping(name.to_string()))
}

/// Resolve a language variant set.
///
/// `language_mappings` maps discriminator values to mapping references. The
/// fallback comes from an explicit `"default"` variant or, failing that, from
/// the plain mapping reference. An implicit reference that does not resolve
/// only leaves the set without a fallback; the set fails when it ends up
/// with neither variants nor a fallback.
pub fn resolve_language_variants(
    catalog: &MappingCatalog,
    column: &str,
    language_mappings: Option<&JsonValue>,
    default_reference: Option<&JsonValue>,
    vocabularies: &Vocabularies,
) -> Result<LanguageVariants, ConfigError> {
    let column = normalize_str(column);
    let mut variants = LanguageVariants::new(column.clone());

    match language_mappings {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::Object(entries)) => {
            for (discriminator, reference) in entries {
                let mapping = resolve_mapping(catalog, Some(reference), vocabularies)?;
                if normalize_discriminator(discriminator) == DEFAULT_MAPPING {
                    variants.default = Some(mapping);
                } else {
                    variants.add_variant(discriminator, mapping);
                }
            }
        }
        Some(_) => {
            return Err(ConfigError::InvalidReference(
                "language_mappings must be a map of language -> mapping".to_string(),
            ));
        }
    }

    if variants.default.is_none() {
        let reference = sanitize_reference(default_reference);
        match resolve_mapping(catalog, reference, vocabularies) {
            Ok(mapping) => variants.default = Some(mapping),
            Err(ConfigError::UnknownMapping(name)) if reference.is_none() => {
                log::debug!(
                    "No '{}' mapping for language column '{}', rows without a variant will be skipped",
                    name,
                    column
                );
            }
            Err(err) => return Err(err),
        }
    }

    if variants.is_empty() {
        return Err(ConfigError::NoLanguageMapping { column });
    }
    Ok(variants)
}
