//! Raw mapping definition -> typed `MappingDefinition`

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::enquete::convert::{Vocabularies, normalize_cell};
use crate::enquete::{Clamp, ConfigError, ConversionTable, FieldSpec, FieldType, MappingDefinition};

use super::catalog::{CLAMP_PREFIX, CONVERSION_PREFIX, is_clamp_key, is_conversion_key};

/// Suffix that marks the comprehensive-evaluation score section
const EVALUATION_SCORE_SUFFIX: &str = "2";

/// Parse one conversion entry.
///
/// A map becomes a lookup table with trimmed keys and values, a string names
/// a built-in vocabulary and `null` means "no substitutions".
pub fn parse_conversion(
    key: &str,
    value: &JsonValue,
    vocabularies: &Vocabularies,
) -> Result<Arc<ConversionTable>, ConfigError> {
    match value {
        JsonValue::Null => Ok(Arc::new(ConversionTable::new())),
        JsonValue::String(name) => vocabularies
            .get(name.trim())
            .ok_or_else(|| ConfigError::InvalidConversion { key: key.to_string() }),
        JsonValue::Object(map) => {
            let mut table = ConversionTable::with_capacity(map.len());
            for (source, target) in map {
                if target.is_object() || target.is_array() {
                    return Err(ConfigError::InvalidConversion { key: key.to_string() });
                }
                table.insert(source.trim().to_string(), normalize_cell(target));
            }
            Ok(Arc::new(table))
        }
        _ => Err(ConfigError::InvalidConversion { key: key.to_string() }),
    }
}

/// Parse a `[min, max]` clamp entry; `null` disables clamping
fn parse_clamp(key: &str, value: &JsonValue) -> Result<Option<Clamp>, ConfigError> {
    let invalid = || ConfigError::InvalidClamp { key: key.to_string() };
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Array(bounds) if bounds.len() == 2 => {
            let min = bounds[0].as_i64().ok_or_else(invalid)?;
            let max = bounds[1].as_i64().ok_or_else(invalid)?;
            if min > max {
                return Err(invalid());
            }
            Ok(Some(Clamp::new(min, max)))
        }
        _ => Err(invalid()),
    }
}

/// Normalize a raw mapping definition.
///
/// Section keys carry a type prefix and an optional suffix; `conversion<suffix>`
/// and `clamp<suffix>` entries apply to the sections with the same suffix.
/// Keys that are none of these are ignored.
pub fn normalize_mapping(
    raw: &JsonValue,
    vocabularies: &Vocabularies,
) -> Result<MappingDefinition, ConfigError> {
    let Some(entries) = raw.as_object() else {
        return Err(ConfigError::InvalidReference(
            "a mapping definition must be a map of sections".to_string(),
        ));
    };

    let mut conversions: HashMap<&str, Arc<ConversionTable>> = HashMap::new();
    let mut clamps: HashMap<&str, Option<Clamp>> = HashMap::new();
    for (key, value) in entries {
        if is_conversion_key(key) {
            let suffix = &key[CONVERSION_PREFIX.len()..];
            conversions.insert(suffix, parse_conversion(key, value, vocabularies)?);
        } else if is_clamp_key(key) {
            let suffix = &key[CLAMP_PREFIX.len()..];
            clamps.insert(suffix, parse_clamp(key, value)?);
        }
    }

    let mut mapping = MappingDefinition::new();
    for (key, value) in entries {
        let Some((field_type, suffix)) = FieldType::parse_section_key(key) else {
            if !is_conversion_key(key) && !is_clamp_key(key) {
                log::debug!("Ignoring non-section mapping key '{}'", key);
            }
            continue;
        };

        let fields = match value {
            JsonValue::Null => continue,
            JsonValue::Object(fields) => fields,
            _ => return Err(ConfigError::InvalidSection { key: key.clone() }),
        };

        let clamp = match field_type {
            FieldType::Integer => match clamps.get(suffix) {
                Some(explicit) => *explicit,
                None if suffix == EVALUATION_SCORE_SUFFIX => Some(Clamp::EVALUATION_SCORE),
                None => None,
            },
            _ => None,
        };
        let conversion = conversions.get(suffix).cloned();

        for (column, header) in fields {
            if header.is_object() || header.is_array() {
                return Err(ConfigError::InvalidSection { key: key.clone() });
            }
            let spec = FieldSpec {
                source_header: normalize_cell(header),
                conversion: conversion.clone(),
                clamp,
            };
            mapping.insert(field_type, column.clone(), spec);
        }
    }

    Ok(mapping)
}

/// Apply per-column conversion overrides to every section declaring the column
pub fn apply_value_conversions(
    mapping: &mut MappingDefinition,
    overrides: &JsonValue,
    vocabularies: &Vocabularies,
) -> Result<(), ConfigError> {
    let Some(overrides) = overrides.as_object() else {
        if overrides.is_null() {
            return Ok(());
        }
        return Err(ConfigError::InvalidConversion {
            key: "value_conversions".to_string(),
        });
    };

    for (column, value) in overrides {
        let table = parse_conversion(column, value, vocabularies)?;
        let mut applied = false;
        for field_type in FieldType::ALL {
            if let Some(spec) = mapping.section_mut(field_type).get_mut(column) {
                spec.conversion = Some(table.clone());
                applied = true;
            }
        }
        if !applied {
            log::debug!("value_conversions: column '{}' is not mapped", column);
        }
    }
    Ok(())
}
