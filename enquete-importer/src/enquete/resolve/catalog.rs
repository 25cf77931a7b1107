//! Layered mapping catalogs

use serde_json::{Map, Value as JsonValue};

use crate::enquete::{ConfigError, FieldType};

/// Key prefix of conversion-table entries
pub const CONVERSION_PREFIX: &str = "conversion";
/// Key prefix of clamp-range entries
pub const CLAMP_PREFIX: &str = "clamp";
/// Catalog entry used when no mapping is referenced
pub const DEFAULT_MAPPING: &str = "default";

/// `string`, `integer2`, `datetime_en`, ...
pub fn is_section_key(key: &str) -> bool {
    FieldType::parse_section_key(key).is_some()
}

/// `conversion`, `conversion2`, ...
pub fn is_conversion_key(key: &str) -> bool {
    key.starts_with(CONVERSION_PREFIX)
}

/// `clamp`, `clamp2`, ...
pub fn is_clamp_key(key: &str) -> bool {
    key.starts_with(CLAMP_PREFIX)
}

/// A map whose keys are all section, conversion or clamp keys.
///
/// Such a map is a bare mapping definition rather than a catalog of named
/// mappings. The empty map counts as a definition.
pub fn is_mapping_definition(value: &JsonValue) -> bool {
    match value.as_object() {
        Some(map) => map
            .keys()
            .all(|k| is_section_key(k) || is_conversion_key(k) || is_clamp_key(k)),
        None => false,
    }
}

/// Named mappings merged from several layers, later layers winning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingCatalog {
    entries: Map<String, JsonValue>,
}

impl MappingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold layers left to right (global, organization, location)
    pub fn from_layers<'a, I>(layers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a JsonValue>)>,
    {
        layers
            .into_iter()
            .try_fold(MappingCatalog::new(), |mut catalog, (name, layer)| {
                catalog.merge_layer(name, layer)?;
                Ok(catalog)
            })
    }

    /// Merge one layer over the current entries.
    ///
    /// A bare mapping definition becomes this layer's `"default"` entry.
    pub fn merge_layer(&mut self, name: &str, layer: Option<&JsonValue>) -> Result<(), ConfigError> {
        let layer = match layer {
            None | Some(JsonValue::Null) => return Ok(()),
            Some(layer) => layer,
        };
        let Some(map) = layer.as_object() else {
            return Err(ConfigError::InvalidCatalog(name.to_string()));
        };
        if map.is_empty() {
            return Ok(());
        }

        if is_mapping_definition(layer) {
            log::debug!("Catalog layer '{}' is a bare mapping, using it as default", name);
            self.entries
                .insert(DEFAULT_MAPPING.to_string(), layer.clone());
            return Ok(());
        }

        for (key, value) in map {
            self.entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.entries.get(name)
    }

    /// Root-level `conversion*` entries shared by every mapping
    pub fn shared_conversions(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.entries.iter().filter(|(k, _)| is_conversion_key(k))
    }

    /// Names of the mapping entries, excluding shared conversions
    pub fn mapping_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(|k| !is_conversion_key(k))
            .map(String::as_str)
    }
}
