//! Import jobs: which mapping feeds which destination table

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::enquete::convert::normalize_discriminator;

use super::{Column, MappingDefinition, RawRow, with_generated};

/// Key of the fallback entry in a language variant set
pub const DEFAULT_VARIANT: &str = "default";

/// Mappings keyed by the normalized value of a discriminator column
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageVariants {
    /// Normalized header of the discriminator column
    pub column: String,
    /// Normalized discriminator value -> mapping
    pub variants: IndexMap<String, MappingDefinition>,
    /// Mapping used when no variant matches
    pub default: Option<MappingDefinition>,
}

impl LanguageVariants {
    pub fn new(column: impl Into<String>) -> Self {
        LanguageVariants {
            column: column.into(),
            variants: IndexMap::new(),
            default: None,
        }
    }

    /// Register a variant under its normalized discriminator value
    pub fn add_variant(&mut self, discriminator: &str, mapping: MappingDefinition) {
        self.variants
            .insert(normalize_discriminator(discriminator), mapping);
    }

    /// Pick the mapping for a raw discriminator value
    pub fn select(&self, discriminator: &str) -> Option<&MappingDefinition> {
        self.variants
            .get(&normalize_discriminator(discriminator))
            .or(self.default.as_ref())
    }

    /// All mappings, default first
    pub fn mappings(&self) -> impl Iterator<Item = &MappingDefinition> {
        self.default.iter().chain(self.variants.values())
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty() && self.default.is_none()
    }
}

/// The mapping (or mappings) a job applies to each row
#[derive(Debug, Clone, PartialEq)]
pub enum MappingSelector {
    /// Every row uses the same mapping
    Single(MappingDefinition),
    /// The mapping depends on a per-row discriminator value
    ByLanguage(LanguageVariants),
}

impl MappingSelector {
    /// Mapping for one row; `None` means the row is skipped
    pub fn select(&self, row: &RawRow) -> Option<&MappingDefinition> {
        match self {
            MappingSelector::Single(mapping) => Some(mapping),
            MappingSelector::ByLanguage(variants) => variants.select(row.get(&variants.column)),
        }
    }

    /// Union of the columns of every mapping, first appearance wins
    pub fn columns(&self) -> Vec<Column> {
        match self {
            MappingSelector::Single(mapping) => mapping.columns(),
            MappingSelector::ByLanguage(variants) => {
                let mut union: IndexMap<String, Column> = IndexMap::new();
                for mapping in variants.mappings() {
                    for column in mapping.mapped_columns() {
                        union.entry(column.name.clone()).or_insert(column);
                    }
                }
                with_generated(union.into_values().collect())
            }
        }
    }

    /// Headers needed from the worksheet, including the discriminator
    pub fn required_headers(&self) -> BTreeSet<String> {
        match self {
            MappingSelector::Single(mapping) => mapping.required_headers(),
            MappingSelector::ByLanguage(variants) => {
                let mut headers: BTreeSet<String> = variants
                    .mappings()
                    .flat_map(|m| m.required_headers())
                    .collect();
                if !variants.column.is_empty() {
                    headers.insert(variants.column.clone());
                }
                headers
            }
        }
    }
}

/// One (mapping, destination table) pair run against a facility's rows
#[derive(Debug, Clone, PartialEq)]
pub struct ImportJob {
    /// Destination table name
    pub table: String,
    pub selector: MappingSelector,
    /// Name of the referenced mapping, for logs
    pub mapping_label: Option<String>,
}

impl ImportJob {
    pub fn new(table: impl Into<String>, selector: MappingSelector) -> Self {
        ImportJob {
            table: table.into(),
            selector,
            mapping_label: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.mapping_label = label;
        self
    }

    /// Label shown in log lines
    pub fn label(&self) -> &str {
        self.mapping_label.as_deref().unwrap_or(DEFAULT_VARIANT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enquete::{FieldSpec, FieldType};

    fn mapping(column: &str, header: &str) -> MappingDefinition {
        let mut mapping = MappingDefinition::new();
        mapping.insert(FieldType::String, column, FieldSpec::new(header));
        mapping
    }

    #[test]
    fn test_select_variant_normalizes_discriminator() {
        let mut variants = LanguageVariants::new("言語");
        variants.add_variant("English", mapping("answer", "Q1"));
        variants.add_variant("日本語", mapping("answer", "設問1"));

        let selected = variants.select("  ＥＮＧＬＩＳＨ ").unwrap();
        assert_eq!(selected.string["answer"].source_header, "Q1");
        assert!(variants.select("中文").is_none());
    }

    #[test]
    fn test_select_falls_back_to_default() {
        let mut variants = LanguageVariants::new("言語");
        variants.add_variant("english", mapping("answer", "Q1"));
        variants.default = Some(mapping("answer", "設問1"));

        let selected = variants.select("中文").unwrap();
        assert_eq!(selected.string["answer"].source_header, "設問1");
    }

    #[test]
    fn test_language_columns_and_headers_union() {
        let mut variants = LanguageVariants::new("言語");
        variants.add_variant("english", mapping("answer_en", "Q1"));
        variants.default = Some(mapping("answer", "設問1"));
        let selector = MappingSelector::ByLanguage(variants);

        let names: Vec<String> = selector.columns().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["answer", "answer_en", "facility_code", "enquete_key", "import_date"]
        );

        let headers = selector.required_headers();
        assert!(headers.contains("Q1"));
        assert!(headers.contains("設問1"));
        assert!(headers.contains("言語"));
    }
}
