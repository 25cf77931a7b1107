//! Lookup-table substitution and the built-in vocabularies

use std::sync::Arc;

use indexmap::IndexMap;

use crate::enquete::ConversionTable;

/// Name under which the English rating and yes/no vocabulary is exposed
pub const ENGLISH_TO_JAPANESE: &str = "english_to_japanese";

const RATING_WORDS: [(&str, &str); 5] = [
    ("Very Good", "非常に良い"),
    ("Good", "良い"),
    ("Average", "普通"),
    ("Poor", "悪い"),
    ("Very Poor", "非常に悪い"),
];

const YES_NO_WORDS: [(&str, &str); 2] = [("Yes", "はい"), ("No", "いいえ")];

/// Substitute `value` through `table`.
///
/// Values without an entry pass through unchanged and empty values bypass
/// the table entirely.
pub fn apply_conversion(value: &str, table: Option<&ConversionTable>) -> String {
    match table {
        Some(table) if !value.is_empty() => table
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
    }
}

/// Named conversion tables that configuration can refer to by name
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabularies {
    tables: IndexMap<String, Arc<ConversionTable>>,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabularies {
    /// The fixed vocabularies shipped with the importer
    pub fn builtin() -> Self {
        let english: ConversionTable = RATING_WORDS
            .iter()
            .chain(YES_NO_WORDS.iter())
            .map(|(en, ja)| (en.to_string(), ja.to_string()))
            .collect();

        let mut tables = IndexMap::new();
        tables.insert(ENGLISH_TO_JAPANESE.to_string(), Arc::new(english));
        Vocabularies { tables }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConversionTable>> {
        self.tables.get(name).cloned()
    }
}
