//! Field-level mapping types

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Declared type of a mapping section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Short string, width-normalized
    String,
    /// Long free-form text, Shift_JIS-sanitized
    Text,
    /// Whole number, optionally clamped
    Integer,
    /// Calendar date
    Date,
    /// Timestamp with offset
    DateTime,
}

impl FieldType {
    /// All section types in column order
    pub const ALL: [FieldType; 5] = [
        FieldType::String,
        FieldType::Text,
        FieldType::Integer,
        FieldType::Date,
        FieldType::DateTime,
    ];

    /// Config key prefix for this section
    pub fn prefix(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
        }
    }

    /// Split a section key like `integer2` into its type and suffix.
    ///
    /// `datetime` is checked before `date` so that `datetime_en` is not
    /// read as a `date` section with suffix `time_en`.
    pub fn parse_section_key(key: &str) -> Option<(FieldType, &str)> {
        const LONGEST_FIRST: [FieldType; 5] = [
            FieldType::DateTime,
            FieldType::Integer,
            FieldType::String,
            FieldType::Text,
            FieldType::Date,
        ];
        LONGEST_FIRST
            .iter()
            .find_map(|ty| key.strip_prefix(ty.prefix()).map(|suffix| (*ty, suffix)))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Exact-match lookup table applied to a raw cell before parsing
pub type ConversionTable = HashMap<String, String>;

/// Inclusive integer range applied after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clamp {
    pub min: i64,
    pub max: i64,
}

impl Clamp {
    /// Range used for comprehensive evaluation scores
    pub const EVALUATION_SCORE: Clamp = Clamp { min: 0, max: 100 };

    pub fn new(min: i64, max: i64) -> Self {
        Clamp { min, max }
    }

    /// Clamp a parsed value into the range
    pub fn apply(&self, value: i64) -> i64 {
        value.max(self.min).min(self.max)
    }
}

/// How one destination column is filled from the source row
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Normalized spreadsheet header to read from
    pub source_header: String,
    /// Optional value substitution, shared between fields of one section
    pub conversion: Option<Arc<ConversionTable>>,
    /// Optional post-parse range for integer fields
    pub clamp: Option<Clamp>,
}

impl FieldSpec {
    /// Create a plain field reading from `source_header`
    pub fn new(source_header: impl Into<String>) -> Self {
        FieldSpec {
            source_header: source_header.into(),
            conversion: None,
            clamp: None,
        }
    }

    /// Attach a conversion table
    pub fn with_conversion(mut self, conversion: ConversionTable) -> Self {
        self.conversion = Some(Arc::new(conversion));
        self
    }

    /// Attach a clamp range
    pub fn with_clamp(mut self, clamp: Clamp) -> Self {
        self.clamp = Some(clamp);
        self
    }
}
