//! Options for the derived room/stay key

use serde::{Deserialize, Serialize};

/// Column looked up for the room identifier
pub const DEFAULT_ROOM_COLUMN: &str = "room_number";
/// Column looked up for the stay-start date
pub const DEFAULT_START_COLUMN: &str = "start_date";
/// Tie-break literal used when none is configured
pub const DEFAULT_TIE_BREAK: &str = "1";
/// Config value selecting the facility code as tie-break
pub const FACILITY_CODE_TIE_BREAK: &str = "facility_code";

/// Last segment of the derived key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Fixed text, `"1"` unless configured otherwise
    Literal(String),
    /// The facility code of the row being imported
    FacilityCode,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::Literal(DEFAULT_TIE_BREAK.to_string())
    }
}

impl TieBreak {
    /// Parse the `enquete_key_tie_break` setting
    pub fn from_setting(value: &str) -> Self {
        if value == FACILITY_CODE_TIE_BREAK {
            TieBreak::FacilityCode
        } else {
            TieBreak::Literal(value.to_string())
        }
    }

    /// Render for a given facility
    pub fn render(&self, facility_code: i64) -> String {
        match self {
            TieBreak::Literal(literal) => literal.clone(),
            TieBreak::FacilityCode => facility_code.to_string(),
        }
    }
}

/// Everything the key builder needs beyond the row and mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOptions {
    /// Literal prepended as-is
    pub prefix: Option<String>,
    /// Literal appended after a `-`
    pub suffix: Option<String>,
    pub tie_break: TieBreak,
    pub room_column: String,
    pub start_column: String,
}

impl Default for KeyOptions {
    fn default() -> Self {
        KeyOptions {
            prefix: None,
            suffix: None,
            tie_break: TieBreak::default(),
            room_column: DEFAULT_ROOM_COLUMN.to_string(),
            start_column: DEFAULT_START_COLUMN.to_string(),
        }
    }
}

impl KeyOptions {
    /// Assemble the final key from its parsed parts
    pub fn format(&self, room: &str, start: chrono::NaiveDate, facility_code: i64) -> String {
        let mut key = format!(
            "{}-{}-{}",
            room,
            start.format("%Y%m%d"),
            self.tie_break.render(facility_code)
        );
        if let Some(prefix) = self.prefix.as_deref().filter(|p| !p.is_empty()) {
            key = format!("{}{}", prefix, key);
        }
        if let Some(suffix) = self.suffix.as_deref().filter(|s| !s.is_empty()) {
            key = format!("{}-{}", key, suffix);
        }
        key
    }
}
