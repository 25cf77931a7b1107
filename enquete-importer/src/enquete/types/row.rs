//! Raw worksheet rows keyed by normalized header

use std::collections::{BTreeSet, HashMap};

use crate::enquete::ConfigError;
use crate::enquete::convert::normalize_cell;

/// One data row, restricted to the headers some mapping needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from header/value pairs, for tests and fixtures
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RawRow {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Cell under `header`, or `""` when the header is absent
    pub fn get(&self, header: &str) -> &str {
        self.cells.get(header).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(header.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Map normalized header -> column position.
///
/// The first occurrence of a duplicated header wins and blank headers are
/// ignored.
pub fn build_header_index(headers: &[serde_json::Value]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (position, header) in headers.iter().enumerate() {
        let normalized = normalize_cell(header);
        if normalized.is_empty() || index.contains_key(&normalized) {
            continue;
        }
        index.insert(normalized, position);
    }
    index
}

/// Turn a worksheet grid (header row first) into raw rows.
///
/// Fails with [`ConfigError::MissingHeaders`] when a required header is not
/// present. Rows that are blank across every cell are dropped; short rows
/// read as empty past their end.
pub fn rows_from_values(
    values: &[Vec<serde_json::Value>],
    required_headers: &BTreeSet<String>,
) -> Result<Vec<RawRow>, ConfigError> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Ok(Vec::new());
    };

    let header_index = build_header_index(header_row);
    let missing: Vec<String> = required_headers
        .iter()
        .filter(|h| !header_index.contains_key(*h))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingHeaders(missing));
    }

    let rows = data_rows
        .iter()
        .filter(|cells| cells.iter().any(|c| !normalize_cell(c).is_empty()))
        .map(|cells| {
            let mut row = RawRow::new();
            for header in required_headers {
                let cell = header_index
                    .get(header)
                    .and_then(|i| cells.get(*i))
                    .map(normalize_cell)
                    .unwrap_or_default();
                row.insert(header.clone(), cell);
            }
            row
        })
        .collect();

    Ok(rows)
}
