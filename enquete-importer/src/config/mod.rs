//! Configuration file loading and typed accessors
//!
//! The file is TOML or YAML (chosen by extension) and is read into an
//! order-preserving JSON value: mapping sections are free-form and their
//! key order decides the destination column order.

mod organization;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use crate::enquete::convert::normalize_cell;

pub use organization::{CorporationConfig, FacilityConfig, FacilityPlan};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// The whole importer configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    root: JsonValue,
    /// Directory relative workbook paths resolve against
    base_dir: PathBuf,
}

impl AppConfig {
    /// Load a TOML or YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let root = parse_config(&content, path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        log::debug!("Loaded config from {}", path.display());
        Ok(AppConfig { root, base_dir })
    }

    /// Wrap an already parsed value
    pub fn from_value(root: JsonValue) -> Self {
        AppConfig {
            root,
            base_dir: PathBuf::new(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Global mapping catalog
    pub fn mappings(&self) -> Option<&JsonValue> {
        self.root.get("mappings")
    }

    /// Worksheet used when a facility names none (`google.worksheet`)
    pub fn default_worksheet(&self) -> Option<String> {
        optional_string(self.root.get("google").and_then(|g| g.get("worksheet")))
    }

    /// Global time zone name
    pub fn timezone(&self) -> Option<String> {
        optional_string(self.root.get("timezone"))
    }

    /// Configured corporations in file order; at least one is required
    pub fn corporations(&self) -> Result<Vec<CorporationConfig<'_>>> {
        let Some(corporations) = self.root.get("corporations").and_then(JsonValue::as_object)
        else {
            bail!("No corporations configured. Please update the config file.");
        };
        if corporations.is_empty() {
            bail!("No corporations configured. Please update the config file.");
        }
        Ok(corporations
            .iter()
            .map(|(name, value)| CorporationConfig::new(self, name, value))
            .collect())
    }

    /// Reject corporation and facility filters that name nothing
    pub fn validate_filters(&self, corporations: &[String], facilities: &[String]) -> Result<()> {
        let configured = self.corporations()?;

        let known: BTreeSet<&str> = configured.iter().map(|c| c.name).collect();
        let unknown: BTreeSet<&str> = corporations
            .iter()
            .map(String::as_str)
            .filter(|c| !known.contains(c))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "Unknown corporation(s) specified: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        if facilities.is_empty() {
            return Ok(());
        }
        let mut valid: BTreeSet<String> = BTreeSet::new();
        for corporation in &configured {
            for facility in corporation.facilities() {
                valid.insert(facility.name.to_string());
                valid.insert(facility.filter_key());
            }
        }
        let unknown: BTreeSet<&str> = facilities
            .iter()
            .map(String::as_str)
            .filter(|f| !valid.contains(*f))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "Unknown facility filter(s) specified: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        Ok(())
    }
}

fn parse_config(content: &str, path: &Path) -> Result<JsonValue> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str::<JsonValue>(content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
        Some("json") => serde_json::from_str::<JsonValue>(content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
        _ => toml::from_str::<JsonValue>(content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
    }
}

/// A trimmed, non-empty string form of a scalar setting
pub fn optional_string(value: Option<&JsonValue>) -> Option<String> {
    match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(_)) | Some(JsonValue::Array(_)) => None,
        Some(v) => Some(normalize_cell(v)).filter(|s| !s.is_empty()),
    }
}
