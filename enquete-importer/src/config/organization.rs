//! Corporation and facility sections of the config file

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use crate::db::DbSettings;
use crate::enquete::convert::{DefaultZone, ParseSettings, Vocabularies};
use crate::enquete::resolve::{JobSettings, MappingCatalog, resolve_jobs};
use crate::enquete::{ConfigError, ImportJob, KeyOptions, TieBreak};
use crate::sheet::SheetLocator;

use super::{AppConfig, optional_string};

/// One entry of `corporations`: a database plus its facilities
#[derive(Debug, Clone, Copy)]
pub struct CorporationConfig<'a> {
    app: &'a AppConfig,
    pub name: &'a str,
    value: &'a JsonValue,
}

impl<'a> CorporationConfig<'a> {
    pub(super) fn new(app: &'a AppConfig, name: &'a str, value: &'a JsonValue) -> Self {
        CorporationConfig { app, name, value }
    }

    fn get(&self, key: &str) -> Option<&'a JsonValue> {
        self.value.get(key).filter(|v| !v.is_null())
    }

    /// Database settings; `None` when the corporation has no `db` section
    pub fn db(&self) -> Result<Option<DbSettings>> {
        match self.get("db") {
            None => Ok(None),
            Some(db) => serde_json::from_value(db.clone())
                .map(Some)
                .with_context(|| format!("Invalid db settings for corporation '{}'", self.name)),
        }
    }

    /// Organization-level mapping catalog layer
    pub fn mappings(&self) -> Option<&'a JsonValue> {
        self.get("mappings")
    }

    /// Facilities in file order
    pub fn facilities(&self) -> Vec<FacilityConfig<'a>> {
        self.get("facilities")
            .and_then(JsonValue::as_object)
            .map(|facilities| {
                facilities
                    .iter()
                    .map(|(name, value)| FacilityConfig {
                        corporation: *self,
                        name,
                        value,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Everything needed to import one facility, resolved up front
#[derive(Debug, Clone)]
pub struct FacilityPlan {
    pub facility_code: i64,
    pub jobs: Vec<ImportJob>,
    pub locator: SheetLocator,
    pub key_options: KeyOptions,
    /// Whether existing rows are deleted before inserting
    pub delete: bool,
    pub settings: ParseSettings,
}

/// One facility of a corporation.
///
/// Scalar settings not given on the facility fall back to the corporation.
#[derive(Debug, Clone, Copy)]
pub struct FacilityConfig<'a> {
    corporation: CorporationConfig<'a>,
    pub name: &'a str,
    value: &'a JsonValue,
}

impl<'a> FacilityConfig<'a> {
    fn own(&self, key: &str) -> Option<&'a JsonValue> {
        self.value.get(key).filter(|v| !v.is_null())
    }

    fn inherited(&self, key: &str) -> Option<&'a JsonValue> {
        self.own(key).or_else(|| self.corporation.get(key))
    }

    pub fn corporation_name(&self) -> &'a str {
        self.corporation.name
    }

    /// `corp.facility`, as accepted by the facility filter
    pub fn filter_key(&self) -> String {
        format!("{}.{}", self.corporation.name, self.name)
    }

    /// Required integer facility code; numeric strings are accepted
    pub fn facility_code(&self) -> Result<i64, ConfigError> {
        match self.own("facility_code") {
            None => Err(ConfigError::MissingFacilityCode),
            Some(JsonValue::Number(n)) => n
                .as_i64()
                .ok_or_else(|| ConfigError::InvalidFacilityCode(n.to_string())),
            Some(JsonValue::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidFacilityCode(s.clone())),
            Some(other) => Err(ConfigError::InvalidFacilityCode(other.to_string())),
        }
    }

    /// Where the answers live.
    ///
    /// `spreadsheet.path` selects a local workbook (relative to `base_dir`),
    /// otherwise `spreadsheet.id` or the legacy `spreadsheet_id` selects a
    /// Google spreadsheet. The worksheet comes from `spreadsheet.worksheet`,
    /// the legacy `worksheet`, then `default_worksheet`.
    pub fn locator(
        &self,
        default_worksheet: Option<&str>,
        base_dir: &Path,
    ) -> Result<SheetLocator, ConfigError> {
        let spreadsheet = self.own("spreadsheet");
        let nested = |key: &str| spreadsheet.and_then(|s| s.get(key));

        let worksheet = optional_string(nested("worksheet"))
            .or_else(|| optional_string(self.own("worksheet")))
            .or_else(|| default_worksheet.map(str::to_string));

        if let Some(path) = optional_string(nested("path")) {
            return Ok(SheetLocator::Workbook {
                path: base_dir.join(path),
                worksheet,
            });
        }

        let spreadsheet_id = match spreadsheet {
            Some(JsonValue::String(_)) => optional_string(spreadsheet),
            _ => optional_string(nested("id")),
        }
        .or_else(|| optional_string(self.own("spreadsheet_id")));

        match spreadsheet_id {
            Some(spreadsheet_id) => Ok(SheetLocator::Google {
                spreadsheet_id,
                worksheet,
            }),
            None => Err(ConfigError::MissingSpreadsheet),
        }
    }

    pub fn key_options(&self) -> KeyOptions {
        KeyOptions {
            prefix: optional_string(self.inherited("enquete_key_prefix")),
            suffix: optional_string(self.inherited("enquete_key_suffix")),
            tie_break: optional_string(self.inherited("enquete_key_tie_break"))
                .map(|t| TieBreak::from_setting(&t))
                .unwrap_or_default(),
            ..KeyOptions::default()
        }
    }

    /// `delete` flag, true unless configured otherwise
    pub fn delete(&self) -> bool {
        match self.inherited("delete") {
            None => true,
            Some(JsonValue::Bool(b)) => *b,
            Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(JsonValue::String(s)) => !matches!(
                s.trim().to_lowercase().as_str(),
                "" | "false" | "no" | "off" | "0"
            ),
            Some(_) => true,
        }
    }

    /// Zone for timestamps without an offset
    pub fn zone(&self) -> DefaultZone {
        optional_string(self.inherited("timezone"))
            .or_else(|| self.corporation.app.timezone())
            .map(|name| DefaultZone::from_name(&name))
            .unwrap_or_default()
    }

    /// Destination table of jobs that do not name one
    pub fn table(&self, default_table: &str) -> String {
        optional_string(self.inherited("table")).unwrap_or_else(|| default_table.to_string())
    }

    /// Resolve code, jobs and locator; any failure skips the facility
    pub fn plan(&self, default_table: &str) -> Result<FacilityPlan, ConfigError> {
        let facility_code = self.facility_code()?;
        let settings = ParseSettings {
            zone: self.zone(),
            vocabularies: Vocabularies::builtin(),
        };

        let catalog = MappingCatalog::from_layers([
            ("mappings", self.corporation.app.mappings()),
            (self.corporation.name, self.corporation.mappings()),
            (self.name, self.own("mappings")),
        ])?;

        let table = self.table(default_table);
        let language_column = self.inherited("language_column").and_then(JsonValue::as_str);
        let job_settings = JobSettings {
            mapping_reference: self.inherited("mapping"),
            imports: self.own("imports"),
            language_column,
            language_mappings: self.inherited("language_mappings"),
            value_conversions: self.inherited("value_conversions"),
            ..JobSettings::new(&catalog, &table)
        };
        let jobs = resolve_jobs(&job_settings, &settings.vocabularies)?;

        let app = self.corporation.app;
        let default_worksheet = app.default_worksheet();
        let locator = self.locator(default_worksheet.as_deref(), app.base_dir())?;

        Ok(FacilityPlan {
            facility_code,
            jobs,
            locator,
            key_options: self.key_options(),
            delete: self.delete(),
            settings,
        })
    }
}
