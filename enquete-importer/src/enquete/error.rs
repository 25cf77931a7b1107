//! Configuration errors that skip a single facility

/// A problem with one facility's configuration or worksheet layout.
///
/// The orchestrator treats these as "skip this facility and continue";
/// anything else aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `facility_code` is absent
    MissingFacilityCode,
    /// `facility_code` is present but not an integer
    InvalidFacilityCode(String),
    /// Neither `spreadsheet.id`, `spreadsheet.path` nor `spreadsheet_id` is set
    MissingSpreadsheet,
    /// A named mapping does not exist in any catalog layer
    UnknownMapping(String),
    /// A section entry is not a key/value map of strings
    InvalidSection { key: String },
    /// A conversion entry is neither a table nor a known vocabulary name
    InvalidConversion { key: String },
    /// A clamp entry is not a `[min, max]` pair
    InvalidClamp { key: String },
    /// A mapping catalog layer is not a map
    InvalidCatalog(String),
    /// A mapping reference is neither a name nor a definition
    InvalidReference(String),
    /// `imports` is not a list of tables/mappings
    InvalidImports(String),
    /// Required headers absent from the worksheet, sorted
    MissingHeaders(Vec<String>),
    /// `language_column` is set but no variant and no default resolved
    NoLanguageMapping { column: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingFacilityCode => {
                write!(f, "'facility_code' is required in each facility configuration")
            }
            ConfigError::InvalidFacilityCode(value) => {
                write!(f, "'facility_code' must be an integer, got {}", value)
            }
            ConfigError::MissingSpreadsheet => {
                write!(f, "'spreadsheet.id' or 'spreadsheet.path' is required in each facility configuration")
            }
            ConfigError::UnknownMapping(name) => write!(f, "Unknown mapping '{}'", name),
            ConfigError::InvalidSection { key } => {
                write!(f, "Mapping section '{}' must be a map of column -> header", key)
            }
            ConfigError::InvalidConversion { key } => {
                write!(f, "Conversion '{}' must be a map of value -> replacement", key)
            }
            ConfigError::InvalidClamp { key } => {
                write!(f, "Clamp '{}' must be a [min, max] pair of integers", key)
            }
            ConfigError::InvalidCatalog(layer) => {
                write!(f, "Mapping catalog '{}' must be a map of name -> mapping", layer)
            }
            ConfigError::InvalidReference(detail) => {
                write!(f, "Invalid mapping reference: {}", detail)
            }
            ConfigError::InvalidImports(detail) => write!(f, "Invalid imports: {}", detail),
            ConfigError::MissingHeaders(headers) => write!(
                f,
                "Missing required header(s) in worksheet: {}",
                headers.join(", ")
            ),
            ConfigError::NoLanguageMapping { column } => write!(
                f,
                "No language mapping could be resolved for column '{}'",
                column
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
