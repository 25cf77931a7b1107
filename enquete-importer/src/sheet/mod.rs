//! Worksheet sources: fetch a header row plus data rows

mod google;
mod workbook;

use std::path::PathBuf;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub use google::{GoogleAuth, GoogleSheetsClient};
pub use workbook::{cell_to_value, read_workbook_values};

/// Where one facility's survey answers live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLocator {
    /// A Google spreadsheet, optionally narrowed to one worksheet
    Google {
        spreadsheet_id: String,
        worksheet: Option<String>,
    },
    /// A local workbook file (xlsx, xls, ods)
    Workbook {
        path: PathBuf,
        worksheet: Option<String>,
    },
}

impl SheetLocator {
    pub fn worksheet(&self) -> Option<&str> {
        match self {
            SheetLocator::Google { worksheet, .. } | SheetLocator::Workbook { worksheet, .. } => {
                worksheet.as_deref()
            }
        }
    }
}

impl std::fmt::Display for SheetLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sheet = self.worksheet().unwrap_or("first sheet");
        match self {
            SheetLocator::Google { spreadsheet_id, .. } => {
                write!(f, "spreadsheet {} ({})", spreadsheet_id, sheet)
            }
            SheetLocator::Workbook { path, .. } => {
                write!(f, "workbook {} ({})", path.display(), sheet)
            }
        }
    }
}

/// Fetches all cell values of a worksheet, header row first
#[async_trait]
pub trait WorksheetSource: Send + Sync {
    async fn fetch_values(&self, locator: &SheetLocator) -> Result<Vec<Vec<JsonValue>>>;
}

/// Routes each locator to the Google client or the local workbook reader
pub struct SheetSources {
    google: Option<GoogleSheetsClient>,
}

impl SheetSources {
    pub fn new(google: Option<GoogleSheetsClient>) -> Self {
        SheetSources { google }
    }

    /// Google access configured from the environment, if any
    pub fn from_env() -> Result<Self> {
        Ok(SheetSources::new(GoogleSheetsClient::from_env()?))
    }
}

#[async_trait]
impl WorksheetSource for SheetSources {
    async fn fetch_values(&self, locator: &SheetLocator) -> Result<Vec<Vec<JsonValue>>> {
        match locator {
            SheetLocator::Google {
                spreadsheet_id,
                worksheet,
            } => {
                let Some(client) = &self.google else {
                    bail!(
                        "No Google credentials configured (set {} or {}) to read {}",
                        google::TOKEN_ENV,
                        google::API_KEY_ENV,
                        locator
                    );
                };
                client.fetch_values(spreadsheet_id, worksheet.as_deref()).await
            }
            SheetLocator::Workbook { path, worksheet } => {
                read_workbook_values(path, worksheet.as_deref())
            }
        }
    }
}
