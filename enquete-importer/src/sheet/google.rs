//! Google Sheets values API client

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Environment variable holding a pre-issued OAuth access token
pub const TOKEN_ENV: &str = "GOOGLE_SHEETS_TOKEN";
/// Environment variable holding an API key (public sheets only)
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
/// Range covering the first worksheet when none is named
const FIRST_SHEET_RANGE: &str = "A:ZZZ";

/// Credentials attached to each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleAuth {
    BearerToken(String),
    ApiKey(String),
}

/// `spreadsheets.values.get` response
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

/// Reads worksheet values over the Sheets v4 REST API
pub struct GoogleSheetsClient {
    base_url: String,
    auth: GoogleAuth,
    client: reqwest::Client,
}

impl GoogleSheetsClient {
    pub fn new(auth: GoogleAuth) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, auth)
    }

    pub fn with_base_url(base_url: &str, auth: GoogleAuth) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("enquete-importer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(GoogleSheetsClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            client,
        })
    }

    /// Build a client from `GOOGLE_SHEETS_TOKEN` or `GOOGLE_API_KEY`
    pub fn from_env() -> Result<Option<Self>> {
        let auth = match (std::env::var(TOKEN_ENV), std::env::var(API_KEY_ENV)) {
            (Ok(token), _) if !token.trim().is_empty() => {
                GoogleAuth::BearerToken(token.trim().to_string())
            }
            (_, Ok(key)) if !key.trim().is_empty() => GoogleAuth::ApiKey(key.trim().to_string()),
            _ => {
                log::debug!("No Google credentials in the environment");
                return Ok(None);
            }
        };
        Self::new(auth).map(Some)
    }

    /// URL of a values request
    pub fn values_url(&self, spreadsheet_id: &str, worksheet: Option<&str>) -> String {
        // Quoted so names like `Q1` or `A1` are not read as cell references
        let range = worksheet
            .map(|w| urlencoding::encode(&format!("'{}'", w.replace('\'', "''"))).into_owned())
            .unwrap_or_else(|| FIRST_SHEET_RANGE.to_string());
        format!(
            "{}/v4/spreadsheets/{}/values/{}?majorDimension=ROWS&valueRenderOption=FORMATTED_VALUE",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            range
        )
    }

    /// Fetch every row of the worksheet, header row first
    pub async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        worksheet: Option<&str>,
    ) -> Result<Vec<Vec<JsonValue>>> {
        let url = self.values_url(spreadsheet_id, worksheet);
        log::debug!("GET {}", url);

        let request = match &self.auth {
            GoogleAuth::BearerToken(token) => self.client.get(&url).bearer_auth(token),
            GoogleAuth::ApiKey(key) => self.client.get(&url).query(&[("key", key)]),
        };

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch spreadsheet {}", spreadsheet_id))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "Sheets API returned {} for spreadsheet {}: {}",
                status,
                spreadsheet_id,
                body.trim()
            );
        }

        let range: ValueRange = response
            .json()
            .await
            .context("Failed to parse Sheets API response")?;
        Ok(range.values)
    }
}
