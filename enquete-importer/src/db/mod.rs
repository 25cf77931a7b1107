//! Destination database: delete-then-bulk-insert per facility

mod dry_run;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::enquete::{Column, Value};

pub use dry_run::{DryRunSink, DryRunSinkFactory};
pub use postgres::{PostgresSink, PostgresSinkFactory, quote_ident};

/// Connection settings of one organization's database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSettings {
    /// Full connection URL; takes precedence over the discrete fields
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "database")]
    pub dbname: Option<String>,
}

impl DbSettings {
    /// Short description for logs, without credentials
    pub fn describe(&self) -> String {
        if self.url.is_some() {
            return "database url".to_string();
        }
        format!(
            "{}:{}/{}",
            self.host.as_deref().unwrap_or("localhost"),
            self.port.unwrap_or(5432),
            self.dbname.as_deref().unwrap_or("")
        )
    }
}

/// Transactional writer for one organization's database.
///
/// One transaction spans a whole facility: `begin`, any number of
/// `delete_facility` / `insert_rows`, then `commit` or `rollback`.
#[async_trait]
pub trait ImportSink: Send {
    async fn begin(&mut self) -> Result<()>;

    /// Delete every row of `table` belonging to the facility
    async fn delete_facility(&mut self, table: &str, facility_code: i64) -> Result<u64>;

    /// Insert column-ordered rows, returning the number inserted
    async fn insert_rows(&mut self, table: &str, columns: &[Column], rows: &[Vec<Value>])
    -> Result<u64>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

/// Opens one sink per organization
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn open(&self, organization: &str, settings: &DbSettings) -> Result<Box<dyn ImportSink>>;
}
