//! Sink that logs what would be written and touches no database

use anyhow::Result;
use async_trait::async_trait;

use crate::enquete::{Column, Value};

use super::{DbSettings, ImportSink, SinkFactory};

/// Opens [`DryRunSink`]s without connecting anywhere
#[derive(Debug, Clone, Default)]
pub struct DryRunSinkFactory;

#[async_trait]
impl SinkFactory for DryRunSinkFactory {
    async fn open(&self, organization: &str, settings: &DbSettings) -> Result<Box<dyn ImportSink>> {
        log::info!(
            "[dry-run] {} would connect to {}",
            organization,
            settings.describe()
        );
        Ok(Box::new(DryRunSink::default()))
    }
}

/// Counts and logs statements instead of executing them
#[derive(Debug, Default)]
pub struct DryRunSink {
    pub deletes: usize,
    pub inserted: u64,
}

/// One row as a JSON object keyed by column name, in column order
pub fn preview_row(columns: &[Column], row: &[Value]) -> serde_json::Value {
    serde_json::Value::Object(
        columns
            .iter()
            .zip(row)
            .map(|(c, v)| (c.name.clone(), v.to_json()))
            .collect(),
    )
}

#[async_trait]
impl ImportSink for DryRunSink {
    async fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    async fn delete_facility(&mut self, table: &str, facility_code: i64) -> Result<u64> {
        log::info!(
            "[dry-run] DELETE FROM {} WHERE facility_code = {}",
            table,
            facility_code
        );
        self.deletes += 1;
        Ok(0)
    }

    async fn insert_rows(
        &mut self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
    ) -> Result<u64> {
        log::info!(
            "[dry-run] INSERT {} rows into {} ({} columns)",
            rows.len(),
            table,
            columns.len()
        );
        if let Some(first) = rows.first() {
            log::debug!("[dry-run] first row: {}", preview_row(columns, first));
        }
        self.inserted += rows.len() as u64;
        Ok(rows.len() as u64)
    }

    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}
