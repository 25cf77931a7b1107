//! PostgreSQL sink built on sqlx

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::enquete::{Column, FieldType, Value};

use super::{DbSettings, ImportSink, SinkFactory};

/// Postgres limit on bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// Quote an identifier, keeping `schema.table` qualification.
///
/// Names are folded to lower case first, as Postgres does for unquoted
/// identifiers, so `Enquetes` and `enquetes` name the same table.
pub fn quote_ident(ident: &str) -> String {
    ident
        .split('.')
        .map(|part| {
            let folded = part.trim().to_ascii_lowercase();
            format!("\"{}\"", folded.replace('"', "\"\""))
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn connect_options(settings: &DbSettings) -> Result<PgConnectOptions> {
    if let Some(url) = settings.url.as_deref().filter(|u| !u.trim().is_empty()) {
        return url.parse().context("Invalid database url");
    }

    let mut options = PgConnectOptions::new();
    if let Some(host) = &settings.host {
        options = options.host(host);
    }
    if let Some(port) = settings.port {
        options = options.port(port);
    }
    if let Some(user) = &settings.user {
        options = options.username(user);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }
    if let Some(dbname) = &settings.dbname {
        options = options.database(dbname);
    }
    Ok(options)
}

/// Opens a single-connection pool per organization
#[derive(Debug, Clone, Default)]
pub struct PostgresSinkFactory;

#[async_trait]
impl SinkFactory for PostgresSinkFactory {
    async fn open(&self, organization: &str, settings: &DbSettings) -> Result<Box<dyn ImportSink>> {
        let options = connect_options(settings)?;
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to {} for {}",
                    settings.describe(),
                    organization
                )
            })?;
        log::debug!("Connected to {} for {}", settings.describe(), organization);
        Ok(Box::new(PostgresSink::new(pool)))
    }
}

/// Writes one facility at a time inside a transaction
pub struct PostgresSink {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        PostgresSink { pool, tx: None }
    }

    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        match self.tx.as_mut() {
            Some(tx) => Ok(tx),
            None => bail!("No open transaction"),
        }
    }
}

/// Bind one value, typing nulls after the column they fill
fn push_value(b: &mut Separated<'_, '_, Postgres, &'static str>, value: &Value, field_type: FieldType) {
    match value {
        Value::String(s) => {
            b.push_bind(s.clone());
        }
        Value::Int(i) => {
            b.push_bind(*i);
        }
        Value::Date(d) => {
            b.push_bind(*d);
        }
        Value::DateTime(dt) => {
            b.push_bind(*dt);
        }
        Value::Null => match field_type {
            FieldType::String | FieldType::Text => {
                b.push_bind(None::<String>);
            }
            FieldType::Integer => {
                b.push_bind(None::<i64>);
            }
            FieldType::Date => {
                b.push_bind(None::<NaiveDate>);
            }
            FieldType::DateTime => {
                b.push_bind(None::<DateTime<FixedOffset>>);
            }
        },
    }
}

#[async_trait]
impl ImportSink for PostgresSink {
    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            bail!("Transaction already open");
        }
        let tx = self.pool.begin().await.context("Failed to begin transaction")?;
        self.tx = Some(tx);
        Ok(())
    }

    async fn delete_facility(&mut self, table: &str, facility_code: i64) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE facility_code = $1", quote_ident(table));
        let tx = self.tx()?;
        let result = sqlx::query(&sql)
            .bind(facility_code)
            .execute(&mut **tx)
            .await
            .with_context(|| format!("Failed to delete facility {} from {}", facility_code, table))?;
        Ok(result.rows_affected())
    }

    async fn insert_rows(
        &mut self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
    ) -> Result<u64> {
        if rows.is_empty() || columns.is_empty() {
            return Ok(0);
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let chunk_size = (MAX_BIND_PARAMS / columns.len()).max(1);
        let tx = self.tx()?;

        let mut inserted = 0;
        for chunk in rows.chunks(chunk_size) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} ({}) ", quote_ident(table), column_list));
            builder.push_values(chunk, |mut b, row| {
                for (value, column) in row.iter().zip(columns) {
                    push_value(&mut b, value, column.field_type);
                }
            });

            let result = builder
                .build()
                .execute(&mut **tx)
                .await
                .with_context(|| format!("Failed to insert {} rows into {}", chunk.len(), table))?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.context("Failed to commit transaction"),
            None => bail!("No open transaction to commit"),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.context("Failed to roll back transaction"),
            None => Ok(()),
        }
    }
}
