//! Batch import orchestration
//!
//! Corporations are processed in config order, each with one sink (one
//! database connection) for its whole facility loop. A facility is one
//! transaction: every job's delete and insert commit together or not at all.

mod summary;

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

use crate::config::{AppConfig, CorporationConfig, FacilityConfig, FacilityPlan};
use crate::db::{ImportSink, SinkFactory};
use crate::enquete::resolve::required_headers;
use crate::enquete::{ConfigError, JobBatch, RecordBuilder, rows_from_values};
use crate::sheet::WorksheetSource;

pub use summary::{FacilityStatus, FacilitySummary, JobSummary, RunSummary};

/// Default destination table
pub const DEFAULT_TABLE: &str = "enquetes";

/// Corporation and facility selection from the command line.
///
/// Empty lists select everything. Facilities match by name or by
/// `corporation.facility`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityFilter {
    pub corporations: Vec<String>,
    pub facilities: Vec<String>,
}

impl FacilityFilter {
    pub fn new(corporations: Vec<String>, facilities: Vec<String>) -> Self {
        FacilityFilter {
            corporations,
            facilities,
        }
    }

    pub fn includes_corporation(&self, name: &str) -> bool {
        self.corporations.is_empty() || self.corporations.iter().any(|c| c == name)
    }

    pub fn includes_facility(&self, facility: &FacilityConfig<'_>) -> bool {
        if self.facilities.is_empty() {
            return true;
        }
        let qualified = facility.filter_key();
        self.facilities
            .iter()
            .any(|f| f == facility.name || *f == qualified)
    }
}

/// (table, facility code) pairs whose old rows are already gone
type ClearedPairs = HashSet<(String, i64)>;

/// One job's rows, built and waiting to be written
struct PreparedJob {
    table: String,
    mapping: String,
    fetched: usize,
    batch: JobBatch,
}

/// Drives worksheets through the mapping engine into sinks
pub struct Runner<'a> {
    sources: &'a dyn WorksheetSource,
    sinks: &'a dyn SinkFactory,
    default_table: String,
    import_date: Option<DateTime<FixedOffset>>,
}

impl<'a> Runner<'a> {
    pub fn new(sources: &'a dyn WorksheetSource, sinks: &'a dyn SinkFactory) -> Self {
        Runner {
            sources,
            sinks,
            default_table: DEFAULT_TABLE.to_string(),
            import_date: None,
        }
    }

    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.default_table = table.into();
        self
    }

    /// Stamp every record with a fixed import date
    pub fn with_import_date(mut self, import_date: DateTime<FixedOffset>) -> Self {
        self.import_date = Some(import_date);
        self
    }

    /// Import every selected facility.
    ///
    /// Unknown filters fail before anything is opened. Configuration problems
    /// skip a facility; any other failure rolls it back and ends the run.
    pub async fn run(&self, config: &AppConfig, filter: &FacilityFilter) -> Result<RunSummary> {
        config.validate_filters(&filter.corporations, &filter.facilities)?;

        let mut summary = RunSummary::default();
        for corporation in config.corporations()? {
            if !filter.includes_corporation(corporation.name) {
                continue;
            }
            self.run_corporation(&corporation, filter, &mut summary)
                .await?;
        }

        log::info!(
            "Run finished: {} facilities imported, {} skipped",
            summary.imported_count(),
            summary.skipped_count()
        );
        Ok(summary)
    }

    async fn run_corporation(
        &self,
        corporation: &CorporationConfig<'_>,
        filter: &FacilityFilter,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let facilities: Vec<FacilityConfig<'_>> = corporation
            .facilities()
            .into_iter()
            .filter(|f| filter.includes_facility(f))
            .collect();
        if facilities.is_empty() {
            log::warn!(
                "No facilities to import for corporation '{}', skipping",
                corporation.name
            );
            return Ok(());
        }

        let Some(db) = corporation.db()? else {
            log::warn!(
                "No db settings for corporation '{}', skipping",
                corporation.name
            );
            return Ok(());
        };

        let mut sink = self
            .sinks
            .open(corporation.name, &db)
            .await
            .with_context(|| format!("Failed to open database for '{}'", corporation.name))?;
        log::info!("Connected to {} for '{}'", db.describe(), corporation.name);

        let mut cleared = ClearedPairs::new();
        for facility in &facilities {
            match self.import_facility(sink.as_mut(), facility, &mut cleared).await {
                Ok(facility_summary) => summary.push(facility_summary),
                Err(err) => match err.downcast_ref::<ConfigError>() {
                    Some(config_error) => {
                        log::warn!(
                            "Skipping facility {}: {}",
                            facility.filter_key(),
                            config_error
                        );
                        summary.push(FacilitySummary::skipped(
                            corporation.name,
                            facility.name,
                            config_error.to_string(),
                        ));
                    }
                    None => {
                        log::error!("Import of {} failed: {:#}", facility.filter_key(), err);
                        return Err(err.context(format!(
                            "Failed to import facility {}",
                            facility.filter_key()
                        )));
                    }
                },
            }
        }
        Ok(())
    }

    async fn import_facility(
        &self,
        sink: &mut dyn ImportSink,
        facility: &FacilityConfig<'_>,
        cleared: &mut ClearedPairs,
    ) -> Result<FacilitySummary> {
        let plan = facility.plan(&self.default_table)?;
        log::info!(
            "Importing {} (facility_code={}) from {}",
            facility.filter_key(),
            plan.facility_code,
            plan.locator
        );

        let prepared = self.prepare(&plan).await?;

        sink.begin().await?;
        let mut newly_cleared = ClearedPairs::new();
        match write_jobs(sink, &plan, &prepared, cleared, &mut newly_cleared).await {
            Ok(jobs) => {
                sink.commit().await?;
                cleared.extend(newly_cleared);
                Ok(FacilitySummary::imported(
                    facility.corporation_name(),
                    facility.name,
                    plan.facility_code,
                    jobs,
                ))
            }
            Err(err) => {
                if let Err(rollback_err) = sink.rollback().await {
                    log::warn!("Rollback failed: {:#}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Fetch the worksheet once and build every job's rows
    async fn prepare(&self, plan: &FacilityPlan) -> Result<Vec<PreparedJob>> {
        let values = self
            .sources
            .fetch_values(&plan.locator)
            .await
            .with_context(|| format!("Failed to fetch {}", plan.locator))?;

        let headers = required_headers(&plan.jobs);
        let rows = rows_from_values(&values, &headers)?;
        log::debug!("Read {} rows from {}", rows.len(), plan.locator);

        let mut builder = RecordBuilder::new(&plan.settings, &plan.key_options, plan.facility_code);
        if let Some(import_date) = self.import_date {
            builder = builder.with_import_date(import_date);
        }

        Ok(plan
            .jobs
            .iter()
            .map(|job| PreparedJob {
                table: job.table.clone(),
                mapping: job.label().to_string(),
                fetched: rows.len(),
                batch: builder.build_job(job, &rows),
            })
            .collect())
    }
}

/// Delete then insert each job inside the open transaction.
///
/// A (table, facility) pair is deleted at most once per corporation run, so
/// a later job or facility writing to the same table keeps earlier rows.
async fn write_jobs(
    sink: &mut dyn ImportSink,
    plan: &FacilityPlan,
    prepared: &[PreparedJob],
    cleared: &ClearedPairs,
    newly_cleared: &mut ClearedPairs,
) -> Result<Vec<JobSummary>> {
    let mut jobs = Vec::with_capacity(prepared.len());

    for job in prepared {
        let pair = (job.table.clone(), plan.facility_code);
        let deleted = if plan.delete && !cleared.contains(&pair) && !newly_cleared.contains(&pair) {
            let removed = sink.delete_facility(&job.table, plan.facility_code).await?;
            newly_cleared.insert(pair);
            Some(removed)
        } else {
            None
        };

        let inserted = if job.batch.rows.is_empty() {
            0
        } else {
            sink.insert_rows(&job.table, &job.batch.columns, &job.batch.rows)
                .await?
        };

        log::info!(
            "{} [{}]: inserted {} of {} rows ({} skipped)",
            job.table,
            job.mapping,
            inserted,
            job.fetched,
            job.batch.skipped
        );
        jobs.push(JobSummary {
            table: job.table.clone(),
            mapping: job.mapping.clone(),
            fetched: job.fetched,
            inserted,
            skipped: job.batch.skipped,
            deleted,
        });
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbSettings;
    use crate::enquete::{Column, Value};
    use crate::sheet::SheetLocator;
    use anyhow::{anyhow, bail};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{Value as JsonValue, json};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    type Row = BTreeMap<String, Value>;

    #[derive(Default)]
    struct Store {
        tables: BTreeMap<String, Vec<Row>>,
        snapshot: Option<BTreeMap<String, Vec<Row>>>,
        ops: Vec<String>,
        opened: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct MemorySinks {
        store: Arc<Mutex<Store>>,
        fail_insert: bool,
    }

    impl MemorySinks {
        fn rows(&self, table: &str) -> Vec<Row> {
            let store = self.store.lock().unwrap();
            store.tables.get(table).cloned().unwrap_or_default()
        }

        fn ops(&self) -> Vec<String> {
            self.store.lock().unwrap().ops.clone()
        }
    }

    #[async_trait]
    impl SinkFactory for MemorySinks {
        async fn open(&self, organization: &str, _settings: &DbSettings) -> Result<Box<dyn ImportSink>> {
            self.store
                .lock()
                .unwrap()
                .opened
                .push(organization.to_string());
            Ok(Box::new(MemorySink {
                store: self.store.clone(),
                fail_insert: self.fail_insert,
            }))
        }
    }

    struct MemorySink {
        store: Arc<Mutex<Store>>,
        fail_insert: bool,
    }

    #[async_trait]
    impl ImportSink for MemorySink {
        async fn begin(&mut self) -> Result<()> {
            let mut store = self.store.lock().unwrap();
            store.snapshot = Some(store.tables.clone());
            store.ops.push("begin".into());
            Ok(())
        }

        async fn delete_facility(&mut self, table: &str, facility_code: i64) -> Result<u64> {
            let mut store = self.store.lock().unwrap();
            store.ops.push(format!("delete {} {}", table, facility_code));
            let rows = store.tables.entry(table.to_string()).or_default();
            let before = rows.len();
            rows.retain(|row| row.get("facility_code") != Some(&Value::Int(facility_code)));
            Ok((before - rows.len()) as u64)
        }

        async fn insert_rows(
            &mut self,
            table: &str,
            columns: &[Column],
            rows: &[Vec<Value>],
        ) -> Result<u64> {
            let mut store = self.store.lock().unwrap();
            store.ops.push(format!("insert {} {}", table, rows.len()));
            if self.fail_insert {
                return Err(anyhow!("connection reset"));
            }
            let target = store.tables.entry(table.to_string()).or_default();
            for values in rows {
                target.push(
                    columns
                        .iter()
                        .map(|c| c.name.clone())
                        .zip(values.iter().cloned())
                        .collect(),
                );
            }
            Ok(rows.len() as u64)
        }

        async fn commit(&mut self) -> Result<()> {
            let mut store = self.store.lock().unwrap();
            store.snapshot = None;
            store.ops.push("commit".into());
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            let mut store = self.store.lock().unwrap();
            if let Some(snapshot) = store.snapshot.take() {
                store.tables = snapshot;
            }
            store.ops.push("rollback".into());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySheets {
        sheets: HashMap<String, Vec<Vec<JsonValue>>>,
    }

    impl MemorySheets {
        fn with(mut self, id: &str, values: JsonValue) -> Self {
            let grid = serde_json::from_value(values).unwrap();
            self.sheets.insert(id.to_string(), grid);
            self
        }
    }

    #[async_trait]
    impl WorksheetSource for MemorySheets {
        async fn fetch_values(&self, locator: &SheetLocator) -> Result<Vec<Vec<JsonValue>>> {
            match locator {
                SheetLocator::Google { spreadsheet_id, .. } => self
                    .sheets
                    .get(spreadsheet_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("spreadsheet {} unavailable", spreadsheet_id)),
                SheetLocator::Workbook { path, .. } => bail!("no workbook {}", path.display()),
            }
        }
    }

    fn import_date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 4, 1, 9, 0, 0)
            .unwrap()
    }

    fn config(facilities: JsonValue) -> AppConfig {
        AppConfig::from_value(json!({
            "mappings": {
                "default": {
                    "string": {"room_number": "部屋番号", "gender": "性別"},
                    "integer2": {"overall": "総合評価"},
                    "date": {"start_date": "宿泊開始日"}
                }
            },
            "corporations": {
                "tokyo": {
                    "db": {"host": "localhost", "dbname": "tokyo"},
                    "facilities": facilities
                }
            }
        }))
    }

    fn answers() -> JsonValue {
        json!([
            ["部屋番号", "性別", "総合評価", "宿泊開始日"],
            ["101", "男性", "87.5", "2024/03/05"],
            ["", "", "", ""],
            ["", "女性", "120", "2024年3月6日"]
        ])
    }

    #[tokio::test]
    async fn test_import_builds_records() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "s1"}
        }));
        let sheets = MemorySheets::default().with("s1", answers());
        let sinks = MemorySinks::default();

        let summary = Runner::new(&sheets, &sinks)
            .with_import_date(import_date())
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        let rows = sinks.rows("enquetes");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["enquete_key"], Value::String("101-20240305-1".into()));
        assert_eq!(rows[0]["overall"], Value::Int(87));
        assert_eq!(rows[0]["facility_code"], Value::Int(1203));
        assert_eq!(rows[0]["import_date"], Value::DateTime(import_date()));
        assert_eq!(rows[1]["room_number"], Value::Null);
        assert_eq!(rows[1]["enquete_key"], Value::Null);
        assert_eq!(rows[1]["overall"], Value::Int(100));

        assert_eq!(
            sinks.ops(),
            vec!["begin", "delete enquetes 1203", "insert enquetes 2", "commit"]
        );
        let facility = summary.facility("tokyo", "shinjuku").unwrap();
        assert_eq!(facility.jobs[0].fetched, 2);
        assert_eq!(facility.jobs[0].deleted, Some(0));
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "s1"}
        }));
        let sheets = MemorySheets::default().with("s1", answers());
        let sinks = MemorySinks::default();
        let runner = Runner::new(&sheets, &sinks).with_import_date(import_date());

        runner.run(&config, &FacilityFilter::default()).await.unwrap();
        let first = sinks.rows("enquetes");
        let summary = runner.run(&config, &FacilityFilter::default()).await.unwrap();

        assert_eq!(sinks.rows("enquetes"), first);
        assert_eq!(
            summary.facility("tokyo", "shinjuku").unwrap().jobs[0].deleted,
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_unmatched_language_row_is_excluded() {
        let config = AppConfig::from_value(json!({
            "mappings": {
                "english": {"string": {"room_number": "Room", "answer": "Q1"}},
                "japanese": {"string": {"room_number": "部屋番号", "answer": "設問1"}}
            },
            "corporations": {"tokyo": {
                "db": {"host": "localhost"},
                "facilities": {"shinjuku": {
                    "facility_code": 1203,
                    "spreadsheet_id": "s1",
                    "language_column": "言語",
                    "language_mappings": {"English": "english", "日本語": "japanese"}
                }}
            }}
        }));
        let sheets = MemorySheets::default().with(
            "s1",
            json!([
                ["言語", "Room", "Q1", "部屋番号", "設問1"],
                ["English", "101", "Good", "", ""],
                ["日本語", "", "", "102", "良い"],
                ["中文", "103", "好", "", ""]
            ]),
        );
        let sinks = MemorySinks::default();

        let summary = Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        let rows = sinks.rows("enquetes");
        let rooms: Vec<&Value> = rows.iter().map(|r| &r["room_number"]).collect();
        assert_eq!(
            rooms,
            vec![&Value::String("101".into()), &Value::String("102".into())]
        );
        let job = &summary.facility("tokyo", "shinjuku").unwrap().jobs[0];
        assert_eq!(job.skipped, 1);
        assert_eq!(job.inserted, 2);
    }

    #[tokio::test]
    async fn test_no_delete_and_no_rows_writes_nothing() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "s1", "delete": false}
        }));
        let sheets = MemorySheets::default().with(
            "s1",
            json!([["部屋番号", "性別", "総合評価", "宿泊開始日"]]),
        );
        let sinks = MemorySinks::default();

        Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        assert_eq!(sinks.ops(), vec!["begin", "commit"]);
    }

    #[tokio::test]
    async fn test_empty_sheet_still_clears_facility() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "s1"}
        }));
        let sheets = MemorySheets::default().with(
            "s1",
            json!([["部屋番号", "性別", "総合評価", "宿泊開始日"]]),
        );
        let sinks = MemorySinks::default();

        Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        assert_eq!(sinks.ops(), vec!["begin", "delete enquetes 1203", "commit"]);
    }

    #[tokio::test]
    async fn test_config_error_skips_facility() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "broken"},
            "ueno": {"spreadsheet_id": "s1"},
            "shibuya": {"facility_code": 1204, "spreadsheet_id": "s1"}
        }));
        let sheets = MemorySheets::default()
            .with("broken", json!([["部屋番号"], ["101"]]))
            .with("s1", answers());
        let sinks = MemorySinks::default();

        let summary = Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        assert_eq!(summary.skipped_count(), 2);
        assert_eq!(
            summary.facility("tokyo", "shinjuku").unwrap().status,
            FacilityStatus::Skipped(
                "Missing required header(s) in worksheet: 宿泊開始日, 性別, 総合評価".into()
            )
        );
        assert!(summary.facility("tokyo", "ueno").unwrap().is_skipped());
        assert_eq!(sinks.rows("enquetes").len(), 2);
        assert_eq!(
            sinks.ops(),
            vec!["begin", "delete enquetes 1204", "insert enquetes 2", "commit"]
        );
    }

    #[tokio::test]
    async fn test_infrastructure_error_rolls_back_and_aborts() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "s1"},
            "shibuya": {"facility_code": 1204, "spreadsheet_id": "s1"}
        }));
        let sheets = MemorySheets::default().with("s1", answers());
        let sinks = MemorySinks {
            fail_insert: true,
            ..MemorySinks::default()
        };
        {
            let mut store = sinks.store.lock().unwrap();
            let mut existing = Row::new();
            existing.insert("facility_code".into(), Value::Int(1203));
            store.tables.insert("enquetes".into(), vec![existing]);
        }

        let err = Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("connection reset"));
        assert_eq!(sinks.rows("enquetes").len(), 1);
        assert_eq!(
            sinks.ops(),
            vec!["begin", "delete enquetes 1203", "insert enquetes 2", "rollback"]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let config = config(json!({
            "shinjuku": {"facility_code": 1203, "spreadsheet_id": "missing"}
        }));
        let sheets = MemorySheets::default();
        let sinks = MemorySinks::default();

        let result = Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await;

        assert!(result.is_err());
        assert!(sinks.ops().is_empty());
    }

    #[tokio::test]
    async fn test_shared_facility_code_is_deleted_once() {
        let config = config(json!({
            "main": {"facility_code": 1203, "spreadsheet_id": "s1"},
            "annex": {"facility_code": 1203, "spreadsheet_id": "s2"}
        }));
        let sheets = MemorySheets::default().with("s1", answers()).with(
            "s2",
            json!([
                ["部屋番号", "性別", "総合評価", "宿泊開始日"],
                ["201", "女性", "90", "2024/03/07"]
            ]),
        );
        let sinks = MemorySinks::default();

        let summary = Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        assert_eq!(sinks.rows("enquetes").len(), 3);
        assert_eq!(
            sinks.ops(),
            vec![
                "begin",
                "delete enquetes 1203",
                "insert enquetes 2",
                "commit",
                "begin",
                "insert enquetes 1",
                "commit"
            ]
        );
        assert_eq!(summary.facility("tokyo", "annex").unwrap().jobs[0].deleted, None);
    }

    #[tokio::test]
    async fn test_fan_out_jobs_share_one_transaction() {
        let config = AppConfig::from_value(json!({
            "mappings": {
                "default": {"string": {"room_number": "部屋番号"}},
                "scores": {"integer2": {"overall": "総合評価"}}
            },
            "corporations": {"tokyo": {
                "db": {"host": "localhost"},
                "facilities": {"shinjuku": {
                    "facility_code": 1203,
                    "spreadsheet_id": "s1",
                    "imports": [
                        "default",
                        {"table": "enquete_scores", "mapping": "scores"},
                        {"mapping": "scores"}
                    ]
                }}
            }}
        }));
        let sheets = MemorySheets::default().with("s1", answers());
        let sinks = MemorySinks::default();

        Runner::new(&sheets, &sinks)
            .run(&config, &FacilityFilter::default())
            .await
            .unwrap();

        assert_eq!(
            sinks.ops(),
            vec![
                "begin",
                "delete enquetes 1203",
                "insert enquetes 2",
                "delete enquete_scores 1203",
                "insert enquete_scores 2",
                "insert enquetes 2",
                "commit"
            ]
        );
        assert_eq!(sinks.rows("enquete_scores")[1]["overall"], Value::Int(100));
    }

    #[tokio::test]
    async fn test_filters_and_missing_db() {
        let config = AppConfig::from_value(json!({
            "mappings": {"default": {"string": {"room_number": "部屋番号"}}},
            "corporations": {
                "tokyo": {"facilities": {"shinjuku": {"facility_code": 1, "spreadsheet_id": "s1"}}},
                "osaka": {
                    "db": {"host": "localhost"},
                    "facilities": {
                        "umeda": {"facility_code": 2, "spreadsheet_id": "s1"},
                        "namba": {"facility_code": 3, "spreadsheet_id": "s1"}
                    }
                }
            }
        }));
        let sheets = MemorySheets::default().with("s1", answers());
        let sinks = MemorySinks::default();
        let runner = Runner::new(&sheets, &sinks);

        let err = runner
            .run(&config, &FacilityFilter::new(vec!["kyoto".into()], vec![]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("kyoto"));
        assert!(sinks.store.lock().unwrap().opened.is_empty());

        let summary = runner
            .run(&config, &FacilityFilter::new(vec![], vec!["osaka.namba".into()]))
            .await
            .unwrap();
        assert_eq!(summary.facilities.len(), 1);
        assert_eq!(summary.facilities[0].facility, "namba");

        let summary = runner.run(&config, &FacilityFilter::default()).await.unwrap();
        assert!(summary.facility("tokyo", "shinjuku").is_none());
        assert_eq!(summary.imported_count(), 2);
        assert_eq!(
            sinks.store.lock().unwrap().opened,
            vec!["osaka".to_string(), "osaka".to_string()]
        );
    }
}
