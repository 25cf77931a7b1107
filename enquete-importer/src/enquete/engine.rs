//! Record builder - applies a resolved mapping to raw rows

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

use crate::enquete::convert::{
    ParseSettings, apply_conversion, normalize_str, parse_date, parse_datetime, parse_integer,
    sanitize_shift_jis, to_full_width_kana, to_half_width,
};
use crate::enquete::{
    Column, ENQUETE_KEY_COLUMN, FACILITY_CODE_COLUMN, FieldSpec, FieldType, IMPORT_DATE_COLUMN,
    ImportJob, KeyOptions, MappingDefinition, MappingSelector, RawRow, Value,
};

/// Typed output of one (row, mapping) pair, keyed by destination column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: IndexMap<String, Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Values in the given column order; columns this record lacks are null
    pub fn values_for(&self, columns: &[Column]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| self.values.get(&c.name).cloned().unwrap_or_default())
            .collect()
    }
}

/// Column-ordered rows ready for the sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobBatch {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
    /// Rows dropped because no language variant applied
    pub skipped: usize,
}

/// Builds records for one facility
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    settings: &'a ParseSettings,
    key_options: &'a KeyOptions,
    facility_code: i64,
    import_date: Option<DateTime<FixedOffset>>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(settings: &'a ParseSettings, key_options: &'a KeyOptions, facility_code: i64) -> Self {
        RecordBuilder {
            settings,
            key_options,
            facility_code,
            import_date: None,
        }
    }

    /// Pin the import timestamp instead of reading the clock per record
    pub fn with_import_date(mut self, import_date: DateTime<FixedOffset>) -> Self {
        self.import_date = Some(import_date);
        self
    }

    /// Apply `mapping` to `row`, then append the generated columns
    pub fn build(&self, row: &RawRow, mapping: &MappingDefinition) -> Record {
        let mut values = IndexMap::with_capacity(mapping.field_count() + 3);

        for (field_type, column, spec) in mapping.fields() {
            values.insert(column.clone(), self.field_value(field_type, spec, row));
        }

        values.insert(FACILITY_CODE_COLUMN.to_string(), Value::Int(self.facility_code));
        values.insert(
            ENQUETE_KEY_COLUMN.to_string(),
            Value::from_opt_string(self.enquete_key(row, mapping)),
        );
        values.insert(
            IMPORT_DATE_COLUMN.to_string(),
            Value::DateTime(self.import_date.unwrap_or_else(|| self.settings.zone.now())),
        );

        Record { values }
    }

    /// Parse one declared field; failures degrade to null
    pub fn field_value(&self, field_type: FieldType, spec: &FieldSpec, row: &RawRow) -> Value {
        let raw = normalize_str(row.get(&spec.source_header));
        let value = apply_conversion(&raw, spec.conversion.as_deref());

        match field_type {
            FieldType::String => Value::from_opt_string(non_empty(&value).map(to_full_width_kana)),
            FieldType::Text => Value::from_opt_string(
                non_empty(&value).map(|v| to_full_width_kana(&sanitize_shift_jis(v))),
            ),
            FieldType::Integer => parse_integer(&value, spec.clamp).into(),
            FieldType::Date => parse_date(&value, self.settings).into(),
            FieldType::DateTime => parse_datetime(&value, self.settings).into(),
        }
    }

    /// Derive `{room}-{YYYYMMDD}-{tie_break}` with the configured affixes.
    ///
    /// `None` when the mapping lacks the room or start column, the room is
    /// not a whole number, or the start date does not parse.
    pub fn enquete_key(&self, row: &RawRow, mapping: &MappingDefinition) -> Option<String> {
        let options = self.key_options;

        let (room_type, room_spec) = mapping
            .find_field(FieldType::String, &options.room_column)
            .map(|spec| (FieldType::String, spec))
            .or_else(|| {
                mapping
                    .find_field(FieldType::Integer, &options.room_column)
                    .map(|spec| (FieldType::Integer, spec))
            })?;
        let start_spec = mapping
            .find_field(FieldType::Date, &options.start_column)
            .or_else(|| mapping.find_field(FieldType::DateTime, &options.start_column))?;

        let raw_room = normalize_str(row.get(&room_spec.source_header));
        let raw_room = apply_conversion(&raw_room, room_spec.conversion.as_deref());
        let room = match room_type {
            FieldType::Integer => parse_integer(&raw_room, room_spec.clamp)?.to_string(),
            _ => {
                let folded = to_half_width(&raw_room);
                if folded.is_empty() || !folded.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                folded
            }
        };

        let raw_start = normalize_str(row.get(&start_spec.source_header));
        let raw_start = apply_conversion(&raw_start, start_spec.conversion.as_deref());
        let start = parse_date(&raw_start, self.settings)?;

        Some(options.format(&room, start, self.facility_code))
    }

    /// Build every row of a job into column-ordered values.
    ///
    /// Rows of a language job whose discriminator matches no variant, with no
    /// fallback, are skipped with a warning.
    pub fn build_job(&self, job: &ImportJob, rows: &[RawRow]) -> JobBatch {
        let columns = job.selector.columns();
        let mut batch = JobBatch {
            rows: Vec::with_capacity(rows.len()),
            columns,
            skipped: 0,
        };

        for (index, row) in rows.iter().enumerate() {
            let Some(mapping) = job.selector.select(row) else {
                log::warn!(
                    "Skipping row {} for table {}: no language mapping for '{}'",
                    index + 2,
                    job.table,
                    discriminator(job, row)
                );
                batch.skipped += 1;
                continue;
            };
            let record = self.build(row, mapping);
            batch.rows.push(record.values_for(&batch.columns));
        }

        batch
    }
}

fn discriminator<'r>(job: &ImportJob, row: &'r RawRow) -> &'r str {
    match &job.selector {
        MappingSelector::ByLanguage(variants) => row.get(&variants.column),
        MappingSelector::Single(_) => "",
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enquete::{Clamp, LanguageVariants, TieBreak};
    use chrono::{NaiveDate, TimeZone};

    fn mapping() -> MappingDefinition {
        let mut mapping = MappingDefinition::new();
        mapping.insert(FieldType::String, "room_number", FieldSpec::new("部屋番号"));
        mapping.insert(FieldType::String, "name", FieldSpec::new("氏名"));
        mapping.insert(FieldType::Text, "comment", FieldSpec::new("ご意見"));
        mapping.insert(
            FieldType::Integer,
            "overall",
            FieldSpec::new("総合評価").with_clamp(Clamp::EVALUATION_SCORE),
        );
        mapping.insert(FieldType::Date, "start_date", FieldSpec::new("宿泊開始日"));
        mapping.insert(FieldType::DateTime, "answered_at", FieldSpec::new("タイムスタンプ"));
        mapping
    }

    fn row(room: &str) -> RawRow {
        RawRow::from_pairs([
            ("部屋番号", room),
            ("氏名", "ﾔﾏﾀﾞ ﾀﾛｳ"),
            ("ご意見", "とても良かった😀"),
            ("総合評価", "87.5"),
            ("宿泊開始日", "2024年3月5日"),
            ("タイムスタンプ", "2024/03/06 10:15:00"),
        ])
    }

    fn fixed_now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 4, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_build_full_record() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 1203).with_import_date(fixed_now());

        let record = builder.build(&row("101"), &mapping());

        assert_eq!(record.get("room_number"), Some(&Value::String("101".into())));
        assert_eq!(record.get("name"), Some(&Value::String("ヤマダ タロウ".into())));
        assert_eq!(record.get("comment"), Some(&Value::String("とても良かった?".into())));
        assert_eq!(record.get("overall"), Some(&Value::Int(87)));
        assert_eq!(
            record.get("start_date"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        assert!(record.get("answered_at").unwrap().as_datetime().is_some());
        assert_eq!(record.get("facility_code"), Some(&Value::Int(1203)));
        assert_eq!(
            record.get("enquete_key"),
            Some(&Value::String("101-20240305-1".into()))
        );
        assert_eq!(record.get("import_date"), Some(&Value::DateTime(fixed_now())));
    }

    #[test]
    fn test_key_with_affixes() {
        let settings = ParseSettings::default();
        let key = KeyOptions {
            prefix: Some("A-".into()),
            suffix: Some("X".into()),
            ..KeyOptions::default()
        };
        let builder = RecordBuilder::new(&settings, &key, 1);
        assert_eq!(
            builder.enquete_key(&row("101"), &mapping()),
            Some("A-101-20240305-1-X".to_string())
        );
    }

    #[test]
    fn test_blank_room_yields_null_key_only() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 7).with_import_date(fixed_now());

        let record = builder.build(&row(""), &mapping());
        assert_eq!(record.get("enquete_key"), Some(&Value::Null));
        assert_eq!(record.get("room_number"), Some(&Value::Null));
        assert_eq!(record.get("overall"), Some(&Value::Int(87)));
        assert_eq!(record.get("facility_code"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_room_must_be_numeric_after_folding() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 7);

        assert_eq!(
            builder.enquete_key(&row("１０１"), &mapping()),
            Some("101-20240305-1".to_string())
        );
        assert_eq!(builder.enquete_key(&row("101A"), &mapping()), None);
    }

    #[test]
    fn test_integer_room_and_facility_tie_break() {
        let settings = ParseSettings::default();
        let key = KeyOptions {
            tie_break: TieBreak::FacilityCode,
            ..KeyOptions::default()
        };
        let builder = RecordBuilder::new(&settings, &key, 1203);

        let mut mapping = MappingDefinition::new();
        mapping.insert(FieldType::Integer, "room_number", FieldSpec::new("部屋番号"));
        mapping.insert(FieldType::DateTime, "start_date", FieldSpec::new("宿泊開始日"));

        assert_eq!(
            builder.enquete_key(&row("0305.0"), &mapping),
            Some("305-20240305-1203".to_string())
        );
    }

    #[test]
    fn test_blank_string_cells_are_null() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 1);
        let row = RawRow::from_pairs([("氏名", "   "), ("ご意見", "")]);

        let record = builder.build(&row, &mapping());
        assert_eq!(record.get("name"), Some(&Value::Null));
        assert_eq!(record.get("comment"), Some(&Value::Null));
        assert_eq!(record.get("start_date"), Some(&Value::Null));
    }

    #[test]
    fn test_conversion_applies_before_parsing() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 1);

        let table = [("Good".to_string(), "良い".to_string())].into_iter().collect();
        let levels = [("満足".to_string(), "5".to_string())].into_iter().collect();
        let mut mapping = MappingDefinition::new();
        mapping.insert(FieldType::String, "rating", FieldSpec::new("評価").with_conversion(table));
        mapping.insert(FieldType::Integer, "level", FieldSpec::new("満足度").with_conversion(levels));
        let row = RawRow::from_pairs([("評価", "Good"), ("満足度", "満足")]);

        let record = builder.build(&row, &mapping);
        assert_eq!(record.get("rating"), Some(&Value::String("良い".into())));
        assert_eq!(record.get("level"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_build_job_skips_unmatched_language_rows() {
        let settings = ParseSettings::default();
        let key = KeyOptions::default();
        let builder = RecordBuilder::new(&settings, &key, 1).with_import_date(fixed_now());

        let mut english = MappingDefinition::new();
        english.insert(FieldType::String, "answer", FieldSpec::new("Q1"));
        let mut variants = LanguageVariants::new("言語");
        variants.add_variant("English", english);
        let job = ImportJob::new("enquetes", MappingSelector::ByLanguage(variants));

        let rows = vec![
            RawRow::from_pairs([("言語", "English"), ("Q1", "Yes")]),
            RawRow::from_pairs([("言語", "中文"), ("Q1", "是")]),
            RawRow::from_pairs([("言語", "english"), ("Q1", "No")]),
        ];

        let batch = builder.build_job(&job, &rows);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.columns[0].name, "answer");
        assert_eq!(batch.rows[1][0], Value::String("No".into()));
        assert_eq!(batch.rows[1].len(), batch.columns.len());
    }
}
