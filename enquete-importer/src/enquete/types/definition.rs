//! Resolved mapping definitions and their column layout

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::{FieldSpec, FieldType};

/// Generated column holding the facility code
pub const FACILITY_CODE_COLUMN: &str = "facility_code";
/// Generated column holding the derived natural key
pub const ENQUETE_KEY_COLUMN: &str = "enquete_key";
/// Generated column holding the build timestamp
pub const IMPORT_DATE_COLUMN: &str = "import_date";

/// Generated columns appended after every mapped column, in order
pub const GENERATED_COLUMNS: [(&str, FieldType); 3] = [
    (FACILITY_CODE_COLUMN, FieldType::Integer),
    (ENQUETE_KEY_COLUMN, FieldType::String),
    (IMPORT_DATE_COLUMN, FieldType::DateTime),
];

/// One destination column and the type its values are bound as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub field_type: FieldType,
}

impl Column {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Column {
            name: name.into(),
            field_type,
        }
    }
}

/// A fully normalized mapping: five typed sections of destination column ->
/// field spec, each in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingDefinition {
    pub string: IndexMap<String, FieldSpec>,
    pub text: IndexMap<String, FieldSpec>,
    pub integer: IndexMap<String, FieldSpec>,
    pub date: IndexMap<String, FieldSpec>,
    pub datetime: IndexMap<String, FieldSpec>,
}

impl MappingDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a section by type
    pub fn section(&self, field_type: FieldType) -> &IndexMap<String, FieldSpec> {
        match field_type {
            FieldType::String => &self.string,
            FieldType::Text => &self.text,
            FieldType::Integer => &self.integer,
            FieldType::Date => &self.date,
            FieldType::DateTime => &self.datetime,
        }
    }

    /// Get a section by type (mutable)
    pub fn section_mut(&mut self, field_type: FieldType) -> &mut IndexMap<String, FieldSpec> {
        match field_type {
            FieldType::String => &mut self.string,
            FieldType::Text => &mut self.text,
            FieldType::Integer => &mut self.integer,
            FieldType::Date => &mut self.date,
            FieldType::DateTime => &mut self.datetime,
        }
    }

    /// Register a field, replacing an earlier registration in the same section
    pub fn insert(&mut self, field_type: FieldType, column: impl Into<String>, spec: FieldSpec) {
        self.section_mut(field_type).insert(column.into(), spec);
    }

    /// Iterate all declared fields in section order
    pub fn fields(&self) -> impl Iterator<Item = (FieldType, &String, &FieldSpec)> {
        FieldType::ALL.into_iter().flat_map(move |ty| {
            self.section(ty)
                .iter()
                .map(move |(column, spec)| (ty, column, spec))
        })
    }

    /// Number of declared (non-generated) fields
    pub fn field_count(&self) -> usize {
        FieldType::ALL.iter().map(|ty| self.section(*ty).len()).sum()
    }

    /// Destination columns in write order, generated columns last.
    ///
    /// A column declared in more than one section keeps its first position
    /// and takes the type of its last declaration.
    pub fn columns(&self) -> Vec<Column> {
        with_generated(self.mapped_columns())
    }

    /// Declared destination columns without the generated ones
    pub fn mapped_columns(&self) -> Vec<Column> {
        let mut columns: IndexMap<String, FieldType> = IndexMap::new();
        for (ty, column, _) in self.fields() {
            columns.insert(column.clone(), ty);
        }
        columns
            .into_iter()
            .map(|(name, field_type)| Column { name, field_type })
            .collect()
    }

    /// Headers that must exist in the worksheet for this mapping
    pub fn required_headers(&self) -> BTreeSet<String> {
        self.fields()
            .filter(|(_, _, spec)| !spec.source_header.is_empty())
            .map(|(_, _, spec)| spec.source_header.clone())
            .collect()
    }

    /// Find a field by destination column in the given section
    pub fn find_field(&self, field_type: FieldType, column: &str) -> Option<&FieldSpec> {
        self.section(field_type).get(column)
    }
}

/// Append the generated columns; a mapped column sharing a generated name
/// keeps its position but takes the generated type
pub fn with_generated(columns: Vec<Column>) -> Vec<Column> {
    let mut ordered: IndexMap<String, FieldType> = columns
        .into_iter()
        .map(|c| (c.name, c.field_type))
        .collect();
    for (name, ty) in GENERATED_COLUMNS {
        ordered.insert(name.to_string(), ty);
    }
    ordered
        .into_iter()
        .map(|(name, field_type)| Column { name, field_type })
        .collect()
}
