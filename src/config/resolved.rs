//! Resolved table descriptions: config validated and flattened for runtime use.

use crate::case::{to_camel_case, to_snake_case};
use crate::error::ConfigError;
use crate::sql::SortDirective;
use serde_json::{Map, Value};

/// API names of the store-managed fields every table carries.
pub const BASE_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Column definitions backing [`BASE_FIELDS`].
pub const BASE_COLUMNS: [(&str, &str, &str); 3] = [
    ("id", "uuid", "gen_random_uuid()"),
    ("created_at", "timestamptz", "NOW()"),
    ("updated_at", "timestamptz", "NOW()"),
];

pub fn is_base_field(field: &str) -> bool {
    BASE_FIELDS.contains(&field)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    /// Column name (snake_case).
    pub name: String,
    /// API field name (camelCase).
    pub field: String,
    pub pg_type: String,
    pub nullable: bool,
    /// Whether the column has a DB default (e.g. gen_random_uuid(), NOW()).
    pub has_default: bool,
    pub default: Option<String>,
    pub unique: bool,
}

impl ColumnInfo {
    pub fn is_base(&self) -> bool {
        is_base_field(&self.field)
    }

    /// Type used for `$n::type` casts; length modifiers are dropped.
    pub fn cast_type(&self) -> &str {
        match self.pg_type.find('(') {
            Some(i) => self.pg_type[..i].trim(),
            None => self.pg_type.as_str(),
        }
    }

    /// Whether rows must carry this column as `::text`: true for every type the
    /// row decoder has no native arm for (numeric, interval, inet, arrays, ...).
    pub fn selects_as_text(&self) -> bool {
        !matches!(
            self.cast_type().to_ascii_lowercase().as_str(),
            "smallint"
                | "int2"
                | "integer"
                | "int"
                | "int4"
                | "bigint"
                | "int8"
                | "serial"
                | "bigserial"
                | "real"
                | "float4"
                | "double precision"
                | "float8"
                | "boolean"
                | "bool"
                | "uuid"
                | "timestamptz"
                | "timestamp with time zone"
                | "timestamp"
                | "timestamp without time zone"
                | "date"
                | "text"
                | "varchar"
                | "character varying"
                | "char"
                | "character"
                | "json"
                | "jsonb"
        )
    }
}

#[derive(Clone, Debug)]
pub struct TableDescription {
    pub schema_name: String,
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
    pub default_sort: Vec<SortDirective>,
}

impl TableDescription {
    pub fn column(&self, field: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Column name for an API field, or a configuration error naming the table.
    pub fn column_for(&self, field: &str) -> Result<&ColumnInfo, ConfigError> {
        self.column(field).ok_or_else(|| ConfigError::UnknownField {
            table: self.table_name.clone(),
            field: field.to_string(),
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field.as_str())
    }

    /// Fields a client may write: everything except the base fields.
    pub fn writable_fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter(|c| !c.is_base()).map(|c| c.field.as_str())
    }

    /// Strict-shape check: every key must be a non-base field of this table.
    pub fn check_write_shape(&self, payload: &Map<String, Value>) -> Result<(), ConfigError> {
        for key in payload.keys() {
            if is_base_field(key) {
                return Err(ConfigError::BaseFieldWrite {
                    table: self.table_name.clone(),
                    field: key.clone(),
                });
            }
            self.column_for(key)?;
        }
        Ok(())
    }

    /// Rename row keys from column names to API field names.
    pub fn row_from_columns(&self, row: Map<String, Value>) -> Map<String, Value> {
        row.into_iter()
            .map(|(k, v)| match self.columns.iter().find(|c| c.name == k) {
                Some(c) => (c.field.clone(), v),
                None => (to_camel_case(&k), v),
            })
            .collect()
    }
}

impl ColumnInfo {
    pub(crate) fn from_config(c: &crate::config::ColumnConfig) -> Self {
        let name = to_snake_case(&c.name);
        ColumnInfo {
            field: to_camel_case(&name),
            name,
            pg_type: c.type_.trim().to_lowercase(),
            nullable: c.nullable,
            has_default: c.default.is_some(),
            default: c.default.clone(),
            unique: c.unique,
        }
    }
}
