//! Builds parameterized COUNT, SELECT, INSERT, UPDATE and DELETE for one table description.
//! Identifiers come from validated config only; values are always bound as parameters.

use crate::config::{ColumnInfo, TableDescription};
use crate::error::ConfigError;
use crate::sql::{Filter, OrderBy};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(table: &TableDescription) -> String {
    format!("{}.{}", quoted(&table.schema_name), quoted(&table.table_name))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value and return its placeholder cast to the column type.
    fn placeholder(&mut self, column: &ColumnInfo, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, column.cast_type())
    }
}

/// SELECT list: types without a native decoder (numeric, interval, ...) come back as text.
fn select_column_list(table: &TableDescription) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            if c.selects_as_text() {
                format!("{}::text AS {}", q, q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(q: &mut QueryBuf, table: &TableDescription, filter: &Filter) -> Result<String, ConfigError> {
    let mut parts = Vec::new();
    for (column, value) in filter.conditions(table)? {
        if value.is_null() {
            parts.push(format!("{} IS NULL", quoted(&column.name)));
        } else {
            let ph = q.placeholder(column, value.clone());
            parts.push(format!("{} = {}", quoted(&column.name), ph));
        }
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

fn id_clause(q: &mut QueryBuf, table: &TableDescription, id: &str) -> Result<String, ConfigError> {
    let column = table.column_for("id")?;
    let ph = q.placeholder(column, Value::String(id.to_string()));
    Ok(format!(" WHERE {} = {}", quoted(&column.name), ph))
}

/// SET terms for a partial write; `updated_at` is always bumped.
fn set_clause(q: &mut QueryBuf, table: &TableDescription, data: &Map<String, Value>) -> Result<String, ConfigError> {
    table.check_write_shape(data)?;
    let mut sets = Vec::new();
    for (field, value) in data {
        let column = table.column_for(field)?;
        let ph = q.placeholder(column, value.clone());
        sets.push(format!("{} = {}", quoted(&column.name), ph));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    Ok(sets.join(", "))
}

pub fn count(table: &TableDescription, filter: &Filter) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let w = where_clause(&mut q, table, filter)?;
    q.sql = format!("SELECT COUNT(*) AS total FROM {}{}", qualified_table(table), w);
    Ok(q)
}

/// SELECT with equality filter, ORDER BY terms, optional LIMIT/OFFSET (not clamped here).
pub fn select_list(
    table: &TableDescription,
    filter: &Filter,
    order_by: &[OrderBy],
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let w = where_clause(&mut q, table, filter)?;
    let order_clause = if order_by.is_empty() {
        String::new()
    } else {
        let terms: Vec<String> = order_by
            .iter()
            .map(|o| format!("{} {}", quoted(&o.column), o.direction.as_sql()))
            .collect();
        format!(" ORDER BY {}", terms.join(", "))
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        select_column_list(table),
        qualified_table(table),
        w,
        order_clause,
        limit_clause,
        offset_clause
    );
    Ok(q)
}

pub fn select_by_id(table: &TableDescription, id: &str) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let w = id_clause(&mut q, table, id)?;
    q.sql = format!("SELECT {} FROM {}{}", select_column_list(table), qualified_table(table), w);
    Ok(q)
}

/// INSERT of the given fields; omitted columns take their DB default.
pub fn insert(table: &TableDescription, data: &Map<String, Value>) -> Result<QueryBuf, ConfigError> {
    table.check_write_shape(data)?;
    let mut q = QueryBuf::default();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (field, value) in data {
        let column = table.column_for(field)?;
        placeholders.push(q.placeholder(column, value.clone()));
        cols.push(quoted(&column.name));
    }
    let values = if cols.is_empty() {
        " DEFAULT VALUES".to_string()
    } else {
        format!(" ({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {}{} RETURNING {}",
        qualified_table(table),
        values,
        select_column_list(table)
    );
    Ok(q)
}

pub fn update_where(table: &TableDescription, data: &Map<String, Value>, filter: &Filter) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let sets = set_clause(&mut q, table, data)?;
    let w = where_clause(&mut q, table, filter)?;
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        qualified_table(table),
        sets,
        w,
        select_column_list(table)
    );
    Ok(q)
}

pub fn update_by_id(table: &TableDescription, id: &str, data: &Map<String, Value>) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let sets = set_clause(&mut q, table, data)?;
    let w = id_clause(&mut q, table, id)?;
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        qualified_table(table),
        sets,
        w,
        select_column_list(table)
    );
    Ok(q)
}

pub fn delete_where(table: &TableDescription, filter: &Filter) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let w = where_clause(&mut q, table, filter)?;
    q.sql = format!("DELETE FROM {}{} RETURNING {}", qualified_table(table), w, select_column_list(table));
    Ok(q)
}

pub fn delete_by_id(table: &TableDescription, id: &str) -> Result<QueryBuf, ConfigError> {
    let mut q = QueryBuf::default();
    let w = id_clause(&mut q, table, id)?;
    q.sql = format!("DELETE FROM {}{} RETURNING {}", qualified_table(table), w, select_column_list(table));
    Ok(q)
}
