//! Equality filters over API field names.

use crate::config::TableDescription;
use crate::error::ConfigError;
use serde_json::Value;

/// Conjunction of `field = value` terms. Empty matches every row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Filter::default()
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.terms.push((field.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    /// Does a row keyed by field names satisfy every term.
    pub fn matches(&self, row: &serde_json::Map<String, Value>) -> bool {
        self.terms
            .iter()
            .all(|(field, value)| row.get(field).unwrap_or(&Value::Null) == value)
    }

    /// Resolve terms to columns; unknown fields are configuration errors.
    pub(crate) fn conditions<'t>(
        &self,
        table: &'t TableDescription,
    ) -> Result<Vec<(&'t crate::config::ColumnInfo, &Value)>, ConfigError> {
        self.terms
            .iter()
            .map(|(field, value)| Ok((table.column_for(field)?, value)))
            .collect()
    }
}
