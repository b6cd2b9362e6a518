//! Table description validation: identifiers, duplicates, base columns, default sort.

use crate::config::resolved::{TableDescription, BASE_COLUMNS};
use crate::error::ConfigError;
use crate::sql::translate;
use regex::Regex;
use std::collections::HashSet;

const IDENTIFIER: &str = r"^[a-z_][a-z0-9_]{0,62}$";

pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let re = Regex::new(IDENTIFIER).map_err(|e| ConfigError::Validation(e.to_string()))?;
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(name.to_string()))
    }
}

pub fn validate_table(table: &TableDescription) -> Result<(), ConfigError> {
    validate_identifier(&table.schema_name)?;
    validate_identifier(&table.table_name)?;

    let mut seen = HashSet::new();
    for c in &table.columns {
        validate_identifier(&c.name)?;
        if !seen.insert(c.name.as_str()) {
            return Err(ConfigError::DuplicateColumn {
                table: table.table_name.clone(),
                column: c.name.clone(),
            });
        }
    }

    for (column, _, _) in BASE_COLUMNS {
        if !seen.contains(column) {
            return Err(ConfigError::MissingBaseColumn {
                table: table.table_name.clone(),
                column: column.to_string(),
            });
        }
    }

    translate(&table.default_sort, table)?;
    Ok(())
}

pub fn validate(tables: &[TableDescription]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for t in tables {
        validate_table(t)?;
        if !names.insert(t.table_name.as_str()) {
            return Err(ConfigError::DuplicateTable(t.table_name.clone()));
        }
    }
    Ok(())
}
