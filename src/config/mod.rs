pub mod resolved;
pub mod settings;
pub mod types;
pub mod validator;

pub use resolved::*;
pub use settings::*;
pub use types::*;
pub use validator::*;

use crate::error::ConfigError;
use crate::sql::SortDirective;

/// Resolve one table: add missing base columns, parse the default sort, validate.
pub fn resolve_table(config: &TableConfig) -> Result<TableDescription, ConfigError> {
    let mut columns: Vec<ColumnInfo> = Vec::with_capacity(config.columns.len() + BASE_COLUMNS.len());
    for (name, pg_type, default) in BASE_COLUMNS {
        if !config.columns.iter().any(|c| c.name == name) {
            columns.push(ColumnInfo::from_config(&ColumnConfig::new(name, pg_type).default_expr(default)));
        }
    }
    columns.extend(config.columns.iter().map(ColumnInfo::from_config));
    // base columns first keeps the id column leading in SELECT lists
    columns.sort_by_key(|c| !c.is_base());

    let default_sort = if config.default_sort.is_empty() {
        vec![SortDirective::desc("createdAt")]
    } else {
        config.default_sort.iter().map(|s| SortDirective::parse(s)).collect()
    };

    let table = TableDescription {
        schema_name: config.schema.clone().unwrap_or_else(|| "public".to_string()),
        table_name: config.name.clone(),
        columns,
        default_sort,
    };
    validate_table(&table)?;
    Ok(table)
}

/// Resolve every table and check names are unique.
pub fn resolve(configs: &[TableConfig]) -> Result<Vec<TableDescription>, ConfigError> {
    let tables = configs.iter().map(resolve_table).collect::<Result<Vec<_>, _>>()?;
    validate(&tables)?;
    Ok(tables)
}
