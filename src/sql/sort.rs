//! Sort directives (`name`, `-createdAt`) and their translation to ORDER BY terms.

use crate::config::TableDescription;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One directive over an API field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortDirective {
    pub field: String,
    pub direction: Direction,
}

impl SortDirective {
    /// `-field` is descending, a bare `field` ascending.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(raw),
        }
    }

    pub fn asc(field: &str) -> Self {
        SortDirective {
            field: field.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        SortDirective {
            field: field.to_string(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => f.write_str(&self.field),
            Direction::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Store-level ordering term: column name plus direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Translate directives left to right. An empty slice falls back to the table's
/// default sort. Duplicate fields are kept, later terms only break ties.
pub fn translate(directives: &[SortDirective], table: &TableDescription) -> Result<Vec<OrderBy>, ConfigError> {
    let directives = if directives.is_empty() {
        table.default_sort.as_slice()
    } else {
        directives
    };
    directives
        .iter()
        .map(|d| {
            let column = table.column_for(&d.field)?;
            Ok(OrderBy {
                column: column.name.clone(),
                direction: d.direction,
            })
        })
        .collect()
}
