//! Raw config types: table descriptions as collaborators supply them, and request field rules.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column name in snake_case; the API field name is its camelCase form.
    pub name: String,
    /// PostgreSQL type, e.g. `varchar(200)`, `boolean`, `uuid`.
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub nullable: bool,
    /// SQL default expression, e.g. `false` or `NOW()`.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

impl ColumnConfig {
    pub fn new(name: &str, type_: &str) -> Self {
        ColumnConfig {
            name: name.to_string(),
            type_: type_.to_string(),
            nullable: false,
            default: None,
            unique: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_expr(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub columns: Vec<ColumnConfig>,
    /// Sort directives over API field names (`-createdAt`). Empty means `-createdAt`.
    #[serde(default)]
    pub default_sort: Vec<String>,
}

/// JSON type a request field must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

impl ValidationRule {
    pub fn string() -> Self {
        ValidationRule {
            kind: Some(FieldKind::String),
            ..Default::default()
        }
    }

    pub fn integer() -> Self {
        ValidationRule {
            kind: Some(FieldKind::Integer),
            ..Default::default()
        }
    }

    pub fn boolean() -> Self {
        ValidationRule {
            kind: Some(FieldKind::Boolean),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn length(mut self, min: u32, max: u32) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: u32) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }
}
