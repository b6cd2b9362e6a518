use crate::config::{ColumnConfig, TableConfig, ValidationRule};
use crate::repository::Row;
use crate::service::{RequestSchema, Validated};
use serde::Deserialize;

pub const TABLE: &str = "users";

pub fn table() -> TableConfig {
    TableConfig {
        name: TABLE.into(),
        schema: None,
        columns: vec![
            ColumnConfig::new("email", "varchar(255)").unique(),
            ColumnConfig::new("hash", "text"),
        ],
        default_sort: vec![],
    }
}

/// Body of `/register` and `/login`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Validated for Credentials {
    fn schema() -> RequestSchema {
        RequestSchema::new()
            .field(
                "email",
                ValidationRule::string().required().format("email").length(3, 255),
            )
            .field("password", ValidationRule::string().required().min_length(8))
    }
}

/// Row as returned to clients: never carries the password hash.
pub fn public_user(mut row: Row) -> Row {
    row.remove("hash");
    row
}
