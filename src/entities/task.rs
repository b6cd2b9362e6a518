use crate::config::{ColumnConfig, TableConfig, ValidationRule};
use crate::service::{RequestSchema, Validated};
use serde::{Deserialize, Serialize};

pub const TABLE: &str = "tasks";

pub fn table() -> TableConfig {
    TableConfig {
        name: TABLE.into(),
        schema: None,
        columns: vec![
            ColumnConfig::new("name", "varchar(200)"),
            ColumnConfig::new("done", "boolean").default_expr("false"),
        ],
        default_sort: vec!["-createdAt".into()],
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub done: bool,
}

impl Validated for NewTask {
    fn schema() -> RequestSchema {
        RequestSchema::new()
            .field("name", ValidationRule::string().required().length(1, 200))
            .field("done", ValidationRule::boolean().required())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl Validated for TaskPatch {
    fn schema() -> RequestSchema {
        NewTask::schema()
    }
}
