//! Long-lived opaque tokens that trade in for a new session. Each is single use:
//! redeeming one revokes it and issues its successor.

use crate::config::{ColumnConfig, TableConfig};
use crate::repository::Row;
use crate::sql::Filter;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;

pub const TABLE: &str = "refresh_tokens";

pub fn table() -> TableConfig {
    TableConfig {
        name: TABLE.into(),
        schema: None,
        columns: vec![
            ColumnConfig::new("user_id", "uuid"),
            ColumnConfig::new("token", "varchar(64)").unique(),
            ColumnConfig::new("revoked", "boolean").default_expr("false"),
            ColumnConfig::new("expires_at", "timestamptz"),
        ],
        default_sort: vec![],
    }
}

/// 64 hex characters from two v4 UUIDs.
pub fn generate() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

/// Insert payload for a fresh token owned by `user_id`.
pub fn new_row(user_id: &str, token: &str, ttl_secs: u64, now: DateTime<Utc>) -> Row {
    let expires_at = now + Duration::seconds(ttl_secs as i64);
    let mut row = Row::new();
    row.insert("userId".into(), Value::String(user_id.to_string()));
    row.insert("token".into(), Value::String(token.to_string()));
    row.insert(
        "expiresAt".into(),
        Value::String(expires_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    row
}

/// Unrevoked row carrying `token`.
pub fn redeemable(token: &str) -> Filter {
    Filter::eq("token", token).and_eq("revoked", false)
}

/// Whether `row` is still within its lifetime at `now`. Unparseable expiry counts as expired.
pub fn is_current(row: &Row, now: DateTime<Utc>) -> bool {
    row.get("expiresAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(false, |expires| expires.with_timezone(&Utc) > now)
}
