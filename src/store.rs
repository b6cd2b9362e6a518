//! Database bootstrap: create the target database if missing and open the pool.

use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| invalid_url(e.to_string()))?;
    let mut conn = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

pub async fn connect(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await?;
    Ok(pool)
}

fn invalid_url(message: String) -> AppError {
    ConfigError::Env {
        key: "DATABASE_URL",
        message,
    }
    .into()
}

/// Split a URL into (same server's `postgres` database URL, target database name).
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| invalid_url("no database path".into()))?;
    let (db_name, query) = match url[path_start..].split_once('?') {
        Some((name, q)) => (name, Some(q)),
        None => (&url[path_start..], None),
    };
    let mut admin_url = format!("{}postgres", &url[..path_start]);
    if let Some(q) = query {
        admin_url.push('?');
        admin_url.push_str(q);
    }
    Ok((admin_url, db_name.trim().to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("postgres://u:p@localhost:5432/taskhub", "postgres://u:p@localhost:5432/postgres", "taskhub")]
    #[case("postgres://localhost/taskhub?sslmode=disable", "postgres://localhost/postgres?sslmode=disable", "taskhub")]
    #[case("postgres://localhost/", "postgres://localhost/postgres", "")]
    fn splits_admin_url(#[case] url: &str, #[case] admin: &str, #[case] db: &str) {
        assert_eq!(split_database_url(url).unwrap(), (admin.to_string(), db.to_string()));
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(split_database_url("postgres://localhost").is_err());
    }
}
