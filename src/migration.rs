//! Apply table descriptions to the database: schema, table with base columns, unique
//! constraints, and a `created_at DESC` index. Idempotent.

use crate::config::TableDescription;
use crate::error::AppError;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// DDL statements for one table, in execution order.
pub fn table_ddl(table: &TableDescription) -> Vec<String> {
    let schema = quote(&table.schema_name);
    let full_name = format!("{}.{}", schema, quote(&table.table_name));

    let mut col_defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quote(&c.name), c.pg_type);
            if !c.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(d) = &c.default {
                def.push_str(" DEFAULT ");
                def.push_str(d);
            }
            def
        })
        .collect();
    col_defs.push(format!("PRIMARY KEY ({})", quote("id")));
    for c in table.columns.iter().filter(|c| c.unique) {
        col_defs.push(format!("UNIQUE ({})", quote(&c.name)));
    }

    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", schema),
        format!("CREATE TABLE IF NOT EXISTS {} ({})", full_name, col_defs.join(", ")),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({} DESC)",
            quote(&format!("{}_created_at_idx", table.table_name)),
            full_name,
            quote("created_at")
        ),
    ]
}

pub async fn apply_migrations(pool: &PgPool, tables: &[TableDescription]) -> Result<(), AppError> {
    for table in tables {
        for sql in table_ddl(table) {
            tracing::debug!(sql = %sql, "migration");
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::info!(table = %table.table_name, "table ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_table;
    use crate::entities::user;

    #[test]
    fn users_ddl_has_base_columns_and_unique_email() {
        let ddl = table_ddl(&resolve_table(&user::table()).unwrap());
        assert_eq!(ddl.len(), 3);
        let create = &ddl[1];
        assert!(create.starts_with(r#"CREATE TABLE IF NOT EXISTS "public"."users" ("id" uuid NOT NULL DEFAULT gen_random_uuid()"#));
        assert!(create.contains(r#""created_at" timestamptz NOT NULL DEFAULT NOW()"#));
        assert!(create.contains(r#""email" varchar(255) NOT NULL"#));
        assert!(create.contains(r#"UNIQUE ("email")"#));
        assert!(ddl[2].ends_with(r#"("created_at" DESC)"#));
    }
}
