//! Database module
//!
//! Connectivity and schema checks. The schema itself lives in `migrations/`.

use sqlx::PgPool;

/// Tables the service reads and writes, as `(schema, table)`
const REQUIRED_TABLES: &[(&str, &str)] = &[
    ("auth", "users"),
    ("public", "profiles"),
    ("public", "accounts"),
    ("public", "categories"),
    ("public", "transactions"),
    ("public", "budgets"),
    ("public", "goals"),
];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for (schema, table) in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}.{}' does not exist", schema, table);
            return Ok(false);
        }
    }

    Ok(true)
}
