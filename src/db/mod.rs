//! Database connection and schema setup for SQLite using SeaORM

use crate::config::toml_config::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

/// Foreign key constraint name: `fk_<table>_<column>_<referenced_table>`.
pub fn fk_constraint_name(table: &str, column: &str, referenced_table: &str) -> String {
    format!("fk_{}_{}_{}", table, column, referenced_table)
}

/// Idle timeout and lifetime of the single connection holding an in-memory database.
pub const IN_MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Pool options for the configured database.
///
/// An in-memory database is gone once its connection closes, so that
/// connection is never recycled for idleness or age.
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(1)
        .sqlx_logging(config.sqlx_logging);

    if config.is_in_memory() {
        options
            .idle_timeout(IN_MEMORY_CONNECTION_LIFETIME)
            .max_lifetime(IN_MEMORY_CONNECTION_LIFETIME);
    }

    options
}

/// Open a connection pool as configured and create the catalog tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    tracing::info!("Connecting to database: {}", config.url);

    let db = Database::connect(connect_options(config)).await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS heroes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            super_name TEXT NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS powers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    // Join rows die with either parent
    db.execute(Statement::from_string(
        db.get_database_backend(),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS hero_powers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                strength TEXT NOT NULL,
                hero_id INTEGER NOT NULL,
                power_id INTEGER NOT NULL,
                CONSTRAINT {} FOREIGN KEY (hero_id) REFERENCES heroes(id) ON DELETE CASCADE,
                CONSTRAINT {} FOREIGN KEY (power_id) REFERENCES powers(id) ON DELETE CASCADE
            )
            "#,
            fk_constraint_name("hero_powers", "hero_id", "heroes"),
            fk_constraint_name("hero_powers", "power_id", "powers"),
        ),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_hero_powers_hero ON hero_powers(hero_id)"#.to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_hero_powers_power ON hero_powers(power_id)"#.to_string(),
    ))
    .await?;

    tracing::debug!("Catalog tables ready");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fk_constraint_names() {
        assert_eq!(
            fk_constraint_name("hero_powers", "hero_id", "heroes"),
            "fk_hero_powers_hero_id_heroes"
        );
        assert_eq!(
            fk_constraint_name("hero_powers", "power_id", "powers"),
            "fk_hero_powers_power_id_powers"
        );
    }

    #[test]
    fn test_in_memory_connection_is_not_recycled() {
        let options = connect_options(&DatabaseConfig::default());
        assert_eq!(options.get_max_connections(), Some(1));
        assert_eq!(options.get_idle_timeout(), Some(IN_MEMORY_CONNECTION_LIFETIME));
        assert_eq!(options.get_max_lifetime(), Some(IN_MEMORY_CONNECTION_LIFETIME));

        let file = DatabaseConfig {
            url: "sqlite://catalog.db?mode=rwc".to_string(),
            max_connections: 4,
            sqlx_logging: false,
        };
        let options = connect_options(&file);
        assert_eq!(options.get_max_connections(), Some(4));
        assert_ne!(options.get_idle_timeout(), Some(IN_MEMORY_CONNECTION_LIFETIME));
        assert_ne!(options.get_max_lifetime(), Some(IN_MEMORY_CONNECTION_LIFETIME));
    }

    #[tokio::test]
    async fn test_schema_carries_named_constraints() {
        let db = init_database(&DatabaseConfig::default()).await.unwrap();

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'hero_powers'"
                    .to_string(),
            ))
            .await
            .unwrap()
            .expect("hero_powers table exists");
        let sql: String = row.try_get("", "sql").unwrap();

        assert!(sql.contains("CONSTRAINT fk_hero_powers_hero_id_heroes"));
        assert!(sql.contains("CONSTRAINT fk_hero_powers_power_id_powers"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() {
        let db = init_database(&DatabaseConfig::default()).await.unwrap();
        assert!(create_tables(&db).await.is_ok());
    }
}
