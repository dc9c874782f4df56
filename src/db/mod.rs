//! Database module for SQLite persistence using SeaORM

pub mod entities;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    create_tables(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await?;
    Ok(())
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL DEFAULT '',
            is_staff INTEGER NOT NULL DEFAULT 0,
            is_superuser INTEGER NOT NULL DEFAULT 0,
            permissions TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS families (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS farmers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth TEXT,
            date_of_death TEXT
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"CREATE INDEX IF NOT EXISTS idx_farmers_name ON farmers(last_name, first_name)"#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS farmer_families (
            farmer_id INTEGER NOT NULL,
            family_id INTEGER NOT NULL,
            PRIMARY KEY (farmer_id, family_id),
            FOREIGN KEY (farmer_id) REFERENCES farmers(id) ON DELETE CASCADE,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Vegetables keep their row when the farmer goes away
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS vegetables (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            farmer_id INTEGER,
            summary TEXT NOT NULL DEFAULT '',
            isbn TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (farmer_id) REFERENCES farmers(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"CREATE INDEX IF NOT EXISTS idx_vegetables_farmer ON vegetables(farmer_id)"#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS vegetable_families (
            vegetable_id INTEGER NOT NULL,
            family_id INTEGER NOT NULL,
            PRIMARY KEY (vegetable_id, family_id),
            FOREIGN KEY (vegetable_id) REFERENCES vegetables(id) ON DELETE CASCADE,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS vegetable_instances (
            id TEXT PRIMARY KEY,
            vegetable_id INTEGER,
            harvest TEXT NOT NULL DEFAULT '',
            exp_date TEXT,
            borrower_id INTEGER,
            status TEXT NOT NULL DEFAULT 'm',
            FOREIGN KEY (vegetable_id) REFERENCES vegetables(id) ON DELETE SET NULL,
            FOREIGN KEY (borrower_id) REFERENCES users(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"CREATE INDEX IF NOT EXISTS idx_instances_vegetable ON vegetable_instances(vegetable_id)"#,
    )
    .await?;
    execute(
        db,
        r#"CREATE INDEX IF NOT EXISTS idx_instances_borrower ON vegetable_instances(borrower_id, status)"#,
    )
    .await?;
    execute(
        db,
        r#"CREATE INDEX IF NOT EXISTS idx_instances_exp_date ON vegetable_instances(exp_date)"#,
    )
    .await?;

    tracing::info!("Database tables initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("catalog.db");

        let db = init_database(&path).await.unwrap();
        create_tables(&db).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_optional_references_set_null_on_delete() {
        let temp_dir = TempDir::new().unwrap();
        let db = init_database(&temp_dir.path().join("catalog.db")).await.unwrap();

        for (table, expected) in [
            ("vegetable_instances", vec![("users", "SET NULL"), ("vegetables", "SET NULL")]),
            ("vegetables", vec![("farmers", "SET NULL")]),
            ("farmer_families", vec![("families", "CASCADE"), ("farmers", "CASCADE")]),
        ] {
            let sql = format!(
                r#"SELECT "table" AS target, on_delete FROM pragma_foreign_key_list('{}') ORDER BY target"#,
                table
            );
            let rows = db
                .query_all(Statement::from_string(db.get_database_backend(), sql))
                .await
                .unwrap();
            let actions: Vec<(String, String)> = rows
                .iter()
                .map(|row| {
                    (
                        row.try_get::<String>("", "target").unwrap(),
                        row.try_get::<String>("", "on_delete").unwrap(),
                    )
                })
                .collect();
            let expected: Vec<(String, String)> = expected
                .into_iter()
                .map(|(t, a)| (t.to_string(), a.to_string()))
                .collect();
            assert_eq!(actions, expected, "foreign keys of {}", table);
        }
    }
}
