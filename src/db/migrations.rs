// Database migrations
// Migrations are forward-only. Never edit or delete a migration after it ships.

use rusqlite::Connection;

use crate::error::{Result, VidSearchError};

/// All migrations in order. Each migration is a SQL string.
const MIGRATIONS: &[&str] = &[
    // Migration 1: detections table
    r#"
    CREATE TABLE IF NOT EXISTS detections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        object TEXT,
        time REAL
    );
    "#,
    // Migration 2: remember which upload a row came from, index the lookup column
    r#"
    ALTER TABLE detections ADD COLUMN video TEXT;
    CREATE INDEX idx_detections_object ON detections(object);
    "#,
];

/// Schema version this build migrates to
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Get current schema version from database
fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row(
        "PRAGMA user_version",
        [],
        |row| row.get(0)
    )?;
    Ok(version)
}

/// Run all pending migrations, each in its own transaction
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let target_version = latest_version();

    // Refuse to open a DB created by a newer build
    if current_version > target_version {
        return Err(VidSearchError::Other(format!(
            "Database schema version {} is newer than this build supports (max {})",
            current_version,
            target_version
        )));
    }

    if current_version == target_version {
        return Ok(());
    }

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        conn.execute_batch(&format!(
            "BEGIN;\n{}\nPRAGMA user_version = {};\nCOMMIT;",
            migration, migration_version
        ))?;

        log::info!("Applied migration {}", migration_version);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_latest() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), latest_version());

        // Second run is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_upgrades_legacy_two_column_table() {
        // Databases created before versioning have the bare table and user_version 0
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE detections (id INTEGER PRIMARY KEY AUTOINCREMENT, object TEXT, time REAL);
             INSERT INTO detections (object, time) VALUES ('dog', 4.0);",
        ).unwrap();

        run_migrations(&conn).unwrap();

        let (object, video): (String, Option<String>) = conn.query_row(
            "SELECT object, video FROM detections WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        ).unwrap();
        assert_eq!(object, "dog");
        assert!(video.is_none());
    }

    #[test]
    fn test_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {}", latest_version() + 1)).unwrap();
        assert!(run_migrations(&conn).is_err());
    }
}
