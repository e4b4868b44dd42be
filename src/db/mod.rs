// Database module

pub mod migrations;
pub mod schema;

use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::constants::DB_FILENAME;
use crate::error::Result;

/// Open or create a database at the given path
pub fn open_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    // WAL lets searches read while a background analysis is writing
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Get the database path for a data directory
pub fn get_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILENAME)
}

/// Create the data directory and its database, returning the database path
pub fn init_data_dir(data_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::create_dir_all(data_dir.join(crate::constants::UPLOADS_FOLDER))?;

    let db_path = get_db_path(data_dir);
    open_db(&db_path)?;
    Ok(db_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_data_dir_creates_layout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_dir = tmp.path().join("data");

        let db_path = init_data_dir(&data_dir).unwrap();

        assert_eq!(db_path, data_dir.join("video.db"));
        assert!(db_path.exists());
        assert!(data_dir.join("uploads").is_dir());
    }

    #[test]
    fn test_open_db_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("video.db");

        open_db(&db_path).unwrap();
        let conn = open_db(&db_path).unwrap();
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, migrations::latest_version());
    }
}
