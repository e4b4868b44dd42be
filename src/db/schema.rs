// Database schema types and query helpers

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::analysis::Detection;
use crate::error::Result;

// ----- Detections -----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRow {
    #[serde(skip_serializing)]
    pub id: i64,
    pub object: String,
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

/// Append every detection as a row. All-or-nothing.
pub fn insert_detections(conn: &Connection, video: Option<&str>, detections: &[Detection]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO detections (object, time, video) VALUES (?1, ?2, ?3)"
        )?;
        for d in detections {
            stmt.execute(params![d.object, d.time, video])?;
        }
    }
    tx.commit()?;
    Ok(detections.len())
}

/// Exact-match lookup by label, in insertion order
pub fn find_detections(conn: &Connection, object: &str) -> Result<Vec<DetectionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, object, time, video FROM detections WHERE object = ?1 ORDER BY id"
    )?;

    let rows = stmt.query_map(params![object], |row| {
        Ok(DetectionRow {
            id: row.get(0)?,
            object: row.get(1)?,
            time: row.get(2)?,
            video: row.get(3)?,
        })
    })?.collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn count_detections(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM detections", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn det(object: &str, time: f64) -> Detection {
        Detection { object: object.to_string(), time }
    }

    #[test]
    fn test_insert_and_find() {
        let conn = setup_test_db();
        let inserted = insert_detections(
            &conn,
            Some("beach.mp4"),
            &[det("person", 0.0), det("dog", 2.0), det("person", 4.0)],
        ).unwrap();
        assert_eq!(inserted, 3);

        let rows = find_detections(&conn, "person").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].time, 0.0);
        assert_eq!(rows[1].time, 4.0);
        assert_eq!(rows[0].video.as_deref(), Some("beach.mp4"));
        assert!(rows[0].id < rows[1].id);
    }

    #[test]
    fn test_find_is_exact_match() {
        let conn = setup_test_db();
        insert_detections(&conn, None, &[det("person", 1.0), det("Person", 2.0)]).unwrap();

        assert_eq!(find_detections(&conn, "person").unwrap().len(), 1);
        assert!(find_detections(&conn, "pers").unwrap().is_empty());
        assert!(find_detections(&conn, "person ").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let conn = setup_test_db();
        insert_detections(&conn, None, &[det("car", 2.0), det("car", 2.0)]).unwrap();
        insert_detections(&conn, None, &[det("car", 2.0)]).unwrap();

        assert_eq!(find_detections(&conn, "car").unwrap().len(), 3);
        assert_eq!(count_detections(&conn).unwrap(), 3);
    }

    #[test]
    fn test_insert_empty_is_noop() {
        let conn = setup_test_db();
        assert_eq!(insert_detections(&conn, Some("empty.mp4"), &[]).unwrap(), 0);
        assert_eq!(count_detections(&conn).unwrap(), 0);
    }

    #[test]
    fn test_row_serializes_wire_shape() {
        let row = DetectionRow { id: 7, object: "cat".into(), time: 3.5, video: None };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"object": "cat", "time": 3.5}));
    }
}
