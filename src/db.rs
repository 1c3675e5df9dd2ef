use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS saved_selection (
                position INTEGER PRIMARY KEY,
                exercise_id TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Replaces the stored selection with `ids`, keeping their order.
    pub fn save_selection(&mut self, ids: &[String]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM saved_selection", [])?;
        for (position, id) in ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO saved_selection (position, exercise_id, saved_at) VALUES (?1, ?2, ?3)",
                params![position as i64, id, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_selection(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT exercise_id FROM saved_selection ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_db_path() -> std::path::PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("gymcard-test-{}-{ts}.db", std::process::id()))
    }

    #[test]
    fn save_selection_replaces_previous_list_and_keeps_order() {
        let path = temp_db_path();
        let mut db = Database::open(&path).expect("open db");
        db.migrate().expect("migrate");

        db.save_selection(&["squat".to_string(), "bench".to_string()])
            .expect("first save");
        db.save_selection(&[
            "deadlift".to_string(),
            "row".to_string(),
            "press".to_string(),
        ])
        .expect("second save");

        let loaded = db.load_selection().expect("load");
        assert_eq!(loaded, vec!["deadlift", "row", "press"]);

        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_selection_on_fresh_database_is_empty() {
        let path = temp_db_path();
        let db = Database::open(&path).expect("open db");
        db.migrate().expect("migrate");

        assert!(db.load_selection().expect("load").is_empty());

        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
