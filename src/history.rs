use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app_dirs::AppDirs;
use crate::summary::SessionSummary;

/// One finished workout as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub title: String,
    pub finished_at: DateTime<Local>,
    pub exercise_count: u32,
    pub total_duration_secs: u64,
    pub active_duration_secs: u64,
    pub rest_duration_secs: u64,
    pub calories_burned: u32,
}

impl HistoryEntry {
    /// "3 hours ago" relative to `now`
    pub fn age(&self, now: DateTime<Local>) -> String {
        let secs = (now - self.finished_at).num_seconds().max(0) as u64;
        HumanTime::from(std::time::Duration::from_secs(secs))
            .to_text_en(Accuracy::Rough, Tense::Past)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryTotals {
    pub sessions: u64,
    pub active_secs: u64,
    pub calories: u64,
}

/// Database of finished sessions. Cancelled sessions never reach it.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database in the user's state directory
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("repline_history.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {e}")),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                exercise_count INTEGER NOT NULL,
                total_duration_secs INTEGER NOT NULL,
                active_duration_secs INTEGER NOT NULL,
                rest_duration_secs INTEGER NOT NULL,
                calories_burned INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_finished_at ON workout_sessions(finished_at)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    pub fn record(
        &self,
        title: &str,
        exercise_count: usize,
        summary: &SessionSummary,
    ) -> Result<i64> {
        self.record_at(title, exercise_count, summary, Local::now())
    }

    pub fn record_at(
        &self,
        title: &str,
        exercise_count: usize,
        summary: &SessionSummary,
        finished_at: DateTime<Local>,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO workout_sessions
            (title, finished_at, exercise_count, total_duration_secs, active_duration_secs,
             rest_duration_secs, calories_burned)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                title,
                finished_at.to_rfc3339(),
                exercise_count as i64,
                summary.total_duration_secs as i64,
                summary.active_duration_secs as i64,
                summary.rest_duration_secs as i64,
                summary.calories_burned,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, finished_at, exercise_count, total_duration_secs,
                   active_duration_secs, rest_duration_secs, calories_burned
            FROM workout_sessions
            ORDER BY finished_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let finished_str: String = row.get(2)?;
            let finished_at = DateTime::parse_from_rfc3339(&finished_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "finished_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryEntry {
                id: row.get(0)?,
                title: row.get(1)?,
                finished_at,
                exercise_count: row.get(3)?,
                total_duration_secs: row.get::<_, i64>(4)? as u64,
                active_duration_secs: row.get::<_, i64>(5)? as u64,
                rest_duration_secs: row.get::<_, i64>(6)? as u64,
                calories_burned: row.get(7)?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn totals(&self) -> Result<HistoryTotals> {
        self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(active_duration_secs), 0),
                   COALESCE(SUM(calories_burned), 0)
            FROM workout_sessions
            "#,
            [],
            |row| {
                Ok(HistoryTotals {
                    sessions: row.get::<_, i64>(0)? as u64,
                    active_secs: row.get::<_, i64>(1)? as u64,
                    calories: row.get::<_, i64>(2)? as u64,
                })
            },
        )
    }

    /// Delete every recorded session, returning how many were removed
    pub fn clear_all(&self) -> Result<usize> {
        self.conn.execute("DELETE FROM workout_sessions", [])
    }
}

/// Write entries as CSV with a header row
pub fn export_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn summary(calories: u32) -> SessionSummary {
        SessionSummary {
            total_duration_secs: 190,
            active_duration_secs: 95,
            rest_duration_secs: 30,
            calories_burned: calories,
        }
    }

    #[test]
    fn record_and_read_back() {
        let db = HistoryDb::in_memory().unwrap();
        let when = Local::now();
        let id = db.record_at("Core Blast", 5, &summary(11), when).unwrap();

        let entries = db.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.id, id);
        assert_eq!(e.title, "Core Blast");
        assert_eq!(e.exercise_count, 5);
        assert_eq!(e.active_duration_secs, 95);
        assert_eq!(e.rest_duration_secs, 30);
        assert_eq!(e.calories_burned, 11);
        assert_eq!(e.finished_at.timestamp(), when.timestamp());
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let db = HistoryDb::in_memory().unwrap();
        let now = Local::now();
        db.record_at("old", 1, &summary(1), now - Duration::days(2)).unwrap();
        db.record_at("new", 1, &summary(2), now).unwrap();
        db.record_at("mid", 1, &summary(3), now - Duration::days(1)).unwrap();

        let titles: Vec<String> = db.recent(2).unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["new", "mid"]);
    }

    #[test]
    fn totals_sum_all_sessions() {
        let db = HistoryDb::in_memory().unwrap();
        assert_eq!(db.totals().unwrap(), HistoryTotals::default());

        db.record("a", 3, &summary(10)).unwrap();
        db.record("b", 3, &summary(15)).unwrap();
        assert_eq!(
            db.totals().unwrap(),
            HistoryTotals {
                sessions: 2,
                active_secs: 190,
                calories: 25
            }
        );

        assert_eq!(db.clear_all().unwrap(), 2);
        assert_eq!(db.totals().unwrap().sessions, 0);
        assert_eq!(db.clear_all().unwrap(), 0);
    }

    #[test]
    fn persists_across_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("history.db");
        {
            let db = HistoryDb::open(&path).unwrap();
            db.record("Full Body", 6, &summary(40)).unwrap();
        }
        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.recent(5).unwrap()[0].title, "Full Body");
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let db = HistoryDb::in_memory().unwrap();
        db.record("A", 1, &summary(5)).unwrap();
        db.record("B", 2, &summary(6)).unwrap();

        let mut out = Vec::new();
        export_csv(&db.recent(10).unwrap(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,finished_at,exercise_count"));
        assert!(lines[0].ends_with("calories_burned"));
    }

    #[test]
    fn age_is_humanized() {
        let now = Local::now();
        let entry = HistoryEntry {
            id: 1,
            title: "x".into(),
            finished_at: now - Duration::hours(3),
            exercise_count: 1,
            total_duration_secs: 0,
            active_duration_secs: 0,
            rest_duration_secs: 0,
            calories_burned: 0,
        };
        assert!(entry.age(now).contains("3 hours"));
    }
}
