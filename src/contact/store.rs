//! SQLite-backed storage for received contact submissions.

use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::form::ContactForm;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSubmission {
    pub id: String,
    pub ts: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// Handle to the submissions database. Opens a connection per call.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)
            .map_err(|e| Error::Storage(format!("sqlite open: {}", e)))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS contact_submissions (
                id TEXT PRIMARY KEY,
                ts INTEGER NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT,
                message TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_contact_ts ON contact_submissions(ts);
            "#,
        )
        .map_err(|e| Error::Storage(format!("sqlite init: {}", e)))?;
        Ok(conn)
    }

    /// Persist a form and return its id.
    pub fn insert(&self, form: &ContactForm) -> Result<String, Error> {
        let conn = self.connect()?;
        let id = ulid::Ulid::new().to_string();
        conn.execute(
            "INSERT INTO contact_submissions (id, ts, name, email, subject, message) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                chrono::Utc::now().timestamp_millis(),
                form.name,
                form.email,
                form.subject,
                form.message
            ],
        )
        .map_err(|e| Error::Storage(format!("sqlite insert submission: {}", e)))?;
        Ok(id)
    }

    /// Most recent submissions first.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredSubmission>, Error> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, ts, name, email, subject, message FROM contact_submissions ORDER BY ts DESC, rowid DESC LIMIT ?1",
            )
            .map_err(|e| Error::Storage(format!("sqlite prepare: {}", e)))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StoredSubmission {
                    id: row.get(0)?,
                    ts: row.get(1)?,
                    name: row.get(2)?,
                    email: row.get(3)?,
                    subject: row.get(4)?,
                    message: row.get(5)?,
                })
            })
            .map_err(|e| Error::Storage(format!("sqlite query: {}", e)))?;

        let submissions = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Storage(format!("sqlite row: {}", e)))?;
        Ok(submissions)
    }

    pub fn count(&self) -> Result<usize, Error> {
        let conn = self.connect()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM contact_submissions", [], |row| row.get(0))
            .map_err(|e| Error::Storage(format!("sqlite count: {}", e)))?;
        Ok(n as usize)
    }
}
