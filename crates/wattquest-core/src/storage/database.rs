//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - The serialized gamification session (kv key `session`)
//! - The history of engine events
//! - Key-value store for application state

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result};
use crate::events::Event;
use crate::session::GamificationSession;

const SESSION_KEY: &str = "session";

/// A persisted engine event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: i64,
    pub kind: String,
    pub event: Event,
    pub at: DateTime<Utc>,
}

/// SQLite database holding the session snapshot and event history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/wattquest/wattquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("wattquest.db");
        Self::open_at(&path)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Store the session snapshot, replacing the previous one.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_session(&self, session: &GamificationSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        write_kv(&self.conn, SESSION_KEY, &json)?;
        debug!(bytes = json.len(), "session saved");
        Ok(())
    }

    /// Append `events` and store the session snapshot in one transaction.
    ///
    /// Either both land or neither does. Returns how many events were written.
    ///
    /// # Errors
    /// Returns an error if serialization or any write fails; nothing is
    /// committed in that case.
    pub fn persist(&self, session: &GamificationSession, events: &[Event]) -> Result<usize> {
        let json = serde_json::to_string(session)?;
        let tx = self.conn.unchecked_transaction().map_err(DatabaseError::from)?;
        insert_events(&tx, events)?;
        write_kv(&tx, SESSION_KEY, &json)?;
        tx.commit().map_err(DatabaseError::from)?;
        debug!(events = events.len(), bytes = json.len(), "session persisted");
        Ok(events.len())
    }

    /// Load the stored session, if any.
    ///
    /// # Errors
    /// Returns [`DatabaseError::CorruptSnapshot`] when the stored JSON
    /// does not decode.
    pub fn load_session(&self) -> Result<Option<GamificationSession>> {
        let Some(json) = self.kv_get(SESSION_KEY)? else {
            return Ok(None);
        };
        let mut session: GamificationSession = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::CorruptSnapshot(e.to_string()))?;
        let added = session.reconcile_catalogs();
        if added > 0 {
            debug!(added, "catalog entries added to restored session");
        }
        Ok(Some(session))
    }

    /// Load the stored session or start a fresh one.
    ///
    /// # Errors
    /// See [`Database::load_session`].
    pub fn load_or_new_session(&self) -> Result<GamificationSession> {
        Ok(self.load_session()?.unwrap_or_default())
    }

    /// Delete the stored session and event history.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear_session(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![SESSION_KEY])
            .map_err(DatabaseError::from)?;
        self.conn
            .execute("DELETE FROM events", [])
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Append events to the history. Returns how many were written.
    ///
    /// # Errors
    /// Returns an error if serialization or an insert fails.
    pub fn record_events(&self, events: &[Event]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction().map_err(DatabaseError::from)?;
        insert_events(&tx, events)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(events.len())
    }

    /// Most recent events first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row does not decode.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<StoredEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, payload, at FROM events ORDER BY id DESC LIMIT ?1")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut out = Vec::new();
        for row in rows {
            let (id, kind, payload, at) = row.map_err(DatabaseError::from)?;
            let at = DateTime::parse_from_rfc3339(&at)
                .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp on event {id}: {e}")))?
                .with_timezone(&Utc);
            out.push(StoredEvent {
                id,
                kind,
                event: serde_json::from_str(&payload)?,
                at,
            });
        }
        Ok(out)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        write_kv(&self.conn, key, value)
    }
}

fn write_kv(conn: &Connection, key: &str, value: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

fn insert_events(conn: &Connection, events: &[Event]) -> Result<()> {
    for event in events {
        conn.execute(
            "INSERT INTO events (kind, payload, at) VALUES (?1, ?2, ?3)",
            params![event.kind(), serde_json::to_string(event)?, event.at().to_rfc3339()],
        )
        .map_err(DatabaseError::from)?;
    }
    Ok(())
}
