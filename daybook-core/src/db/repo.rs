//! Database repository layer
//!
//! Query and insert operations for events and their recorded values.

use crate::db::ValueStore;
use crate::error::{Error, Result};
use crate::types::{Event, EventKind, EventValue};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

/// Intermediate row shape before `kind`/date parsing.
type EventRow = (i64, String, String, Option<String>, Option<String>, i32, String);

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run schema migrations
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock_conn();
        crate::db::schema::migrate(&conn)?;
        Ok(())
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-statement;
        // the connection itself is still usable for reads
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a new event, returning its assigned id.
    pub fn insert_event(
        &self,
        name: &str,
        kind: EventKind,
        unit: Option<&str>,
        sort_order: i32,
    ) -> Result<i64> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO events (name, kind, unit, sort_order, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, kind.as_str(), unit, sort_order, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Record (or overwrite) the value for an event on a day.
    pub fn upsert_value(&self, event_id: i64, date: NaiveDate, value: &str) -> Result<()> {
        let conn = self.lock_conn();
        let updated = conn.execute(
            "INSERT INTO event_values (event_id, date, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (event_id, date) DO UPDATE SET value = excluded.value",
            params![event_id, date.to_string(), value],
        )?;
        tracing::debug!(event_id, date = %date, rows = updated, "Recorded event value");
        Ok(())
    }

    /// Look up a single event by id.
    pub fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        let conn = self.lock_conn();
        let row: Option<EventRow> = conn
            .query_row(
                "SELECT id, name, kind, unit, color, sort_order, created_at
                 FROM events WHERE id = ?1",
                params![event_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        row.map(Self::event_from_row).transpose()
    }

    fn event_from_row(row: EventRow) -> Result<Event> {
        let (id, name, kind, unit, color, sort_order, created_at) = row;
        let kind: EventKind = kind.parse().map_err(Error::Config)?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| Error::Config(format!("bad created_at for event {}: {}", id, e)))?
            .with_timezone(&Utc);

        Ok(Event {
            id,
            name,
            kind,
            unit,
            color,
            sort_order,
            created_at,
        })
    }

    fn parse_date(raw: &str) -> Result<NaiveDate> {
        raw.parse()
            .map_err(|e| Error::Config(format!("bad stored date {:?}: {}", raw, e)))
    }
}

impl ValueStore for Database {
    fn events(&self) -> Result<Vec<Event>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, kind, unit, color, sort_order, created_at
             FROM events ORDER BY sort_order, id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<EventRow>>>()?;

        rows.into_iter().map(Self::event_from_row).collect()
    }

    fn values_for_range(
        &self,
        event_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EventValue>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT event_id, date, value FROM event_values
             WHERE event_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;

        let rows = stmt
            .query_map(
                params![event_id, start.to_string(), end.to_string()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(event_id, date, value)| {
                Ok(EventValue {
                    event_id,
                    date: Self::parse_date(&date)?,
                    value,
                })
            })
            .collect()
    }

    fn all_values(&self) -> Result<Vec<EventValue>> {
        let conn = self.lock_conn();
        let mut stmt = conn
            .prepare("SELECT event_id, date, value FROM event_values ORDER BY date, event_id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(event_id, date, value)| {
                Ok(EventValue {
                    event_id,
                    date: Self::parse_date(&date)?,
                    value,
                })
            })
            .collect()
    }
}
