//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        name             TEXT NOT NULL,
        kind             TEXT NOT NULL,
        unit             TEXT,
        color            TEXT,
        sort_order       INTEGER NOT NULL DEFAULT 0,
        created_at       TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS event_values (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id         INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        date             TEXT NOT NULL,
        value            TEXT NOT NULL,

        -- One value per event per day; rate denominators depend on this
        UNIQUE (event_id, date)
    );

    CREATE INDEX IF NOT EXISTS idx_event_values_event_date
        ON event_values(event_id, date);
    "#,
];

/// Apply any pending migrations to bring the database up to
/// [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = idx as i32 + 1;
        if version > current {
            tracing::info!(version, "Applying database migration");
            conn.execute_batch(migration)?;
            conn.pragma_update(None, "user_version", version)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_unique_value_per_day() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO events (name, kind, created_at) VALUES ('Sleep', 'number', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO event_values (event_id, date, value) VALUES (1, '2024-01-01', '7.5')",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO event_values (event_id, date, value) VALUES (1, '2024-01-01', '8')",
            [],
        );
        assert!(dup.is_err());
    }
}
