// 🗄️ Database setup - SQLite schema for the mirror
//
// Two tables:
//   projects - latest known state per listing (one row per list_id)
//   changes  - append-only ledger of field transitions
//
// Schema creation is idempotent (CREATE TABLE IF NOT EXISTS throughout),
// so startup is safe against an existing database.

use std::path::Path;

use rusqlite::Connection;

use crate::error::StorageError;

/// Open the database at `path` and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<(), StorageError> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Projects table (snapshot: one row per listing)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            list_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            location TEXT NOT NULL,
            budget TEXT NOT NULL,
            status TEXT NOT NULL,
            description TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Changes table (append-only audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS changes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id TEXT UNIQUE NOT NULL,
            list_id TEXT NOT NULL,
            field_name TEXT NOT NULL,
            old_value TEXT NOT NULL,
            new_value TEXT NOT NULL,
            changed_at TEXT NOT NULL,
            FOREIGN KEY (list_id) REFERENCES projects (list_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_changes_list_id ON changes(list_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_changes_changed_at ON changes(changed_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        setup_database(&conn).unwrap();
        // Running setup again against the populated schema must not fail
        setup_database(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('projects', 'changes')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
