// 📸 Snapshot Store - latest known state per listing
//
// One row per list_id in the `projects` table. Rows are created on first
// sighting and updated in place after that; nothing here ever deletes a
// row (a listing disappearing from the source page is left untouched).
//
// `upsert` must be called inside the same SQLite transaction as the
// companion change-log append - the reconciler owns that transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::listing::Listing;

/// Last accepted state for one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub list_id: String,
    pub title: String,
    pub location: String,
    pub budget: String,
    pub status: String,
    pub description: String,
    pub last_updated: DateTime<Utc>,
}

/// What `upsert` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No snapshot existed; a new row was created.
    Inserted,
    /// An existing row was overwritten with the incoming tracked fields.
    Updated,
}

/// Point lookup by listing id. No side effects.
pub fn get(conn: &Connection, list_id: &str) -> Result<Option<Snapshot>, StorageError> {
    let snapshot = conn
        .query_row(
            "SELECT list_id, title, location, budget, status, description, last_updated
             FROM projects
             WHERE list_id = ?1",
            params![list_id],
            |row| {
                let last_updated_str: String = row.get(6)?;

                Ok(Snapshot {
                    list_id: row.get(0)?,
                    title: row.get(1)?,
                    location: row.get(2)?,
                    budget: row.get(3)?,
                    status: row.get(4)?,
                    description: row.get(5)?,
                    last_updated: DateTime::parse_from_rfc3339(&last_updated_str)
                        .map_err(|_| rusqlite::Error::InvalidQuery)?
                        .with_timezone(&Utc),
                })
            },
        )
        .optional()?;

    Ok(snapshot)
}

/// Create or overwrite the snapshot for `listing.list_id`.
///
/// Insert: all fields come from the listing, `last_updated = observed_at`.
/// Update: the five tracked fields are overwritten and `last_updated`
/// bumped to the listing's `observed_at`.
pub fn upsert(conn: &Connection, listing: &Listing) -> Result<UpsertOutcome, StorageError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM projects WHERE list_id = ?1",
            params![listing.list_id],
            |row| row.get(0),
        )
        .optional()?;

    let observed_at_str = listing.observed_at.to_rfc3339();

    if exists.is_none() {
        conn.execute(
            "INSERT INTO projects
             (list_id, title, location, budget, status, description, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                listing.list_id,
                listing.title,
                listing.location,
                listing.budget,
                listing.status,
                listing.description,
                observed_at_str,
            ],
        )?;

        Ok(UpsertOutcome::Inserted)
    } else {
        conn.execute(
            "UPDATE projects
             SET title = ?1, location = ?2, budget = ?3, status = ?4,
                 description = ?5, last_updated = ?6
             WHERE list_id = ?7",
            params![
                listing.title,
                listing.location,
                listing.budget,
                listing.status,
                listing.description,
                observed_at_str,
                listing.list_id,
            ],
        )?;

        Ok(UpsertOutcome::Updated)
    }
}

/// Number of tracked listings.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;

    fn test_listing(list_id: &str, title: &str, status: &str) -> Listing {
        Listing {
            list_id: list_id.to_string(),
            title: title.to_string(),
            location: "Nairobi".to_string(),
            budget: "KSh 12M".to_string(),
            status: status.to_string(),
            description: "Two bedroom apartment".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_get_absent_returns_none() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        assert!(get(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let first = test_listing("p1", "Riverside Towers", "Ongoing");
        let outcome = upsert(&conn, &first).unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let stored = get(&conn, "p1").unwrap().unwrap();
        assert_eq!(stored.title, "Riverside Towers");
        assert_eq!(stored.status, "Ongoing");
        assert_eq!(stored.last_updated, first.observed_at);

        let mut second = test_listing("p1", "Riverside Towers", "Completed");
        second.observed_at = first.observed_at + chrono::Duration::hours(1);
        let outcome = upsert(&conn, &second).unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let stored = get(&conn, "p1").unwrap().unwrap();
        assert_eq!(stored.status, "Completed");
        assert_eq!(stored.last_updated, second.observed_at);

        // Still exactly one row for this id
        assert_eq!(count(&conn).unwrap(), 1);
    }
}
