// 📜 Change Log - append-only ledger of field transitions
//
// Every entry records one field's old→new transition for one listing.
// Entries are written once and never edited or deleted; the table is the
// audit trail downstream consumers query by listing id.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Immutable record of one field transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Stable entry identifier, assigned at creation.
    pub entry_id: String,
    pub list_id: String,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
}

impl ChangeEntry {
    pub fn new(
        list_id: &str,
        field_name: &str,
        old_value: &str,
        new_value: &str,
        changed_at: DateTime<Utc>,
    ) -> Self {
        ChangeEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            list_id: list_id.to_string(),
            field_name: field_name.to_string(),
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            changed_at,
        }
    }
}

/// Append all entries for one record's update.
///
/// Runs inside the caller's transaction: either every entry for the record
/// persists or none do. Entries for different records are independent
/// because each record gets its own transaction.
pub fn append(conn: &Connection, entries: &[ChangeEntry]) -> Result<(), StorageError> {
    for entry in entries {
        conn.execute(
            "INSERT INTO changes
             (entry_id, list_id, field_name, old_value, new_value, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.entry_id,
                entry.list_id,
                entry.field_name,
                entry.old_value,
                entry.new_value,
                entry.changed_at.to_rfc3339(),
            ],
        )?;
    }

    Ok(())
}

/// Full change history for one listing, oldest first.
///
/// Entries from the same batch share `changed_at`, so the rowid breaks the
/// tie and preserves insertion order.
pub fn history(conn: &Connection, list_id: &str) -> Result<Vec<ChangeEntry>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT entry_id, list_id, field_name, old_value, new_value, changed_at
         FROM changes
         WHERE list_id = ?1
         ORDER BY changed_at ASC, id ASC",
    )?;

    let entries = stmt
        .query_map(params![list_id], |row| {
            let changed_at_str: String = row.get(5)?;

            Ok(ChangeEntry {
                entry_id: row.get(0)?,
                list_id: row.get(1)?,
                field_name: row.get(2)?,
                old_value: row.get(3)?,
                new_value: row.get(4)?,
                changed_at: DateTime::parse_from_rfc3339(&changed_at_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Total number of change entries across all listings.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM changes", [], |row| row.get(0))?;

    Ok(count)
}
