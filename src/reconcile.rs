// ⚖️ Reconcile Engine - turn one extracted batch into stored state
//
// Per record, in batch order:
//   1. no usable id            → Skipped (batch continues)
//   2. no snapshot yet         → insert, no change entries (nothing to diff)
//   3. snapshot + differences  → overwrite snapshot, append one change
//                                entry per differing tracked field
//   4. snapshot + no diff      → no writes at all
//
// Snapshot write and change-log append for one record share a single
// SQLite transaction, so the stored state can never hold a value whose
// transition is missing from the log (initial creation aside). A storage
// failure rolls both back and the record is reported failed; the rest of
// the batch still runs.

use log::{debug, error, info, warn};
use rusqlite::Connection;

use crate::changelog::{self, ChangeEntry};
use crate::error::StorageError;
use crate::listing::Listing;
use crate::report::CycleReport;
use crate::store::{self, Snapshot};

// ============================================================================
// RECORD OUTCOME
// ============================================================================

/// What happened to one record of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First sighting of this id; snapshot created, no change entries.
    Created,

    /// Existing snapshot overwritten; carries the number of field changes
    /// recorded in the log.
    Updated(usize),

    /// Every tracked field matched the stored value; nothing written.
    Unchanged,

    /// Record had no usable identifier and was dropped.
    Skipped,

    /// Storage failed for this record; snapshot and log both untouched.
    Failed(String),
}

// ============================================================================
// FIELD DIFF
// ============================================================================

/// Compare stored against incoming values field by field.
///
/// Exact string equality, no normalization or case-folding - whitespace
/// handling belongs to the extractor, never here. Produces one entry per
/// differing field, stamped with the batch's `observed_at`.
pub fn diff_fields(current: &Snapshot, incoming: &Listing) -> Vec<ChangeEntry> {
    let pairs = [
        ("title", current.title.as_str(), incoming.title.as_str()),
        ("location", current.location.as_str(), incoming.location.as_str()),
        ("budget", current.budget.as_str(), incoming.budget.as_str()),
        ("status", current.status.as_str(), incoming.status.as_str()),
        (
            "description",
            current.description.as_str(),
            incoming.description.as_str(),
        ),
    ];

    pairs
        .iter()
        .filter(|(_, old_value, new_value)| old_value != new_value)
        .map(|(field_name, old_value, new_value)| {
            ChangeEntry::new(
                &incoming.list_id,
                field_name,
                old_value,
                new_value,
                incoming.observed_at,
            )
        })
        .collect()
}

// ============================================================================
// RECONCILE ENGINE
// ============================================================================

pub struct ReconcileEngine;

impl ReconcileEngine {
    pub fn new() -> Self {
        ReconcileEngine
    }

    /// Reconcile one batch against the store, in batch order.
    ///
    /// A duplicate id within the batch diffs against whatever the earlier
    /// occurrence just wrote (last-write-wins within a cycle) - each record
    /// reads the snapshot inside its own transaction.
    pub fn reconcile_batch(&self, conn: &mut Connection, batch: &[Listing]) -> CycleReport {
        let mut report = CycleReport::new();

        for listing in batch {
            let outcome = self.reconcile_record(conn, listing);
            report.record(&outcome);
        }

        report
    }

    /// Reconcile a single record. Never returns an error: storage failures
    /// are folded into the outcome so one bad record cannot abort the batch.
    pub fn reconcile_record(&self, conn: &mut Connection, listing: &Listing) -> RecordOutcome {
        if !listing.has_id() {
            warn!("skipping record without a listing id (title: {:?})", listing.title);
            return RecordOutcome::Skipped;
        }

        match self.apply_record(conn, listing) {
            Ok(outcome) => {
                match &outcome {
                    RecordOutcome::Created => {
                        info!("new project added: {} ({})", listing.title, listing.list_id);
                    }
                    RecordOutcome::Updated(changes) => {
                        info!(
                            "project updated: {} ({} changes)",
                            listing.list_id, changes
                        );
                    }
                    RecordOutcome::Unchanged => {
                        debug!("no changes detected for: {}", listing.list_id);
                    }
                    _ => {}
                }
                outcome
            }
            Err(err) => {
                error!("error processing project {}: {}", listing.list_id, err);
                RecordOutcome::Failed(err.to_string())
            }
        }
    }

    /// The storage-touching part: lookup, diff, and the atomic write pair.
    fn apply_record(
        &self,
        conn: &mut Connection,
        listing: &Listing,
    ) -> Result<RecordOutcome, StorageError> {
        let tx = conn.transaction()?;

        let outcome = match store::get(&tx, &listing.list_id)? {
            None => {
                store::upsert(&tx, listing)?;
                RecordOutcome::Created
            }
            Some(current) => {
                let changes = diff_fields(&current, listing);

                if changes.is_empty() {
                    RecordOutcome::Unchanged
                } else {
                    store::upsert(&tx, listing)?;
                    changelog::append(&tx, &changes)?;
                    RecordOutcome::Updated(changes.len())
                }
            }
        };

        tx.commit()?;

        Ok(outcome)
    }
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
