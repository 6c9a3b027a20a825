// 📊 Cycle Report - outcome counts for one reconciliation cycle
//
// Pure aggregation, no stored state. Emitted once per cycle through the
// logging layer.

use log::info;
use serde::Serialize;

use crate::reconcile::RecordOutcome;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Total change entries written across all updated records.
    pub changes_recorded: usize,
}

impl CycleReport {
    pub fn new() -> Self {
        CycleReport::default()
    }

    /// Fold one record's outcome into the counters.
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Updated(changes) => {
                self.updated += 1;
                self.changes_recorded += *changes;
            }
            RecordOutcome::Unchanged => self.unchanged += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Number of records the cycle looked at.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped + self.failed
    }

    pub fn summary(&self) -> String {
        format!(
            "processed {} records: {} new, {} updated ({} changes), {} unchanged, {} skipped, {} failed",
            self.total(),
            self.created,
            self.updated,
            self.changes_recorded,
            self.unchanged,
            self.skipped,
            self.failed
        )
    }

    /// Emit the once-per-cycle summary.
    pub fn emit(&self) {
        info!("✓ {}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_aggregates_counts() {
        let mut report = CycleReport::new();

        report.record(&RecordOutcome::Created);
        report.record(&RecordOutcome::Updated(3));
        report.record(&RecordOutcome::Updated(1));
        report.record(&RecordOutcome::Unchanged);
        report.record(&RecordOutcome::Skipped);
        report.record(&RecordOutcome::Failed("boom".to_string()));

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 2);
        assert_eq!(report.changes_recorded, 4);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 6);
    }

    #[test]
    fn test_summary_mentions_every_counter() {
        let mut report = CycleReport::new();
        report.record(&RecordOutcome::Updated(2));

        let summary = report.summary();
        assert!(summary.contains("1 updated"));
        assert!(summary.contains("2 changes"));
    }
}
