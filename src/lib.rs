// Project Mirror - Core Library
// Change-tracking mirror of an external project listings page: fetch,
// extract, reconcile against stored snapshots, and keep an append-only
// log of every field-level change.

pub mod changelog;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod parser;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod store;

// Re-export commonly used types
pub use changelog::ChangeEntry;
pub use config::Config;
pub use db::{open_database, setup_database};
pub use error::{FetchError, StorageError};
pub use fetch::RetryPolicy;
pub use listing::{Listing, TRACKED_FIELDS};
pub use reconcile::{diff_fields, ReconcileEngine, RecordOutcome};
pub use report::CycleReport;
pub use runner::Runner;
pub use store::{Snapshot, UpsertOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
