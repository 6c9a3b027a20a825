// 🏗️ Listing - one project as extracted from the source page
//
// The identifier is the source's own stable slug (taken from the listing's
// detail URL), NOT something we generate. Everything else is free text the
// way the site renders it: budgets like "KSh 4.5M" stay strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five fields compared for change detection, by name.
///
/// Diffing is done field-by-field against this declared list - never by
/// tuple position - so a change entry always names the field it belongs to.
pub const TRACKED_FIELDS: [&str; 5] = ["title", "location", "budget", "status", "description"];

/// One listing observed at the source in a single extraction batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Stable identifier derived from the listing URL. Empty means the
    /// extractor could not derive one; the reconciler skips such records.
    pub list_id: String,

    // Tracked fields. May be empty strings (a missing source field
    // normalizes to ""), never absent.
    pub title: String,
    pub location: String,
    pub budget: String,
    pub status: String,
    pub description: String,

    /// Timestamp of the extraction batch this record came from. Stamped
    /// once per batch so every write from one cycle agrees on the time.
    pub observed_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(list_id: &str, observed_at: DateTime<Utc>) -> Self {
        Listing {
            list_id: list_id.to_string(),
            title: String::new(),
            location: String::new(),
            budget: String::new(),
            status: String::new(),
            description: String::new(),
            observed_at,
        }
    }

    /// True when the record carries a usable identifier.
    pub fn has_id(&self) -> bool {
        !self.list_id.is_empty()
    }
}
