// Error taxonomy for the mirror service.
//
// Two recoverable failure domains: the network fetch (retried, then the
// whole cycle is skipped) and storage I/O (contained to the record being
// written). Neither is allowed to take the process down.

use thiserror::Error;

/// Failure fetching the listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Every attempt allowed by the retry policy failed.
    #[error("all {attempts} fetch attempts failed, last error: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

/// Storage I/O failure on the snapshot store or change log.
///
/// Contained per record: the reconciler reports the record as failed and
/// moves on to the next one in the batch.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(#[from] pub rusqlite::Error);
