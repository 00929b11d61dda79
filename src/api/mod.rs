//! API: the remote item store the board persists to.
//!
//! DESIGN
//! ======
//! `ItemApi` is the seam between the sync layer and the network. The HTTP
//! implementation lives in [`http`]; tests substitute an in-memory mock.
//! Wire records are decoded into engine items in [`wire`] so neither the
//! trait nor the engine sees the service's JSON-in-a-string payloads.

pub mod http;
pub mod wire;

use canvas::doc::Item;

pub use http::HttpItemApi;
pub use wire::{ItemRecord, User};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by persistence calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The connection could not be established, so the request was never sent.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The request failed after it may have reached the service (timeout,
    /// reset, truncated body).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("persistence service returned status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Whether repeating an idempotent call could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// Whether the service cannot have acted on the request, so even a
    /// non-idempotent call may be resent.
    #[must_use]
    pub fn never_applied(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Status { status: 429 | 503, .. })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// CRUD surface of the persistence service.
///
/// Ids are the service's numeric ids; callers never send pending ids.
#[async_trait::async_trait]
pub trait ItemApi: Send + Sync {
    /// Fetch the board's items. Tombstoned items are included only when asked.
    async fn list_items(&self, include_deleted: bool) -> Result<Vec<Item>, ApiError>;

    /// Create an item; the returned item carries its server id.
    async fn create_item(&self, item: &Item) -> Result<Item, ApiError>;

    /// Full-item upsert by id; returns the stored representation.
    async fn update_item(&self, id: i64, item: &Item) -> Result<Item, ApiError>;

    async fn soft_delete_item(&self, id: i64) -> Result<(), ApiError>;

    async fn undelete_item(&self, id: i64) -> Result<(), ApiError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
