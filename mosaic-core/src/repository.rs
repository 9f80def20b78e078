use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::square::{Square, SquareSummary};

/// Repository trait for cell data access
#[async_trait]
pub trait SquareRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Square>, Box<dyn std::error::Error + Send + Sync>>;

    /// Display projection for every cell with `start <= id <= end`
    async fn find_range(
        &self,
        start: i64,
        end: i64,
    ) -> Result<Vec<SquareSummary>, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert a fresh claim. Returns false when a live record for the
    /// same id already exists, without touching that record.
    async fn create_if_absent(
        &self,
        square: &Square,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Delete a stale claim: unpurchased and reserved at or before
    /// `cutoff`. Returns false when no such record existed.
    async fn delete_expired(
        &self,
        id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Flip a cell to purchased after out-of-band payment confirmation.
    /// Returns false when the cell is unknown.
    async fn mark_purchased(
        &self,
        id: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// TTL-bounded cache for already-serialized range-query payloads
#[async_trait]
pub trait RangeCache: Send + Sync {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn set(
        &self,
        key: &str,
        payload: &str,
        ttl_seconds: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Content store holding cell images; write-only from this service
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Opaque compression routine run before upload. The caller enforces
/// the size ceiling on the output; implementations only try to get
/// under it.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(
        &self,
        bytes: Bytes,
        max_bytes: usize,
    ) -> Result<Bytes, Box<dyn std::error::Error + Send + Sync>>;
}
