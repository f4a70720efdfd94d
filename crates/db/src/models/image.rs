//! Stored image models and DTOs for the `images` table.

use imgharvest_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `images` table.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRecord {
    pub id: DbId,
    pub filename: String,
    /// Encoded image bytes exactly as they were on disk after resizing.
    pub data: Vec<u8>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An `images` row without its payload, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ImageSummary {
    pub id: DbId,
    pub filename: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

/// DTO for inserting a new stored image.
#[derive(Debug, Clone)]
pub struct CreateImageRecord {
    pub filename: String,
    pub data: Vec<u8>,
}
