//! Repository for the `images` table.
//!
//! Rows are append-only from the harvester's point of view: every stored
//! file becomes a new row, even when a previous run used the same name.

use imgharvest_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImageRecord, ImageRecord, ImageSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, filename, data, deleted_at, created_at, updated_at";

/// Column list for payload-free listings.
const SUMMARY_COLUMNS: &str =
    "id, filename, octet_length(data)::BIGINT AS size_bytes, created_at";

/// Provides insert and read operations for stored images.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert a new image, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateImageRecord,
    ) -> Result<ImageRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (filename, data)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageRecord>(&query)
            .bind(&input.filename)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    /// Find an image by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ImageRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, ImageRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All rows stored under `filename`, oldest first. Excludes soft-deleted rows.
    pub async fn list_by_filename(
        pool: &PgPool,
        filename: &str,
    ) -> Result<Vec<ImageSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM images
             WHERE filename = $1 AND deleted_at IS NULL
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ImageSummary>(&query)
            .bind(filename)
            .fetch_all(pool)
            .await
    }

    /// Number of live (not soft-deleted) rows.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM images WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
