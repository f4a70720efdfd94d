//! The harvest run: search once, then download, resize, and store each
//! result in order.
//!
//! A failed download is the only recoverable condition. It is logged and
//! recorded in the [`RunSummary`], and the loop moves on. Every other
//! failure ends the run with a [`PipelineError`]; files already written
//! stay on disk and rows already inserted stay in the table.

use std::path::Path;

use imgharvest_core::naming::{ensure_output_dir, output_path, validate_record_filename};
use imgharvest_core::resize::{resize_image_file, ImageEncoding};
use imgharvest_core::types::DbId;
use imgharvest_db::models::image::{CreateImageRecord, ImageRecord};
use imgharvest_db::repositories::ImageRepo;
use imgharvest_search::{CustomSearchApi, ImageSource};
use sqlx::PgPool;

use crate::config::HarvestConfig;
use crate::error::{PipelineError, StoreError};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// One result that made it all the way into the database.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub index: usize,
    pub id: DbId,
    pub filename: String,
    pub size_bytes: usize,
    pub encoding: ImageEncoding,
}

/// One result whose download failed and was skipped.
#[derive(Debug, Clone)]
pub struct FailedDownload {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// What a completed run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// The `max` the run was configured with.
    pub requested: usize,
    /// How many URLs the search returned.
    pub available: usize,
    /// Download attempts made.
    pub attempted: usize,
    pub stored: Vec<StoredImage>,
    pub failed: Vec<FailedDownload>,
}

impl RunSummary {
    fn new(requested: usize, available: usize) -> Self {
        Self {
            requested,
            available,
            ..Self::default()
        }
    }

    /// How many requested images the search could not supply.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.available)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Connect, migrate, and harvest against the real search endpoint.
pub async fn run(config: &HarvestConfig) -> Result<RunSummary, PipelineError> {
    tracing::info!(dsn = %config.db.dsn_redacted(), "Connecting to database");
    let options = config.db.connect_options().map_err(PipelineError::Connect)?;
    let pool = imgharvest_db::create_pool_with(options)
        .await
        .map_err(PipelineError::Connect)?;
    imgharvest_db::health_check(&pool)
        .await
        .map_err(PipelineError::Connect)?;
    tracing::info!("Database connection established");

    imgharvest_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let api = CustomSearchApi::new(config.credentials.clone());
    let summary = harvest(&pool, &api, config).await?;

    let total = ImageRepo::count(&pool).await.map_err(StoreError::from)?;
    tracing::info!(
        attempted = summary.attempted,
        stored = summary.stored.len(),
        failed = summary.failed.len(),
        total_rows = total,
        "Harvest complete"
    );

    pool.close().await;
    Ok(summary)
}

/// Search `source` for the configured query and process up to
/// `max_images` results, strictly one after another.
pub async fn harvest<S>(
    pool: &PgPool,
    source: &S,
    config: &HarvestConfig,
) -> Result<RunSummary, PipelineError>
where
    S: ImageSource + ?Sized,
{
    let urls = source.search(&config.query).await?;
    tracing::info!(query = %config.query, results = urls.len(), "Search complete");

    ensure_output_dir(&config.output_dir).map_err(|err| PipelineError::OutputDir {
        path: config.output_dir.clone(),
        source: err,
    })?;

    let mut summary = RunSummary::new(config.max_images, urls.len());
    if summary.shortfall() > 0 {
        tracing::info!(
            requested = summary.requested,
            available = summary.available,
            "Search returned fewer results than requested"
        );
    }

    for (index, url) in urls.iter().take(config.max_images).enumerate() {
        let path = output_path(&config.output_dir, &config.query, index);
        summary.attempted += 1;

        match source.download(url, &path).await {
            Ok(bytes) => tracing::info!(path = %path.display(), bytes, "Downloaded"),
            Err(e) => {
                tracing::warn!(index, url = %url, error = %e, "Failed to download");
                summary.failed.push(FailedDownload {
                    index,
                    url: url.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        }

        let encoding = resize_image_file(&path, config.target_width, config.target_height)
            .await
            .map_err(|err| PipelineError::Resize {
                path: path.clone(),
                source: err,
            })?;

        let record = store_image(pool, &path).await?;
        tracing::info!(
            id = record.id,
            filename = %record.filename,
            %encoding,
            "Image stored"
        );

        summary.stored.push(StoredImage {
            index,
            id: record.id,
            filename: record.filename,
            size_bytes: record.data.len(),
            encoding,
        });
    }

    Ok(summary)
}

/// Read the file at `path` and insert it as a new row. The stored
/// filename is the path as given.
pub async fn store_image(pool: &PgPool, path: &Path) -> Result<ImageRecord, StoreError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let filename = path.to_string_lossy().into_owned();
    validate_record_filename(&filename)?;

    let record = ImageRepo::create(pool, &CreateImageRecord { filename, data }).await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_is_zero_when_enough_results() {
        assert_eq!(RunSummary::new(10, 25).shortfall(), 0);
        assert_eq!(RunSummary::new(10, 10).shortfall(), 0);
    }

    #[test]
    fn shortfall_counts_missing_results() {
        assert_eq!(RunSummary::new(10, 3).shortfall(), 7);
        assert_eq!(RunSummary::new(5, 0).shortfall(), 5);
    }
}
