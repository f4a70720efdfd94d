use std::path::PathBuf;

use imgharvest_core::error::CoreError;
use imgharvest_core::resize::ResizeError;
use imgharvest_search::SearchError;

use crate::config::ConfigError;

/// A failure that ends the run.
///
/// Download failures are not represented here: they are logged, recorded
/// in the run summary, and the loop moves on to the next result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to connect to DB: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to migrate schema: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed resizing image {}: {source}", path.display())]
    Resize { path: PathBuf, source: ResizeError },

    #[error("Failed to store image to DB: {0}")]
    Store(#[from] StoreError),
}

/// Errors from persisting one resized file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Insert failed: {0}")]
    Insert(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_error_names_the_file() {
        let err = PipelineError::Resize {
            path: PathBuf::from("images/cats-0.jpg"),
            source: ResizeError::UnsupportedFormat("gif".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed resizing image images/cats-0.jpg: unsupported format: gif"
        );
    }

    #[test]
    fn search_error_is_prefixed() {
        let err = PipelineError::from(SearchError::EmptyQuery);
        assert_eq!(err.to_string(), "search failed: Search query must not be empty");
    }
}
