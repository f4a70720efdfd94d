//! The search-and-fetch seam the harvest loop drives.

use std::path::Path;

use async_trait::async_trait;

use crate::api::{CustomSearchApi, SearchError};
use crate::download::{download_to_file, DownloadError};

/// Something that can turn a query into image URLs and fetch each URL
/// into a local file.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Ordered candidate URLs for `query`.
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;

    /// Fetch `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

#[async_trait]
impl ImageSource for CustomSearchApi {
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        CustomSearchApi::search(self, query).await
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        download_to_file(self.client(), url, dest).await
    }
}
