//! Single-shot image download to a local file.
//!
//! One `GET`, no retries, no timeout beyond the client's defaults. The body
//! is streamed chunk by chunk into the destination, which is created or
//! truncated only once the response status is known to be a success. A
//! transfer that fails midway leaves the partial file where it is.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Errors from [`download_to_file`].
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The HTTP request or body transfer failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("Download returned HTTP {0}")]
    HttpStatus(u16),

    /// The destination file could not be created or written.
    #[error("Failed to write {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Download `url` into `dest`, returning the number of bytes written.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status.as_u16()));
    }

    let file_err = |source| DownloadError::File {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(dest).await.map_err(file_err)?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(file_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(file_err)?;

    tracing::debug!(url, path = %dest.display(), bytes = written, "Download complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display() {
        assert_eq!(
            DownloadError::HttpStatus(404).to_string(),
            "Download returned HTTP 404"
        );
    }

    #[test]
    fn request_error_display() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = DownloadError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
