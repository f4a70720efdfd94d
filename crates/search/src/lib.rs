//! HTTP side of the harvester: the image search endpoint and raw downloads.

pub mod api;
pub mod download;
pub mod source;

pub use api::{CustomSearchApi, SearchCredentials, SearchError};
pub use download::{download_to_file, DownloadError};
pub use source::ImageSource;
