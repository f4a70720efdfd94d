//! Output directory and file naming for downloaded images.
//!
//! Every downloaded image lands in a single flat directory as
//! `<query>-<index>.jpg`. The extension is fixed and does not follow the
//! detected encoding: a PNG result is still written as `.jpg`. Existing
//! rows and files depend on that name, so it is kept as-is.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "images";

/// Extension appended to every output file regardless of its real encoding.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Permission bits for a freshly created output directory (unix only).
pub const OUTPUT_DIR_MODE: u32 = 0o755;

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// Build the file name for the result at `index` of `query`.
pub fn output_file_name(query: &str, index: usize) -> String {
    format!("{query}-{index}.{OUTPUT_EXTENSION}")
}

/// Join [`output_file_name`] onto `dir`.
pub fn output_path(dir: &Path, query: &str, index: usize) -> PathBuf {
    dir.join(output_file_name(query, index))
}

/// A stored filename must be non-empty.
pub fn validate_record_filename(filename: &str) -> Result<(), CoreError> {
    if filename.trim().is_empty() {
        return Err(CoreError::Validation(
            "Image filename must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Directory creation
// ---------------------------------------------------------------------------

/// Create `dir` if it does not exist yet. An existing directory is left
/// untouched, so repeated runs are idempotent.
pub fn ensure_output_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(OUTPUT_DIR_MODE);
    }
    builder.create(dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
