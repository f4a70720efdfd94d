//! Fixed-size image resize with in-place overwrite.
//!
//! Only JPEG and PNG sources are accepted. The source encoding is sniffed
//! from the file contents (not the extension), every target pixel is a
//! bilinear blend of the four nearest source pixels, the scaled image is
//! drawn onto a fresh transparent canvas of exactly the target size, and
//! the result is re-encoded in the detected encoding.
//!
//! The whole output is encoded in memory before the file is touched, so a
//! rejected or undecodable input never leaves a truncated file behind.

use std::io;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Width every downloaded image is scaled to.
pub const TARGET_WIDTH: u32 = 800;

/// Height every downloaded image is scaled to.
pub const TARGET_HEIGHT: u32 = 600;

/// Quality used when re-encoding JPEG output.
pub const JPEG_QUALITY: u8 = 75;

// ---------------------------------------------------------------------------
// Encoding detection
// ---------------------------------------------------------------------------

/// The two encodings the resizer can round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl ImageEncoding {
    /// Sniff the encoding from the leading bytes of `data`.
    pub fn detect(data: &[u8]) -> Result<Self, ResizeError> {
        match image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => Ok(Self::Jpeg),
            Ok(ImageFormat::Png) => Ok(Self::Png),
            Ok(other) => Err(ResizeError::UnsupportedFormat(
                format!("{other:?}").to_lowercase(),
            )),
            Err(_) => Err(ResizeError::UnsupportedFormat("unknown".to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

impl std::fmt::Display for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from [`resize_image_file`] and [`resize_bytes`].
#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    /// The source file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The source is neither JPEG nor PNG.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A zero target width or height.
    #[error("unsupported target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The header looked right but the body did not decode.
    #[error("Failed to decode {encoding} image: {source}")]
    Decode {
        encoding: ImageEncoding,
        source: image::ImageError,
    },

    #[error("Failed to encode {encoding} image: {source}")]
    Encode {
        encoding: ImageEncoding,
        source: image::ImageError,
    },

    /// Writing the resized bytes back over the source failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl ResizeError {
    /// `true` for inputs the resizer refuses outright (encoding or target
    /// size), as opposed to I/O or codec failures.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::InvalidDimensions { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

/// Resize the image at `path` to exactly `width` x `height` and overwrite it
/// in its original encoding. Returns the detected encoding.
pub async fn resize_image_file(
    path: &Path,
    width: u32,
    height: u32,
) -> Result<ImageEncoding, ResizeError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| ResizeError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let (resized, encoding) = resize_bytes(&data, width, height)?;

    tokio::fs::write(path, resized)
        .await
        .map_err(|source| ResizeError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(encoding)
}

/// Decode `data`, scale it to `width` x `height`, and re-encode it in the
/// same encoding.
pub fn resize_bytes(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(Vec<u8>, ImageEncoding), ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidDimensions { width, height });
    }

    let encoding = ImageEncoding::detect(data)?;
    let source = image::load_from_memory_with_format(data, encoding.image_format())
        .map_err(|source| ResizeError::Decode { encoding, source })?;

    let canvas = scale_bilinear(&source, width, height);
    let encoded = encode(canvas, encoding)?;
    Ok((encoded, encoding))
}

/// Scale `source` to the target size and draw it "over" a transparent
/// canvas. Straight (non-premultiplied) alpha throughout.
///
/// Each target pixel centre is mapped back into source space and blended
/// from exactly the four surrounding source pixels, whatever the scale
/// factor. Coordinates past the outer pixel centres clamp to the edge.
fn scale_bilinear(source: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let src = source.to_rgba8();
    let (src_w, src_h) = src.dimensions();
    let scale_x = src_w as f32 / width as f32;
    let scale_y = src_h as f32 / height as f32;
    let max_x = src_w.saturating_sub(1) as f32;
    let max_y = src_h.saturating_sub(1) as f32;

    let scaled = RgbaImage::from_fn(width, height, |x, y| {
        let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
        let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        imageops::interpolate_bilinear(&src, sx, sy).unwrap_or(Rgba([0, 0, 0, 0]))
    });

    let mut canvas = RgbaImage::new(width, height);
    imageops::overlay(&mut canvas, &scaled, 0, 0);
    canvas
}

fn encode(canvas: RgbaImage, encoding: ImageEncoding) -> Result<Vec<u8>, ResizeError> {
    let mut out = Vec::new();
    let (width, height) = canvas.dimensions();

    let result = match encoding {
        // JPEG has no alpha channel.
        ImageEncoding::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)
        }
        ImageEncoding::Png => PngEncoder::new(&mut out).write_image(
            canvas.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|source| ResizeError::Encode { encoding, source })?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
