// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster — an immutable in-memory image. Operates on decoded images using the
// `image` crate; transforms consume `self` and return a new `Raster`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use outcrop_core::error::{OutcropError, Result};
use tracing::{debug, info, instrument};

/// A decoded image owned by exactly one pipeline stage at a time.
///
/// ```ignore
/// let bytes = Raster::open("photo.jpg")?
///     .resize_exact(800, 600)
///     .to_png_bytes()?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster {
    image: DynamicImage,
}

impl Raster {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The decoder is chosen from the file's leading bytes, so a JPEG saved
    /// under another extension still opens.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read_err = |reason: String| OutcropError::ImageRead {
            path: path.to_path_buf(),
            reason,
        };
        let img = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| read_err(err.to_string()))?
            .decode()
            .map_err(|err| read_err(err.to_string()))?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| OutcropError::Image(format!("failed to decode image: {err}")))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize to exactly `width` x `height` with Lanczos3 filtering.
    #[instrument(skip(self))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Resizing image"
        );
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Write the image to `path` as JPEG regardless of the file extension.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save_jpeg(&self, path: impl AsRef<Path>, quality: u8) -> Result<()> {
        let path = path.as_ref();
        let write_err = |reason: String| OutcropError::ImageWrite {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::create(path).map_err(|err| write_err(err.to_string()))?;
        let mut output = BufWriter::new(file);
        write_jpeg(&self.image, &mut output, quality).map_err(|err| write_err(err.to_string()))?;
        output.flush().map_err(|err| write_err(err.to_string()))?;
        output
            .get_ref()
            .sync_all()
            .map_err(|err| write_err(err.to_string()))?;

        debug!(width = self.width(), height = self.height(), "Image saved");
        Ok(())
    }
}

/// JPEG has no alpha channel, so the image is flattened to RGB first.
fn write_jpeg<W: Write>(
    image: &DynamicImage,
    writer: &mut W,
    quality: u8,
) -> image::ImageResult<()> {
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    rgb.write_with_encoder(encoder)
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
pub(crate) fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| OutcropError::Image(format!("image encoding failed: {err}")))?;
    Ok(buffer)
}
