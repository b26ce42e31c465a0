//! Decoded icon pixels.
//!
//! Icons reach the widget either as encoded files (PNG, JPEG, ...) or as raw
//! pixel buffers handed over by the host. Both end up here, ready to be
//! resampled onto the QR raster.

use crate::error::ResourceError;
use image::RgbaImage;

/// Raw image bytes for an icon overlay.
///
/// The bytes are expected to be in RGBA format (4 bytes per pixel) or
/// RGB format (3 bytes per pixel). Use `bytes_per_pixel()` to determine
/// the format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Raw image bytes (RGBA or RGB)
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(width: usize, height: usize, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes,
        }
    }

    /// Decodes an encoded image file (any format the `image` crate reads).
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, ResourceError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded icon image: {width}x{height}");
        Ok(Self::new(width as usize, height as usize, rgba.into_raw()))
    }

    /// Returns the number of bytes per pixel based on the image dimensions.
    ///
    /// Returns `Some(4)` for RGBA, `Some(3)` for RGB, or `None` if the
    /// byte count doesn't match expected formats.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        let pixels = self.width.checked_mul(self.height)?;
        if pixels == 0 {
            return None;
        }

        if pixels.checked_mul(4) == Some(self.bytes.len()) {
            return Some(4);
        }

        if pixels.checked_mul(3) == Some(self.bytes.len()) {
            return Some(3);
        }

        None
    }

    pub fn is_rgba(&self) -> bool {
        self.bytes_per_pixel() == Some(4)
    }

    pub fn is_rgb(&self) -> bool {
        self.bytes_per_pixel() == Some(3)
    }

    /// Converts the buffer into an RGBA image, expanding RGB with opaque alpha.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, ResourceError> {
        let invalid = || ResourceError::InvalidBuffer {
            width: self.width,
            height: self.height,
            len: self.bytes.len(),
        };

        let width = u32::try_from(self.width).map_err(|_| invalid())?;
        let height = u32::try_from(self.height).map_err(|_| invalid())?;

        let rgba = match self.bytes_per_pixel() {
            Some(4) => self.bytes.clone(),
            Some(3) => self
                .bytes
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                .collect(),
            _ => return Err(invalid()),
        };

        RgbaImage::from_raw(width, height, rgba).ok_or_else(invalid)
    }
}
