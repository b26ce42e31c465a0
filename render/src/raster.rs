//! Module matrix to pixels.
//!
//! The raster always has the same fixed resolution regardless of the symbol
//! version; fitting it on screen is the job of [`crate::layout`].

use crate::config::RenderConfig;
use crate::error::EncodeError;
use crate::matrix::{Encoder, ModuleMatrix};
use egui::{Color32, ColorImage, Vec2, vec2};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Side length of the square raster, in pixels.
pub const DEFAULT_SOURCE_SIZE: u32 = 512;

/// Modules per side of a version 1 symbol, the smallest QR code.
const MIN_SYMBOL_WIDTH: u64 = 21;

/// A fully rendered QR bitmap. Never mutated after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish_non_exhaustive()
    }
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Logical size used by the layout code.
    pub fn size(&self) -> Vec2 {
        vec2(self.width() as f32, self.height() as f32)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel_color(&self, x: u32, y: u32) -> Option<Color32> {
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel_checked(x, y)?;
        Some(Color32::from_rgba_unmultiplied(r, g, b, a))
    }

    /// Converts to an egui image ready to be uploaded as a texture.
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }

    /// Encodes the raster as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Draws module matrices into a square raster of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rasterizer {
    size: u32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_SIZE)
    }
}

impl Rasterizer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn source_size(&self) -> Vec2 {
        vec2(self.size as f32, self.size as f32)
    }

    /// Encodes `config.data` and renders it.
    ///
    /// Returns `Ok(None)` when there is no data to show, and
    /// [`EncodeError::TooManyModules`] when the symbol plus quiet zone has more
    /// modules per side than the raster has pixels.
    pub fn regenerate(
        &self,
        encoder: &dyn Encoder,
        config: &RenderConfig,
    ) -> Result<Option<RasterImage>, EncodeError> {
        if !config.has_data() {
            return Ok(None);
        }

        // Even the smallest symbol must give every module at least one pixel.
        let smallest = MIN_SYMBOL_WIDTH + 2 * u64::from(config.quiet_zone_size);
        if smallest > u64::from(self.size) {
            return Err(EncodeError::too_many_modules(smallest, self.size));
        }

        let matrix = encoder.encode(&config.data, config.ecc_level, config.quiet_zone_size)?;
        let modules = matrix.column_count().max(matrix.row_count()) as u64;
        if modules > u64::from(self.size) {
            return Err(EncodeError::too_many_modules(modules, self.size));
        }

        Ok(Some(self.rasterize(&matrix, config)))
    }

    /// Renders `matrix` with the colors and icon from `config`.
    pub fn rasterize(&self, matrix: &ModuleMatrix, config: &RenderConfig) -> RasterImage {
        let foreground = to_rgba(config.color);
        let background = to_rgba(config.space_color);
        let mut pixels = RgbaImage::from_pixel(self.size, self.size, background);

        if !matrix.is_empty() {
            let x_edges = cell_edges(self.size, matrix.column_count());
            let y_edges = cell_edges(self.size, matrix.row_count());

            for (y, row) in matrix.rows().iter().enumerate() {
                for (x, &dark) in row.iter().enumerate() {
                    let color = if dark { foreground } else { background };
                    fill_rect(
                        &mut pixels,
                        x_edges[x]..x_edges[x + 1],
                        y_edges[y]..y_edges[y + 1],
                        color,
                    );
                }
            }
        }

        if config.draws_icon() {
            if let Some(icon) = &config.icon {
                match icon.to_rgba_image() {
                    Ok(icon) => self.overlay_icon(&mut pixels, &icon, config.icon_scale),
                    Err(err) => log::warn!("Skipping icon overlay: {err}"),
                }
            }
        }

        RasterImage { pixels }
    }

    /// Draws `icon` centered, covering `scale` percent of each axis.
    fn overlay_icon(&self, canvas: &mut RgbaImage, icon: &RgbaImage, scale: u8) {
        let extent = f64::from(self.size);
        let icon_extent = extent * f64::from(scale) / 100.0;
        let origin = extent / 2.0 - icon_extent / 2.0;

        let side = icon_extent.round() as u32;
        if side == 0 {
            return;
        }

        let resized = imageops::resize(icon, side, side, FilterType::Triangle);
        let offset = origin.round() as i64;
        imageops::overlay(canvas, &resized, offset, offset);
    }
}

/// Pixel boundaries of `count` equal cells spanning `extent`.
///
/// Neighbouring cells share an edge, so the cells tile the extent exactly.
fn cell_edges(extent: u32, count: usize) -> Vec<u32> {
    let cell = f64::from(extent) / count as f64;
    (0..=count)
        .map(|i| {
            if i == count {
                extent
            } else {
                (i as f64 * cell).round() as u32
            }
        })
        .collect()
}

fn fill_rect(
    pixels: &mut RgbaImage,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
    color: Rgba<u8>,
) {
    for y in ys {
        for x in xs.clone() {
            pixels.put_pixel(x, y, color);
        }
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EccLevel;
    use crate::image_data::ImageData;
    use crate::matrix::QrEncoder;
    use std::sync::Arc;

    fn sample_cell(image: &RasterImage, matrix: &ModuleMatrix, x: usize, y: usize) -> Color32 {
        let cell_w = image.width() as f64 / matrix.column_count() as f64;
        let cell_h = image.height() as f64 / matrix.row_count() as f64;
        let px = ((x as f64 + 0.5) * cell_w) as u32;
        let py = ((y as f64 + 0.5) * cell_h) as u32;
        image.pixel_color(px, py).expect("cell center is inside")
    }

    fn assert_cells_match(image: &RasterImage, matrix: &ModuleMatrix, config: &RenderConfig) {
        for y in 0..matrix.row_count() {
            for x in 0..matrix.column_count() {
                let expected = if matrix.get(x, y) {
                    config.color
                } else {
                    config.space_color
                };
                assert_eq!(
                    sample_cell(image, matrix, x, y),
                    expected,
                    "cell ({x}, {y}) has the wrong color"
                );
            }
        }
    }

    #[test]
    fn test_cell_edges_tile_extent() {
        let edges = cell_edges(512, 21);
        assert_eq!(edges.len(), 22);
        assert_eq!(edges[0], 0);
        assert_eq!(edges[21], 512);
        assert!(edges.windows(2).all(|w| w[0] < w[1]), "no empty cells");
        let widths: Vec<u32> = edges.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(widths.iter().all(|w| *w == 24 || *w == 25));
    }

    #[test]
    fn test_rasterize_round_trips_matrix() {
        let config = RenderConfig::builder()
            .data("Hello, world!")
            .color(Color32::from_rgb(10, 20, 200))
            .space_color(Color32::from_rgb(250, 240, 230))
            .quiet_zone_size(2)
            .ecc_level(EccLevel::M)
            .build();
        let matrix = QrEncoder
            .encode(&config.data, config.ecc_level, config.quiet_zone_size)
            .expect("short text should encode");

        let image = Rasterizer::default().rasterize(&matrix, &config);
        assert_eq!((image.width(), image.height()), (512, 512));
        assert_cells_match(&image, &matrix, &config);
    }

    #[test]
    fn test_widest_quiet_zone_that_fits_still_round_trips() {
        // 21 + 2 * 245 = 511 modules on a 512px raster.
        let config = RenderConfig::builder().data("ABC").quiet_zone_size(245).build();
        let image = Rasterizer::default()
            .regenerate(&QrEncoder, &config)
            .expect("511 modules fit in 512 pixels")
            .expect("has data");

        let matrix = QrEncoder
            .encode(&config.data, config.ecc_level, config.quiet_zone_size)
            .expect("encodes");
        assert_eq!(matrix.column_count(), 511);
        assert_cells_match(&image, &matrix, &config);
    }

    #[test]
    fn test_quiet_zone_wider_than_raster_is_rejected() {
        let config = RenderConfig::builder().data("ABC").quiet_zone_size(400).build();
        let result = Rasterizer::default().regenerate(&QrEncoder, &config);
        assert_eq!(result, Err(EncodeError::TooManyModules { modules: 821, size: 512 }));
    }

    #[test]
    fn test_huge_quiet_zone_is_rejected_before_encoding() {
        struct UnreachableEncoder;

        impl Encoder for UnreachableEncoder {
            fn encode(
                &self,
                _text: &str,
                _level: EccLevel,
                _quiet_zone: u32,
            ) -> Result<ModuleMatrix, EncodeError> {
                panic!("encoder must not run for an oversized quiet zone");
            }
        }

        let config = RenderConfig::builder().data("ABC").quiet_zone_size(u32::MAX).build();
        let result = Rasterizer::default().regenerate(&UnreachableEncoder, &config);
        assert!(matches!(result, Err(EncodeError::TooManyModules { size: 512, .. })));
    }

    #[test]
    fn test_oversized_matrix_from_encoder_is_rejected() {
        struct WideEncoder;

        impl Encoder for WideEncoder {
            fn encode(
                &self,
                _text: &str,
                _level: EccLevel,
                _quiet_zone: u32,
            ) -> Result<ModuleMatrix, EncodeError> {
                Ok(ModuleMatrix::new(vec![vec![true; 64]; 2]))
            }
        }

        let config = RenderConfig::builder().data("wide").build();
        let result = Rasterizer::new(32).regenerate(&WideEncoder, &config);
        assert_eq!(result, Err(EncodeError::TooManyModules { modules: 64, size: 32 }));
    }

    #[test]
    fn test_every_pixel_is_foreground_or_background() {
        let config = RenderConfig::builder()
            .data("seams")
            .color(Color32::RED)
            .space_color(Color32::GREEN)
            .build();
        let image = Rasterizer::new(300)
            .regenerate(&QrEncoder, &config)
            .expect("encodes")
            .expect("has data");

        for pixel in image.pixels().pixels() {
            assert!(
                *pixel == to_rgba(Color32::RED) || *pixel == to_rgba(Color32::GREEN),
                "unexpected pixel {pixel:?}"
            );
        }
    }

    #[test]
    fn test_ragged_rows_leave_background() {
        let matrix = ModuleMatrix::new(vec![vec![true, true], vec![true]]);
        let config = RenderConfig::default();
        let image = Rasterizer::new(4).rasterize(&matrix, &config);

        assert_eq!(image.pixel_color(3, 3), Some(Color32::WHITE));
        assert_eq!(image.pixel_color(0, 3), Some(Color32::BLACK));
        assert_eq!(image.pixel_color(3, 0), Some(Color32::BLACK));
    }

    #[test]
    fn test_empty_data_produces_no_image() {
        let rasterizer = Rasterizer::default();
        for data in ["", "   ", "\n\t"] {
            let config = RenderConfig::builder().data(data).build();
            let result = rasterizer
                .regenerate(&QrEncoder, &config)
                .expect("empty data is not an error");
            assert!(result.is_none(), "{data:?} should render nothing");
        }
    }

    #[test]
    fn test_encode_failure_propagates() {
        let config = RenderConfig::builder()
            .data("x".repeat(3000))
            .ecc_level(EccLevel::H)
            .build();
        let result = Rasterizer::default().regenerate(&QrEncoder, &config);
        assert!(matches!(
            result,
            Err(EncodeError::CapacityExceeded {
                len: 3000,
                level: EccLevel::H
            })
        ));
    }

    #[test]
    fn test_icon_is_centered_on_top() {
        let icon = Arc::new(ImageData::new(1, 1, vec![255, 0, 0, 255]));
        let matrix = ModuleMatrix::new(vec![vec![true; 4]; 4]);
        let config = RenderConfig::builder()
            .icon(icon)
            .icon_scale(50)
            .build();

        let image = Rasterizer::new(100).rasterize(&matrix, &config);

        // 50% of 100 px centered: [25, 75).
        assert_eq!(image.pixel_color(50, 50), Some(Color32::RED));
        assert_eq!(image.pixel_color(25, 25), Some(Color32::RED));
        assert_eq!(image.pixel_color(74, 74), Some(Color32::RED));
        assert_eq!(image.pixel_color(24, 50), Some(Color32::BLACK));
        assert_eq!(image.pixel_color(75, 50), Some(Color32::BLACK));
    }

    #[test]
    fn test_icon_out_of_range_scale_is_skipped() {
        let icon = Arc::new(ImageData::new(1, 1, vec![255, 0, 0, 255]));
        let matrix = ModuleMatrix::new(vec![vec![true; 4]; 4]);
        let rasterizer = Rasterizer::new(100);

        for scale in [0, 100, 200] {
            let config = RenderConfig::builder()
                .icon(icon.clone())
                .icon_scale(scale)
                .build();
            let image = rasterizer.rasterize(&matrix, &config);
            assert_eq!(
                image.pixel_color(50, 50),
                Some(Color32::BLACK),
                "scale {scale} must not draw the icon"
            );
        }
    }

    #[test]
    fn test_transparent_icon_keeps_modules_visible() {
        let icon = Arc::new(ImageData::new(1, 1, vec![255, 0, 0, 0]));
        let matrix = ModuleMatrix::new(vec![vec![true; 2]; 2]);
        let config = RenderConfig::builder()
            .icon(icon)
            .icon_scale(90)
            .build();

        let image = Rasterizer::new(64).rasterize(&matrix, &config);
        assert_eq!(image.pixel_color(32, 32), Some(Color32::BLACK));
    }

    #[test]
    fn test_broken_icon_does_not_break_rendering() {
        env_logger::builder().is_test(true).try_init().ok();
        let icon = Arc::new(ImageData::new(8, 8, vec![1, 2, 3]));
        let matrix = ModuleMatrix::new(vec![vec![true]]);
        let config = RenderConfig::builder().icon(icon).build();

        let image = Rasterizer::new(16).rasterize(&matrix, &config);
        assert_eq!(image.pixel_color(8, 8), Some(Color32::BLACK));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let config = RenderConfig::builder().data("same input").build();
        let rasterizer = Rasterizer::default();
        let first = rasterizer.regenerate(&QrEncoder, &config).expect("encodes");
        let second = rasterizer.regenerate(&QrEncoder, &config).expect("encodes");
        assert_eq!(first, second);
    }

    #[test]
    fn test_png_and_color_image_conversion() {
        let config = RenderConfig::builder().data("png").build();
        let image = Rasterizer::new(64)
            .regenerate(&QrEncoder, &config)
            .expect("encodes")
            .expect("has data");

        let png = image.encode_png().expect("PNG encoding should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let color_image = image.to_color_image();
        assert_eq!(color_image.size, [64, 64]);
        assert_eq!(color_image.pixels[0], image.pixel_color(0, 0).expect("inside"));
    }
}
