//! Rendering core for the qrview widget.
//!
//! Turns a QR module matrix into a fixed-resolution raster and fits that
//! raster into an arbitrary viewport.
//!
//! # Modules
//!
//! - [`matrix`]: module matrix and the encoder seam (backed by the `qrcode` crate)
//! - [`config`]: render configuration and setter clamps
//! - [`raster`]: matrix to pixels, icon overlay
//! - [`stretch`]: stretch modes and scale computation
//! - [`layout`]: destination/source rectangles and the draw transform
//!
//! ```
//! use egui::{Rect, pos2, vec2};
//! use qrview_render::{QrEncoder, Rasterizer, RenderConfig, StretchPolicy, layout};
//!
//! let config = RenderConfig::builder().data("ABC".to_owned()).build();
//! let rasterizer = Rasterizer::default();
//! let image = rasterizer.regenerate(&QrEncoder, &config).unwrap().unwrap();
//! assert_eq!(image.size(), vec2(512.0, 512.0));
//!
//! let viewport = Rect::from_min_size(pos2(0.0, 0.0), vec2(256.0, 256.0));
//! let fit = layout::layout(image.size(), viewport, StretchPolicy::default()).unwrap();
//! assert_eq!(fit.scale, vec2(0.5, 0.5));
//! ```

pub mod config;
pub mod error;
pub mod image_data;
pub mod layout;
pub mod matrix;
pub mod raster;
pub mod stretch;

pub use config::{EccLevel, RenderConfig};
pub use error::{EncodeError, ResourceError};
pub use image_data::ImageData;
pub use layout::{FitLayout, FitTransform};
pub use matrix::{Encoder, ModuleMatrix, QrEncoder};
pub use raster::{DEFAULT_SOURCE_SIZE, RasterImage, Rasterizer};
pub use stretch::{Stretch, StretchDirection, StretchPolicy};
