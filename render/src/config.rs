//! Render configuration shared by the rasterizer and the widget.

use crate::image_data::ImageData;
use egui::Color32;
use std::fmt;
use std::sync::Arc;

/// Smallest icon coverage accepted by the setters, in percent.
pub const MIN_ICON_SCALE: u8 = 1;

/// Largest icon coverage accepted by the setters, in percent.
pub const MAX_ICON_SCALE: u8 = 99;

/// Icon coverage used when none is configured.
pub const DEFAULT_ICON_SCALE: u8 = 15;

/// Error-correction level, ordered by increasing redundancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EccLevel {
    /// ~7% of codewords can be restored.
    #[default]
    L,
    /// ~15% of codewords can be restored.
    M,
    /// ~25% of codewords can be restored.
    Q,
    /// ~30% of codewords can be restored.
    H,
}

impl EccLevel {
    pub const ALL: [Self; 4] = [Self::L, Self::M, Self::Q, Self::H];
}

impl fmt::Display for EccLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(letter)
    }
}

impl From<EccLevel> for qrcode::EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::L => Self::L,
            EccLevel::M => Self::M,
            EccLevel::Q => Self::Q,
            EccLevel::H => Self::H,
        }
    }
}

/// Everything the rasterizer needs to produce an image.
///
/// Any field change invalidates a previously rendered raster. Values built
/// through the builder are taken as-is; the widget setters clamp
/// `icon_scale` and `quiet_zone_size` before they land here, and the
/// rasterizer skips the icon when `icon_scale` is outside `1..=99`.
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct RenderConfig {
    /// Text to encode. Empty or whitespace means there is nothing to render.
    #[builder(into, default)]
    pub data: String,
    /// Color of the dark modules.
    #[builder(default = Color32::BLACK)]
    pub color: Color32,
    /// Color of the light modules and the quiet zone.
    #[builder(default = Color32::WHITE)]
    pub space_color: Color32,
    /// Drawn centered on top of the modules when set.
    pub icon: Option<Arc<ImageData>>,
    /// Percentage of the canvas covered by the icon.
    #[builder(default = DEFAULT_ICON_SCALE)]
    pub icon_scale: u8,
    /// Light modules added on every side of the symbol.
    #[builder(default)]
    pub quiet_zone_size: u32,
    #[builder(default)]
    pub ecc_level: EccLevel,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RenderConfig {
    /// Returns true when `data` holds something other than whitespace.
    pub fn has_data(&self) -> bool {
        has_data(&self.data)
    }

    /// Returns true when the icon overlay should be drawn.
    pub fn draws_icon(&self) -> bool {
        self.icon.is_some() && (MIN_ICON_SCALE..=MAX_ICON_SCALE).contains(&self.icon_scale)
    }
}

pub fn has_data(data: &str) -> bool {
    !data.trim().is_empty()
}

/// Clamps a requested icon coverage into `1..=99`.
pub fn clamp_icon_scale(value: i32) -> u8 {
    let clamped = value.clamp(i32::from(MIN_ICON_SCALE), i32::from(MAX_ICON_SCALE));
    u8::try_from(clamped).unwrap_or(MAX_ICON_SCALE)
}

/// Clamps a requested quiet zone to be non-negative.
pub fn clamp_quiet_zone(value: i32) -> u32 {
    value.max(0).unsigned_abs()
}
