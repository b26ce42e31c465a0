//! Fitting the fixed-size raster into a viewport.
//!
//! [`layout`] is a pure function of its three inputs and cheap enough to run
//! on every paint pass.

use crate::stretch::StretchPolicy;
use egui::{Pos2, Rect, Vec2};

/// Axis-aligned scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: Vec2,
    pub translation: Vec2,
}

impl FitTransform {
    pub fn apply_pos(&self, pos: Pos2) -> Pos2 {
        Pos2::new(
            pos.x * self.scale.x + self.translation.x,
            pos.y * self.scale.y + self.translation.y,
        )
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.apply_pos(rect.min), self.apply_pos(rect.max))
    }
}

/// Where and how the raster is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitLayout {
    /// Scale factors from the stretch policy.
    pub scale: Vec2,
    /// Visible area on screen, always inside the viewport.
    pub dest_rect: Rect,
    /// Part of the raster that ends up in `dest_rect`, in raster pixels.
    pub source_rect: Rect,
    /// Maps raster pixels to screen coordinates.
    pub transform: FitTransform,
}

impl FitLayout {
    /// Screen rectangle covered by the whole raster; clip it to `dest_rect`.
    pub fn image_rect(&self, source_size: Vec2) -> Rect {
        self.transform
            .apply_rect(Rect::from_min_size(Pos2::ZERO, source_size))
    }
}

/// A rectangle of `size` centered within `outer`.
pub fn center_rect(size: Vec2, outer: Rect) -> Rect {
    Rect::from_center_size(outer.center(), size)
}

/// Computes the destination, source and transform for drawing a raster of
/// `source_size` into `viewport`.
///
/// Returns `None` when nothing would be visible.
pub fn layout(source_size: Vec2, viewport: Rect, policy: StretchPolicy) -> Option<FitLayout> {
    if !has_area(viewport.size()) || !has_area(source_size) {
        return None;
    }

    let scale = policy.scaling(viewport.size(), source_size);
    if !has_area(scale) {
        return None;
    }

    let scaled = source_size * scale;
    let dest_rect = center_rect(scaled, viewport).intersect(viewport);
    if !has_area(dest_rect.size()) {
        return None;
    }

    let source_bounds = Rect::from_min_size(Pos2::ZERO, source_size);
    let source_rect = center_rect(dest_rect.size() / scale, source_bounds);

    let transform_scale = dest_rect.size() / source_rect.size();
    let transform = FitTransform {
        scale: transform_scale,
        translation: dest_rect.min.to_vec2() - source_rect.min.to_vec2() * transform_scale,
    };

    Some(FitLayout {
        scale,
        dest_rect,
        source_rect,
        transform,
    })
}

fn has_area(size: Vec2) -> bool {
    size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0
}
