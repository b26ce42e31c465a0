//! How a fixed-size source is scaled into a destination size.

use egui::{Vec2, vec2};

/// Scaling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Stretch {
    /// Keep the source size.
    None,
    /// Scale each axis independently to fill the destination.
    Fill,
    /// Fit inside the destination, preserving aspect ratio.
    #[default]
    Uniform,
    /// Cover the destination, preserving aspect ratio; may crop.
    UniformToFill,
}

/// Which way scaling is allowed to go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StretchDirection {
    /// Only enlarge.
    UpOnly,
    /// Only shrink.
    DownOnly,
    #[default]
    Both,
}

/// Mode and direction together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StretchPolicy {
    pub mode: Stretch,
    pub direction: StretchDirection,
}

impl StretchPolicy {
    pub fn new(mode: Stretch, direction: StretchDirection) -> Self {
        Self { mode, direction }
    }

    pub fn scaling(&self, destination: Vec2, source: Vec2) -> Vec2 {
        self.mode.calculate_scaling(destination, source, self.direction)
    }

    pub fn size(&self, destination: Vec2, source: Vec2) -> Vec2 {
        self.mode.calculate_size(destination, source, self.direction)
    }
}

impl Stretch {
    pub const ALL: [Self; 4] = [Self::None, Self::Fill, Self::Uniform, Self::UniformToFill];

    /// Per-axis scale factors mapping `source` into `destination`.
    ///
    /// An infinite destination axis is unconstrained and follows the other
    /// axis; with both axes unconstrained the source keeps its size.
    pub fn calculate_scaling(
        self,
        destination: Vec2,
        source: Vec2,
        direction: StretchDirection,
    ) -> Vec2 {
        let constrained_width = destination.x.is_finite();
        let constrained_height = destination.y.is_finite();

        if self == Self::None || !(constrained_width || constrained_height) {
            return Vec2::splat(1.0);
        }

        let ratio = |dest: f32, src: f32| if src == 0.0 { 0.0 } else { dest / src };
        let mut scale_x = ratio(destination.x, source.x);
        let mut scale_y = ratio(destination.y, source.y);

        if !constrained_width {
            scale_x = scale_y;
        } else if !constrained_height {
            scale_y = scale_x;
        } else {
            match self {
                Self::Uniform => {
                    let uniform = scale_x.min(scale_y);
                    scale_x = uniform;
                    scale_y = uniform;
                }
                Self::UniformToFill => {
                    let uniform = scale_x.max(scale_y);
                    scale_x = uniform;
                    scale_y = uniform;
                }
                Self::Fill | Self::None => {}
            }
        }

        match direction {
            StretchDirection::UpOnly => vec2(scale_x.max(1.0), scale_y.max(1.0)),
            StretchDirection::DownOnly => vec2(scale_x.min(1.0), scale_y.min(1.0)),
            StretchDirection::Both => vec2(scale_x, scale_y),
        }
    }

    /// Size `source` takes once scaled into `destination`.
    pub fn calculate_size(
        self,
        destination: Vec2,
        source: Vec2,
        direction: StretchDirection,
    ) -> Vec2 {
        source * self.calculate_scaling(destination, source, direction)
    }
}
