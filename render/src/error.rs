use crate::config::EccLevel;
use thiserror::Error;

/// The encoder could not build a symbol for the requested text and level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("payload of {len} bytes exceeds QR capacity at ECC level {level}")]
    CapacityExceeded { len: usize, level: EccLevel },
    #[error("encoder rejected payload: {reason}")]
    Rejected { reason: String },
    #[error("{modules} modules per side do not fit a {size}px raster")]
    TooManyModules { modules: u64, size: u32 },
}

impl EncodeError {
    pub fn capacity_exceeded(len: usize, level: EccLevel) -> Self {
        Self::CapacityExceeded { len, level }
    }

    pub fn too_many_modules(modules: u64, size: u32) -> Self {
        Self::TooManyModules { modules, size }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// An icon image could not be decoded or has an unusable pixel buffer.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to decode icon image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid icon pixel buffer: {width}x{height} with {len} bytes")]
    InvalidBuffer {
        width: usize,
        height: usize,
        len: usize,
    },
}
