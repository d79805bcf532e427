use crate::{error::ColliderError, Fp};

/// Construction parameters for a [`SpatialHash`](crate::SpatialHash).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashConfig {
    /// Side length of a grid cell in world units. Must be positive.
    pub cell_size: i32,
    /// Half the side of the box a `Point` occupies, so points never register
    /// as an infinitesimal box.
    pub point_half_extent: Fp,
}

impl HashConfig {
    pub const DEFAULT_CELL_SIZE: i32 = 128;
    pub const DEFAULT_POINT_HALF_EXTENT: Fp = 0.5;

    pub fn new(cell_size: i32) -> HashConfig {
        HashConfig { cell_size, ..HashConfig::default() }
    }

    pub fn validate(&self) -> Result<(), ColliderError> {
        if self.cell_size <= 0 {
            return Err(ColliderError::InvalidConfiguration(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        // a zero extent makes coincident points separate by a zero vector
        if !self.point_half_extent.is_finite() || self.point_half_extent <= 0.0 {
            return Err(ColliderError::InvalidConfiguration(format!(
                "point half extent must be finite and positive, got {}",
                self.point_half_extent
            )));
        }
        Ok(())
    }
}

impl Default for HashConfig {
    fn default() -> HashConfig {
        HashConfig {
            cell_size: HashConfig::DEFAULT_CELL_SIZE,
            point_half_extent: HashConfig::DEFAULT_POINT_HALF_EXTENT,
        }
    }
}
