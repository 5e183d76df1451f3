use std::fmt;

/// Recoverable failures of the region grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaterRegionError {
    /// Map extents must be exact multiples of the region edge length.
    MapNotAligned { size_x: u32, size_y: u32, edge: usize },
    /// Saved validity flags don't match the region count of the current map.
    SaveLengthMismatch { expected: usize, found: usize },
}

impl fmt::Display for WaterRegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaterRegionError::MapNotAligned { size_x, size_y, edge } => write!(
                f,
                "map size {size_x}x{size_y} is not a multiple of the water region edge length {edge}"
            ),
            WaterRegionError::SaveLengthMismatch { expected, found } => write!(
                f,
                "saved water region count {found} does not match map region count {expected}"
            ),
        }
    }
}

impl std::error::Error for WaterRegionError {}
