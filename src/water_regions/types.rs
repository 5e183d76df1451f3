use serde::{Deserialize, Serialize};

/// Side length (in tiles) of a water region.
///
/// The map is divided into square regions of this size. Every region caches
/// its own patch labels, so a tile change only ever costs one region
/// recompute of `WATER_REGION_EDGE_LENGTH²` tiles.
pub const WATER_REGION_EDGE_LENGTH: usize = 16;

/// Label of a connected patch of water within one region.
pub type PatchLabel = u16;

/// One bit per edge tile of a region side. Region edges can be at most 64 tiles.
pub type TraversabilityBits = u64;

/// Label assigned to tiles without any water tracks.
pub const INVALID_WATER_REGION_PATCH: PatchLabel = 0;

/// Label of the first patch found in a region (also the only one, when
/// a region has a single patch).
pub const FIRST_REGION_LABEL: PatchLabel = 1;

/// Position of a region in the region grid.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaterRegionDesc {
    pub x: u32,
    pub y: u32,
}

impl WaterRegionDesc {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub const fn patch(self, label: PatchLabel) -> WaterRegionPatchDesc {
        WaterRegionPatchDesc { x: self.x, y: self.y, label }
    }
}

/// Identifies one connected patch of water within one region.
///
/// Only meaningful until the region gets invalidated: labels are reassigned
/// from scratch on every recompute.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaterRegionPatchDesc {
    pub x: u32,
    pub y: u32,
    pub label: PatchLabel,
}

impl WaterRegionPatchDesc {
    pub const fn region(self) -> WaterRegionDesc {
        WaterRegionDesc { x: self.x, y: self.y }
    }
}

/// Persisted state of one region: whether its cache was valid when saved.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WaterRegionSaveLoadInfo {
    pub initialized: bool,
}
