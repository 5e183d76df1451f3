use bevy::prelude::*;
use crate::profile_log;
use crate::track::TileCoord;
use super::error::WaterRegionError;
use super::geometry;
use super::oracle::WaterwayOracle;
use super::region::WaterRegion;
use super::types::{WaterRegionDesc, WaterRegionPatchDesc, WaterRegionSaveLoadInfo, WATER_REGION_EDGE_LENGTH};

/// All water regions of the map, stored row-major.
///
/// Regions are recomputed lazily: [`WaterRegions::invalidate`] only marks a
/// region stale, and the next read through [`WaterRegions::get_updated`] (or
/// any query built on it) recomputes it. Nothing else in the crate reads a
/// region's cache directly.
#[derive(Resource, Clone, Debug)]
pub struct WaterRegions<const EDGE: usize = WATER_REGION_EDGE_LENGTH> {
    regions: Vec<WaterRegion<EDGE>>,
    regions_x: u32,
    regions_y: u32,
    /// Flood fill stack shared by every region recompute.
    tiles_to_check: Vec<TileCoord>,
    recompute_count: u64,
}

impl<const EDGE: usize> Default for WaterRegions<EDGE> {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            regions_x: 0,
            regions_y: 0,
            tiles_to_check: Vec::with_capacity(EDGE * EDGE),
            recompute_count: 0,
        }
    }
}

impl<const EDGE: usize> WaterRegions<EDGE> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of the grid in regions.
    pub fn regions_x(&self) -> u32 {
        self.regions_x
    }

    /// Height of the grid in regions.
    pub fn regions_y(&self) -> u32 {
        self.regions_y
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of region recomputes since this grid was created.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    fn grid_size<M: WaterwayOracle + ?Sized>(map: &M) -> Result<(u32, u32), WaterRegionError> {
        let edge = EDGE as u32;
        let (size_x, size_y) = (map.size_x(), map.size_y());
        if size_x % edge != 0 || size_y % edge != 0 {
            return Err(WaterRegionError::MapNotAligned { size_x, size_y, edge: EDGE });
        }
        Ok((size_x / edge, size_y / edge))
    }

    fn rebuild(&mut self, regions_x: u32, regions_y: u32) {
        let count = regions_x as usize * regions_y as usize;
        self.regions_x = regions_x;
        self.regions_y = regions_y;
        self.regions.clear();
        self.regions.reserve(count);
        self.regions.extend((0..count).map(|index| WaterRegion::new(geometry::region_from_index(index, regions_x))));
    }

    /// Build the grid for `map` from scratch and recompute every region.
    pub fn initialize_all<M: WaterwayOracle + ?Sized>(&mut self, map: &M) -> Result<(), WaterRegionError> {
        let (regions_x, regions_y) = Self::grid_size(map)?;
        self.rebuild(regions_x, regions_y);

        for index in 0..self.regions.len() {
            self.force_update_index(map, index);
        }

        info!(
            "[WATER REGIONS] Initialized {}x{} regions ({}x{} tiles each)",
            regions_x, regions_y, EDGE, EDGE
        );
        Ok(())
    }

    fn force_update_index<M: WaterwayOracle + ?Sized>(&mut self, map: &M, index: usize) {
        let Self { regions, tiles_to_check, .. } = self;
        regions[index].force_update(map, tiles_to_check);
        self.recompute_count += 1;
        profile_log!(self.recompute_count, "[WATER REGIONS] {} region recomputes", self.recompute_count);
    }

    /// Index of `region`, or `None` when it is off the grid.
    pub fn index_of(&self, region: WaterRegionDesc) -> Option<usize> {
        if region.x >= self.regions_x || region.y >= self.regions_y {
            return None;
        }
        let index = geometry::region_index(region, self.regions_x);
        (index < self.regions.len()).then_some(index)
    }

    /// Mark the region containing `tile` stale. Tiles outside the grid are ignored.
    pub fn invalidate(&mut self, tile: TileCoord) {
        let Some(index) = self.index_of(geometry::region_of::<EDGE>(tile)) else {
            debug!("[WATER REGIONS] Ignoring invalidation of off-grid tile ({}, {})", tile.x, tile.y);
            return;
        };
        self.regions[index].invalidate();
    }

    /// Bring the region at `region` up to date and return its index.
    ///
    /// # Panics
    /// If `region` lies outside the grid.
    pub(super) fn update_region<M: WaterwayOracle + ?Sized>(&mut self, map: &M, region: WaterRegionDesc) -> usize {
        let index = self.index_of(region).unwrap_or_else(|| {
            panic!(
                "water region ({}, {}) outside {}x{} grid",
                region.x, region.y, self.regions_x, self.regions_y
            )
        });
        if !self.regions[index].is_initialized() {
            self.force_update_index(map, index);
        }
        index
    }

    pub(super) fn region_at(&self, index: usize) -> &WaterRegion<EDGE> {
        &self.regions[index]
    }

    /// The up-to-date region containing `tile`.
    pub fn get_updated<M: WaterwayOracle + ?Sized>(&mut self, map: &M, tile: TileCoord) -> &WaterRegion<EDGE> {
        self.get_updated_region(map, geometry::region_of::<EDGE>(tile))
    }

    /// The up-to-date region at grid position `region`.
    pub fn get_updated_region<M: WaterwayOracle + ?Sized>(
        &mut self,
        map: &M,
        region: WaterRegionDesc,
    ) -> &WaterRegion<EDGE> {
        let index = self.update_region(map, region);
        &self.regions[index]
    }

    /// Region at `region` as currently cached, possibly stale.
    pub fn region(&self, region: WaterRegionDesc) -> Option<&WaterRegion<EDGE>> {
        self.index_of(region).map(|index| &self.regions[index])
    }

    /// Region and patch label of `tile`.
    pub fn patch_info<M: WaterwayOracle + ?Sized>(&mut self, map: &M, tile: TileCoord) -> WaterRegionPatchDesc {
        let region = geometry::region_of::<EDGE>(tile);
        let label = self.get_updated_region(map, region).label(tile);
        region.patch(label)
    }

    /// Region containing `tile`.
    pub fn region_info(&self, tile: TileCoord) -> WaterRegionDesc {
        geometry::region_of::<EDGE>(tile)
    }

    /// Representative tile of `region`.
    pub fn center_tile(&self, region: WaterRegionDesc) -> TileCoord {
        geometry::center_tile::<EDGE>(region)
    }

    /// Validity of every region in row-major order. Cached data is not included.
    pub fn snapshot_validity(&self) -> Vec<WaterRegionSaveLoadInfo> {
        self.regions
            .iter()
            .map(|region| WaterRegionSaveLoadInfo { initialized: region.is_initialized() })
            .collect()
    }

    /// Rebuild the grid for `map` from saved validity flags.
    ///
    /// Regions that were valid when saved are recomputed right away, the rest
    /// stay stale until first read. On error the grid is left untouched.
    pub fn restore<M: WaterwayOracle + ?Sized>(
        &mut self,
        map: &M,
        save_load_info: &[WaterRegionSaveLoadInfo],
    ) -> Result<(), WaterRegionError> {
        let (regions_x, regions_y) = Self::grid_size(map)?;
        let expected = regions_x as usize * regions_y as usize;
        if save_load_info.len() != expected {
            error!(
                "[WATER REGIONS] Save has {} regions, map needs {}",
                save_load_info.len(), expected
            );
            return Err(WaterRegionError::SaveLengthMismatch { expected, found: save_load_info.len() });
        }

        self.rebuild(regions_x, regions_y);
        let mut restored = 0;
        for (index, info) in save_load_info.iter().enumerate() {
            if info.initialized {
                self.force_update_index(map, index);
                restored += 1;
            }
        }

        info!(
            "[WATER REGIONS] Restored {} regions, {} recomputed eagerly",
            expected, restored
        );
        Ok(())
    }
}
