//! Water regions: the map split into fixed-size squares, each square split
//! into connected patches of water.
//!
//! The ship pathfinder searches the graph of patches first and only then
//! refines inside the handful of regions on the route. This module builds and
//! caches that graph; it never computes paths itself.
//!
//! # Example
//!
//! ```rust
//! use waterway::map::WaterMap;
//! use waterway::track::TileCoord;
//! use waterway::water_regions::WaterRegions;
//!
//! let mut map = WaterMap::new(32, 32);
//! for x in 0..32 {
//!     map.set_water(TileCoord::new(x, 5));
//! }
//!
//! let mut regions: WaterRegions = WaterRegions::new();
//! regions.initialize_all(&map).unwrap();
//!
//! let start = regions.patch_info(&map, TileCoord::new(3, 5));
//! let neighbors = regions.patch_neighbors(&map, start);
//! assert_eq!(neighbors.len(), 1);
//! ```

mod types;
mod geometry;
mod oracle;
mod region;
mod grid;
mod neighbors;
mod error;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{
    PatchLabel, TraversabilityBits, WaterRegionDesc, WaterRegionPatchDesc, WaterRegionSaveLoadInfo,
    FIRST_REGION_LABEL, INVALID_WATER_REGION_PATCH, WATER_REGION_EDGE_LENGTH,
};
pub use geometry::{center_tile, edge_tile, region_from_index, region_index, region_of, tile_from_local, TileArea};
pub use oracle::WaterwayOracle;
pub use region::WaterRegion;
pub use grid::WaterRegions;
pub use error::WaterRegionError;

use bevy::prelude::*;
use std::marker::PhantomData;
use crate::track::TileCoord;

/// Sent by whatever changes the map whenever a tile's water tracks change.
///
/// When an aqueduct is built or removed, send one message per head so both
/// regions get invalidated. `WaterMap::set_tile` returns the partner head it
/// cleared when an edit overwrites one end of an aqueduct.
#[derive(Message, Debug, Clone, Copy)]
pub struct WaterTileChanged {
    pub tile: TileCoord,
}

/// Keeps the [`WaterRegions`] resource in sync with the map resource `M`.
///
/// Regions are fully initialized when `M` is inserted and invalidated for
/// every [`WaterTileChanged`] message afterwards.
pub struct WaterRegionsPlugin<M> {
    _map: PhantomData<fn() -> M>,
}

impl<M> Default for WaterRegionsPlugin<M> {
    fn default() -> Self {
        Self { _map: PhantomData }
    }
}

impl<M: WaterwayOracle + Resource> Plugin for WaterRegionsPlugin<M> {
    fn build(&self, app: &mut App) {
        app.add_message::<WaterTileChanged>();
        app.init_resource::<WaterRegions>();
        app.add_systems(
            Update,
            (
                initialize_water_regions::<M>.run_if(resource_added::<M>),
                invalidate_changed_tiles,
            )
                .chain(),
        );
    }
}

fn initialize_water_regions<M: WaterwayOracle + Resource>(map: Res<M>, mut regions: ResMut<WaterRegions>) {
    if let Err(e) = regions.initialize_all(&*map) {
        error!("[WATER REGIONS] Failed to initialize: {}", e);
    }
}

fn invalidate_changed_tiles(mut changes: MessageReader<WaterTileChanged>, mut regions: ResMut<WaterRegions>) {
    for change in changes.read() {
        regions.invalidate(change.tile);
    }
}
