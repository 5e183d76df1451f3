use crate::track::{DiagDirection, TileCoord, TrackBits};
use super::geometry::{self, TileArea};
use super::oracle::WaterwayOracle;
use super::types::{
    PatchLabel, TraversabilityBits, WaterRegionDesc, FIRST_REGION_LABEL, INVALID_WATER_REGION_PATCH,
};

/// A square section of the map (`EDGE` × `EDGE` tiles) with its water split
/// into connected patches.
///
/// # Algorithm
///
/// 1. **Aqueducts:** Note whether any aqueduct leaves the region
/// 2. **Labeling:** Flood fill from every unlabeled tile in row-major order,
///    following ship steps that stay inside the region
/// 3. **Edges:** Per side, one bit per edge tile that ships can cross
///
/// Everything cached here only describes tiles inside the region. Connectivity
/// across region borders is derived later from the edge bits of both sides,
/// which keeps invalidation local: a tile change only dirties its own region.
#[derive(Clone, Debug)]
pub struct WaterRegion<const EDGE: usize> {
    edge_traversability_bits: [TraversabilityBits; 4],
    has_cross_region_aqueducts: bool,
    /// 0 = no water, 1 = one single patch of water, etc.
    number_of_patches: PatchLabel,
    tile_area: TileArea,
    tile_patch_labels: Box<[PatchLabel]>,
    initialized: bool,
}

impl<const EDGE: usize> WaterRegion<EDGE> {
    const EDGE_FITS_BITS: () = assert!(
        EDGE > 0 && EDGE <= TraversabilityBits::BITS as usize,
        "water region edge must fit in the traversability bits"
    );

    pub fn new(region: WaterRegionDesc) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::EDGE_FITS_BITS;

        Self {
            edge_traversability_bits: [0; 4],
            has_cross_region_aqueducts: false,
            number_of_patches: 0,
            tile_area: TileArea::new(
                geometry::tile_from_local::<EDGE>(region, 0, 0),
                EDGE as u32,
                EDGE as u32,
            ),
            tile_patch_labels: vec![INVALID_WATER_REGION_PATCH; EDGE * EDGE].into_boxed_slice(),
            initialized: false,
        }
    }

    pub fn tile_area(&self) -> &TileArea {
        &self.tile_area
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tile_area.iter()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark the cached data stale. The data itself is left in place and gets
    /// overwritten by the next update.
    pub fn invalidate(&mut self) {
        self.initialized = false;
    }

    /// Bit `i` is set when ships can cross `side` through edge tile `i`
    /// (see [`geometry::edge_tile`] for the numbering).
    pub fn edge_traversability_bits(&self, side: DiagDirection) -> TraversabilityBits {
        self.edge_traversability_bits[side.as_index()]
    }

    pub fn number_of_patches(&self) -> PatchLabel {
        self.number_of_patches
    }

    pub fn has_cross_region_aqueducts(&self) -> bool {
        self.has_cross_region_aqueducts
    }

    /// Patch label of a tile inside this region.
    ///
    /// # Panics
    /// If `tile` lies outside the region.
    pub fn label(&self, tile: TileCoord) -> PatchLabel {
        self.tile_patch_labels[self.local_index(tile)]
    }

    /// Local index of the tile. The N corner is 0, x grows towards SW and y towards SE.
    fn local_index(&self, tile: TileCoord) -> usize {
        assert!(
            self.tile_area.contains(tile),
            "tile ({}, {}) is outside water region at ({}, {})",
            tile.x, tile.y, self.tile_area.origin.x, self.tile_area.origin.y
        );
        (tile.x - self.tile_area.origin.x) as usize + EDGE * (tile.y - self.tile_area.origin.y) as usize
    }

    /// Recompute patch labels, edge bits and aqueduct info from the map.
    ///
    /// `tiles_to_check` is a scratch stack; it is cleared before use and its
    /// capacity is kept between calls.
    pub fn force_update<M: WaterwayOracle + ?Sized>(&mut self, map: &M, tiles_to_check: &mut Vec<TileCoord>) {
        let area = self.tile_area;

        // One aqueduct leaving the region is enough.
        self.has_cross_region_aqueducts = area
            .iter()
            .any(|tile| map.aqueduct_other_end(tile).is_some_and(|end| !area.contains(end)));

        self.tile_patch_labels.fill(INVALID_WATER_REGION_PATCH);

        let mut current_label = FIRST_REGION_LABEL;
        let mut highest_assigned_label = INVALID_WATER_REGION_PATCH;

        for start_tile in area.iter() {
            tiles_to_check.clear();
            tiles_to_check.push(start_tile);

            let mut increase_label = false;
            while let Some(tile) = tiles_to_check.pop() {
                let tracks = map.water_tracks(tile);
                if tracks.is_empty() {
                    continue;
                }

                let index = self.local_index(tile);
                if self.tile_patch_labels[index] != INVALID_WATER_REGION_PATCH {
                    continue;
                }

                self.tile_patch_labels[index] = current_label;
                highest_assigned_label = current_label;
                increase_label = true;

                for trackdir in tracks.trackdirs() {
                    if let Some(next) = map.follow(tile, trackdir) {
                        if area.contains(next) {
                            tiles_to_check.push(next);
                        }
                    }
                }
            }

            if increase_label {
                current_label += 1;
            }
        }

        self.number_of_patches = highest_assigned_label;

        // Always scan edges in the same direction as geometry::edge_tile,
        // neighbours compare these bits index by index.
        self.edge_traversability_bits = [0; 4];
        let region = geometry::region_of::<EDGE>(area.origin);
        for side in DiagDirection::ALL {
            let outward = TrackBits::three_way(side);
            let mut bits: TraversabilityBits = 0;
            for x_or_y in 0..EDGE {
                let tile = geometry::edge_tile::<EDGE>(region, side, x_or_y);
                if map.water_tracks(tile).intersects(outward) {
                    bits |= (1 as TraversabilityBits) << x_or_y;
                }
            }
            self.edge_traversability_bits[side.as_index()] = bits;
        }

        self.initialized = true;
    }

    /// Recompute only if the cached data is stale. Returns whether a recompute happened.
    pub fn update_if_not_initialized<M: WaterwayOracle + ?Sized>(
        &mut self,
        map: &M,
        tiles_to_check: &mut Vec<TileCoord>,
    ) -> bool {
        if self.initialized {
            return false;
        }
        self.force_update(map, tiles_to_check);
        true
    }

    /// ASCII dump of the label grid, one row per local y. Land is `.`,
    /// patches 1-9 print as digits and higher labels as `#`.
    pub fn format_labels(&self) -> String {
        let mut out = String::with_capacity(EDGE * (EDGE + 1));
        for row in self.tile_patch_labels.chunks(EDGE) {
            for &label in row {
                let c = match label {
                    INVALID_WATER_REGION_PATCH => '.',
                    1..=9 => char::from(b'0' + label as u8),
                    _ => '#',
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}
