use smallvec::SmallVec;
use crate::track::{DiagDirection, TileCoord};
use super::geometry;
use super::grid::WaterRegions;
use super::oracle::WaterwayOracle;
use super::region::WaterRegion;
use super::types::{
    PatchLabel, TraversabilityBits, WaterRegionDesc, WaterRegionPatchDesc, FIRST_REGION_LABEL,
    INVALID_WATER_REGION_PATCH,
};

impl<const EDGE: usize> WaterRegions<EDGE> {
    /// Region next to `region` on `side`, or `None` at the map border.
    pub fn neighbor_region(&self, region: WaterRegionDesc, side: DiagDirection) -> Option<WaterRegionDesc> {
        let (dx, dy) = side.offset();
        let x = region.x.checked_add_signed(dx)?;
        let y = region.y.checked_add_signed(dy)?;
        (x < self.regions_x() && y < self.regions_y()).then_some(WaterRegionDesc::new(x, y))
    }

    /// Call `visit` for every patch a ship can reach directly from `patch`:
    /// first the patches across each side (NE, SE, SW, NW), then the far ends
    /// of aqueducts leaving the region from this patch.
    ///
    /// The same neighbour is reported at most once per side, but may show up
    /// again through another side or an aqueduct.
    pub fn visit_patch_neighbors<M, F>(&mut self, map: &M, patch: WaterRegionPatchDesc, mut visit: F)
    where
        M: WaterwayOracle + ?Sized,
        F: FnMut(WaterRegionPatchDesc),
    {
        for side in DiagDirection::ALL {
            self.visit_adjacent_patch_neighbors(map, patch, side, &mut visit);
        }

        let current_index = self.update_region(map, patch.region());
        let current = self.region_at(current_index);
        if !current.has_cross_region_aqueducts() {
            return;
        }

        let exits: SmallVec<[TileCoord; 4]> = current
            .tiles()
            .filter(|&tile| current.label(tile) == patch.label)
            .filter_map(|tile| map.aqueduct_other_end(tile))
            .filter(|&end| !current.tile_area().contains(end))
            .collect();

        for other_end in exits {
            // A far end without water tracks belongs to no patch.
            let far_patch = self.patch_info(map, other_end);
            if far_patch.label != INVALID_WATER_REGION_PATCH {
                visit(far_patch);
            }
        }
    }

    /// Collecting variant of [`WaterRegions::visit_patch_neighbors`].
    pub fn patch_neighbors<M: WaterwayOracle + ?Sized>(
        &mut self,
        map: &M,
        patch: WaterRegionPatchDesc,
    ) -> Vec<WaterRegionPatchDesc> {
        let mut neighbors = Vec::new();
        self.visit_patch_neighbors(map, patch, |neighbor| neighbors.push(neighbor));
        neighbors
    }

    fn visit_adjacent_patch_neighbors<M, F>(
        &mut self,
        map: &M,
        patch: WaterRegionPatchDesc,
        side: DiagDirection,
        visit: &mut F,
    ) where
        M: WaterwayOracle + ?Sized,
        F: FnMut(WaterRegionPatchDesc),
    {
        let Some(neighbor) = self.neighbor_region(patch.region(), side) else {
            return;
        };

        let current_index = self.update_region(map, patch.region());
        let neighbor_index = self.update_region(map, neighbor);
        let current = self.region_at(current_index);
        let neighboring = self.region_at(neighbor_index);

        // Edge tiles both regions agree ships can cross.
        let traversability_bits = current.edge_traversability_bits(side)
            & neighboring.edge_traversability_bits(side.reverse());
        if traversability_bits == 0 {
            return;
        }

        if current.number_of_patches() == 1 && neighboring.number_of_patches() == 1 {
            // Both regions are a single connected patch, no need to check edge tiles.
            visit(neighbor.patch(FIRST_REGION_LABEL));
            return;
        }

        for label in shared_edge_labels(current, neighboring, patch, neighbor, side, traversability_bits) {
            visit(neighbor.patch(label));
        }
    }
}

/// Distinct labels in `neighboring` that touch `patch` through the set bits of
/// `traversability_bits` on `side`, in edge order.
pub(super) fn shared_edge_labels<const EDGE: usize>(
    current: &WaterRegion<EDGE>,
    neighboring: &WaterRegion<EDGE>,
    patch: WaterRegionPatchDesc,
    neighbor: WaterRegionDesc,
    side: DiagDirection,
    traversability_bits: TraversabilityBits,
) -> SmallVec<[PatchLabel; 8]> {
    let opposite_side = side.reverse();
    let mut unique_labels: SmallVec<[PatchLabel; 8]> = SmallVec::new();

    for x_or_y in (0..EDGE).filter(|&i| (traversability_bits >> i) & 1 != 0) {
        let current_edge_tile = geometry::edge_tile::<EDGE>(patch.region(), side, x_or_y);
        if current.label(current_edge_tile) != patch.label {
            continue;
        }

        let neighbor_edge_tile = geometry::edge_tile::<EDGE>(neighbor, opposite_side, x_or_y);
        let neighbor_label = neighboring.label(neighbor_edge_tile);
        if !unique_labels.contains(&neighbor_label) {
            unique_labels.push(neighbor_label);
        }
    }

    unique_labels
}
