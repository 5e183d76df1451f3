//! Coordinate math between global tiles, regions and region-local positions.
//!
//! Local coordinates put (0, 0) in the N corner of a region; local x grows
//! towards SW and local y towards SE. Edge tile `i` of a side always counts
//! along the same axis direction, so edge index `i` on one region's side is
//! the tile row/column that faces edge index `i` on the neighbour's opposite
//! side.

use crate::track::{DiagDirection, TileCoord};
use super::types::WaterRegionDesc;

/// Region containing `tile`.
#[inline]
pub fn region_of<const EDGE: usize>(tile: TileCoord) -> WaterRegionDesc {
    WaterRegionDesc::new(tile.x / EDGE as u32, tile.y / EDGE as u32)
}

/// Row-major index of a region in a grid `regions_x` regions wide.
#[inline]
pub fn region_index(region: WaterRegionDesc, regions_x: u32) -> usize {
    region.x as usize + region.y as usize * regions_x as usize
}

/// Inverse of [`region_index`].
#[inline]
pub fn region_from_index(index: usize, regions_x: u32) -> WaterRegionDesc {
    let regions_x = regions_x as usize;
    WaterRegionDesc::new((index % regions_x) as u32, (index / regions_x) as u32)
}

/// Global tile at local position (`local_x`, `local_y`) of `region`.
///
/// # Panics
/// If either local coordinate is outside `0..EDGE`.
pub fn tile_from_local<const EDGE: usize>(region: WaterRegionDesc, local_x: usize, local_y: usize) -> TileCoord {
    assert!(local_x < EDGE && local_y < EDGE, "local coordinate ({local_x}, {local_y}) outside region edge {EDGE}");
    TileCoord::new(
        region.x * EDGE as u32 + local_x as u32,
        region.y * EDGE as u32 + local_y as u32,
    )
}

/// Tile at position `x_or_y` along `side` of `region`.
///
/// This is the same mapping [`super::WaterRegion`] uses when it fills its
/// edge traversability bits.
pub fn edge_tile<const EDGE: usize>(region: WaterRegionDesc, side: DiagDirection, x_or_y: usize) -> TileCoord {
    match side {
        DiagDirection::NorthEast => tile_from_local::<EDGE>(region, 0, x_or_y),
        DiagDirection::SouthWest => tile_from_local::<EDGE>(region, EDGE - 1, x_or_y),
        DiagDirection::NorthWest => tile_from_local::<EDGE>(region, x_or_y, 0),
        DiagDirection::SouthEast => tile_from_local::<EDGE>(region, x_or_y, EDGE - 1),
    }
}

/// Representative tile of a region, used for distance heuristics.
pub fn center_tile<const EDGE: usize>(region: WaterRegionDesc) -> TileCoord {
    tile_from_local::<EDGE>(region, EDGE / 2, EDGE / 2)
}

/// Axis-aligned rectangle of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileArea {
    pub origin: TileCoord,
    pub width: u32,
    pub height: u32,
}

impl TileArea {
    pub fn new(origin: TileCoord, width: u32, height: u32) -> Self {
        Self { origin, width, height }
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= self.origin.x
            && tile.y >= self.origin.y
            && tile.x - self.origin.x < self.width
            && tile.y - self.origin.y < self.height
    }

    /// All tiles, x varying fastest.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.height).flat_map(move |dy| {
            (0..self.width).map(move |dx| TileCoord::new(self.origin.x + dx, self.origin.y + dy))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_index_round_trip() {
        let regions_x = 5;
        for index in 0..20 {
            let region = region_from_index(index, regions_x);
            assert_eq!(region_index(region, regions_x), index);
        }
        assert_eq!(region_index(WaterRegionDesc::new(2, 3), 5), 17);
    }

    #[test]
    fn test_region_of() {
        assert_eq!(region_of::<16>(TileCoord::new(15, 16)), WaterRegionDesc::new(0, 1));
        assert_eq!(region_of::<4>(TileCoord::new(9, 3)), WaterRegionDesc::new(2, 0));
    }

    #[test]
    fn test_edge_tiles_face_each_other() {
        // Region (0,0) SW side must line up with region (1,0) NE side.
        let a = WaterRegionDesc::new(0, 0);
        let b = WaterRegionDesc::new(1, 0);
        for i in 0..4 {
            let from = edge_tile::<4>(a, DiagDirection::SouthWest, i);
            let to = edge_tile::<4>(b, DiagDirection::NorthEast, i);
            assert_eq!(from.step(DiagDirection::SouthWest, 8, 8), Some(to));
        }

        // Region (0,0) SE side must line up with region (0,1) NW side.
        let c = WaterRegionDesc::new(0, 1);
        for i in 0..4 {
            let from = edge_tile::<4>(a, DiagDirection::SouthEast, i);
            let to = edge_tile::<4>(c, DiagDirection::NorthWest, i);
            assert_eq!(from.step(DiagDirection::SouthEast, 8, 8), Some(to));
        }
    }

    #[test]
    fn test_center_tile() {
        assert_eq!(center_tile::<16>(WaterRegionDesc::new(1, 2)), TileCoord::new(24, 40));
    }

    #[test]
    #[should_panic]
    fn test_local_coordinate_out_of_range_panics() {
        tile_from_local::<4>(WaterRegionDesc::new(0, 0), 4, 0);
    }

    #[test]
    fn test_tile_area_iteration_order() {
        let area = TileArea::new(TileCoord::new(4, 8), 2, 2);
        let tiles: Vec<TileCoord> = area.iter().collect();
        assert_eq!(
            tiles,
            vec![TileCoord::new(4, 8), TileCoord::new(5, 8), TileCoord::new(4, 9), TileCoord::new(5, 9)]
        );
        assert!(area.contains(TileCoord::new(5, 9)));
        assert!(!area.contains(TileCoord::new(6, 9)));
        assert!(!area.contains(TileCoord::new(3, 8)));
    }
}
