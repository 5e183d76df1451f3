use crate::track::{TileCoord, TrackBits, Trackdir};

/// Everything the water region code needs to know about the map.
///
/// Region connectivity is computed with the same step rules the ship
/// pathfinder uses, so implementors should answer `follow` exactly like the
/// ship movement code does.
pub trait WaterwayOracle {
    /// Map width in tiles.
    fn size_x(&self) -> u32;

    /// Map height in tiles.
    fn size_y(&self) -> u32;

    /// Water tracks on `tile`. An empty set means ships can't use the tile at all.
    fn water_tracks(&self, tile: TileCoord) -> TrackBits;

    /// Destination of a single ship step from `tile` along `trackdir`, or
    /// `None` when that step is illegal.
    fn follow(&self, tile: TileCoord, trackdir: Trackdir) -> Option<TileCoord>;

    /// Far end of the aqueduct starting at `tile`, if `tile` is an aqueduct head.
    fn aqueduct_other_end(&self, tile: TileCoord) -> Option<TileCoord>;
}
