use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::track::{DiagDirection, TileCoord, TrackBits, Trackdir};
use crate::water_regions::WaterwayOracle;

/// What a single map tile offers to ships.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterTile {
    #[default]
    Land,
    /// Open water, every track available.
    Water,
    /// Water restricted to some tracks (coast, locks, buoys along a canal wall).
    Channel(TrackBits),
    /// One end of an aqueduct. Ships enter and leave along `direction`, which
    /// points at the other end.
    Aqueduct { direction: DiagDirection, other_end: TileCoord },
}

/// Error for map edits that would produce an inconsistent map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEditError {
    OutOfBounds(TileCoord),
    AqueductNotStraight { from: TileCoord, to: TileCoord },
    AqueductHeadOccupied(TileCoord),
    /// Aqueduct heads come in pairs and can only be placed by `build_aqueduct`.
    UnpairedAqueduct(TileCoord),
    NotAnAqueduct(TileCoord),
}

impl fmt::Display for MapEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapEditError::OutOfBounds(tile) => write!(f, "tile ({}, {}) is outside the map", tile.x, tile.y),
            MapEditError::AqueductNotStraight { from, to } => write!(
                f,
                "aqueduct from ({}, {}) to ({}, {}) is not a straight line",
                from.x, from.y, to.x, to.y
            ),
            MapEditError::AqueductHeadOccupied(tile) => {
                write!(f, "tile ({}, {}) already holds an aqueduct head", tile.x, tile.y)
            }
            MapEditError::UnpairedAqueduct(tile) => {
                write!(f, "aqueduct head at ({}, {}) needs a partner, use build_aqueduct", tile.x, tile.y)
            }
            MapEditError::NotAnAqueduct(tile) => write!(f, "tile ({}, {}) is not an aqueduct head", tile.x, tile.y),
        }
    }
}

impl std::error::Error for MapEditError {}

/// Tile storage for ship navigation.
///
/// Implements [`WaterwayOracle`] with the ship movement rules: a ship leaves a
/// tile along one of its tracks and may enter the next tile only on a track
/// that touches the side it came in through. Aqueduct heads are only entered
/// and left along their own axis, and leaving a head towards its partner
/// jumps straight to the other end.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct WaterMap {
    size_x: u32,
    size_y: u32,
    tiles: Vec<WaterTile>,
}

impl WaterMap {
    /// All-land map.
    pub fn new(size_x: u32, size_y: u32) -> Self {
        Self {
            size_x,
            size_y,
            tiles: vec![WaterTile::Land; size_x as usize * size_y as usize],
        }
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x < self.size_x && tile.y < self.size_y
    }

    #[inline]
    fn index(&self, tile: TileCoord) -> usize {
        tile.y as usize * self.size_x as usize + tile.x as usize
    }

    /// Tile contents. Tiles outside the map read as land.
    pub fn tile(&self, tile: TileCoord) -> WaterTile {
        if !self.contains(tile) {
            return WaterTile::Land;
        }
        self.tiles[self.index(tile)]
    }

    /// Replace the contents of `tile`.
    ///
    /// Overwriting an aqueduct head removes the whole aqueduct: the partner
    /// head turns into land and is returned. Both tiles changed, so both
    /// regions need invalidating.
    pub fn set_tile(&mut self, tile: TileCoord, contents: WaterTile) -> Result<Option<TileCoord>, MapEditError> {
        if !self.contains(tile) {
            return Err(MapEditError::OutOfBounds(tile));
        }
        if matches!(contents, WaterTile::Aqueduct { .. }) {
            return Err(MapEditError::UnpairedAqueduct(tile));
        }
        let partner = self.clear_aqueduct_partner(tile);
        self.write(tile, contents);
        Ok(partner)
    }

    /// Flood `tile`, returning the partner head if an aqueduct was removed.
    /// Out-of-map tiles are ignored.
    pub fn set_water(&mut self, tile: TileCoord) -> Option<TileCoord> {
        self.set_tile(tile, WaterTile::Water).ok().flatten()
    }

    /// Dry out `tile`, returning the partner head if an aqueduct was removed.
    /// Out-of-map tiles are ignored.
    pub fn set_land(&mut self, tile: TileCoord) -> Option<TileCoord> {
        self.set_tile(tile, WaterTile::Land).ok().flatten()
    }

    /// Remove the aqueduct with a head on `head`. Both heads become land;
    /// returns the other head.
    pub fn remove_aqueduct(&mut self, head: TileCoord) -> Result<TileCoord, MapEditError> {
        let other_end = self.clear_aqueduct_partner(head).ok_or(MapEditError::NotAnAqueduct(head))?;
        self.write(head, WaterTile::Land);
        Ok(other_end)
    }

    fn clear_aqueduct_partner(&mut self, tile: TileCoord) -> Option<TileCoord> {
        let WaterTile::Aqueduct { other_end, .. } = self.tile(tile) else {
            return None;
        };
        if self.contains(other_end) {
            self.write(other_end, WaterTile::Land);
        }
        Some(other_end)
    }

    #[inline]
    fn write(&mut self, tile: TileCoord, contents: WaterTile) {
        let index = self.index(tile);
        self.tiles[index] = contents;
    }

    /// Build an aqueduct between two tiles on the same row or column.
    ///
    /// Only the two heads are stored; tiles underneath keep their contents.
    pub fn build_aqueduct(&mut self, from: TileCoord, to: TileCoord) -> Result<(), MapEditError> {
        if !self.contains(from) {
            return Err(MapEditError::OutOfBounds(from));
        }
        if !self.contains(to) {
            return Err(MapEditError::OutOfBounds(to));
        }
        let direction = match (from.x.cmp(&to.x), from.y.cmp(&to.y)) {
            (std::cmp::Ordering::Less, std::cmp::Ordering::Equal) => DiagDirection::SouthWest,
            (std::cmp::Ordering::Greater, std::cmp::Ordering::Equal) => DiagDirection::NorthEast,
            (std::cmp::Ordering::Equal, std::cmp::Ordering::Less) => DiagDirection::SouthEast,
            (std::cmp::Ordering::Equal, std::cmp::Ordering::Greater) => DiagDirection::NorthWest,
            _ => return Err(MapEditError::AqueductNotStraight { from, to }),
        };
        for head in [from, to] {
            if matches!(self.tile(head), WaterTile::Aqueduct { .. }) {
                return Err(MapEditError::AqueductHeadOccupied(head));
            }
        }

        self.write(from, WaterTile::Aqueduct { direction, other_end: to });
        self.write(to, WaterTile::Aqueduct { direction: direction.reverse(), other_end: from });
        Ok(())
    }

    /// Number of tiles with at least one water track.
    pub fn water_tile_count(&self) -> usize {
        self.tiles.iter().filter(|tile| !tile_tracks(**tile).is_empty()).count()
    }
}

fn tile_tracks(tile: WaterTile) -> TrackBits {
    match tile {
        WaterTile::Land => TrackBits::NONE,
        WaterTile::Water => TrackBits::ALL,
        WaterTile::Channel(tracks) => tracks,
        WaterTile::Aqueduct { direction, .. } => direction.axis_track().bit(),
    }
}

impl WaterwayOracle for WaterMap {
    fn size_x(&self) -> u32 {
        self.size_x
    }

    fn size_y(&self) -> u32 {
        self.size_y
    }

    fn water_tracks(&self, tile: TileCoord) -> TrackBits {
        tile_tracks(self.tile(tile))
    }

    fn follow(&self, tile: TileCoord, trackdir: Trackdir) -> Option<TileCoord> {
        let current = self.tile(tile);
        if !tile_tracks(current).contains(trackdir.track) || !trackdir.track.touches(trackdir.exit) {
            return None;
        }

        if let WaterTile::Aqueduct { direction, other_end } = current {
            if trackdir.exit == direction {
                return Some(other_end);
            }
        }

        let next = tile.step(trackdir.exit, self.size_x, self.size_y)?;
        let destination = self.tile(next);
        if let WaterTile::Aqueduct { direction, .. } = destination {
            // Ramps can only be entered head-on.
            if direction != trackdir.exit {
                return None;
            }
        }

        tile_tracks(destination)
            .intersects(TrackBits::reachable_moving(trackdir.exit))
            .then_some(next)
    }

    fn aqueduct_other_end(&self, tile: TileCoord) -> Option<TileCoord> {
        match self.tile(tile) {
            WaterTile::Aqueduct { other_end, .. } => Some(other_end),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    #[test]
    fn test_follow_open_water() {
        let mut map = WaterMap::new(4, 4);
        map.set_water(TileCoord::new(1, 1));
        map.set_water(TileCoord::new(2, 1));

        let east = Trackdir { track: Track::X, exit: DiagDirection::SouthWest };
        assert_eq!(map.follow(TileCoord::new(1, 1), east), Some(TileCoord::new(2, 1)));

        // Into land.
        let south = Trackdir { track: Track::Y, exit: DiagDirection::SouthEast };
        assert_eq!(map.follow(TileCoord::new(1, 1), south), None);

        // Off the map.
        let mut edge = WaterMap::new(2, 2);
        edge.set_water(TileCoord::new(0, 0));
        let ne = Trackdir { track: Track::X, exit: DiagDirection::NorthEast };
        assert_eq!(edge.follow(TileCoord::new(0, 0), ne), None);
    }

    #[test]
    fn test_channel_entry_needs_touching_track() {
        let mut map = WaterMap::new(4, 4);
        map.set_water(TileCoord::new(1, 1));
        // Only runs along y, can't be entered from its NE side.
        map.set_tile(TileCoord::new(2, 1), WaterTile::Channel(Track::Y.bit())).unwrap();

        let east = Trackdir { track: Track::X, exit: DiagDirection::SouthWest };
        assert_eq!(map.follow(TileCoord::new(1, 1), east), None);

        map.set_tile(TileCoord::new(2, 1), WaterTile::Channel(Track::Upper.bit())).unwrap();
        assert_eq!(map.follow(TileCoord::new(1, 1), east), Some(TileCoord::new(2, 1)));
    }

    #[test]
    fn test_aqueduct_jumps_to_other_end() {
        let mut map = WaterMap::new(8, 8);
        map.build_aqueduct(TileCoord::new(1, 2), TileCoord::new(5, 2)).unwrap();

        let across = Trackdir { track: Track::X, exit: DiagDirection::SouthWest };
        assert_eq!(map.follow(TileCoord::new(1, 2), across), Some(TileCoord::new(5, 2)));
        let back = Trackdir { track: Track::X, exit: DiagDirection::NorthEast };
        assert_eq!(map.follow(TileCoord::new(5, 2), back), Some(TileCoord::new(1, 2)));
        assert_eq!(map.aqueduct_other_end(TileCoord::new(1, 2)), Some(TileCoord::new(5, 2)));
        assert_eq!(map.water_tracks(TileCoord::new(1, 2)), Track::X.bit());
    }

    #[test]
    fn test_aqueduct_ramp_entered_head_on_only() {
        let mut map = WaterMap::new(8, 8);
        map.build_aqueduct(TileCoord::new(2, 2), TileCoord::new(5, 2)).unwrap();
        map.set_water(TileCoord::new(1, 2));
        map.set_water(TileCoord::new(3, 2));

        let onto_ramp = Trackdir { track: Track::X, exit: DiagDirection::SouthWest };
        assert_eq!(map.follow(TileCoord::new(1, 2), onto_ramp), Some(TileCoord::new(2, 2)));

        // From underneath the bridge, towards the back of the ramp.
        let from_under = Trackdir { track: Track::X, exit: DiagDirection::NorthEast };
        assert_eq!(map.follow(TileCoord::new(3, 2), from_under), None);
    }

    #[test]
    fn test_aqueduct_must_be_straight() {
        let mut map = WaterMap::new(8, 8);
        let err = map.build_aqueduct(TileCoord::new(1, 1), TileCoord::new(3, 3)).unwrap_err();
        assert!(matches!(err, MapEditError::AqueductNotStraight { .. }));
        assert!(map.build_aqueduct(TileCoord::new(1, 1), TileCoord::new(9, 1)).is_err());

        map.build_aqueduct(TileCoord::new(1, 1), TileCoord::new(4, 1)).unwrap();
        assert_eq!(
            map.build_aqueduct(TileCoord::new(4, 1), TileCoord::new(4, 6)),
            Err(MapEditError::AqueductHeadOccupied(TileCoord::new(4, 1)))
        );
    }

    #[test]
    fn test_overwriting_aqueduct_head_removes_partner() {
        let mut map = WaterMap::new(12, 4);
        map.build_aqueduct(TileCoord::new(1, 1), TileCoord::new(9, 1)).unwrap();

        assert_eq!(map.set_land(TileCoord::new(9, 1)), Some(TileCoord::new(1, 1)));
        assert_eq!(map.tile(TileCoord::new(1, 1)), WaterTile::Land);
        assert_eq!(map.aqueduct_other_end(TileCoord::new(1, 1)), None);

        map.build_aqueduct(TileCoord::new(1, 2), TileCoord::new(1, 3)).unwrap();
        assert_eq!(map.set_water(TileCoord::new(1, 2)), Some(TileCoord::new(1, 3)));
        assert_eq!(map.tile(TileCoord::new(1, 2)), WaterTile::Water);
        assert_eq!(map.tile(TileCoord::new(1, 3)), WaterTile::Land);
        assert_eq!(map.set_water(TileCoord::new(1, 2)), None);
    }

    #[test]
    fn test_aqueduct_heads_only_placed_in_pairs() {
        let mut map = WaterMap::new(8, 8);
        let head = WaterTile::Aqueduct { direction: DiagDirection::SouthWest, other_end: TileCoord::new(5, 1) };
        assert_eq!(
            map.set_tile(TileCoord::new(1, 1), head),
            Err(MapEditError::UnpairedAqueduct(TileCoord::new(1, 1)))
        );

        map.build_aqueduct(TileCoord::new(1, 1), TileCoord::new(5, 1)).unwrap();
        assert_eq!(map.remove_aqueduct(TileCoord::new(5, 1)), Ok(TileCoord::new(1, 1)));
        assert_eq!(map.water_tile_count(), 0);
        assert_eq!(
            map.remove_aqueduct(TileCoord::new(5, 1)),
            Err(MapEditError::NotAnAqueduct(TileCoord::new(5, 1)))
        );
    }
}
