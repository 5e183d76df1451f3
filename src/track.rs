//! Tile coordinates and the directional vocabulary ships move with.
//!
//! A tile is a diamond with four sides (NE, SE, SW, NW). Water tiles carry up
//! to six tracks, each one connecting two of those sides. A ship travelling
//! along a track leaves the tile through one side, which is what a
//! [`Trackdir`] encodes.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Global tile coordinate. `x` grows towards SW, `y` grows towards SE.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord, Default)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The adjacent tile on `side`, or `None` when that would leave the
    /// `size_x` × `size_y` map.
    pub fn step(self, side: DiagDirection, size_x: u32, size_y: u32) -> Option<TileCoord> {
        let (dx, dy) = side.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < size_x && y < size_y).then_some(TileCoord { x, y })
    }
}

/// The four sides of a tile (and of a water region).
///
/// The declaration order is the enumeration order used everywhere a side
/// loop appears.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagDirection {
    NorthEast = 0,
    SouthEast = 1,
    SouthWest = 2,
    NorthWest = 3,
}

impl DiagDirection {
    pub const ALL: [DiagDirection; 4] = [
        DiagDirection::NorthEast,
        DiagDirection::SouthEast,
        DiagDirection::SouthWest,
        DiagDirection::NorthWest,
    ];

    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// Coordinate delta of one step towards this side.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            DiagDirection::NorthEast => (-1, 0),
            DiagDirection::SouthEast => (0, 1),
            DiagDirection::SouthWest => (1, 0),
            DiagDirection::NorthWest => (0, -1),
        }
    }

    #[inline]
    pub fn reverse(self) -> DiagDirection {
        match self {
            DiagDirection::NorthEast => DiagDirection::SouthWest,
            DiagDirection::SouthEast => DiagDirection::NorthWest,
            DiagDirection::SouthWest => DiagDirection::NorthEast,
            DiagDirection::NorthWest => DiagDirection::SouthEast,
        }
    }

    /// Straight track running along this direction's axis.
    #[inline]
    pub fn axis_track(self) -> Track {
        match self {
            DiagDirection::NorthEast | DiagDirection::SouthWest => Track::X,
            DiagDirection::SouthEast | DiagDirection::NorthWest => Track::Y,
        }
    }
}

/// A single water track inside a tile.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    /// NE to SW, along the x axis.
    X = 0,
    /// SE to NW, along the y axis.
    Y = 1,
    /// North corner, NE to NW.
    Upper = 2,
    /// South corner, SE to SW.
    Lower = 3,
    /// West corner, SW to NW.
    Left = 4,
    /// East corner, NE to SE.
    Right = 5,
}

impl Track {
    pub const ALL: [Track; 6] = [Track::X, Track::Y, Track::Upper, Track::Lower, Track::Left, Track::Right];

    /// The two sides this track connects.
    pub fn sides(self) -> (DiagDirection, DiagDirection) {
        use DiagDirection::*;
        match self {
            Track::X => (NorthEast, SouthWest),
            Track::Y => (SouthEast, NorthWest),
            Track::Upper => (NorthEast, NorthWest),
            Track::Lower => (SouthEast, SouthWest),
            Track::Left => (SouthWest, NorthWest),
            Track::Right => (NorthEast, SouthEast),
        }
    }

    pub fn touches(self, side: DiagDirection) -> bool {
        let (a, b) = self.sides();
        a == side || b == side
    }

    #[inline]
    pub fn bit(self) -> TrackBits {
        TrackBits(1 << self as u8)
    }
}

/// Set of tracks present on a tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TrackBits(u8);

impl TrackBits {
    pub const NONE: TrackBits = TrackBits(0);
    pub const ALL: TrackBits = TrackBits(0b11_1111);

    pub const fn from_bits(bits: u8) -> Self {
        TrackBits(bits & 0b11_1111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, track: Track) -> bool {
        self.0 & track.bit().0 != 0
    }

    pub fn intersects(self, other: TrackBits) -> bool {
        self.0 & other.0 != 0
    }

    /// The three tracks that touch `side`: the set a ship can use to cross
    /// that side of the tile.
    pub fn three_way(side: DiagDirection) -> TrackBits {
        Track::ALL
            .into_iter()
            .filter(|track| track.touches(side))
            .fold(TrackBits::NONE, |acc, track| acc | track.bit())
    }

    /// Tracks a ship moving towards `direction` can continue on after
    /// entering a tile.
    pub fn reachable_moving(direction: DiagDirection) -> TrackBits {
        TrackBits::three_way(direction.reverse())
    }

    pub fn tracks(self) -> impl Iterator<Item = Track> {
        Track::ALL.into_iter().filter(move |track| self.contains(*track))
    }

    /// Both travel directions of every track in the set.
    pub fn trackdirs(self) -> impl Iterator<Item = Trackdir> {
        self.tracks().flat_map(|track| {
            let (a, b) = track.sides();
            [Trackdir { track, exit: a }, Trackdir { track, exit: b }]
        })
    }
}

impl BitOr for TrackBits {
    type Output = TrackBits;

    fn bitor(self, rhs: TrackBits) -> TrackBits {
        TrackBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for TrackBits {
    fn bitor_assign(&mut self, rhs: TrackBits) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TrackBits {
    type Output = TrackBits;

    fn bitand(self, rhs: TrackBits) -> TrackBits {
        TrackBits(self.0 & rhs.0)
    }
}

impl From<Track> for TrackBits {
    fn from(track: Track) -> Self {
        track.bit()
    }
}

/// A track together with the side a ship leaves the tile through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trackdir {
    pub track: Track,
    pub exit: DiagDirection,
}
