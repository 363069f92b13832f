//! Hex coordinate math for the odd-r offset grid.
//!
//! Cells are addressed by offset coordinates `(q, r)` where odd rows are
//! shifted half a cell to the right. All functions here are pure.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default hex radius in pixels.
pub const HEX_SIZE: f64 = 30.0;
/// Default grid width in cells.
pub const MAP_WIDTH: i32 = 50;
/// Default grid height in cells.
pub const MAP_HEIGHT: i32 = 40;

/// Offset coordinate of a single hex cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Errors from parsing a `"q,r"` hex id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexIdError {
    #[error("Hex id is missing a comma: {0}")]
    MissingSeparator(String),
    #[error("Invalid hex id component: {0}")]
    InvalidComponent(String),
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Whether this cell sits on a shifted (odd) row.
    pub fn is_odd_row(self) -> bool {
        self.r.rem_euclid(2) == 1
    }

    /// Pixel position of the cell center for a hex of the given radius.
    pub fn to_pixel(self, size: f64) -> Point {
        let shift = if self.is_odd_row() { 0.5 } else { 0.0 };
        Point::new(
            size * 3f64.sqrt() * (self.q as f64 + shift),
            size * 1.5 * self.r as f64,
        )
    }

    /// Distance between two cell centers in pixels.
    pub fn pixel_distance(self, other: HexCoord, size: f64) -> f64 {
        self.to_pixel(size).distance(other.to_pixel(size))
    }

    /// The string identity key, `"q,r"`.
    pub fn hex_id(self) -> String {
        self.to_string()
    }

    /// Step one cell in a screen direction.
    ///
    /// `dx` and `dy` are clamped to `-1..=1`. Diagonals follow the odd-r
    /// zig-zag: even rows lean left, odd rows lean right. A pure vertical
    /// step keeps `q` on both parities.
    pub fn displace(self, dx: i32, dy: i32) -> HexCoord {
        let dx = dx.signum();
        let dy = dy.signum();
        if dy == 0 {
            return HexCoord::new(self.q + dx, self.r);
        }
        let even = !self.is_odd_row();
        let q = match dx {
            -1 if even => self.q - 1,
            1 if !even => self.q + 1,
            _ => self.q,
        };
        HexCoord::new(q, self.r + dy)
    }

    /// The six adjacent cells, clockwise from east.
    pub fn neighbors(self) -> [HexCoord; 6] {
        [
            self.displace(1, 0),
            self.displace(1, 1),
            self.displace(-1, 1),
            self.displace(-1, 0),
            self.displace(-1, -1),
            self.displace(1, -1),
        ]
    }

    /// Exact adjacency test.
    pub fn is_neighbor(self, other: HexCoord) -> bool {
        self.neighbors().contains(&other)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = HexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| HexIdError::MissingSeparator(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| HexIdError::InvalidComponent(s.to_string()))
        };
        Ok(HexCoord::new(parse(q)?, parse(r)?))
    }
}

/// Parse a `"q,r"` hex id.
pub fn parse_hex_id(id: &str) -> Result<HexCoord, HexIdError> {
    id.parse()
}

/// Finite grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: i32,
    pub height: i32,
}

impl Default for GridDims {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
        }
    }
}

impl GridDims {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        (0..self.width).contains(&coord.q) && (0..self.height).contains(&coord.r)
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height).flat_map(move |r| (0..self.width).map(move |q| HexCoord::new(q, r)))
    }
}

/// Inclusive coordinate box between two corners (not a hex radius).
pub fn rect_between(a: HexCoord, b: HexCoord) -> impl Iterator<Item = HexCoord> {
    let (q_min, q_max) = (a.q.min(b.q), a.q.max(b.q));
    let (r_min, r_max) = (a.r.min(b.r), a.r.max(b.r));
    (q_min..=q_max).flat_map(move |q| (r_min..=r_max).map(move |r| HexCoord::new(q, r)))
}
