//! Ground-plane geometry and the zone grid layout.

use serde::{Deserialize, Serialize};

/// A point on the ground plane. The vertical axis belongs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Position along the row axis.
    pub x: f64,
    /// Position along the column axis.
    pub z: f64,
}

impl Vec2 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Vector from `self` to `other`.
    #[must_use]
    #[inline]
    pub fn to(self, other: Self) -> Self {
        Self::new(other.x - self.x, other.z - self.z)
    }

    /// Squared length.
    #[must_use]
    #[inline]
    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.z * self.z
    }

    /// Squared distance to another point.
    #[must_use]
    #[inline]
    pub fn distance_sq(self, other: Self) -> f64 {
        self.to(other).length_sq()
    }

    /// Scale by a factor.
    #[must_use]
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.z * factor)
    }

    /// Component-wise sum.
    #[must_use]
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.z + other.z)
    }

    /// Whether both components are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len_sq = self.length_sq();
        if len_sq > 0.0 {
            Some(self.scale(1.0 / len_sq.sqrt()))
        } else {
            None
        }
    }
}

/// Grid coordinate of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneCoord {
    /// Row, along the x axis.
    pub row: u16,
    /// Column, along the z axis.
    pub col: u16,
}

impl ZoneCoord {
    /// Create a new zone coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// Axis-aligned world extents on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Extents {
    /// Clamp a point into the extents.
    #[must_use]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Whether a point lies inside the extents (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }
}

/// Zone grid layout, immutable after world construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of zone rows (x axis).
    pub rows: u16,
    /// Number of zone columns (z axis).
    pub cols: u16,
    /// Width of one zone along x.
    pub zone_width: f64,
    /// Depth of one zone along z.
    pub zone_depth: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            zone_width: 128.0,
            zone_depth: 128.0,
        }
    }
}

impl GridConfig {
    /// Total number of zones.
    #[must_use]
    pub fn zone_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    /// World extents covered by the grid.
    #[must_use]
    pub fn extents(&self) -> Extents {
        Extents {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(
                f64::from(self.rows) * self.zone_width,
                f64::from(self.cols) * self.zone_depth,
            ),
        }
    }

    /// Whether a coordinate lies on the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: ZoneCoord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Row-major index of a coordinate.
    #[must_use]
    pub fn index_of(&self, coord: ZoneCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.row) * usize::from(self.cols) + usize::from(coord.col))
        } else {
            None
        }
    }

    /// Coordinate for a row-major index.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> ZoneCoord {
        let cols = usize::from(self.cols.max(1));
        #[allow(clippy::cast_possible_truncation)]
        let (row, col) = ((index / cols) as u16, (index % cols) as u16);
        ZoneCoord::new(row, col)
    }

    /// Zone containing a ground position: `row = floor(x / width)`,
    /// `col = floor(z / depth)`.
    ///
    /// Points on the far world edge belong to the last row/column.
    /// Returns `None` for positions outside the grid.
    #[must_use]
    pub fn zone_at(&self, p: Vec2) -> Option<ZoneCoord> {
        if !self.extents().contains(p) {
            return None;
        }
        let row = Self::cell(p.x, self.zone_width, self.rows)?;
        let col = Self::cell(p.z, self.zone_depth, self.cols)?;
        Some(ZoneCoord::new(row, col))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell(v: f64, size: f64, count: u16) -> Option<u16> {
        if count == 0 || size <= 0.0 {
            return None;
        }
        let cell = (v / size).floor();
        if cell < 0.0 {
            return None;
        }
        Some((cell as u64).min(u64::from(count - 1)) as u16)
    }

    /// Centre of a zone.
    #[must_use]
    pub fn center_of(&self, coord: ZoneCoord) -> Vec2 {
        Vec2::new(
            (f64::from(coord.row) + 0.5) * self.zone_width,
            (f64::from(coord.col) + 0.5) * self.zone_depth,
        )
    }

    /// Footprint of a zone as extents.
    #[must_use]
    pub fn footprint_of(&self, coord: ZoneCoord) -> Extents {
        let min = Vec2::new(
            f64::from(coord.row) * self.zone_width,
            f64::from(coord.col) * self.zone_depth,
        );
        Extents {
            min,
            max: Vec2::new(min.x + self.zone_width, min.z + self.zone_depth),
        }
    }

    /// Iterate over every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = ZoneCoord> + use<> {
        let (rows, cols) = (self.rows, self.cols);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| ZoneCoord::new(row, col)))
    }
}
