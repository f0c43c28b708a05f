//! Tile addressing for lattice patterns.
//!
//! A lattice of resolution `N` has `N³` cells. Each cell is drawn as a solid
//! `M x M` tile, and the tiles are laid out in a 2-D grid whose orientation is
//! given by [`Layout`]:
//!
//! ```text
//! wide: N² tiles wide x N tiles tall    x = r + g*N, y = b
//! tall: N tiles wide x N² tiles tall    x = r,       y = g + b*N
//! ```
//!
//! Tile index `t` enumerates cells with R fastest and B slowest:
//! `r = t mod N`, `g = (t / N) mod N`, `b = t / N²`.
//!
//! Everything here is pure integer arithmetic. The same functions drive the
//! pattern generator and the sampler, so both always agree on where a cell lives.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest lattice size that has distinct endpoints.
pub const MIN_LATTICE_SIZE: u32 = 2;

/// Largest lattice size accepted by geometry detection.
pub const MAX_LATTICE_SIZE: u32 = 256;

/// Practical upper bound for generated patterns. Larger sizes work but
/// produce very large images.
pub const RECOMMENDED_MAX_LATTICE_SIZE: u32 = 65;

/// Orientation of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `N²` tiles wide, `N` tiles tall.
    #[default]
    Wide,
    /// `N` tiles wide, `N²` tiles tall.
    Tall,
}

impl Layout {
    /// Lowercase name, as used in file titles and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Wide => "wide",
            Layout::Tall => "tall",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wide" => Ok(Layout::Wide),
            "tall" => Ok(Layout::Tall),
            other => Err(Error::InvalidGeometry(format!(
                "unknown layout '{other}', expected 'wide' or 'tall'"
            ))),
        }
    }
}

/// A cell of the `N x N x N` lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeCoord {
    /// Red index in `[0, N)`.
    pub r: u32,
    /// Green index in `[0, N)`.
    pub g: u32,
    /// Blue index in `[0, N)`.
    pub b: u32,
}

impl LatticeCoord {
    /// Creates a lattice coordinate.
    pub const fn new(r: u32, g: u32, b: u32) -> Self {
        Self { r, g, b }
    }

    /// Byte color of this cell for lattice size `n`.
    pub fn color(&self, n: u32) -> [u8; 3] {
        [quantize(self.r, n), quantize(self.g, n), quantize(self.b, n)]
    }
}

/// Tile position in the grid, in tiles (not pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// Grid and pixel dimensions of a pattern.
///
/// Pixel dimensions are `u64` so that oversized requests can be reported
/// instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    /// Tiles per row.
    pub tiles_w: u32,
    /// Tiles per column.
    pub tiles_h: u32,
    /// Image width in pixels.
    pub width: u64,
    /// Image height in pixels.
    pub height: u64,
}

/// Decomposes tile index `t` into its lattice coordinate.
///
/// Only meaningful for `t < N³`.
#[inline]
pub fn tile_index_to_rgb(t: u32, n: u32) -> LatticeCoord {
    LatticeCoord {
        r: t % n,
        g: (t / n) % n,
        b: t / (n * n),
    }
}

/// Tile position of tile index `t`.
#[inline]
pub fn tile_coords(t: u32, n: u32, layout: Layout) -> TilePos {
    lattice_to_tile(tile_index_to_rgb(t, n), n, layout)
}

/// Tile position of a lattice coordinate.
#[inline]
pub fn lattice_to_tile(c: LatticeCoord, n: u32, layout: Layout) -> TilePos {
    match layout {
        Layout::Wide => TilePos { x: c.r + c.g * n, y: c.b },
        Layout::Tall => TilePos { x: c.r, y: c.g + c.b * n },
    }
}

/// Grid and pixel dimensions for lattice size `n`, tile size `m`.
pub fn compute_dims(n: u32, m: u32, layout: Layout) -> Dims {
    let (tiles_w, tiles_h) = match layout {
        Layout::Wide => (n * n, n),
        Layout::Tall => (n, n * n),
    };
    Dims {
        tiles_w,
        tiles_h,
        width: tiles_w as u64 * m as u64,
        height: tiles_h as u64 * m as u64,
    }
}

/// Byte value of lattice index `i`: `round(i * 255 / (n - 1))`, or 0 when `n <= 1`.
///
/// Computed in integers with ties rounded up, so `quantize(0, n) == 0`,
/// `quantize(n - 1, n) == 255` and the result never decreases with `i`.
#[inline]
pub fn quantize(i: u32, n: u32) -> u8 {
    if n <= 1 {
        return 0;
    }
    let den = (n - 1) as u64;
    let v = (2 * i as u64 * 255 + den) / (2 * den);
    v.min(255) as u8
}

/// A validated `(N, M, layout)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    /// Lattice resolution `N`.
    pub lattice_size: u32,
    /// Tile edge length `M` in pixels.
    pub tile_size: u32,
    /// Grid orientation.
    pub layout: Layout,
}

impl Geometry {
    /// Validates and creates a geometry.
    ///
    /// Requires `2 <= N <= 256`, `M >= 1`, and pixel dimensions that fit in `u32`.
    pub fn new(lattice_size: u32, tile_size: u32, layout: Layout) -> Result<Self> {
        if !(MIN_LATTICE_SIZE..=MAX_LATTICE_SIZE).contains(&lattice_size) {
            return Err(Error::InvalidGeometry(format!(
                "lattice size {lattice_size} outside [{MIN_LATTICE_SIZE}, {MAX_LATTICE_SIZE}]"
            )));
        }
        if tile_size == 0 {
            return Err(Error::InvalidGeometry("tile size must be at least 1".into()));
        }
        let dims = compute_dims(lattice_size, tile_size, layout);
        if dims.width > u32::MAX as u64 || dims.height > u32::MAX as u64 {
            return Err(Error::InvalidGeometry(format!(
                "{}x{} pixels does not fit a 32-bit image",
                dims.width, dims.height
            )));
        }
        Ok(Self {
            lattice_size,
            tile_size,
            layout,
        })
    }

    /// Grid and pixel dimensions.
    #[inline]
    pub fn dims(&self) -> Dims {
        compute_dims(self.lattice_size, self.tile_size, self.layout)
    }

    /// Pixel size as `(width, height)`. Fits `u32` by construction.
    #[inline]
    pub fn image_size(&self) -> (u32, u32) {
        let d = self.dims();
        (d.width as u32, d.height as u32)
    }

    /// Number of tiles, `N³`.
    #[inline]
    pub fn tile_count(&self) -> u32 {
        self.lattice_size.pow(3)
    }

    /// Top-left pixel of the tile for a lattice coordinate.
    #[inline]
    pub fn cell_origin(&self, c: LatticeCoord) -> (u32, u32) {
        let pos = lattice_to_tile(c, self.lattice_size, self.layout);
        (pos.x * self.tile_size, pos.y * self.tile_size)
    }

    /// Top-left pixel of tile `t`.
    #[inline]
    pub fn tile_origin(&self, t: u32) -> (u32, u32) {
        self.cell_origin(tile_index_to_rgb(t, self.lattice_size))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} M={} {}",
            self.lattice_size, self.tile_size, self.layout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tile_index_is_bijective() {
        for n in 2..=9 {
            let seen: HashSet<_> = (0..n * n * n).map(|t| tile_index_to_rgb(t, n)).collect();
            assert_eq!(seen.len(), (n * n * n) as usize);
            assert!(seen.iter().all(|c| c.r < n && c.g < n && c.b < n));
        }
    }

    #[test]
    fn tile_positions_are_unique_and_inside_grid() {
        for layout in [Layout::Wide, Layout::Tall] {
            for n in 2..=7 {
                let dims = compute_dims(n, 1, layout);
                let seen: HashSet<_> = (0..n * n * n).map(|t| tile_coords(t, n, layout)).collect();
                assert_eq!(seen.len(), (n * n * n) as usize);
                assert!(seen.iter().all(|p| p.x < dims.tiles_w && p.y < dims.tiles_h));
            }
        }
    }

    #[test]
    fn quantize_endpoints_and_monotonic() {
        for n in 2..=256 {
            assert_eq!(quantize(0, n), 0);
            assert_eq!(quantize(n - 1, n), 255);
            for i in 1..n {
                assert!(quantize(i, n) >= quantize(i - 1, n));
            }
        }
        assert_eq!(quantize(0, 1), 0);
    }

    #[test]
    fn quantize_rounds_half_up() {
        // 255 / 2 = 127.5
        assert_eq!(quantize(1, 3), 128);
        assert_eq!(quantize(1, 4), 85);
        assert_eq!(quantize(2, 4), 170);
        assert_eq!(quantize(16, 33), 128);
    }

    #[test]
    fn wide_four_by_two_scenario() {
        let dims = compute_dims(4, 2, Layout::Wide);
        assert_eq!(dims, Dims { tiles_w: 16, tiles_h: 4, width: 32, height: 8 });

        let first = tile_index_to_rgb(0, 4);
        assert_eq!(first, LatticeCoord::new(0, 0, 0));
        assert_eq!(first.color(4), [0, 0, 0]);

        let last = tile_index_to_rgb(63, 4);
        assert_eq!(last, LatticeCoord::new(3, 3, 3));
        assert_eq!(last.color(4), [255, 255, 255]);
        assert_eq!(tile_coords(63, 4, Layout::Wide), TilePos { x: 15, y: 3 });
    }

    #[test]
    fn tall_layout_positions() {
        // r=1, g=2, b=3 with n=4
        let t = 1 + 2 * 4 + 3 * 16;
        assert_eq!(tile_coords(t, 4, Layout::Tall), TilePos { x: 1, y: 14 });
        assert_eq!(tile_coords(t, 4, Layout::Wide), TilePos { x: 9, y: 3 });
    }

    #[test]
    fn geometry_validation() {
        assert!(Geometry::new(1, 4, Layout::Wide).is_err());
        assert!(Geometry::new(257, 1, Layout::Wide).is_err());
        assert!(Geometry::new(17, 0, Layout::Tall).is_err());
        assert!(Geometry::new(256, u32::MAX, Layout::Wide).is_err());

        let g = Geometry::new(17, 4, Layout::Tall).unwrap();
        assert_eq!(g.image_size(), (68, 1156));
        assert_eq!(g.tile_count(), 4913);
        assert_eq!(g.tile_origin(17), (0, 4));
        assert_eq!(g.to_string(), "N=17 M=4 tall");
    }

    #[test]
    fn layout_parse_and_display() {
        assert_eq!("wide".parse::<Layout>().unwrap(), Layout::Wide);
        assert_eq!(" TALL ".parse::<Layout>().unwrap(), Layout::Tall);
        assert!("square".parse::<Layout>().is_err());
        assert_eq!(Layout::Tall.to_string(), "tall");
    }
}
