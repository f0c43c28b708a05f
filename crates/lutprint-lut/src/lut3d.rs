//! 3-dimensional lookup table.

use crate::{Interpolation, LutError, LutResult};
use lutprint_core::{PixelBuffer, TaskContext, PIXEL_YIELD_INTERVAL};

/// A 3-dimensional lookup table.
///
/// Holds `size³` RGB outputs in `.cube` order: R varies fastest, then G,
/// then B. Index of lattice point `(r, g, b)` is `r + g*size + b*size²`.
///
/// # Example
///
/// ```rust
/// use lutprint_lut::Lut3D;
///
/// let lut = Lut3D::identity(17);
/// let out = lut.apply([0.5, 0.25, 1.0]);
/// assert!((out[1] - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Output colors, R fastest.
    pub data: Vec<[f64; 3]>,
    /// Lattice points per axis.
    pub size: usize,
    /// Input domain minimum (per channel).
    pub domain_min: [f64; 3],
    /// Input domain maximum (per channel).
    pub domain_max: [f64; 3],
    /// Title written to / read from the `TITLE` line.
    pub title: Option<String>,
    /// Lookup interpolation.
    pub interpolation: Interpolation,
}

impl Lut3D {
    /// Creates an identity LUT whose lattice point `i` maps to `i / (size - 1)`.
    ///
    /// `size` must be at least 2.
    pub fn identity(size: usize) -> Self {
        debug_assert!(size >= 2, "identity LUT needs at least 2 points per axis");
        let denom = size.saturating_sub(1).max(1) as f64;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push([r as f64 / denom, g as f64 / denom, b as f64 / denom]);
                }
            }
        }
        Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            title: None,
            interpolation: Interpolation::Linear,
        }
    }

    /// Creates a LUT from R-fastest data with exactly `size³` entries.
    pub fn from_data(data: Vec<[f64; 3]>, size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!(
                "size must be at least 2, got {size}"
            )));
        }
        let expected = size * size * size;
        if data.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} entries for size {}, got {}",
                expected,
                size,
                data.len()
            )));
        }
        Ok(Self {
            data,
            size,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
            title: None,
            interpolation: Interpolation::Linear,
        })
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the interpolation method.
    pub fn with_interpolation(mut self, interp: Interpolation) -> Self {
        self.interpolation = interp;
        self
    }

    /// Total number of lattice points.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.size * self.size * self.size
    }

    #[inline]
    fn index(&self, r: usize, g: usize, b: usize) -> usize {
        r + self.size * (g + self.size * b)
    }

    /// Output at lattice point `(r, g, b)`.
    ///
    /// # Panics
    ///
    /// If any index is `>= size`.
    #[inline]
    pub fn get(&self, r: usize, g: usize, b: usize) -> [f64; 3] {
        self.data[self.index(r, g, b)]
    }

    /// Looks up an RGB value.
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        match self.interpolation {
            Interpolation::Nearest => self.apply_nearest(rgb),
            Interpolation::Linear => self.apply_trilinear(rgb),
        }
    }

    /// Applies the LUT to every pixel of an 8-bit image in place.
    ///
    /// Channels are mapped through `v / 255`, looked up, then rounded back
    /// and clamped to `0..=255`. Alpha is left alone. Runs cooperatively
    /// with the same cadence as the pixel filter.
    pub fn apply_image(&self, image: &mut PixelBuffer, ctx: &TaskContext) -> LutResult<()> {
        ctx.check_cancelled()?;
        let (w, h) = (image.width(), image.height());
        let total = w as u64 * h as u64;
        let mut done: u64 = 0;
        for y in 0..h {
            for x in 0..w {
                let rgb = image.rgb(x, y).map(|v| v as f64 / 255.0);
                let out = self.apply(rgb).map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8);
                image.set_rgb(x, y, out);

                done += 1;
                if done % PIXEL_YIELD_INTERVAL == 0 {
                    ctx.checkpoint(done, total);
                    ctx.check_cancelled()?;
                }
            }
        }
        ctx.checkpoint(total, total);
        Ok(())
    }

    /// Maps input into lattice units `[0, size-1]`.
    fn to_lattice(&self, rgb: [f64; 3]) -> [f64; 3] {
        let n = (self.size - 1) as f64;
        std::array::from_fn(|c| {
            let span = self.domain_max[c] - self.domain_min[c];
            let t = if span > 0.0 {
                (rgb[c] - self.domain_min[c]) / span
            } else {
                0.0
            };
            t.clamp(0.0, 1.0) * n
        })
    }

    fn apply_nearest(&self, rgb: [f64; 3]) -> [f64; 3] {
        let p = self.to_lattice(rgb);
        let [r, g, b] = p.map(|v| (v.round() as usize).min(self.size - 1));
        self.get(r, g, b)
    }

    fn apply_trilinear(&self, rgb: [f64; 3]) -> [f64; 3] {
        let p = self.to_lattice(rgb);
        let lo = p.map(|v| (v.floor() as usize).min(self.size - 2));
        let f: [f64; 3] = std::array::from_fn(|c| p[c] - lo[c] as f64);
        let [r0, g0, b0] = lo;

        let mut out = [0.0f64; 3];
        for (corner, weight) in (0..8).map(|i| {
            let (dr, dg, db) = (i & 1, (i >> 1) & 1, (i >> 2) & 1);
            let w = (if dr == 1 { f[0] } else { 1.0 - f[0] })
                * (if dg == 1 { f[1] } else { 1.0 - f[1] })
                * (if db == 1 { f[2] } else { 1.0 - f[2] });
            (self.get(r0 + dr, g0 + dg, b0 + db), w)
        }) {
            for c in 0..3 {
                out[c] += corner[c] * weight;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_is_r_fastest() {
        let lut = Lut3D::identity(3);
        assert_eq!(lut.entry_count(), 27);
        assert_eq!(lut.data[1], [0.5, 0.0, 0.0]);
        assert_eq!(lut.data[3], [0.0, 0.5, 0.0]);
        assert_eq!(lut.data[9], [0.0, 0.0, 0.5]);
        assert_eq!(lut.get(2, 2, 2), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn identity_apply_passes_through() {
        let lut = Lut3D::identity(5);
        for rgb in [[0.0, 0.0, 0.0], [0.3, 0.6, 0.9], [1.0, 0.5, 0.125]] {
            let out = lut.apply(rgb);
            for c in 0..3 {
                assert_abs_diff_eq!(out[c], rgb[c], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn nearest_snaps_to_lattice() {
        let lut = Lut3D::identity(3).with_interpolation(Interpolation::Nearest);
        assert_eq!(lut.apply([0.3, 0.7, 0.1]), [0.5, 0.5, 0.0]);
    }

    #[test]
    fn trilinear_blends_between_points() {
        let mut lut = Lut3D::identity(2);
        // Invert red.
        for px in &mut lut.data {
            px[0] = 1.0 - px[0];
        }
        let out = lut.apply([0.25, 0.5, 0.5]);
        assert_abs_diff_eq!(out[0], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn out_of_domain_clamps() {
        let lut = Lut3D::identity(4);
        assert_eq!(lut.apply([-1.0, 2.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn apply_image_keeps_alpha() {
        let mut lut = Lut3D::identity(2);
        for px in &mut lut.data {
            px[1] = 1.0 - px[1];
        }
        let mut image = PixelBuffer::from_raw(1, 1, 4, vec![10, 0, 255, 42]).unwrap();
        lut.apply_image(&mut image, &TaskContext::new()).unwrap();
        assert_eq!(image.as_bytes(), &[10, 255, 255, 42]);
    }

    #[test]
    fn from_data_validates_length() {
        assert!(Lut3D::from_data(vec![[0.0; 3]; 8], 2).is_ok());
        assert!(Lut3D::from_data(vec![[0.0; 3]; 7], 2).is_err());
        assert!(Lut3D::from_data(vec![[0.0; 3]; 1], 1).is_err());
    }
}
