//! Interpolation methods for LUT lookup.

/// How [`Lut3D::apply`](crate::Lut3D::apply) reads between lattice points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Closest lattice point.
    Nearest,
    /// Trilinear blend of the 8 surrounding lattice points.
    #[default]
    Linear,
}
