use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::mesh::SPACEDIM;

/// An integer vector in index space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntVect(pub [i64; SPACEDIM]);

impl IntVect {
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self([x, y, z])
    }

    #[inline]
    pub const fn zero() -> Self {
        Self([0; SPACEDIM])
    }

    #[inline]
    pub const fn splat(v: i64) -> Self {
        Self([v; SPACEDIM])
    }

    /// `v` along the first `dims` axes, zero along the rest.
    #[inline]
    pub fn active(dims: usize, v: i64) -> Self {
        let mut iv = Self::zero();
        for d in 0..dims.min(SPACEDIM) {
            iv[d] = v;
        }
        iv
    }

    #[inline]
    pub fn max_elem(&self) -> i64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    #[inline]
    pub fn elementwise_max(self, other: Self) -> Self {
        Self(std::array::from_fn(|d| self[d].max(other[d])))
    }

    #[inline]
    pub fn elementwise_min(self, other: Self) -> Self {
        Self(std::array::from_fn(|d| self[d].min(other[d])))
    }

    /// Componentwise integer division, rounding toward negative infinity.
    #[inline]
    pub fn div_floor(self, ratio: Self) -> Self {
        Self(std::array::from_fn(|d| self[d].div_euclid(ratio[d].max(1))))
    }
}

impl Index<usize> for IntVect {
    type Output = i64;
    #[inline]
    fn index(&self, d: usize) -> &i64 {
        &self.0[d]
    }
}

impl IndexMut<usize> for IntVect {
    #[inline]
    fn index_mut(&mut self, d: usize) -> &mut i64 {
        &mut self.0[d]
    }
}

impl Add for IntVect {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|d| self[d] + rhs[d]))
    }
}

impl Sub for IntVect {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|d| self[d] - rhs[d]))
    }
}

impl Mul for IntVect {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|d| self[d] * rhs[d]))
    }
}

impl Neg for IntVect {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(std::array::from_fn(|d| -self[d]))
    }
}

/// Per-axis staggering of a box: `true` means node-centered along that axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndexType(pub [bool; SPACEDIM]);

impl IndexType {
    #[inline]
    pub const fn cell() -> Self {
        Self([false; SPACEDIM])
    }

    /// Node-centered along the first `dims` axes.
    #[inline]
    pub fn node(dims: usize) -> Self {
        Self(std::array::from_fn(|d| d < dims))
    }

    /// Node-centered along each listed axis that is also active.
    pub fn nodal_along(dims: usize, axes: &[usize]) -> Self {
        Self(std::array::from_fn(|d| d < dims && axes.contains(&d)))
    }

    #[inline]
    pub fn is_nodal(&self, d: usize) -> bool {
        self.0[d]
    }

    #[inline]
    pub fn is_cell_centered(&self) -> bool {
        self.0.iter().all(|nodal| !nodal)
    }
}
