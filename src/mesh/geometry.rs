use crate::mesh::{IndexBox, IntVect, SPACEDIM};
use crate::{Error, Real};

/// Problem domain, resolution and periodicity of one refinement level.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    dims: usize,
    domain: IndexBox,
    cell_size: [Real; SPACEDIM],
    periodic: [bool; SPACEDIM],
}

impl Geometry {
    /// Creates a geometry over the cell-centered `domain`.
    ///
    /// Axes at or beyond `dims` must hold a single cell at index 0.
    pub fn new(
        dims: usize,
        domain: IndexBox,
        cell_size: [Real; SPACEDIM],
        periodic: [bool; SPACEDIM],
    ) -> Result<Self, Error> {
        if !(1..=SPACEDIM).contains(&dims) {
            return Err(Error::InconsistentLayout {
                reason: format!("unsupported dimensionality {}", dims),
            });
        }
        if !domain.ok() || !domain.index_type().is_cell_centered() {
            return Err(Error::InconsistentLayout {
                reason: format!("domain {:?} is empty or not cell-centered", domain),
            });
        }
        for d in dims..SPACEDIM {
            if domain.lo()[d] != 0 || domain.hi()[d] != 0 {
                return Err(Error::InconsistentLayout {
                    reason: format!("domain extends along inactive axis {}", d),
                });
            }
        }
        if cell_size[..dims].iter().any(|&dx| !(dx > 0.0)) {
            return Err(Error::InconsistentLayout {
                reason: format!("non-positive cell size {:?}", cell_size),
            });
        }

        let mut periodic = periodic;
        for p in periodic.iter_mut().skip(dims) {
            *p = false;
        }
        Ok(Self { dims, domain, cell_size, periodic })
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    #[inline]
    pub fn domain(&self) -> IndexBox {
        self.domain
    }

    #[inline]
    pub fn cell_size(&self) -> [Real; SPACEDIM] {
        self.cell_size
    }

    /// Smallest cell size over the active axes.
    pub fn min_cell_size(&self) -> Real {
        self.cell_size[..self.dims].iter().copied().fold(Real::INFINITY, Real::min)
    }

    #[inline]
    pub fn is_periodic(&self, d: usize) -> bool {
        self.periodic[d]
    }

    pub fn periodicity(&self) -> Periodicity {
        Periodicity {
            period: IntVect(std::array::from_fn(|d| {
                if self.periodic[d] {
                    self.domain.length(d)
                } else {
                    0
                }
            })),
        }
    }

    /// The same problem at a resolution coarser by `ratio`.
    pub fn coarsen(&self, ratio: IntVect) -> Result<Self, Error> {
        let cell_size = std::array::from_fn(|d| {
            if d < self.dims {
                self.cell_size[d] * ratio[d] as Real
            } else {
                self.cell_size[d]
            }
        });
        Self::new(self.dims, self.domain.coarsen(ratio), cell_size, self.periodic)
    }
}

/// Periodic images of index space.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Periodicity {
    period: IntVect,
}

impl Periodicity {
    pub fn non_periodic() -> Self {
        Self { period: IntVect::zero() }
    }

    #[inline]
    pub fn period(&self) -> IntVect {
        self.period
    }

    /// Every image shift, the zero shift first.
    pub fn shifts(&self) -> Vec<IntVect> {
        let mut shifts = vec![IntVect::zero()];
        for d in 0..SPACEDIM {
            if self.period[d] == 0 {
                continue;
            }
            let current = shifts.clone();
            for s in current {
                for sign in [-1, 1] {
                    let mut t = s;
                    t[d] += sign * self.period[d];
                    shifts.push(t);
                }
            }
        }
        shifts
    }
}
