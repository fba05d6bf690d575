use physical_constants::SPEED_OF_LIGHT_IN_VACUUM;

use crate::mesh::{BoxArray, IndexBox, IntVect, SPACEDIM};
use crate::sigma::{ramp, ramp_integral};
use crate::Real;

/// Damping coefficients along one axis of one box, indexed over `[lo, hi)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sigma {
    lo: i64,
    hi: i64,
    values: Vec<Real>,
}

impl Sigma {
    fn zeros(lo: i64, hi: i64) -> Self {
        Self { lo, hi, values: vec![0.0; (hi - lo).max(0) as usize] }
    }

    #[inline]
    pub fn lo(&self) -> i64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> i64 {
        self.hi
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Coefficient at index `i`, which must lie in `[lo, hi)`.
    #[inline]
    pub fn get(&self, i: i64) -> Real {
        self.values[(i - self.lo) as usize]
    }

    #[inline]
    fn raise(&mut self, i: i64, v: Real) {
        let slot = &mut self.values[(i - self.lo) as usize];
        *slot = slot.max(v);
    }
}

pub type SigmaVect = [Sigma; SPACEDIM];

#[derive(Copy, Clone)]
enum Side {
    Lo,
    Hi,
}

/// Damping profiles of one absorbing box.
///
/// `sigma*` arrays hold E-type (nodal) coefficients, `sigma_star*` arrays hold
/// B-type (cell-centered) ones. Each spans the box's cells plus the trailing
/// node. The `*_fac` arrays are the per-step factors derived from them.
#[derive(Clone, Debug)]
pub struct SigmaBox {
    sigma: SigmaVect,
    sigma_cumsum: SigmaVect,
    sigma_star: SigmaVect,
    sigma_star_cumsum: SigmaVect,
    sigma_fac: SigmaVect,
    sigma_cumsum_fac: SigmaVect,
    sigma_star_fac: SigmaVect,
    sigma_star_cumsum_fac: SigmaVect,
    v_sigma: Real,
}

impl SigmaBox {
    /// Builds the profiles of `bx`.
    ///
    /// `regular_domain` is the interior when it is a single box; otherwise the
    /// profile is derived from each of `grids` near `bx`.
    pub fn new(
        bx: &IndexBox,
        grids: &BoxArray,
        ncell: IntVect,
        delta: IntVect,
        regular_domain: Option<&IndexBox>,
        v_sigma: Real,
    ) -> Self {
        let bx = bx.enclosed_cells();
        let zeros = || -> SigmaVect {
            std::array::from_fn(|d| Sigma::zeros(bx.lo()[d], bx.hi()[d] + 2))
        };
        let mut sb = Self {
            sigma: zeros(),
            sigma_cumsum: zeros(),
            sigma_star: zeros(),
            sigma_star_cumsum: zeros(),
            sigma_fac: zeros(),
            sigma_cumsum_fac: zeros(),
            sigma_star_fac: zeros(),
            sigma_star_cumsum_fac: zeros(),
            v_sigma,
        };

        match regular_domain {
            Some(domain) => sb.define_single(&bx, domain, ncell, delta),
            None => sb.define_multiple(&bx, grids, ncell, delta),
        }
        sb
    }

    fn define_single(&mut self, bx: &IndexBox, domain: &IndexBox, ncell: IntVect, delta: IntVect) {
        for d in 0..SPACEDIM {
            let (slo, shi) = (bx.lo()[d], bx.hi()[d]);
            let (dlo, dhi) = (domain.lo()[d], domain.hi()[d]);

            let olo = slo.max(dlo - ncell[d]);
            let ohi = shi.min(dlo - 1);
            if ohi >= olo {
                self.fill(d, olo, ohi, dlo, Side::Lo, delta[d]);
            }

            let olo = slo.max(dhi + 1);
            let ohi = shi.min(dhi + ncell[d]);
            if ohi >= olo {
                self.fill(d, olo, ohi, dhi + 1, Side::Hi, delta[d]);
            }
        }
    }

    /// Where several grids ramp the same cells, the largest coefficient wins.
    fn define_multiple(&mut self, bx: &IndexBox, grids: &BoxArray, ncell: IntVect, delta: IntVect) {
        let near = grids.intersections(&bx.grow(ncell));
        for d in 0..SPACEDIM {
            if ncell[d] <= 0 {
                continue;
            }
            for &(g, _) in &near {
                let grid_box = grids.get(g).enclosed_cells();
                let sideways = |slab: IndexBox| {
                    (0..SPACEDIM)
                        .filter(|&e| e != d)
                        .fold(slab, |b, e| b.grow_dir(e, ncell[e]))
                };

                let lo_overlap = sideways(grid_box.adj_cell_lo(d, ncell[d])).intersect(bx);
                if lo_overlap.ok() {
                    self.fill(
                        d,
                        lo_overlap.lo()[d],
                        lo_overlap.hi()[d],
                        grid_box.lo()[d],
                        Side::Lo,
                        delta[d],
                    );
                }

                let hi_overlap = sideways(grid_box.adj_cell_hi(d, ncell[d])).intersect(bx);
                if hi_overlap.ok() {
                    self.fill(
                        d,
                        hi_overlap.lo()[d],
                        hi_overlap.hi()[d],
                        grid_box.hi()[d] + 1,
                        Side::Hi,
                        delta[d],
                    );
                }
            }
        }
    }

    /// Ramps cells `[olo, ohi]` along `d` away from the interface node `face`.
    fn fill(&mut self, d: usize, olo: i64, ohi: i64, face: i64, side: Side, delta: i64) {
        let v = self.v_sigma;
        let depth = |x: Real| match side {
            Side::Lo => face as Real - x,
            Side::Hi => x - face as Real,
        };
        for i in olo..=ohi + 1 {
            let node = depth(i as Real);
            self.sigma[d].raise(i, ramp(node, delta, v));
            self.sigma_cumsum[d].raise(i, ramp_integral(node, delta, v));
            if i <= ohi {
                let center = depth(i as Real + 0.5);
                self.sigma_star[d].raise(i, ramp(center, delta, v));
                self.sigma_star_cumsum[d].raise(i, ramp_integral(center, delta, v));
            }
        }
    }

    /// Refreshes the B-type (cell-centered) factors for time step `dt`.
    pub fn compute_pml_factors_b(&mut self, dx: &[Real; SPACEDIM], dt: Real) {
        for d in 0..SPACEDIM {
            decay(&mut self.sigma_star_fac[d], &self.sigma_star[d], dt);
            decay(&mut self.sigma_star_cumsum_fac[d], &self.sigma_star_cumsum[d], dx[d] / SPEED_OF_LIGHT_IN_VACUUM);
        }
    }

    /// Refreshes the E-type (nodal) factors for time step `dt`.
    pub fn compute_pml_factors_e(&mut self, dx: &[Real; SPACEDIM], dt: Real) {
        for d in 0..SPACEDIM {
            decay(&mut self.sigma_fac[d], &self.sigma[d], dt);
            decay(&mut self.sigma_cumsum_fac[d], &self.sigma_cumsum[d], dx[d] / SPEED_OF_LIGHT_IN_VACUUM);
        }
    }

    #[inline]
    pub fn sigma(&self) -> &SigmaVect {
        &self.sigma
    }

    #[inline]
    pub fn sigma_cumsum(&self) -> &SigmaVect {
        &self.sigma_cumsum
    }

    #[inline]
    pub fn sigma_star(&self) -> &SigmaVect {
        &self.sigma_star
    }

    #[inline]
    pub fn sigma_star_cumsum(&self) -> &SigmaVect {
        &self.sigma_star_cumsum
    }

    #[inline]
    pub fn sigma_fac(&self) -> &SigmaVect {
        &self.sigma_fac
    }

    #[inline]
    pub fn sigma_cumsum_fac(&self) -> &SigmaVect {
        &self.sigma_cumsum_fac
    }

    #[inline]
    pub fn sigma_star_fac(&self) -> &SigmaVect {
        &self.sigma_star_fac
    }

    #[inline]
    pub fn sigma_star_cumsum_fac(&self) -> &SigmaVect {
        &self.sigma_star_cumsum_fac
    }

    #[inline]
    pub fn v_sigma(&self) -> Real {
        self.v_sigma
    }

    /// Per-step decay factors for data nodal (`true`) or cell-centered along an axis.
    #[inline]
    pub fn decay_factors(&self, nodal: bool) -> &SigmaVect {
        if nodal {
            &self.sigma_fac
        } else {
            &self.sigma_star_fac
        }
    }

    /// Cumulative decay factors for data nodal (`true`) or cell-centered along an axis.
    #[inline]
    pub fn cumsum_factors(&self, nodal: bool) -> &SigmaVect {
        if nodal {
            &self.sigma_cumsum_fac
        } else {
            &self.sigma_star_cumsum_fac
        }
    }
}

fn decay(fac: &mut Sigma, sigma: &Sigma, scale: Real) {
    for (f, &s) in fac.values.iter_mut().zip(&sigma.values) {
        *f = (-s * scale).exp();
    }
}
