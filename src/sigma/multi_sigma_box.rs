use rayon::prelude::*;

use crate::mesh::{BoxArray, DistributionMapping, IndexBox, IntVect, SPACEDIM};
use crate::sigma::SigmaBox;
use crate::Real;

/// One `SigmaBox` per box of an absorbing layout, distributed like the
/// layer's field arrays.
///
/// Remembers the time step last used for each factor kind so that repeated
/// conversions with a bit-identical `dt` are skipped.
#[derive(Clone, Debug)]
pub struct MultiSigmaBox {
    ba: BoxArray,
    dm: DistributionMapping,
    boxes: Vec<SigmaBox>,
    dt_b: Option<Real>,
    dt_e: Option<Real>,
}

impl MultiSigmaBox {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ba: &BoxArray,
        dm: &DistributionMapping,
        grids: &BoxArray,
        ncell: IntVect,
        delta: IntVect,
        regular_domain: Option<&IndexBox>,
        v_sigma: Real,
    ) -> Self {
        let boxes = ba
            .boxes()
            .par_iter()
            .map(|b| SigmaBox::new(b, grids, ncell, delta, regular_domain, v_sigma))
            .collect();
        Self {
            ba: ba.clone(),
            dm: dm.clone(),
            boxes,
            dt_b: None,
            dt_e: None,
        }
    }

    /// Converts the B-type profiles for `dt`. Returns whether any work was done.
    pub fn compute_pml_factors_b(&mut self, dx: &[Real; SPACEDIM], dt: Real) -> bool {
        if same_step(self.dt_b, dt) {
            log::debug!("B-type PML factors already current for dt = {:e}", dt);
            return false;
        }
        self.dt_b = Some(dt);
        self.boxes
            .par_iter_mut()
            .for_each(|sb| sb.compute_pml_factors_b(dx, dt));
        log::debug!("recomputed B-type PML factors of {} boxes for dt = {:e}", self.boxes.len(), dt);
        true
    }

    /// Converts the E-type profiles for `dt`. Returns whether any work was done.
    pub fn compute_pml_factors_e(&mut self, dx: &[Real; SPACEDIM], dt: Real) -> bool {
        if same_step(self.dt_e, dt) {
            log::debug!("E-type PML factors already current for dt = {:e}", dt);
            return false;
        }
        self.dt_e = Some(dt);
        self.boxes
            .par_iter_mut()
            .for_each(|sb| sb.compute_pml_factors_e(dx, dt));
        log::debug!("recomputed E-type PML factors of {} boxes for dt = {:e}", self.boxes.len(), dt);
        true
    }

    /// Both factor kinds were last converted with exactly `dt`.
    pub fn is_current(&self, dt: Real) -> bool {
        same_step(self.dt_b, dt) && same_step(self.dt_e, dt)
    }

    /// Both factor kinds have been converted at least once.
    pub fn has_factors(&self) -> bool {
        self.dt_b.is_some() && self.dt_e.is_some()
    }

    #[inline]
    pub fn last_dt_b(&self) -> Option<Real> {
        self.dt_b
    }

    #[inline]
    pub fn last_dt_e(&self) -> Option<Real> {
        self.dt_e
    }

    #[inline]
    pub fn get(&self, i: usize) -> &SigmaBox {
        &self.boxes[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SigmaBox> {
        self.boxes.iter()
    }

    #[inline]
    pub fn box_array(&self) -> &BoxArray {
        &self.ba
    }

    #[inline]
    pub fn distribution_map(&self) -> &DistributionMapping {
        &self.dm
    }
}

#[inline]
fn same_step(last: Option<Real>, dt: Real) -> bool {
    last.map_or(false, |last| last.to_bits() == dt.to_bits())
}
