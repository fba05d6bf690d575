use rayon::prelude::*;

use crate::field::MultiField;
use crate::mesh::{Geometry, IntVect};
use crate::pml::{PatchType, Pml};
use crate::Error;

/// How data moves between the interior and a split-field layer array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CopyPolicy {
    /// The layer lies outside the interior domain. The summed layer field
    /// overwrites the interior's guard cells only.
    Overwrite,
    /// The layer overlaps the interior domain. The summed layer field replaces
    /// interior valid and guard values where they overlap, and only cells
    /// inside the interior grids are copied back into the layer.
    DomainMasked,
}

impl CopyPolicy {
    #[inline]
    pub fn for_layer(in_domain: bool) -> Self {
        if in_domain {
            Self::DomainMasked
        } else {
            Self::Overwrite
        }
    }
}

/// Two-way exchange between a split layer array `pml` and the interior array `reg`.
///
/// First the sum of the split components of `pml` is written into `reg`
/// according to `policy`. Then the interior values are copied into component 0
/// of `pml` wherever the layer (guard cells included) meets the interior, with
/// the remaining components zeroed there.
pub fn exchange(
    pml: &mut MultiField,
    reg: &mut MultiField,
    geom: &Geometry,
    policy: CopyPolicy,
) -> Result<(), Error> {
    if pml.index_type() != reg.index_type() {
        return Err(Error::IndexTypeMismatch {
            dst: reg.index_type(),
            src: pml.index_type(),
        });
    }
    let period = geom.periodicity();
    let zero = IntVect::zero();
    let ngr = reg.n_grow();
    let ngp = pml.n_grow();
    let ncp = pml.ncomp();

    let mut tmpreg = MultiField::new(
        reg.box_array().clone(),
        reg.distribution_map().clone(),
        ncp,
        ngr,
    );
    let total = pml.sum_components();

    if policy == CopyPolicy::DomainMasked {
        reg.parallel_copy(&total, 0, 0, 1, zero, zero, &period)?;
    }
    if ngr.max_elem() > 0 {
        tmpreg.copy_from(reg, 0, 0, 1, ngr)?;
        tmpreg.parallel_copy(&total, 0, 0, 1, zero, ngr, &period)?;
        reg.fabs_mut()
            .par_iter_mut()
            .zip(tmpreg.fabs().par_iter())
            .for_each(|(dst, src)| {
                for ghost in dst.fab_box().difference(&dst.valid_box()) {
                    dst.view_mut(0..1, &ghost).assign(&src.view(0..1, &ghost));
                }
            });
    }

    tmpreg.copy_from(reg, 0, 0, 1, zero)?;
    if ncp > 1 {
        tmpreg.set_val_comps(0.0, 1, ncp - 1, zero);
    }
    if policy == CopyPolicy::DomainMasked {
        // cells under the layer keep its split values
        tmpreg.parallel_copy(pml, 0, 0, ncp, zero, zero, &period)?;
    }
    pml.parallel_copy(&tmpreg, 0, 0, ncp, zero, ngp, &period)
}

/// Copies component 0 of the interior array into the layer array, including
/// up to `ngrow` guard cells of the layer.
pub fn copy_to_pml(pml: &mut MultiField, reg: &MultiField, geom: &Geometry, ngrow: IntVect) -> Result<(), Error> {
    pml.parallel_copy(reg, 0, 0, 1, IntVect::zero(), ngrow, &geom.periodicity())
}

impl Pml {
    #[inline]
    fn copy_policy(&self) -> CopyPolicy {
        CopyPolicy::for_layer(self.params.in_domain)
    }

    /// Exchanges E between the interior and the layer. A missing coarse patch is a no-op.
    pub fn exchange_e(&mut self, which: PatchType, reg: [&mut MultiField; 3]) -> Result<(), Error> {
        let policy = self.copy_policy();
        if let Some(p) = self.checked_patch_mut(which)? {
            for (pml, reg) in p.e.iter_mut().zip(reg) {
                exchange(pml, reg, &p.geom, policy)?;
            }
        }
        Ok(())
    }

    /// Exchanges B between the interior and the layer. A missing coarse patch is a no-op.
    pub fn exchange_b(&mut self, which: PatchType, reg: [&mut MultiField; 3]) -> Result<(), Error> {
        let policy = self.copy_policy();
        if let Some(p) = self.checked_patch_mut(which)? {
            for (pml, reg) in p.b.iter_mut().zip(reg) {
                exchange(pml, reg, &p.geom, policy)?;
            }
        }
        Ok(())
    }

    /// Exchanges the electric cleaning field F.
    pub fn exchange_f(&mut self, which: PatchType, reg: &mut MultiField) -> Result<(), Error> {
        if !self.params.dive_cleaning {
            return Err(Error::CleaningDisabled { field: "F" });
        }
        let policy = self.copy_policy();
        if let Some(p) = self.checked_patch_mut(which)? {
            if let Some(f) = p.f.as_mut() {
                exchange(f, reg, &p.geom, policy)?;
            }
        }
        Ok(())
    }

    /// Exchanges the magnetic cleaning field G.
    pub fn exchange_g(&mut self, which: PatchType, reg: &mut MultiField) -> Result<(), Error> {
        if !self.params.divb_cleaning {
            return Err(Error::CleaningDisabled { field: "G" });
        }
        let policy = self.copy_policy();
        if let Some(p) = self.checked_patch_mut(which)? {
            if let Some(g) = p.g.as_mut() {
                exchange(g, reg, &p.geom, policy)?;
            }
        }
        Ok(())
    }

    /// Copies the interior current of one patch into the layer.
    pub fn copy_j_to_pml(&mut self, which: PatchType, reg: [&MultiField; 3]) -> Result<(), Error> {
        let ngrow = self.params.fill_guards_current;
        if let Some(p) = self.checked_patch_mut(which)? {
            for (pml, reg) in p.j.iter_mut().zip(reg) {
                copy_to_pml(pml, reg, &p.geom, ngrow)?;
            }
        }
        Ok(())
    }

    /// Copies the interior current into the fine and coarse layer patches
    /// ahead of a spectral push.
    pub fn copy_j_to_pmls(
        &mut self,
        j_fp: Option<[&MultiField; 3]>,
        j_cp: Option<[&MultiField; 3]>,
    ) -> Result<(), Error> {
        if let Some(j) = j_fp {
            self.copy_j_to_pml(PatchType::Fine, j)?;
        }
        if let Some(j) = j_cp {
            self.copy_j_to_pml(PatchType::Coarse, j)?;
        }
        Ok(())
    }
}
