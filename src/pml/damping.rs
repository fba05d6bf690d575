use ndarray::Axis;

use crate::field::MultiField;
use crate::mesh::SPACEDIM;
use crate::pml::{PatchType, Pml};
use crate::sigma::MultiSigmaBox;
use crate::Error;

/// Which axis damps each component of a split array.
#[derive(Copy, Clone, Debug)]
enum Split {
    /// Split parts of field direction `d`: (d+1)%3, (d+2)%3, then d.
    Field(usize),
    /// Component `c` is split along axis `c`.
    Axes,
}

impl Split {
    #[inline]
    fn axis(self, comp: usize) -> usize {
        match self {
            Split::Field(d) => match comp {
                0 => (d + 1) % 3,
                1 => (d + 2) % 3,
                _ => d,
            },
            Split::Axes => comp,
        }
    }
}

/// Multiplies every component of `mf` by the factor of its split axis over
/// valid cells.
fn damp_split(mf: &mut MultiField, sigba: &MultiSigmaBox, split: Split) {
    let itype = mf.index_type();
    let ncomp = mf.ncomp();
    mf.for_each_fab_mut(|i, fab| {
        let sb = sigba.get(i);
        let valid = fab.valid_box();
        for comp in 0..ncomp {
            let a = split.axis(comp);
            let nodal = itype.is_nodal(a);
            let fac = &sb.decay_factors(nodal)[a];
            let mut view = fab.view_mut(comp..comp + 1, &valid);
            for (n, mut lane) in view.axis_iter_mut(Axis(a + 1)).enumerate() {
                let f = fac.get(valid.lo()[a] + n as i64);
                lane.mapv_inplace(|v| v * f);
            }
        }
    });
}

/// Multiplies `mf` by the cumulative factors of every axis over valid cells.
fn damp_cumulative(mf: &mut MultiField, sigba: &MultiSigmaBox) {
    let itype = mf.index_type();
    let ncomp = mf.ncomp();
    mf.for_each_fab_mut(|i, fab| {
        let sb = sigba.get(i);
        let valid = fab.valid_box();
        let mut view = fab.view_mut(0..ncomp, &valid);
        for a in 0..SPACEDIM {
            let fac = &sb.cumsum_factors(itype.is_nodal(a))[a];
            for (n, mut lane) in view.axis_iter_mut(Axis(a + 1)).enumerate() {
                let f = fac.get(valid.lo()[a] + n as i64);
                lane.mapv_inplace(|v| v * f);
            }
        }
    });
}

impl Pml {
    /// Applies one step of damping to the split fields of `which`.
    ///
    /// With particles in the layer the current is damped with the cumulative
    /// factors as well. A missing coarse patch is a no-op.
    pub fn damp(&mut self, which: PatchType) -> Result<(), Error> {
        let has_particles = self.params.has_particles;
        let Some(p) = self.checked_patch_mut(which)? else {
            return Ok(());
        };
        if !p.sigba.has_factors() {
            return Err(Error::StaleFactors);
        }
        for (d, mf) in p.e.iter_mut().enumerate() {
            damp_split(mf, &p.sigba, Split::Field(d));
        }
        for (d, mf) in p.b.iter_mut().enumerate() {
            damp_split(mf, &p.sigba, Split::Field(d));
        }
        if let Some(f) = p.f.as_mut() {
            damp_split(f, &p.sigba, Split::Axes);
        }
        if let Some(g) = p.g.as_mut() {
            damp_split(g, &p.sigba, Split::Axes);
        }
        if has_particles {
            for mf in p.j.iter_mut() {
                damp_cumulative(mf, &p.sigba);
            }
        }
        Ok(())
    }
}
