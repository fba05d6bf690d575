use crate::field::MultiField;
use crate::mesh::{BoxArray, DistributionMapping, Geometry, IndexType, IntVect};
use crate::pml::layout::PmlLayout;
use crate::pml::{GridType, PmlParameters};
use crate::sigma::MultiSigmaBox;
use crate::Real;

#[cfg(feature = "psatd")]
use crate::pml::SpectralSolver;

pub(crate) const E_NAMES: [&str; 3] = ["Ex", "Ey", "Ez"];
pub(crate) const B_NAMES: [&str; 3] = ["Bx", "By", "Bz"];
pub(crate) const J_NAMES: [&str; 3] = ["jx", "jy", "jz"];

/// Guard widths of the arrays of one patch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Guards {
    pub e: IntVect,
    pub b: IntVect,
    pub f: IntVect,
}

impl Guards {
    pub fn max(&self) -> IntVect {
        self.e.elementwise_max(self.b).elementwise_max(self.f)
    }
}

/// Split-field arrays and damping profiles of one patch of the layer.
pub struct PmlPatch {
    pub(crate) geom: Geometry,
    pub(crate) ba: BoxArray,
    pub(crate) dm: DistributionMapping,
    pub(crate) e: [MultiField; 3],
    pub(crate) b: [MultiField; 3],
    pub(crate) j: [MultiField; 3],
    pub(crate) f: Option<MultiField>,
    pub(crate) g: Option<MultiField>,
    pub(crate) edge_lengths: Option<[MultiField; 3]>,
    pub(crate) face_areas: Option<[MultiField; 3]>,
    pub(crate) sigba: MultiSigmaBox,
    #[cfg(feature = "psatd")]
    pub(crate) spectral: Option<Box<dyn SpectralSolver>>,
}

impl PmlPatch {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        geom: Geometry,
        layout: &PmlLayout,
        dm: DistributionMapping,
        ncell: IntVect,
        delta: IntVect,
        v_sigma: Real,
        guards: Guards,
        params: &PmlParameters,
    ) -> Self {
        let dims = geom.dims();
        let ba = layout.ba.clone();
        let collocated = params.grid_type == GridType::Collocated;
        let e_type = |d: usize| {
            if collocated {
                IndexType::node(dims)
            } else {
                let others: Vec<usize> = (0..3).filter(|&a| a != d).collect();
                IndexType::nodal_along(dims, &others)
            }
        };
        let b_type = |d: usize| {
            if collocated {
                IndexType::node(dims)
            } else {
                IndexType::nodal_along(dims, &[d])
            }
        };
        let alloc = |itype: IndexType, ncomp: usize, ng: IntVect| {
            MultiField::new(ba.convert(itype), dm.clone(), ncomp, ng)
        };

        let ncomp_e = if params.dive_cleaning { 3 } else { 2 };
        let ncomp_b = if params.divb_cleaning { 3 } else { 2 };
        let e = std::array::from_fn(|d| alloc(e_type(d), ncomp_e, guards.e));
        let b = std::array::from_fn(|d| alloc(b_type(d), ncomp_b, guards.b));
        let j = std::array::from_fn(|d| alloc(e_type(d), 1, guards.e));

        let f = params
            .dive_cleaning
            .then(|| alloc(IndexType::node(dims), 3, guards.f));
        let g_type = if collocated { IndexType::node(dims) } else { IndexType::cell() };
        let g = params.divb_cleaning.then(|| alloc(g_type, 3, guards.f));

        let ng_eb = IntVect::active(dims, params.max_guard_eb);
        let unit = |itype: IndexType| {
            let mut mf = alloc(itype, 1, ng_eb);
            mf.set_val(1.0);
            mf
        };
        let edge_lengths = params
            .geometric_factors
            .then(|| std::array::from_fn(|d| unit(e_type(d))));
        let face_areas = params
            .geometric_factors
            .then(|| std::array::from_fn(|d| unit(b_type(d))));

        let sigba = MultiSigmaBox::new(
            &ba,
            &dm,
            &layout.grids,
            ncell,
            delta,
            layout.regular_domain.as_ref(),
            v_sigma,
        );

        Self {
            geom,
            ba,
            dm,
            e,
            b,
            j,
            f,
            g,
            edge_lengths,
            face_areas,
            sigba,
            #[cfg(feature = "psatd")]
            spectral: None,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    /// Cell-centered absorbing boxes.
    #[inline]
    pub fn box_array(&self) -> &BoxArray {
        &self.ba
    }

    #[inline]
    pub fn distribution_map(&self) -> &DistributionMapping {
        &self.dm
    }

    #[inline]
    pub fn e(&self) -> &[MultiField; 3] {
        &self.e
    }

    #[inline]
    pub fn e_mut(&mut self) -> &mut [MultiField; 3] {
        &mut self.e
    }

    #[inline]
    pub fn b(&self) -> &[MultiField; 3] {
        &self.b
    }

    #[inline]
    pub fn b_mut(&mut self) -> &mut [MultiField; 3] {
        &mut self.b
    }

    #[inline]
    pub fn j(&self) -> &[MultiField; 3] {
        &self.j
    }

    #[inline]
    pub fn j_mut(&mut self) -> &mut [MultiField; 3] {
        &mut self.j
    }

    #[inline]
    pub fn f(&self) -> Option<&MultiField> {
        self.f.as_ref()
    }

    #[inline]
    pub fn f_mut(&mut self) -> Option<&mut MultiField> {
        self.f.as_mut()
    }

    #[inline]
    pub fn g(&self) -> Option<&MultiField> {
        self.g.as_ref()
    }

    #[inline]
    pub fn g_mut(&mut self) -> Option<&mut MultiField> {
        self.g.as_mut()
    }

    #[inline]
    pub fn edge_lengths(&self) -> Option<&[MultiField; 3]> {
        self.edge_lengths.as_ref()
    }

    #[inline]
    pub fn edge_lengths_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.edge_lengths.as_mut()
    }

    #[inline]
    pub fn face_areas(&self) -> Option<&[MultiField; 3]> {
        self.face_areas.as_ref()
    }

    #[inline]
    pub fn face_areas_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.face_areas.as_mut()
    }

    #[inline]
    pub fn multi_sigma_box(&self) -> &MultiSigmaBox {
        &self.sigba
    }

    /// Every persisted array with its checkpoint name.
    pub(crate) fn named_fields(&self) -> Vec<(&'static str, &MultiField)> {
        let mut out: Vec<(&'static str, &MultiField)> = Vec::new();
        out.extend(E_NAMES.into_iter().zip(self.e.iter()));
        out.extend(B_NAMES.into_iter().zip(self.b.iter()));
        out.extend(J_NAMES.into_iter().zip(self.j.iter()));
        if let Some(f) = &self.f {
            out.push(("F", f));
        }
        if let Some(g) = &self.g {
            out.push(("G", g));
        }
        out
    }

    pub(crate) fn named_fields_mut(&mut self) -> Vec<(&'static str, &mut MultiField)> {
        let mut out: Vec<(&'static str, &mut MultiField)> = Vec::new();
        out.extend(E_NAMES.into_iter().zip(self.e.iter_mut()));
        out.extend(B_NAMES.into_iter().zip(self.b.iter_mut()));
        out.extend(J_NAMES.into_iter().zip(self.j.iter_mut()));
        if let Some(f) = &mut self.f {
            out.push(("F", f));
        }
        if let Some(g) = &mut self.g {
            out.push(("G", g));
        }
        out
    }
}

impl std::fmt::Debug for PmlPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PmlPatch")
            .field("boxes", &self.ba.len())
            .field("points", &self.ba.num_pts())
            .field("e_ncomp", &self.e[0].ncomp())
            .field("b_ncomp", &self.b[0].ncomp())
            .field("cleaning", &(self.f.is_some(), self.g.is_some()))
            .finish()
    }
}
