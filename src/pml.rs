//! The absorbing layer of one refinement level.

mod checkpoint;
mod damping;
mod exchange;
pub mod layout;
mod patch;
#[cfg(feature = "psatd")]
mod spectral;

use physical_constants::SPEED_OF_LIGHT_IN_VACUUM;

use crate::field::MultiField;
use crate::mesh::{BoxArray, DistributionMapping, Geometry, IntVect, SPACEDIM};
use crate::sigma::MultiSigmaBox;
use crate::{Error, Real};

use layout::PmlLayout;
use patch::Guards;

pub use exchange::{copy_to_pml, exchange, CopyPolicy};
pub use patch::PmlPatch;
#[cfg(feature = "psatd")]
pub use spectral::{
    SolutionType, SpectralFields, SpectralPmlDescriptor, SpectralSolver, SpectralSolverBuilder,
    SpectralSolverSpec, TimeDependence,
};

/// Staggering of the field arrays.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GridType {
    /// Yee staggering: E_d on the edges along d, B_d on the faces normal to d.
    #[default]
    Staggered,
    /// Every component on the nodes.
    Collocated,
}

/// Selects the fine or the coarse representation of a level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatchType {
    Fine,
    Coarse,
}

/// Absorbing layer specific parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PmlParameters {
    /// Thickness of the layer in cells.
    pub ncell: i64,
    /// Width of the damping ramp in cells.
    pub delta: i64,
    /// Maximum damping rate. Zero or less selects `4 c / min(dx)`.
    pub v_sigma: Real,
    /// Place each absorbing box on the rank owning the interior box next to it.
    pub similar_dm: bool,
    pub grid_type: GridType,
    /// Direction of a moving window, if any.
    pub moving_window_dir: Option<usize>,
    /// Whether particles deposit current inside the layer.
    pub has_particles: bool,
    /// Whether the layer occupies the outer cells of the interior domain
    /// instead of surrounding it.
    pub in_domain: bool,
    pub dive_cleaning: bool,
    pub divb_cleaning: bool,
    /// Guard cells kept valid by a spectral push.
    pub fill_guards_fields: IntVect,
    /// Guard cells of the layer's current filled from the interior.
    pub fill_guards_current: IntVect,
    /// Guard width of the geometric factor arrays.
    pub max_guard_eb: i64,
    /// Allocate edge-length and face-area arrays.
    pub geometric_factors: bool,
    /// Absorb at the low end of each axis.
    pub do_pml_lo: [bool; SPACEDIM],
    /// Absorb at the high end of each axis.
    pub do_pml_hi: [bool; SPACEDIM],
}

impl Default for PmlParameters {
    fn default() -> Self {
        Self {
            ncell: 10,
            delta: 10,
            v_sigma: 0.0,
            similar_dm: true,
            grid_type: GridType::Staggered,
            moving_window_dir: None,
            has_particles: false,
            in_domain: false,
            dive_cleaning: false,
            divb_cleaning: false,
            fill_guards_fields: IntVect::zero(),
            fill_guards_current: IntVect::zero(),
            max_guard_eb: 0,
            geometric_factors: false,
            do_pml_lo: [true; SPACEDIM],
            do_pml_hi: [true; SPACEDIM],
        }
    }
}

/// Describes the absorbing layer of one level.
pub struct PmlDescriptor<'a> {
    /// Refinement level the layer belongs to.
    pub level: usize,
    /// Interior grids of the level.
    pub grids: &'a BoxArray,
    /// Distribution of the interior grids.
    pub dm: &'a DistributionMapping,
    /// Geometry of the level.
    pub geom: &'a Geometry,
    /// Geometry of the next coarser level. Requests a coarse patch.
    pub cgeom: Option<&'a Geometry>,
    /// Refinement ratio to the coarser level.
    pub ref_ratio: IntVect,
    /// Time step of the level.
    pub dt: Real,
    pub params: PmlParameters,
}

/// The absorbing layer of one refinement level.
///
/// An empty configuration produces a layer whose [`ok`](Pml::ok) is false;
/// every other operation on it fails with [`Error::InvalidPml`]. Damping
/// factors must be computed with [`compute_pml_factors`](Pml::compute_pml_factors)
/// before the first [`damp`](Pml::damp).
#[derive(Debug)]
pub struct Pml {
    ok: bool,
    level: usize,
    dt: Real,
    params: PmlParameters,
    fine: Option<PmlPatch>,
    coarse: Option<PmlPatch>,
}

impl Pml {
    /// Builds the layer for a finite-difference interior solver.
    pub fn new(desc: PmlDescriptor) -> Result<Self, Error> {
        Self::build(desc, None)
    }

    /// Builds the layer with a spectral solver attached to each patch.
    #[cfg(feature = "psatd")]
    pub fn new_spectral(desc: PmlDescriptor, spectral: SpectralPmlDescriptor) -> Result<Self, Error> {
        let stencil = spectral::stencil_guards(desc.geom.dims(), spectral.order, desc.params.grid_type)?;
        let mut pml = Self::build(desc, Some(stencil))?;
        if !pml.ok {
            return Ok(pml);
        }

        let level = pml.level;
        let dt = pml.dt;
        let params = pml.params;
        for (which, patch) in [(PatchType::Fine, pml.fine.as_mut()), (PatchType::Coarse, pml.coarse.as_mut())] {
            let Some(patch) = patch else {
                continue;
            };
            let ng = patch.e[0].n_grow();
            let spec = SpectralSolverSpec {
                level,
                patch: which,
                realspace_ba: patch.ba.grow_each(ng),
                dm: patch.dm.clone(),
                cell_size: patch.geom.cell_size(),
                dt,
                order: spectral.order,
                grid_type: params.grid_type,
                solution_type: spectral.solution_type,
                j_in_time: spectral.j_in_time,
                rho_in_time: spectral.rho_in_time,
                dive_cleaning: params.dive_cleaning,
                divb_cleaning: params.divb_cleaning,
            };
            patch.spectral = Some(spectral.builder.build(&spec)?);
        }
        Ok(pml)
    }

    fn build(desc: PmlDescriptor, stencil: Option<IntVect>) -> Result<Self, Error> {
        let geom = desc.geom;
        let dims = geom.dims();
        let mut params = desc.params;
        for d in 0..SPACEDIM {
            let active = d < dims && !geom.is_periodic(d);
            params.do_pml_lo[d] &= active;
            params.do_pml_hi[d] &= active;
        }
        if params.v_sigma <= 0.0 {
            params.v_sigma = 4.0 * SPEED_OF_LIGHT_IN_VACUUM / geom.min_cell_size();
        }

        let mut pml = Self {
            ok: false,
            level: desc.level,
            dt: desc.dt,
            params,
            fine: None,
            coarse: None,
        };

        let any_side = (0..SPACEDIM).any(|d| params.do_pml_lo[d] || params.do_pml_hi[d]);
        if !any_side || params.ncell <= 0 || params.delta <= 0 {
            log::info!(
                "PML on level {} disabled (ncell = {}, delta = {}, absorbing sides: {})",
                desc.level,
                params.ncell,
                params.delta,
                any_side
            );
            return Ok(pml);
        }
        if params.moving_window_dir.is_some() && desc.level > 1 {
            return Err(Error::UnsupportedMovingWindow { level: desc.level });
        }

        let ncell = IntVect::active(dims, params.ncell);
        let delta = IntVect::active(dims, params.delta);
        let layout = PmlLayout::build(
            geom,
            desc.grids,
            ncell,
            params.in_domain,
            params.do_pml_lo,
            params.do_pml_hi,
        )?;
        if layout.ba.is_empty() {
            log::info!("PML on level {} covers no cells", desc.level);
            return Ok(pml);
        }

        let mut guards = Guards {
            e: IntVect::active(dims, 2),
            b: IntVect::active(dims, 2),
            f: IntVect::active(dims, 1),
        };
        if let Some(dir) = params.moving_window_dir.filter(|&d| d < dims) {
            for ng in [&mut guards.e, &mut guards.b, &mut guards.f] {
                ng[dir] = ng[dir].max(desc.ref_ratio[dir]);
            }
        }
        if let Some(stencil) = stencil {
            let ng = stencil.elementwise_max(guards.max());
            guards = Guards { e: ng, b: ng, f: ng };
        }

        let dm = distribute(&layout.ba, desc.grids, desc.dm, guards.max(), params.similar_dm);
        let fine = PmlPatch::new(geom.clone(), &layout, dm, ncell, delta, params.v_sigma, guards, &params);
        log::info!(
            "PML on level {}: {} boxes, {} cells, {} layout, E/B guards {:?}/{:?}",
            desc.level,
            fine.ba.len(),
            fine.ba.num_pts(),
            if layout.regular_domain.is_some() { "single-box" } else { "multi-box" },
            guards.e.0,
            guards.b.0,
        );
        pml.fine = Some(fine);
        pml.ok = true;

        if let Some(cgeom) = desc.cgeom {
            let cgrids = desc.grids.coarsen(desc.ref_ratio);
            let cncell = ncell.div_floor(desc.ref_ratio);
            let cdelta = delta.div_floor(desc.ref_ratio);
            let clayout = PmlLayout::build(
                cgeom,
                &cgrids,
                cncell,
                params.in_domain,
                params.do_pml_lo,
                params.do_pml_hi,
            )?;
            if clayout.ba.is_empty() {
                log::warn!("coarse PML patch on level {} covers no cells", desc.level);
            } else {
                if stencil.is_none() {
                    guards.e = IntVect::active(dims, 1);
                    guards.b = IntVect::active(dims, 1);
                }
                let cdm = distribute(&clayout.ba, &cgrids, desc.dm, guards.max(), params.similar_dm);
                let coarse = PmlPatch::new(
                    cgeom.clone(),
                    &clayout,
                    cdm,
                    cncell,
                    cdelta,
                    params.v_sigma,
                    guards,
                    &params,
                );
                log::info!(
                    "coarse PML patch on level {}: {} boxes, {} cells",
                    desc.level,
                    coarse.ba.len(),
                    coarse.ba.num_pts()
                );
                pml.coarse = Some(coarse);
            }
        }

        Ok(pml)
    }

    /// Whether the layer covers any cells. Nothing else may be called otherwise.
    #[inline]
    pub fn ok(&self) -> bool {
        self.ok
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Effective parameters: periodic and inactive axes disabled, `v_sigma` resolved.
    #[inline]
    pub fn params(&self) -> &PmlParameters {
        &self.params
    }

    #[inline]
    pub fn has_coarse_patch(&self) -> bool {
        self.coarse.is_some()
    }

    /// The requested patch, if the layer has it.
    pub fn patch(&self, which: PatchType) -> Option<&PmlPatch> {
        match which {
            PatchType::Fine => self.fine.as_ref(),
            PatchType::Coarse => self.coarse.as_ref(),
        }
    }

    pub fn patch_mut(&mut self, which: PatchType) -> Option<&mut PmlPatch> {
        match which {
            PatchType::Fine => self.fine.as_mut(),
            PatchType::Coarse => self.coarse.as_mut(),
        }
    }

    /// Like `patch_mut`, failing on an invalid layer.
    pub(crate) fn checked_patch_mut(&mut self, which: PatchType) -> Result<Option<&mut PmlPatch>, Error> {
        if !self.ok {
            return Err(Error::InvalidPml);
        }
        Ok(self.patch_mut(which))
    }

    pub fn e_fp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.fine.as_mut().map(PmlPatch::e_mut)
    }

    pub fn b_fp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.fine.as_mut().map(PmlPatch::b_mut)
    }

    pub fn j_fp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.fine.as_mut().map(PmlPatch::j_mut)
    }

    pub fn e_cp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.coarse.as_mut().map(PmlPatch::e_mut)
    }

    pub fn b_cp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.coarse.as_mut().map(PmlPatch::b_mut)
    }

    pub fn j_cp_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.coarse.as_mut().map(PmlPatch::j_mut)
    }

    pub fn f_fp_mut(&mut self) -> Option<&mut MultiField> {
        self.fine.as_mut().and_then(PmlPatch::f_mut)
    }

    pub fn f_cp_mut(&mut self) -> Option<&mut MultiField> {
        self.coarse.as_mut().and_then(PmlPatch::f_mut)
    }

    pub fn g_fp_mut(&mut self) -> Option<&mut MultiField> {
        self.fine.as_mut().and_then(PmlPatch::g_mut)
    }

    pub fn g_cp_mut(&mut self) -> Option<&mut MultiField> {
        self.coarse.as_mut().and_then(PmlPatch::g_mut)
    }

    pub fn edge_lengths_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.fine.as_mut().and_then(PmlPatch::edge_lengths_mut)
    }

    pub fn face_areas_mut(&mut self) -> Option<&mut [MultiField; 3]> {
        self.fine.as_mut().and_then(PmlPatch::face_areas_mut)
    }

    pub fn multi_sigma_box_fp(&self) -> Option<&MultiSigmaBox> {
        self.fine.as_ref().map(PmlPatch::multi_sigma_box)
    }

    pub fn multi_sigma_box_cp(&self) -> Option<&MultiSigmaBox> {
        self.coarse.as_ref().map(PmlPatch::multi_sigma_box)
    }

    /// Cell-centered absorbing boxes of the fine patch.
    pub fn box_array(&self) -> Option<&BoxArray> {
        self.fine.as_ref().map(PmlPatch::box_array)
    }

    pub fn distribution_map(&self) -> Option<&DistributionMapping> {
        self.fine.as_ref().map(PmlPatch::distribution_map)
    }

    /// Converts the damping profiles of every patch into factors for `dt`.
    ///
    /// Kinds whose factors were last computed with a bit-identical `dt` are
    /// left untouched.
    pub fn compute_pml_factors(&mut self, dt: Real) -> Result<(), Error> {
        if !self.ok {
            return Err(Error::InvalidPml);
        }
        self.dt = dt;
        for patch in [self.fine.as_mut(), self.coarse.as_mut()].into_iter().flatten() {
            let dx = patch.geom.cell_size();
            patch.sigba.compute_pml_factors_b(&dx, dt);
            patch.sigba.compute_pml_factors_e(&dx, dt);
        }
        Ok(())
    }

    /// Whether every patch holds factors computed for exactly `dt`.
    pub fn factors_current(&self, dt: Real) -> bool {
        [self.fine.as_ref(), self.coarse.as_ref()]
            .into_iter()
            .flatten()
            .all(|p| p.sigba.is_current(dt))
    }

    pub fn fill_boundary_e(&mut self, which: PatchType, nodal_sync: Option<bool>) -> Result<(), Error> {
        if let Some(p) = self.checked_patch_mut(which)? {
            fill_boundary_all(&mut p.e, &p.geom, nodal_sync);
        }
        Ok(())
    }

    pub fn fill_boundary_b(&mut self, which: PatchType, nodal_sync: Option<bool>) -> Result<(), Error> {
        if let Some(p) = self.checked_patch_mut(which)? {
            fill_boundary_all(&mut p.b, &p.geom, nodal_sync);
        }
        Ok(())
    }

    /// A no-op without electric divergence cleaning.
    pub fn fill_boundary_f(&mut self, which: PatchType, nodal_sync: Option<bool>) -> Result<(), Error> {
        if let Some(p) = self.checked_patch_mut(which)? {
            if let Some(f) = p.f.as_mut() {
                fill_boundary_all(std::slice::from_mut(f), &p.geom, nodal_sync);
            }
        }
        Ok(())
    }

    /// A no-op without magnetic divergence cleaning.
    pub fn fill_boundary_g(&mut self, which: PatchType, nodal_sync: Option<bool>) -> Result<(), Error> {
        if let Some(p) = self.checked_patch_mut(which)? {
            if let Some(g) = p.g.as_mut() {
                fill_boundary_all(std::slice::from_mut(g), &p.geom, nodal_sync);
            }
        }
        Ok(())
    }
}

fn fill_boundary_all(fields: &mut [MultiField], geom: &Geometry, nodal_sync: Option<bool>) {
    let period = geom.periodicity();
    let nodal_sync = nodal_sync.unwrap_or(false);
    for mf in fields {
        mf.fill_boundary(&period, nodal_sync);
    }
}

fn distribute(
    ba: &BoxArray,
    grids: &BoxArray,
    grid_dm: &DistributionMapping,
    ng: IntVect,
    similar: bool,
) -> DistributionMapping {
    if similar {
        DistributionMapping::make_similar(ba, grids, grid_dm, ng)
    } else {
        DistributionMapping::knapsack(ba, grid_dm.nprocs())
    }
}
