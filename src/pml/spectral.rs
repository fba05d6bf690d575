use crate::field::MultiField;
use crate::mesh::{BoxArray, DistributionMapping, IntVect, SPACEDIM};
use crate::pml::{GridType, PatchType, Pml};
use crate::sigma::MultiSigmaBox;
use crate::{Error, Real};

/// Order of the spectral time integration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SolutionType {
    #[default]
    FirstOrder,
    SecondOrder,
}

/// Assumed time dependence of the current or charge over one step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TimeDependence {
    #[default]
    Constant,
    Linear,
    Quadratic,
}

/// Describes the spectral push of an absorbing layer.
#[derive(Copy, Clone)]
pub struct SpectralPmlDescriptor<'a> {
    /// Spectral stencil order along each axis.
    pub order: IntVect,
    pub solution_type: SolutionType,
    /// Time dependence of the current within a step.
    pub j_in_time: TimeDependence,
    /// Time dependence of the charge within a step.
    pub rho_in_time: TimeDependence,
    /// Creates one solver per patch.
    pub builder: &'a dyn SpectralSolverBuilder,
}

/// Everything a spectral solver needs to set itself up over one patch.
#[derive(Clone, Debug)]
pub struct SpectralSolverSpec {
    pub level: usize,
    pub patch: PatchType,
    /// Cell-centered absorbing boxes grown by the field guard width.
    pub realspace_ba: BoxArray,
    pub dm: DistributionMapping,
    pub cell_size: [Real; SPACEDIM],
    pub dt: Real,
    pub order: IntVect,
    pub grid_type: GridType,
    pub solution_type: SolutionType,
    pub j_in_time: TimeDependence,
    pub rho_in_time: TimeDependence,
    pub dive_cleaning: bool,
    pub divb_cleaning: bool,
}

/// Split fields of one patch handed to a spectral push.
pub struct SpectralFields<'a> {
    pub e: &'a mut [MultiField; 3],
    pub b: &'a mut [MultiField; 3],
    pub j: &'a [MultiField; 3],
    pub f: Option<&'a mut MultiField>,
    pub g: Option<&'a mut MultiField>,
    /// Damping profiles and factors of the patch.
    pub sigma: &'a MultiSigmaBox,
}

/// Advances the split fields of an absorbing patch in spectral space.
pub trait SpectralSolver: Send + Sync {
    /// Pushes the fields by one step, leaving `fill_guards` guard cells updated.
    fn push(&mut self, level: usize, fields: SpectralFields<'_>, fill_guards: IntVect) -> Result<(), Error>;
}

/// Creates spectral solvers for absorbing patches.
pub trait SpectralSolverBuilder {
    fn build(&self, spec: &SpectralSolverSpec) -> Result<Box<dyn SpectralSolver>, Error>;
}

/// Guard width a spectral stencil of `order` needs on each active axis.
pub(crate) fn stencil_guards(dims: usize, order: IntVect, grid_type: GridType) -> Result<IntVect, Error> {
    if dims < 2 {
        return Err(Error::UnsupportedSpectral {
            reason: "spectral PML is not implemented in 1-D".to_string(),
        });
    }
    let mut ng = IntVect::zero();
    for d in 0..dims {
        if order[d] <= 0 {
            return Err(Error::UnsupportedSpectral {
                reason: format!("spectral order {} along axis {}", order[d], d),
            });
        }
        ng[d] = match grid_type {
            GridType::Collocated => order[d],
            GridType::Staggered => order[d] / 2,
        };
    }
    Ok(ng)
}

impl Pml {
    /// Advances the fine patch and, when present, the coarse patch with their
    /// spectral solvers, then fills the guard cells of E, B, F and G.
    ///
    /// The solvers are pushed at the refinement level the layer was built for.
    pub fn push_psatd(&mut self) -> Result<(), Error> {
        if !self.ok {
            return Err(Error::InvalidPml);
        }
        let level = self.level;
        let fill_guards = self.params.fill_guards_fields;
        for patch in [self.fine.as_mut(), self.coarse.as_mut()].into_iter().flatten() {
            let Some(solver) = patch.spectral.as_mut() else {
                continue;
            };
            let fields = SpectralFields {
                e: &mut patch.e,
                b: &mut patch.b,
                j: &patch.j,
                f: patch.f.as_mut(),
                g: patch.g.as_mut(),
                sigma: &patch.sigba,
            };
            solver.push(level, fields, fill_guards)?;
        }
        for which in [PatchType::Fine, PatchType::Coarse] {
            self.fill_boundary_e(which, None)?;
            self.fill_boundary_b(which, None)?;
            self.fill_boundary_f(which, None)?;
            self.fill_boundary_g(which, None)?;
        }
        Ok(())
    }

    /// Whether a spectral solver is attached to `patch`.
    pub fn has_spectral_solver(&self, patch: PatchType) -> bool {
        self.patch(patch).map_or(false, |p| p.spectral.is_some())
    }
}
