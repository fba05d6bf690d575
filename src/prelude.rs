//! Includes commonly used library components.

pub use crate::field::{FieldBox, MultiField};
pub use crate::mesh::{BoxArray, DistributionMapping, Geometry, IndexBox, IndexType, IntVect};
pub use crate::sigma::{MultiSigmaBox, SigmaBox};
pub use crate::{
    CopyPolicy,
    Error,
    GridType,
    PatchType,
    Pml,
    PmlDescriptor,
    PmlParameters,
    Real,
};
#[cfg(feature = "psatd")]
pub use crate::{SpectralPmlDescriptor, SpectralSolver, SpectralSolverBuilder, SpectralSolverSpec};
