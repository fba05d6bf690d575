//! A perfectly matched layer (PML) absorbing boundary for box-structured
//! electromagnetic field solvers.
//!
//! The layer surrounds the interior grids of one refinement level, holds
//! split-field copies of E, B and the current, and damps them with graded
//! per-axis coefficients. The interior solver drives it each step through
//! [`Pml::exchange_e`], [`Pml::damp`] and friends.
//!
//! To get started, refer to the `demos` directory in the main repository.

pub mod field;
pub mod mesh;
pub mod pml;
pub mod prelude;
pub mod sigma;

pub use pml::{
    CopyPolicy, GridType, Pml, PmlDescriptor, PmlParameters, PmlPatch, PatchType,
};
#[cfg(feature = "psatd")]
pub use pml::{
    SpectralFields, SpectralPmlDescriptor, SpectralSolver, SpectralSolverBuilder,
    SpectralSolverSpec, SolutionType, TimeDependence,
};

/// Floating point type of all field and coefficient data.
pub type Real = f64;

/// Represents an error raised by the absorbing layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Inconsistent PML box layout: {reason}")]
    InconsistentLayout { reason: String },
    #[error("Spectral PML is not supported here: {reason}")]
    UnsupportedSpectral { reason: String },
    #[error("Moving window PML is only supported on levels 0 and 1 (requested on level {level})")]
    UnsupportedMovingWindow { level: usize },
    #[error("{field} exchange requested, but divergence cleaning of {field} is disabled")]
    CleaningDisabled { field: &'static str },
    #[error("Cannot copy between arrays of different staggering \
        ( destination: {dst:?}, source: {src:?} )")]
    IndexTypeMismatch {
        dst: mesh::IndexType,
        src: mesh::IndexType,
    },
    #[error("Field layouts do not match: {reason}")]
    LayoutMismatch { reason: String },
    #[error("Checkpointed {array_name} array does not have expected shape \
        ( {array_name} array shape: {input_shape:?}, \
        expected shape: {expected_shape:?} )")]
    BadInit {
        array_name: String,
        input_shape: Vec<usize>,
        expected_shape: Vec<usize>,
    },
    #[error("PML damping requested before the damping factors were computed")]
    StaleFactors,
    #[error("Operation invoked on an empty (invalid) PML")]
    InvalidPml,
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}
