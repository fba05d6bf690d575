//! Index-space geometry consumed by the absorbing layer.
//!
//! Lower-dimensional problems keep the unused trailing axes at a single cell
//! (`lo == hi == 0`) and never grow or stagger along them.

mod box_array;
mod distribution;
mod geometry;
mod index_box;
mod int_vect;

pub use box_array::BoxArray;
pub use distribution::DistributionMapping;
pub use geometry::{Geometry, Periodicity};
pub use index_box::IndexBox;
pub use int_vect::{IndexType, IntVect};

/// Number of index axes stored for every box and field.
pub const SPACEDIM: usize = 3;
