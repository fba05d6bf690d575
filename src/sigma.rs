//! Damping-coefficient profiles of the absorbing layer.

mod multi_sigma_box;
mod profile;
mod sigma_box;

pub use multi_sigma_box::MultiSigmaBox;
pub use profile::{ramp, ramp_integral};
pub use sigma_box::{Sigma, SigmaBox, SigmaVect};
