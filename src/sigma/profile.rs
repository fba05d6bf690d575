use crate::Real;

/// Damping rate `depth` cells into the absorbing layer.
///
/// Grades as a cubic from zero at the interface to `v_sigma` at
/// `depth == delta - 1` and stays saturated beyond. A zero `delta` disables
/// damping entirely.
#[inline]
pub fn ramp(depth: Real, delta: i64, v_sigma: Real) -> Real {
    if delta <= 0 || depth <= 0.0 {
        return 0.0;
    }
    let width = (delta - 1) as Real;
    if depth >= width {
        v_sigma
    } else {
        v_sigma * (depth / width).powi(3)
    }
}

/// Integral of [`ramp`] over `[0, depth]`, in cells.
#[inline]
pub fn ramp_integral(depth: Real, delta: i64, v_sigma: Real) -> Real {
    if delta <= 0 || depth <= 0.0 {
        return 0.0;
    }
    let width = (delta - 1) as Real;
    if depth >= width {
        v_sigma * (0.25 * width + (depth - width))
    } else {
        0.25 * v_sigma * width * (depth / width).powi(4)
    }
}
