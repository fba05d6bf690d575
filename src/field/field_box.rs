use std::ops::Range;

use ndarray::{s, Array4, ArrayView4, ArrayViewMut4};

use crate::mesh::{IndexBox, IntVect, SPACEDIM};
use crate::Real;

/// Field data of a single box, including its guard cells.
///
/// Data is stored component-major: `data[[comp, i, j, k]]`.
#[derive(Clone, Debug)]
pub struct FieldBox {
    valid: IndexBox,
    bx: IndexBox,
    data: Array4<Real>,
}

impl FieldBox {
    /// Creates a zero-filled box over `valid` grown by `ngrow`.
    pub fn new(valid: IndexBox, ngrow: IntVect, ncomp: usize) -> Self {
        let bx = valid.grow(ngrow);
        let size = bx.size();
        let data = Array4::zeros((ncomp, size[0] as usize, size[1] as usize, size[2] as usize));
        Self { valid, bx, data }
    }

    #[inline]
    pub fn valid_box(&self) -> IndexBox {
        self.valid
    }

    /// The valid box grown by the guard width.
    #[inline]
    pub fn fab_box(&self) -> IndexBox {
        self.bx
    }

    #[inline]
    pub fn ncomp(&self) -> usize {
        self.data.shape()[0]
    }

    #[inline]
    pub fn data(&self) -> &Array4<Real> {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut Array4<Real> {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, iv: IntVect, comp: usize) -> Real {
        let [i, j, k] = self.offset(iv);
        self.data[[comp, i, j, k]]
    }

    #[inline]
    pub fn set(&mut self, iv: IntVect, comp: usize, value: Real) {
        let [i, j, k] = self.offset(iv);
        self.data[[comp, i, j, k]] = value;
    }

    /// Components `comps` over `region`, which must lie inside `fab_box()`.
    pub fn view(&self, comps: Range<usize>, region: &IndexBox) -> ArrayView4<'_, Real> {
        let [x, y, z] = self.ranges(region);
        self.data.slice(s![comps, x, y, z])
    }

    pub fn view_mut(&mut self, comps: Range<usize>, region: &IndexBox) -> ArrayViewMut4<'_, Real> {
        let [x, y, z] = self.ranges(region);
        self.data.slice_mut(s![comps, x, y, z])
    }

    pub fn fill(&mut self, value: Real, comps: Range<usize>, region: &IndexBox) {
        let region = region.intersect(&self.bx);
        if region.ok() {
            self.view_mut(comps, &region).fill(value);
        }
    }

    #[inline]
    fn offset(&self, iv: IntVect) -> [usize; SPACEDIM] {
        debug_assert!(self.bx.contains_point(iv), "{:?} outside {:?}", iv, self.bx);
        std::array::from_fn(|d| (iv[d] - self.bx.lo()[d]) as usize)
    }

    fn ranges(&self, region: &IndexBox) -> [Range<usize>; SPACEDIM] {
        debug_assert!(self.bx.contains(region), "{:?} outside {:?}", region, self.bx);
        std::array::from_fn(|d| {
            let start = (region.lo()[d] - self.bx.lo()[d]) as usize;
            start..start + region.length(d) as usize
        })
    }
}
