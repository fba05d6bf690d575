use ndarray::{Array4, Axis};
use rayon::prelude::*;

use crate::field::FieldBox;
use crate::mesh::{BoxArray, DistributionMapping, IndexBox, IndexType, IntVect, Periodicity};
use crate::{Error, Real};

/// A multi-component field distributed over the boxes of a `BoxArray`.
#[derive(Clone, Debug)]
pub struct MultiField {
    ba: BoxArray,
    dm: DistributionMapping,
    ncomp: usize,
    ngrow: IntVect,
    fabs: Vec<FieldBox>,
}

impl MultiField {
    /// Allocates a zero-initialized field.
    pub fn new(ba: BoxArray, dm: DistributionMapping, ncomp: usize, ngrow: IntVect) -> Self {
        debug_assert_eq!(ba.len(), dm.len());
        let fabs = ba.iter().map(|b| FieldBox::new(*b, ngrow, ncomp)).collect();
        Self { ba, dm, ncomp, ngrow, fabs }
    }

    #[inline]
    pub fn box_array(&self) -> &BoxArray {
        &self.ba
    }

    #[inline]
    pub fn distribution_map(&self) -> &DistributionMapping {
        &self.dm
    }

    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[inline]
    pub fn n_grow(&self) -> IntVect {
        self.ngrow
    }

    #[inline]
    pub fn index_type(&self) -> IndexType {
        self.ba.index_type()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fabs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fabs.is_empty()
    }

    #[inline]
    pub fn fab(&self, i: usize) -> &FieldBox {
        &self.fabs[i]
    }

    #[inline]
    pub fn fab_mut(&mut self, i: usize) -> &mut FieldBox {
        &mut self.fabs[i]
    }

    #[inline]
    pub fn fabs(&self) -> &[FieldBox] {
        &self.fabs
    }

    #[inline]
    pub fn fabs_mut(&mut self) -> &mut [FieldBox] {
        &mut self.fabs
    }

    /// Sets every component of every point, guard cells included.
    pub fn set_val(&mut self, value: Real) {
        self.fabs.par_iter_mut().for_each(|fab| fab.data_mut().fill(value));
    }

    /// Sets `ncomp` components starting at `comp` over valid cells grown by `ngrow`.
    pub fn set_val_comps(&mut self, value: Real, comp: usize, ncomp: usize, ngrow: IntVect) {
        let ngrow = ngrow.elementwise_min(self.ngrow);
        self.fabs.par_iter_mut().for_each(|fab| {
            let region = fab.valid_box().grow(ngrow);
            fab.fill(value, comp..comp + ncomp, &region);
        });
    }

    /// Copies components between two fields sharing the same box layout.
    pub fn copy_from(
        &mut self,
        src: &MultiField,
        scomp: usize,
        dcomp: usize,
        ncomp: usize,
        ngrow: IntVect,
    ) -> Result<(), Error> {
        if self.ba != src.ba {
            return Err(Error::LayoutMismatch {
                reason: "local copy between different box arrays".to_string(),
            });
        }
        let ngrow = ngrow.elementwise_min(self.ngrow).elementwise_min(src.ngrow);
        self.fabs
            .par_iter_mut()
            .zip(src.fabs.par_iter())
            .for_each(|(dst, from)| {
                let region = dst.valid_box().grow(ngrow);
                dst.view_mut(dcomp..dcomp + ncomp, &region)
                    .assign(&from.view(scomp..scomp + ncomp, &region));
            });
        Ok(())
    }

    /// Sum of all components over valid cells, as a single-component field
    /// without guard cells.
    pub fn sum_components(&self) -> MultiField {
        let mut total = MultiField::new(self.ba.clone(), self.dm.clone(), 1, IntVect::zero());
        total
            .fabs
            .par_iter_mut()
            .zip(self.fabs.par_iter())
            .for_each(|(dst, src)| {
                let region = dst.valid_box();
                let summed = src.view(0..self.ncomp, &region).sum_axis(Axis(0));
                dst.view_mut(0..1, &region)
                    .index_axis_move(Axis(0), 0)
                    .assign(&summed);
            });
        total
    }

    /// Copies `ncomp` components from `src` wherever the valid cells of `src`
    /// grown by `src_ng` meet the valid cells of `self` grown by `dst_ng`,
    /// including periodic images. The two fields may have unrelated layouts.
    #[allow(clippy::too_many_arguments)]
    pub fn parallel_copy(
        &mut self,
        src: &MultiField,
        scomp: usize,
        dcomp: usize,
        ncomp: usize,
        src_ng: IntVect,
        dst_ng: IntVect,
        period: &Periodicity,
    ) -> Result<(), Error> {
        if self.index_type() != src.index_type() && !self.is_empty() && !src.is_empty() {
            return Err(Error::IndexTypeMismatch {
                dst: self.index_type(),
                src: src.index_type(),
            });
        }
        let src_ng = src_ng.elementwise_min(src.ngrow);
        let dst_ng = dst_ng.elementwise_min(self.ngrow);
        let shifts = period.shifts();
        let src_regions: Vec<IndexBox> = src.fabs.iter().map(|f| f.valid_box().grow(src_ng)).collect();

        self.fabs.par_iter_mut().for_each(|dst| {
            let dst_region = dst.valid_box().grow(dst_ng);
            for (from, sreg) in src.fabs.iter().zip(&src_regions) {
                for &shift in &shifts {
                    let isect = dst_region.intersect(&sreg.shift(shift));
                    if !isect.ok() {
                        continue;
                    }
                    dst.view_mut(dcomp..dcomp + ncomp, &isect)
                        .assign(&from.view(scomp..scomp + ncomp, &isect.shift(-shift)));
                }
            }
        });
        Ok(())
    }

    /// Fills guard cells from the valid cells of neighbouring boxes and
    /// periodic images.
    ///
    /// With `nodal_sync`, points shared by several boxes (faces of nodal
    /// data) take the value held by the lowest-indexed box; for a box's own
    /// periodic image the lower face wins.
    pub fn fill_boundary(&mut self, period: &Periodicity, nodal_sync: bool) {
        if self.ngrow.max_elem() <= 0 && !nodal_sync {
            return;
        }
        let shifts = period.shifts();
        let valid: Vec<IndexBox> = self.fabs.iter().map(FieldBox::valid_box).collect();
        let ncomp = self.ncomp;
        let ngrow = self.ngrow;
        let fabs = &self.fabs;

        let patches: Vec<Vec<(IndexBox, Array4<Real>)>> = (0..fabs.len())
            .into_par_iter()
            .map(|i| {
                let mut out = Vec::new();
                let grown = valid[i].grow(ngrow);
                for (j, vj) in valid.iter().enumerate() {
                    for &shift in &shifts {
                        if i == j && shift == IntVect::zero() {
                            continue;
                        }
                        let isect = grown.intersect(&vj.shift(shift));
                        if !isect.ok() {
                            continue;
                        }
                        for ghost in isect.difference(&valid[i]) {
                            let data = fabs[j].view(0..ncomp, &ghost.shift(-shift)).to_owned();
                            out.push((ghost, data));
                        }
                    }
                }
                if nodal_sync {
                    // Highest owner first so the lowest one is written last.
                    for j in (0..=i).rev() {
                        for &shift in &shifts {
                            let owns = j < i || is_positive(shift);
                            if !owns {
                                continue;
                            }
                            let shared = valid[i].intersect(&valid[j].shift(shift));
                            if shared.ok() {
                                let data = fabs[j].view(0..ncomp, &shared.shift(-shift)).to_owned();
                                out.push((shared, data));
                            }
                        }
                    }
                }
                out
            })
            .collect();

        self.fabs
            .par_iter_mut()
            .zip(patches)
            .for_each(|(fab, patches)| {
                for (region, data) in patches {
                    fab.view_mut(0..ncomp, &region).assign(&data);
                }
            });
    }

    /// Largest magnitude of component `comp` over valid cells.
    pub fn max_abs(&self, comp: usize) -> Real {
        self.fabs
            .par_iter()
            .map(|fab| {
                fab.view(comp..comp + 1, &fab.valid_box())
                    .fold(0.0, |acc: Real, v| acc.max(v.abs()))
            })
            .reduce(|| 0.0, Real::max)
    }

    /// Applies `f` to each box and its index, in parallel.
    pub fn for_each_fab_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut FieldBox) + Sync + Send,
    {
        self.fabs
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, fab)| f(i, fab));
    }
}

/// First non-zero component is positive.
fn is_positive(shift: IntVect) -> bool {
    shift.0.iter().find(|&&s| s != 0).map_or(false, |&s| s > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(lo: [i64; 3], hi: [i64; 3]) -> IndexBox {
        IndexBox::new(IntVect(lo), IntVect(hi))
    }

    fn two_boxes(ngrow: i64) -> MultiField {
        let ba = BoxArray::new(vec![bx([0, 0, 0], [7, 7, 0]), bx([8, 0, 0], [15, 7, 0])]);
        let dm = DistributionMapping::single(ba.len());
        MultiField::new(ba, dm, 1, IntVect::new(ngrow, ngrow, 0))
    }

    fn fill_with_x(mf: &mut MultiField) {
        mf.for_each_fab_mut(|_, fab| {
            for iv in fab.valid_box().points() {
                fab.set(iv, 0, iv[0] as Real);
            }
        });
    }

    #[test]
    fn fill_boundary_takes_neighbour_values() {
        let mut mf = two_boxes(2);
        fill_with_x(&mut mf);
        mf.fill_boundary(&Periodicity::non_periodic(), false);
        assert_eq!(mf.fab(0).get(IntVect::new(9, 3, 0), 0), 9.0);
        assert_eq!(mf.fab(1).get(IntVect::new(6, 3, 0), 0), 6.0);
        // outside every box: untouched
        assert_eq!(mf.fab(0).get(IntVect::new(-1, 3, 0), 0), 0.0);
    }

    #[test]
    fn fill_boundary_wraps_periodic_images() {
        let mut mf = two_boxes(1);
        fill_with_x(&mut mf);
        let period = crate::mesh::Geometry::new(
            2,
            bx([0, 0, 0], [15, 7, 0]),
            [1.0; 3],
            [true, false, false],
        )
        .unwrap()
        .periodicity();
        mf.fill_boundary(&period, false);
        assert_eq!(mf.fab(0).get(IntVect::new(-1, 3, 0), 0), 15.0);
        assert_eq!(mf.fab(1).get(IntVect::new(16, 3, 0), 0), 0.0);
    }

    #[test]
    fn nodal_sync_prefers_lowest_box() {
        let itype = IndexType::nodal_along(2, &[0]);
        let ba = BoxArray::new(vec![bx([0, 0, 0], [7, 7, 0]), bx([8, 0, 0], [15, 7, 0])]).convert(itype);
        let dm = DistributionMapping::single(ba.len());
        let mut mf = MultiField::new(ba, dm, 1, IntVect::zero());
        mf.fab_mut(0).set(IntVect::new(8, 2, 0), 0, 1.0);
        mf.fab_mut(1).set(IntVect::new(8, 2, 0), 0, 2.0);

        mf.fill_boundary(&Periodicity::non_periodic(), false);
        assert_eq!(mf.fab(1).get(IntVect::new(8, 2, 0), 0), 2.0);

        mf.fill_boundary(&Periodicity::non_periodic(), true);
        assert_eq!(mf.fab(0).get(IntVect::new(8, 2, 0), 0), 1.0);
        assert_eq!(mf.fab(1).get(IntVect::new(8, 2, 0), 0), 1.0);
    }

    #[test]
    fn parallel_copy_between_layouts() {
        let mut src = two_boxes(0);
        fill_with_x(&mut src);
        let ba = BoxArray::new(vec![bx([4, 0, 0], [11, 7, 0])]);
        let mut dst = MultiField::new(ba, DistributionMapping::single(1), 1, IntVect::zero());
        dst.parallel_copy(&src, 0, 0, 1, IntVect::zero(), IntVect::zero(), &Periodicity::non_periodic())
            .unwrap();
        for iv in dst.fab(0).valid_box().points() {
            assert_eq!(dst.fab(0).get(iv, 0), iv[0] as Real);
        }
    }

    #[test]
    fn sum_components_adds_split_parts() {
        let ba = BoxArray::new(vec![bx([0, 0, 0], [3, 3, 0])]);
        let mut mf = MultiField::new(ba, DistributionMapping::single(1), 3, IntVect::splat(1));
        mf.set_val_comps(1.0, 0, 1, IntVect::zero());
        mf.set_val_comps(2.0, 1, 1, IntVect::zero());
        mf.set_val_comps(4.0, 2, 1, IntVect::zero());
        let total = mf.sum_components();
        assert_eq!(total.ncomp(), 1);
        assert_eq!(total.max_abs(0), 7.0);
        assert_eq!(total.fab(0).get(IntVect::new(2, 1, 0), 0), 7.0);
    }
}
