//! Box layouts of the absorbing region around an interior grid.

use crate::mesh::{BoxArray, Geometry, IndexBox, IntVect, SPACEDIM};
use crate::Error;

/// Absorbing layout of one patch together with the interior it was derived from.
#[derive(Clone, Debug)]
pub(crate) struct PmlLayout {
    /// Boxes of the absorbing region.
    pub ba: BoxArray,
    /// Interior grids, shrunk away from enabled edges for in-domain layers.
    pub grids: BoxArray,
    /// The interior when it is a single box.
    pub regular_domain: Option<IndexBox>,
}

impl PmlLayout {
    pub fn build(
        geom: &Geometry,
        grids: &BoxArray,
        ncell: IntVect,
        in_domain: bool,
        do_lo: [bool; SPACEDIM],
        do_hi: [bool; SPACEDIM],
    ) -> Result<Self, Error> {
        let grids = if in_domain {
            reduce_grids(grids, ncell, do_lo, do_hi)?
        } else {
            grids.clone()
        };
        let domain = grids.minimal_box();
        let single = domain.num_pts() == grids.num_pts();
        let ba = make_box_array(single, &domain, geom, &grids, ncell, in_domain, do_lo, do_hi)?;
        Ok(Self {
            ba,
            grids,
            regular_domain: single.then_some(domain),
        })
    }
}

/// Builds the absorbing layout, as a neighbourhood of `regular_domain` when the
/// interior is the single box `regular_domain`, otherwise around each of `grids`.
#[allow(clippy::too_many_arguments)]
pub fn make_box_array(
    single_box: bool,
    regular_domain: &IndexBox,
    geom: &Geometry,
    grids: &BoxArray,
    ncell: IntVect,
    in_domain: bool,
    do_lo: [bool; SPACEDIM],
    do_hi: [bool; SPACEDIM],
) -> Result<BoxArray, Error> {
    if single_box {
        make_box_array_single(regular_domain, geom, ncell, in_domain, do_lo, do_hi)
    } else {
        make_box_array_multiple(geom, grids, ncell, in_domain, do_lo, do_hi)
    }
}

/// One box per face, edge and corner of `regular_domain`, skipping positions
/// on a disabled side.
///
/// Boxes are clipped to the problem domain grown by `ncell` on enabled sides,
/// or to the problem domain itself when the layer lives inside it.
pub fn make_box_array_single(
    regular_domain: &IndexBox,
    geom: &Geometry,
    ncell: IntVect,
    in_domain: bool,
    do_lo: [bool; SPACEDIM],
    do_hi: [bool; SPACEDIM],
) -> Result<BoxArray, Error> {
    if !regular_domain.ok() {
        return Err(Error::InconsistentLayout {
            reason: format!("interior domain {:?} has negative extents", regular_domain),
        });
    }
    let clip = if in_domain {
        geom.domain()
    } else {
        grow_enabled(geom.domain(), ncell, do_lo, do_hi)
    };
    let (dlo, dhi) = (regular_domain.lo(), regular_domain.hi());

    let mut boxes = Vec::new();
    for pos in neighbour_positions(geom.dims()) {
        let disabled = (0..SPACEDIM).any(|d| (pos[d] < 0 && !do_lo[d]) || (pos[d] > 0 && !do_hi[d]));
        if disabled {
            continue;
        }
        let (mut lo, mut hi) = (dlo, dhi);
        for d in 0..SPACEDIM {
            match pos[d] {
                -1 => {
                    lo[d] = dlo[d] - ncell[d];
                    hi[d] = dlo[d] - 1;
                }
                1 => {
                    lo[d] = dhi[d] + 1;
                    hi[d] = dhi[d] + ncell[d];
                }
                _ => {}
            }
        }
        let b = IndexBox::new(lo, hi).intersect(&clip);
        if b.ok() {
            boxes.push(b);
        }
    }
    Ok(BoxArray::new(boxes))
}

/// The cells within `ncell` of each grid, on enabled sides, not covered by any
/// grid, made disjoint.
pub fn make_box_array_multiple(
    geom: &Geometry,
    grids: &BoxArray,
    ncell: IntVect,
    in_domain: bool,
    do_lo: [bool; SPACEDIM],
    do_hi: [bool; SPACEDIM],
) -> Result<BoxArray, Error> {
    let domain = grow_enabled(geom.domain(), ncell, do_lo, do_hi);
    let positions = neighbour_positions(geom.dims());

    let mut boxes = Vec::new();
    for gb in grids.iter() {
        if !in_domain {
            for d in 0..geom.dims() {
                if (do_lo[d] || do_hi[d]) && gb.length(d) <= ncell[d] {
                    return Err(Error::InconsistentLayout {
                        reason: format!(
                            "grid box {:?} is not longer than ncell = {} along axis {}",
                            gb, ncell[d], d
                        ),
                    });
                }
            }
        }

        let bx = grow_enabled(*gb, ncell, do_lo, do_hi).intersect(&domain);
        let size = gb.size();
        let bndry: Vec<IndexBox> = positions
            .iter()
            .map(|&pos| gb.shift(size * pos).intersect(&bx))
            .filter(IndexBox::ok)
            .collect();

        for nc in grids.complement_in(&bx) {
            for b in &bndry {
                let piece = nc.intersect(b);
                if piece.ok() {
                    boxes.push(piece);
                }
            }
        }
    }
    Ok(BoxArray::new(boxes).remove_overlap())
}

/// Shrinks each grid box by `ncell` on every enabled side with no other grid
/// box across it.
pub(crate) fn reduce_grids(
    grids: &BoxArray,
    ncell: IntVect,
    do_lo: [bool; SPACEDIM],
    do_hi: [bool; SPACEDIM],
) -> Result<BoxArray, Error> {
    grids
        .iter()
        .map(|gb| {
            let mut b = *gb;
            for d in 0..SPACEDIM {
                if ncell[d] <= 0 {
                    continue;
                }
                if do_lo[d] && !grids.intersects(&gb.adj_cell_lo(d, 1)) {
                    b = b.grow_lo(d, -ncell[d]);
                }
                if do_hi[d] && !grids.intersects(&gb.adj_cell_hi(d, 1)) {
                    b = b.grow_hi(d, -ncell[d]);
                }
            }
            if b.ok() {
                Ok(b)
            } else {
                Err(Error::InconsistentLayout {
                    reason: format!("grid box {:?} vanishes inside a PML of {:?} cells", gb, ncell),
                })
            }
        })
        .collect()
}

fn grow_enabled(b: IndexBox, ncell: IntVect, do_lo: [bool; SPACEDIM], do_hi: [bool; SPACEDIM]) -> IndexBox {
    (0..SPACEDIM).fold(b, |b, d| {
        let b = if do_lo[d] { b.grow_lo(d, ncell[d]) } else { b };
        if do_hi[d] {
            b.grow_hi(d, ncell[d])
        } else {
            b
        }
    })
}

/// Relative positions of the 3^dims neighbourhood minus its centre, x fastest.
fn neighbour_positions(dims: usize) -> Vec<IntVect> {
    let span = |d: usize| if d < dims { -1..=1 } else { 0..=0 };
    let mut out = Vec::new();
    for k in span(2) {
        for j in span(1) {
            for i in span(0) {
                if (i, j, k) != (0, 0, 0) {
                    out.push(IntVect::new(i, j, k));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(lo: [i64; 3], hi: [i64; 3]) -> IndexBox {
        IndexBox::new(IntVect(lo), IntVect(hi))
    }

    fn geom_2d() -> Geometry {
        Geometry::new(2, bx([0, 0, 0], [63, 63, 0]), [1e-6, 1e-6, 1.0], [false; 3]).unwrap()
    }

    const ALL: [bool; 3] = [true, true, false];

    #[test]
    fn neighbourhood_sizes() {
        assert_eq!(neighbour_positions(1).len(), 2);
        assert_eq!(neighbour_positions(2).len(), 8);
        assert_eq!(neighbour_positions(3).len(), 26);
    }

    #[test]
    fn single_box_layout_surrounds_domain() {
        let geom = geom_2d();
        let ncell = IntVect::new(8, 8, 0);
        let ba = make_box_array_single(&geom.domain(), &geom, ncell, false, ALL, ALL).unwrap();
        assert_eq!(ba.len(), 8);
        assert_eq!(ba.get(0), &bx([-8, -8, 0], [-1, -1, 0]));
        assert_eq!(ba.get(4), &bx([64, 0, 0], [71, 63, 0]));
        assert_eq!(ba.num_pts(), 80 * 80 - 64 * 64);
    }

    #[test]
    fn in_domain_layout_stays_inside() {
        let geom = geom_2d();
        let ncell = IntVect::new(8, 8, 0);
        let layout = PmlLayout::build(&geom, &BoxArray::new(vec![geom.domain()]), ncell, true, ALL, ALL).unwrap();
        assert_eq!(layout.regular_domain, Some(bx([8, 8, 0], [55, 55, 0])));
        assert_eq!(layout.ba.len(), 8);
        assert!(layout.ba.iter().all(|b| geom.domain().contains(b)));
        assert_eq!(layout.ba.num_pts(), 64 * 64 - 48 * 48);
    }

    #[test]
    fn multiple_layout_covers_the_same_cells() {
        let geom = geom_2d();
        let ncell = IntVect::new(8, 8, 0);
        let grids = BoxArray::new(vec![
            bx([0, 0, 0], [31, 63, 0]),
            bx([32, 0, 0], [63, 63, 0]),
        ]);
        let ba = make_box_array_multiple(&geom, &grids, ncell, false, ALL, ALL).unwrap();
        assert_eq!(ba.num_pts(), 80 * 80 - 64 * 64);
        for (i, a) in ba.iter().enumerate() {
            assert!(!grids.intersects(a));
            for b in ba.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn multiple_layout_rejects_thin_grids() {
        let geom = geom_2d();
        let grids = BoxArray::new(vec![bx([0, 0, 0], [5, 63, 0]), bx([6, 0, 0], [63, 63, 0])]);
        let err = make_box_array_multiple(&geom, &grids, IntVect::new(8, 8, 0), false, ALL, ALL);
        assert!(matches!(err, Err(Error::InconsistentLayout { .. })));
    }

    #[test]
    fn reduction_keeps_internal_faces() {
        let grids = BoxArray::new(vec![bx([0, 0, 0], [31, 63, 0]), bx([32, 0, 0], [63, 63, 0])]);
        let reduced = reduce_grids(&grids, IntVect::new(8, 8, 0), ALL, ALL).unwrap();
        assert_eq!(reduced.get(0), &bx([8, 8, 0], [31, 55, 0]));
        assert_eq!(reduced.get(1), &bx([32, 8, 0], [55, 55, 0]));
    }
}
