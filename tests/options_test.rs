//! Integration tests for the optional parts of a layer: divergence cleaning,
//! particle current damping, geometric factors, moving windows and box placement.

use pmlayer::field::MultiField;
use pmlayer::mesh::{BoxArray, DistributionMapping, Geometry, IndexBox, IndexType, IntVect};
use pmlayer::{Error, GridType, PatchType, Pml, PmlDescriptor, PmlParameters, Real};

const DT: Real = 1e-16;

fn geom() -> Geometry {
    Geometry::new(
        2,
        IndexBox::new(IntVect::zero(), IntVect::new(31, 31, 0)),
        [1e-6, 1e-6, 1.0],
        [false; 3],
    )
    .unwrap()
}

fn build_with(level: usize, ref_ratio: IntVect, params: PmlParameters) -> Pml {
    let g = geom();
    let grids = BoxArray::new(vec![g.domain()]);
    let dm = DistributionMapping::single(1);
    Pml::new(PmlDescriptor {
        level,
        grids: &grids,
        dm: &dm,
        geom: &g,
        cgeom: None,
        ref_ratio,
        dt: DT,
        params,
    })
    .unwrap()
}

fn build(params: PmlParameters) -> Pml {
    build_with(0, IntVect::new(2, 2, 1), params)
}

fn params() -> PmlParameters {
    PmlParameters { ncell: 6, delta: 6, v_sigma: 2.0e15, ..Default::default() }
}

fn pattern(iv: IntVect) -> Real {
    1.0 + iv[0] as Real + 100.0 * iv[1] as Real
}

fn covered_by(ba: &BoxArray, iv: IntVect) -> bool {
    ba.iter().any(|b| b.contains_point(iv))
}

fn box_at(pml: &Pml, lo: IntVect) -> usize {
    pml.box_array()
        .unwrap()
        .iter()
        .position(|b| b.lo() == lo)
        .unwrap()
}

#[test]
fn magnetic_cleaning_field_follows_grid_type() {
    let pml = build(PmlParameters { divb_cleaning: true, ..params() });
    let fine = pml.patch(PatchType::Fine).unwrap();
    let g = fine.g().unwrap();
    assert_eq!(g.index_type(), IndexType::cell());
    assert_eq!(g.ncomp(), 3);
    assert_eq!(g.n_grow(), IntVect::new(1, 1, 0));
    assert_eq!(fine.b()[0].ncomp(), 3);
    assert_eq!(fine.e()[0].ncomp(), 2);
    assert!(fine.f().is_none());

    let pml = build(PmlParameters {
        divb_cleaning: true,
        grid_type: GridType::Collocated,
        ..params()
    });
    let fine = pml.patch(PatchType::Fine).unwrap();
    assert_eq!(fine.g().unwrap().index_type(), IndexType::node(2));
    for d in 0..3 {
        assert_eq!(fine.e()[d].index_type(), IndexType::node(2));
        assert_eq!(fine.b()[d].index_type(), IndexType::node(2));
    }
}

#[test]
fn magnetic_cleaning_exchange_round_trip() {
    let g = geom();
    let grids = BoxArray::new(vec![g.domain()]);
    let mut reg = MultiField::new(grids.clone(), DistributionMapping::single(1), 1, IntVect::new(1, 1, 0));
    reg.for_each_fab_mut(|_, fab| {
        for iv in fab.valid_box().points() {
            fab.set(iv, 0, pattern(iv));
        }
    });

    let mut without = build(params());
    assert!(matches!(
        without.exchange_g(PatchType::Fine, &mut reg),
        Err(Error::CleaningDisabled { field: "G" })
    ));

    let mut pml = build(PmlParameters { divb_cleaning: true, ..params() });
    let layer_g = pml.g_fp_mut().unwrap();
    for c in 0..3 {
        layer_g.set_val_comps(1.0 + c as Real, c, 1, IntVect::zero());
    }
    let layer_ba = layer_g.box_array().clone();
    pml.exchange_g(PatchType::Fine, &mut reg).unwrap();

    // interior guard cells over the layer hold the summed split field
    let fab = reg.fab(0);
    for iv in fab.fab_box().points() {
        if fab.valid_box().contains_point(iv) {
            assert_eq!(fab.get(iv, 0), pattern(iv));
        } else if covered_by(&layer_ba, iv) {
            assert_eq!(fab.get(iv, 0), 6.0);
        }
    }

    // layer guard cells over the interior hold the interior value, unsplit
    let layer_g = pml.g_fp_mut().unwrap();
    let mut checked = 0;
    for fab in layer_g.fabs() {
        for iv in fab.fab_box().points() {
            if covered_by(&grids, iv) {
                assert_eq!(fab.get(iv, 0), pattern(iv));
                assert_eq!(fab.get(iv, 1), 0.0);
                assert_eq!(fab.get(iv, 2), 0.0);
                checked += 1;
            } else if fab.valid_box().contains_point(iv) {
                assert_eq!(fab.get(iv, 2), 3.0);
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn magnetic_cleaning_guards_are_filled_across_layer_boxes() {
    let mut pml = build(PmlParameters { divb_cleaning: true, ..params() });
    pml.g_fp_mut().unwrap().for_each_fab_mut(|_, fab| {
        for iv in fab.valid_box().points() {
            for c in 0..3 {
                fab.set(iv, c, pattern(iv) + c as Real);
            }
        }
    });
    pml.fill_boundary_g(PatchType::Fine, None).unwrap();

    let east = box_at(&pml, IntVect::new(32, 0, 0));
    let g = pml.patch(PatchType::Fine).unwrap().g().unwrap();
    let fab = g.fab(east);
    // the guard row below the east slab lies in the south-east corner box
    let iv = IntVect::new(33, -1, 0);
    for c in 0..3 {
        assert_eq!(fab.get(iv, c), pattern(iv) + c as Real);
    }
    // guard cells over the interior have no layer source
    assert_eq!(fab.get(IntVect::new(31, 10, 0), 0), 0.0);
}

#[test]
fn cleaning_fields_are_damped_per_component_axis() {
    let mut pml = build(PmlParameters { dive_cleaning: true, divb_cleaning: true, ..params() });
    pml.f_fp_mut().unwrap().set_val(1.0);
    pml.g_fp_mut().unwrap().set_val(1.0);
    pml.compute_pml_factors(DT).unwrap();
    pml.damp(PatchType::Fine).unwrap();

    let east = box_at(&pml, IntVect::new(32, 0, 0));
    let sb = pml.multi_sigma_box_fp().unwrap().get(east).clone();
    let fine = pml.patch(PatchType::Fine).unwrap();

    // F is nodal: component c decays with sigma along axis c
    let f = fine.f().unwrap().fab(east);
    let iv = IntVect::new(37, 10, 0);
    assert_eq!(f.get(iv, 0), sb.sigma_fac()[0].get(37));
    assert!(f.get(iv, 0) < 1.0);
    assert_eq!(f.get(iv, 1), sb.sigma_fac()[1].get(10));
    assert_eq!(f.get(iv, 1), 1.0);
    assert_eq!(f.get(iv, 2), 1.0);
    // guard cells are not damped
    assert_eq!(f.get(IntVect::new(39, 10, 0), 0), 1.0);

    // G is cell-centered: component 0 decays with sigma_star along x
    let g = fine.g().unwrap().fab(east);
    let iv = IntVect::new(36, 10, 0);
    assert_eq!(g.get(iv, 0), sb.sigma_star_fac()[0].get(36));
    assert!(g.get(iv, 0) < 1.0);
    assert_eq!(g.get(iv, 1), 1.0);
}

#[test]
fn particle_current_is_damped_cumulatively() {
    let mut pml = build(params());
    for mf in pml.j_fp_mut().unwrap().iter_mut() {
        mf.set_val(1.0);
    }
    pml.compute_pml_factors(DT).unwrap();
    pml.damp(PatchType::Fine).unwrap();
    for mf in pml.j_fp_mut().unwrap().iter() {
        assert!(mf.fabs().iter().all(|fab| fab.data().iter().all(|&v| v == 1.0)));
    }

    let mut pml = build(PmlParameters { has_particles: true, ..params() });
    for mf in pml.j_fp_mut().unwrap().iter_mut() {
        mf.set_val(1.0);
    }
    pml.compute_pml_factors(DT).unwrap();
    pml.damp(PatchType::Fine).unwrap();

    let east = box_at(&pml, IntVect::new(32, 0, 0));
    let corner = box_at(&pml, IntVect::new(32, -6, 0));
    let msb = pml.multi_sigma_box_fp().unwrap().clone();
    let j = pml.patch(PatchType::Fine).unwrap().j();

    // jx: cell-centered along x, nodal along y
    let sb = msb.get(east);
    let jx = j[0].fab(east);
    let expected = sb.sigma_star_cumsum_fac()[0].get(35)
        * sb.sigma_cumsum_fac()[1].get(10)
        * sb.sigma_star_cumsum_fac()[2].get(0);
    assert_eq!(jx.get(IntVect::new(35, 10, 0), 0), expected);
    assert!(expected < 1.0);

    // jz: nodal along x and y, damped from both axes in the corner
    let sb = msb.get(corner);
    let jz = j[2].fab(corner);
    let expected = sb.sigma_cumsum_fac()[0].get(35)
        * sb.sigma_cumsum_fac()[1].get(-3)
        * sb.sigma_star_cumsum_fac()[2].get(0);
    assert_eq!(jz.get(IntVect::new(35, -3, 0), 0), expected);
    assert!(expected < sb.sigma_cumsum_fac()[0].get(35));
}

#[test]
fn geometric_factors_start_at_unity() {
    let mut pml = build(params());
    assert!(pml.edge_lengths_mut().is_none());
    assert!(pml.face_areas_mut().is_none());

    let mut pml = build(PmlParameters { geometric_factors: true, max_guard_eb: 3, ..params() });
    let e_types: Vec<IndexType> = pml.e_fp_mut().unwrap().iter().map(MultiField::index_type).collect();
    let b_types: Vec<IndexType> = pml.b_fp_mut().unwrap().iter().map(MultiField::index_type).collect();

    let edges = pml.edge_lengths_mut().unwrap();
    for (d, mf) in edges.iter().enumerate() {
        assert_eq!(mf.index_type(), e_types[d]);
        assert_eq!(mf.ncomp(), 1);
        assert_eq!(mf.n_grow(), IntVect::new(3, 3, 0));
        assert!(mf.fabs().iter().all(|fab| fab.data().iter().all(|&v| v == 1.0)));
    }
    let faces = pml.face_areas_mut().unwrap();
    for (d, mf) in faces.iter().enumerate() {
        assert_eq!(mf.index_type(), b_types[d]);
        assert!(mf.fabs().iter().all(|fab| fab.data().iter().all(|&v| v == 1.0)));
    }
}

#[test]
fn moving_window_widens_guards_along_its_direction() {
    let params = PmlParameters { moving_window_dir: Some(0), dive_cleaning: true, ..params() };
    for level in [0, 1] {
        let pml = build_with(level, IntVect::new(4, 2, 1), params);
        let fine = pml.patch(PatchType::Fine).unwrap();
        assert_eq!(fine.e()[0].n_grow(), IntVect::new(4, 2, 0));
        assert_eq!(fine.b()[1].n_grow(), IntVect::new(4, 2, 0));
        assert_eq!(fine.f().unwrap().n_grow(), IntVect::new(4, 1, 0));
    }

    let pml = build(params);
    assert_eq!(pml.patch(PatchType::Fine).unwrap().e()[0].n_grow(), IntVect::new(2, 2, 0));
}

#[test]
fn layer_boxes_are_placed_by_policy() {
    let g = geom();
    let grids = BoxArray::new(vec![
        IndexBox::new(IntVect::new(0, 0, 0), IntVect::new(15, 31, 0)),
        IndexBox::new(IntVect::new(16, 0, 0), IntVect::new(31, 31, 0)),
    ]);
    let dm = DistributionMapping::new(vec![0, 2], 3);
    let build_dm = |similar_dm: bool| {
        Pml::new(PmlDescriptor {
            level: 0,
            grids: &grids,
            dm: &dm,
            geom: &g,
            cgeom: None,
            ref_ratio: IntVect::new(2, 2, 1),
            dt: DT,
            params: PmlParameters { similar_dm, ..params() },
        })
        .unwrap()
    };

    let balanced = build_dm(false);
    let ba = balanced.box_array().unwrap();
    assert_eq!(balanced.distribution_map().unwrap(), &DistributionMapping::knapsack(ba, 3));

    let similar = build_dm(true);
    let ba = similar.box_array().unwrap();
    let expected = DistributionMapping::make_similar(ba, &grids, &dm, IntVect::new(2, 2, 0));
    assert_eq!(similar.distribution_map().unwrap(), &expected);
    // the west slab sits next to the grid on rank 0, the east slab next to rank 2
    let west = ba.iter().position(|b| b.lo() == IntVect::new(-6, 0, 0)).unwrap();
    let east = ba.iter().position(|b| b.lo() == IntVect::new(32, 0, 0)).unwrap();
    assert_eq!(similar.distribution_map().unwrap().rank(west), 0);
    assert_eq!(similar.distribution_map().unwrap().rank(east), 2);
}
