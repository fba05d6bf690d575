//! Integration tests for the damping profiles and their per-step factors.

use approx::assert_relative_eq;
use physical_constants::SPEED_OF_LIGHT_IN_VACUUM;
use pmlayer::mesh::{BoxArray, DistributionMapping, Geometry, IndexBox, IntVect, SPACEDIM};
use pmlayer::sigma::{MultiSigmaBox, SigmaVect};
use pmlayer::{Pml, PmlDescriptor, PmlParameters, Real};

const V_SIGMA: Real = 2.0e15;

fn geom() -> Geometry {
    Geometry::new(
        2,
        IndexBox::new(IntVect::zero(), IntVect::new(63, 63, 0)),
        [1e-6, 1e-6, 1.0],
        [false; 3],
    )
    .unwrap()
}

fn build_on(grids: &BoxArray, params: PmlParameters) -> Pml {
    let g = geom();
    let dm = DistributionMapping::single(grids.len());
    Pml::new(PmlDescriptor {
        level: 0,
        grids,
        dm: &dm,
        geom: &g,
        cgeom: None,
        ref_ratio: IntVect::new(2, 2, 1),
        dt: 1e-15,
        params,
    })
    .unwrap()
}

fn params() -> PmlParameters {
    PmlParameters { ncell: 8, delta: 8, v_sigma: V_SIGMA, ..Default::default() }
}

fn single_box() -> Pml {
    build_on(&BoxArray::new(vec![geom().domain()]), params())
}

/// Interior nodes along each axis are `0..=63 + 1`, interior cells `0..=63`.
fn assert_zero_inside(sigma: &SigmaVect, sigma_star: &SigmaVect, dims: usize) {
    for d in 0..dims {
        for i in sigma[d].lo()..sigma[d].hi() {
            if (0..=64).contains(&i) {
                assert_eq!(sigma[d].get(i), 0.0, "node {} along {}", i, d);
            }
            if (0..=63).contains(&i) {
                assert_eq!(sigma_star[d].get(i), 0.0, "cell {} along {}", i, d);
            }
        }
    }
}

#[test]
fn interior_is_undamped() {
    let pml = single_box();
    for sb in pml.multi_sigma_box_fp().unwrap().iter() {
        assert_zero_inside(sb.sigma(), sb.sigma_star(), 2);
        assert_zero_inside(sb.sigma_cumsum(), sb.sigma_star_cumsum(), 2);
    }
}

#[test]
fn ramp_rises_to_v_sigma() {
    let pml = single_box();
    let msb = pml.multi_sigma_box_fp().unwrap();
    let ba = pml.box_array().unwrap();
    let east = ba
        .iter()
        .position(|b| b == &IndexBox::new(IntVect::new(64, 0, 0), IntVect::new(71, 63, 0)))
        .unwrap();
    let sx = &msb.get(east).sigma()[0];

    assert_eq!(sx.get(64), 0.0);
    for i in 65..=72 {
        assert!(sx.get(i) >= sx.get(i - 1));
    }
    assert_relative_eq!(sx.get(64 + 7), V_SIGMA);
    assert_relative_eq!(sx.get(64 + 4), V_SIGMA * (4.0 / 7.0_f64).powi(3));

    let west = ba
        .iter()
        .position(|b| b == &IndexBox::new(IntVect::new(-8, 0, 0), IntVect::new(-1, 63, 0)))
        .unwrap();
    let wx = &msb.get(west).sigma()[0];
    for k in 0..=8 {
        assert_eq!(wx.get(-k), sx.get(64 + k));
    }
}

#[test]
fn values_are_non_negative_and_bounded() {
    let pml = single_box();
    for sb in pml.multi_sigma_box_fp().unwrap().iter() {
        for d in 0..SPACEDIM {
            for s in [&sb.sigma()[d], &sb.sigma_star()[d]] {
                assert_eq!(s.len() as i64, s.hi() - s.lo());
                assert!(s.values().iter().all(|&v| (0.0..=V_SIGMA).contains(&v)));
            }
        }
    }
}

#[test]
fn decomposed_interior_reproduces_single_profiles() {
    let halves = BoxArray::new(vec![
        IndexBox::new(IntVect::new(0, 0, 0), IntVect::new(63, 31, 0)),
        IndexBox::new(IntVect::new(0, 32, 0), IntVect::new(63, 63, 0)),
    ]);
    let split = build_on(&halves, params());
    let single = single_box();
    assert_eq!(split.box_array(), single.box_array());
    for (a, b) in split
        .multi_sigma_box_fp()
        .unwrap()
        .iter()
        .zip(single.multi_sigma_box_fp().unwrap().iter())
    {
        assert_eq!(a.sigma(), b.sigma());
        assert_eq!(a.sigma_star_cumsum(), b.sigma_star_cumsum());
    }
}

#[test]
fn multiple_mode_overlaps_saturate() {
    // an L-shaped interior puts the notch within reach of both grids
    let grids = BoxArray::new(vec![
        IndexBox::new(IntVect::new(0, 0, 0), IntVect::new(63, 31, 0)),
        IndexBox::new(IntVect::new(0, 32, 0), IntVect::new(31, 63, 0)),
    ]);
    let pml = build_on(&grids, params());
    for sb in pml.multi_sigma_box_fp().unwrap().iter() {
        for d in 0..2 {
            assert!(sb.sigma()[d].values().iter().all(|&v| v <= V_SIGMA));
            assert!(sb.sigma_star()[d].values().iter().all(|&v| v <= V_SIGMA));
        }
    }
}

#[test]
fn factors_are_idempotent_for_unchanged_dt() {
    let mut pml = single_box();
    let dt = 1.3e-15;
    pml.compute_pml_factors(dt).unwrap();
    let before: MultiSigmaBox = pml.multi_sigma_box_fp().unwrap().clone();

    pml.compute_pml_factors(dt).unwrap();
    let after = pml.multi_sigma_box_fp().unwrap();
    assert!(after.is_current(dt));
    for (a, b) in before.iter().zip(after.iter()) {
        for d in 0..SPACEDIM {
            for (x, y) in [
                (&a.sigma_fac()[d], &b.sigma_fac()[d]),
                (&a.sigma_star_fac()[d], &b.sigma_star_fac()[d]),
                (&a.sigma_cumsum_fac()[d], &b.sigma_cumsum_fac()[d]),
                (&a.sigma_star_cumsum_fac()[d], &b.sigma_star_cumsum_fac()[d]),
            ] {
                let xb: Vec<u64> = x.values().iter().map(|v| v.to_bits()).collect();
                let yb: Vec<u64> = y.values().iter().map(|v| v.to_bits()).collect();
                assert_eq!(xb, yb);
            }
        }
    }

    // a repeat of the same step is skipped outright
    let mut msb = before;
    let dx = geom().cell_size();
    assert!(!msb.compute_pml_factors_e(&dx, dt));
    assert!(!msb.compute_pml_factors_b(&dx, dt));
    assert!(msb.compute_pml_factors_b(&dx, 2.0 * dt));
}

#[test]
fn factors_follow_the_profile() {
    let mut pml = single_box();
    let dt = 1e-16;
    pml.compute_pml_factors(dt).unwrap();
    let msb = pml.multi_sigma_box_fp().unwrap();
    for sb in msb.iter() {
        for d in 0..2 {
            for (s, f) in sb.sigma()[d].values().iter().zip(sb.sigma_fac()[d].values()) {
                assert_eq!(*f, (-s * dt).exp());
            }
            for (s, f) in sb.sigma_star_cumsum()[d]
                .values()
                .iter()
                .zip(sb.sigma_star_cumsum_fac()[d].values())
            {
                assert_eq!(*f, (-s * (1e-6 / SPEED_OF_LIGHT_IN_VACUUM)).exp());
            }
        }
    }
}
