use pmlayer::prelude::*;

fn main() {
    let n = 128;
    let dx = 1e-6; // [m]
    let nsteps = 200;

    let geom = Geometry::new(
        2,
        IndexBox::new(IntVect::zero(), IntVect::new(n - 1, n - 1, 0)),
        [dx, dx, 1.0],
        [false; 3],
    )
    .unwrap();

    // four interior grids spread over two ranks
    let h = n / 2;
    let grids = BoxArray::new(vec![
        IndexBox::new(IntVect::new(0, 0, 0), IntVect::new(h - 1, h - 1, 0)),
        IndexBox::new(IntVect::new(h, 0, 0), IntVect::new(n - 1, h - 1, 0)),
        IndexBox::new(IntVect::new(0, h, 0), IntVect::new(h - 1, n - 1, 0)),
        IndexBox::new(IntVect::new(h, h, 0), IntVect::new(n - 1, n - 1, 0)),
    ]);
    let dm = DistributionMapping::knapsack(&grids, 2);

    // courant limited step
    let dt = 0.5 * dx / (physical_constants::SPEED_OF_LIGHT_IN_VACUUM * 2f64.sqrt());

    let mut pml = Pml::new(PmlDescriptor {
        level: 0,
        grids: &grids,
        dm: &dm,
        geom: &geom,
        cgeom: None,
        ref_ratio: IntVect::new(2, 2, 1),
        dt,
        params: PmlParameters {
            ncell: 12,
            delta: 12,
            ..Default::default()
        },
    })
    .unwrap();
    pml.compute_pml_factors(dt).unwrap();

    let ngrow = IntVect::new(2, 2, 0);
    let mut e: [MultiField; 3] = std::array::from_fn(|d| {
        let others: Vec<usize> = (0..3).filter(|&a| a != d).collect();
        MultiField::new(grids.convert(IndexType::nodal_along(2, &others)), dm.clone(), 1, ngrow)
    });
    let mut b: [MultiField; 3] = std::array::from_fn(|d| {
        MultiField::new(grids.convert(IndexType::nodal_along(2, &[d])), dm.clone(), 1, ngrow)
    });

    // a gaussian pulse of Ez in the middle of the domain
    let centre = (n / 2) as Real;
    let width = (n / 16) as Real;
    e[2].for_each_fab_mut(|_, fab| {
        for iv in fab.valid_box().points() {
            let r2 = (iv[0] as Real - centre).powi(2) + (iv[1] as Real - centre).powi(2);
            fab.set(iv, 0, (-r2 / (width * width)).exp());
        }
    });

    println!(
        "\n-- General PML Info --\n\
        # of layer boxes:  {}\n\
        # of layer cells:  {}\n\
        σ max:             {:<9.2e} 1/s\n\
        Δt:                {:<9.2e} s\n",
        pml.box_array().unwrap().len(),
        pml.box_array().unwrap().num_pts(),
        pml.params().v_sigma,
        dt,
    );

    let c = physical_constants::SPEED_OF_LIGHT_IN_VACUUM;
    let period = geom.periodicity();
    let ez0 = e[2].max_abs(0);

    let bar = indicatif::ProgressBar::new(nsteps as u64);
    for _ in 0..nsteps {
        push_b(&mut b, &e, dt / dx);
        {
            let patch = pml.patch_mut(PatchType::Fine).unwrap();
            let le = patch.e().clone();
            push_b(patch.b_mut(), &le, dt / dx);
        }
        {
            let [b0, b1, b2] = &mut b;
            pml.exchange_b(PatchType::Fine, [b0, b1, b2]).unwrap();
        }
        b.iter_mut().for_each(|f| f.fill_boundary(&period, false));
        pml.fill_boundary_b(PatchType::Fine, None).unwrap();

        push_e(&mut e, &b, c * c * dt / dx);
        {
            let patch = pml.patch_mut(PatchType::Fine).unwrap();
            let lb = patch.b().clone();
            push_e(patch.e_mut(), &lb, c * c * dt / dx);
        }
        pml.damp(PatchType::Fine).unwrap();
        {
            let [e0, e1, e2] = &mut e;
            pml.exchange_e(PatchType::Fine, [e0, e1, e2]).unwrap();
        }
        e.iter_mut().for_each(|f| f.fill_boundary(&period, false));
        pml.fill_boundary_e(PatchType::Fine, None).unwrap();
        bar.inc(1);
    }
    bar.finish();

    println!(
        "max |Ez| in the interior: {:.3e} initially, {:.3e} after {} steps",
        ez0,
        e[2].max_abs(0),
        nsteps,
    );

    std::fs::create_dir_all("data").unwrap();
    pml.checkpoint("data/pml_2d.h5").unwrap();
}

/// Component of a field that receives the derivative along the `split` slot.
/// Interior arrays carry a single component.
fn slot(ncomp: usize, split: usize) -> usize {
    if ncomp == 1 {
        0
    } else {
        split
    }
}

fn total(fab: &FieldBox, iv: IntVect) -> Real {
    (0..fab.ncomp()).map(|c| fab.get(iv, c)).sum()
}

/// TMz Faraday update of Bx and By from Ez.
fn push_b(b: &mut [MultiField; 3], e: &[MultiField; 3], coef: Real) {
    let [bx, by, _] = b;
    let ez = &e[2];
    let xhat = IntVect::new(1, 0, 0);
    let yhat = IntVect::new(0, 1, 0);

    // Bx splits along y first
    bx.for_each_fab_mut(|i, fab| {
        let src = ez.fab(i);
        let s = slot(fab.ncomp(), 0);
        for iv in fab.valid_box().points() {
            let curl = total(src, iv + yhat) - total(src, iv);
            fab.set(iv, s, fab.get(iv, s) - coef * curl);
        }
    });
    // By splits along z first, x second
    by.for_each_fab_mut(|i, fab| {
        let src = ez.fab(i);
        let s = slot(fab.ncomp(), 1);
        for iv in fab.valid_box().points() {
            let curl = total(src, iv + xhat) - total(src, iv);
            fab.set(iv, s, fab.get(iv, s) + coef * curl);
        }
    });
}

/// TMz Ampere update of Ez from Bx and By, without sources.
fn push_e(e: &mut [MultiField; 3], b: &[MultiField; 3], coef: Real) {
    let (bx, by) = (&b[0], &b[1]);
    let xhat = IntVect::new(1, 0, 0);
    let yhat = IntVect::new(0, 1, 0);

    e[2].for_each_fab_mut(|i, fab| {
        let (sx, sy) = (bx.fab(i), by.fab(i));
        let (s0, s1) = (slot(fab.ncomp(), 0), slot(fab.ncomp(), 1));
        for iv in fab.valid_box().points() {
            let dby = total(sy, iv) - total(sy, iv - xhat);
            let dbx = total(sx, iv) - total(sx, iv - yhat);
            fab.set(iv, s0, fab.get(iv, s0) + coef * dby);
            fab.set(iv, s1, fab.get(iv, s1) - coef * dbx);
        }
    });
}
