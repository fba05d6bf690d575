use crate::mesh::{BoxArray, IntVect};

/// Assigns each box of a `BoxArray` to a processing rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionMapping {
    ranks: Vec<usize>,
    nprocs: usize,
}

impl DistributionMapping {
    /// Creates a mapping from explicit ranks.
    pub fn new(ranks: Vec<usize>, nprocs: usize) -> Self {
        let nprocs = nprocs.max(ranks.iter().map(|r| r + 1).max().unwrap_or(1));
        Self { ranks, nprocs }
    }

    /// Every box on rank 0.
    pub fn single(nboxes: usize) -> Self {
        Self { ranks: vec![0; nboxes], nprocs: 1 }
    }

    /// Balances the number of points per rank, placing the largest boxes first.
    pub fn knapsack(ba: &BoxArray, nprocs: usize) -> Self {
        let nprocs = nprocs.max(1);
        let mut order: Vec<usize> = (0..ba.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(ba.get(i).num_pts()));

        let mut load = vec![0i64; nprocs];
        let mut ranks = vec![0; ba.len()];
        for i in order {
            let rank = least_loaded(&load);
            ranks[i] = rank;
            load[rank] += ba.get(i).num_pts();
        }
        Self { ranks, nprocs }
    }

    /// Places each box of `ba` on the rank owning the box of `grids` it overlaps
    /// most once grown by `ng`, so that exchanges stay rank-local where possible.
    /// Boxes overlapping nothing are load balanced over the remaining capacity.
    pub fn make_similar(ba: &BoxArray, grids: &BoxArray, grid_dm: &DistributionMapping, ng: IntVect) -> Self {
        let nprocs = grid_dm.nprocs;
        let mut load = vec![0i64; nprocs];
        let mut ranks = vec![None; ba.len()];

        for (i, b) in ba.iter().enumerate() {
            let grown = b.enclosed_cells().grow(ng);
            let best = grids
                .iter()
                .enumerate()
                .map(|(g, gb)| (g, gb.enclosed_cells().intersect(&grown).num_pts()))
                .filter(|&(_, n)| n > 0)
                .max_by_key(|&(g, n)| (n, std::cmp::Reverse(g)));
            if let Some((g, _)) = best {
                let rank = grid_dm.rank(g);
                ranks[i] = Some(rank);
                load[rank] += b.num_pts();
            }
        }

        let ranks = ranks
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.unwrap_or_else(|| {
                    let rank = least_loaded(&load);
                    load[rank] += ba.get(i).num_pts();
                    rank
                })
            })
            .collect();
        Self { ranks, nprocs }
    }

    #[inline]
    pub fn rank(&self, i: usize) -> usize {
        self.ranks[i]
    }

    #[inline]
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    #[inline]
    pub fn nprocs(&self) -> usize {
        self.nprocs
    }
}

fn least_loaded(load: &[i64]) -> usize {
    load.iter()
        .enumerate()
        .min_by_key(|&(r, &l)| (l, r))
        .map_or(0, |(r, _)| r)
}
