use crate::mesh::{IndexType, IntVect, SPACEDIM};

/// A rectangular region of index space, inclusive at both ends.
///
/// A box is *empty* when `hi < lo` along any axis. Empty boxes are legal values,
/// they are what intersections of disjoint boxes produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    lo: IntVect,
    hi: IntVect,
    itype: IndexType,
}

impl IndexBox {
    /// Creates a cell-centered box.
    #[inline]
    pub fn new(lo: IntVect, hi: IntVect) -> Self {
        Self { lo, hi, itype: IndexType::cell() }
    }

    #[inline]
    pub fn with_type(lo: IntVect, hi: IntVect, itype: IndexType) -> Self {
        Self { lo, hi, itype }
    }

    /// An empty box.
    #[inline]
    pub fn empty() -> Self {
        Self::new(IntVect::zero(), IntVect::splat(-1))
    }

    #[inline]
    pub fn lo(&self) -> IntVect {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> IntVect {
        self.hi
    }

    #[inline]
    pub fn index_type(&self) -> IndexType {
        self.itype
    }

    #[inline]
    pub fn ok(&self) -> bool {
        (0..SPACEDIM).all(|d| self.hi[d] >= self.lo[d])
    }

    /// Number of points along axis `d`.
    #[inline]
    pub fn length(&self, d: usize) -> i64 {
        self.hi[d] - self.lo[d] + 1
    }

    #[inline]
    pub fn size(&self) -> IntVect {
        IntVect(std::array::from_fn(|d| self.length(d)))
    }

    pub fn num_pts(&self) -> i64 {
        if self.ok() {
            (0..SPACEDIM).map(|d| self.length(d)).product()
        } else {
            0
        }
    }

    #[inline]
    pub fn grow(mut self, n: IntVect) -> Self {
        self.lo = self.lo - n;
        self.hi = self.hi + n;
        self
    }

    #[inline]
    pub fn grow_dir(self, d: usize, n: i64) -> Self {
        self.grow_lo(d, n).grow_hi(d, n)
    }

    #[inline]
    pub fn grow_lo(mut self, d: usize, n: i64) -> Self {
        self.lo[d] -= n;
        self
    }

    #[inline]
    pub fn grow_hi(mut self, d: usize, n: i64) -> Self {
        self.hi[d] += n;
        self
    }

    #[inline]
    pub fn shift(mut self, s: IntVect) -> Self {
        self.lo = self.lo + s;
        self.hi = self.hi + s;
        self
    }

    /// Overlap of two boxes of the same staggering; possibly empty.
    #[inline]
    pub fn intersect(&self, other: &IndexBox) -> IndexBox {
        debug_assert_eq!(self.itype, other.itype);
        IndexBox {
            lo: self.lo.elementwise_max(other.lo),
            hi: self.hi.elementwise_min(other.hi),
            itype: self.itype,
        }
    }

    #[inline]
    pub fn intersects(&self, other: &IndexBox) -> bool {
        self.intersect(other).ok()
    }

    #[inline]
    pub fn contains_point(&self, iv: IntVect) -> bool {
        (0..SPACEDIM).all(|d| iv[d] >= self.lo[d] && iv[d] <= self.hi[d])
    }

    #[inline]
    pub fn contains(&self, other: &IndexBox) -> bool {
        !other.ok() || (self.contains_point(other.lo) && self.contains_point(other.hi))
    }

    /// Changes staggering, adding or removing the trailing node along each axis.
    pub fn convert(mut self, itype: IndexType) -> Self {
        for d in 0..SPACEDIM {
            match (self.itype.is_nodal(d), itype.is_nodal(d)) {
                (false, true) => self.hi[d] += 1,
                (true, false) => self.hi[d] -= 1,
                _ => {}
            }
        }
        self.itype = itype;
        self
    }

    #[inline]
    pub fn enclosed_cells(self) -> Self {
        self.convert(IndexType::cell())
    }

    /// Coarsens by `ratio`, keeping the staggering.
    pub fn coarsen(self, ratio: IntVect) -> Self {
        let itype = self.itype;
        let cells = self.enclosed_cells();
        IndexBox::new(cells.lo.div_floor(ratio), cells.hi.div_floor(ratio)).convert(itype)
    }

    /// The `len` cells just below the box along `d`.
    pub fn adj_cell_lo(&self, d: usize, len: i64) -> IndexBox {
        let mut b = self.enclosed_cells();
        b.hi[d] = b.lo[d] - 1;
        b.lo[d] -= len;
        b
    }

    /// The `len` cells just above the box along `d`.
    pub fn adj_cell_hi(&self, d: usize, len: i64) -> IndexBox {
        let mut b = self.enclosed_cells();
        b.lo[d] = b.hi[d] + 1;
        b.hi[d] += len;
        b
    }

    /// `self` minus `other`, as disjoint boxes covering the remainder.
    pub fn difference(&self, other: &IndexBox) -> Vec<IndexBox> {
        if !self.ok() {
            return Vec::new();
        }
        if !self.intersects(other) {
            return vec![*self];
        }
        let mut out = Vec::new();
        let mut rem = *self;
        for d in 0..SPACEDIM {
            if rem.lo[d] < other.lo[d] {
                let mut piece = rem;
                piece.hi[d] = other.lo[d] - 1;
                out.push(piece);
                rem.lo[d] = other.lo[d];
            }
            if rem.hi[d] > other.hi[d] {
                let mut piece = rem;
                piece.lo[d] = other.hi[d] + 1;
                out.push(piece);
                rem.hi[d] = other.hi[d];
            }
        }
        out
    }

    /// Every index in the box, x fastest.
    pub fn points(&self) -> impl Iterator<Item = IntVect> + '_ {
        let (lo, hi) = (self.lo, self.hi);
        let n = self.num_pts();
        (0..n).map(move |flat| {
            let nx = hi[0] - lo[0] + 1;
            let ny = hi[1] - lo[1] + 1;
            IntVect::new(lo[0] + flat % nx, lo[1] + (flat / nx) % ny, lo[2] + flat / (nx * ny))
        })
    }
}
