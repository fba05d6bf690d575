use crate::mesh::{IndexBox, IndexType, IntVect};

/// An ordered collection of boxes, usually non-overlapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoxArray {
    boxes: Vec<IndexBox>,
}

impl BoxArray {
    #[inline]
    pub fn new(boxes: Vec<IndexBox>) -> Self {
        Self { boxes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> &IndexBox {
        &self.boxes[i]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, IndexBox> {
        self.boxes.iter()
    }

    #[inline]
    pub fn boxes(&self) -> &[IndexBox] {
        &self.boxes
    }

    /// Staggering shared by the boxes; cell-centered when empty.
    pub fn index_type(&self) -> IndexType {
        self.boxes.first().map_or(IndexType::cell(), IndexBox::index_type)
    }

    /// Smallest box containing every box; empty when the array is.
    pub fn minimal_box(&self) -> IndexBox {
        let mut iter = self.boxes.iter();
        let Some(first) = iter.next() else {
            return IndexBox::empty();
        };
        iter.fold(*first, |acc, b| {
            IndexBox::with_type(
                acc.lo().elementwise_min(b.lo()),
                acc.hi().elementwise_max(b.hi()),
                acc.index_type(),
            )
        })
    }

    pub fn num_pts(&self) -> i64 {
        self.boxes.iter().map(IndexBox::num_pts).sum()
    }

    /// Indices and overlaps of every box intersecting `bx`.
    pub fn intersections(&self, bx: &IndexBox) -> Vec<(usize, IndexBox)> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| {
                let isect = b.intersect(bx);
                isect.ok().then_some((i, isect))
            })
            .collect()
    }

    #[inline]
    pub fn intersects(&self, bx: &IndexBox) -> bool {
        self.boxes.iter().any(|b| b.intersects(bx))
    }

    /// The part of `bx` not covered by any box of the array.
    pub fn complement_in(&self, bx: &IndexBox) -> Vec<IndexBox> {
        let mut remaining = vec![*bx];
        for b in &self.boxes {
            remaining = remaining.iter().flat_map(|r| r.difference(b)).collect();
            if remaining.is_empty() {
                break;
            }
        }
        remaining
    }

    /// Trims later boxes so that no two boxes share a point.
    pub fn remove_overlap(self) -> Self {
        let mut kept: Vec<IndexBox> = Vec::with_capacity(self.boxes.len());
        for b in self.boxes {
            let mut pieces = vec![b];
            for k in &kept {
                pieces = pieces.iter().flat_map(|p| p.difference(k)).collect();
            }
            kept.extend(pieces);
        }
        Self { boxes: kept }
    }

    pub fn coarsen(&self, ratio: IntVect) -> Self {
        Self { boxes: self.boxes.iter().map(|b| b.coarsen(ratio)).collect() }
    }

    pub fn convert(&self, itype: IndexType) -> Self {
        Self { boxes: self.boxes.iter().map(|b| b.convert(itype)).collect() }
    }

    pub fn grow_each(&self, n: IntVect) -> Self {
        Self { boxes: self.boxes.iter().map(|b| b.grow(n)).collect() }
    }
}

impl FromIterator<IndexBox> for BoxArray {
    fn from_iter<T: IntoIterator<Item = IndexBox>>(iter: T) -> Self {
        Self { boxes: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a BoxArray {
    type Item = &'a IndexBox;
    type IntoIter = std::slice::Iter<'a, IndexBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}
