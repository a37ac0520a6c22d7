//! The protocol every array-like operand implements once it has been started.

use petgraph::graph::NodeIndex;

use crate::{
    extent::{Dim, Rank, DIM_ANY},
    graph::ExprGraph,
};

/// Advancement along one axis of a flat cursor. Leaves use a plain element count,
/// expression nodes use the tuple of their children's strides.
pub trait Step: Copy {
    /// The stride of an axis an operand does not move along.
    const ZERO: Self;
}

impl Step for Dim {
    const ZERO: Self = 0;
}

macro_rules! step_tuple {
    ($($S:ident),+) => {
        impl<$($S: Step),+> Step for ($($S,)+) {
            const ZERO: Self = ($($S::ZERO,)+);
        }
    };
}

step_tuple!(A);
step_tuple!(A, B);
step_tuple!(A, B, C);
step_tuple!(A, B, C, D);
step_tuple!(A, B, C, D, E);
step_tuple!(A, B, C, D, E, F);

/// A cursor for the innermost loop: dereference, then move by a stride.
pub trait Flat {
    type Item;
    type Stride: Step;

    fn get(&mut self) -> Self::Item;
    fn step(&mut self, s: Self::Stride);
}

/// An operand ready for traversal.
///
/// `RANK_S` and `SIZE_S` are the static rank and total size, either of which can be one of
/// the sentinels in [`crate::extent`]. The run-time methods always return concrete values,
/// except `size` on axes the operand does not own, which is [`crate::DIM_BAD`].
pub trait RaIter {
    type Item;
    type Stride: Step;
    type Flat<'s>: Flat<Item = Self::Item, Stride = Self::Stride>
    where
        Self: 's;

    const RANK_S: Rank;
    const SIZE_S: Dim;
    /// Some leaf needs explicit coordinates, so only [`crate::ply_index`] can traverse this.
    const HAS_INDEX: bool = false;
    /// Some leaf hands out `&mut` to its elements. Such an operand must own every axis of the
    /// traversal, or one element would be handed out more than once.
    const WRITES: bool = false;

    fn rank(&self) -> Rank;
    fn size(&self, k: Rank) -> Dim;
    fn stride(&self, k: Rank) -> Self::Stride;

    /// Whether axis `j` moves by exactly `step` times axis `z`, so that the two can be run
    /// as one axis.
    fn compact_stride(&self, step: Dim, z: Rank, j: Rank) -> bool;

    /// Move the cursor by `d` along axis `k`. No-op for `k` beyond this operand's rank.
    fn adv(&mut self, k: Rank, d: Dim);

    /// Random access relative to the cursor.
    fn at(&mut self, i: &[Dim]) -> Self::Item;

    fn flat(&mut self) -> Self::Flat<'_>;

    fn shape(&self) -> Vec<Dim> {
        (0..self.rank()).map(|k| self.size(k)).collect()
    }

    /// Total number of positions a traversal would visit.
    fn len(&self) -> Dim {
        (0..self.rank()).map(|k| self.size(k)).product()
    }

    fn is_empty(&self) -> bool {
        (0..self.rank()).any(|k| self.size(k) == 0)
    }

    /// The single value of a rank-0 (or rank-1 size-1) operand.
    fn value(mut self) -> Self::Item
    where
        Self: Sized,
    {
        let r = self.rank();
        let scalar = r == 0 || (r == 1 && self.size(0) == 1);
        assert!(scalar, "expression of shape {:?} is not a scalar", self.shape());
        if Self::HAS_INDEX {
            self.at(&[0])
        } else {
            self.flat().get()
        }
    }

    /// Add this operand (and its children) to `g`, returning its node.
    fn describe(&self, g: &mut ExprGraph) -> NodeIndex {
        let name = std::any::type_name::<Self>();
        let name = name.split('<').next().unwrap_or(name);
        let name = name.rsplit("::").next().unwrap_or(name);
        let size = if Self::SIZE_S == DIM_ANY {
            format!("{:?}", self.shape())
        } else {
            format!("{:?} (static)", self.shape())
        };
        g.add_node(format!("{name} {size}"))
    }
}

/// Anything that can be turned into an [`RaIter`].
pub trait IntoRa {
    type Iter: RaIter;

    fn start(self) -> Self::Iter;
}

impl<A: RaIter> IntoRa for A {
    type Iter = A;

    fn start(self) -> A {
        self
    }
}

/// Normalize an operand: iterators pass through, arrays give their iterator, scalars become
/// [`crate::Scalar`], slices and vectors become rank-1 wrappers.
pub fn start<X: IntoRa>(x: X) -> X::Iter {
    x.start()
}
