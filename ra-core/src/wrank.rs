//! Rank conjunction: apply an operator to cells of its operands, with the frame axes of all
//! operands iterated together.
//!
//! A [`Verb`] carries one list of cell ranks per nesting level, outermost first. At each level
//! every operand gives up the axes in front of its cell to a shared frame; the operand with the
//! most such axes decides how many frame axes the level adds. After the last level, whatever
//! axes remain become frame axes too, so the operator always receives elements.

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::{
    agree::{check_writes, largest_rank},
    expr::FlatExpr,
    extent::{check_bounds, dependent_cell_rank, Dim, Rank, DIM_ANY, DIM_BAD, RANK_ANY},
    graph::ExprGraph,
    iter::{RaIter, Step},
    Error, Result,
};

/// An operator together with the cell ranks it wants from each operand.
#[derive(Clone, Debug)]
pub struct Verb<F> {
    levels: Vec<Vec<Rank>>,
    op: F,
}

/// One level of rank conjunction. A negative cell rank counts frame axes instead: `-1` leaves
/// one axis to the frame and the rest to the cell.
pub fn wrank<F>(cranks: &[Rank], op: F) -> Verb<F> {
    Verb {
        levels: vec![cranks.to_vec()],
        op,
    }
}

/// Wrap `v` in an outer level.
pub fn wrank_nested<F>(cranks: &[Rank], mut v: Verb<F>) -> Verb<F> {
    assert!(
        v.levels.first().map_or(true, |l| l.len() == cranks.len()),
        "every level needs one cell rank per operand"
    );
    v.levels.insert(0, cranks.to_vec());
    v
}

impl<F> Verb<F> {
    /// Cell ranks per level, outermost first.
    pub fn levels(&self) -> &[Vec<Rank>] {
        &self.levels
    }

    pub fn op(&self) -> &F {
        &self.op
    }

    /// The outer product of index operands of ranks `ranks`: operand `i` takes its frame axes
    /// after those of operands `0..i`.
    pub fn outer(ranks: &[Rank], op: F) -> Self {
        let n = ranks.len();
        let levels = (1..n)
            .map(|drop| {
                std::iter::repeat(0)
                    .take(drop)
                    .chain(ranks[drop..].iter().copied())
                    .collect()
            })
            .collect();
        Self { levels, op }
    }
}

/// Result of matching the frames of operands with ranks `ranks` through `levels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameMatch {
    /// For each operand, the frame axis of each of its own axes.
    pub axes: Vec<Vec<Rank>>,
    /// Total number of frame axes.
    pub depth: Rank,
}

fn match_level(
    ranks: &[Rank],
    cranks: Option<&[Rank]>,
    axes: &mut [Vec<Rank>],
    skip: &mut Rank,
) -> Result<()> {
    let live: Vec<Rank> = ranks
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let consumed = axes[i].len() as Rank;
            let crank = cranks.map_or(0, |c| dependent_cell_rank(r, c[i]));
            r - consumed - crank
        })
        .collect();
    for (i, &l) in live.iter().enumerate() {
        if l < 0 {
            return Err(Error::FrameRank {
                arg: i,
                rank: ranks[i],
                crank: cranks.map_or(0, |c| c[i]),
                live: l,
            });
        }
    }
    let driver = largest_rank(&live);
    for (r, &l) in axes.iter_mut().zip(&live) {
        r.extend(*skip..*skip + l);
    }
    trace!(?live, driver, skip = *skip, "frame level");
    *skip += live[driver];
    Ok(())
}

/// Assign frame axes to the axes of each operand.
pub fn framematch(levels: &[Vec<Rank>], ranks: &[Rank]) -> Result<FrameMatch> {
    let mut axes = vec![Vec::new(); ranks.len()];
    let mut skip = 0;
    for cranks in levels {
        if cranks.len() != ranks.len() {
            crate::bail!(
                "verb level has {} cell ranks for {} operands",
                cranks.len(),
                ranks.len()
            );
        }
        match_level(ranks, Some(cranks), &mut axes, &mut skip)?;
    }
    match_level(ranks, None, &mut axes, &mut skip)?;
    Ok(FrameMatch { axes, depth: skip })
}

/// An operand seen through the frame axes of a rank conjunction.
#[derive(Clone, Debug)]
pub struct Frames<A> {
    a: A,
    axes: Vec<Rank>,
    live: Vec<Rank>,
    idx: Vec<Dim>,
}

impl<A: RaIter> Frames<A> {
    /// `axes[j]` is the frame axis of axis `j` of `a`.
    pub fn new(a: A, axes: Vec<Rank>, depth: Rank) -> Self {
        let mut live = vec![-1; depth.max(0) as usize];
        for (j, &k) in axes.iter().enumerate() {
            live[k as usize] = j as Rank;
        }
        let idx = vec![0; axes.len()];
        Self { a, axes, live, idx }
    }

    #[inline(always)]
    fn live(&self, k: Rank) -> Rank {
        self.live.get(k as usize).copied().unwrap_or(-1)
    }

    pub fn inner(&self) -> &A {
        &self.a
    }

    /// Number of frame axes this operand moves along.
    pub fn owned(&self) -> Rank {
        self.axes.len() as Rank
    }
}

impl<A: RaIter> RaIter for Frames<A> {
    type Item = A::Item;
    type Stride = A::Stride;
    type Flat<'s>
        = A::Flat<'s>
    where
        Self: 's;

    const RANK_S: Rank = RANK_ANY;
    const SIZE_S: Dim = DIM_ANY;
    const HAS_INDEX: bool = A::HAS_INDEX;
    const WRITES: bool = A::WRITES;

    fn rank(&self) -> Rank {
        self.live.len() as Rank
    }

    fn size(&self, k: Rank) -> Dim {
        match self.live(k) {
            l if l >= 0 => self.a.size(l),
            _ => DIM_BAD,
        }
    }

    fn stride(&self, k: Rank) -> A::Stride {
        match self.live(k) {
            l if l >= 0 => self.a.stride(l),
            _ => A::Stride::ZERO,
        }
    }

    // An axis the operand doesn't own has zero stride, same as an axis past its rank.
    fn compact_stride(&self, step: Dim, z: Rank, j: Rank) -> bool {
        let (wz, wj) = (self.live(z), self.live(j));
        if wz < 0 && wj < 0 {
            return true;
        }
        let past = self.a.rank();
        let wz = if wz < 0 { past } else { wz };
        let wj = if wj < 0 { past } else { wj };
        self.a.compact_stride(step, wz, wj)
    }

    #[inline(always)]
    fn adv(&mut self, k: Rank, d: Dim) {
        let l = self.live(k);
        if l >= 0 {
            self.a.adv(l, d);
        }
    }

    #[inline(always)]
    fn at(&mut self, i: &[Dim]) -> A::Item {
        for (x, &k) in self.idx.iter_mut().zip(&self.axes) {
            *x = i[k as usize];
        }
        self.a.at(&self.idx)
    }

    fn flat(&mut self) -> A::Flat<'_> {
        self.a.flat()
    }

    fn describe(&self, g: &mut ExprGraph) -> NodeIndex {
        let node = g.add_node(format!("Frames {:?}", self.axes));
        let child = self.a.describe(g);
        g.add_edge(child, node, ());
        node
    }
}

/// Composite of a rank conjunction: the innermost operator over operands seen through their
/// frames.
#[derive(Clone)]
pub struct Ryn<F, T> {
    op: F,
    t: T,
    depth: Rank,
}

fn frame_check(arg: usize, depth: Rank, size: impl Fn(Rank) -> Dim, sk: impl Fn(Rank) -> Dim) -> Result<()> {
    for k in 0..depth {
        let (s0, s) = (size(k), sk(k));
        if s != s0 && s != DIM_BAD {
            return Err(Error::ShapeMismatch {
                arg,
                axis: k,
                expected: s0,
                found: s,
            });
        }
    }
    Ok(())
}

macro_rules! ryn_impl {
    ($fun:ident, $n:literal; $($A:ident $a:ident $idx:tt),+) => {
        /// Apply a verb to started operands.
        pub fn $fun<F, R, $($A: RaIter),+>(v: Verb<F>, $($a: $A),+) -> Ryn<F, ($(Frames<$A>,)+)>
        where
            F: FnMut($($A::Item),+) -> R,
        {
            let ranks = [$($a.rank()),+];
            let fm = match framematch(&v.levels, &ranks) {
                Ok(fm) => fm,
                Err(e) => panic!("{e}"),
            };
            let mut axes = fm.axes.into_iter();
            let t = ($(Frames::new($a, axes.next().unwrap_or_default(), fm.depth),)+);
            let r = Ryn { op: v.op, t, depth: fm.depth };
            check_bounds!(r.check());
            if let Err(e) = check_writes(&[$($A::WRITES),+], &[$(r.t.$idx.owned()),+], r.depth) {
                panic!("{e}");
            }
            r
        }

        impl<F, $($A: RaIter),+> Ryn<F, ($(Frames<$A>,)+)> {
            pub fn check(&self) -> Result<()> {
                let size = |k| self.first_size(k);
                $(frame_check($idx, self.depth, size, |k| self.t.$idx.size(k))?;)+
                Ok(())
            }

            fn first_size(&self, k: Rank) -> Dim {
                $(
                    let s = self.t.$idx.size(k);
                    if s >= 0 {
                        return s;
                    }
                )+
                DIM_BAD
            }
        }

        impl<F, R, $($A: RaIter),+> RaIter for Ryn<F, ($(Frames<$A>,)+)>
        where
            F: FnMut($($A::Item),+) -> R,
        {
            type Item = R;
            type Stride = ($($A::Stride,)+);
            type Flat<'s>
                = FlatExpr<'s, F, ($($A::Flat<'s>,)+)>
            where
                Self: 's;

            const RANK_S: Rank = RANK_ANY;
            const SIZE_S: Dim = DIM_ANY;
            const HAS_INDEX: bool = false $(|| $A::HAS_INDEX)+;
            const WRITES: bool = false $(|| $A::WRITES)+;

            fn rank(&self) -> Rank {
                self.depth
            }

            fn size(&self, k: Rank) -> Dim {
                self.first_size(k)
            }

            fn stride(&self, k: Rank) -> Self::Stride {
                ($(self.t.$idx.stride(k),)+)
            }

            fn compact_stride(&self, step: Dim, z: Rank, j: Rank) -> bool {
                $(self.t.$idx.compact_stride(step, z, j))&&+
            }

            #[inline(always)]
            fn adv(&mut self, k: Rank, d: Dim) {
                $(self.t.$idx.adv(k, d);)+
            }

            #[inline(always)]
            fn at(&mut self, i: &[Dim]) -> R {
                (self.op)($(self.t.$idx.at(i)),+)
            }

            fn flat(&mut self) -> Self::Flat<'_> {
                FlatExpr::new(&mut self.op, ($(self.t.$idx.flat(),)+))
            }

            fn describe(&self, g: &mut ExprGraph) -> NodeIndex {
                let node = g.add_node(format!("Ryn/{} depth {}", $n, self.depth));
                $(
                    let child = self.t.$idx.describe(g);
                    g.add_edge(child, node, ());
                )+
                node
            }
        }
    };
}

ryn_impl!(ryn1, 1; A a 0);
ryn_impl!(ryn2, 2; A a 0, B b 1);
ryn_impl!(ryn3, 3; A a 0, B b 1, C c 2);
ryn_impl!(ryn4, 4; A a 0, B b 1, C c 2, D d 3);
ryn_impl!(ryn5, 5; A a 0, B b 1, C c 2, D d 3, E e 4);
ryn_impl!(ryn6, 6; A a 0, B b 1, C c 2, D d 3, E e 4, G g 5);

/// Apply a [`Verb`] to operands, starting each first.
#[macro_export]
macro_rules! map_verb {
    ($v:expr, $a:expr $(,)?) => {
        $crate::ryn1($v, $crate::start($a))
    };
    ($v:expr, $a:expr, $b:expr $(,)?) => {
        $crate::ryn2($v, $crate::start($a), $crate::start($b))
    };
    ($v:expr, $a:expr, $b:expr, $c:expr $(,)?) => {
        $crate::ryn3($v, $crate::start($a), $crate::start($b), $crate::start($c))
    };
    ($v:expr, $a:expr, $b:expr, $c:expr, $d:expr $(,)?) => {
        $crate::ryn4(
            $v,
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
        )
    };
    ($v:expr, $a:expr, $b:expr, $c:expr, $d:expr, $e:expr $(,)?) => {
        $crate::ryn5(
            $v,
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
            $crate::start($e),
        )
    };
    ($v:expr, $a:expr, $b:expr, $c:expr, $d:expr, $e:expr, $g:expr $(,)?) => {
        $crate::ryn6(
            $v,
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
            $crate::start($e),
            $crate::start($g),
        )
    };
}

/// Outer product: `from!(f, x, y)` has shape `x.shape() ++ y.shape()` and value
/// `f(x[i], y[j])` at `(i, j)`.
///
/// ```
/// use ra_core::{from, iota, Array};
///
/// let t: Array<i32> = Array::collect(from!(|i: i32, j: i32| 10 * i + j, iota::<i32>(2), iota::<i32>(3)));
/// assert_eq!(t.shape(), vec![2, 3]);
/// assert_eq!(t.to_vec(), vec![0, 1, 2, 10, 11, 12]);
/// ```
#[macro_export]
macro_rules! from {
    ($f:expr, $a:expr $(,)?) => {{
        let a = $crate::start($a);
        let v = $crate::Verb::outer(&[$crate::RaIter::rank(&a)], $f);
        $crate::ryn1(v, a)
    }};
    ($f:expr, $a:expr, $b:expr $(,)?) => {{
        let (a, b) = ($crate::start($a), $crate::start($b));
        let v = $crate::Verb::outer(&[$crate::RaIter::rank(&a), $crate::RaIter::rank(&b)], $f);
        $crate::ryn2(v, a, b)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr $(,)?) => {{
        let (a, b, c) = ($crate::start($a), $crate::start($b), $crate::start($c));
        let v = $crate::Verb::outer(
            &[
                $crate::RaIter::rank(&a),
                $crate::RaIter::rank(&b),
                $crate::RaIter::rank(&c),
            ],
            $f,
        );
        $crate::ryn3(v, a, b, c)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr, $d:expr $(,)?) => {{
        let (a, b, c, d) = (
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
        );
        let v = $crate::Verb::outer(
            &[
                $crate::RaIter::rank(&a),
                $crate::RaIter::rank(&b),
                $crate::RaIter::rank(&c),
                $crate::RaIter::rank(&d),
            ],
            $f,
        );
        $crate::ryn4(v, a, b, c, d)
    }};
}
