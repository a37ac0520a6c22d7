//! Selection between operands position by position, evaluating only the selected one.

use petgraph::graph::NodeIndex;

use crate::{
    agree::{check_args, check_writes},
    expr::Args,
    extent::{check_bounds, Dim, Rank},
    graph::ExprGraph,
    iter::{Flat, IntoRa, RaIter},
    Error, Result,
};

/// Values that can choose among operands. `false` selects the first, `true` the second.
pub trait Selector {
    fn select(self) -> usize;
}

impl Selector for bool {
    #[inline(always)]
    fn select(self) -> usize {
        self as usize
    }
}

impl Selector for usize {
    #[inline(always)]
    fn select(self) -> usize {
        self
    }
}

impl Selector for Dim {
    #[inline(always)]
    fn select(self) -> usize {
        self as usize
    }
}

impl<S: Selector + Copy> Selector for &S {
    #[inline(always)]
    fn select(self) -> usize {
        (*self).select()
    }
}

impl<S: Selector + Copy> Selector for &mut S {
    #[inline(always)]
    fn select(self) -> usize {
        (*self).select()
    }
}

/// The selector is `t.0`, the candidates follow.
#[derive(Clone)]
pub struct Pick<T> {
    t: T,
}

pub struct FlatPick<T> {
    t: T,
}

fn bad_pick(k: usize, n: usize) -> ! {
    panic!(
        "{}",
        Error::OutOfBounds {
            axis: 0,
            index: k as Dim,
            size: n as Dim
        }
    )
}

macro_rules! pick_impl {
    ($fun:ident, $n:literal; $($A:ident $a:ident $idx:tt $k:literal),+) => {
        /// Select among started operands with the values of `sel`.
        pub fn $fun<S, A, $($A),+>(sel: S, $($a: $A),+) -> Pick<(S, $($A,)+)>
        where
            S: RaIter,
            S::Item: Selector,
            $($A: RaIter<Item = A>,)+
        {
            let p = Pick { t: (sel, $($a,)+) };
            check_bounds!(p.check());
            if <(S, $($A,)+) as Args>::WRITES.contains(&true) {
                let ranks = [p.t.0.rank(), $(p.t.$idx.rank()),+];
                let depth = ranks[<(S, $($A,)+) as Args>::DRIVER];
                if let Err(e) = check_writes(<(S, $($A,)+) as Args>::WRITES, &ranks, depth) {
                    panic!("{e}");
                }
            }
            p
        }

        impl<S: RaIter, $($A: RaIter),+> Pick<(S, $($A,)+)> {
            pub const DRIVER: usize = <(S, $($A,)+) as Args>::DRIVER;

            pub fn check(&self) -> Result<()> {
                check_args(&[&self.t.0, $(&self.t.$idx),+], Self::DRIVER)
            }
        }

        impl<S, I, $($A),+> RaIter for Pick<(S, $($A,)+)>
        where
            S: RaIter,
            S::Item: Selector,
            $($A: RaIter<Item = I>,)+
        {
            type Item = I;
            type Stride = (S::Stride, $($A::Stride,)+);
            type Flat<'s>
                = FlatPick<(S::Flat<'s>, $($A::Flat<'s>,)+)>
            where
                Self: 's;

            const RANK_S: Rank = <(S, $($A,)+) as Args>::RANKS[Self::DRIVER];
            const SIZE_S: Dim = <(S, $($A,)+) as Args>::SIZES[Self::DRIVER];
            const HAS_INDEX: bool = <(S, $($A,)+) as Args>::HAS_INDEX;
            const WRITES: bool = S::WRITES $(|| $A::WRITES)+;

            fn rank(&self) -> Rank {
                match Self::DRIVER {
                    0 => self.t.0.rank(),
                    $($idx => self.t.$idx.rank(),)+
                    _ => unreachable!(),
                }
            }

            fn size(&self, k: Rank) -> Dim {
                match Self::DRIVER {
                    0 => self.t.0.size(k),
                    $($idx => self.t.$idx.size(k),)+
                    _ => unreachable!(),
                }
            }

            fn stride(&self, k: Rank) -> Self::Stride {
                (self.t.0.stride(k), $(self.t.$idx.stride(k),)+)
            }

            fn compact_stride(&self, step: Dim, z: Rank, j: Rank) -> bool {
                self.t.0.compact_stride(step, z, j) $(&& self.t.$idx.compact_stride(step, z, j))+
            }

            #[inline(always)]
            fn adv(&mut self, k: Rank, d: Dim) {
                self.t.0.adv(k, d);
                $(self.t.$idx.adv(k, d);)+
            }

            #[inline(always)]
            fn at(&mut self, i: &[Dim]) -> I {
                match self.t.0.at(i).select() {
                    $($k => self.t.$idx.at(i),)+
                    k => bad_pick(k, $n),
                }
            }

            fn flat(&mut self) -> Self::Flat<'_> {
                FlatPick {
                    t: (self.t.0.flat(), $(self.t.$idx.flat(),)+),
                }
            }

            fn describe(&self, g: &mut ExprGraph) -> NodeIndex {
                let node = g.add_node(format!("Pick/{} driver {}", $n, Self::DRIVER));
                let sel = self.t.0.describe(g);
                g.add_edge(sel, node, ());
                $(
                    let child = self.t.$idx.describe(g);
                    g.add_edge(child, node, ());
                )+
                node
            }
        }

        impl<S, I, $($A),+> Flat for FlatPick<(S, $($A,)+)>
        where
            S: Flat,
            S::Item: Selector,
            $($A: Flat<Item = I>,)+
        {
            type Item = I;
            type Stride = (S::Stride, $($A::Stride,)+);

            #[inline(always)]
            fn get(&mut self) -> I {
                match self.t.0.get().select() {
                    $($k => self.t.$idx.get(),)+
                    k => bad_pick(k, $n),
                }
            }

            #[inline(always)]
            fn step(&mut self, s: Self::Stride) {
                self.t.0.step(s.0);
                $(self.t.$idx.step(s.$idx);)+
            }
        }
    };
}

pick_impl!(pick1, 1; A0 a0 1 0);
pick_impl!(pick2, 2; A0 a0 1 0, A1 a1 2 1);
pick_impl!(pick3, 3; A0 a0 1 0, A1 a1 2 1, A2 a2 3 2);
pick_impl!(pick4, 4; A0 a0 1 0, A1 a1 2 1, A2 a2 3 2, A3 a3 4 3);
pick_impl!(pick5, 5; A0 a0 1 0, A1 a1 2 1, A2 a2 3 2, A3 a3 4 3, A4 a4 5 4);

/// `t` where `w` is true, `f` elsewhere.
#[allow(clippy::type_complexity)]
pub fn where_<W, X, Y>(w: W, t: X, f: Y) -> Pick<(W::Iter, Y::Iter, X::Iter)>
where
    W: IntoRa,
    X: IntoRa,
    Y: IntoRa,
    <W::Iter as RaIter>::Item: Selector,
    Y::Iter: RaIter<Item = <X::Iter as RaIter>::Item>,
{
    let (w, t, f) = (w.start(), t.start(), f.start());
    pick2(w, f, t)
}

/// Select among operands, starting each first. The first argument yields `bool` or an index.
#[macro_export]
macro_rules! pick {
    ($s:expr, $a:expr $(,)?) => {
        $crate::pick1($crate::start($s), $crate::start($a))
    };
    ($s:expr, $a:expr, $b:expr $(,)?) => {
        $crate::pick2($crate::start($s), $crate::start($a), $crate::start($b))
    };
    ($s:expr, $a:expr, $b:expr, $c:expr $(,)?) => {
        $crate::pick3(
            $crate::start($s),
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
        )
    };
    ($s:expr, $a:expr, $b:expr, $c:expr, $d:expr $(,)?) => {
        $crate::pick4(
            $crate::start($s),
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
        )
    };
    ($s:expr, $a:expr, $b:expr, $c:expr, $d:expr, $e:expr $(,)?) => {
        $crate::pick5(
            $crate::start($s),
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
            $crate::start($e),
        )
    };
}
