//! Lazy application of an N-ary function over N started operands.

use petgraph::graph::NodeIndex;

use crate::{
    agree::{check_args, check_writes, driver_index},
    extent::{check_bounds, Dim, Rank},
    graph::ExprGraph,
    iter::{Flat, RaIter},
    Result,
};

/// `op` applied position by position to the operands in `t`.
///
/// The shape is that of the driver operand, chosen from the operands' static ranks and sizes
/// when the node is built. The other operands are checked against it once, at construction.
#[derive(Clone)]
pub struct Expr<F, T> {
    op: F,
    t: T,
}

/// Fused cursor over the children's cursors.
pub struct FlatExpr<'s, F, T> {
    op: &'s mut F,
    t: T,
}

impl<'s, F, T> FlatExpr<'s, F, T> {
    pub(crate) fn new(op: &'s mut F, t: T) -> Self {
        Self { op, t }
    }
}

/// Static shape information of a tuple of operands.
pub trait Args {
    const RANKS: &'static [Rank];
    const SIZES: &'static [Dim];
    const DRIVER: usize;
    const HAS_INDEX: bool;
    const WRITES: &'static [bool];
}

impl<F, T> Expr<F, T> {
    pub fn op(&self) -> &F {
        &self.op
    }

    pub fn args(&self) -> &T {
        &self.t
    }

    pub fn into_parts(self) -> (F, T) {
        (self.op, self.t)
    }
}

macro_rules! expr_impl {
    ($fun:ident, $n:literal; $($A:ident $a:ident $idx:tt),+) => {
        impl<$($A: RaIter),+> Args for ($($A,)+) {
            const RANKS: &'static [Rank] = &[$($A::RANK_S),+];
            const SIZES: &'static [Dim] = &[$($A::SIZE_S),+];
            const DRIVER: usize = driver_index(Self::RANKS, Self::SIZES);
            const HAS_INDEX: bool = false $(|| $A::HAS_INDEX)+;
            const WRITES: &'static [bool] = &[$($A::WRITES),+];
        }

        /// Build an expression node over already started operands.
        pub fn $fun<F, R, $($A: RaIter),+>(op: F, $($a: $A),+) -> Expr<F, ($($A,)+)>
        where
            F: FnMut($($A::Item),+) -> R,
        {
            let e = Expr { op, t: ($($a,)+) };
            check_bounds!(e.check());
            if <($($A,)+) as Args>::WRITES.contains(&true) {
                if let Err(err) = e.check_writes() {
                    panic!("{err}");
                }
            }
            e
        }

        impl<F, $($A: RaIter),+> Expr<F, ($($A,)+)> {
            pub const DRIVER: usize = <($($A,)+) as Args>::DRIVER;

            /// Position of the driver among the operands.
            pub fn driver(&self) -> usize {
                Self::DRIVER
            }

            /// Agreement of every operand with the driver.
            pub fn check(&self) -> Result<()> {
                check_args(&[$(&self.t.$idx),+], Self::DRIVER)
            }

            /// No operand that writes is broadcast against the driver.
            pub fn check_writes(&self) -> Result<()> {
                let ranks = [$(self.t.$idx.rank()),+];
                check_writes(<($($A,)+) as Args>::WRITES, &ranks, ranks[Self::DRIVER])
            }
        }

        impl<F, R, $($A: RaIter),+> RaIter for Expr<F, ($($A,)+)>
        where
            F: FnMut($($A::Item),+) -> R,
        {
            type Item = R;
            type Stride = ($($A::Stride,)+);
            type Flat<'s>
                = FlatExpr<'s, F, ($($A::Flat<'s>,)+)>
            where
                Self: 's;

            const RANK_S: Rank = <($($A,)+) as Args>::RANKS[Self::DRIVER];
            const SIZE_S: Dim = <($($A,)+) as Args>::SIZES[Self::DRIVER];
            const HAS_INDEX: bool = <($($A,)+) as Args>::HAS_INDEX;
            const WRITES: bool = false $(|| $A::WRITES)+;

            #[inline(always)]
            fn rank(&self) -> Rank {
                match Self::DRIVER {
                    $($idx => self.t.$idx.rank(),)+
                    _ => unreachable!(),
                }
            }

            #[inline(always)]
            fn size(&self, k: Rank) -> Dim {
                match Self::DRIVER {
                    $($idx => self.t.$idx.size(k),)+
                    _ => unreachable!(),
                }
            }

            #[inline(always)]
            fn stride(&self, k: Rank) -> Self::Stride {
                ($(self.t.$idx.stride(k),)+)
            }

            #[inline(always)]
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

            #[inline(always)]
            fn flat(&mut self) -> Self::Flat<'_> {
                FlatExpr {
                    op: &mut self.op,
                    t: ($(self.t.$idx.flat(),)+),
                }
            }

            fn describe(&self, g: &mut ExprGraph) -> NodeIndex {
                let node = g.add_node(format!("Expr/{} driver {} {:?}", $n, Self::DRIVER, self.shape()));
                $(
                    let child = self.t.$idx.describe(g);
                    g.add_edge(child, node, ());
                )+
                node
            }
        }

        impl<'s, F, R, $($A: Flat),+> Flat for FlatExpr<'s, F, ($($A,)+)>
        where
            F: FnMut($($A::Item),+) -> R,
        {
            type Item = R;
            type Stride = ($($A::Stride,)+);

            #[inline(always)]
            fn get(&mut self) -> R {
                (self.op)($(self.t.$idx.get()),+)
            }

            #[inline(always)]
            fn step(&mut self, s: Self::Stride) {
                $(self.t.$idx.step(s.$idx);)+
            }
        }
    };
}

expr_impl!(expr1, 1; A a 0);
expr_impl!(expr2, 2; A a 0, B b 1);
expr_impl!(expr3, 3; A a 0, B b 1, C c 2);
expr_impl!(expr4, 4; A a 0, B b 1, C c 2, D d 3);
expr_impl!(expr5, 5; A a 0, B b 1, C c 2, D d 3, E e 4);
expr_impl!(expr6, 6; A a 0, B b 1, C c 2, D d 3, E e 4, G g 5);

/// Build an expression node, starting each operand first.
///
/// ```
/// use ra_core::{map, Array, RaIter};
///
/// let a = Array::<f64>::from_elem(&[2, 3], 1.0);
/// let b = Array::<f64>::from_elem(&[2], 2.0);
/// let c: Array<f64> = Array::collect(map!(|a: &f64, b: &f64| a + b, &a, &b));
/// assert_eq!(c.to_vec(), vec![3.0; 6]);
/// ```
#[macro_export]
macro_rules! map {
    ($f:expr, $a:expr $(,)?) => {{
        let a = $crate::start($a);
        $crate::expr1($f, a)
    }};
    ($f:expr, $a:expr, $b:expr $(,)?) => {{
        let (a, b) = ($crate::start($a), $crate::start($b));
        $crate::expr2($f, a, b)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr $(,)?) => {{
        let (a, b, c) = ($crate::start($a), $crate::start($b), $crate::start($c));
        $crate::expr3($f, a, b, c)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr, $d:expr $(,)?) => {{
        let (a, b, c, d) = (
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
        );
        $crate::expr4($f, a, b, c, d)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr, $d:expr, $e:expr $(,)?) => {{
        let (a, b, c, d, e) = (
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
            $crate::start($e),
        );
        $crate::expr5($f, a, b, c, d, e)
    }};
    ($f:expr, $a:expr, $b:expr, $c:expr, $d:expr, $e:expr, $g:expr $(,)?) => {{
        let (a, b, c, d, e, g) = (
            $crate::start($a),
            $crate::start($b),
            $crate::start($c),
            $crate::start($d),
            $crate::start($e),
            $crate::start($g),
        );
        $crate::expr6($f, a, b, c, d, e, g)
    }};
}

/// Build an expression node and traverse it at once, for the side effects of `f`.
#[macro_export]
macro_rules! for_each {
    ($f:expr, $($x:expr),+ $(,)?) => {
        $crate::ply($crate::map!($f, $($x),+))
    };
}
