//! Arithmetic, reductions and matrix products built on the expression core.

use std::{borrow::Borrow, ops::ControlFlow};

use tracing::debug;

use crate::{
    array::Array,
    atom::iota,
    dtype::{DType, MatMut, MatRef, Sqrtable},
    expr::{expr1, expr2},
    extent::{Dim, Rank},
    iter::{IntoRa, RaIter},
    ply::{ply, ply_exit},
    view::View,
    Error,
};

/// Element values an expression may yield: the value itself or a reference into storage.
pub trait Elem {
    type T: DType;

    fn elem(self) -> Self::T;
}

macro_rules! elem {
    ($($t:ty),+) => {
        $(
            impl Elem for $t {
                type T = $t;

                #[inline(always)]
                fn elem(self) -> $t {
                    self
                }
            }

        )+
    };
}

impl<T: DType> Elem for &T {
    type T = T;

    #[inline(always)]
    fn elem(self) -> T {
        *self
    }
}

impl<T: DType> Elem for &mut T {
    type T = T;

    #[inline(always)]
    fn elem(self) -> T {
        *self
    }
}

elem!(u8, u32, u64, usize, i32, i64, isize, f32, f64);
#[cfg(feature = "half")]
elem!(half::f16);
#[cfg(feature = "bfloat")]
elem!(half::bf16);

/// What an operand yields.
pub type Item<X> = <<X as IntoRa>::Iter as RaIter>::Item;
/// The element type behind what an operand yields.
pub type ElemOf<X> = <Item<X> as Elem>::T;

macro_rules! binary_expr {
    ($name:ident, $op:tt, $doc:literal) => {
        #[doc = $doc]
        pub fn $name<X, Y>(x: X, y: Y) -> impl RaIter<Item = ElemOf<X>>
        where
            X: IntoRa,
            Y: IntoRa,
            Item<X>: Elem,
            Item<Y>: Elem<T = ElemOf<X>>,
        {
            expr2(|a: Item<X>, b: Item<Y>| a.elem() $op b.elem(), x.start(), y.start())
        }
    };
}

binary_expr!(plus, +, "`x + y` elementwise.");
binary_expr!(minus, -, "`x - y` elementwise.");
binary_expr!(times, *, "`x * y` elementwise.");
binary_expr!(slash, /, "`x / y` elementwise.");

macro_rules! compare_expr {
    ($name:ident, $op:tt, $doc:literal) => {
        #[doc = $doc]
        pub fn $name<X, Y>(x: X, y: Y) -> impl RaIter<Item = bool>
        where
            X: IntoRa,
            Y: IntoRa,
            Item<X>: Elem,
            Item<Y>: Elem<T = ElemOf<X>>,
        {
            expr2(|a: Item<X>, b: Item<Y>| a.elem() $op b.elem(), x.start(), y.start())
        }
    };
}

compare_expr!(eq, ==, "`x == y` elementwise.");
compare_expr!(ne, !=, "`x != y` elementwise.");
compare_expr!(lt, <, "`x < y` elementwise.");
compare_expr!(le, <=, "`x <= y` elementwise.");
compare_expr!(gt, >, "`x > y` elementwise.");
compare_expr!(ge, >=, "`x >= y` elementwise.");

/// `x && y` elementwise. Both sides are always evaluated.
pub fn and<X, Y>(x: X, y: Y) -> impl RaIter<Item = bool>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Borrow<bool>,
    Item<Y>: Borrow<bool>,
{
    expr2(|a: Item<X>, b: Item<Y>| *a.borrow() && *b.borrow(), x.start(), y.start())
}

/// `x || y` elementwise. Both sides are always evaluated.
pub fn or<X, Y>(x: X, y: Y) -> impl RaIter<Item = bool>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Borrow<bool>,
    Item<Y>: Borrow<bool>,
{
    expr2(|a: Item<X>, b: Item<Y>| *a.borrow() || *b.borrow(), x.start(), y.start())
}

pub fn not<X>(x: X) -> impl RaIter<Item = bool>
where
    X: IntoRa,
    Item<X>: Borrow<bool>,
{
    expr1(|a: Item<X>| !*a.borrow(), x.start())
}

macro_rules! unary_expr {
    ($name:ident, |$a:ident| $body:expr, $doc:literal) => {
        #[doc = $doc]
        pub fn $name<X>(x: X) -> impl RaIter<Item = ElemOf<X>>
        where
            X: IntoRa,
            Item<X>: Elem,
        {
            expr1(
                |a: Item<X>| {
                    let $a: ElemOf<X> = a.elem();
                    $body
                },
                x.start(),
            )
        }
    };
}

unary_expr!(neg, |a| <ElemOf<X> as DType>::ZERO - a, "`-x` elementwise.");
unary_expr!(
    abs,
    |a| if a < <ElemOf<X> as DType>::ZERO { <ElemOf<X> as DType>::ZERO - a } else { a },
    "`|x|` elementwise."
);
unary_expr!(sqr, |a| a * a, "`x * x` elementwise.");
unary_expr!(
    sqrt,
    |a| Sqrtable::sqrt(&a),
    "Square root elementwise. Negative integers give 0."
);

macro_rules! float_expr {
    ($($name:ident),+) => {
        $(
            #[doc = concat!("`", stringify!($name), "` elementwise, computed in `f64`.")]
            pub fn $name<X>(x: X) -> impl RaIter<Item = ElemOf<X>>
            where
                X: IntoRa,
                Item<X>: Elem,
            {
                expr1(
                    |a: Item<X>| <ElemOf<X> as DType>::from_f64(a.elem().to_f64().$name()),
                    x.start(),
                )
            }
        )+
    };
}

float_expr!(exp, ln, log10, sin, cos, tanh);

/// Whether each element is NaN.
pub fn isnan<X>(x: X) -> impl RaIter<Item = bool>
where
    X: IntoRa,
    Item<X>: Elem,
{
    expr1(|a: Item<X>| a.elem().to_f64().is_nan(), x.start())
}

/// Whether each element is neither infinite nor NaN.
pub fn isfinite<X>(x: X) -> impl RaIter<Item = bool>
where
    X: IntoRa,
    Item<X>: Elem,
{
    expr1(|a: Item<X>| a.elem().to_f64().is_finite(), x.start())
}

/// The larger of `x` and `y` elementwise. `x` wins ties and NaN comparisons.
pub fn max<X, Y>(x: X, y: Y) -> impl RaIter<Item = ElemOf<X>>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Elem,
    Item<Y>: Elem<T = ElemOf<X>>,
{
    expr2(
        |a: Item<X>, b: Item<Y>| {
            let (a, b) = (a.elem(), b.elem());
            if b > a {
                b
            } else {
                a
            }
        },
        x.start(),
        y.start(),
    )
}

/// The smaller of `x` and `y` elementwise. `x` wins ties and NaN comparisons.
pub fn min<X, Y>(x: X, y: Y) -> impl RaIter<Item = ElemOf<X>>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Elem,
    Item<Y>: Elem<T = ElemOf<X>>,
{
    expr2(
        |a: Item<X>, b: Item<Y>| {
            let (a, b) = (a.elem(), b.elem());
            if b < a {
                b
            } else {
                a
            }
        },
        x.start(),
        y.start(),
    )
}

/// `x` to the power `y` elementwise, computed in `f64`.
pub fn pow<X, Y>(x: X, y: Y) -> impl RaIter<Item = ElemOf<X>>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Elem,
    Item<Y>: Elem<T = ElemOf<X>>,
{
    expr2(
        |a: Item<X>, b: Item<Y>| {
            <ElemOf<X> as DType>::from_f64(a.elem().to_f64().powf(b.elem().to_f64()))
        },
        x.start(),
        y.start(),
    )
}

/// Convert every element to `U` through `f64`.
pub fn cast<U, X>(x: X) -> impl RaIter<Item = U>
where
    U: DType,
    X: IntoRa,
    Item<X>: Elem,
{
    expr1(|a: Item<X>| U::from_f64(a.elem().to_f64()), x.start())
}

fn fold<X, F>(x: X, init: ElemOf<X>, mut f: F) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
    F: FnMut(ElemOf<X>, ElemOf<X>) -> ElemOf<X>,
{
    let mut s = init;
    ply(expr1(|a: Item<X>| s = f(s, a.elem()), x.start()));
    s
}

pub fn sum<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    fold(x, <ElemOf<X> as DType>::ZERO, |s, a| s + a)
}

pub fn prod<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    fold(x, <ElemOf<X> as DType>::ONE, |s, a| s * a)
}

/// Smallest element, or the largest value of the type if there are none.
pub fn amin<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    fold(x, <ElemOf<X> as DType>::MAX, |s, a| if a < s { a } else { s })
}

/// Largest element, or the smallest value of the type if there are none.
pub fn amax<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    fold(x, <ElemOf<X> as DType>::MIN, |s, a| if a > s { a } else { s })
}

/// Sum of squares.
pub fn reduce_sqrm<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    fold(x, <ElemOf<X> as DType>::ZERO, |s, a| s + a * a)
}

pub fn norm2<X>(x: X) -> ElemOf<X>
where
    X: IntoRa,
    Item<X>: Elem,
{
    Sqrtable::sqrt(&reduce_sqrm(x))
}

pub fn dot<X, Y>(x: X, y: Y) -> ElemOf<X>
where
    X: IntoRa,
    Y: IntoRa,
    Item<X>: Elem,
    Item<Y>: Elem<T = ElemOf<X>>,
{
    let mut s = <ElemOf<X> as DType>::ZERO;
    ply(expr2(
        |a: Item<X>, b: Item<Y>| s = s + a.elem() * b.elem(),
        x.start(),
        y.start(),
    ));
    s
}

/// Whether any element is true. Stops at the first.
pub fn any<X>(x: X) -> bool
where
    X: IntoRa,
    Item<X>: Borrow<bool>,
{
    ply_exit(x.start(), false, |a: Item<X>| {
        if *a.borrow() {
            ControlFlow::Break(true)
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Whether every element is true. Stops at the first false one.
pub fn every<X>(x: X) -> bool
where
    X: IntoRa,
    Item<X>: Borrow<bool>,
{
    ply_exit(x.start(), true, |a: Item<X>| {
        if *a.borrow() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(false)
        }
    })
}

/// Row-major position of the first true element.
pub fn index<X>(x: X) -> Option<Dim>
where
    X: IntoRa,
    Item<X>: Borrow<bool>,
{
    let mut n = 0;
    ply_exit(x.start(), None, |a: Item<X>| {
        if *a.borrow() {
            ControlFlow::Break(Some(n))
        } else {
            n += 1;
            ControlFlow::Continue(())
        }
    })
}

// ---------------------------------------------------------------- matrix products

fn check_matrix<T, const R: Rank>(arg: usize, a: &View<'_, T, R>) {
    if a.rank() != 2 {
        panic!(
            "{}",
            Error::RankMismatch {
                arg,
                rank: a.rank(),
                driver: 2
            }
        );
    }
}

fn check_inner(arg: usize, k: Dim, found: Dim) {
    if k != found {
        panic!(
            "{}",
            Error::ShapeMismatch {
                arg,
                axis: 0,
                expected: k,
                found
            }
        );
    }
}

/// `a * b` for rank-2 `a` and `b`.
///
/// Element types with a tuned kernel (`f32`, `f64`) run through the `gemm` crate on any strides;
/// the rest are computed as the outer product of rows of `a` and columns of `b` under `dot`.
pub fn gemm<T: DType, const RA: Rank, const RB: Rank>(
    a: &View<'_, T, RA>,
    b: &View<'_, T, RB>,
) -> Array<T, 2> {
    check_matrix(0, a);
    check_matrix(1, b);
    let (m, k, n) = (a.size(0), a.size(1), b.size(1));
    check_inner(1, k, b.size(0));
    let mut c = Array::<T, 2>::zeros(&[m, n]);
    if m > 0 && n > 0 {
        let lhs = MatRef {
            ptr: a.as_ptr(),
            rs: a.stride(0),
            cs: a.stride(1),
        };
        let rhs = MatRef {
            ptr: b.as_ptr(),
            rs: b.stride(0),
            cs: b.stride(1),
        };
        let out = MatMut {
            ptr: c.as_mut_slice().as_mut_ptr(),
            rs: n,
            cs: 1,
        };
        // SAFETY: shapes were checked above, `c` is fresh and holds `m * n` elements.
        if unsafe { T::launch_gemm(m as usize, n as usize, k as usize, lhs, rhs, out) } {
            debug!(m, n, k, dtype = T::NAME, "gemm kernel");
            return c;
        }
    }
    debug!(m, n, k, dtype = T::NAME, "gemm by rank conjunction");
    let bt = b.clone().transpose(&[1, 0]);
    Array::collect(crate::from!(
        |i: Dim, j: Dim| dot(a.cell(i), bt.cell(j)),
        iota::<Dim>(m),
        iota::<Dim>(n)
    ))
}

/// `a * x` for rank-2 `a` and rank-1 `x`.
pub fn gemv<T: DType, const RA: Rank, const RX: Rank>(
    a: &View<'_, T, RA>,
    x: &View<'_, T, RX>,
) -> Array<T, 1> {
    check_matrix(0, a);
    let (m, k) = (a.size(0), a.size(1));
    check_inner(1, k, x.size(0));
    let mut c = Array::<T, 1>::zeros(&[m]);
    if m > 0 {
        let lhs = MatRef {
            ptr: a.as_ptr(),
            rs: a.stride(0),
            cs: a.stride(1),
        };
        let rhs = MatRef {
            ptr: x.as_ptr(),
            rs: x.stride(0),
            cs: 1,
        };
        let out = MatMut {
            ptr: c.as_mut_slice().as_mut_ptr(),
            rs: 1,
            cs: 1,
        };
        // SAFETY: as in `gemm`, with `x` seen as a `k x 1` matrix.
        if unsafe { T::launch_gemm(m as usize, 1, k as usize, lhs, rhs, out) } {
            debug!(m, k, dtype = T::NAME, "gemv kernel");
            return c;
        }
    }
    debug!(m, k, dtype = T::NAME, "gemv by rank conjunction");
    Array::collect(crate::from!(
        |i: Dim| dot(a.cell(i), x.clone()),
        iota::<Dim>(m)
    ))
}

/// `x * b` for rank-1 `x` and rank-2 `b`.
pub fn gevm<T: DType, const RX: Rank, const RB: Rank>(
    x: &View<'_, T, RX>,
    b: &View<'_, T, RB>,
) -> Array<T, 1> {
    check_matrix(1, b);
    let (k, n) = (b.size(0), b.size(1));
    check_inner(0, x.size(0), k);
    let mut c = Array::<T, 1>::zeros(&[n]);
    if n > 0 {
        let lhs = MatRef {
            ptr: x.as_ptr(),
            rs: 1,
            cs: x.stride(0),
        };
        let rhs = MatRef {
            ptr: b.as_ptr(),
            rs: b.stride(0),
            cs: b.stride(1),
        };
        let out = MatMut {
            ptr: c.as_mut_slice().as_mut_ptr(),
            rs: 1,
            cs: 1,
        };
        // SAFETY: as in `gemm`, with `x` seen as a `1 x k` matrix.
        if unsafe { T::launch_gemm(1, n as usize, k as usize, lhs, rhs, out) } {
            debug!(n, k, dtype = T::NAME, "gevm kernel");
            return c;
        }
    }
    debug!(n, k, dtype = T::NAME, "gevm by rank conjunction");
    let bt = b.clone().transpose(&[1, 0]);
    Array::collect(crate::from!(
        |j: Dim| dot(x.clone(), bt.cell(j)),
        iota::<Dim>(n)
    ))
}
