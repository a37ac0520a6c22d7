//! Arithmetic on [`Iota`] that yields another progression instead of an expression node.
//!
//! With `optimize-iota` off (and always for floating point, where folding would change
//! rounding) the same operators build ordinary expression nodes.

use std::ops::{Add, Mul, Sub};

use crate::{
    atom::{scalar, Iota, Scalar},
    expr::{expr2, Expr},
};
#[cfg(feature = "optimize-iota")]
use crate::{
    error::Error,
    extent::{check_bounds, Dim},
};

#[cfg(feature = "optimize-iota")]
fn check_same(a: Dim, b: Dim) -> crate::Result<()> {
    if a == b {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            arg: 1,
            axis: 0,
            expected: a,
            found: b,
        })
    }
}

/// Elementwise operation on two progressions, as an expression node.
pub type IotaExpr<T, B> = Expr<fn(T, T) -> T, (Iota<T>, B)>;

#[cfg(feature = "optimize-iota")]
macro_rules! iota_fold {
    ($($t:ident),+) => {
        $(
            impl Add<$t> for Iota<$t> {
                type Output = Iota<$t>;

                fn add(self, k: $t) -> Iota<$t> {
                    self.affine(self.org.wrapping_add(k), self.stride, self.cursor().wrapping_add(k))
                }
            }

            impl Add<Iota<$t>> for $t {
                type Output = Iota<$t>;

                fn add(self, i: Iota<$t>) -> Iota<$t> {
                    i + self
                }
            }

            impl Sub<$t> for Iota<$t> {
                type Output = Iota<$t>;

                fn sub(self, k: $t) -> Iota<$t> {
                    self.affine(self.org.wrapping_sub(k), self.stride, self.cursor().wrapping_sub(k))
                }
            }

            impl Sub<Iota<$t>> for $t {
                type Output = Iota<$t>;

                fn sub(self, i: Iota<$t>) -> Iota<$t> {
                    i.affine(
                        self.wrapping_sub(i.org),
                        i.stride.wrapping_neg(),
                        self.wrapping_sub(i.cursor()),
                    )
                }
            }

            impl Mul<$t> for Iota<$t> {
                type Output = Iota<$t>;

                fn mul(self, k: $t) -> Iota<$t> {
                    self.affine(
                        self.org.wrapping_mul(k),
                        self.stride.wrapping_mul(k),
                        self.cursor().wrapping_mul(k),
                    )
                }
            }

            impl Mul<Iota<$t>> for $t {
                type Output = Iota<$t>;

                fn mul(self, i: Iota<$t>) -> Iota<$t> {
                    i * self
                }
            }

            impl Add for Iota<$t> {
                type Output = Iota<$t>;

                fn add(self, b: Iota<$t>) -> Iota<$t> {
                    check_bounds!(check_same(self.size, b.size));
                    self.affine(
                        self.org.wrapping_add(b.org),
                        self.stride.wrapping_add(b.stride),
                        self.cursor().wrapping_add(b.cursor()),
                    )
                }
            }

            impl Sub for Iota<$t> {
                type Output = Iota<$t>;

                fn sub(self, b: Iota<$t>) -> Iota<$t> {
                    check_bounds!(check_same(self.size, b.size));
                    self.affine(
                        self.org.wrapping_sub(b.org),
                        self.stride.wrapping_sub(b.stride),
                        self.cursor().wrapping_sub(b.cursor()),
                    )
                }
            }
        )+
    };
}

macro_rules! iota_expr {
    ($($t:ident),+) => {
        $(
            impl Add<$t> for Iota<$t> {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn add(self, k: $t) -> Self::Output {
                    expr2(<$t as Add>::add as fn($t, $t) -> $t, self, scalar(k))
                }
            }

            impl Sub<$t> for Iota<$t> {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn sub(self, k: $t) -> Self::Output {
                    expr2(<$t as Sub>::sub as fn($t, $t) -> $t, self, scalar(k))
                }
            }

            impl Mul<$t> for Iota<$t> {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn mul(self, k: $t) -> Self::Output {
                    expr2(<$t as Mul>::mul as fn($t, $t) -> $t, self, scalar(k))
                }
            }

            impl Add<Iota<$t>> for $t {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn add(self, i: Iota<$t>) -> Self::Output {
                    expr2(<$t as Add>::add as fn($t, $t) -> $t, i, scalar(self))
                }
            }

            impl Sub<Iota<$t>> for $t {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn sub(self, i: Iota<$t>) -> Self::Output {
                    expr2((|i: $t, k: $t| k - i) as fn($t, $t) -> $t, i, scalar(self))
                }
            }

            impl Mul<Iota<$t>> for $t {
                type Output = IotaExpr<$t, Scalar<$t>>;

                fn mul(self, i: Iota<$t>) -> Self::Output {
                    expr2(<$t as Mul>::mul as fn($t, $t) -> $t, i, scalar(self))
                }
            }

            impl Add for Iota<$t> {
                type Output = IotaExpr<$t, Iota<$t>>;

                fn add(self, b: Iota<$t>) -> Self::Output {
                    expr2(<$t as Add>::add as fn($t, $t) -> $t, self, b)
                }
            }

            impl Sub for Iota<$t> {
                type Output = IotaExpr<$t, Iota<$t>>;

                fn sub(self, b: Iota<$t>) -> Self::Output {
                    expr2(<$t as Sub>::sub as fn($t, $t) -> $t, self, b)
                }
            }
        )+
    };
}

#[cfg(feature = "optimize-iota")]
iota_fold!(u8, u32, u64, usize, i32, i64, isize);
#[cfg(not(feature = "optimize-iota"))]
iota_expr!(u8, u32, u64, usize, i32, i64, isize);
iota_expr!(f32, f64);
