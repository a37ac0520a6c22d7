use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use crate::{extent::Dim, ops::Elem};

pub use self::gemm::{GemmDispatch, MatMut, MatRef};
pub use self::rand::RandDispatch;
pub use self::simd_ops::{BinaryOpType, SimdSupported};

mod gemm;
mod rand;
mod simd_ops;

/// Type which can be square-rooted.
/// If self<0 and Self is integral, then the output is 0
pub trait Sqrtable {
    fn sqrt(&self) -> Self
    where
        Self: Sized;
}

impl Sqrtable for f32 {
    fn sqrt(&self) -> Self {
        f32::sqrt(*self)
    }
}

impl Sqrtable for f64 {
    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }
}

#[cfg(feature = "bfloat")]
impl Sqrtable for bf16 {
    fn sqrt(&self) -> Self {
        bf16::from_f64_const(self.to_f64_const().sqrt())
    }
}

#[cfg(feature = "half")]
impl Sqrtable for f16 {
    fn sqrt(&self) -> Self {
        f16::from_f64_const(self.to_f64_const().sqrt())
    }
}

macro_rules! sqrt_integral {
    ($($t:ty),+) => {
        $(
            impl Sqrtable for $t {
                fn sqrt(&self) -> Self {
                    (*self as f64).max(0.).sqrt() as $t
                }
            }
        )+
    };
}

sqrt_integral!(u8, u32, u64, usize, i32, i64, isize);

/// Moving an arithmetic progression by `d` steps of `stride`.
///
/// Integral types wrap, so that a traversal may step below zero and come back (e.g. when
/// rewinding an axis of an unsigned progression) without overflowing.
pub trait Advance {
    fn advance(self, d: Dim, stride: Self) -> Self;
}

macro_rules! advance_integral {
    ($($t:ty),+) => {
        $(
            impl Advance for $t {
                #[inline(always)]
                fn advance(self, d: Dim, stride: Self) -> Self {
                    self.wrapping_add((d as $t).wrapping_mul(stride))
                }
            }
        )+
    };
}

advance_integral!(u8, u32, u64, usize, i32, i64, isize);

impl Advance for f32 {
    #[inline(always)]
    fn advance(self, d: Dim, stride: Self) -> Self {
        self + d as f32 * stride
    }
}

impl Advance for f64 {
    #[inline(always)]
    fn advance(self, d: Dim, stride: Self) -> Self {
        self + d as f64 * stride
    }
}

#[cfg(feature = "half")]
impl Advance for f16 {
    fn advance(self, d: Dim, stride: Self) -> Self {
        f16::from_f64(self.to_f64() + d as f64 * stride.to_f64())
    }
}

#[cfg(feature = "bfloat")]
impl Advance for bf16 {
    fn advance(self, d: Dim, stride: Self) -> Self {
        bf16::from_f64(self.to_f64() + d as f64 * stride.to_f64())
    }
}

pub trait DTypeOps:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Div<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Sqrtable
    + Advance
    + SimdSupported
    + GemmDispatch
    + RandDispatch
{
}

/// Element types the numeric operations are defined for.
pub trait DType: Debug + Clone + DTypeOps + Elem<T = Self> + Send + Sync + 'static {
    const ZERO: Self;
    const ONE: Self;
    /// Smallest and largest values, the identities of `amax` and `amin`.
    const MIN: Self;
    const MAX: Self;
    const NAME: &'static str;
    const INTEGRAL: bool;

    fn to_f64(&self) -> f64;
    fn from_f64(x: f64) -> Self;
    fn from_dim(d: Dim) -> Self;
}

macro_rules! dtype {
    ($rt:ident, $zero:expr, $one:expr, $integral:expr) => {
        impl DTypeOps for $rt {}
        impl DType for $rt {
            const ZERO: $rt = $zero;
            const ONE: $rt = $one;
            const MIN: $rt = $rt::MIN;
            const MAX: $rt = $rt::MAX;
            const NAME: &'static str = stringify!($rt);
            const INTEGRAL: bool = $integral;

            fn to_f64(&self) -> f64 {
                *self as f64
            }
            fn from_f64(x: f64) -> Self {
                x as $rt
            }
            fn from_dim(d: Dim) -> Self {
                d as $rt
            }
        }
    };
}

dtype!(u8, 0u8, 1u8, true);
dtype!(u32, 0u32, 1u32, true);
dtype!(u64, 0u64, 1u64, true);
dtype!(usize, 0usize, 1usize, true);
dtype!(i32, 0i32, 1i32, true);
dtype!(i64, 0i64, 1i64, true);
dtype!(isize, 0isize, 1isize, true);
dtype!(f32, 0f32, 1f32, false);
dtype!(f64, 0f64, 1f64, false);

#[cfg(feature = "half")]
impl DTypeOps for f16 {}
#[cfg(feature = "half")]
impl DType for f16 {
    const ZERO: f16 = f16::from_f64_const(0.0);
    const ONE: f16 = f16::from_f64_const(1.0);
    const MIN: f16 = f16::MIN;
    const MAX: f16 = f16::MAX;
    const NAME: &'static str = "f16";
    const INTEGRAL: bool = false;

    fn to_f64(&self) -> f64 {
        self.to_f64_const()
    }
    fn from_f64(x: f64) -> Self {
        Self::from_f64_const(x)
    }
    fn from_dim(d: Dim) -> Self {
        Self::from_f64_const(d as f64)
    }
}
#[cfg(feature = "bfloat")]
impl DTypeOps for bf16 {}
#[cfg(feature = "bfloat")]
impl DType for bf16 {
    const ZERO: bf16 = bf16::from_f64_const(0.0);
    const ONE: bf16 = bf16::from_f64_const(1.0);
    const MIN: bf16 = bf16::MIN;
    const MAX: bf16 = bf16::MAX;
    const NAME: &'static str = "bf16";
    const INTEGRAL: bool = false;

    fn to_f64(&self) -> f64 {
        self.to_f64_const()
    }
    fn from_f64(x: f64) -> Self {
        Self::from_f64_const(x)
    }
    fn from_dim(d: Dim) -> Self {
        Self::from_f64_const(d as f64)
    }
}
