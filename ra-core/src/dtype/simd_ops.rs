#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use std::ops::{Add, Div, Mul, Sub};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOpType {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOpType {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    #[inline(always)]
    pub fn apply<T>(&self, l: T, r: T) -> T
    where
        T: Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Div<Output = T>,
    {
        match self {
            Self::Add => l + r,
            Self::Sub => l - r,
            Self::Mul => l * r,
            Self::Div => l / r,
        }
    }
}

/// Bulk element-wise arithmetic over contiguous buffers of equal length.
pub trait SimdSupported {
    // In elements, the lane count of one block.
    const BLOCK_SIZE: usize = 8;

    fn binary_simd_op(a: &[Self], b: &[Self], out: &mut [Self], op: BinaryOpType)
    where
        Self: Sized;

    fn binary_simd_op_inplace_lhs(a: &mut [Self], b: &[Self], op: BinaryOpType)
    where
        Self: Sized;
}

#[cfg(feature = "short-vector")]
const LANES: usize = 8;

#[cfg(feature = "short-vector")]
macro_rules! simd_supported {
    ($t:ident) => {
        impl SimdSupported for $t {
            const BLOCK_SIZE: usize = LANES;

            fn binary_simd_op(a: &[Self], b: &[Self], out: &mut [Self], op: BinaryOpType) {
                let len = out.len();
                let n_blocks = len / Self::BLOCK_SIZE;

                for i in 0..n_blocks {
                    let off = i * Self::BLOCK_SIZE;
                    let l = std::simd::Simd::<$t, LANES>::from_slice(
                        &a[off..off + Self::BLOCK_SIZE],
                    );
                    let r = std::simd::Simd::<$t, LANES>::from_slice(
                        &b[off..off + Self::BLOCK_SIZE],
                    );
                    let res = op.apply(l, r);
                    out[off..off + Self::BLOCK_SIZE].copy_from_slice(res.as_array());
                }
                // Scalar fallback for remainder
                for i in n_blocks * Self::BLOCK_SIZE..len {
                    out[i] = op.apply(a[i], b[i]);
                }
            }

            fn binary_simd_op_inplace_lhs(a: &mut [Self], b: &[Self], op: BinaryOpType) {
                let len = a.len();
                let n_blocks = len / Self::BLOCK_SIZE;

                for i in 0..n_blocks {
                    let off = i * Self::BLOCK_SIZE;
                    let l = std::simd::Simd::<$t, LANES>::from_slice(
                        &a[off..off + Self::BLOCK_SIZE],
                    );
                    let r = std::simd::Simd::<$t, LANES>::from_slice(
                        &b[off..off + Self::BLOCK_SIZE],
                    );
                    let res = op.apply(l, r);
                    a[off..off + Self::BLOCK_SIZE].copy_from_slice(res.as_array());
                }
                for i in n_blocks * Self::BLOCK_SIZE..len {
                    a[i] = op.apply(a[i], b[i]);
                }
            }
        }
    };
}

macro_rules! nosimd_supported {
    ($t:ident) => {
        impl SimdSupported for $t {
            fn binary_simd_op(a: &[Self], b: &[Self], out: &mut [Self], op: BinaryOpType) {
                use rayon::prelude::*;

                out.par_iter_mut()
                    .zip(a.par_iter().zip(b))
                    .for_each(|(out, (lhs, rhs))| *out = op.apply(*lhs, *rhs));
            }

            fn binary_simd_op_inplace_lhs(a: &mut [Self], b: &[Self], op: BinaryOpType) {
                use rayon::prelude::*;

                a.par_iter_mut()
                    .zip(b)
                    .for_each(|(lhs, rhs)| *lhs = op.apply(*lhs, *rhs));
            }
        }
    };
}

#[cfg(feature = "short-vector")]
mod lanes {
    use super::*;

    simd_supported!(f32);
    simd_supported!(f64);
    simd_supported!(u8);
    simd_supported!(u32);
    simd_supported!(u64);
    simd_supported!(usize);
    simd_supported!(i32);
    simd_supported!(i64);
    simd_supported!(isize);
}

#[cfg(not(feature = "short-vector"))]
mod lanes {
    use super::*;

    nosimd_supported!(f32);
    nosimd_supported!(f64);
    nosimd_supported!(u8);
    nosimd_supported!(u32);
    nosimd_supported!(u64);
    nosimd_supported!(usize);
    nosimd_supported!(i32);
    nosimd_supported!(i64);
    nosimd_supported!(isize);
}

#[cfg(feature = "half")]
nosimd_supported!(f16);
#[cfg(feature = "bfloat")]
nosimd_supported!(bf16);
