use ::gemm::{gemm, Parallelism};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use crate::extent::Dim;

/// A strided matrix operand: base pointer, row stride, column stride.
#[derive(Clone, Copy, Debug)]
pub struct MatRef<T> {
    pub ptr: *const T,
    pub rs: Dim,
    pub cs: Dim,
}

#[derive(Clone, Copy, Debug)]
pub struct MatMut<T> {
    pub ptr: *mut T,
    pub rs: Dim,
    pub cs: Dim,
}

pub trait GemmDispatch {
    /// Matrix multiplication `(M x K) * (K x N) = (M x N)` into `out`, which is overwritten.
    /// Returns `false` for element types without a tuned kernel, leaving `out` untouched.
    ///
    /// # Safety
    /// All three operands must be valid for their full `m`, `n`, `k` extents and `out` must
    /// not overlap the inputs.
    unsafe fn launch_gemm(
        _m: usize,
        _n: usize,
        _k: usize,
        _lhs: MatRef<Self>,
        _rhs: MatRef<Self>,
        _out: MatMut<Self>,
    ) -> bool
    where
        Self: Sized,
    {
        false
    }
}

macro_rules! instantiate_gemm {
    ($rt:ident, $zero:expr, $one:expr, GEMM) => {
        impl GemmDispatch for $rt {
            unsafe fn launch_gemm(
                m: usize,
                n: usize,
                k: usize,
                lhs: MatRef<Self>,
                rhs: MatRef<Self>,
                out: MatMut<Self>,
            ) -> bool {
                let num_threads = num_cpus::get();
                let parallelism = if num_threads > 1 {
                    Parallelism::Rayon(num_threads)
                } else {
                    Parallelism::None
                };

                gemm(
                    /* m: usize = */ m,
                    /* n: usize = */ n,
                    /* k: usize = */ k,
                    /* dst: *mut T = */ out.ptr,
                    /* dst_cs: isize = */ out.cs,
                    /* dst_rs: isize = */ out.rs,
                    /* read_dst: bool = */ false,
                    /* lhs: *const T = */ lhs.ptr,
                    /* lhs_cs: isize = */ lhs.cs,
                    /* lhs_rs: isize = */ lhs.rs,
                    /* rhs: *const T = */ rhs.ptr,
                    /* rhs_cs: isize = */ rhs.cs,
                    /* rhs_rs: isize = */ rhs.rs,
                    /* alpha: T = */ $zero,
                    /* beta: T = */ $one,
                    /* conj_dst: bool = */ false,
                    /* conj_lhs: bool = */ false,
                    /* conj_rhs: bool = */ false,
                    parallelism,
                );
                true
            }
        }
    };
    ($rt:ident, NAIVE) => {
        impl GemmDispatch for $rt {}
    };
}

instantiate_gemm!(f32, 0f32, 1f32, GEMM);
instantiate_gemm!(f64, 0f64, 1f64, GEMM);
instantiate_gemm!(u8, NAIVE);
instantiate_gemm!(u32, NAIVE);
instantiate_gemm!(u64, NAIVE);
instantiate_gemm!(usize, NAIVE);
instantiate_gemm!(i32, NAIVE);
instantiate_gemm!(i64, NAIVE);
instantiate_gemm!(isize, NAIVE);
#[cfg(feature = "half")]
instantiate_gemm!(f16, NAIVE);
#[cfg(feature = "bfloat")]
instantiate_gemm!(bf16, NAIVE);
