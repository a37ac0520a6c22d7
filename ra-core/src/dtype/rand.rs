use ::rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

#[cfg(feature = "bfloat")]
use half::bf16;
#[cfg(feature = "half")]
use half::f16;

use crate::{Error, Result};

/// Dispatch random fills based on the data type.
pub trait RandDispatch {
    /// Fill the slice with values drawn uniformly from `[lo, hi)`.
    fn fill_with_uniform<R: Rng + ?Sized>(rng: &mut R, slice: &mut [Self], lo: Self, hi: Self)
    where
        Self: Sized;

    /// Fill the slice with normal (Gaussian) random values.
    fn fill_with_normal<R: Rng + ?Sized>(
        rng: &mut R,
        slice: &mut [Self],
        mean: Self,
        std: Self,
    ) -> Result<()>
    where
        Self: Sized;
}

macro_rules! rand_float {
    ($rt:ident) => {
        impl RandDispatch for $rt {
            fn fill_with_uniform<R: Rng + ?Sized>(rng: &mut R, slice: &mut [Self], lo: Self, hi: Self) {
                let dist = Uniform::new(lo, hi);
                slice.iter_mut().for_each(|x| *x = dist.sample(rng));
            }

            fn fill_with_normal<R: Rng + ?Sized>(
                rng: &mut R,
                slice: &mut [Self],
                mean: Self,
                std: Self,
            ) -> Result<()> {
                let dist = Normal::new(mean, std).map_err(Error::wrap)?;
                slice.iter_mut().for_each(|x| *x = dist.sample(rng));
                Ok(())
            }
        }
    };
}

macro_rules! rand_integral {
    ($rt:ident) => {
        impl RandDispatch for $rt {
            fn fill_with_uniform<R: Rng + ?Sized>(rng: &mut R, slice: &mut [Self], lo: Self, hi: Self) {
                let dist = Uniform::new(lo, hi);
                slice.iter_mut().for_each(|x| *x = dist.sample(rng));
            }

            fn fill_with_normal<R: Rng + ?Sized>(
                _rng: &mut R,
                _slice: &mut [Self],
                _mean: Self,
                _std: Self,
            ) -> Result<()> {
                crate::bail!(
                    "Normal random fill is not supported for dtype {}",
                    stringify!($rt)
                )
            }
        }
    };
}

rand_float!(f32);
rand_float!(f64);
rand_integral!(u8);
rand_integral!(u32);
rand_integral!(u64);
rand_integral!(usize);
rand_integral!(i32);
rand_integral!(i64);
rand_integral!(isize);

macro_rules! rand_half {
    ($rt:ident) => {
        impl RandDispatch for $rt {
            fn fill_with_uniform<R: Rng + ?Sized>(rng: &mut R, slice: &mut [Self], lo: Self, hi: Self) {
                let dist = Uniform::new(lo.to_f32(), hi.to_f32());
                slice
                    .iter_mut()
                    .for_each(|x| *x = $rt::from_f32(dist.sample(rng)));
            }

            fn fill_with_normal<R: Rng + ?Sized>(
                rng: &mut R,
                slice: &mut [Self],
                mean: Self,
                std: Self,
            ) -> Result<()> {
                let dist = Normal::new(mean.to_f32(), std.to_f32()).map_err(Error::wrap)?;
                slice
                    .iter_mut()
                    .for_each(|x| *x = $rt::from_f32(dist.sample(rng)));
                Ok(())
            }
        }
    };
}

#[cfg(feature = "half")]
rand_half!(f16);
#[cfg(feature = "bfloat")]
rand_half!(bf16);
