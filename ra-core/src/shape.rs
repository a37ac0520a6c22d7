use crate::extent::{Dim, Rank};

/// A shape known at compile time, laid out in C order.
pub trait Shape: 'static {
    const RANK: Rank;
    const DIMS: &'static [Dim];
    const STRIDES: &'static [Dim];

    fn shape() -> Vec<usize> {
        Self::DIMS.iter().map(|&d| d as usize).collect()
    }

    fn element_count() -> usize {
        Self::shape().iter().product()
    }
}

macro_rules! shape {
    ($name:ident, $rank:literal, ($($N:ident),*), ($($stride:expr),*)) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name<$(const $N: usize, )*>;

        impl<$(const $N: usize, )*> Shape for $name<$($N, )*> {
            const RANK: Rank = $rank;
            const DIMS: &'static [Dim] = &[$($N as Dim, )*];
            const STRIDES: &'static [Dim] = &[$(($stride) as Dim, )*];
        }
    };
}

shape!(R1, 1, (A), (1));
shape!(R2, 2, (A, B), (B, 1));
shape!(R3, 3, (A, B, C), (B * C, C, 1));
shape!(R4, 4, (A, B, C, D), (B * C * D, C * D, D, 1));
shape!(R5, 5, (A, B, C, D, E), (B * C * D * E, C * D * E, D * E, E, 1));
shape!(R6, 6, (A, B, C, D, E, F), (B * C * D * E * F, C * D * E * F, D * E * F, E * F, F, 1));
