use std::{
    marker::PhantomData,
    ops::{Add, Div, Mul, Sub},
};

use crate::{
    dtype::{BinaryOpType, DType},
    extent::DimRec,
    iter::IntoRa,
    shape::Shape,
    view::{FixedLayout, Iter, IterMut, View, ViewMut},
    Error, Result, R1, R2, R3,
};

/// Storage whose shape is part of its type. Traversals over it use the static plan.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<S: Shape, T> {
    data: Vec<T>,
    _ghost: PhantomData<S>,
}

impl<S: Shape, T> Tensor<S, T> {
    fn from_data(data: Vec<T>) -> Self {
        Self {
            data,
            _ghost: PhantomData,
        }
    }

    /// Take ownership of `data`, which must hold exactly the elements of `S` in C order.
    pub fn from_vec(data: Vec<T>) -> Result<Self> {
        let expected = S::element_count();
        if data.len() != expected {
            return Err(Error::LengthMismatch {
                shape: S::DIMS.to_vec(),
                expected,
                found: data.len(),
            });
        }
        Ok(Self::from_data(data))
    }

    pub fn full(x: T) -> Self
    where
        T: Clone,
    {
        Self::from_data(vec![x; S::element_count()])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn dims() -> Vec<DimRec> {
        S::DIMS
            .iter()
            .zip(S::STRIDES)
            .map(|(&size, &stride)| DimRec::new(size, stride))
            .collect()
    }

    pub fn view(&self) -> View<'_, T> {
        View::from_raw(self.data.as_ptr(), Self::dims())
    }

    pub fn view_mut(&mut self) -> ViewMut<'_, T> {
        ViewMut::from_raw(self.data.as_mut_ptr(), Self::dims())
    }

    pub fn iter(&self) -> Iter<'_, T, FixedLayout<S>> {
        Iter::new(self.data.as_ptr(), FixedLayout::default())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, FixedLayout<S>> {
        IterMut::new(self.data.as_mut_ptr(), FixedLayout::default())
    }
}

impl<S: Shape, T: DType> Tensor<S, T> {
    pub fn zeros() -> Self {
        Self::full(T::ZERO)
    }

    pub fn ones() -> Self {
        Self::full(T::ONE)
    }

    /// `0, 1, ..` in row-major order.
    pub fn arange() -> Self {
        Self::from_data((0..S::element_count()).map(|i| T::from_dim(i as isize)).collect())
    }

    /// Convert every element to `U` through `f64`.
    pub fn cast<U: DType>(&self) -> Tensor<S, U> {
        Tensor::from_data(self.data.iter().map(|x| U::from_f64(x.to_f64())).collect())
    }
}

impl<T: Clone, const A: usize> Tensor<R1<A>, T> {
    /// Get data for a vector.
    pub fn data(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T: Clone, const A: usize, const B: usize> Tensor<R2<A, B>, T> {
    /// Get data for a matrix.
    pub fn data(&self) -> Vec<Vec<T>> {
        self.data.chunks(B).map(|row| row.to_vec()).collect()
    }
}

impl<T: Clone, const A: usize, const B: usize, const C: usize> Tensor<R3<A, B, C>, T> {
    /// Get data for a 3 dimensional tensor.
    pub fn data(&self) -> Vec<Vec<Vec<T>>> {
        self.data
            .chunks(B * C)
            .map(|plane| plane.chunks(C).map(|row| row.to_vec()).collect())
            .collect()
    }
}

macro_rules! binary_op {
    ($trait:ident, $fn:ident, $op:ident) => {
        impl<S: Shape, T: DType> $trait for &Tensor<S, T> {
            type Output = Tensor<S, T>;

            fn $fn(self, rhs: Self) -> Tensor<S, T> {
                let mut out = vec![T::ZERO; self.data.len()];
                T::binary_simd_op(&self.data, &rhs.data, &mut out, BinaryOpType::$op);
                Tensor::from_data(out)
            }
        }

        impl<S: Shape, T: DType> $trait for Tensor<S, T> {
            type Output = Tensor<S, T>;

            fn $fn(mut self, rhs: Self) -> Tensor<S, T> {
                T::binary_simd_op_inplace_lhs(&mut self.data, &rhs.data, BinaryOpType::$op);
                self
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);

impl<'a, S: Shape, T> IntoRa for &'a Tensor<S, T> {
    type Iter = Iter<'a, T, FixedLayout<S>>;

    fn start(self) -> Self::Iter {
        self.iter()
    }
}

impl<'a, S: Shape, T> IntoRa for &'a mut Tensor<S, T> {
    type Iter = IterMut<'a, T, FixedLayout<S>>;

    fn start(self) -> Self::Iter {
        self.iter_mut()
    }
}
