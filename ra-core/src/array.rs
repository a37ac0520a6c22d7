use std::{
    borrow::Borrow,
    fmt::Debug,
    ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign},
};

use rand::thread_rng;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    dtype::DType,
    expr::expr1,
    extent::{check_bounds, check_inside, dims_len, filldim, Dim, DimRec, Rank, RANK_ANY},
    iter::{IntoRa, RaIter},
    ply::ply,
    view::{dyn_layout, DynLayout, Iter, IterMut, View, ViewMut},
    Error, Result,
};

/// Owned C-order array. `R` fixes the rank when known.
#[derive(Clone, PartialEq)]
pub struct Array<T, const R: Rank = RANK_ANY> {
    data: Vec<T>,
    dims: Vec<DimRec>,
}

impl<T, const R: Rank> Array<T, R> {
    fn check_rank(shape: &[Dim]) {
        if R != RANK_ANY {
            assert_eq!(shape.len() as Rank, R, "array of rank {R} given shape {shape:?}");
        }
    }

    /// Take ownership of `data` as an array of `shape`.
    pub fn from_vec(shape: &[Dim], data: Vec<T>) -> Result<Self> {
        Self::check_rank(shape);
        let dims = filldim(shape);
        let expected = dims_len(&dims);
        if expected != data.len() {
            return Err(Error::LengthMismatch {
                shape: shape.to_vec(),
                expected,
                found: data.len(),
            });
        }
        Ok(Self { data, dims })
    }

    pub fn from_elem(shape: &[Dim], x: T) -> Self
    where
        T: Clone,
    {
        Self::check_rank(shape);
        let dims = filldim(shape);
        let data = vec![x; dims_len(&dims)];
        Self { data, dims }
    }

    /// Element at each position given by `f` of its coordinates, in row-major order.
    pub fn from_fn(shape: &[Dim], mut f: impl FnMut(&[Dim]) -> T) -> Self {
        Self::check_rank(shape);
        let dims = filldim(shape);
        let mut data = Vec::with_capacity(dims_len(&dims));
        let mut i = vec![0; shape.len()];
        if !shape.contains(&0) {
            loop {
                data.push(f(&i));
                let mut k = shape.len();
                let more = loop {
                    if k == 0 {
                        break false;
                    }
                    k -= 1;
                    i[k] += 1;
                    if i[k] < shape[k] {
                        break true;
                    }
                    i[k] = 0;
                };
                if !more {
                    break;
                }
            }
        }
        Self { data, dims }
    }

    /// Evaluate an expression into new storage of its shape.
    pub fn collect<A: RaIter<Item = T>>(a: A) -> Self {
        let shape = a.shape();
        Self::check_rank(&shape);
        let dims = filldim(&shape);
        let mut data = Vec::with_capacity(dims_len(&dims));
        ply(expr1(|x: T| data.push(x), a));
        debug_assert_eq!(data.len(), dims_len(&dims));
        Self { data, dims }
    }

    pub fn rank(&self) -> Rank {
        self.dims.len() as Rank
    }

    pub fn size(&self, k: Rank) -> Dim {
        self.dims[k as usize].size
    }

    pub fn shape(&self) -> Vec<Dim> {
        self.dims.iter().map(|d| d.size).collect()
    }

    pub fn dims(&self) -> &[DimRec] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.clone()
    }

    /// Same elements under a new shape of equal size.
    pub fn reshape(self, shape: &[Dim]) -> Result<Array<T>> {
        Array::from_vec(shape, self.data)
    }

    pub fn view(&self) -> View<'_, T, R> {
        View::from_raw(self.data.as_ptr(), self.dims.clone())
    }

    pub fn view_mut(&mut self) -> ViewMut<'_, T, R> {
        ViewMut::from_raw(self.data.as_mut_ptr(), self.dims.clone())
    }

    pub fn iter(&self) -> Iter<'_, T, DynLayout<R>> {
        Iter::new(self.data.as_ptr(), dyn_layout(self.dims.clone()))
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, DynLayout<R>> {
        IterMut::new(self.data.as_mut_ptr(), dyn_layout(self.dims.clone()))
    }

    fn offset(&self, i: &[Dim]) -> usize {
        assert_eq!(i.len(), self.dims.len(), "index rank");
        let mut c = 0;
        for (k, (&ik, d)) in i.iter().zip(&self.dims).enumerate() {
            check_bounds!(check_inside(k as Rank, ik, d.size));
            c += ik * d.stride;
        }
        c as usize
    }

    pub fn get(&self, i: &[Dim]) -> &T {
        &self.data[self.offset(i)]
    }

    pub fn get_mut(&mut self, i: &[Dim]) -> &mut T {
        let c = self.offset(i);
        &mut self.data[c]
    }

    /// Copy `x` into this array; `x` must agree with the array's shape.
    pub fn assign<X>(&mut self, x: X)
    where
        X: IntoRa,
        <X::Iter as RaIter>::Item: Borrow<T>,
        T: Clone,
    {
        self.view_mut().assign(x)
    }
}

impl<T: DType, const R: Rank> Array<T, R> {
    pub fn zeros(shape: &[Dim]) -> Self {
        Self::from_elem(shape, T::ZERO)
    }

    pub fn ones(shape: &[Dim]) -> Self {
        Self::from_elem(shape, T::ONE)
    }

    /// Values drawn uniformly from `[lo, hi)`.
    pub fn rand_uniform(shape: &[Dim], lo: T, hi: T) -> Self {
        let mut a = Self::zeros(shape);
        debug!(shape = ?shape, dtype = T::NAME, "uniform fill");
        T::fill_with_uniform(&mut thread_rng(), &mut a.data, lo, hi);
        a
    }

    /// Values drawn from a normal distribution. Fails for integral element types.
    pub fn randn(shape: &[Dim], mean: T, std: T) -> Result<Self> {
        let mut a = Self::zeros(shape);
        debug!(shape = ?shape, dtype = T::NAME, "normal fill");
        T::fill_with_normal(&mut thread_rng(), &mut a.data, mean, std)?;
        Ok(a)
    }

    /// `0, 1, ..` in row-major order.
    pub fn arange(shape: &[Dim]) -> Self {
        let mut n = 0;
        Self::from_fn(shape, |_| {
            n += 1;
            T::from_dim(n - 1)
        })
    }

    /// Set every element to `x`, in parallel.
    pub fn fill(&mut self, x: T) {
        debug!(len = self.data.len(), "fill");
        self.data.par_iter_mut().for_each(|y| *y = x);
    }

    /// Apply `f` to every element in place, in parallel.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(T) -> T + Sync + Send,
    {
        debug!(len = self.data.len(), "apply");
        self.data.par_iter_mut().for_each(|y| *y = f(*y));
    }
}

impl<T, const R: Rank> Index<&[Dim]> for Array<T, R> {
    type Output = T;

    fn index(&self, i: &[Dim]) -> &T {
        self.get(i)
    }
}

impl<T, const R: Rank> IndexMut<&[Dim]> for Array<T, R> {
    fn index_mut(&mut self, i: &[Dim]) -> &mut T {
        self.get_mut(i)
    }
}

impl<T, const R: Rank, const N: usize> Index<[Dim; N]> for Array<T, R> {
    type Output = T;

    fn index(&self, i: [Dim; N]) -> &T {
        self.get(&i)
    }
}

impl<T, const R: Rank, const N: usize> IndexMut<[Dim; N]> for Array<T, R> {
    fn index_mut(&mut self, i: [Dim; N]) -> &mut T {
        &mut self[&i[..]]
    }
}

macro_rules! compound_assign {
    ($trait:ident, $fn:ident) => {
        impl<T, X, const R: Rank> $trait<X> for Array<T, R>
        where
            X: IntoRa,
            <X::Iter as RaIter>::Item: Borrow<T>,
            T: Clone + $trait,
        {
            fn $fn(&mut self, x: X) {
                self.view_mut().$fn(x)
            }
        }
    };
}

compound_assign!(AddAssign, add_assign);
compound_assign!(SubAssign, sub_assign);
compound_assign!(MulAssign, mul_assign);
compound_assign!(DivAssign, div_assign);

impl<T: Debug, const R: Rank> Debug for Array<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape())
            .field("data", &self.data)
            .finish()
    }
}

impl<'a, T, const R: Rank> IntoRa for &'a Array<T, R> {
    type Iter = Iter<'a, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        self.iter()
    }
}

impl<'a, T, const R: Rank> IntoRa for &'a mut Array<T, R> {
    type Iter = IterMut<'a, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        self.iter_mut()
    }
}
