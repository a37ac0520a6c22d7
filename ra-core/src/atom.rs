//! Leaves that are not backed by a strided array.

use std::marker::PhantomData;

use crate::{
    dtype::DType,
    extent::{check_bounds, check_inside, check_size, Dim, Rank, DIM_ANY, DIM_BAD, RANK_BAD},
    iter::{Flat, IntoRa, RaIter},
};

// ---------------------------------------------------------------- scalar

/// A rank-0 operand that yields a clone of its value everywhere.
#[derive(Clone, Debug)]
pub struct Scalar<T> {
    c: T,
}

pub fn scalar<T: Clone>(c: T) -> Scalar<T> {
    Scalar { c }
}

impl<T> Scalar<T> {
    pub fn into_inner(self) -> T {
        self.c
    }
}

pub struct ScalarFlat<'s, T> {
    c: &'s T,
}

impl<T: Clone> Flat for ScalarFlat<'_, T> {
    type Item = T;
    type Stride = Dim;

    #[inline(always)]
    fn get(&mut self) -> T {
        self.c.clone()
    }

    #[inline(always)]
    fn step(&mut self, _s: Dim) {}
}

impl<T: Clone> RaIter for Scalar<T> {
    type Item = T;
    type Stride = Dim;
    type Flat<'s>
        = ScalarFlat<'s, T>
    where
        Self: 's;

    const RANK_S: Rank = 0;
    const SIZE_S: Dim = 1;

    fn rank(&self) -> Rank {
        0
    }

    fn size(&self, _k: Rank) -> Dim {
        DIM_BAD
    }

    fn stride(&self, _k: Rank) -> Dim {
        0
    }

    fn compact_stride(&self, _step: Dim, _z: Rank, _j: Rank) -> bool {
        true
    }

    #[inline(always)]
    fn adv(&mut self, _k: Rank, _d: Dim) {}

    #[inline(always)]
    fn at(&mut self, _i: &[Dim]) -> T {
        self.c.clone()
    }

    fn flat(&mut self) -> ScalarFlat<'_, T> {
        ScalarFlat { c: &self.c }
    }
}

macro_rules! scalar_start {
    ($($t:ty),+) => {
        $(
            impl IntoRa for $t {
                type Iter = Scalar<$t>;

                fn start(self) -> Scalar<$t> {
                    scalar(self)
                }
            }
        )+
    };
}

scalar_start!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);
#[cfg(feature = "half")]
scalar_start!(half::f16);
#[cfg(feature = "bfloat")]
scalar_start!(half::bf16);

// ---------------------------------------------------------------- iota

/// The arithmetic progression `org, org + stride, ..` of `size` terms.
///
/// Holds no storage: the cursor is the current value and advancing adds to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Iota<T> {
    pub(crate) size: Dim,
    pub(crate) org: T,
    pub(crate) stride: T,
    i: T,
}

impl<T: DType> Iota<T> {
    pub fn new(size: Dim, org: T, stride: T) -> Self {
        check_bounds!(check_size(0, size));
        Self {
            size,
            org,
            stride,
            i: org,
        }
    }

    pub fn org(&self) -> T {
        self.org
    }

    pub fn step_by(&self) -> T {
        self.stride
    }

    /// The value at the cursor.
    pub fn cursor(&self) -> T {
        self.i
    }

    /// `org + k * stride` with the cursor moved along in the same way.
    pub(crate) fn affine(self, org: T, stride: T, i: T) -> Self {
        Self {
            size: self.size,
            org,
            stride,
            i,
        }
    }
}

/// `0, 1, .., size - 1`.
pub fn iota<T: DType>(size: Dim) -> Iota<T> {
    Iota::new(size, T::ZERO, T::ONE)
}

pub fn iota_from<T: DType>(size: Dim, org: T, stride: T) -> Iota<T> {
    Iota::new(size, org, stride)
}

pub struct IotaFlat<T> {
    i: T,
    stride: T,
}

impl<T: DType> Flat for IotaFlat<T> {
    type Item = T;
    type Stride = Dim;

    #[inline(always)]
    fn get(&mut self) -> T {
        self.i
    }

    #[inline(always)]
    fn step(&mut self, d: Dim) {
        self.i = self.i.advance(d, self.stride);
    }
}

impl<T: DType> RaIter for Iota<T> {
    type Item = T;
    type Stride = Dim;
    type Flat<'s>
        = IotaFlat<T>
    where
        Self: 's;

    const RANK_S: Rank = 1;
    const SIZE_S: Dim = DIM_ANY;

    fn rank(&self) -> Rank {
        1
    }

    fn size(&self, k: Rank) -> Dim {
        if k == 0 {
            self.size
        } else {
            DIM_BAD
        }
    }

    fn stride(&self, k: Rank) -> Dim {
        (k == 0) as Dim
    }

    fn compact_stride(&self, _step: Dim, z: Rank, j: Rank) -> bool {
        (z == 0) == (j == 0)
    }

    #[inline(always)]
    fn adv(&mut self, k: Rank, d: Dim) {
        if k == 0 {
            self.i = self.i.advance(d, self.stride);
        }
    }

    #[inline(always)]
    fn at(&mut self, i: &[Dim]) -> T {
        check_bounds!(check_inside(0, i[0], self.size));
        self.i.advance(i[0], self.stride)
    }

    fn flat(&mut self) -> IotaFlat<T> {
        IotaFlat {
            i: self.i,
            stride: self.stride,
        }
    }
}

// ---------------------------------------------------------------- positional index

/// Yields its own coordinate along axis `W`. Has no shape of its own, so it only appears
/// next to operands that provide one and forces indexed traversal.
#[derive(Clone, Copy, Debug, Default)]
pub struct TensorIndex<const W: usize>;

pub const fn ti<const W: usize>() -> TensorIndex<W> {
    TensorIndex
}

/// Placeholder cursor for leaves that can only be read through `at`.
pub struct NoFlat<T>(PhantomData<T>);

impl<T> Flat for NoFlat<T> {
    type Item = T;
    type Stride = Dim;

    fn get(&mut self) -> T {
        unreachable!("positional index has no flat cursor")
    }

    fn step(&mut self, _s: Dim) {}
}

impl<const W: usize> RaIter for TensorIndex<W> {
    type Item = Dim;
    type Stride = Dim;
    type Flat<'s>
        = NoFlat<Dim>
    where
        Self: 's;

    const RANK_S: Rank = RANK_BAD;
    const SIZE_S: Dim = DIM_BAD;
    const HAS_INDEX: bool = true;

    fn rank(&self) -> Rank {
        RANK_BAD
    }

    fn size(&self, _k: Rank) -> Dim {
        DIM_BAD
    }

    fn stride(&self, _k: Rank) -> Dim {
        0
    }

    fn compact_stride(&self, _step: Dim, _z: Rank, _j: Rank) -> bool {
        false
    }

    #[inline(always)]
    fn adv(&mut self, _k: Rank, _d: Dim) {}

    #[inline(always)]
    fn at(&mut self, i: &[Dim]) -> Dim {
        i[W]
    }

    fn flat(&mut self) -> NoFlat<Dim> {
        NoFlat(PhantomData)
    }
}

// ---------------------------------------------------------------- foreign vectors

/// Cursor over contiguous or strided memory. Steps use wrapping offsets since the last step
/// of a run leaves the cursor one stride past the end.
pub struct PtrFlat<'a, T> {
    p: *const T,
    _m: PhantomData<&'a T>,
}

impl<'a, T> PtrFlat<'a, T> {
    pub(crate) fn new(p: *const T) -> Self {
        Self { p, _m: PhantomData }
    }
}

impl<'a, T> Flat for PtrFlat<'a, T> {
    type Item = &'a T;
    type Stride = Dim;

    #[inline(always)]
    fn get(&mut self) -> &'a T {
        // SAFETY: traversals only dereference positions inside the checked shape.
        unsafe { &*self.p }
    }

    #[inline(always)]
    fn step(&mut self, s: Dim) {
        self.p = self.p.wrapping_offset(s);
    }
}

pub struct PtrFlatMut<'a, T> {
    p: *mut T,
    _m: PhantomData<&'a mut T>,
}

impl<'a, T> PtrFlatMut<'a, T> {
    pub(crate) fn new(p: *mut T) -> Self {
        Self { p, _m: PhantomData }
    }
}

impl<'a, T> Flat for PtrFlatMut<'a, T> {
    type Item = &'a mut T;
    type Stride = Dim;

    #[inline(always)]
    fn get(&mut self) -> &'a mut T {
        // SAFETY: as for `PtrFlat`. Nodes reject broadcasting an operand that writes, so each
        // position is handed out once per traversal.
        unsafe { &mut *self.p }
    }

    #[inline(always)]
    fn step(&mut self, s: Dim) {
        self.p = self.p.wrapping_offset(s);
    }
}

macro_rules! vector_iter {
    ($name:ident, $flat:ident, $ptr:ty, $item:ty, $deref:ident, $writes:literal) => {
        impl<'a, T> $name<'a, T> {
            fn offset(&self, i: Dim) -> $ptr {
                self.p.wrapping_offset(i)
            }
        }

        impl<'a, T> RaIter for $name<'a, T> {
            type Item = $item;
            type Stride = Dim;
            type Flat<'s>
                = $flat<'a, T>
            where
                Self: 's;

            const RANK_S: Rank = 1;
            const SIZE_S: Dim = Self::SIZE;
            const WRITES: bool = $writes;

            fn rank(&self) -> Rank {
                1
            }

            fn size(&self, k: Rank) -> Dim {
                if k == 0 {
                    self.len
                } else {
                    DIM_BAD
                }
            }

            fn stride(&self, k: Rank) -> Dim {
                (k == 0) as Dim
            }

            fn compact_stride(&self, _step: Dim, z: Rank, j: Rank) -> bool {
                (z == 0) == (j == 0)
            }

            #[inline(always)]
            fn adv(&mut self, k: Rank, d: Dim) {
                if k == 0 {
                    self.p = self.p.wrapping_offset(d);
                }
            }

            #[inline(always)]
            fn at(&mut self, i: &[Dim]) -> $item {
                if Self::SIZE != DIM_BAD {
                    check_bounds!(check_inside(0, i[0], self.len));
                }
                // SAFETY: checked above; `Ptr` leaves bounds to the caller.
                unsafe { $deref(self.offset(i[0])) }
            }

            fn flat(&mut self) -> $flat<'a, T> {
                $flat::new(self.p)
            }
        }
    };
}

#[inline(always)]
pub(crate) unsafe fn deref<'a, T>(p: *const T) -> &'a T {
    &*p
}

#[inline(always)]
pub(crate) unsafe fn deref_mut<'a, T>(p: *mut T) -> &'a mut T {
    &mut *p
}

/// Rank-1 read iterator over borrowed contiguous memory.
pub struct Vector<'a, T> {
    p: *const T,
    len: Dim,
    _m: PhantomData<&'a [T]>,
}

impl<'a, T> Vector<'a, T> {
    const SIZE: Dim = DIM_ANY;

    pub fn new(s: &'a [T]) -> Self {
        Self {
            p: s.as_ptr(),
            len: s.len() as Dim,
            _m: PhantomData,
        }
    }
}

/// Rank-1 write iterator over borrowed contiguous memory.
pub struct VectorMut<'a, T> {
    p: *mut T,
    len: Dim,
    _m: PhantomData<&'a mut [T]>,
}

impl<'a, T> VectorMut<'a, T> {
    const SIZE: Dim = DIM_ANY;

    pub fn new(s: &'a mut [T]) -> Self {
        Self {
            p: s.as_mut_ptr(),
            len: s.len() as Dim,
            _m: PhantomData,
        }
    }
}

/// Rank-1 iterator over memory of unknown length. Every access is the caller's
/// responsibility.
pub struct Ptr<'a, T> {
    p: *const T,
    len: Dim,
    _m: PhantomData<&'a T>,
}

impl<'a, T> Ptr<'a, T> {
    const SIZE: Dim = DIM_BAD;
}

/// Wrap a raw pointer.
///
/// # Safety
/// Every position the expression visits must be valid for reads for `'a`.
pub unsafe fn ptr<'a, T>(p: *const T) -> Ptr<'a, T> {
    Ptr {
        p,
        len: DIM_BAD,
        _m: PhantomData,
    }
}

vector_iter!(Vector, PtrFlat, *const T, &'a T, deref, false);
vector_iter!(VectorMut, PtrFlatMut, *mut T, &'a mut T, deref_mut, true);
vector_iter!(Ptr, PtrFlat, *const T, &'a T, deref, false);

impl<'a, T> IntoRa for &'a [T] {
    type Iter = Vector<'a, T>;

    fn start(self) -> Vector<'a, T> {
        Vector::new(self)
    }
}

impl<'a, T> IntoRa for &'a Vec<T> {
    type Iter = Vector<'a, T>;

    fn start(self) -> Vector<'a, T> {
        Vector::new(self)
    }
}

impl<'a, T, const N: usize> IntoRa for &'a [T; N] {
    type Iter = Vector<'a, T>;

    fn start(self) -> Vector<'a, T> {
        Vector::new(self)
    }
}

impl<'a, T> IntoRa for &'a mut [T] {
    type Iter = VectorMut<'a, T>;

    fn start(self) -> VectorMut<'a, T> {
        VectorMut::new(self)
    }
}

impl<'a, T> IntoRa for &'a mut Vec<T> {
    type Iter = VectorMut<'a, T>;

    fn start(self) -> VectorMut<'a, T> {
        VectorMut::new(self)
    }
}

/// Rank-1 iterator that owns its elements and yields clones, for temporaries and literals.
#[derive(Clone, Debug)]
pub struct OwnedVector<T> {
    v: Vec<T>,
    i: Dim,
}

pub struct OwnedFlat<'s, T> {
    v: &'s [T],
    i: Dim,
}

impl<T: Clone> Flat for OwnedFlat<'_, T> {
    type Item = T;
    type Stride = Dim;

    #[inline(always)]
    fn get(&mut self) -> T {
        self.v[self.i as usize].clone()
    }

    #[inline(always)]
    fn step(&mut self, s: Dim) {
        self.i += s;
    }
}

impl<T: Clone> RaIter for OwnedVector<T> {
    type Item = T;
    type Stride = Dim;
    type Flat<'s>
        = OwnedFlat<'s, T>
    where
        Self: 's;

    const RANK_S: Rank = 1;
    const SIZE_S: Dim = DIM_ANY;

    fn rank(&self) -> Rank {
        1
    }

    fn size(&self, k: Rank) -> Dim {
        if k == 0 {
            self.v.len() as Dim
        } else {
            DIM_BAD
        }
    }

    fn stride(&self, k: Rank) -> Dim {
        (k == 0) as Dim
    }

    fn compact_stride(&self, _step: Dim, z: Rank, j: Rank) -> bool {
        (z == 0) == (j == 0)
    }

    #[inline(always)]
    fn adv(&mut self, k: Rank, d: Dim) {
        if k == 0 {
            self.i += d;
        }
    }

    fn at(&mut self, i: &[Dim]) -> T {
        check_bounds!(check_inside(0, self.i + i[0], self.v.len() as Dim));
        self.v[(self.i + i[0]) as usize].clone()
    }

    fn flat(&mut self) -> OwnedFlat<'_, T> {
        OwnedFlat {
            v: &self.v,
            i: self.i,
        }
    }
}

impl<T: Clone> IntoRa for Vec<T> {
    type Iter = OwnedVector<T>;

    fn start(self) -> OwnedVector<T> {
        OwnedVector { v: self, i: 0 }
    }
}

impl<T: Clone, const N: usize> IntoRa for [T; N] {
    type Iter = OwnedVector<T>;

    fn start(self) -> OwnedVector<T> {
        OwnedVector {
            v: self.into(),
            i: 0,
        }
    }
}
