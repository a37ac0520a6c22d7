//! Strided views over memory owned by a container, and their iterators.

use std::{
    borrow::Borrow,
    fmt::Debug,
    marker::PhantomData,
    ops::{AddAssign, DivAssign, MulAssign, SubAssign},
};

use crate::{
    atom::{deref, deref_mut, Iota, PtrFlat, PtrFlatMut},
    expr::{expr1, expr2},
    extent::{
        check_bounds, check_inside, check_range, dim_prod_all, dims_len, filldim,
        has_stride_zero, is_c_order, is_ravel_free, Dim, DimRec, Rank, DIM_ANY, DIM_BAD,
        RANK_ANY,
    },
    iter::{IntoRa, RaIter},
    ply::ply,
    shape::Shape,
    Error, Result,
};

/// How a dense iterator finds the size and stride of each axis.
pub trait Layout {
    const RANK_S: Rank;
    const SIZE_S: Dim;

    fn rank(&self) -> Rank;
    fn dim(&self, k: Rank) -> DimRec;
}

/// Dims held at run time, with the rank optionally fixed by `R`.
#[derive(Clone, Debug, PartialEq)]
pub struct DynLayout<const R: Rank> {
    dims: Vec<DimRec>,
}

impl<const R: Rank> Layout for DynLayout<R> {
    const RANK_S: Rank = R;
    const SIZE_S: Dim = DIM_ANY;

    #[inline(always)]
    fn rank(&self) -> Rank {
        if R == RANK_ANY {
            self.dims.len() as Rank
        } else {
            R
        }
    }

    #[inline(always)]
    fn dim(&self, k: Rank) -> DimRec {
        self.dims[k as usize]
    }
}

/// C-order dims fixed by a [`Shape`] type.
#[derive(Debug)]
pub struct FixedLayout<S>(PhantomData<S>);

impl<S> Default for FixedLayout<S> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<S> Clone for FixedLayout<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for FixedLayout<S> {}

impl<S: Shape> Layout for FixedLayout<S> {
    const RANK_S: Rank = S::RANK;
    const SIZE_S: Dim = dim_prod_all(S::DIMS);

    #[inline(always)]
    fn rank(&self) -> Rank {
        S::RANK
    }

    #[inline(always)]
    fn dim(&self, k: Rank) -> DimRec {
        DimRec::new(S::DIMS[k as usize], S::STRIDES[k as usize])
    }
}

/// Read iterator over a strided array.
pub struct Iter<'a, T, L> {
    p: *const T,
    l: L,
    _m: PhantomData<&'a T>,
}

/// Write iterator over a strided array. Yields `&mut T`.
pub struct IterMut<'a, T, L> {
    p: *mut T,
    l: L,
    _m: PhantomData<&'a mut T>,
}

impl<'a, T, L: Layout> Iter<'a, T, L> {
    pub(crate) fn new(p: *const T, l: L) -> Self {
        Self {
            p,
            l,
            _m: PhantomData,
        }
    }
}

impl<'a, T, L: Layout> IterMut<'a, T, L> {
    pub(crate) fn new(p: *mut T, l: L) -> Self {
        Self {
            p,
            l,
            _m: PhantomData,
        }
    }
}

macro_rules! dense_iter {
    ($name:ident, $flat:ident, $item:ty, $deref:ident, $writes:literal) => {
        impl<'a, T, L: Layout> RaIter for $name<'a, T, L> {
            type Item = $item;
            type Stride = Dim;
            type Flat<'s>
                = $flat<'a, T>
            where
                Self: 's;

            const RANK_S: Rank = L::RANK_S;
            const SIZE_S: Dim = L::SIZE_S;
            const WRITES: bool = $writes;

            #[inline(always)]
            fn rank(&self) -> Rank {
                self.l.rank()
            }

            #[inline(always)]
            fn size(&self, k: Rank) -> Dim {
                if k < self.l.rank() {
                    self.l.dim(k).size
                } else {
                    DIM_BAD
                }
            }

            #[inline(always)]
            fn stride(&self, k: Rank) -> Dim {
                if k < self.l.rank() {
                    self.l.dim(k).stride
                } else {
                    0
                }
            }

            #[inline(always)]
            fn compact_stride(&self, step: Dim, z: Rank, j: Rank) -> bool {
                step * self.stride(z) == self.stride(j)
            }

            #[inline(always)]
            fn adv(&mut self, k: Rank, d: Dim) {
                if k < self.l.rank() {
                    self.p = self.p.wrapping_offset(self.l.dim(k).stride * d);
                }
            }

            #[inline(always)]
            fn at(&mut self, i: &[Dim]) -> $item {
                let r = (self.l.rank() as usize).min(i.len());
                let mut c = 0;
                for (k, &ik) in i[..r].iter().enumerate() {
                    let d = self.l.dim(k as Rank);
                    check_bounds!(check_inside(k as Rank, ik, d.size));
                    c += ik * d.stride;
                }
                // SAFETY: every coordinate was checked against its axis.
                unsafe { $deref(self.p.wrapping_offset(c)) }
            }

            fn flat(&mut self) -> $flat<'a, T> {
                $flat::new(self.p)
            }
        }
    };
}

dense_iter!(Iter, PtrFlat, &'a T, deref, false);
dense_iter!(IterMut, PtrFlatMut, &'a mut T, deref_mut, true);

impl<T, L: Clone> Clone for Iter<'_, T, L> {
    fn clone(&self) -> Self {
        Self {
            p: self.p,
            l: self.l.clone(),
            _m: PhantomData,
        }
    }
}

// ---------------------------------------------------------------- views

/// A read-only strided view. `R` fixes the rank when known.
pub struct View<'a, T, const R: Rank = RANK_ANY> {
    p: *const T,
    dims: Vec<DimRec>,
    _m: PhantomData<&'a [T]>,
}

/// A writable strided view.
pub struct ViewMut<'a, T, const R: Rank = RANK_ANY> {
    p: *mut T,
    dims: Vec<DimRec>,
    _m: PhantomData<&'a mut [T]>,
}

impl<T, const R: Rank> Clone for View<'_, T, R> {
    fn clone(&self) -> Self {
        Self {
            p: self.p,
            dims: self.dims.clone(),
            _m: PhantomData,
        }
    }
}

fn check_rank<const R: Rank>(dims: &[DimRec]) {
    if R != RANK_ANY {
        assert_eq!(
            dims.len() as Rank,
            R,
            "view of rank {} built from {} dims",
            R,
            dims.len()
        );
    }
}

/// Move `p` and `dims` to read axis `k` backwards.
fn reverse_dims<P: Copy>(p: P, dims: &mut [DimRec], k: Rank, off: impl Fn(P, Dim) -> P) -> P {
    check_bounds!(check_inside(0, k, dims.len() as Dim));
    let d = &mut dims[k as usize];
    let p = if d.size > 0 {
        off(p, d.stride * (d.size - 1))
    } else {
        p
    };
    d.stride = -d.stride;
    p
}

/// Axis `i` of the source becomes axis `axes[i]` of the result. Axes named twice collapse
/// into a diagonal: their strides add and the smaller size wins.
fn transpose_dims(dims: &[DimRec], axes: &[Rank]) -> Vec<DimRec> {
    assert_eq!(
        axes.len(),
        dims.len(),
        "transpose needs one axis per dimension"
    );
    let rank = axes.iter().map(|&a| a + 1).max().unwrap_or(0);
    let mut out = vec![
        DimRec {
            size: DIM_BAD,
            stride: 0
        };
        rank as usize
    ];
    for (d, &a) in dims.iter().zip(axes) {
        assert!(a >= 0, "bad transpose axis {a}");
        let o = &mut out[a as usize];
        o.size = if o.size == DIM_BAD {
            d.size
        } else {
            o.size.min(d.size)
        };
        o.stride += d.stride;
    }
    if let Some(k) = out.iter().position(|d| d.size == DIM_BAD) {
        panic!("transpose leaves axis {k} undefined");
    }
    out
}

/// One subscript of [`View::select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sub {
    /// A single position. The axis is dropped.
    At(Dim),
    /// `len` positions from `org` by `step`. The axis is kept.
    Range { len: Dim, org: Dim, step: Dim },
    /// The whole axis.
    All,
    /// The next `n` axes, whole.
    Dots(Rank),
    /// `n` new axes of size 1 and stride 0. Takes no axis of the source.
    NewAxis(Rank),
}

impl From<Dim> for Sub {
    fn from(i: Dim) -> Self {
        Sub::At(i)
    }
}

impl From<Iota<Dim>> for Sub {
    fn from(i: Iota<Dim>) -> Self {
        Sub::Range {
            len: i.size,
            org: i.org,
            step: i.stride,
        }
    }
}

fn source_dim(dims: &[DimRec], k: usize) -> DimRec {
    match dims.get(k) {
        Some(&d) => d,
        None => panic!("subscript {k} past the rank {} of the view", dims.len()),
    }
}

/// Offset and dims of the subview picked by `subs`. Axes past the last subscript are kept.
fn select_dims(dims: &[DimRec], subs: &[Sub]) -> (Dim, Vec<DimRec>) {
    let mut out = Vec::with_capacity(dims.len());
    let mut off = 0;
    let mut k = 0;
    for s in subs {
        match *s {
            Sub::At(i) => {
                let d = source_dim(dims, k);
                check_bounds!(check_inside(k as Rank, i, d.size));
                off += i * d.stride;
                k += 1;
            }
            Sub::Range { len, org, step } => {
                let d = source_dim(dims, k);
                check_bounds!(check_range(k as Rank, len, org, step, d.size));
                out.push(DimRec::new(len, d.stride * step));
                off += org * d.stride;
                k += 1;
            }
            Sub::All => {
                out.push(source_dim(dims, k));
                k += 1;
            }
            Sub::Dots(n) => {
                for _ in 0..n {
                    out.push(source_dim(dims, k));
                    k += 1;
                }
            }
            Sub::NewAxis(n) => {
                out.extend(std::iter::repeat(DimRec::new(1, 0)).take(n.max(0) as usize));
            }
        }
    }
    out.extend_from_slice(&dims[k.min(dims.len())..]);
    (off, out)
}

/// Dims of `dims` read with `shape`. One `-1` in `shape` is deduced from the rest.
///
/// Trailing axes that match are kept as they are. If the source runs out of axes first, the
/// leading axes of the result are tiled with stride 0. Otherwise the source must be readable
/// as one run, and the result takes its first `shape.iter().product()` elements.
fn reshape_dims(dims: &[DimRec], shape: &[Dim]) -> Result<Vec<DimRec>> {
    let la = dims_len(dims) as Dim;
    let mut sb = shape.to_vec();
    if let Some(i) = sb.iter().position(|&s| s == -1) {
        let rest: Dim = sb
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &s)| s)
            .product();
        if rest <= 0 || la % rest != 0 {
            return Err(Error::LengthMismatch {
                shape: shape.to_vec(),
                expected: rest.max(0) as usize,
                found: la as usize,
            });
        }
        sb[i] = la / rest;
    }
    let (ra, rb) = (dims.len(), sb.len());
    let mut out = vec![DimRec::new(DIM_BAD, 0); rb];
    let mut i = 0;
    while i < ra && i < rb {
        let (da, sbi) = (dims[ra - i - 1], sb[rb - i - 1]);
        if da.size != sbi {
            let lb: Dim = sb.iter().product();
            if !is_ravel_free(dims) {
                return Err(Error::Layout {
                    op: "reshape",
                    dims: dims.to_vec(),
                });
            }
            if lb > la {
                return Err(Error::LengthMismatch {
                    shape: sb,
                    expected: lb.max(0) as usize,
                    found: la as usize,
                });
            }
            let s0 = dims.last().map_or(1, |d| d.stride);
            return Ok(filldim(&sb)
                .into_iter()
                .map(|d| DimRec::new(d.size, d.stride * s0))
                .collect());
        }
        out[rb - i - 1] = da;
        i += 1;
    }
    for j in i..rb {
        out[rb - j - 1] = DimRec::new(sb[rb - j - 1], 0);
    }
    Ok(out)
}

/// Dims of `dims` with the last axis, of size `n`, folded into the element.
fn explode_dims(dims: &[DimRec], n: usize) -> Result<Vec<DimRec>> {
    let n = n as Dim;
    let bad = || Error::Layout {
        op: "explode",
        dims: dims.to_vec(),
    };
    let (last, rest) = dims.split_last().ok_or_else(bad)?;
    if n == 0 || last.size != n || (n > 1 && last.stride != 1) {
        return Err(bad());
    }
    if rest.iter().any(|d| d.stride % n != 0) {
        return Err(bad());
    }
    Ok(rest
        .iter()
        .map(|d| DimRec::new(d.size, d.stride / n))
        .collect())
}

/// Inverse of [`explode_dims`].
fn collapse_dims(dims: &[DimRec], n: usize) -> Vec<DimRec> {
    let n = n as Dim;
    dims.iter()
        .map(|d| DimRec::new(d.size, d.stride * n))
        .chain(std::iter::once(DimRec::new(n, 1)))
        .collect()
}

macro_rules! view_common {
    ($name:ident, $ptr:ty, $unique:literal) => {
        impl<'a, T, const R: Rank> $name<'a, T, R> {
            pub(crate) fn from_raw(p: $ptr, dims: Vec<DimRec>) -> Self {
                check_rank::<R>(&dims);
                Self {
                    p,
                    dims,
                    _m: PhantomData,
                }
            }

            pub fn rank(&self) -> Rank {
                self.dims.len() as Rank
            }

            pub fn size(&self, k: Rank) -> Dim {
                self.dims[k as usize].size
            }

            pub fn stride(&self, k: Rank) -> Dim {
                self.dims[k as usize].stride
            }

            pub fn dims(&self) -> &[DimRec] {
                &self.dims
            }

            /// Position of the element at index zero.
            pub fn as_ptr(&self) -> $ptr {
                self.p
            }

            pub fn shape(&self) -> Vec<Dim> {
                self.dims.iter().map(|d| d.size).collect()
            }

            pub fn len(&self) -> usize {
                dims_len(&self.dims)
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn is_c_order(&self) -> bool {
                is_c_order(&self.dims)
            }

            fn offset(&self, i: &[Dim]) -> Dim {
                assert_eq!(i.len(), self.dims.len(), "index rank");
                let mut c = 0;
                for (k, (&ik, d)) in i.iter().zip(&self.dims).enumerate() {
                    check_bounds!(check_inside(k as Rank, ik, d.size));
                    c += ik * d.stride;
                }
                c
            }

            /// Reverse axis `k`.
            pub fn reverse(mut self, k: Rank) -> Self {
                self.p = reverse_dims(self.p, &mut self.dims, k, |p, o| p.wrapping_offset(o));
                self
            }

            /// Rearrange axes: axis `i` moves to `axes[i]`. Repeating an axis takes the diagonal.
            pub fn transpose(self, axes: &[Rank]) -> $name<'a, T> {
                $name::from_raw(self.p, transpose_dims(&self.dims, axes))
            }

            /// Main diagonal of a rank-2 view.
            pub fn diag(self) -> $name<'a, T, 1> {
                $name::from_raw(self.p, transpose_dims(&self.dims, &[0, 0]))
            }

            /// Subview picked by one subscript per leading axis. Positions drop their axis,
            /// ranges and `All` keep it.
            pub fn select(self, subs: &[Sub]) -> $name<'a, T> {
                let (off, dims) = select_dims(&self.dims, subs);
                if $unique && has_stride_zero(&dims) {
                    panic!("{}", Error::Layout { op: "select", dims });
                }
                $name::from_raw(self.p.wrapping_offset(off), dims)
            }

            /// The same elements read with another shape, without copying.
            pub fn reshape(self, shape: &[Dim]) -> Result<$name<'a, T>> {
                let dims = reshape_dims(&self.dims, shape)?;
                if $unique && has_stride_zero(&dims) {
                    return Err(Error::Layout { op: "reshape", dims });
                }
                Ok($name::from_raw(self.p, dims))
            }

            /// Fold the last axis, which must be contiguous and of size `N`, into the element
            /// type.
            pub fn explode<const N: usize>(self) -> Result<$name<'a, [T; N]>> {
                let dims = explode_dims(&self.dims, N)?;
                Ok($name::from_raw(self.p.cast::<[T; N]>(), dims))
            }
        }

        impl<'a, T, const N: usize, const R: Rank> $name<'a, [T; N], R> {
            /// Unfold array elements into a new last axis of size `N`.
            pub fn collapse(self) -> $name<'a, T> {
                $name::from_raw(self.p.cast::<T>(), collapse_dims(&self.dims, N))
            }
        }
    };
}

view_common!(View, *const T, false);
view_common!(ViewMut, *mut T, true);

impl<'a, T, const R: Rank> View<'a, T, R> {
    /// View a borrowed slice as a C-order array of `shape`.
    pub fn from_slice(data: &'a [T], shape: &[Dim]) -> Result<Self> {
        let dims = filldim(shape);
        let expected = dims_len(&dims);
        if expected != data.len() {
            return Err(Error::LengthMismatch {
                shape: shape.to_vec(),
                expected,
                found: data.len(),
            });
        }
        Ok(Self::from_raw(data.as_ptr(), dims))
    }

    pub fn iter(&self) -> Iter<'a, T, DynLayout<R>> {
        Iter::new(
            self.p,
            DynLayout {
                dims: self.dims.clone(),
            },
        )
    }

    pub fn get(&self, i: &[Dim]) -> &'a T {
        let c = self.offset(i);
        // SAFETY: `offset` checked the index against the shape.
        unsafe { &*self.p.wrapping_offset(c) }
    }

    /// Insert an axis of size 1 and stride 0 before axis `k`.
    pub fn newaxis(self, k: Rank) -> View<'a, T> {
        check_bounds!(check_inside(0, k, self.dims.len() as Dim + 1));
        let mut dims = self.dims;
        dims.insert(k as usize, DimRec::new(1, 0));
        View::from_raw(self.p, dims)
    }

    /// Repeat axis `k`, which must have size 1, `size` times. The axis gets stride 0, so every
    /// position along it reads the same elements.
    pub fn stretch(self, k: Rank, size: Dim) -> View<'a, T> {
        check_bounds!(check_inside(0, k, self.dims.len() as Dim));
        let d = self.dims[k as usize];
        assert!(d.size == 1, "can't stretch axis {k} of size {}", d.size);
        let mut dims = self.dims;
        dims[k as usize] = DimRec::new(size, 0);
        View::from_raw(self.p, dims)
    }

    /// The subarray at position `i` of the first axis.
    pub fn cell(&self, i: Dim) -> View<'a, T> {
        check_bounds!(check_inside(0, i, self.dims[0].size));
        View::from_raw(
            self.p.wrapping_offset(i * self.dims[0].stride),
            self.dims[1..].to_vec(),
        )
    }

    /// Elements in row-major order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        ply(expr1(|x: &T| out.push(x.clone()), self.iter()));
        out
    }
}

impl<'a, T, const R: Rank> ViewMut<'a, T, R> {
    pub fn view(&self) -> View<'_, T, R> {
        View::from_raw(self.p, self.dims.clone())
    }

    pub fn iter(&self) -> Iter<'_, T, DynLayout<R>> {
        Iter::new(
            self.p,
            DynLayout {
                dims: self.dims.clone(),
            },
        )
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, DynLayout<R>> {
        IterMut::new(
            self.p,
            DynLayout {
                dims: self.dims.clone(),
            },
        )
    }

    pub fn get(&self, i: &[Dim]) -> &T {
        let c = self.offset(i);
        // SAFETY: `offset` checked the index against the shape.
        unsafe { &*self.p.wrapping_offset(c) }
    }

    pub fn get_mut(&mut self, i: &[Dim]) -> &mut T {
        let c = self.offset(i);
        // SAFETY: as in `get`, and `self` is borrowed mutably.
        unsafe { &mut *self.p.wrapping_offset(c) }
    }

    pub fn cell_mut(&mut self, i: Dim) -> ViewMut<'_, T> {
        check_bounds!(check_inside(0, i, self.dims[0].size));
        ViewMut::from_raw(
            self.p.wrapping_offset(i * self.dims[0].stride),
            self.dims[1..].to_vec(),
        )
    }

    /// Copy `x` into this view; `x` must agree with the view's shape.
    pub fn assign<X>(&mut self, x: X)
    where
        X: IntoRa,
        <X::Iter as RaIter>::Item: Borrow<T>,
        T: Clone,
    {
        ply(expr2(
            |y: &mut T, x: <X::Iter as RaIter>::Item| *y = x.borrow().clone(),
            self.iter_mut(),
            x.start(),
        ));
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.view().to_vec()
    }
}

macro_rules! compound_assign {
    ($trait:ident, $fn:ident, $target:ident) => {
        impl<'a, T, X, const R: Rank> $trait<X> for $target<'a, T, R>
        where
            X: IntoRa,
            <X::Iter as RaIter>::Item: Borrow<T>,
            T: Clone + $trait,
        {
            fn $fn(&mut self, x: X) {
                ply(expr2(
                    |y: &mut T, x: <X::Iter as RaIter>::Item| y.$fn(x.borrow().clone()),
                    self.iter_mut(),
                    x.start(),
                ));
            }
        }
    };
}

compound_assign!(AddAssign, add_assign, ViewMut);
compound_assign!(SubAssign, sub_assign, ViewMut);
compound_assign!(MulAssign, mul_assign, ViewMut);
compound_assign!(DivAssign, div_assign, ViewMut);

impl<T: Debug, const R: Rank> Debug for View<'_, T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------- start

impl<'a, T, const R: Rank> IntoRa for View<'a, T, R> {
    type Iter = Iter<'a, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        Iter::new(self.p, DynLayout { dims: self.dims })
    }
}

impl<'a, T, const R: Rank> IntoRa for &View<'a, T, R> {
    type Iter = Iter<'a, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        self.iter()
    }
}

impl<'a, T, const R: Rank> IntoRa for ViewMut<'a, T, R> {
    type Iter = IterMut<'a, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        IterMut::new(self.p, DynLayout { dims: self.dims })
    }
}

impl<'v, T, const R: Rank> IntoRa for &'v mut ViewMut<'_, T, R> {
    type Iter = IterMut<'v, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        self.iter_mut()
    }
}

impl<'v, T, const R: Rank> IntoRa for &'v ViewMut<'_, T, R> {
    type Iter = Iter<'v, T, DynLayout<R>>;

    fn start(self) -> Self::Iter {
        self.iter()
    }
}

pub(crate) fn dyn_layout<const R: Rank>(dims: Vec<DimRec>) -> DynLayout<R> {
    DynLayout { dims }
}
