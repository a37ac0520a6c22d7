//! Extents and ranks that may be known, unknown until running, or structurally absent.
//!
//! Both are plain `isize` so that they can appear in associated consts and const generics.
//! The two sentinels are far from any real size and never collide with a valid extent.

use crate::{Error, Result};

/// Length of one axis.
pub type Dim = isize;
/// Number of axes.
pub type Rank = isize;

/// Extent only known while running.
pub const DIM_ANY: Dim = -1073741823;
/// Extent that does not exist (e.g. a positional index has no size of its own).
pub const DIM_BAD: Dim = -1073741824;
/// Rank only known while running.
pub const RANK_ANY: Rank = DIM_ANY;
/// Rank that does not exist.
pub const RANK_BAD: Rank = DIM_BAD;

/// Whether bounds and agreement checks are compiled in.
pub const CHECK_BOUNDS: bool = cfg!(feature = "bounds-check");

/// Run a `Result<()>` check and panic with the formatted error if it fails.
///
/// With `bounds-check` off the argument is never evaluated.
macro_rules! check_bounds {
    ($check:expr) => {
        if $crate::extent::CHECK_BOUNDS {
            if let Err(e) = $check {
                panic!("{e}");
            }
        }
    };
}
pub(crate) use check_bounds;

/// `0 <= i < b`.
#[inline(always)]
pub const fn inside(i: Dim, b: Dim) -> bool {
    i >= 0 && i < b
}

/// `lo <= i < hi`.
#[inline(always)]
pub const fn inside_range(i: Dim, lo: Dim, hi: Dim) -> bool {
    i >= lo && i < hi
}

pub const fn is_known(d: Dim) -> bool {
    d >= 0
}

pub fn check_inside(axis: Rank, index: Dim, size: Dim) -> Result<()> {
    if inside(index, size) {
        Ok(())
    } else {
        Err(Error::OutOfBounds { axis, index, size })
    }
}

/// `len` positions from `org` by `step` all fall in `0..size`. An empty range may start at
/// `size`.
pub fn check_range(axis: Rank, len: Dim, org: Dim, step: Dim, size: Dim) -> Result<()> {
    check_size(axis, len)?;
    if len == 0 {
        return if org >= 0 && org <= size {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                axis,
                index: org,
                size,
            })
        };
    }
    check_inside(axis, org, size)?;
    check_inside(axis, org + (len - 1) * step, size)
}

pub fn check_size(axis: Rank, size: Dim) -> Result<()> {
    if size >= 0 {
        Ok(())
    } else {
        Err(Error::NegativeSize { axis, size })
    }
}

pub const fn dim_prod(a: Dim, b: Dim) -> Dim {
    if a == DIM_BAD || b == DIM_BAD {
        DIM_BAD
    } else if a == DIM_ANY || b == DIM_ANY {
        DIM_ANY
    } else {
        a * b
    }
}

pub const fn dim_prod_all(dims: &[Dim]) -> Dim {
    let mut p = 1;
    let mut k = 0;
    while k < dims.len() {
        p = dim_prod(p, dims[k]);
        k += 1;
    }
    p
}

pub const fn rank_sum(a: Rank, b: Rank) -> Rank {
    if a == RANK_BAD || b == RANK_BAD {
        RANK_BAD
    } else if a == RANK_ANY || b == RANK_ANY {
        RANK_ANY
    } else {
        a + b
    }
}

pub const fn rank_diff(a: Rank, b: Rank) -> Rank {
    if a == RANK_BAD || b == RANK_BAD {
        RANK_BAD
    } else if a == RANK_ANY || b == RANK_ANY {
        RANK_ANY
    } else {
        a - b
    }
}

/// Cell rank of an operand of rank `rank` when `crank` is requested. A negative `crank`
/// counts frame axes instead: `-1` keeps one frame axis and makes the rest cell.
pub const fn dependent_cell_rank(rank: Rank, crank: Rank) -> Rank {
    if crank >= 0 {
        crank
    } else if rank == RANK_ANY {
        RANK_ANY
    } else {
        rank + crank
    }
}

pub const fn dependent_frame_rank(rank: Rank, crank: Rank) -> Rank {
    if rank == RANK_ANY {
        RANK_ANY
    } else if crank >= 0 {
        rank - crank
    } else {
        -crank
    }
}

/// One axis of a memory-backed array. Strides are in elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DimRec {
    pub size: Dim,
    pub stride: Dim,
}

impl DimRec {
    pub const fn new(size: Dim, stride: Dim) -> Self {
        Self { size, stride }
    }
}

/// C-order (row-major) dims for `shape`.
pub fn filldim(shape: &[Dim]) -> Vec<DimRec> {
    let mut dims = vec![DimRec::default(); shape.len()];
    let mut acc = 1;
    for (k, &size) in shape.iter().enumerate().rev() {
        check_bounds!(check_size(k as Rank, size));
        dims[k] = DimRec::new(size, acc);
        acc *= size;
    }
    dims
}

/// Number of elements described by `dims`.
pub fn dims_len(dims: &[DimRec]) -> usize {
    dims.iter().map(|d| d.size.max(0) as usize).product()
}

/// Whether some element is reached from more than one position: an axis of stride 0 and
/// size above 1.
pub fn has_stride_zero(dims: &[DimRec]) -> bool {
    dims.iter().any(|d| d.stride == 0 && d.size > 1)
}

/// Whether `dims` lay out a block that is C-contiguous up to the stride of the last axis, so
/// it can be read as a single run. Axes of size 1 can have any stride.
pub fn is_ravel_free(dims: &[DimRec]) -> bool {
    let Some(last) = dims.last() else {
        return true;
    };
    let mut acc = last.stride;
    for d in dims.iter().rev() {
        if d.size == 0 {
            return true;
        }
        if d.size != 1 {
            if d.stride != acc {
                return false;
            }
            acc *= d.size;
        }
    }
    true
}

/// Whether `dims` lay out a C-contiguous block. Axes of size 1 can have any stride.
pub fn is_c_order(dims: &[DimRec]) -> bool {
    let mut acc = 1;
    for d in dims.iter().rev() {
        if d.size == 0 {
            return true;
        }
        if d.size != 1 {
            if d.stride != acc {
                return false;
            }
            acc *= d.size;
        }
    }
    true
}
