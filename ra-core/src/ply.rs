//! Traversal of a started expression.
//!
//! Every strategy visits positions in row-major order of the driver's shape, so a traversal
//! that collects values produces the same sequence whichever strategy runs.

use std::{fmt, ops::ControlFlow};

use tracing::trace;

use crate::{
    extent::{Dim, Rank, DIM_ANY},
    iter::{Flat, RaIter},
    Error,
};

/// How [`ply`] traverses a given expression type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Coordinates and `at` per position.
    Index,
    /// Flat cursor over merged trailing axes, shape read at run time.
    Ravel,
    /// Same loop structure as `Ravel` for statically sized trees.
    Static,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Index => "index",
            Strategy::Ravel => "ravel",
            Strategy::Static => "static",
        };
        f.write_str(s)
    }
}

/// The strategy [`ply`] picks for `A`.
pub const fn strategy<A: RaIter>() -> Strategy {
    if A::HAS_INDEX {
        Strategy::Index
    } else if A::SIZE_S == DIM_ANY {
        Strategy::Ravel
    } else {
        Strategy::Static
    }
}

/// Shape of the driver, which must have a concrete rank and a concrete size on every axis.
fn checked_shape<A: RaIter>(a: &A) -> Vec<Dim> {
    let r = a.rank();
    if r < 0 {
        panic!("{}", Error::BadRank(r));
    }
    let sha = a.shape();
    if let Some(k) = sha.iter().position(|&s| s < 0) {
        panic!(
            "{}",
            Error::UndefinedSize {
                axis: k as Rank,
                size: sha[k]
            }
        );
    }
    sha
}

/// Next row-major position after `i`, or `false` past the end.
#[inline]
fn next_index(i: &mut [Dim], sha: &[Dim]) -> bool {
    for k in (0..i.len()).rev() {
        i[k] += 1;
        if i[k] < sha[k] {
            return true;
        }
        i[k] = 0;
    }
    false
}

/// Number of trailing axes that can run as one, and their combined length.
fn merge_trailing<A: RaIter>(a: &A, sha: &[Dim]) -> (usize, Dim) {
    let rank = sha.len();
    let inner = (rank - 1) as Rank;
    let mut ss = sha[rank - 1];
    let mut ocd = 1;
    while ocd < rank {
        let k = rank - 1 - ocd;
        if !a.compact_stride(ss, inner, k as Rank) {
            break;
        }
        ss *= sha[k];
        ocd += 1;
    }
    (ocd, ss)
}

#[inline(always)]
fn run_flat<A: RaIter>(a: &mut A, ss: Dim, s0: A::Stride) {
    let mut f = a.flat();
    for _ in 0..ss {
        f.get();
        f.step(s0);
    }
}

/// Visit every position through `at`, innermost axis fastest.
pub fn ply_index<A: RaIter>(mut a: A) {
    let sha = checked_shape(&a);
    let rank = sha.len();
    if sha.contains(&0) {
        return;
    }
    let mut i = vec![0; rank];
    loop {
        a.at(&i);
        if !next_index(&mut i, &sha) {
            break;
        }
    }
}

/// Visit every position through the flat cursor, merging compatible trailing axes into one
/// run and carrying the rest with `adv`.
pub fn ply_ravel<A: RaIter>(mut a: A) {
    let sha = checked_shape(&a);
    let rank = sha.len();
    if rank == 0 {
        a.flat().get();
        return;
    }
    if sha.contains(&0) {
        return;
    }
    let (ocd, ss) = merge_trailing(&a, &sha);
    let s0 = a.stride((rank - 1) as Rank);
    trace!(rank, merged = ocd, run = ss, "ravel");
    let mut dim = vec![0; rank - ocd];
    loop {
        run_flat(&mut a, ss, s0);
        let mut k = rank - ocd;
        loop {
            if k == 0 {
                return;
            }
            k -= 1;
            dim[k] += 1;
            if dim[k] < sha[k] {
                a.adv(k as Rank, 1);
                break;
            }
            dim[k] = 0;
            a.adv(k as Rank, 1 - sha[k]);
        }
    }
}

fn plyf_outer<A: RaIter>(a: &mut A, k: usize, outer: usize, sha: &[Dim], ss: Dim, s0: A::Stride) {
    if k == outer {
        run_flat(a, ss, s0);
        return;
    }
    for _ in 0..sha[k] {
        plyf_outer(a, k + 1, outer, sha, ss, s0);
        a.adv(k as Rank, 1);
    }
    a.adv(k as Rank, -sha[k]);
}

/// Nested loops over the outer axes and a flat run over the merged trailing axes. Leaves the
/// cursor where it started.
pub fn plyf<A: RaIter>(mut a: A) {
    let sha = checked_shape(&a);
    let rank = sha.len();
    if rank == 0 {
        a.flat().get();
        return;
    }
    if sha.contains(&0) {
        return;
    }
    let (ocd, ss) = merge_trailing(&a, &sha);
    let s0 = a.stride((rank - 1) as Rank);
    plyf_outer(&mut a, 0, rank - ocd, &sha, ss, s0);
}

/// Row-major traversal by coordinates, unravelling a linear position.
pub fn plyf_index<A: RaIter>(mut a: A) {
    let sha = checked_shape(&a);
    let rank = sha.len();
    let len: Dim = sha.iter().product();
    let mut i = vec![0; rank];
    for n in 0..len {
        let mut m = n;
        for k in (0..rank).rev() {
            i[k] = m % sha[k];
            m /= sha[k];
        }
        a.at(&i);
    }
}

/// Traverse `a` for the side effects of its operators.
pub fn ply<A: RaIter>(a: A) {
    let s = strategy::<A>();
    trace!(strategy = %s, rank = A::RANK_S, size = A::SIZE_S, "ply");
    match s {
        Strategy::Index => ply_index(a),
        Strategy::Ravel => ply_ravel(a),
        Strategy::Static => plyf(a),
    }
}

/// Traverse `a` in row-major order, feeding each value to `f` until it breaks. Returns the
/// break value, or `default` if the traversal ran to the end.
pub fn ply_exit<A, R, F>(mut a: A, default: R, mut f: F) -> R
where
    A: RaIter,
    F: FnMut(A::Item) -> ControlFlow<R>,
{
    let sha = checked_shape(&a);
    let rank = sha.len();
    if rank == 0 {
        let v = if A::HAS_INDEX { a.at(&[]) } else { a.flat().get() };
        return match f(v) {
            ControlFlow::Break(r) => r,
            ControlFlow::Continue(()) => default,
        };
    }
    if sha.contains(&0) {
        return default;
    }
    if rank == 1 && !A::HAS_INDEX {
        trace!(size = sha[0], "ply_exit flat");
        let s0 = a.stride(0);
        let mut c = a.flat();
        for _ in 0..sha[0] {
            if let ControlFlow::Break(r) = f(c.get()) {
                return r;
            }
            c.step(s0);
        }
        return default;
    }
    trace!(rank, "ply_exit index");
    let mut i = vec![0; rank];
    loop {
        if let ControlFlow::Break(r) = f(a.at(&i)) {
            return r;
        }
        if !next_index(&mut i, &sha) {
            return default;
        }
    }
}
