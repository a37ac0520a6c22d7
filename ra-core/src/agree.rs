//! Choosing the driver of an expression and checking that the other operands agree with it.
//!
//! The driver is the operand whose shape becomes the shape of the expression. Operands of
//! lower rank agree if their axes match a prefix of the driver's; they are broadcast over the
//! rest because `adv` past their rank does nothing.

use crate::{
    extent::{Dim, Rank, DIM_ANY, DIM_BAD, RANK_ANY, RANK_BAD},
    Error, Result,
};

/// Whether an operand with static rank `ra` and size `sa` should drive rather than one with
/// `rb`, `sb`. Ties go to the first.
///
/// | ranks             | winner                   |
/// |-------------------|--------------------------|
/// | b invalid         | a                        |
/// | a invalid         | b                        |
/// | both dynamic      | by size                  |
/// | one dynamic       | the dynamic one          |
/// | both fixed        | larger, equal by size    |
///
/// Sizes: invalid loses, then unknown beats known, then the larger known size wins.
pub const fn pick_driver(ra: Rank, sa: Dim, rb: Rank, sb: Dim) -> bool {
    if rb == RANK_BAD {
        true
    } else if ra == RANK_BAD {
        false
    } else if ra == RANK_ANY && rb == RANK_ANY {
        pick_by_size(sa, sb)
    } else if rb == RANK_ANY {
        false
    } else if ra == RANK_ANY {
        true
    } else if ra > rb {
        true
    } else if ra < rb {
        false
    } else {
        pick_by_size(sa, sb)
    }
}

const fn pick_by_size(sa: Dim, sb: Dim) -> bool {
    if sb == DIM_BAD {
        true
    } else if sa == DIM_BAD {
        false
    } else if sa == DIM_ANY {
        true
    } else if sb == DIM_ANY {
        false
    } else {
        sa >= sb
    }
}

/// Index of the driver among operands with the given static ranks and sizes.
pub const fn driver_index(ranks: &[Rank], sizes: &[Dim]) -> usize {
    let mut best = 0;
    let mut i = 1;
    while i < ranks.len() {
        if !pick_driver(ranks[best], sizes[best], ranks[i], sizes[i]) {
            best = i;
        }
        i += 1;
    }
    best
}

/// Whether live-axis count `ra` should drive rather than `rb` in a frame match.
pub const fn gt_rank(ra: Rank, rb: Rank) -> bool {
    if rb == RANK_BAD {
        true
    } else if rb == RANK_ANY {
        ra == RANK_ANY
    } else if ra == RANK_BAD {
        false
    } else if ra == RANK_ANY {
        true
    } else {
        ra >= rb
    }
}

/// Index of the largest of `ranks` by [`gt_rank`], first on ties.
pub fn largest_rank(ranks: &[Rank]) -> usize {
    let mut best = 0;
    for (i, &r) in ranks.iter().enumerate().skip(1) {
        if !gt_rank(ranks[best], r) {
            best = i;
        }
    }
    best
}

/// Shape information of one operand, as seen by [`check_agreement`].
pub trait Extents {
    fn rank(&self) -> Rank;
    fn size(&self, k: Rank) -> Dim;
}

impl<A: crate::RaIter> Extents for A {
    fn rank(&self) -> Rank {
        crate::RaIter::rank(self)
    }

    fn size(&self, k: Rank) -> Dim {
        crate::RaIter::size(self, k)
    }
}

/// Check operand `arg` against the driver `d`: its rank can't exceed the driver's and it
/// must match the driver on every axis it has, except where either side is invalid.
pub fn check_agreement(arg: usize, a: &dyn Extents, d: &dyn Extents) -> Result<()> {
    let ra = a.rank();
    let rd = d.rank();
    if ra >= 0 && rd >= 0 && ra > rd {
        return Err(Error::RankMismatch {
            arg,
            rank: ra,
            driver: rd,
        });
    }
    for k in 0..ra {
        let sd = d.size(k);
        let sa = a.size(k);
        if sd != DIM_BAD && sa != DIM_BAD && sa != sd {
            return Err(Error::ShapeMismatch {
                arg,
                axis: k,
                expected: sd,
                found: sa,
            });
        }
    }
    Ok(())
}

/// Check every operand in `args` against `args[driver]`.
pub fn check_args(args: &[&dyn Extents], driver: usize) -> Result<()> {
    let d = args[driver];
    for (i, a) in args.iter().enumerate() {
        if i != driver {
            check_agreement(i, *a, d)?;
        }
    }
    Ok(())
}

/// Check that every operand flagged in `writes` owns all `depth` axes of the traversal.
/// `ranks[i]` is the number of those axes operand `i` moves along.
///
/// Unlike [`check_args`] this runs whether or not bounds checks are enabled.
pub fn check_writes(writes: &[bool], ranks: &[Rank], depth: Rank) -> Result<()> {
    for (arg, (&w, &r)) in writes.iter().zip(ranks).enumerate() {
        if w && r < depth {
            return Err(Error::BroadcastWrite {
                arg,
                rank: r,
                driver: depth,
            });
        }
    }
    Ok(())
}
