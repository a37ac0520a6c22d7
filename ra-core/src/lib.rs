#![cfg_attr(feature = "short-vector", feature(portable_simd))]

//! ra-core is the expression core of a multidimensional array library with APL/J-style rank
//! extension.
//!
//! Operands of different rank combine without copies: a lower-rank operand agrees with a
//! higher-rank one when its axes match a prefix of the other's, and it is reused along the axes
//! it doesn't have. Expressions are lazy; the whole tree is evaluated in one pass when it is
//! traversed.
//!
//! ## A quick guide
//! - Anything array-like becomes an iterator with [`start`]: arrays, views, slices, `Vec`s,
//!   scalars and the generators [`iota`] and [`ti`].
//! - [`map!`] builds an expression node over its operands. The operand with the largest static
//!   rank (then size) drives; the others are checked against it once, when the node is built.
//! - [`ply`] traverses an expression for the side effects of its operators, choosing a strategy
//!   from what is known at compile time. [`for_each!`] does both at once.
//! - [`wrank`] and [`from!`] apply an operator to cells instead of elements.
//!
//! ## What can you do with it?
//! ```
//! use ra_core::{for_each, map, ops, Array};
//!
//! let a = Array::<f64>::from_elem(&[3, 4, 5], 1.0);
//! let b = Array::<f64>::from_elem(&[3, 4], 2.0);
//! let c = Array::<f64>::from_elem(&[3], 3.0);
//!
//! // `b` and `c` are reused along the axes they don't have.
//! let mut d = Array::<f64>::zeros(&[3, 4, 5]);
//! for_each!(|d: &mut f64, a: &f64, b: &f64, c: &f64| *d = a + b - c, &mut d, &a, &b, &c);
//! assert_eq!(ops::sum(&d), 0.0);
//!
//! let e: Array<f64> = Array::collect(map!(|a: &f64, x: f64| a * x, &a, 2.0));
//! assert_eq!(e.to_vec(), vec![2.0; 60]);
//! ```

mod agree;
mod array;
mod atom;
mod dtype;
mod error;
mod expr;
pub mod extent;
pub mod graph;
mod iter;
pub mod ops;
mod optimize;
mod pick;
mod ply;
mod shape;
mod tensor;
mod view;
mod wrank;

pub use agree::{
    check_agreement, check_writes, driver_index, gt_rank, largest_rank, pick_driver, Extents,
};
pub use array::Array;
pub use atom::{
    iota, iota_from, ptr, scalar, ti, Iota, OwnedVector, Ptr, Scalar, TensorIndex, Vector,
    VectorMut,
};
pub use dtype::{
    Advance, BinaryOpType, DType, DTypeOps, GemmDispatch, RandDispatch, SimdSupported, Sqrtable,
};
pub use error::{Error, Result};
pub use expr::{expr1, expr2, expr3, expr4, expr5, expr6, Args, Expr, FlatExpr};
pub use extent::{Dim, DimRec, Rank, DIM_ANY, DIM_BAD, RANK_ANY, RANK_BAD};
pub use iter::{start, Flat, IntoRa, RaIter, Step};
pub use optimize::IotaExpr;
pub use pick::{pick1, pick2, pick3, pick4, pick5, where_, Pick, Selector};
pub use ply::{ply, ply_exit, ply_index, ply_ravel, plyf, plyf_index, strategy, Strategy};
pub use shape::{Shape, R1, R2, R3, R4, R5, R6};
pub use tensor::Tensor;
pub use view::{DynLayout, FixedLayout, Iter, IterMut, Layout, Sub, View, ViewMut};
pub use wrank::{
    framematch, ryn1, ryn2, ryn3, ryn4, ryn5, ryn6, wrank, wrank_nested, FrameMatch, Frames,
    Ryn, Verb,
};
