use ra_core::{map, ops, Array, DType};
use std::cell::Cell;

macro_rules! test_for_dtype_ops {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;

            fn arr(shape: &[isize], v: &[i32]) -> Array<$t, 2> {
                Array::from_vec(shape, v.iter().map(|&x| x as $t).collect()).unwrap()
            }

            fn vals(v: &[i32]) -> Vec<$t> {
                v.iter().map(|&x| x as $t).collect()
            }

            #[test]
            fn reductions() {
                let a = Array::<$t>::arange(&[2, 3]);
                assert_eq!(ops::sum(&a), 15 as $t);
                assert_eq!(ops::prod(&vals(&[1, 2, 3, 4])), 24 as $t);
                assert_eq!(ops::amax(&a), 5 as $t);
                assert_eq!(ops::amin(&vals(&[4, 2, 7])), 2 as $t);
                assert_eq!(ops::amin(&Vec::<$t>::new()), <$t as DType>::MAX);
                assert_eq!(ops::reduce_sqrm(&vals(&[1, 2, 3])), 14 as $t);
                assert_eq!(ops::dot(&vals(&[1, 2, 3]), &vals(&[4, 5, 6])), 32 as $t);
            }

            #[test]
            fn reductions_over_expressions() {
                let a = Array::<$t>::arange(&[2, 3]);
                let b = vals(&[1, 2]);
                assert_eq!(ops::sum(map!(|a: &$t, b: &$t| *a * *b, &a, &b)), 27 as $t);
                assert_eq!(ops::sum(ops::plus(&a, 1 as $t)), 21 as $t);
            }

            #[test]
            fn elementwise() {
                let a = arr(&[2, 2], &[2, 4, 6, 8]);
                let b = vals(&[2, 1]);
                let p: Array<$t> = Array::collect(ops::plus(&a, &b));
                assert_eq!(p.to_vec(), vals(&[4, 6, 7, 9]));
                let m: Array<$t> = Array::collect(ops::minus(&a, &b));
                assert_eq!(m.to_vec(), vals(&[0, 2, 5, 7]));
                let t: Array<$t> = Array::collect(ops::times(&a, 3 as $t));
                assert_eq!(t.to_vec(), vals(&[6, 12, 18, 24]));
                let s: Array<$t> = Array::collect(ops::slash(&a, &b));
                assert_eq!(s.to_vec(), vals(&[1, 2, 6, 8]));
            }

            #[test]
            fn comparisons() {
                // `b` agrees with the first axis of `a`.
                let a = arr(&[2, 2], &[1, 5, 3, 4]);
                let b = vals(&[3, 4]);
                let lt: Array<bool> = Array::collect(ops::lt(&a, &b));
                assert_eq!(lt.to_vec(), vec![true, false, true, false]);
                let ge: Array<bool> = Array::collect(ops::ge(&a, &b));
                assert_eq!(ge.to_vec(), vec![false, true, false, true]);
                let eq: Array<bool> = Array::collect(ops::eq(&a, 4 as $t));
                assert_eq!(eq.to_vec(), vec![false, false, false, true]);
                assert!(ops::every(ops::ne(&a, 0 as $t)));
                assert!(ops::any(ops::le(&a, 1 as $t)));
                assert_eq!(ops::index(ops::gt(&a, 4 as $t)), Some(1));
            }

            #[test]
            fn unary_and_binary() {
                let a = vals(&[0, 1, 4, 9]);
                let s: Array<$t> = Array::collect(ops::sqr(&a));
                assert_eq!(s.to_vec(), vals(&[0, 1, 16, 81]));
                let r: Array<$t> = Array::collect(ops::sqrt(&a));
                assert_eq!(r.to_vec(), vals(&[0, 1, 2, 3]));
                let b = vals(&[2, 2, 2, 2]);
                let hi: Array<$t> = Array::collect(ops::max(&a, &b));
                assert_eq!(hi.to_vec(), vals(&[2, 2, 4, 9]));
                let lo: Array<$t> = Array::collect(ops::min(&a, &b));
                assert_eq!(lo.to_vec(), vals(&[0, 1, 2, 2]));
                let p: Array<$t> = Array::collect(ops::pow(&a, 2 as $t));
                assert_eq!(p.to_vec(), vals(&[0, 1, 16, 81]));
                assert_eq!(ops::sum(ops::abs(&a)), 14 as $t);
                assert_eq!(ops::sum(ops::exp(&vals(&[0, 0]))), 2 as $t);
                assert_eq!(ops::sum(ops::ln(&vals(&[1, 1]))), 0 as $t);
                assert!(!ops::any(ops::isnan(&a)));
                assert!(ops::every(ops::isfinite(&a)));
            }

            #[test]
            fn zero_extent_reductions() {
                let a = Array::<$t>::zeros(&[3, 0]);
                let seen = Cell::new(0);
                let hit = |_: &$t| {
                    seen.set(seen.get() + 1);
                    true
                };
                assert!(!ops::any(map!(hit, &a)));
                assert!(ops::every(map!(hit, &a)));
                assert_eq!(ops::index(map!(hit, &a)), None);
                assert_eq!(ops::sum(&a), 0 as $t);
                assert_eq!(seen.get(), 0);
            }

            #[test]
            fn cast() {
                let a = arr(&[1, 3], &[1, 2, 3]);
                let c: Array<f64> = Array::collect(ops::cast::<f64, _>(&a));
                assert_eq!(c.to_vec(), vec![1.0, 2.0, 3.0]);
            }

            #[test]
            fn gemm() {
                let a = arr(&[2, 3], &[1, 2, 3, 4, 5, 6]);
                let b = arr(&[3, 2], &[7, 8, 9, 10, 11, 12]);
                let c = ops::gemm(&a.view(), &b.view());
                assert_eq!(c.shape(), vec![2, 2]);
                assert_eq!(c.to_vec(), vals(&[58, 64, 139, 154]));
            }

            #[test]
            fn gemm_transposed() {
                let a = arr(&[2, 2], &[1, 3, 2, 4]);
                let b = arr(&[2, 2], &[5, 6, 7, 8]);
                let at = a.view().transpose(&[1, 0]);
                let c = ops::gemm(&at, &b.view());
                assert_eq!(c.to_vec(), vals(&[19, 22, 43, 50]));
            }

            #[test]
            fn gemv_gevm() {
                let a = arr(&[2, 3], &[1, 2, 3, 4, 5, 6]);
                let x = Array::<$t, 1>::from_vec(&[3], vals(&[1, 0, 2])).unwrap();
                assert_eq!(ops::gemv(&a.view(), &x.view()).to_vec(), vals(&[7, 16]));
                let y = Array::<$t, 1>::from_vec(&[2], vals(&[1, 1])).unwrap();
                assert_eq!(ops::gevm(&y.view(), &a.view()).to_vec(), vals(&[5, 7, 9]));
            }

            #[test]
            #[should_panic(expected = "mismatched dimensions")]
            fn gemm_inner_mismatch() {
                let a = arr(&[2, 3], &[1, 2, 3, 4, 5, 6]);
                let _ = ops::gemm(&a.view(), &a.view());
            }
        }
    };
}

test_for_dtype_ops!(f32, f32_ops);
test_for_dtype_ops!(f64, f64_ops);
test_for_dtype_ops!(i32, i32_ops);
test_for_dtype_ops!(i64, i64_ops);
test_for_dtype_ops!(u32, u32_ops);

#[test]
fn norm() {
    assert_eq!(ops::norm2(&[3.0f64, 4.0]), 5.0);
    assert_eq!(ops::norm2(&[0.0f32; 0]), 0.0);
}

#[test]
fn any_every_index() {
    assert!(ops::any(&vec![false, true, false]));
    assert!(!ops::any(&Vec::<bool>::new()));
    assert!(ops::every(&Vec::<bool>::new()));
    assert!(!ops::every(&[true, false]));

    let a = Array::<i32>::arange(&[3, 4]);
    assert!(ops::any(map!(|x: &i32| *x > 10, &a)));
    assert!(!ops::every(map!(|x: &i32| *x > 0, &a)));
    assert!(ops::every(map!(|x: &i32| *x < 12, &a)));
    assert_eq!(ops::index(map!(|x: &i32| *x * *x > 20, &a)), Some(5));
    assert_eq!(ops::index(&[false, false]), None);
    assert_eq!(ops::index(vec![false, false, true]), Some(2));
}

#[test]
fn signed_and_float_operators() {
    let a = vec![-2i32, 0, 3];
    let n: Array<i32, 1> = Array::collect(ops::neg(&a));
    assert_eq!(n.to_vec(), vec![2, 0, -3]);
    let m: Array<i32, 1> = Array::collect(ops::abs(&a));
    assert_eq!(m.to_vec(), vec![2, 0, 3]);

    let x = vec![1.0f64, f64::NAN, f64::INFINITY];
    let nan: Array<bool, 1> = Array::collect(ops::isnan(&x));
    assert_eq!(nan.to_vec(), vec![false, true, false]);
    let fin: Array<bool, 1> = Array::collect(ops::isfinite(&x));
    assert_eq!(fin.to_vec(), vec![true, false, false]);
    // NaN compares false, so the first argument is kept.
    let hi: Array<f64, 1> = Array::collect(ops::max(&[2.0f64, 1.0], &[f64::NAN, 3.0]));
    assert_eq!(hi.to_vec(), vec![2.0, 3.0]);

    assert!((ops::sum(ops::sin(&[0.0f64, std::f64::consts::FRAC_PI_2])) - 1.0).abs() < 1e-12);
    assert!((ops::sum(ops::log10(&[100.0f64])) - 2.0).abs() < 1e-12);
}

#[test]
fn logical() {
    let p = [true, true, false, false];
    let q = [true, false, true, false];
    let and: Array<bool, 1> = Array::collect(ops::and(&p, &q));
    assert_eq!(and.to_vec(), vec![true, false, false, false]);
    let or: Array<bool, 1> = Array::collect(ops::or(&p, &q));
    assert_eq!(or.to_vec(), vec![true, true, true, false]);
    let not: Array<bool, 1> = Array::collect(ops::not(&p));
    assert_eq!(not.to_vec(), vec![false, false, true, true]);
    assert!(ops::every(ops::or(&p, ops::not(&p))));
}
