use ra_core::{for_each, Array, Error, RaIter, Tensor, View, R1, R2, R3};

macro_rules! test_for_dtype_storage {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;

            fn vals(v: &[i32]) -> Vec<$t> {
                v.iter().map(|&x| x as $t).collect()
            }

            #[test]
            fn array_shape_and_index() {
                let mut a = Array::<$t, 2>::arange(&[2, 3]);
                assert_eq!(a.rank(), 2);
                assert_eq!(a.shape(), vec![2, 3]);
                assert_eq!(a.len(), 6);
                assert_eq!(a[[1, 2]], 5 as $t);
                a[[0, 1]] = 9 as $t;
                assert_eq!(*a.get(&[0, 1]), 9 as $t);
                assert_eq!(a.to_vec(), vals(&[0, 9, 2, 3, 4, 5]));
            }

            #[test]
            fn from_fn_and_reshape() {
                let a = Array::<$t>::from_fn(&[2, 2], |i| (10 * i[0] + i[1]) as $t);
                assert_eq!(a.to_vec(), vals(&[0, 1, 10, 11]));
                let b = a.reshape(&[4]).unwrap();
                assert_eq!(b.shape(), vec![4]);
                assert!(b.reshape(&[3]).is_err());
            }

            #[test]
            fn compound_assign() {
                let mut a = Array::<$t, 2>::ones(&[2, 2]);
                let b = Array::<$t, 1>::from_vec(&[2], vals(&[1, 2])).unwrap();
                a += &b;
                assert_eq!(a.to_vec(), vals(&[2, 2, 3, 3]));
                a *= 2 as $t;
                assert_eq!(a.to_vec(), vals(&[4, 4, 6, 6]));
                a -= &b;
                assert_eq!(a.to_vec(), vals(&[3, 3, 4, 4]));
            }

            #[test]
            fn views() {
                let a = Array::<$t, 2>::arange(&[3, 3]);
                assert_eq!(a.view().diag().to_vec(), vals(&[0, 4, 8]));
                assert_eq!(a.view().cell(1).to_vec(), vals(&[3, 4, 5]));
                assert_eq!(a.view().reverse(1).to_vec(), vals(&[2, 1, 0, 5, 4, 3, 8, 7, 6]));
                let t = a.view().transpose(&[1, 0]);
                assert!(!t.is_c_order());
                assert_eq!(*t.get(&[0, 2]), 6 as $t);
            }

            #[test]
            fn write_through_views() {
                let mut a = Array::<$t, 2>::zeros(&[2, 3]);
                {
                    let mut v = a.view_mut();
                    let mut row = v.cell_mut(1);
                    row.assign(&vals(&[1, 2, 3]));
                }
                assert_eq!(a.to_vec(), vals(&[0, 0, 0, 1, 2, 3]));
                let col = vals(&[7, 8, 9]);
                for_each!(|x: &mut $t, y: &$t| *x = *y, a.view_mut().transpose(&[1, 0]), &col);
                assert_eq!(a.to_vec(), vals(&[7, 8, 9, 7, 8, 9]));
            }

            #[test]
            fn fill_and_apply() {
                let mut a = Array::<$t>::zeros(&[4, 5]);
                a.fill(3 as $t);
                a.apply(|x| x + x);
                assert_eq!(a.to_vec(), vec![6 as $t; 20]);
            }

            #[test]
            fn random_uniform() {
                let a = Array::<$t>::rand_uniform(&[100], 2 as $t, 5 as $t);
                assert!(a.as_slice().iter().all(|&x| x >= 2 as $t && x < 5 as $t));
            }

            #[test]
            fn tensor_static_shape() {
                let t = Tensor::<R2<2, 3>, $t>::arange();
                assert_eq!(t.data(), vec![vals(&[0, 1, 2]), vals(&[3, 4, 5])]);
                assert_eq!((&t + &t).data(), vec![vals(&[0, 2, 4]), vals(&[6, 8, 10])]);
                assert_eq!((t.clone() * t.clone()).data()[1], vals(&[9, 16, 25]));
                assert_eq!(t.cast::<f64>().data()[0], vec![0.0, 1.0, 2.0]);
                assert_eq!(t.iter().shape(), vec![2, 3]);
            }

            #[test]
            fn tensor_with_arrays() {
                let t = Tensor::<R2<2, 3>, $t>::ones();
                let a = Array::<$t, 1>::from_vec(&[2], vals(&[1, 2])).unwrap();
                let c: Array<$t> = Array::collect(ra_core::map!(|t: &$t, a: &$t| *t + *a, &t, &a));
                assert_eq!(c.to_vec(), vals(&[2, 2, 2, 3, 3, 3]));
            }
        }
    };
}

test_for_dtype_storage!(f32, f32_storage);
test_for_dtype_storage!(f64, f64_storage);
test_for_dtype_storage!(i32, i32_storage);
test_for_dtype_storage!(u32, u32_storage);

#[test]
fn length_mismatch() {
    match Array::<i32>::from_vec(&[2, 3], vec![0; 5]) {
        Err(Error::LengthMismatch {
            expected: 6,
            found: 5,
            ..
        }) => (),
        other => panic!("unexpected {other:?}"),
    }
    assert!(Tensor::<R1<3>, i32>::from_vec(vec![1, 2]).is_err());
    assert!(View::<i32>::from_slice(&[1, 2, 3], &[2, 2]).is_err());
}

#[test]
fn normal_needs_floats() {
    let a = Array::<f64>::randn(&[10, 10], 0.0, 1.0).unwrap();
    assert_eq!(a.len(), 100);
    assert!(Array::<i32>::randn(&[3], 0, 1).is_err());
}

#[test]
fn tensor_rank_three() {
    let t = Tensor::<R3<2, 1, 2>, i32>::arange();
    assert_eq!(t.data(), vec![vec![vec![0, 1]], vec![vec![2, 3]]]);
}

#[cfg(feature = "bounds-check")]
#[test]
#[should_panic(expected = "out of bounds")]
fn index_out_of_bounds() {
    let a = Array::<i32, 2>::zeros(&[2, 2]);
    let _ = a[[2, 0]];
}
