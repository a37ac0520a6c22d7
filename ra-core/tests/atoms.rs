use ra_core::{
    iota, iota_from, map, ptr, scalar, start, ti, Array, Dim, Flat, RaIter, Vector, DIM_BAD,
    RANK_BAD,
};

macro_rules! test_for_dtype_iota {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;

            #[test]
            fn counts_from_zero() {
                let a: Array<$t> = Array::collect(iota::<$t>(5));
                assert_eq!(a.to_vec(), (0..5).map(|x| x as $t).collect::<Vec<_>>());
            }

            #[test]
            fn plus_scalar() {
                let a: Array<$t> = Array::collect(iota::<$t>(4) + (3 as $t));
                assert_eq!(a.to_vec(), (3..7).map(|x| x as $t).collect::<Vec<_>>());
            }

            #[test]
            fn times_scalar() {
                let a: Array<$t> = Array::collect((2 as $t) * iota::<$t>(4));
                assert_eq!(a.to_vec(), (0..4).map(|x| (2 * x) as $t).collect::<Vec<_>>());
            }

            #[test]
            fn plus_iota() {
                let a: Array<$t> = Array::collect(iota::<$t>(3) + iota::<$t>(3));
                assert_eq!(a.to_vec(), (0..3).map(|x| (2 * x) as $t).collect::<Vec<_>>());
            }

            #[test]
            fn rewinds_in_outer_product() {
                let a: Array<$t> =
                    Array::collect(ra_core::from!(|i: $t, j: $t| i + j, iota::<$t>(2), iota::<$t>(3)));
                assert_eq!(
                    a.to_vec(),
                    [0, 1, 2, 1, 2, 3].iter().map(|&x| x as $t).collect::<Vec<_>>()
                );
            }
        }
    };
}

test_for_dtype_iota!(f32, f32_iota);
test_for_dtype_iota!(f64, f64_iota);
test_for_dtype_iota!(i32, i32_iota);
test_for_dtype_iota!(i64, i64_iota);
test_for_dtype_iota!(u32, u32_iota);
test_for_dtype_iota!(u8, u8_iota);

#[test]
fn iota_with_origin_and_step() {
    let a: Array<f64> = Array::collect(iota_from(4, 1.0, 0.5));
    assert_eq!(a.to_vec(), vec![1.0, 1.5, 2.0, 2.5]);
}

#[test]
fn unsigned_iota_counts_down() {
    let a: Array<u32> = Array::collect(10u32 - iota::<u32>(3));
    assert_eq!(a.to_vec(), vec![10, 9, 8]);
}

#[cfg(feature = "optimize-iota")]
#[test]
fn integral_iota_folds() {
    let j: ra_core::Iota<i32> = 2 * iota::<i32>(4) - 1;
    assert_eq!(j.org(), -1);
    assert_eq!(j.step_by(), 2);
    let a: Array<i32> = Array::collect(j);
    assert_eq!(a.to_vec(), vec![-1, 1, 3, 5]);
}

#[test]
fn tensor_index() {
    let z = Array::<i32, 2>::zeros(&[2, 3]);
    let a: Array<Dim> = Array::collect(map!(
        |x: &i32, i: Dim, j: Dim| *x as Dim + i * 3 + j,
        &z,
        ti::<0>(),
        ti::<1>()
    ));
    assert_eq!(a.to_vec(), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(<ra_core::TensorIndex<0> as RaIter>::RANK_S, RANK_BAD);
    assert_eq!(ti::<1>().size(0), DIM_BAD);
}

#[test]
fn slices_and_vectors() {
    let v = vec![1, 2, 3];
    let a: Array<i32> = Array::collect(map!(|x: &i32| x * 2, &v));
    assert_eq!(a.to_vec(), vec![2, 4, 6]);

    let m = Array::<i32, 2>::zeros(&[2, 3]);
    let b: Array<i32> = Array::collect(map!(|a: &i32, r: i32| a + r, &m, [10, 20]));
    assert_eq!(b.to_vec(), vec![10, 10, 10, 20, 20, 20]);

    let s: &[i32] = &v[1..];
    let c: Array<i32> = Array::collect(map!(|x: &i32, y: i32| x - y, s, 1));
    assert_eq!(c.to_vec(), vec![1, 2]);
}

#[test]
fn writes_through_mutable_vectors() {
    let mut v = vec![1, 2, 3];
    ra_core::for_each!(|x: &mut i32, y: Dim| *x += y as i32, &mut v, iota::<Dim>(3));
    assert_eq!(v, vec![1, 3, 5]);
}

#[test]
fn pointer_takes_driver_length() {
    let data = [5, 6, 7, 8];
    let a = Array::<i32, 1>::arange(&[3]);
    // SAFETY: `data` outlives the expression and has at least 3 elements.
    let p = unsafe { ptr(data.as_ptr()) };
    let b: Array<i32> = Array::collect(map!(|a: &i32, p: &i32| a + p, &a, p));
    assert_eq!(b.to_vec(), vec![5, 7, 9]);
}

#[test]
fn broadcast_axes_are_no_ops() {
    let data = [3, 4, 5];
    let mut v = Vector::new(&data);
    v.adv(1, 5);
    v.adv(7, -2);
    assert_eq!(*v.flat().get(), 3);
    v.adv(0, 2);
    assert_eq!(*v.flat().get(), 5);

    let mut s = scalar(9);
    s.adv(0, 4);
    assert_eq!(s.flat().get(), 9);
}

#[test]
fn single_values() {
    let a = Array::<i32>::from_elem(&[1], 7);
    assert_eq!(map!(|a: &i32| *a * 2, &a).value(), 14);
    assert_eq!(start(3.5f64).value(), 3.5);
}

#[test]
#[should_panic(expected = "is not a scalar")]
fn value_of_non_scalar() {
    let a = Array::<i32>::zeros(&[2]);
    let _ = a.iter().value();
}
