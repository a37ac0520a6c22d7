use ra_core::{iota_from, Array, Dim, DimRec, Error, Sub};

macro_rules! test_for_dtype_view_ops {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;

            fn vals(v: &[i32]) -> Vec<$t> {
                v.iter().map(|&x| x as $t).collect()
            }

            #[test]
            fn select_position_and_range() {
                let a = Array::<$t, 2>::arange(&[3, 4]);
                // Row 1, columns 0 and 2.
                let v = a
                    .view()
                    .select(&[Sub::At(1), iota_from::<Dim>(2, 0, 2).into()]);
                assert_eq!(v.shape(), vec![2]);
                assert_eq!(v.to_vec(), vals(&[4, 6]));

                let v = a.view().select(&[Sub::All, Sub::At(3)]);
                assert_eq!(v.to_vec(), vals(&[3, 7, 11]));

                let v = a.view().select(&[(2 as Dim).into()]);
                assert_eq!(v.to_vec(), vals(&[8, 9, 10, 11]));
            }

            #[test]
            fn select_reversed_range() {
                let a = Array::<$t, 1>::arange(&[5]);
                let v = a.view().select(&[iota_from::<Dim>(3, 4, -2).into()]);
                assert_eq!(v.to_vec(), vals(&[4, 2, 0]));
            }

            #[test]
            fn select_dots_and_newaxis() {
                let a = Array::<$t, 3>::arange(&[2, 3, 2]);
                let v = a.view().select(&[Sub::Dots(2), Sub::At(1)]);
                assert_eq!(v.shape(), vec![2, 3]);
                assert_eq!(v.to_vec(), vals(&[1, 3, 5, 7, 9, 11]));

                let v = a.view().select(&[Sub::At(0), Sub::NewAxis(1)]);
                assert_eq!(v.shape(), vec![1, 3, 2]);
                assert_eq!(v.stride(0), 0);
                assert_eq!(v.to_vec(), vals(&[0, 1, 2, 3, 4, 5]));
            }

            #[test]
            fn reshape_c_order() {
                let a = Array::<$t, 2>::arange(&[2, 3]);
                let v = a.view().reshape(&[3, 2]).unwrap();
                assert_eq!(v.shape(), vec![3, 2]);
                assert_eq!(*v.get(&[2, 0]), 4 as $t);

                let v = a.view().reshape(&[-1]).unwrap();
                assert_eq!(v.shape(), vec![6]);
                assert_eq!(v.to_vec(), vals(&[0, 1, 2, 3, 4, 5]));

                // Fewer elements than the source: the first ones are read.
                let v = a.view().reshape(&[2, 2]).unwrap();
                assert_eq!(v.to_vec(), vals(&[0, 1, 2, 3]));
            }

            #[test]
            fn reshape_tiles_leading_axes() {
                let a = Array::<$t, 1>::arange(&[3]);
                let v = a.view().reshape(&[2, 3]).unwrap();
                assert_eq!(v.dims(), &[DimRec::new(2, 0), DimRec::new(3, 1)]);
                assert_eq!(v.to_vec(), vals(&[0, 1, 2, 0, 1, 2]));
            }

            #[test]
            fn reshape_rejects_transposed() {
                let a = Array::<$t, 2>::arange(&[2, 3]);
                let r = a.view().transpose(&[1, 0]).reshape(&[6]);
                assert!(matches!(r, Err(Error::Layout { op: "reshape", .. })));

                let r = a.view().reshape(&[4, 2]);
                assert!(matches!(r, Err(Error::LengthMismatch { .. })));

                let r = a.view().reshape(&[-1, 4]);
                assert!(matches!(r, Err(Error::LengthMismatch { .. })));
            }

            #[test]
            fn explode_then_collapse() {
                let a = Array::<$t, 2>::arange(&[2, 4]);
                let v = a.view().explode::<4>().unwrap();
                assert_eq!(v.shape(), vec![2]);
                let row: Vec<$t> = v.get(&[1]).to_vec();
                assert_eq!(row, vals(&[4, 5, 6, 7]));

                let w = v.collapse();
                assert_eq!(w.shape(), vec![2, 4]);
                assert_eq!(w.to_vec(), vals(&[0, 1, 2, 3, 4, 5, 6, 7]));

                let r = a.view().explode::<3>();
                assert!(matches!(r, Err(Error::Layout { op: "explode", .. })));
                let r = a.view().transpose(&[1, 0]).explode::<2>();
                assert!(r.is_err());
            }

            #[test]
            fn select_mut_writes_through() {
                let mut a = Array::<$t, 2>::zeros(&[2, 3]);
                let mut v = a.view_mut().select(&[Sub::All, Sub::At(1)]);
                *v.get_mut(&[1]) = 7 as $t;
                assert_eq!(a.to_vec(), vals(&[0, 0, 0, 0, 7, 0]));
            }

            #[test]
            #[should_panic(expected = "cannot select a view")]
            fn select_mut_rejects_newaxis() {
                let mut a = Array::<$t, 1>::zeros(&[3]);
                a.view_mut().select(&[Sub::NewAxis(1)]);
            }

            #[test]
            fn reshape_mut_rejects_tiling() {
                let mut a = Array::<$t, 1>::zeros(&[3]);
                let r = a.view_mut().reshape(&[2, 3]);
                assert!(matches!(r, Err(Error::Layout { op: "reshape", .. })));
                assert!(a.view_mut().reshape(&[3, 1]).is_ok());
            }

            #[test]
            #[should_panic(expected = "can't stretch axis")]
            fn stretch_needs_size_one() {
                let a = Array::<$t, 1>::arange(&[3]);
                a.view().stretch(0, 2);
            }

            #[cfg(feature = "bounds-check")]
            #[test]
            #[should_panic(expected = "out of bounds")]
            fn select_range_past_end() {
                let a = Array::<$t, 1>::arange(&[3]);
                a.view().select(&[iota_from::<Dim>(2, 1, 2).into()]);
            }
        }
    };
}

test_for_dtype_view_ops!(f32, view_ops_f32);
test_for_dtype_view_ops!(f64, view_ops_f64);
test_for_dtype_view_ops!(i32, view_ops_i32);
test_for_dtype_view_ops!(u32, view_ops_u32);
