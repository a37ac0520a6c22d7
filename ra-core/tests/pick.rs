use std::cell::Cell;

use ra_core::{map, pick, where_, Array, Dim};

macro_rules! test_for_dtype_pick {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;

            #[test]
            fn where_selects_by_condition() {
                let a = Array::<$t, 1>::arange(&[5]);
                let r: Array<$t> = Array::collect(where_(
                    map!(|x: &$t| *x > 2 as $t, &a),
                    map!(|x: &$t| *x * (10 as $t), &a),
                    1 as $t,
                ));
                assert_eq!(
                    r.to_vec(),
                    [1, 1, 1, 30, 40].iter().map(|&x| x as $t).collect::<Vec<_>>()
                );
            }

            #[test]
            fn pick_by_position() {
                let sel: Vec<usize> = vec![0, 2, 1];
                let x = vec![1 as $t, 2 as $t, 3 as $t];
                let y = vec![10 as $t, 20 as $t, 30 as $t];
                let z = vec![100 as $t, 200 as $t, 250 as $t];
                let r: Array<$t> = Array::collect(pick!(&sel, x, y, z));
                assert_eq!(r.to_vec(), vec![1 as $t, 200 as $t, 30 as $t]);
            }

            #[test]
            fn pick_with_broadcast_selector() {
                let a = Array::<$t, 2>::arange(&[2, 3]);
                let sel = vec![true, false];
                let r: Array<$t> = Array::collect(pick!(&sel, 0 as $t, map!(|x: &$t| *x, &a)));
                assert_eq!(
                    r.to_vec(),
                    [0, 1, 2, 0, 0, 0].iter().map(|&x| x as $t).collect::<Vec<_>>()
                );
            }
        }
    };
}

test_for_dtype_pick!(f32, f32_pick);
test_for_dtype_pick!(f64, f64_pick);
test_for_dtype_pick!(i32, i32_pick);
test_for_dtype_pick!(u8, u8_pick);

#[test]
fn only_selected_operand_is_evaluated() {
    let hits = Cell::new(0);
    let r: Array<i32> = Array::collect(pick!(
        vec![false, true, false],
        map!(
            |x: i32| {
                hits.set(hits.get() + 1);
                x
            },
            vec![1, 2, 3]
        ),
        vec![5, 6, 7]
    ));
    assert_eq!(r.to_vec(), vec![1, 6, 3]);
    assert_eq!(hits.get(), 2);
}

#[test]
fn signed_selector() {
    let sel: Vec<Dim> = vec![1, 0];
    let r: Array<i32> = Array::collect(pick!(&sel, vec![1, 2], vec![3, 4]));
    assert_eq!(r.to_vec(), vec![3, 2]);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn selection_out_of_range() {
    let sel: Vec<usize> = vec![0, 3];
    let _: Array<i32> = Array::collect(pick!(&sel, vec![1, 2], vec![3, 4]));
}
