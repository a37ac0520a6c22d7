use ra_core::{
    extent::{
        dependent_cell_rank, dependent_frame_rank, dim_prod, dim_prod_all, filldim, inside,
        inside_range, is_c_order, rank_diff, rank_sum,
    },
    DimRec, DIM_ANY, DIM_BAD, RANK_ANY, RANK_BAD,
};

#[test]
fn sentinels_propagate() {
    assert_eq!(rank_sum(2, 3), 5);
    assert_eq!(rank_sum(2, RANK_ANY), RANK_ANY);
    assert_eq!(rank_sum(RANK_BAD, RANK_ANY), RANK_BAD);
    assert_eq!(rank_diff(3, 1), 2);
    assert_eq!(rank_diff(RANK_ANY, 1), RANK_ANY);

    assert_eq!(dim_prod(3, 4), 12);
    assert_eq!(dim_prod(3, DIM_ANY), DIM_ANY);
    assert_eq!(dim_prod(DIM_ANY, DIM_BAD), DIM_BAD);
    assert_eq!(dim_prod_all(&[]), 1);
    assert_eq!(dim_prod_all(&[2, 3, 4]), 24);
}

#[test]
fn ranges() {
    assert!(inside(0, 3));
    assert!(!inside(3, 3));
    assert!(!inside(-1, 3));
    assert!(inside_range(-2, -2, 0));
    assert!(!inside_range(0, -2, 0));
}

#[test]
fn negative_cell_ranks() {
    assert_eq!(dependent_cell_rank(3, 1), 1);
    assert_eq!(dependent_cell_rank(3, -1), 2);
    assert_eq!(dependent_cell_rank(RANK_ANY, -1), RANK_ANY);
    assert_eq!(dependent_frame_rank(3, 1), 2);
    assert_eq!(dependent_frame_rank(3, -1), 1);
}

#[test]
fn c_order_strides() {
    let d = filldim(&[2, 3, 4]);
    assert_eq!(
        d,
        vec![DimRec::new(2, 12), DimRec::new(3, 4), DimRec::new(4, 1)]
    );
    assert!(is_c_order(&d));
    assert!(!is_c_order(&[DimRec::new(2, 1), DimRec::new(3, 2)]));
}
