use ra_core::{
    from,
    graph::{to_dot, to_petgraph},
    iota, map, ti, Array, Dim, Error, Tensor, R2,
};

#[test]
fn dot_names_strategy_and_nodes() {
    let a = Array::<f32>::zeros(&[2, 3]);
    let b = Array::<f32>::ones(&[2]);
    let e = map!(|a: &f32, b: &f32| a + b, &a, &b);
    let dot = to_dot(&e);
    assert!(dot.contains("ply (ravel)"));
    assert!(dot.contains("Expr/2 driver 0 [2, 3]"));
    assert_eq!(to_petgraph(&e).node_count(), 4);
}

#[test]
fn static_and_indexed_roots() {
    let t = Tensor::<R2<2, 2>, i32>::zeros();
    assert!(to_dot(&t.iter()).contains("ply (static)"));

    let e = map!(|x: &i32, i: Dim| *x as Dim + i, &t, ti::<0>());
    assert!(to_dot(&e).contains("ply (index)"));
}

#[test]
fn rank_conjunction_node() {
    let e = from!(|i: i32, j: i32| i * j, iota::<i32>(2), iota::<i32>(3));
    let g = to_petgraph(&e);
    assert!(g.node_weights().any(|w| w.starts_with("Ryn/2 depth 2")));
}

#[test]
fn io_errors_pass_through() {
    let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "dot not found").into();
    assert!(matches!(e, Error::Io(_)));
    assert_eq!(e.to_string(), "dot not found");
}
