use ra_core::{for_each, from, graph::to_dot, iota, map, ops, Array, Dim};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let a = Array::<f32>::from_elem(&[3, 4, 5], 1.0);
    let b = Array::<f32>::from_elem(&[3, 4], 2.0);
    let c = Array::<f32>::from_elem(&[3], 3.0);

    // `b` and `c` are reused along the trailing axes they don't have.
    let mut d = Array::<f32>::zeros(&[3, 4, 5]);
    for_each!(|d: &mut f32, a: &f32, b: &f32, c: &f32| *d = a + b - c, &mut d, &a, &b, &c);
    assert_eq!(ops::sum(&d), 0.0);

    let e = map!(|a: &f32, x: f32| a * x, &a, 2.0f32);
    println!("{}", to_dot(&e));
    let e: Array<f32> = Array::collect(e);
    dbg!(e.shape());

    let table: Array<Dim> = Array::collect(from!(|i: Dim, j: Dim| i * j, iota::<Dim>(4), iota::<Dim>(4)));
    dbg!(&table);

    let m = Array::<f32, 2>::arange(&[2, 3]);
    let n = Array::<f32, 2>::ones(&[3, 2]);
    let p = ops::gemm(&m.view(), &n.view());
    assert_eq!(p.to_vec(), vec![3.0, 3.0, 12.0, 12.0]);
}
