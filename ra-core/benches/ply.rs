use criterion::{criterion_group, criterion_main, Criterion};
use ra_core::{
    for_each, from, iota, map, ops, ply_index, ply_ravel, plyf, Array, Dim, Tensor, R2,
};

fn bench_ply_strategies_256(c: &mut Criterion) {
    const N: Dim = 256;
    let a = Array::<f32, 2>::rand_uniform(&[N, N], 0.0, 1.0);
    let b = Array::<f32, 1>::rand_uniform(&[N], 0.0, 1.0);
    c.bench_function("ply_index_256x256", |bencher| {
        bencher.iter(|| {
            let mut s = 0f32;
            ply_index(map!(|x: &f32, y: &f32| s += x * y, &a, &b));
            s
        });
    });
    c.bench_function("ply_ravel_256x256", |bencher| {
        bencher.iter(|| {
            let mut s = 0f32;
            ply_ravel(map!(|x: &f32, y: &f32| s += x * y, &a, &b));
            s
        });
    });
    c.bench_function("plyf_256x256", |bencher| {
        bencher.iter(|| {
            let mut s = 0f32;
            plyf(map!(|x: &f32, y: &f32| s += x * y, &a, &b));
            s
        });
    });
}

fn bench_transposed_assign_256(c: &mut Criterion) {
    const N: Dim = 256;
    let a = Array::<f32, 2>::rand_uniform(&[N, N], 0.0, 1.0);
    let mut out = Array::<f32, 2>::zeros(&[N, N]);
    c.bench_function("transposed_assign_256x256", |bencher| {
        bencher.iter(|| {
            for_each!(|o: &mut f32, x: &f32| *o = *x, &mut out, a.view().transpose(&[1, 0]));
        });
    });
}

fn bench_static_tensor_add(c: &mut Criterion) {
    let a = Tensor::<R2<128, 128>, f32>::ones();
    let b = Tensor::<R2<128, 128>, f32>::ones();
    let mut out = Tensor::<R2<128, 128>, f32>::zeros();
    c.bench_function("static_tensor_add_128x128", |bencher| {
        bencher.iter(|| {
            for_each!(|o: &mut f32, x: &f32, y: &f32| *o = x + y, &mut out, &a, &b);
        });
    });
    c.bench_function("simd_tensor_add_128x128", |bencher| {
        bencher.iter(|| &a + &b);
    });
}

fn bench_gemm(c: &mut Criterion) {
    const N: Dim = 128;
    let a = Array::<f32, 2>::rand_uniform(&[N, N], 0.0, 1.0);
    let b = Array::<f32, 2>::rand_uniform(&[N, N], 0.0, 1.0);
    c.bench_function("gemm_kernel_128x128", |bencher| {
        bencher.iter(|| ops::gemm(&a.view(), &b.view()));
    });
    let ai = Array::<i32, 2>::arange(&[N, N]);
    let bi = Array::<i32, 2>::arange(&[N, N]);
    c.bench_function("gemm_rank_conjunction_128x128", |bencher| {
        bencher.iter(|| ops::gemm(&ai.view(), &bi.view()));
    });
}

fn bench_outer_product(c: &mut Criterion) {
    c.bench_function("outer_iota_512x512", |bencher| {
        bencher.iter(|| -> Array<i64> {
            Array::collect(from!(
                |i: i64, j: i64| i * j,
                iota::<i64>(512),
                iota::<i64>(512)
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_ply_strategies_256,
    bench_transposed_assign_256,
    bench_static_tensor_add,
    bench_gemm,
    bench_outer_product
);
criterion_main!(benches);
