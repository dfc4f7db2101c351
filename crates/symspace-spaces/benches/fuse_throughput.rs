use criterion::{black_box, criterion_group, criterion_main, Criterion};
use symspace_core::SectorArray;
use symspace_groups::{su2_symmetry, u1_symmetry, Symmetry};
use symspace_spaces::{ProductSpace, Space, VectorSpace};

fn leg(symmetry: Symmetry, charges: impl Iterator<Item = i64>) -> Space {
    let rows: Vec<[i64; 1]> = charges.map(|c| [c]).collect();
    let mults = (0..rows.len()).map(|i| 1 + i % 3).collect();
    let sectors = SectorArray::from_rows(1, rows).unwrap();
    VectorSpace::new(symmetry, sectors, Some(mults)).unwrap().into()
}

fn fuse_throughput_bench(c: &mut Criterion) {
    let u1_legs = vec![
        leg(u1_symmetry(), -25..25),
        leg(u1_symmetry(), -25..25),
        leg(u1_symmetry(), -10..10),
    ];
    c.bench_function("fuse_u1_three_legs", |b| {
        b.iter(|| {
            let product = ProductSpace::new(u1_legs.clone()).unwrap();
            black_box(product);
        });
    });

    let su2_legs = vec![leg(su2_symmetry(), 0..12), leg(su2_symmetry(), 0..12)];
    c.bench_function("fuse_su2_two_legs", |b| {
        b.iter(|| {
            let product = ProductSpace::new(su2_legs.clone()).unwrap();
            black_box(product);
        });
    });

    let product = ProductSpace::new(u1_legs).unwrap();
    c.bench_function("flip_is_dual_u1", |b| {
        b.iter(|| black_box(product.flip_is_dual()));
    });
}

criterion_group!(benches, fuse_throughput_bench);
criterion_main!(benches);
