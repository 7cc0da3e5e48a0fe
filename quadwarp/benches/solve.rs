use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quadwarp::{solve, Point2, Quad, Rect};

fn bench_solve(c: &mut Criterion) {
    let src = Quad::from_rect(&Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let dst = Quad::from([[35.0, 12.0], [1890.0, 40.0], [1870.0, 1060.0], [10.0, 1075.0]]);

    c.bench_function("solve_keystone", |b| {
        b.iter(|| solve(black_box(&src), black_box(&dst)).unwrap())
    });

    c.bench_function("solve_to_4x4", |b| {
        b.iter(|| {
            solve(black_box(&src), black_box(&dst))
                .unwrap()
                .to_column_major_4x4()
        })
    });

    let h = solve(&src, &dst).unwrap();
    let grid: Vec<Point2> = (0..=64)
        .flat_map(|j| (0..=64).map(move |i| Point2::new(i as f64 * 30.0, j as f64 * 16.875)))
        .collect();
    c.bench_function("project_mesh_65x65", |b| {
        b.iter(|| h.project_points(black_box(&grid)))
    });
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
