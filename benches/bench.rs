use criterion::{criterion_group, criterion_main, Criterion};
use delaunay_incr::{
    Algorithm, Float, Point, RefineAlgorithm, RefineCriteria, Triangle, Triangulation,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn super_triangle() -> Triangle {
    Triangle::new(
        Point::new(-10000., -10000.),
        Point::new(10000., -10000.),
        Point::new(0., 10000.),
    )
    .unwrap()
}

fn random_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(-400.0..400.0) as Float,
                rng.gen_range(-400.0..400.0) as Float,
            )
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let points = random_points(100, 42);

    c.bench_function("place_100_edge_flip", |b| {
        b.iter(|| {
            let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
            for p in points.iter() {
                triangulation.place(*p).unwrap();
            }
            triangulation.triangle_count()
        })
    });

    c.bench_function("place_100_cavity", |b| {
        b.iter(|| {
            let mut triangulation = Triangulation::new(super_triangle(), Algorithm::CavityBased);
            for p in points.iter() {
                triangulation.place(*p).unwrap();
            }
            triangulation.triangle_count()
        })
    });

    c.bench_function("refine_ruppert_square", |b| {
        let corners = [
            Point::new(-10., -10.),
            Point::new(10., -10.),
            Point::new(10., 10.),
            Point::new(-10., 10.),
        ];
        b.iter(|| {
            let mut triangulation = Triangulation::new(super_triangle(), Algorithm::EdgeFlip);
            for i in 0..4 {
                triangulation
                    .place_constrained(corners[i], corners[(i + 1) % 4])
                    .unwrap();
            }
            triangulation.refine(
                RefineAlgorithm::Ruppert,
                RefineCriteria {
                    min_angle: (20.0_f64.to_radians()) as Float,
                    max_area: 50.,
                },
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
