use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graticule::geo::LatLon;
use graticule::grid::clip::{clip_polyline, meridian_crossing, parallel_crossing};
use graticule::grid::{DrawContext, GraticuleLayer, LatLonGrid, UtmGrid};
use graticule::sector::Sector;
use graticule::shapes::ShapeStore;
use graticule::view::{Camera, FlatTerrain, Globe};

fn bench_bisection(c: &mut Criterion) {
    let a = LatLon::new(10.3, -4.7);
    let b = LatLon::new(12.9, 3.1);
    c.bench_function("meridian_crossing", |bench| {
        bench.iter(|| meridian_crossing(black_box(a), black_box(b), black_box(0.0)))
    });
    c.bench_function("parallel_crossing", |bench| {
        bench.iter(|| parallel_crossing(black_box(a), black_box(b), black_box(11.0)))
    });

    let sector = Sector::new(10.0, -2.0, 2.0, 4.0);
    let line: Vec<LatLon> = (0..=20).map(|i| LatLon::new(9.0 + i as f64 * 0.2, -3.0 + i as f64 * 0.3)).collect();
    c.bench_function("clip_polyline", |bench| bench.iter(|| clip_polyline(black_box(&line), black_box(&sector))));
}

fn bench_subdivide(c: &mut Criterion) {
    let sector = Sector::new(40.0, 10.0, 10.0, 10.0);
    c.bench_function("subdivide_10x10", |bench| bench.iter(|| black_box(&sector).subdivide(black_box(10))));
}

fn bench_passes(c: &mut Criterion) {
    let terrain = FlatTerrain::default();
    let globe = Globe::default();
    let cameras = [
        Camera { lat: 45.0, lon: 7.0, altitude: 2_000_000.0, ..Camera::default() },
        Camera { lat: 45.2, lon: 7.3, altitude: 1_600_000.0, ..Camera::default() },
    ];

    // Alternating cameras force a rebuild on every iteration
    c.bench_function("latlon_pass", |bench| {
        let mut store = ShapeStore::new();
        let mut layer = GraticuleLayer::new(LatLonGrid);
        let mut frame_id = 0u64;
        bench.iter(|| {
            frame_id += 1;
            let camera = &cameras[(frame_id % 2) as usize];
            let dc = DrawContext { frame_id, camera, globe: &globe, elevation: &terrain };
            layer.render(&dc, &mut store)
        })
    });

    let near = [
        Camera { lat: 45.0, lon: 3.0, altitude: 300_000.0, ..Camera::default() },
        Camera { lat: 45.1, lon: 3.2, altitude: 240_000.0, ..Camera::default() },
    ];
    c.bench_function("utm_pass", |bench| {
        let mut store = ShapeStore::new();
        let mut layer = GraticuleLayer::new(UtmGrid);
        let mut frame_id = 0u64;
        bench.iter(|| {
            frame_id += 1;
            let camera = &near[(frame_id % 2) as usize];
            let dc = DrawContext { frame_id, camera, globe: &globe, elevation: &terrain };
            layer.render(&dc, &mut store)
        })
    });
}

criterion_group!(benches, bench_bisection, bench_subdivide, bench_passes);
criterion_main!(benches);
