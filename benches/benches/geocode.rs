// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_geocode::{
    GeoCode, LineMode, Resolution, Thresholds, cover_polygon, cover_polyline, cover_rectangle,
    resample_polyline,
};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }

    fn point(&mut self) -> (f64, f64) {
        (
            self.next_unit() * 180.0 - 90.0,
            self.next_unit() * 360.0 - 180.0,
        )
    }
}

/// A star-shaped polygon around a center, in degrees.
fn star(center: (f64, f64), radius: f64, spikes: u32) -> Vec<GeoCode> {
    (0..spikes * 2)
        .map(|i| {
            let angle = f64::from(i) * core::f64::consts::PI / f64::from(spikes);
            let r = if i % 2 == 0 { radius } else { radius * 0.45 };
            GeoCode::from_lat_lon(center.0 + r * angle.sin(), center.1 + r * angle.cos())
        })
        .collect()
}

/// A random walk of `n` nodes starting at `start`, in degrees.
fn track(start: (f64, f64), n: usize, seed: u64) -> Vec<GeoCode> {
    let mut rng = Lcg::new(seed);
    let (mut lat, mut lon) = start;
    (0..n)
        .map(|_| {
            lat = (lat + (rng.next_unit() - 0.5) * 0.05).clamp(-89.0, 89.0);
            lon = (lon + rng.next_unit() * 0.05).min(179.0);
            GeoCode::from_lat_lon(lat, lon)
        })
        .collect()
}

fn bench_codes(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_geocode/codes");

    let mut rng = Lcg::new(0x6E0C_0DE0_0000_0001);
    let points: Vec<(f64, f64)> = (0..4_096).map(|_| rng.point()).collect();
    let codes: Vec<GeoCode> = points
        .iter()
        .map(|&(lat, lon)| GeoCode::from_lat_lon(lat, lon))
        .collect();

    group.bench_function("encode(n=4096)", |b| {
        b.iter(|| {
            let sum = points
                .iter()
                .map(|&(lat, lon)| GeoCode::from_lat_lon(lat, lon).raw())
                .fold(0, |acc, raw| acc ^ raw);
            black_box(sum);
        });
    });

    group.bench_function("decode(n=4096)", |b| {
        b.iter(|| {
            let sum = codes.iter().fold(0.0, |acc, code| {
                let (lat, lon) = code.to_lat_lon(Resolution::MAX);
                acc + lat + lon
            });
            black_box(sum);
        });
    });

    for bits in [8_u8, 16, 32] {
        let r = Resolution::new(bits);
        group.bench_function(format!("neighbors(n=4096,r={bits})"), |b| {
            b.iter(|| {
                let sum = codes.iter().fold(0_u64, |acc, code| {
                    code.neighbors(r).iter().fold(acc, |acc, n| acc ^ n.raw())
                });
                black_box(sum);
            });
        });
    }

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_geocode/raster");
    group.sample_size(30);

    for bits in [12_u8, 14, 16] {
        let shape = star((45.0, 5.0), 2.0, 7);
        let r = Resolution::new(bits);
        group.bench_function(format!("cover_polygon(star,r={bits})"), |b| {
            b.iter(|| black_box(cover_polygon(&shape, Some(r))));
        });
    }

    group.bench_function("cover_rectangle(antimeridian)", |b| {
        b.iter(|| black_box(cover_rectangle(-12.0, 170.0, 12.0, -165.0)));
    });

    let nodes = track((48.0, -4.5), 512, 0x6E0C_0DE0_0000_0002);
    let r = Some(Resolution::new(20));
    for (name, mode) in [
        ("cell_walk", LineMode::CellWalk),
        ("bresenham", LineMode::Bresenham),
    ] {
        group.bench_function(format!("cover_polyline({name},n=512)"), |b| {
            b.iter(|| black_box(cover_polyline(&nodes, r, mode)));
        });
    }

    group.bench_function("resample_polyline(n=512,r=16)", |b| {
        b.iter(|| black_box(resample_polyline(&nodes, Resolution::new(16))));
    });

    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_geocode/optimize");
    group.sample_size(30);

    let shape = star((45.0, 5.0), 2.0, 7);
    for bits in [14_u8, 16] {
        let coverage = cover_polygon(&shape, Some(Resolution::new(bits)));
        for (name, thresholds) in [
            ("none", Thresholds::NONE),
            ("loose", Thresholds::from_packed(0x0000_0088_8888_8888)),
        ] {
            group.bench_function(format!("optimize(star,r={bits},{name})"), |b| {
                b.iter_batched(
                    || coverage.clone(),
                    |mut coverage| {
                        coverage.optimize(thresholds);
                        black_box(coverage);
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_codes, bench_raster, bench_optimize);
criterion_main!(benches);
