use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::DVec2;
use landmass_terrain::*;

fn reference_params() -> NoiseParams {
    NoiseParams {
        seed: 1,
        scale: 50.0,
        octaves: 4,
        persistence: 0.5,
        lacunarity: 2.0,
        offset: DVec2::ZERO,
    }
}

fn bench_noise_sample(c: &mut Criterion) {
    let field = NoiseField::new(reference_params());
    let point = black_box(DVec2::new(1234.5, -678.25));
    c.bench_function("noise_sample", |bencher| {
        bencher.iter(|| black_box(field.sample(point)))
    });
}

fn bench_height_map_global(c: &mut Criterion) {
    let builder =
        HeightMapBuilder::new(reference_params(), 241, Normalization::Global, None).unwrap();
    c.bench_function("height_map_241_global", |bencher| {
        bencher.iter(|| black_box(builder.build(black_box(DVec2::new(240.0, 0.0)))))
    });
}

fn bench_height_map_falloff(c: &mut Criterion) {
    let mask = Arc::new(FalloffMask::generate(243, FalloffShape::default()).unwrap());
    let builder =
        HeightMapBuilder::new(reference_params(), 241, Normalization::Local, Some(mask)).unwrap();
    c.bench_function("height_map_241_local_falloff", |bencher| {
        bencher.iter(|| black_box(builder.build(black_box(DVec2::ZERO))))
    });
}

fn bench_color_map(c: &mut Criterion) {
    let builder =
        HeightMapBuilder::new(reference_params(), 241, Normalization::Global, None).unwrap();
    let map = builder.build(DVec2::ZERO);
    let classifier = TerrainClassifier::new(vec![
        TerrainType::new("water", 0.4, Color::rgb(30, 80, 200)),
        TerrainType::new("sand", 0.45, Color::rgb(220, 200, 130)),
        TerrainType::new("grass", 0.7, Color::rgb(60, 150, 50)),
        TerrainType::new("snow", 1.0, Color::WHITE),
    ])
    .unwrap();
    c.bench_function("color_map_241", |bencher| {
        bencher.iter(|| black_box(classifier.color_map(&map)))
    });
}

criterion_group!(
    benches,
    bench_noise_sample,
    bench_height_map_global,
    bench_height_map_falloff,
    bench_color_map,
);
criterion_main!(benches);
