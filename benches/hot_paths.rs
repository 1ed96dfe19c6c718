use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use migration_globe::map::{add_graticule, GlobeRenderer, GlobeViewport};
use migration_globe::migration::csv::{self, SamplingPolicy};
use migration_globe::migration::palette::known_species;
use migration_globe::migration::routes::aggregate;
use migration_globe::migration::{fallback, LayerSettings, MigrationLayer};
use migration_globe::scene::Scene;

fn synthetic_csv(rows: usize) -> String {
    let species: Vec<&str> = known_species().collect();
    let mut text = String::from("Species,Start_Latitude,Start_Longitude,End_Latitude,End_Longitude\n");
    for i in 0..rows {
        let s = species[i % species.len()];
        let start_lat = (i % 140) as f64 - 70.0;
        let start_lon = (i * 7 % 360) as f64 - 180.0;
        let end_lat = (i * 3 % 140) as f64 - 70.0;
        let end_lon = (i * 11 % 360) as f64 - 180.0;
        text.push_str(&format!("{s},{start_lat},{start_lon},{end_lat},{end_lon}\n"));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let text = synthetic_csv(100_000);
    c.bench_function("parse_100k_rows", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            csv::parse(black_box(&text), &SamplingPolicy::default(), &mut rng)
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let text = synthetic_csv(100_000);
    let mut rng = StdRng::seed_from_u64(1);
    let parsed = csv::parse(&text, &SamplingPolicy::disabled(), &mut rng).unwrap();
    c.bench_function("aggregate_100k_records", |b| {
        b.iter(|| aggregate(black_box(&parsed.records), 15.0, 30))
    });
}

fn bench_frame(c: &mut Criterion) {
    let mut scene = Scene::new();
    add_graticule(&mut scene, 50.0);
    let mut layer = MigrationLayer::new(LayerSettings::default());
    let mut rng = StdRng::seed_from_u64(1);
    layer.apply(Err(migration_globe::loader::LoadError::EmptyDataset), &mut rng, &mut scene);
    assert_eq!(layer.arcs().len(), fallback::example_routes().len());

    let mut clock = 0.0;
    c.bench_function("tick_birds", |b| {
        b.iter(|| {
            clock += 16.0;
            layer.tick(clock, &mut scene);
        })
    });

    let viewport = GlobeViewport::new(50.0, 90.0, 400, 200);
    let renderer = GlobeRenderer::new();
    c.bench_function("render_frame_200x50", |b| {
        b.iter(|| renderer.render(black_box(&scene), &viewport, 200, 50))
    });
}

criterion_group!(benches, bench_parse, bench_aggregate, bench_frame);
criterion_main!(benches);
