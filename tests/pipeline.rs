//! Load → aggregate → build → animate, through the public API
use std::io::Write;
use std::time::Duration;

use migration_globe::loader::{load, spawn_load, DataSource, LoadOptions};
use migration_globe::migration::csv::SamplingPolicy;
use migration_globe::migration::palette::species_color;
use migration_globe::migration::{LayerSettings, MigrationLayer, RouteSource};
use migration_globe::scene::{Geometry, Scene, SceneObjectKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

const HEADER: &str = "Species,Start_Latitude,Start_Longitude,End_Latitude,End_Longitude";

fn csv_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

fn exact() -> LoadOptions {
    LoadOptions {
        sampling: SamplingPolicy::disabled(),
        seed: Some(42),
        ..LoadOptions::default()
    }
}

#[test]
fn fifty_warblers_make_one_saturated_route() {
    let mut body = String::from(HEADER);
    for _ in 0..50 {
        body.push_str("\nWarbler,10,10,20,20");
    }
    let file = csv_file(&body);

    let outcome = load(&DataSource::File(file.path().into()), &exact());
    let mut scene = Scene::new();
    let mut layer = MigrationLayer::new(LayerSettings::default());
    let mut rng = StdRng::seed_from_u64(42);
    layer.apply(outcome, &mut rng, &mut scene);

    assert_eq!(layer.source(), RouteSource::Data);
    assert_eq!(layer.arcs().len(), 1);
    let arc = &layer.arcs()[0];
    assert_eq!(arc.count, 50);
    assert_eq!(arc.intensity, 1.0);
    assert_eq!(arc.color, species_color("Warbler"));
    assert_eq!(layer.markers().len(), 8);
    assert_eq!(scene.count_where(SceneObjectKind::is_bird), 8);

    // birds stay finite and keep moving along the arc
    for frame in 0..300 {
        layer.tick(frame as f64 * 16.0, &mut scene);
    }
    for object in scene.objects().iter().filter(|o| o.kind.is_bird()) {
        let Geometry::Point { position, heading } = &object.geometry else {
            panic!("birds are points");
        };
        assert!(position.is_finite());
        assert!(heading.is_finite());
        assert!((0.49..=0.91).contains(&object.style.opacity));
    }
}

#[test]
fn header_only_csv_shows_example_routes() {
    let file = csv_file(&format!("{HEADER}\n"));
    let rx = spawn_load(DataSource::File(file.path().into()), exact());
    let outcome = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(outcome.is_err());

    let mut scene = Scene::new();
    let mut layer = MigrationLayer::new(LayerSettings::default());
    let mut rng = StdRng::seed_from_u64(42);
    layer.apply(outcome, &mut rng, &mut scene);

    assert_eq!(layer.source(), RouteSource::Example);
    assert!(layer.fallback_reason().is_some());
    // every arc on screen is an example route, none came from the file
    assert!(!layer.arcs().is_empty());
    let examples = migration_globe::migration::fallback::example_routes();
    assert_eq!(layer.arcs().len(), examples.len());
    for (arc, route) in layer.arcs().iter().zip(&examples) {
        assert_eq!(arc.count, route.count);
        assert_eq!(arc.species, route.species);
    }
}

#[test]
fn sampling_is_reproducible_under_a_seed() {
    let mut body = String::from(HEADER);
    for i in 0..2000i64 {
        body.push_str(&format!("\nHawk,{},{},-15,-60", i % 60, -(i % 90)));
    }
    let file = csv_file(&body);
    let source = DataSource::File(file.path().into());
    let options = LoadOptions {
        sampling: SamplingPolicy::default(),
        seed: Some(9),
        ..LoadOptions::default()
    };

    let a = load(&source, &options).unwrap();
    let b = load(&source, &options).unwrap();
    assert_eq!(a.records, b.records);
    assert!(a.records.len() > 100 && a.records.len() < 320, "{}", a.records.len());
}
