use crate::migration::routes::AggregatedRoute;

/// Well-known flyways shown when no usable migration data could be loaded.
/// (species, start lat, start lon, end lat, end lon, count)
const EXAMPLE_FLYWAYS: [(&str, f64, f64, f64, f64, usize); 10] = [
    ("Warbler", 45.0, -75.0, 15.0, -75.0, 24),
    ("Warbler", 60.0, -135.0, 15.0, -90.0, 12),
    ("Hawk", 45.0, -90.0, -15.0, -60.0, 18),
    ("Crane", 60.0, 30.0, 15.0, 30.0, 20),
    ("Crane", 45.0, 120.0, 30.0, 105.0, 9),
    ("Eagle", 60.0, 90.0, 30.0, 75.0, 7),
    ("Owl", 60.0, 15.0, 45.0, 0.0, 4),
    ("Pigeon", 45.0, 0.0, 30.0, 15.0, 15),
    ("Pigeon", -30.0, 150.0, 0.0, 120.0, 6),
    ("Hawk", 30.0, 45.0, -15.0, 30.0, 11),
];

/// Example routes, ranked by count like aggregated ones
pub fn example_routes() -> Vec<AggregatedRoute> {
    let mut routes: Vec<AggregatedRoute> = EXAMPLE_FLYWAYS
        .iter()
        .map(|&(species, start_lat, start_lon, end_lat, end_lon, count)| AggregatedRoute {
            species: species.to_string(),
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            count,
        })
        .collect();
    routes.sort_by(|a, b| b.count.cmp(&a.count));
    routes
}
