use std::collections::HashMap;

use crate::geo::bucket_index;
use crate::migration::csv::MigrationRecord;

/// Default region bucket size in degrees
pub const DEFAULT_BUCKET_DEGREES: f64 = 15.0;
/// Default number of busiest routes kept
pub const DEFAULT_TOP_N: usize = 30;
/// Occurrence count at which a route reaches full intensity
pub const INTENSITY_REFERENCE_COUNT: f64 = 20.0;
/// Markers spawned on a full-intensity route
pub const MAX_MARKERS_PER_ROUTE: usize = 8;

/// Grouping key: species plus bucket indices of both endpoints
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RouteKey {
    species: String,
    start: (i64, i64),
    end: (i64, i64),
}

/// A coarse route between two region buckets for one species
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedRoute {
    pub species: String,
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub count: usize,
}

impl AggregatedRoute {
    /// Relative traffic in [0, 1], saturating at 20 occurrences
    pub fn intensity(&self) -> f64 {
        (self.count as f64 / INTENSITY_REFERENCE_COUNT).clamp(0.0, 1.0)
    }

    /// `"lat,lon"` label of the start bucket
    pub fn start_region(&self) -> String {
        format!("{},{}", self.start_lat, self.start_lon)
    }

    /// `"lat,lon"` label of the end bucket
    pub fn end_region(&self) -> String {
        format!("{},{}", self.end_lat, self.end_lon)
    }
}

/// Markers for a route of the given intensity; never zero.
pub fn marker_count(intensity: f64) -> usize {
    ((intensity.clamp(0.0, 1.0) * MAX_MARKERS_PER_ROUTE as f64).floor() as usize).max(1)
}

/// Ranked routes plus how many distinct groups existed before truncation
#[derive(Clone, Debug, Default)]
pub struct RouteSummary {
    pub routes: Vec<AggregatedRoute>,
    pub groups: usize,
}

/// Group records into routes, rank by count and keep the busiest `top_n`.
///
/// The first record of a group fixes its representative coordinates. Ties in
/// count keep first-seen order.
pub fn aggregate(records: &[MigrationRecord], bucket_degrees: f64, top_n: usize) -> RouteSummary {
    let mut index: HashMap<RouteKey, usize> = HashMap::new();
    let mut routes: Vec<AggregatedRoute> = Vec::new();

    for record in records {
        let start = (
            bucket_index(record.start_lat, bucket_degrees),
            bucket_index(record.start_lon, bucket_degrees),
        );
        let end = (
            bucket_index(record.end_lat, bucket_degrees),
            bucket_index(record.end_lon, bucket_degrees),
        );
        let key = RouteKey {
            species: record.species.clone(),
            start,
            end,
        };

        let slot = *index.entry(key).or_insert_with(|| {
            routes.push(AggregatedRoute {
                species: record.species.clone(),
                start_lat: start.0 as f64 * bucket_degrees,
                start_lon: start.1 as f64 * bucket_degrees,
                end_lat: end.0 as f64 * bucket_degrees,
                end_lon: end.1 as f64 * bucket_degrees,
                count: 0,
            });
            routes.len() - 1
        });
        routes[slot].count += 1;
    }

    let groups = routes.len();
    // stable: equal counts stay in first-seen order
    routes.sort_by(|a, b| b.count.cmp(&a.count));
    routes.truncate(top_n);

    RouteSummary { routes, groups }
}
