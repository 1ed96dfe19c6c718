//! Migration routes: parsing, aggregation, arcs and animated birds.

pub mod arc;
pub mod csv;
pub mod fallback;
pub mod markers;
pub mod palette;
pub mod routes;

use rand::Rng;
use tracing::{info, warn};

use crate::loader::{LoadError, LoadOutcome};
use crate::scene::RenderSurface;
use arc::MigrationArc;
use markers::MarkerAnimator;
use routes::{aggregate, marker_count, AggregatedRoute};

/// Where the arcs on screen came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteSource {
    /// Nothing applied yet
    Pending,
    /// Aggregated from loaded records
    Data,
    /// Built-in example routes after a failed or empty load
    Example,
}

/// Knobs for turning records into arcs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSettings {
    pub globe_radius: f64,
    pub bucket_degrees: f64,
    pub top_n: usize,
    pub arc_segments: usize,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            globe_radius: 50.0,
            bucket_degrees: routes::DEFAULT_BUCKET_DEGREES,
            top_n: routes::DEFAULT_TOP_N,
            arc_segments: arc::MIN_SEGMENTS,
        }
    }
}

/// Animation context for the migration overlay: owns arcs and birds.
pub struct MigrationLayer {
    pub settings: LayerSettings,
    animator: MarkerAnimator,
    source: RouteSource,
    /// Why the example routes are showing, if they are
    fallback_reason: Option<String>,
}

impl MigrationLayer {
    pub fn new(settings: LayerSettings) -> Self {
        Self {
            settings,
            animator: MarkerAnimator::new(),
            source: RouteSource::Pending,
            fallback_reason: None,
        }
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn arcs(&self) -> &[MigrationArc] {
        self.animator.arcs()
    }

    pub fn markers(&self) -> &[markers::Marker] {
        self.animator.markers()
    }

    /// Run the one aggregation and build pass for a finished load.
    ///
    /// Failures never propagate: any error or an empty dataset swaps in the
    /// example routes.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        outcome: LoadOutcome,
        rng: &mut R,
        surface: &mut impl RenderSurface,
    ) {
        let result = outcome.and_then(|loaded| {
            let summary = aggregate(&loaded.records, self.settings.bucket_degrees, self.settings.top_n);
            info!(
                records = loaded.records.len(),
                groups = summary.groups,
                kept = summary.routes.len(),
                "grouped migration records into routes"
            );
            if summary.routes.is_empty() {
                Err(LoadError::EmptyDataset)
            } else {
                Ok(summary.routes)
            }
        });

        match result {
            Ok(routes) => {
                self.source = RouteSource::Data;
                self.fallback_reason = None;
                self.build_routes(&routes, rng, surface);
            }
            Err(err) => {
                warn!(error = %err, "using example migration routes");
                self.source = RouteSource::Example;
                self.fallback_reason = Some(err.to_string());
                self.build_routes(&fallback::example_routes(), rng, surface);
            }
        }

        info!(
            arcs = self.animator.arcs().len(),
            birds = self.animator.markers().len(),
            source = ?self.source,
            "migration arcs created"
        );
    }

    fn build_routes<R: Rng + ?Sized>(
        &mut self,
        routes: &[AggregatedRoute],
        rng: &mut R,
        surface: &mut impl RenderSurface,
    ) {
        for route in routes {
            let arc = arc::build(route, self.settings.globe_radius, self.settings.arc_segments, surface);
            let count = marker_count(arc.intensity);
            let color = arc.color;
            let id = self.animator.add_arc(arc);
            self.animator.spawn(id, count, color, rng, surface);
        }
    }

    /// Advance every bird one frame
    pub fn tick(&mut self, clock_ms: f64, surface: &mut impl RenderSurface) {
        self.animator.tick(clock_ms, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadedRecords;
    use crate::scene::{Scene, SceneObjectKind};
    use super::csv::{MigrationRecord, ParseError, ParseStats};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn warblers(n: usize) -> LoadedRecords {
        let records = (0..n)
            .map(|_| MigrationRecord {
                species: "Warbler".into(),
                start_lat: 10.0,
                start_lon: 10.0,
                end_lat: 20.0,
                end_lon: 20.0,
            })
            .collect();
        LoadedRecords {
            records,
            stats: ParseStats::default(),
        }
    }

    #[test]
    fn test_apply_data_builds_arcs_and_birds() {
        let mut scene = Scene::new();
        let mut layer = MigrationLayer::new(LayerSettings::default());
        let mut rng = StdRng::seed_from_u64(3);

        let mut loaded = warblers(50);
        for r in &mut loaded.records {
            r.end_lat = 40.0;
        }
        layer.apply(Ok(loaded), &mut rng, &mut scene);

        assert_eq!(layer.source(), RouteSource::Data);
        assert_eq!(layer.arcs().len(), 1);
        assert_eq!(layer.arcs()[0].count, 50);
        assert_eq!(layer.markers().len(), 8);
        assert_eq!(scene.count_where(SceneObjectKind::is_migration_arc), 1);
        assert_eq!(scene.count_where(SceneObjectKind::is_bird), 8);
    }

    #[test]
    fn test_errors_fall_back_to_examples() {
        for err in [
            LoadError::Fetch {
                location: "nowhere.csv".into(),
                reason: "not found".into(),
            },
            LoadError::MissingColumns(ParseError::MissingColumns { missing: vec!["Species"] }),
            LoadError::EmptyDataset,
        ] {
            let mut scene = Scene::new();
            let mut layer = MigrationLayer::new(LayerSettings::default());
            let mut rng = StdRng::seed_from_u64(1);
            layer.apply(Err(err), &mut rng, &mut scene);

            assert_eq!(layer.source(), RouteSource::Example);
            assert!(layer.fallback_reason().is_some());
            assert_eq!(layer.arcs().len(), fallback::example_routes().len());
            assert!(layer.markers().len() >= layer.arcs().len());
        }
    }

    #[test]
    fn test_same_region_warblers_make_one_full_arc() {
        // 10,10 -> 20,20 buckets to 15,15 -> 15,15
        let mut scene = Scene::new();
        let mut layer = MigrationLayer::new(LayerSettings::default());
        let mut rng = StdRng::seed_from_u64(3);
        layer.apply(Ok(warblers(50)), &mut rng, &mut scene);

        assert_eq!(layer.source(), RouteSource::Data);
        assert_eq!(layer.arcs().len(), 1);
        let arc = &layer.arcs()[0];
        assert_eq!(arc.count, 50);
        assert_eq!(arc.intensity, 1.0);
        assert_eq!(arc.color, palette::species_color("Warbler"));
        assert_eq!(layer.markers().len(), 8);

        for frame in 0..600 {
            layer.tick(frame as f64 * 16.0, &mut scene);
        }
        assert!(layer.markers().iter().all(|m| m.heading.is_finite()));
    }
}
