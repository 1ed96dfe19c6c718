use glam::DVec3;
use tracing::debug;

use crate::geo::project;
use crate::migration::palette::{species_color, Rgb};
use crate::migration::routes::AggregatedRoute;
use crate::scene::{ObjectId, RenderSurface, SceneObjectKind, Style};

/// Lift of arc endpoints above the globe surface
pub const ENDPOINT_LIFT: f64 = 0.5;
/// Apex distance from the globe centre, as a multiple of the globe radius
pub const APEX_SCALE: f64 = 1.8;
/// Minimum polyline resolution for an arc
pub const MIN_SEGMENTS: usize = 30;

/// Quadratic Bézier through `p0`, `p1` (control) and `p2`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub p0: DVec3,
    pub p1: DVec3,
    pub p2: DVec3,
}

impl QuadraticBezier {
    pub fn new(p0: DVec3, p1: DVec3, p2: DVec3) -> Self {
        Self { p0, p1, p2 }
    }

    /// Point at parameter `t` in [0, 1]
    #[inline]
    pub fn point(&self, t: f64) -> DVec3 {
        let u = 1.0 - t;
        self.p0 * (u * u) + self.p1 * (2.0 * u * t) + self.p2 * (t * t)
    }

    /// First derivative at `t`
    #[inline]
    pub fn derivative(&self, t: f64) -> DVec3 {
        (self.p1 - self.p0) * (2.0 * (1.0 - t)) + (self.p2 - self.p1) * (2.0 * t)
    }

    /// Unit tangent at `t`.
    ///
    /// Uses the analytic derivative, which stays well defined up to and
    /// including `t = 1`. Falls back to the chord when the derivative
    /// vanishes; `None` only for a curve collapsed to a point.
    pub fn tangent(&self, t: f64) -> Option<DVec3> {
        self.derivative(t.clamp(0.0, 1.0))
            .try_normalize()
            .or_else(|| (self.p2 - self.p0).try_normalize())
    }

    /// `segments + 1` evenly spaced samples from `p0` to `p2`
    pub fn sample(&self, segments: usize) -> Vec<DVec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point(i as f64 / segments as f64))
            .collect()
    }
}

/// A rendered migration route
#[derive(Clone, Debug)]
pub struct MigrationArc {
    pub species: String,
    pub curve: QuadraticBezier,
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
    pub intensity: f64,
    pub count: usize,
    pub start_region: String,
    pub end_region: String,
    pub object: ObjectId,
}

/// Direction of the arc apex: the endpoints' mean direction, or any
/// direction perpendicular to `a` when the endpoints are antipodal.
fn apex_direction(a: DVec3, b: DVec3) -> DVec3 {
    ((a + b) * 0.5).try_normalize().unwrap_or_else(|| {
        a.cross(DVec3::Y)
            .try_normalize()
            .or_else(|| a.cross(DVec3::X).try_normalize())
            .unwrap_or(DVec3::Y)
    })
}

/// Curve for a route on a globe of `radius`.
///
/// A route that starts and ends in the same region has coincident endpoints;
/// its curve rises straight out to the apex and falls back, so it still
/// renders as a visible spike and never produces NaN.
pub fn route_curve(route: &AggregatedRoute, radius: f64) -> QuadraticBezier {
    let start = project(route.start_lat, route.start_lon, radius + ENDPOINT_LIFT);
    let end = project(route.end_lat, route.end_lon, radius + ENDPOINT_LIFT);
    let control = apex_direction(start, end) * (radius * APEX_SCALE);
    QuadraticBezier::new(start, control, end)
}

/// Build the arc for `route` and register its polyline with `surface`.
pub fn build(
    route: &AggregatedRoute,
    radius: f64,
    segments: usize,
    surface: &mut impl RenderSurface,
) -> MigrationArc {
    let curve = route_curve(route, radius);
    if curve.p0.distance_squared(curve.p2) < 1e-12 {
        debug!(
            species = %route.species,
            region = %route.start_region(),
            "route starts and ends in the same region, drawing a spike"
        );
    }

    let intensity = route.intensity();
    let width = 0.5 + intensity * 2.0;
    let opacity = 0.3 + intensity * 0.5;
    let color = species_color(&route.species);
    let start_region = route.start_region();
    let end_region = route.end_region();

    let object = surface.add_polyline(
        SceneObjectKind::MigrationArc {
            count: route.count,
            start_region: start_region.clone(),
            end_region: end_region.clone(),
        },
        curve.sample(segments.max(MIN_SEGMENTS)),
        Style::new(color, width, opacity),
    );

    MigrationArc {
        species: route.species.clone(),
        curve,
        color,
        width,
        opacity,
        intensity,
        count: route.count,
        start_region,
        end_region,
        object,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Scene};

    fn route(species: &str, start: (f64, f64), end: (f64, f64), count: usize) -> AggregatedRoute {
        AggregatedRoute {
            species: species.to_string(),
            start_lat: start.0,
            start_lon: start.1,
            end_lat: end.0,
            end_lon: end.1,
            count,
        }
    }

    #[test]
    fn test_endpoints_match_projection() {
        let mut scene = Scene::new();
        let r = route("Hawk", (45.0, -90.0), (-15.0, -60.0), 10);
        let arc = build(&r, 50.0, 30, &mut scene);

        assert_eq!(arc.curve.point(0.0), project(45.0, -90.0, 50.5));
        assert_eq!(arc.curve.point(1.0), project(-15.0, -60.0, 50.5));

        let Geometry::Polyline(points) = &scene.get(arc.object).unwrap().geometry else {
            panic!("arc should be a polyline");
        };
        assert_eq!(points.len(), 31);
        assert_eq!(points[0], arc.curve.p0);
        assert_eq!(points[30], arc.curve.p2);
    }

    #[test]
    fn test_control_point_sits_at_apex_radius() {
        let c = route_curve(&route("Owl", (0.0, 0.0), (30.0, 45.0), 1), 50.0);
        assert!((c.p1.length() - 90.0).abs() < 1e-9);

        // scales with the globe
        let big = route_curve(&route("Owl", (0.0, 0.0), (30.0, 45.0), 1), 100.0);
        assert!((big.p1.length() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_style_from_intensity() {
        let mut scene = Scene::new();
        let full = build(&route("Warbler", (0.0, 0.0), (15.0, 15.0), 40), 50.0, 30, &mut scene);
        assert_eq!(full.intensity, 1.0);
        assert_eq!(full.width, 2.5);
        assert!((full.opacity - 0.8).abs() < 1e-12);
        assert_eq!(full.color, species_color("Warbler"));

        let light = build(&route("Kiwi", (0.0, 0.0), (15.0, 15.0), 5), 50.0, 30, &mut scene);
        assert_eq!(light.intensity, 0.25);
        assert_eq!(light.width, 1.0);
        assert!((light.opacity - 0.425).abs() < 1e-12);
        assert_eq!(light.color, Rgb::WHITE);
        assert_eq!(light.start_region, "0,0");
        assert_eq!(light.end_region, "15,15");
    }

    #[test]
    fn test_same_region_route_draws_spike() {
        let mut scene = Scene::new();
        let arc = build(&route("Crane", (30.0, 30.0), (30.0, 30.0), 3), 50.0, 30, &mut scene);
        let c = arc.curve;
        assert_eq!(c.p0, c.p2);
        assert!((c.p1.length() - 90.0).abs() < 1e-9);
        assert!((c.p1.normalize() - c.p0.normalize()).length() < 1e-12);

        // rises to the halfway point between endpoint and apex
        let peak = c.point(0.5);
        assert!((peak - (c.p0 + c.p1) * 0.5).length() < 1e-9);
        assert_eq!(scene.count_where(SceneObjectKind::is_migration_arc), 1);

        // all longitudes meet at the pole
        let pole = route_curve(&route("Crane", (90.0, 0.0), (90.0, 120.0), 3), 50.0);
        assert!(pole.p1.is_finite());
        assert!((pole.p1 - DVec3::new(0.0, 90.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_antipodal_route_has_finite_apex() {
        let c = route_curve(&route("Eagle", (0.0, 0.0), (0.0, 180.0), 3), 50.0);
        assert!(c.p1.is_finite());
        assert!((c.p1.length() - 90.0).abs() < 1e-9);
        for i in 0..=10 {
            assert!(c.point(i as f64 / 10.0).is_finite());
        }

        let polar = route_curve(&route("Eagle", (90.0, 0.0), (-90.0, 0.0), 3), 50.0);
        assert!(polar.p1.is_finite());
    }

    #[test]
    fn test_low_resolution_is_raised() {
        let mut scene = Scene::new();
        let arc = build(&route("Hawk", (0.0, 0.0), (45.0, 45.0), 1), 50.0, 4, &mut scene);
        let Geometry::Polyline(points) = &scene.get(arc.object).unwrap().geometry else {
            panic!("arc should be a polyline");
        };
        assert_eq!(points.len(), MIN_SEGMENTS + 1);
    }

    #[test]
    fn test_tangent_is_stable_at_end() {
        let c = QuadraticBezier::new(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(0.0, 2.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        for t in [0.0, 0.5, 0.99, 0.999, 1.0] {
            let tan = c.tangent(t).unwrap();
            assert!((tan.length() - 1.0).abs() < 1e-12);
        }
        assert!((c.tangent(0.5).unwrap() - DVec3::X).length() < 1e-12);

        // collinear control point at the midpoint still yields a direction
        let straight = QuadraticBezier::new(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert_eq!(straight.tangent(1.0), Some(DVec3::X));

        let collapsed = QuadraticBezier::new(DVec3::ONE, DVec3::ONE, DVec3::ONE);
        assert_eq!(collapsed.tangent(0.3), None);
    }
}
