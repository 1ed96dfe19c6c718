use glam::DVec3;
use rand::Rng;

use crate::migration::arc::MigrationArc;
use crate::migration::palette::Rgb;
use crate::scene::{ObjectId, RenderSurface, SceneObjectKind, Style};

/// Marker speed range in progress units per tick, `[MIN, MAX)`
pub const MIN_SPEED: f64 = 0.002;
pub const MAX_SPEED: f64 = 0.005;
/// Size of a marker in scene units
pub const MARKER_SIZE: f64 = 0.3;

/// Index of an arc owned by a [`MarkerAnimator`]
pub type ArcId = usize;

/// A bird travelling along one arc
#[derive(Clone, Debug)]
pub struct Marker {
    pub arc: ArcId,
    /// Position along the arc in [0, 1)
    pub progress: f64,
    pub speed: f64,
    pub color: Rgb,
    pub heading: DVec3,
    pub object: ObjectId,
}

/// Shared marker opacity at a wall-clock time in milliseconds
#[inline]
pub fn pulse_opacity(clock_ms: f64) -> f64 {
    0.7 + 0.2 * (clock_ms * 0.01).sin()
}

/// Advance progress by `speed`, resetting to exactly 0 at the end of the arc.
#[inline]
pub fn advance(progress: f64, speed: f64) -> f64 {
    let next = progress + speed;
    if next >= 1.0 {
        0.0
    } else {
        next
    }
}

/// Owns arcs and the markers travelling along them.
#[derive(Default)]
pub struct MarkerAnimator {
    arcs: Vec<MigrationArc>,
    markers: Vec<Marker>,
}

impl MarkerAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an arc; markers refer to it by the returned id.
    pub fn add_arc(&mut self, arc: MigrationArc) -> ArcId {
        self.arcs.push(arc);
        self.arcs.len() - 1
    }

    pub fn arcs(&self) -> &[MigrationArc] {
        &self.arcs
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Place `count` markers on an arc at random phases and speeds.
    /// Returns the range of indices of the new markers.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        arc: ArcId,
        count: usize,
        color: Rgb,
        rng: &mut R,
        surface: &mut impl RenderSurface,
    ) -> std::ops::Range<usize> {
        let first = self.markers.len();
        let Some(owner) = self.arcs.get(arc) else {
            return first..first;
        };
        let curve = owner.curve;

        for _ in 0..count {
            let progress = rng.gen_range(0.0..1.0);
            let speed = rng.gen_range(MIN_SPEED..MAX_SPEED);
            let position = curve.point(progress);
            let heading = curve.tangent(progress).unwrap_or(DVec3::Y);

            let object = surface.add_point(
                SceneObjectKind::Bird { arc },
                position,
                heading,
                Style::new(color, MARKER_SIZE, 0.9),
            );

            self.markers.push(Marker {
                arc,
                progress,
                speed,
                color,
                heading,
                object,
            });
        }

        first..self.markers.len()
    }

    /// Advance every marker one step and push new transforms to `surface`.
    ///
    /// All markers share the same pulsing opacity, driven by `clock_ms`.
    pub fn tick(&mut self, clock_ms: f64, surface: &mut impl RenderSurface) {
        let opacity = pulse_opacity(clock_ms);

        for marker in &mut self.markers {
            let Some(arc) = self.arcs.get(marker.arc) else {
                continue;
            };

            marker.progress = advance(marker.progress, marker.speed);
            let position = arc.curve.point(marker.progress);
            if let Some(heading) = arc.curve.tangent(marker.progress) {
                marker.heading = heading;
            }

            surface.update_point(marker.object, position, marker.heading, opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::arc::build;
    use crate::migration::routes::AggregatedRoute;
    use crate::scene::{Geometry, Scene};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator_with_arc(scene: &mut Scene) -> (MarkerAnimator, ArcId) {
        let route = AggregatedRoute {
            species: "Hawk".into(),
            start_lat: 60.0,
            start_lon: -105.0,
            end_lat: -15.0,
            end_lon: -60.0,
            count: 12,
        };
        let arc = build(&route, 50.0, 30, scene);
        let mut animator = MarkerAnimator::new();
        let id = animator.add_arc(arc);
        (animator, id)
    }

    #[test]
    fn test_advance_wraps_to_zero() {
        assert_eq!(advance(0.999, 0.002), 0.0);
        assert_eq!(advance(0.5, 0.5), 0.0);
        assert!((advance(0.2, 0.003) - 0.203).abs() < 1e-15);
        for speed in [0.002, 0.0049, 0.3, 1.0, 7.5] {
            let p = advance(0.9, speed);
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn test_spawn_randomizes_phase_and_speed() {
        let mut scene = Scene::new();
        let (mut animator, arc) = animator_with_arc(&mut scene);
        let mut rng = StdRng::seed_from_u64(11);

        let spawned = animator.spawn(arc, 8, Rgb::WHITE, &mut rng, &mut scene);
        assert_eq!(spawned, 0..8);
        assert_eq!(scene.count_where(SceneObjectKind::is_bird), 8);

        for m in animator.markers() {
            assert!((0.0..1.0).contains(&m.progress));
            assert!((MIN_SPEED..MAX_SPEED).contains(&m.speed));
        }
        let first = animator.markers()[0].progress;
        assert!(animator.markers().iter().any(|m| m.progress != first));
    }

    #[test]
    fn test_spawn_on_unknown_arc_is_empty() {
        let mut scene = Scene::new();
        let mut animator = MarkerAnimator::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(animator.spawn(3, 4, Rgb::WHITE, &mut rng, &mut scene).is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_tick_moves_markers_along_curve() {
        let mut scene = Scene::new();
        let (mut animator, arc) = animator_with_arc(&mut scene);
        let mut rng = StdRng::seed_from_u64(5);
        animator.spawn(arc, 3, Rgb::WHITE, &mut rng, &mut scene);

        let before: Vec<f64> = animator.markers().iter().map(|m| m.progress).collect();
        animator.tick(0.0, &mut scene);

        let curve = animator.arcs()[arc].curve;
        for (m, p0) in animator.markers().iter().zip(before) {
            assert_eq!(m.progress, advance(p0, m.speed));
            let object = scene.get(m.object).unwrap();
            let Geometry::Point { position, heading } = &object.geometry else {
                panic!("bird should be a point");
            };
            assert_eq!(*position, curve.point(m.progress));
            assert!((heading.length() - 1.0).abs() < 1e-9);
            assert!((object.style.opacity - 0.7).abs() < 1e-12);
        }
    }

    #[test]
    fn test_progress_stays_in_range_over_many_ticks() {
        let mut scene = Scene::new();
        let (mut animator, arc) = animator_with_arc(&mut scene);
        let mut rng = StdRng::seed_from_u64(9);
        animator.spawn(arc, 8, Rgb::WHITE, &mut rng, &mut scene);

        let mut wrapped = false;
        for frame in 0..1200 {
            animator.tick(frame as f64 * 16.0, &mut scene);
            for m in animator.markers() {
                assert!((0.0..1.0).contains(&m.progress));
                wrapped |= m.progress == 0.0;
            }
        }
        assert!(wrapped);
    }

    #[test]
    fn test_pulse_is_shared_and_bounded() {
        let mut scene = Scene::new();
        let (mut animator, arc) = animator_with_arc(&mut scene);
        let mut rng = StdRng::seed_from_u64(2);
        animator.spawn(arc, 5, Rgb::WHITE, &mut rng, &mut scene);

        let clock = 157.0;
        animator.tick(clock, &mut scene);
        for m in animator.markers() {
            assert_eq!(scene.get(m.object).unwrap().style.opacity, pulse_opacity(clock));
        }
        for ms in 0..2000 {
            let o = pulse_opacity(ms as f64);
            assert!((0.5 - 1e-12..=0.9 + 1e-12).contains(&o));
        }
    }
}
