//! Retained scene the migration layer draws into.
//!
//! The animation core only talks to [`RenderSurface`]; the terminal renderer
//! walks the [`Scene`] implementation every frame.

use glam::{DMat3, DVec3};

use crate::migration::palette::Rgb;

/// Handle to an object registered with a render surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// What a scene object represents, with per-kind payload
#[derive(Clone, Debug, PartialEq)]
pub enum SceneObjectKind {
    GridLine,
    Coastline,
    MigrationArc {
        count: usize,
        start_region: String,
        end_region: String,
    },
    Bird {
        /// Index of the arc this bird travels along
        arc: usize,
    },
}

impl SceneObjectKind {
    pub fn is_bird(&self) -> bool {
        matches!(self, SceneObjectKind::Bird { .. })
    }

    pub fn is_migration_arc(&self) -> bool {
        matches!(self, SceneObjectKind::MigrationArc { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
}

impl Style {
    pub fn new(color: Rgb, width: f64, opacity: f64) -> Self {
        Self { color, width, opacity }
    }

    /// Color as it appears over the background
    pub fn display_color(&self) -> Rgb {
        self.color.with_opacity(self.opacity)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Polyline(Vec<DVec3>),
    Point { position: DVec3, heading: DVec3 },
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub kind: SceneObjectKind,
    pub geometry: Geometry,
    pub style: Style,
    pub visible: bool,
}

/// Primitive operations the migration layer needs from a renderer.
pub trait RenderSurface {
    /// Register an open polyline through the given points.
    fn add_polyline(&mut self, kind: SceneObjectKind, points: Vec<DVec3>, style: Style) -> ObjectId;

    /// Register a point-like object at `position` facing along `heading`.
    fn add_point(&mut self, kind: SceneObjectKind, position: DVec3, heading: DVec3, style: Style) -> ObjectId;

    /// Move a point object and update its opacity.
    fn update_point(&mut self, id: ObjectId, position: DVec3, heading: DVec3, opacity: f64);
}

/// Scene graph: globe objects plus the shared globe spin.
///
/// Everything in the scene spins together about +Y, so birds stay on
/// their arcs and arcs stay pinned to the grid.
#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    /// Globe rotation about +Y in radians
    pub spin: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects matching a predicate on their kind
    pub fn count_where(&self, pred: impl Fn(&SceneObjectKind) -> bool) -> usize {
        self.objects.iter().filter(|o| pred(&o.kind)).count()
    }

    /// Show or hide every object matching a predicate on their kind
    pub fn set_visible_where(&mut self, pred: impl Fn(&SceneObjectKind) -> bool, visible: bool) {
        for object in self.objects.iter_mut().filter(|o| pred(&o.kind)) {
            object.visible = visible;
        }
    }

    /// Advance the globe spin
    pub fn rotate(&mut self, radians: f64) {
        self.spin = (self.spin + radians).rem_euclid(std::f64::consts::TAU);
    }

    /// Model transform for the current spin
    pub fn model(&self) -> DMat3 {
        DMat3::from_rotation_y(self.spin)
    }

    fn push(&mut self, kind: SceneObjectKind, geometry: Geometry, style: Style) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(SceneObject {
            kind,
            geometry,
            style,
            visible: true,
        });
        id
    }
}

impl RenderSurface for Scene {
    fn add_polyline(&mut self, kind: SceneObjectKind, points: Vec<DVec3>, style: Style) -> ObjectId {
        self.push(kind, Geometry::Polyline(points), style)
    }

    fn add_point(&mut self, kind: SceneObjectKind, position: DVec3, heading: DVec3, style: Style) -> ObjectId {
        self.push(kind, Geometry::Point { position, heading }, style)
    }

    fn update_point(&mut self, id: ObjectId, position: DVec3, heading: DVec3, opacity: f64) {
        if let Some(object) = self.objects.get_mut(id.0) {
            if let Geometry::Point { position: p, heading: h } = &mut object.geometry {
                *p = position;
                *h = heading;
            }
            object.style.opacity = opacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_point_moves_only_points() {
        let mut scene = Scene::new();
        let style = Style::new(Rgb::WHITE, 1.0, 0.5);
        let line = scene.add_polyline(SceneObjectKind::GridLine, vec![DVec3::X, DVec3::Y], style);
        let bird = scene.add_point(SceneObjectKind::Bird { arc: 0 }, DVec3::ZERO, DVec3::X, style);

        scene.update_point(bird, DVec3::Z, DVec3::Y, 0.9);
        scene.update_point(line, DVec3::Z, DVec3::Y, 0.1);

        let moved = scene.get(bird).unwrap();
        assert_eq!(moved.geometry, Geometry::Point { position: DVec3::Z, heading: DVec3::Y });
        assert_eq!(moved.style.opacity, 0.9);
        assert_eq!(scene.get(line).unwrap().geometry, Geometry::Polyline(vec![DVec3::X, DVec3::Y]));
        assert_eq!(scene.count_where(SceneObjectKind::is_bird), 1);
    }

    #[test]
    fn test_visibility_toggle_by_kind() {
        let mut scene = Scene::new();
        let style = Style::new(Rgb::WHITE, 1.0, 0.5);
        scene.add_polyline(SceneObjectKind::GridLine, vec![], style);
        scene.add_polyline(SceneObjectKind::Coastline, vec![], style);
        scene.set_visible_where(|k| *k == SceneObjectKind::GridLine, false);
        let visible: Vec<bool> = scene.objects().iter().map(|o| o.visible).collect();
        assert_eq!(visible, [false, true]);
    }

    #[test]
    fn test_spin_wraps() {
        let mut scene = Scene::new();
        scene.rotate(std::f64::consts::TAU + 0.5);
        assert!((scene.spin - 0.5).abs() < 1e-12);
    }
}
