use glam::{DMat3, DVec3};

/// Fraction of the shorter canvas side covered by the arc apex sphere at zoom 1
const FIT_FRACTION: f64 = 0.48;
const MIN_ZOOM: f64 = 0.35;
const MAX_ZOOM: f64 = 35.0;
const ZOOM_STEP: f64 = 1.5;
/// Orbit-control style damping: fraction of spin velocity lost per frame
pub const DAMPING: f64 = 0.05;
/// Highest camera elevation above or below the equator
const MAX_ELEVATION: f64 = std::f64::consts::FRAC_PI_2 - 1e-3;

/// Orthographic orbit camera looking at a globe centred on the origin.
/// Orientation stored as three orthonormal vectors in scene space so points
/// project with three dot products.
#[derive(Clone)]
pub struct GlobeViewport {
    /// Direction from the globe centre towards the camera
    forward: DVec3,
    /// Screen right
    right: DVec3,
    /// Screen up
    up: DVec3,
    /// Globe radius in scene units; the occluder for back-facing points
    pub globe_radius: f64,
    /// Distance the view must fit (arc apex), in scene units
    pub fit_radius: f64,
    /// Zoom multiplier on top of the fitted scale
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Inertial rotation (radians per frame) about up and right
    velocity: (f64, f64),
    dragging: bool,
}

impl GlobeViewport {
    /// Camera on +Z looking at the origin with +Y up.
    ///
    /// Scene longitudes run clockwise seen from above, so screen right is -X;
    /// that keeps east on the right.
    pub fn new(globe_radius: f64, fit_radius: f64, width: usize, height: usize) -> Self {
        Self {
            forward: DVec3::Z,
            right: DVec3::NEG_X,
            up: DVec3::Y,
            globe_radius,
            fit_radius,
            zoom: 1.0,
            width,
            height,
            velocity: (0.0, 0.0),
            dragging: false,
        }
    }

    /// Braille pixels per scene unit
    pub fn scale(&self) -> f64 {
        let side = self.width.min(self.height) as f64;
        side * FIT_FRACTION / self.fit_radius * self.zoom
    }

    /// Direction from the globe centre towards the camera
    pub fn facing(&self) -> DVec3 {
        self.forward
    }

    /// Project a scene point to screen pixels without occlusion.
    #[inline]
    pub fn project_raw(&self, p: DVec3) -> (i32, i32) {
        let scale = self.scale();
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);
        let px = (self.width as f64 / 2.0 + sx * scale).round() as i32;
        let py = (self.height as f64 / 2.0 - sy * scale).round() as i32;
        (px, py)
    }

    /// Project a scene point to screen pixels.
    /// Returns `None` when the globe hides the point.
    #[inline]
    pub fn project(&self, p: DVec3) -> Option<(i32, i32)> {
        if self.is_occluded(p) {
            return None;
        }
        Some(self.project_raw(p))
    }

    /// True when `p` sits behind the globe as seen from the camera
    #[inline]
    pub fn is_occluded(&self, p: DVec3) -> bool {
        let depth = p.dot(self.forward);
        if depth >= 0.0 {
            return false;
        }
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);
        sx * sx + sy * sy < self.globe_radius * self.globe_radius
    }

    /// Screen centre and radius of the globe disk in pixels
    pub fn disk(&self) -> ((i32, i32), i32) {
        let centre = self.project_raw(DVec3::ZERO);
        (centre, (self.globe_radius * self.scale()).round() as i32)
    }

    /// Rotate the camera about the globe by angles in radians.
    /// Positive `yaw` swings the view east, positive `pitch` north.
    /// Yaw turns about the polar axis and the elevation stops short of the
    /// poles, so the north pole never tips below the equator on screen.
    fn orbit(&mut self, yaw: f64, pitch: f64) {
        if yaw.abs() <= 1e-10 && pitch.abs() <= 1e-10 {
            return;
        }
        let turned = DMat3::from_rotation_y(-yaw) * self.forward;
        let elevation = (turned.y.clamp(-1.0, 1.0).asin() + pitch).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        let Some(heading) = DVec3::new(turned.x, 0.0, turned.z).try_normalize() else {
            return;
        };

        let (sin_e, cos_e) = elevation.sin_cos();
        self.forward = (heading * cos_e + DVec3::Y * sin_e).normalize();
        self.right = self.forward.cross(DVec3::Y).normalize();
        self.up = self.right.cross(self.forward);
    }

    /// Camera elevation above the equator in radians
    pub fn elevation(&self) -> f64 {
        self.forward.y.clamp(-1.0, 1.0).asin()
    }

    /// Rotate by a pixel drag delta (previous minus current cursor position);
    /// the globe surface follows the cursor.
    pub fn rotate_drag(&mut self, dx: i32, dy: i32) {
        let pixels_per_radian = (self.globe_radius * self.scale()).max(1.0);
        let yaw = dx as f64 / pixels_per_radian;
        let pitch = -(dy as f64) / pixels_per_radian;
        self.dragging = true;
        self.velocity = (yaw, pitch);
        self.orbit(yaw, pitch);
    }

    /// Release a drag; the remaining velocity decays over the next frames.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Per-frame inertia. Call once per frame.
    pub fn update(&mut self) {
        if self.dragging {
            return;
        }
        let (yaw, pitch) = self.velocity;
        self.orbit(yaw, pitch);
        self.velocity = (yaw * (1.0 - DAMPING), pitch * (1.0 - DAMPING));
        if self.velocity.0.abs() < 1e-6 && self.velocity.1.abs() < 1e-6 {
            self.velocity = (0.0, 0.0);
        }
    }

    /// Add an inertial nudge (keyboard rotation)
    pub fn nudge(&mut self, yaw: f64, pitch: f64) {
        self.velocity.0 += yaw;
        self.velocity.1 += pitch;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Set viewport dimensions.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }
}

/// Interpolate along the great circle between two scene points on a sphere
/// and call a visitor for each subdivision point after `a`, ending at `b`.
/// Subdivides to ~2° segments so long coastline edges hug the surface.
pub fn walk_great_circle(a: DVec3, b: DVec3, mut visitor: impl FnMut(DVec3)) {
    let radius = a.length();
    let (ua, ub) = match (a.try_normalize(), b.try_normalize()) {
        (Some(ua), Some(ub)) => (ua, ub),
        _ => {
            visitor(b);
            return;
        }
    };

    let angle = ua.dot(ub).clamp(-1.0, 1.0).acos();
    let steps = ((angle.to_degrees() / 2.0 - 1e-9).ceil() as usize).max(1);
    let sin_angle = angle.sin();

    // Short, identical or antipodal: nothing sensible to interpolate
    if steps == 1 || sin_angle.abs() < 1e-10 {
        visitor(b);
        return;
    }

    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        visitor((ua * sa + ub * sb) * radius);
    }
    visitor(b);
}
