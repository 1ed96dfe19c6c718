use glam::DVec3;

use crate::braille::BrailleCanvas;
use crate::geo::project;
use crate::map::geometry::{draw_polyline, draw_ring};
use crate::map::globe::GlobeViewport;
use crate::migration::palette::Rgb;
use crate::scene::{Geometry, RenderSurface, Scene, SceneObjectKind, Style};

/// Spacing between grid lines in degrees
pub const GRID_STEP_DEGREES: i32 = 10;
/// Spacing between points along a grid line in degrees
pub const GRID_SAMPLE_DEGREES: i32 = 5;
pub const GRID_OPACITY: f64 = 0.5;
/// Lines at least this wide are drawn with the thick rasterizer
pub const THICK_LINE_WIDTH: f64 = 1.5;
/// Scene-unit length of the probe used to find a bird's on-screen heading
const HEADING_PROBE: f64 = 5.0;
const OUTLINE_COLOR: Rgb = Rgb::from_hex(0x1d3557);

/// Arrow per screen octant, counter-clockwise from east
const ARROWS: [char; 8] = ['→', '↗', '↑', '↖', '←', '↙', '↓', '↘'];

/// Add latitude and longitude lines to a globe of `radius`.
/// Returns the number of grid lines added.
pub fn add_graticule(surface: &mut impl RenderSurface, radius: f64) -> usize {
    let style = Style::new(Rgb::WHITE, 1.0, GRID_OPACITY);
    let mut lines = 0;

    for lat in (-80..=80).step_by(GRID_STEP_DEGREES as usize) {
        let points = (-180..=180)
            .step_by(GRID_SAMPLE_DEGREES as usize)
            .map(|lon| project(lat as f64, lon as f64, radius))
            .collect();
        surface.add_polyline(SceneObjectKind::GridLine, points, style);
        lines += 1;
    }

    for lon in (0..360).step_by(GRID_STEP_DEGREES as usize) {
        let points = (-90..=90)
            .step_by(GRID_SAMPLE_DEGREES as usize)
            .map(|lat| project(lat as f64, lon as f64, radius))
            .collect();
        surface.add_polyline(SceneObjectKind::GridLine, points, style);
        lines += 1;
    }

    lines
}

/// One color's worth of braille dots
pub struct Layer {
    pub color: Rgb,
    pub canvas: BrailleCanvas,
}

/// A bird drawn as a single arrow character
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdGlyph {
    pub col: u16,
    pub row: u16,
    pub glyph: char,
    pub color: Rgb,
}

/// Rendered frame, back to front: braille layers then bird glyphs
pub struct GlobeLayers {
    pub layers: Vec<Layer>,
    pub birds: Vec<BirdGlyph>,
}

impl GlobeLayers {
    /// Canvas for `color`, creating a new layer on first use
    fn layer_for(&mut self, color: Rgb, cols: usize, rows: usize) -> &mut BrailleCanvas {
        let index = match self.layers.iter().position(|l| l.color == color) {
            Some(index) => index,
            None => {
                self.layers.push(Layer {
                    color,
                    canvas: BrailleCanvas::new(cols, rows),
                });
                self.layers.len() - 1
            }
        };
        &mut self.layers[index].canvas
    }
}

/// Arrow glyph for a screen-space direction (y grows downwards)
pub fn arrow_glyph(dx: i32, dy: i32) -> char {
    if dx == 0 && dy == 0 {
        return '•';
    }
    let angle = (-dy as f64).atan2(dx as f64);
    let octant = (angle / std::f64::consts::FRAC_PI_4).round() as i32;
    ARROWS[octant.rem_euclid(8) as usize]
}

/// Terminal renderer for a [`Scene`] seen through a [`GlobeViewport`]
pub struct GlobeRenderer {
    /// Draw the globe silhouette
    pub show_outline: bool,
}

impl GlobeRenderer {
    pub fn new() -> Self {
        Self { show_outline: true }
    }

    /// Rasterize every visible scene object for a `cols` x `rows` cell area.
    pub fn render(&self, scene: &Scene, viewport: &GlobeViewport, cols: usize, rows: usize) -> GlobeLayers {
        let mut frame = GlobeLayers {
            layers: Vec::new(),
            birds: Vec::new(),
        };
        let model = scene.model();
        let max_jump = viewport.width as i32;

        if self.show_outline {
            let (centre, radius) = viewport.disk();
            draw_ring(frame.layer_for(OUTLINE_COLOR, cols, rows), centre, radius);
        }

        for object in scene.objects().iter().filter(|o| o.visible) {
            let color = object.style.display_color();
            match &object.geometry {
                Geometry::Polyline(points) => {
                    let canvas = frame.layer_for(color, cols, rows);
                    let projected = points.iter().map(|&p| viewport.project(model * p));
                    draw_polyline(canvas, projected, object.style.width >= THICK_LINE_WIDTH, max_jump);
                }
                Geometry::Point { position, heading } => {
                    let world = model * *position;
                    let Some((px, py)) = viewport.project(world) else {
                        continue;
                    };
                    if px < 0 || py < 0 {
                        continue;
                    }
                    let (col, row) = ((px / 2) as usize, (py / 4) as usize);
                    if col >= cols || row >= rows {
                        continue;
                    }
                    let tip = viewport.project_raw(world + model * *heading * HEADING_PROBE);
                    frame.birds.push(BirdGlyph {
                        col: col as u16,
                        row: row as u16,
                        glyph: arrow_glyph(tip.0 - px, tip.1 - py),
                        color,
                    });
                }
            }
        }

        frame
    }
}

impl Default for GlobeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scene point on the globe surface that faces the camera, as (lat, lon)
pub fn facing_coordinates(scene: &Scene, viewport: &GlobeViewport) -> (f64, f64) {
    let local: DVec3 = scene.model().transpose() * viewport.facing();
    crate::geo::unproject(local)
}
