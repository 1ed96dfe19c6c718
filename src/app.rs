use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::config::MigrationConfig;
use crate::data::{self, Coastlines};
use crate::loader::{self, LoadError, LoadOutcome};
use crate::map::{add_graticule, facing_coordinates, GlobeRenderer, GlobeViewport};
use crate::migration::arc::APEX_SCALE;
use crate::migration::csv::ParseStats;
use crate::migration::{MigrationLayer, RouteSource};
use crate::scene::{Scene, SceneObjectKind};

/// Globe spin per frame, radians about +Y
pub const SPIN_PER_FRAME: f64 = 0.003;
/// Keyboard rotation impulse, radians per frame
const KEY_NUDGE: f64 = 0.02;

/// Application state
pub struct App {
    pub viewport: GlobeViewport,
    pub scene: Scene,
    pub layer: MigrationLayer,
    pub renderer: GlobeRenderer,
    pub coastlines: Coastlines,
    pub should_quit: bool,
    /// Globe spin stopped
    pub paused: bool,
    pub show_grid: bool,
    pub show_coastlines: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Outstanding background load, if any
    pending: Option<Receiver<LoadOutcome>>,
    /// Row counts from the load that produced the current arcs
    stats: Option<ParseStats>,
    rng: StdRng,
    started: Instant,
}

/// Braille pixel size of the globe panel inside a terminal of `width` x `height`
fn panel_pixels(width: usize, height: usize) -> (usize, usize) {
    // 2 for the border horizontally; border plus status bar vertically
    (width.saturating_sub(2) * 2, height.saturating_sub(3) * 4)
}

impl App {
    /// Build the static globe and start loading migration data in the background.
    pub fn new(config: &MigrationConfig, width: usize, height: usize) -> Self {
        let pending = loader::spawn_load(config.source.clone(), config.load.clone());
        Self::with_receiver(config, width, height, pending)
    }

    /// Like [`App::new`] with the load outcome arriving on `pending`.
    pub fn with_receiver(
        config: &MigrationConfig,
        width: usize,
        height: usize,
        pending: Receiver<LoadOutcome>,
    ) -> Self {
        let radius = config.layer.globe_radius;
        let mut scene = Scene::new();
        add_graticule(&mut scene, radius);
        let coastlines = data::load_coastlines(&mut scene, &config.coastline_dir, radius);

        let (pixel_width, pixel_height) = panel_pixels(width, height);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            viewport: GlobeViewport::new(radius, radius * APEX_SCALE, pixel_width, pixel_height),
            scene,
            layer: MigrationLayer::new(config.layer),
            renderer: GlobeRenderer::new(),
            coastlines,
            should_quit: false,
            paused: false,
            show_grid: true,
            show_coastlines: true,
            last_mouse: None,
            pending: Some(pending),
            stats: None,
            rng,
            started: Instant::now(),
        }
    }

    /// Advance one frame: pick up a finished load, spin, animate birds.
    pub fn update(&mut self) {
        self.poll_loader();
        if !self.paused {
            self.scene.rotate(SPIN_PER_FRAME);
        }
        self.viewport.update();
        let clock_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.layer.tick(clock_ms, &mut self.scene);
    }

    /// Apply the load outcome once it arrives. Never blocks.
    fn poll_loader(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                warn!("loader exited without a result");
                Err(LoadError::Fetch {
                    location: "loader".into(),
                    reason: "loader thread exited".into(),
                })
            }
        };
        self.pending = None;
        self.stats = outcome.as_ref().ok().map(|loaded| loaded.stats.clone());
        self.layer.apply(outcome, &mut self.rng, &mut self.scene);
    }

    /// True until the background load has been applied
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = panel_pixels(width, height);
        self.viewport.set_size(pixel_width, pixel_height);
    }

    /// Keyboard rotation; positive `yaw` turns the view east, positive `pitch` north
    pub fn rotate(&mut self, yaw: i32, pitch: i32) {
        self.viewport.nudge(yaw as f64 * KEY_NUDGE, pitch as f64 * KEY_NUDGE);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
        self.scene
            .set_visible_where(|k| *k == SceneObjectKind::GridLine, self.show_grid);
    }

    pub fn toggle_coastlines(&mut self) {
        self.show_coastlines = !self.show_coastlines;
        self.scene
            .set_visible_where(|k| *k == SceneObjectKind::Coastline, self.show_coastlines);
    }

    /// Back to the initial camera; spin, arcs and birds carry on
    pub fn reset_view(&mut self) {
        let radius = self.viewport.globe_radius;
        self.viewport = GlobeViewport::new(
            radius,
            self.viewport.fit_radius,
            self.viewport.width,
            self.viewport.height,
        );
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Handle mouse drag in terminal cells
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            // Braille gives 2x4 resolution per character
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.viewport.rotate_drag(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
        self.viewport.end_drag();
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Geographic point under the centre of the view
    pub fn center_coords(&self) -> String {
        let (lat, lon) = facing_coordinates(&self.scene, &self.viewport);
        format!(
            "{:.1}°{}, {:.1}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Where the arcs came from, for the status bar
    pub fn source_label(&self) -> &'static str {
        match self.layer.source() {
            RouteSource::Pending => "loading",
            RouteSource::Data => "data",
            RouteSource::Example => "examples",
        }
    }

    pub fn route_count(&self) -> usize {
        self.layer.arcs().len()
    }

    pub fn bird_count(&self) -> usize {
        self.layer.markers().len()
    }

    /// Rows dropped while parsing the current data, if it came from a file
    pub fn skipped_rows(&self) -> Option<usize> {
        self.stats.as_ref().map(ParseStats::skipped)
    }
}
