mod geometry;
mod globe;
mod renderer;

pub use globe::{walk_great_circle, GlobeViewport};
pub use renderer::{add_graticule, facing_coordinates, BirdGlyph, GlobeLayers, GlobeRenderer, Layer};
