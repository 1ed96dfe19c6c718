use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::geo::project;
use crate::map::walk_great_circle;
use crate::migration::palette::Rgb;
use crate::scene::{RenderSurface, SceneObjectKind, Style};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Natural Earth coastline file looked up in the coastline directory
pub const COASTLINE_FILE: &str = "ne_110m_coastline.json";
pub const COASTLINE_COLOR: Rgb = Rgb::from_hex(0x2a9d8f);
pub const COASTLINE_OPACITY: f64 = 0.9;

/// Where the coastlines on the globe came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coastlines {
    /// Lines read from GeoJSON
    GeoJson(usize),
    /// Built-in continent outlines
    Builtin(usize),
}

impl Coastlines {
    pub fn label(&self) -> &'static str {
        match self {
            Coastlines::GeoJson(_) => "110m",
            Coastlines::Builtin(_) => "outline",
        }
    }
}

/// Add coastlines to the globe, preferring `dir/ne_110m_coastline.json` and
/// falling back to rough continent outlines.
pub fn load_coastlines(surface: &mut impl RenderSurface, dir: &Path, radius: f64) -> Coastlines {
    let path = dir.join(COASTLINE_FILE);
    if path.exists() {
        match read_lines(&path) {
            Ok(lines) if !lines.is_empty() => {
                let count = add_lines(surface, &lines, radius);
                info!(path = %path.display(), lines = count, "loaded coastlines");
                return Coastlines::GeoJson(count);
            }
            Ok(_) => warn!(path = %path.display(), "coastline file has no lines"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load coastlines"),
        }
    }
    Coastlines::Builtin(add_lines(surface, &simple_world(), radius))
}

/// Read every line feature from a GeoJSON file
fn read_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    process_geojson_lines(&geojson, |line| lines.push(line));
    Ok(lines)
}

/// Project lon/lat lines onto the globe, following great circles between
/// vertices. Returns the number of lines added.
fn add_lines(surface: &mut impl RenderSurface, lines: &[LineString], radius: f64) -> usize {
    let style = Style::new(COASTLINE_COLOR, 1.0, COASTLINE_OPACITY);
    let mut added = 0;

    for line in lines.iter().filter(|l| l.len() >= 2) {
        let mut points = Vec::with_capacity(line.len() * 2);
        let mut prev = None;
        for &(lon, lat) in line {
            let p = project(lat, lon, radius);
            match prev {
                Some(a) => walk_great_circle(a, p, |q| points.push(q)),
                None => points.push(p),
            }
            prev = Some(p);
        }
        surface.add_polyline(SceneObjectKind::Coastline, points, style);
        added += 1;
    }

    added
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> LineString {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                add_line(to_line(exterior));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Rough continent outlines for when no coastline file is available
fn simple_world() -> Vec<LineString> {
    const NORTH_AMERICA: &[(f64, f64)] = &[
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
        (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
        (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
        (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
        (-65.0, 47.0), (-55.0, 47.0), (-55.0, 52.0), (-64.0, 60.0),
        (-80.0, 63.0), (-95.0, 62.0), (-110.0, 68.0), (-145.0, 70.0),
        (-168.0, 65.0),
    ];
    const SOUTH_AMERICA: &[(f64, f64)] = &[
        (-80.0, 10.0), (-70.0, 5.0), (-50.0, 0.0), (-35.0, -5.0),
        (-38.0, -15.0), (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0),
        (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-72.0, -40.0),
        (-70.0, -20.0), (-80.0, -5.0), (-80.0, 10.0),
    ];
    const EUROPE: &[(f64, f64)] = &[
        (-10.0, 36.0), (0.0, 38.0), (5.0, 43.0), (15.0, 45.0),
        (20.0, 40.0), (25.0, 37.0), (30.0, 40.0), (40.0, 43.0),
        (40.0, 55.0), (30.0, 60.0), (20.0, 70.0), (10.0, 71.0),
        (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0),
        (-10.0, 36.0),
    ];
    const AFRICA: &[(f64, f64)] = &[
        (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
        (10.0, 37.0), (25.0, 32.0), (35.0, 30.0), (42.0, 12.0),
        (50.0, 12.0), (40.0, -5.0), (35.0, -20.0), (30.0, -30.0),
        (20.0, -35.0), (15.0, -30.0), (10.0, -15.0), (10.0, 0.0),
        (-10.0, 5.0), (-17.0, 15.0),
    ];
    const ASIA: &[(f64, f64)] = &[
        (40.0, 43.0), (50.0, 40.0), (60.0, 25.0), (70.0, 20.0),
        (80.0, 8.0), (88.0, 22.0), (95.0, 16.0), (105.0, 10.0),
        (110.0, 20.0), (120.0, 22.0), (125.0, 30.0), (130.0, 35.0),
        (140.0, 40.0), (145.0, 50.0), (135.0, 55.0), (130.0, 43.0),
        (120.0, 40.0), (90.0, 50.0), (60.0, 55.0), (40.0, 43.0),
    ];
    const AUSTRALIA: &[(f64, f64)] = &[
        (115.0, -20.0), (130.0, -12.0), (140.0, -12.0), (145.0, -15.0),
        (153.0, -30.0), (145.0, -38.0), (135.0, -35.0), (125.0, -32.0),
        (115.0, -35.0), (115.0, -20.0),
    ];

    [NORTH_AMERICA, SOUTH_AMERICA, EUROPE, AFRICA, ASIA, AUSTRALIA]
        .iter()
        .map(|outline| outline.to_vec())
        .collect()
}
