use crate::braille::BrailleCanvas;

/// Screen pixel in braille dot coordinates
pub type Pixel = (i32, i32);

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, from: Pixel, to: Pixel) {
    let (x1, y1) = to;
    let dx = (x1 - from.0).abs();
    let dy = -(y1 - from.1).abs();
    let sx = if from.0 < x1 { 1 } else { -1 };
    let sy = if from.1 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = from;

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a line offset by one dot right and down, for heavy arcs
pub fn draw_thick_line(canvas: &mut BrailleCanvas, from: Pixel, to: Pixel) {
    draw_line(canvas, from, to);
    draw_line(canvas, (from.0 + 1, from.1), (to.0 + 1, to.1));
    draw_line(canvas, (from.0, from.1 + 1), (to.0, to.1 + 1));
}

/// Draw consecutive projected points as connected segments.
///
/// `None` entries (occluded points) break the line. Segments longer than
/// `max_jump` dots or fully off-canvas are skipped.
pub fn draw_polyline(
    canvas: &mut BrailleCanvas,
    points: impl IntoIterator<Item = Option<Pixel>>,
    thick: bool,
    max_jump: i32,
) {
    let width = canvas.pixel_width() as i32;
    let height = canvas.pixel_height() as i32;
    let mut prev: Option<Pixel> = None;

    for point in points {
        if let (Some(a), Some(b)) = (prev, point) {
            let jump = (a.0 - b.0).abs() + (a.1 - b.1).abs();
            let on_canvas = a.0.max(b.0) >= 0
                && a.0.min(b.0) < width
                && a.1.max(b.1) >= 0
                && a.1.min(b.1) < height;
            if jump <= max_jump && on_canvas {
                if thick {
                    draw_thick_line(canvas, a, b);
                } else {
                    draw_line(canvas, a, b);
                }
            }
        }
        prev = point;
    }
}

/// Draw a circle outline using the midpoint algorithm
pub fn draw_ring(canvas: &mut BrailleCanvas, centre: Pixel, radius: i32) {
    let (cx, cy) = centre;
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            canvas.set_pixel_signed(cx + px, cy + py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
