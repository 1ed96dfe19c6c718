use crate::app::App;
use crate::map::GlobeLayers;
use crate::migration::palette::Rgb;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into globe area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_globe(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .style(Style::default().bg(color(Rgb::BACKGROUND)))
        .title(Span::styled(
            " Bird Migration ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.set_size(inner.width as usize * 2, inner.height as usize * 4);

    let layers = app
        .renderer
        .render(&app.scene, &viewport, inner.width as usize, inner.height as usize);
    frame.render_widget(GlobeWidget { layers }, inner);
}

/// Braille layers with bird arrows drawn over them
struct GlobeWidget {
    layers: GlobeLayers,
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front, one color per layer
        for layer in &self.layers.layers {
            let fg = color(layer.color);
            for row in 0..area.height {
                for col in 0..area.width {
                    if let Some(ch) = layer.canvas.glyph(col as usize, row as usize) {
                        buf[(area.x + col, area.y + row)].set_char(ch).set_fg(fg);
                    }
                }
            }
        }

        for bird in &self.layers.birds {
            if bird.col >= area.width || bird.row >= area.height {
                continue;
            }
            buf[(area.x + bird.col, area.y + bird.row)]
                .set_char(bird.glyph)
                .set_style(Style::default().fg(color(bird.color)).add_modifier(Modifier::BOLD));
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let toggle = |on: bool, label: &'static str| {
        Span::styled(label, Style::default().fg(if on { Color::Green } else { Color::DarkGray }))
    };

    let source_color = match app.source_label() {
        "data" => Color::Green,
        "examples" => Color::Yellow,
        _ => Color::DarkGray,
    };

    let mut spans = vec![
        Span::styled(" Source: ", dim),
        Span::styled(app.source_label(), Style::default().fg(source_color)),
        Span::styled(" | ", dim),
        Span::styled(format!("{} routes", app.route_count()), Style::default().fg(Color::Yellow)),
        Span::styled(", ", dim),
        Span::styled(format!("{} birds", app.bird_count()), Style::default().fg(Color::Yellow)),
    ];
    if let Some(skipped) = app.skipped_rows() {
        spans.push(Span::styled(format!(", {skipped} rows skipped"), dim));
    }
    spans.extend([
        Span::styled(" | ", dim),
        toggle(app.show_grid, "[g]rid "),
        toggle(app.show_coastlines, "[c]oast "),
        Span::styled(format!("({}) ", app.coastlines.label()), Style::default().fg(Color::Magenta)),
        toggle(!app.paused, "[space]spin "),
        Span::styled("| ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | hjkl/drag:rotate +/-:zoom r:reset q:quit", dim),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
