use std::collections::BTreeMap;

use crate::app::App;
use crate::braille::BrailleCanvas;
use graticule::geo::{surface_point, walk_great_circle, LatLon, Position, EARTH_RADIUS};
use graticule::grid::Color as GridColor;
use graticule::shapes::{PathType, Shape};
use graticule::view::FrameView;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Projected coordinates beyond this many pixels are treated as unusable.
const MAX_SCREEN: f64 = 1.0e5;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

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

fn to_tui(c: GridColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Projects geographic paths onto the braille pixel grid.
struct Projector {
    view: FrameView,
    /// Longest path step before densifying, degrees
    step: f64,
}

impl Projector {
    fn new(app: &App) -> Self {
        let view = FrameView::new(&app.camera, app.globe.radius);
        let step = (app.camera.altitude / EARTH_RADIUS).to_degrees().clamp(0.0005, 4.0) / 8.0;
        Self { view, step }
    }

    /// Screen pixel of a surface point, `None` when hidden.
    fn pixel(&self, p: LatLon) -> Option<(i32, i32)> {
        let point = surface_point(p.lat, p.lon, 0.0, self.view.radius);
        if self.view.is_occluded(point) {
            return None;
        }
        let (x, y) = self.view.project(point)?;
        if x.abs() > MAX_SCREEN || y.abs() > MAX_SCREEN {
            return None;
        }
        Some((x.round() as i32, y.round() as i32))
    }

    fn densify(&self, positions: &[LatLon], path_type: PathType) -> Vec<LatLon> {
        let Some(&first) = positions.first() else {
            return Vec::new();
        };
        let mut out = vec![first];
        for pair in positions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match path_type {
                PathType::GreatCircle => walk_great_circle(a, b, self.step, |p| out.push(p)),
                PathType::Linear => {
                    let span = (b.lat - a.lat).abs().max((b.lon - a.lon).abs());
                    let steps = ((span / self.step).ceil() as usize).max(1);
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        out.push(LatLon::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t));
                    }
                }
            }
        }
        out
    }

    fn draw(&self, canvas: &mut BrailleCanvas, positions: &[LatLon], path_type: PathType) {
        let mut last = None;
        for p in self.densify(positions, path_type) {
            let here = self.pixel(p);
            if let (Some(a), Some(b)) = (last, here) {
                canvas.line(a, b);
            }
            last = here;
        }
    }
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} graticule ", app.layer.name()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let projector = Projector::new(app);
    let (w, h) = (inner.width as usize, inner.height as usize);

    let mut coastlines = BrailleCanvas::new(w, h);
    if app.show_coastlines {
        for line in &app.coastlines {
            projector.draw(&mut coastlines, line, PathType::GreatCircle);
        }
    }

    // One canvas per line color, drawn in first-seen order
    let mut layers: Vec<(GridColor, BrailleCanvas)> = Vec::new();
    let mut by_color: BTreeMap<(u8, u8, u8), usize> = BTreeMap::new();
    let mut labels = Vec::new();
    for &(handle, color) in &app.drawn {
        match app.store.get(handle) {
            Some(Shape::Line { positions, path_type }) => {
                let idx = *by_color.entry((color.r, color.g, color.b)).or_insert_with(|| {
                    layers.push((color, BrailleCanvas::new(w, h)));
                    layers.len() - 1
                });
                let line: Vec<LatLon> = positions.iter().map(Position::latlon).collect();
                projector.draw(&mut layers[idx].1, &line, *path_type);
            }
            Some(Shape::Text { position, text, .. }) => {
                if let Some((x, y)) = projector.pixel(position.latlon()) {
                    if x >= 0 && y >= 0 {
                        labels.push(((x / 2) as u16, (y / 4) as u16, text.clone(), color));
                    }
                }
            }
            None => {}
        }
    }

    frame.render_widget(
        GlobeWidget {
            coastlines,
            layers,
            labels,
        },
        inner,
    );
}

/// Braille line layers with text labels overlaid
struct GlobeWidget {
    coastlines: BrailleCanvas,
    layers: Vec<(GridColor, BrailleCanvas)>,
    labels: Vec<(u16, u16, String, GridColor)>,
}

impl GlobeWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (col, row, glyph) in canvas.glyphs() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            buf[(area.x + col as u16, area.y + row as u16)].set_char(glyph).set_fg(color);
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.coastlines, Color::DarkGray, area, buf);
        for (color, canvas) in &self.layers {
            Self::render_layer(canvas, to_tui(*color), area, buf);
        }

        for (lx, ly, text, color) in &self.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let style = Style::default().fg(to_tui(*color)).add_modifier(Modifier::BOLD);
            let max_len = area.width.saturating_sub(*lx) as usize;
            for (i, ch) in text.chars().take(max_len.min(16)).enumerate() {
                buf[(area.x + lx + i as u16, area.y + ly)].set_char(ch).set_style(style);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let status = Line::from(vec![
        Span::styled(" Alt: ", dim),
        Span::styled(app.altitude_text(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" hdg {:.0}° tilt {:.0}°", app.camera.heading, app.camera.tilt),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(" | ", dim),
        Span::styled(format!("{:?}", app.angle_format).to_uppercase(), Style::default().fg(Color::Green)),
        Span::styled(format!(" {} shapes", app.drawn.len()), dim),
        Span::styled(
            " | 1-5:grid a:format hjkl:pan +/-:zoom </>:rotate t/g:tilt c:coast e:export r:reset q:quit",
            dim,
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
