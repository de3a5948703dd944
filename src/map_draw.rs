use crate::layer::{self, LayerManager, MapLayer};
use geo::{Geometry, LineString, Polygon};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Context, Line, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Jeju island, used when no layer has geometry yet.
const JEJU_EXTENT: (f64, f64, f64, f64) = (126.14, 33.10, 126.98, 33.60);

/// Labels are skipped above this many outlines.
const MAX_LABELS: usize = 40;

const RAMP: [Color; 5] = [Color::Blue, Color::Cyan, Color::Green, Color::Yellow, Color::Red];

/// Colour for `value` within `range`, low values cold and high values warm.
pub fn ramp(value: f64, range: Option<(f64, f64)>) -> Color {
    let Some((lo, hi)) = range else { return RAMP[0] };
    if hi <= lo {
        return RAMP[RAMP.len() / 2];
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    RAMP[((t * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1)]
}

/// Canvas bounds around every layer, padded a little so outlines don't
/// touch the border.
pub fn bounds(layers: &LayerManager) -> ([f64; 2], [f64; 2]) {
    let (x0, y0, x1, y1) = layers
        .ordered()
        .into_iter()
        .filter_map(|(_, l)| layer::extent(l.shapes()))
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
        .unwrap_or(JEJU_EXTENT);
    let pad_x = ((x1 - x0) * 0.02).max(0.005);
    let pad_y = ((y1 - y0) * 0.02).max(0.005);
    ([x0 - pad_x, x1 + pad_x], [y0 - pad_y, y1 + pad_y])
}

/// Draws a layer registry, bottom layer first.
pub struct MapView<'a> {
    layers: &'a LayerManager,
    highlight: &'a [String],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl<'a> MapView<'a> {
    pub fn new(layers: &'a LayerManager, highlight: &'a [String]) -> Self {
        let (x_bounds, y_bounds) = bounds(layers);
        Self { layers, highlight, x_bounds, y_bounds }
    }

    pub fn render(&self, f: &mut Frame, area: TuiRect, title: &str, border: Color) {
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(title.to_string())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                let ordered = self.layers.ordered();
                for (_, layer) in &ordered {
                    draw_layer(ctx, layer);
                    ctx.layer();
                }
                // highlighted outlines go on top of everything
                for (_, layer) in &ordered {
                    let Some(key) = &layer.style().label_property else { continue };
                    for shape in layer.shapes() {
                        if shape.text(key).is_some_and(|n| self.highlight.iter().any(|h| h == n)) {
                            draw_geometry(ctx, &shape.geometry, Color::Red);
                        }
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

fn draw_layer(ctx: &mut Context, layer: &MapLayer) {
    let style = layer.style();
    let range = layer.value_range();
    for shape in layer.shapes() {
        let color = match &style.value_property {
            Some(prop) => ramp(shape.number(prop).unwrap_or(0.0), range),
            None => style.color,
        };
        draw_geometry(ctx, &shape.geometry, color);
        if let Geometry::Point(p) = &shape.geometry {
            ctx.print(p.x(), p.y(), Span::styled("●", Style::default().fg(color)));
        }
    }
    if let Some(key) = &style.label_property {
        if layer.shapes().len() <= MAX_LABELS {
            for shape in layer.shapes() {
                if let (Some(name), Some((x, y))) = (shape.text(key), shape.anchor()) {
                    ctx.print(x, y, Span::styled(name.to_string(), Style::default().fg(Color::Gray)));
                }
            }
        }
    }
}

fn draw_geometry(ctx: &mut Context, geometry: &Geometry<f64>, color: Color) {
    match geometry {
        Geometry::Point(p) => ctx.draw(&Points { coords: &[(p.x(), p.y())], color }),
        Geometry::MultiPoint(mp) => {
            let coords: Vec<(f64, f64)> = mp.0.iter().map(|p| (p.x(), p.y())).collect();
            ctx.draw(&Points { coords: &coords, color });
        }
        Geometry::LineString(ls) => draw_ring(ctx, ls, color, false),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                draw_ring(ctx, ls, color, false);
            }
        }
        Geometry::Polygon(poly) => draw_polygon(ctx, poly, color),
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                draw_polygon(ctx, poly, color);
            }
        }
        Geometry::Rect(r) => draw_polygon(ctx, &r.to_polygon(), color),
        Geometry::Triangle(t) => draw_polygon(ctx, &t.to_polygon(), color),
        Geometry::Line(l) => ctx.draw(&Line {
            x1: l.start.x,
            y1: l.start.y,
            x2: l.end.x,
            y2: l.end.y,
            color,
        }),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                draw_geometry(ctx, g, color);
            }
        }
    }
}

fn draw_polygon(ctx: &mut Context, poly: &Polygon<f64>, color: Color) {
    draw_ring(ctx, poly.exterior(), color, true);
}

fn draw_ring(ctx: &mut Context, ring: &LineString<f64>, color: Color, closed: bool) {
    for w in ring.0.windows(2) {
        ctx.draw(&Line { x1: w[0].x, y1: w[0].y, x2: w[1].x, y2: w[1].y, color });
    }
    if closed {
        if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last()) {
            if first != last {
                ctx.draw(&Line { x1: last.x, y1: last.y, x2: first.x, y2: first.y, color });
            }
        }
    }
}
