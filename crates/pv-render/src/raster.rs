#![forbid(unsafe_code)]

//! Scene rasterizer.
//!
//! Maps grid-cell shapes to terminal columns and rows: a grid point `p`
//! lands at `p * cell_pixel_size - offset`, rounded, with one pixel per
//! terminal cell. Shapes are painted in scene order so containers sit
//! behind their children and links sit behind the nodes they join.

use std::collections::BTreeMap;

use pv_core::geometry::{PixelPoint, Point, Rect};
use pv_layout::scene::{ContainerShape, LinkShape, NodeShape, Scene, Shape};
use pv_layout::Axis;

use crate::buffer::Buffer;
use crate::cell::{Cell, Style};
use crate::drawing::{BorderChars, Draw, sides};
use crate::theme::Theme;

/// Glyph in front of each feature line.
const FEATURE_BULLET: &str = "• ";

/// Viewport placement and styling for one rasterization.
#[derive(Debug, Clone, Copy)]
pub struct RasterParams<'t> {
    /// Pan offset in pixels.
    pub offset: PixelPoint,
    pub cell_pixel_size: f64,
    /// Flow axis, used to place attachment ports.
    pub axis: Axis,
    pub theme: &'t Theme,
}

impl RasterParams<'_> {
    /// Screen position of grid point `p`.
    pub fn to_screen(&self, p: Point) -> Point {
        let px = p.to_pixels(self.cell_pixel_size);
        Point::new(
            round_to_i32(px.x - self.offset.x),
            round_to_i32(px.y - self.offset.y),
        )
    }

    /// Screen rectangle of grid rectangle `r`.
    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let a = self.to_screen(r.origin());
        let b = self.to_screen(Point::new(r.right(), r.bottom()));
        Rect::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    /// Grid point under screen cell (x, y).
    pub fn to_grid(&self, x: i32, y: i32) -> Point {
        let gx = (f64::from(x) + self.offset.x) / self.cell_pixel_size;
        let gy = (f64::from(y) + self.offset.y) / self.cell_pixel_size;
        Point::new(floor_to_i32(gx), floor_to_i32(gy))
    }
}

fn round_to_i32(v: f64) -> i32 {
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

fn floor_to_i32(v: f64) -> i32 {
    v.floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Paint `scene` into `buf`.
pub fn rasterize(scene: &Scene, buf: &mut Buffer, params: &RasterParams<'_>) {
    let span = pv_core::trace_span!("rasterize", shapes = scene.len());
    let _guard = span.enter();
    for shape in scene.shapes() {
        match shape {
            Shape::Container(c) => draw_container(buf, c, params),
            Shape::Link(l) => draw_link(buf, l, params),
            Shape::Node(n) => draw_node(buf, n, params),
        }
    }
}

fn frame_style(theme: &Theme, base: Style, active: bool, selected: bool) -> Style {
    if selected {
        theme.selected
    } else if active {
        theme.active
    } else {
        base
    }
}

fn draw_container(buf: &mut Buffer, c: &ContainerShape, params: &RasterParams<'_>) {
    let rect = params.rect_to_screen(c.rect);
    let theme = params.theme;
    let chars = if c.selected {
        BorderChars::HEAVY
    } else {
        BorderChars::ROUNDED
    };
    buf.draw_border(rect, chars, frame_style(theme, theme.container, c.active, c.selected));
    buf.print_text_clipped(
        rect.x + 2,
        rect.y + 1,
        &c.label,
        theme.container_label,
        rect.right() - 1,
    );
}

fn draw_node(buf: &mut Buffer, n: &NodeShape, params: &RasterParams<'_>) {
    let rect = params.rect_to_screen(n.rect);
    let theme = params.theme;
    let chars = if n.selected {
        BorderChars::HEAVY
    } else {
        BorderChars::ROUNDED
    };
    let border = frame_style(theme, theme.node, n.active, n.selected);
    buf.draw_box(rect, chars, border, Style::new());

    let inner_right = rect.right() - 1;
    let last_row = rect.bottom() - 1;
    buf.print_text_clipped(rect.x + 1, rect.y + 1, &n.title, theme.title, inner_right);
    for (row, feature) in (rect.y + 2..last_row).zip(&n.features) {
        let x = buf.print_text_clipped(rect.x + 1, row, FEATURE_BULLET, theme.feature, inner_right);
        buf.print_text_clipped(x, row, &feature.label, theme.feature, inner_right);
    }

    let grid = n.rect;
    let (start, end) = match params.axis {
        Axis::Vertical => (
            (Point::new(grid.x + grid.width / 2, grid.y), '┴'),
            (Point::new(grid.x + grid.width / 2, grid.bottom()), '┬'),
        ),
        Axis::Horizontal => (
            (Point::new(grid.x, grid.y + grid.height / 2), '┤'),
            (Point::new(grid.right(), grid.y + grid.height / 2), '├'),
        ),
    };
    let mut port = |at: Point, glyph: char, inset: Point| {
        let p = params.to_screen(at) - inset;
        buf.set(p.x, p.y, Cell::from_char(glyph).with_style(border));
    };
    if n.attachments.start {
        port(start.0, start.1, Point::ZERO);
    }
    if n.attachments.end {
        // The far edge in grid units is one column or row past the border.
        let inset = match params.axis {
            Axis::Vertical => Point::new(0, 1),
            Axis::Horizontal => Point::new(1, 0),
        };
        port(end.0, end.1, inset);
    }
}

/// Line runs are clipped to the buffer before any cell is visited.
fn draw_link(buf: &mut Buffer, l: &LinkShape, params: &RasterParams<'_>) {
    let width = i64::from(buf.width());
    let height = i64::from(buf.height());
    let points: Vec<Point> = l.points.iter().map(|p| params.to_screen(*p)).collect();
    let mut masks: BTreeMap<Point, u8> = BTreeMap::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (forward, backward) = if a.x == b.x {
            if b.y >= a.y {
                (sides::DOWN, sides::UP)
            } else {
                (sides::UP, sides::DOWN)
            }
        } else if a.y == b.y {
            if b.x >= a.x {
                (sides::RIGHT, sides::LEFT)
            } else {
                (sides::LEFT, sides::RIGHT)
            }
        } else {
            continue;
        };
        // (fixed coordinate, its limit, run start, run end, run limit)
        let (fixed, fixed_limit, from, to, limit) = if a.x == b.x {
            (i64::from(a.x), width, i64::from(a.y), i64::from(b.y), height)
        } else {
            (i64::from(a.y), height, i64::from(a.x), i64::from(b.x), width)
        };
        if fixed < 0 || fixed >= fixed_limit {
            continue;
        }
        let lo = from.min(to).max(0);
        let hi = from.max(to).min(limit - 1);
        let len = (to - from).abs();
        for c in lo..=hi {
            let i = (c - from).abs();
            let mut mask = 0;
            if i > 0 {
                mask |= backward;
            }
            if i < len {
                mask |= forward;
            }
            let (x, y) = if a.x == b.x { (fixed, c) } else { (c, fixed) };
            let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
                continue;
            };
            *masks.entry(Point::new(x, y)).or_default() |= mask;
        }
    }
    for (p, mask) in masks {
        if mask != 0 {
            buf.join_line(p.x, p.y, mask, params.theme.link);
        }
    }
}
