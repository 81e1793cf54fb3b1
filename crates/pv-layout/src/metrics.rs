#![forbid(unsafe_code)]

//! Measured subtrees and the placement pass.
//!
//! A [`Metrics`] value is the bottom-up result for one subtree: its size in
//! grid cells, its start/end attachment points (relative to its own
//! origin), and a body describing what to emit when placed. Placement
//! ([`Metrics::render`]) is a pure function of the tree and an origin.
//!
//! Renderer plugins build their own metrics from the constructors here:
//! [`Metrics::card`] for leaf cards and [`Metrics::composite`] for blocks
//! that arrange measured children.

use pv_core::geometry::{Point, Rect, Size};
use unicode_width::UnicodeWidthStr;

use crate::block::BlockPath;
use crate::config::{Axis, GraphConfig};
use crate::scene::{
    Attachments, ContainerShape, LinkShape, NodePosition, NodeShape, RenderOutput, Shape,
};

/// Cells added around a grouped child: one column each side, a two-row
/// header and a one-row footer.
pub const CONTAINER_INSET: Point = Point::new(1, 2);
/// Total growth of a container over its child.
pub const CONTAINER_GROWTH: Size = Size::new(2, 3);

/// Inspection line shown on a card and used for group labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    pub icon: String,
    pub label: String,
}

impl Feature {
    pub fn new(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
        }
    }

    /// Display columns taken by `"<glyph> <label>"`.
    pub fn width(&self) -> usize {
        2 + self.label.width()
    }
}

/// How a child's attachment flag is derived from its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attach {
    /// Copy the parent's flag for the same edge.
    Inherit,
    /// Always connected by an internal link.
    Linked,
    /// Never connected.
    Open,
}

impl Attach {
    fn resolve(self, parent: bool) -> bool {
        match self {
            Self::Inherit => parent,
            Self::Linked => true,
            Self::Open => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Card {
    path: BlockPath,
    title: String,
    features: Vec<Feature>,
    active: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedChild {
    offset: Point,
    start: Attach,
    end: Attach,
    metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Empty,
    Card(Card),
    Container {
        path: BlockPath,
        label: String,
        active: bool,
        child: Box<Metrics>,
    },
    Composite {
        links: Vec<Vec<Point>>,
        children: Vec<PlacedChild>,
    },
}

/// Size, attachment points, and placement recipe for one subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    size: Size,
    start: Point,
    end: Point,
    body: Body,
}

impl Metrics {
    /// Zero-sized subtree that renders nothing.
    pub fn empty() -> Self {
        Self {
            size: Size::ZERO,
            start: Point::ZERO,
            end: Point::ZERO,
            body: Body::Empty,
        }
    }

    /// Leaf card sized to fit `title` and `features`.
    ///
    /// Text is measured in display columns and converted to cells through
    /// the configured pixel geometry, rounding up.
    pub fn card(
        config: &GraphConfig,
        path: BlockPath,
        title: impl Into<String>,
        features: Vec<Feature>,
        active: bool,
    ) -> Self {
        let title = title.into();
        let g = &config.geometry;
        let frame = 2.0 * (g.padding + g.node_border_width);
        let text_width = features
            .iter()
            .map(Feature::width)
            .fold(title.width(), usize::max);
        let width_px = text_width as f64 + frame;
        let height_px = g.header_height + features.len() as f64 + frame;
        let size = Size::new(
            to_cells(width_px, g.cell_pixel_size).max(2),
            to_cells(height_px, g.cell_pixel_size).max(1),
        );
        let (start, end) = edge_points(config.axis, size);
        Self {
            size,
            start,
            end,
            body: Body::Card(Card {
                path,
                title,
                features,
                active,
            }),
        }
    }

    /// Labeled frame around `child`.
    pub fn container(
        config: &GraphConfig,
        path: BlockPath,
        label: impl Into<String>,
        active: bool,
        child: Metrics,
    ) -> Self {
        let size = child
            .size
            .grow(CONTAINER_GROWTH.width, CONTAINER_GROWTH.height);
        let (start, end) = match config.axis {
            Axis::Vertical => (
                Point::new(child.start.x + CONTAINER_INSET.x, 0),
                Point::new(child.end.x + CONTAINER_INSET.x, size.height),
            ),
            Axis::Horizontal => (
                Point::new(0, child.start.y + CONTAINER_INSET.y),
                Point::new(size.width, child.end.y + CONTAINER_INSET.y),
            ),
        };
        Self {
            size,
            start,
            end,
            body: Body::Container {
                path,
                label: label.into(),
                active,
                child: Box::new(child),
            },
        }
    }

    /// Start an arrangement of measured children.
    pub fn composite(size: Size) -> CompositeBuilder {
        CompositeBuilder {
            size,
            start: Point::ZERO,
            end: Point::ZERO,
            links: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Start attachment point relative to this subtree's origin.
    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    /// End attachment point relative to this subtree's origin.
    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    /// Place this subtree at `origin`.
    pub fn render(&self, origin: Point, attachments: Attachments) -> RenderOutput {
        self.render_with(origin, attachments, &RenderContext::default())
    }

    /// Place this subtree at `origin`, marking the selected node.
    pub fn render_with(
        &self,
        origin: Point,
        attachments: Attachments,
        cx: &RenderContext<'_>,
    ) -> RenderOutput {
        let mut out = RenderOutput::default();
        self.place(origin, attachments, cx, &mut out);
        out
    }

    fn place(
        &self,
        origin: Point,
        attachments: Attachments,
        cx: &RenderContext<'_>,
        out: &mut RenderOutput,
    ) {
        match &self.body {
            Body::Empty => {}
            Body::Card(card) => {
                out.scene.push(Shape::Node(NodeShape {
                    path: card.path.clone(),
                    rect: Rect::from_origin(origin, self.size),
                    title: card.title.clone(),
                    features: card.features.clone(),
                    active: card.active,
                    selected: cx.is_selected(&card.path),
                    attachments,
                }));
                out.nodes.push(NodePosition {
                    path: card.path.clone(),
                    position: origin,
                });
            }
            Body::Container {
                path,
                label,
                active,
                child,
            } => {
                out.scene.push(Shape::Container(ContainerShape {
                    path: path.clone(),
                    rect: Rect::from_origin(origin, self.size),
                    label: label.clone(),
                    active: *active,
                    selected: cx.is_selected(path),
                }));
                out.nodes.push(NodePosition {
                    path: path.clone(),
                    position: origin,
                });
                child.place(origin + CONTAINER_INSET, attachments, cx, out);
            }
            Body::Composite { links, children } => {
                for link in links {
                    out.scene.push(Shape::Link(LinkShape {
                        points: link.iter().map(|p| origin + *p).collect(),
                    }));
                }
                for child in children {
                    let flags = Attachments {
                        start: child.start.resolve(attachments.start),
                        end: child.end.resolve(attachments.end),
                    };
                    child.metrics.place(origin + child.offset, flags, cx, out);
                }
            }
        }
    }
}

/// Builder returned by [`Metrics::composite`].
#[derive(Debug)]
pub struct CompositeBuilder {
    size: Size,
    start: Point,
    end: Point,
    links: Vec<Vec<Point>>,
    children: Vec<PlacedChild>,
}

impl CompositeBuilder {
    /// Set the start and end attachment points.
    #[must_use]
    pub fn attach(mut self, start: Point, end: Point) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Place `metrics` at `offset` from the composite origin.
    #[must_use]
    pub fn child(mut self, offset: Point, start: Attach, end: Attach, metrics: Metrics) -> Self {
        self.children.push(PlacedChild {
            offset,
            start,
            end,
            metrics,
        });
        self
    }

    /// Add a polyline in composite-relative cells. Fewer than two points is ignored.
    #[must_use]
    pub fn link(mut self, points: Vec<Point>) -> Self {
        if points.len() >= 2 {
            self.links.push(points);
        }
        self
    }

    pub fn build(self) -> Metrics {
        Metrics {
            size: self.size,
            start: self.start,
            end: self.end,
            body: Body::Composite {
                links: self.links,
                children: self.children,
            },
        }
    }
}

/// Read-only state consulted while placing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'s> {
    pub selection: Option<&'s BlockPath>,
}

impl RenderContext<'_> {
    fn is_selected(&self, path: &BlockPath) -> bool {
        self.selection == Some(path)
    }
}

/// Attachment points on the edges a flow along `axis` enters and leaves.
pub fn edge_points(axis: Axis, size: Size) -> (Point, Point) {
    match axis {
        Axis::Vertical => (
            Point::new(size.width / 2, 0),
            Point::new(size.width / 2, size.height),
        ),
        Axis::Horizontal => (
            Point::new(0, size.height / 2),
            Point::new(size.width, size.height / 2),
        ),
    }
}

/// Orthogonal route from `from` to `to` that crosses over at main-axis
/// coordinate `bend`. Repeated points are dropped.
pub fn elbow(axis: Axis, from: Point, to: Point, bend: i32) -> Vec<Point> {
    let candidates = [
        from,
        axis.point(bend, axis.cross(from)),
        axis.point(bend, axis.cross(to)),
        to,
    ];
    let mut points: Vec<Point> = Vec::with_capacity(4);
    for p in candidates {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    points
}

fn to_cells(px: f64, cell_pixel_size: f64) -> i32 {
    let cells = (px / cell_pixel_size).ceil();
    if cells.is_finite() && cells > 0.0 {
        cells.min(f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GraphConfig {
        GraphConfig::default()
    }

    #[test]
    fn card_fits_title_and_features() {
        let cfg = config();
        let small = Metrics::card(&cfg, BlockPath::root(), "A", Vec::new(), false);
        // 1 column + 2 border = 3px -> 2 cells; 1 header + 2 border = 3px -> 2 cells.
        assert_eq!(small.size(), Size::new(2, 2));

        let wide = Metrics::card(
            &cfg,
            BlockPath::root(),
            "A",
            vec![Feature::new("clock", "Wait 10 minutes")],
            false,
        );
        // 2 + 15 + 2 = 19px -> 10 cells; 1 + 1 + 2 = 4px -> 2 cells.
        assert_eq!(wide.size(), Size::new(10, 2));
    }

    #[test]
    fn wide_glyphs_count_double() {
        let cfg = config();
        let m = Metrics::card(&cfg, BlockPath::root(), "試験試験", Vec::new(), false);
        // 8 columns + 2 = 10px -> 5 cells.
        assert_eq!(m.size().width, 5);
    }

    #[test]
    fn card_attachment_points_follow_axis() {
        let mut cfg = config();
        let m = Metrics::card(&cfg, BlockPath::root(), "abcdef", Vec::new(), false);
        assert_eq!(m.start(), Point::new(m.size().width / 2, 0));
        assert_eq!(m.end(), Point::new(m.size().width / 2, m.size().height));

        cfg.axis = Axis::Horizontal;
        let m = Metrics::card(&cfg, BlockPath::root(), "abcdef", Vec::new(), false);
        assert_eq!(m.start(), Point::new(0, m.size().height / 2));
        assert_eq!(m.end(), Point::new(m.size().width, m.size().height / 2));
    }

    #[test]
    fn container_grows_and_offsets_child() {
        let cfg = config();
        let child = Metrics::card(&cfg, BlockPath::from([0]), "A", Vec::new(), false);
        let child_size = child.size();
        let m = Metrics::container(&cfg, BlockPath::root(), "group", false, child);
        assert_eq!(m.size(), child_size.grow(2, 3));

        let out = m.render(Point::new(10, 20), Attachments::NONE);
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.nodes[0].path, BlockPath::root());
        assert_eq!(out.nodes[0].position, Point::new(10, 20));
        assert_eq!(out.nodes[1].path, BlockPath::from([0]));
        assert_eq!(out.nodes[1].position, Point::new(11, 22));
        assert!(matches!(out.scene.shapes()[0], Shape::Container(_)));
    }

    #[test]
    fn composite_resolves_child_attachments() {
        let cfg = config();
        let a = Metrics::card(&cfg, BlockPath::from([0]), "A", Vec::new(), false);
        let b = Metrics::card(&cfg, BlockPath::from([1]), "B", Vec::new(), false);
        let m = Metrics::composite(Size::new(2, 5))
            .child(Point::ZERO, Attach::Inherit, Attach::Linked, a)
            .child(Point::new(0, 3), Attach::Linked, Attach::Open, b)
            .link(vec![Point::new(1, 2), Point::new(1, 3)])
            .link(vec![Point::new(9, 9)])
            .build();

        let out = m.render(Point::ZERO, Attachments::BOTH);
        let nodes: Vec<_> = out.scene.nodes().collect();
        assert_eq!(nodes[0].attachments, Attachments::BOTH);
        assert_eq!(
            nodes[1].attachments,
            Attachments {
                start: true,
                end: false
            }
        );
        assert_eq!(
            out.scene
                .shapes()
                .iter()
                .filter(|s| matches!(s, Shape::Link(_)))
                .count(),
            1
        );
    }

    #[test]
    fn selection_marks_only_the_matching_node() {
        let cfg = config();
        let m = Metrics::container(
            &cfg,
            BlockPath::root(),
            "g",
            true,
            Metrics::card(&cfg, BlockPath::from([0]), "A", Vec::new(), false),
        );
        let selected = BlockPath::from([0]);
        let out = m.render_with(
            Point::ZERO,
            Attachments::NONE,
            &RenderContext {
                selection: Some(&selected),
            },
        );
        assert!(out.scene.nodes().all(|n| n.selected));
        assert!(out.scene.containers().all(|c| !c.selected && c.active));
    }

    #[test]
    fn elbow_routes_are_orthogonal() {
        let pts = elbow(Axis::Vertical, Point::new(1, 2), Point::new(4, 6), 4);
        assert_eq!(
            pts,
            vec![
                Point::new(1, 2),
                Point::new(1, 4),
                Point::new(4, 4),
                Point::new(4, 6)
            ]
        );
        let straight = elbow(Axis::Vertical, Point::new(1, 2), Point::new(1, 6), 4);
        assert_eq!(straight, vec![Point::new(1, 2), Point::new(1, 4), Point::new(1, 6)]);
        let fork = elbow(Axis::Horizontal, Point::new(0, 3), Point::new(1, 0), 0);
        assert_eq!(fork, vec![Point::new(0, 3), Point::new(0, 0), Point::new(1, 0)]);
    }

    #[test]
    fn empty_renders_nothing() {
        let out = Metrics::empty().render(Point::new(3, 3), Attachments::BOTH);
        assert!(out.scene.is_empty());
        assert!(out.nodes.is_empty());
    }
}
