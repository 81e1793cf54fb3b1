#![forbid(unsafe_code)]

//! Positioned output of a placement pass.
//!
//! Shapes are stored in paint order: a container precedes everything placed
//! inside it, and links precede the nodes they join.

use pv_core::geometry::{Point, Rect};

use crate::block::BlockPath;
use crate::metrics::Feature;

/// Whether a node's flow edges are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attachments {
    pub start: bool,
    pub end: bool,
}

impl Attachments {
    pub const NONE: Self = Self {
        start: false,
        end: false,
    };
    pub const BOTH: Self = Self {
        start: true,
        end: true,
    };
}

/// A leaf card.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub path: BlockPath,
    pub rect: Rect,
    pub title: String,
    pub features: Vec<Feature>,
    pub active: bool,
    pub selected: bool,
    pub attachments: Attachments,
}

/// A synthetic grouping frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerShape {
    pub path: BlockPath,
    pub rect: Rect,
    pub label: String,
    pub active: bool,
    pub selected: bool,
}

/// An orthogonal polyline between attachment points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkShape {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Container(ContainerShape),
    Link(LinkShape),
    Node(NodeShape),
}

impl Shape {
    /// Bounding rectangle in grid cells.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Container(c) => c.rect,
            Self::Node(n) => n.rect,
            Self::Link(l) => {
                let mut min = Point::new(i32::MAX, i32::MAX);
                let mut max = Point::new(i32::MIN, i32::MIN);
                for p in &l.points {
                    min = Point::new(min.x.min(p.x), min.y.min(p.y));
                    max = Point::new(max.x.max(p.x), max.y.max(p.y));
                }
                if l.points.is_empty() {
                    Rect::default()
                } else {
                    Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
                }
            }
        }
    }

    /// Path of the block this shape stands for. Links have none.
    pub fn path(&self) -> Option<&BlockPath> {
        match self {
            Self::Container(c) => Some(&c.path),
            Self::Node(n) => Some(&n.path),
            Self::Link(_) => None,
        }
    }
}

/// Ordered shape list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeShape> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn containers(&self) -> impl Iterator<Item = &ContainerShape> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Container(c) => Some(c),
            _ => None,
        })
    }

    /// Topmost node or container under `point` (grid cells).
    pub fn hit_test(&self, point: Point) -> Option<&BlockPath> {
        self.shapes.iter().rev().find_map(|shape| match shape {
            Shape::Node(n) if n.rect.contains(point) => Some(&n.path),
            Shape::Container(c) if c.rect.contains(point) => Some(&c.path),
            _ => None,
        })
    }

    /// Union of every shape's bounds.
    pub fn bounds(&self) -> Rect {
        self.shapes
            .iter()
            .fold(Rect::default(), |acc, s| acc.union(&s.bounds()))
    }
}

/// Grid position of one rendered leaf or group node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePosition {
    pub path: BlockPath,
    pub position: Point,
}

/// Result of [`Metrics::render`](crate::metrics::Metrics::render).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOutput {
    pub scene: Scene,
    pub nodes: Vec<NodePosition>,
}
