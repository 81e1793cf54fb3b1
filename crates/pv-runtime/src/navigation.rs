#![forbid(unsafe_code)]

//! Directional selection over the last rendered node positions.
//!
//! The index maps each rendered [`BlockPath`] to its grid position. Moving
//! from a known node keeps only candidates strictly on the requested side
//! and takes the nearest by squared distance. With no known node, `Down`
//! picks the node closest to the grid origin and `Up` the farthest; `Left`
//! and `Right` pick nothing.
//!
//! Ties go to the lexicographically smallest path, which is the iteration
//! order of the index.

use std::collections::BTreeMap;

use pv_core::geometry::Point;
use pv_core::event::KeyCode;
use pv_layout::{BlockPath, NodePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Arrow key to direction.
    #[must_use]
    pub const fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            _ => None,
        }
    }

    /// Whether `candidate` lies strictly on this side of `origin`.
    #[must_use]
    pub const fn admits(self, origin: Point, candidate: Point) -> bool {
        match self {
            Self::Up => candidate.y < origin.y,
            Self::Down => candidate.y > origin.y,
            Self::Left => candidate.x < origin.x,
            Self::Right => candidate.x > origin.x,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationIndex {
    positions: BTreeMap<BlockPath, Point>,
}

impl NavigationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a placement pass. A repeated path keeps its first position.
    #[must_use]
    pub fn from_nodes(nodes: &[NodePosition]) -> Self {
        let mut index = Self::new();
        index.rebuild(nodes);
        index
    }

    /// Replace every entry with `nodes`.
    pub fn rebuild(&mut self, nodes: &[NodePosition]) {
        self.positions.clear();
        for node in nodes {
            self.positions
                .entry(node.path.clone())
                .or_insert(node.position);
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    #[must_use]
    pub fn position(&self, path: &BlockPath) -> Option<Point> {
        self.positions.get(path).copied()
    }

    #[must_use]
    pub fn contains(&self, path: &BlockPath) -> bool {
        self.positions.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockPath, Point)> {
        self.positions.iter().map(|(path, pos)| (path, *pos))
    }

    /// Next selection when moving `direction` from `current`.
    ///
    /// A `current` path missing from the index counts as nothing selected.
    #[must_use]
    pub fn select_adjacent(
        &self,
        current: Option<&BlockPath>,
        direction: Direction,
    ) -> Option<BlockPath> {
        let origin = current.and_then(|path| self.position(path));
        let candidates = self
            .positions
            .iter()
            .filter(|(path, _)| current != Some(*path));

        let mut best: Option<(&BlockPath, i64)> = None;
        match origin {
            Some(origin) => {
                for (path, &pos) in candidates {
                    if !direction.admits(origin, pos) {
                        continue;
                    }
                    let dist = origin.distance_sq(pos);
                    if best.is_none_or(|(_, d)| dist < d) {
                        best = Some((path, dist));
                    }
                }
            }
            None => {
                let farthest = match direction {
                    Direction::Down => false,
                    Direction::Up => true,
                    Direction::Left | Direction::Right => return None,
                };
                for (path, &pos) in candidates {
                    let dist = pos.norm_sq();
                    let better = match best {
                        None => true,
                        Some((_, d)) if farthest => dist > d,
                        Some((_, d)) => dist < d,
                    };
                    if better {
                        best = Some((path, dist));
                    }
                }
            }
        }
        best.map(|(path, _)| path.clone())
    }
}
