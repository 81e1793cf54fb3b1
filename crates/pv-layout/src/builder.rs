#![forbid(unsafe_code)]

//! Bottom-up metrics pass with wrapper grouping.
//!
//! Starting at a block, the builder walks the chain of pass-through wrappers
//! (variants without their own metrics function) by always taking child
//! key `0`. The walk stops at the first block that either measures itself or
//! carries a label while the walked group already has one. If the walked
//! wrappers contributed a label or feature fragments, they collapse into one
//! labeled container around the stopping block; otherwise they vanish and
//! the stopping block is measured directly.
//!
//! The walk is an explicit loop bounded by [`GraphConfig::max_depth`]; the
//! recursion into children carries the same depth budget.

use serde_json::Value;

use crate::block::{Block, BlockPath};
use crate::config::GraphConfig;
use crate::error::LayoutError;
use crate::metrics::{Feature, Metrics};
use crate::registry::{Registry, RendererEntry};

/// Immutable inputs shared by the whole pass.
#[derive(Debug, Clone, Copy)]
pub struct MetricsBuilder<'r> {
    registry: &'r Registry,
    config: &'r GraphConfig,
}

/// Block being measured plus everything the walk learned on the way.
struct Frame<'a> {
    block: Block<'a>,
    path: BlockPath,
    location: Option<&'a Value>,
    ancestors: Vec<Block<'a>>,
    depth: usize,
}

impl<'r> MetricsBuilder<'r> {
    pub fn new(registry: &'r Registry, config: &'r GraphConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &'r GraphConfig {
        self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Measure the tree rooted at `root`.
    pub fn compute_root<'a>(
        &self,
        root: &'a Value,
        location: Option<&'a Value>,
    ) -> Result<Metrics, LayoutError> {
        let path = BlockPath::root();
        let block = Block::from_value(root).map_err(|err| LayoutError::malformed(&path, err))?;
        self.compute_metrics(block, path, &[], location.filter(|v| !v.is_null()), 0)
    }

    /// Measure `block` found at `path` below `ancestors`.
    pub fn compute_metrics<'a>(
        &self,
        block: Block<'a>,
        path: BlockPath,
        ancestors: &[Block<'a>],
        location: Option<&'a Value>,
        depth: usize,
    ) -> Result<Metrics, LayoutError> {
        self.check_depth(&path, depth)?;

        let head_path = path.clone();
        let head_active = location.is_some();
        let mut group: Vec<(Block<'a>, Option<&'a Value>)> = Vec::new();
        let mut group_name: Option<String> = None;
        let mut current = block;
        let mut current_path = path;
        let mut current_location = location;
        let mut current_depth = depth;

        let entry = loop {
            let entry = self.lookup(current, &current_path)?;
            if entry.compute_metrics.is_some() {
                break entry;
            }
            let label = entry.label_of(current);
            if label.is_some() && group_name.is_some() {
                break entry;
            }
            let children = entry
                .children_of(current)
                .map_err(|err| LayoutError::malformed(&current_path, err))?;
            let Some(&child) = children.first() else {
                break entry;
            };
            if child.same_as(&current) {
                return Err(LayoutError::CyclicBlock {
                    path: current_path,
                    depth: current_depth,
                });
            }
            if group_name.is_none() {
                group_name = label;
            }
            let child_location = entry
                .child_locations_of(current, current_location, 1)
                .into_iter()
                .next()
                .flatten();
            group.push((current, current_location));
            current = child;
            current_path = current_path.child(0);
            current_location = child_location.filter(|v| !v.is_null());
            current_depth += 1;
            self.check_depth(&current_path, current_depth)?;
        };

        let fragments: Vec<String> = group
            .iter()
            .filter_map(|(b, loc)| {
                let entry = self.registry.lookup(b.tag())?;
                Some(entry.features_of(*b, *loc))
            })
            .flatten()
            .map(|f| f.label)
            .collect();

        let mut ancestors: Vec<Block<'a>> = ancestors.to_vec();
        ancestors.extend(group.iter().map(|(b, _)| *b));

        if !group.is_empty() && (group_name.is_some() || !fragments.is_empty()) {
            let label = group_name.unwrap_or_else(|| fragments.join(", "));
            pv_core::trace!(path = %head_path, %label, walked = group.len(), "grouped wrappers");
            let child = self.compute_metrics(
                current,
                current_path,
                &ancestors,
                current_location,
                current_depth,
            )?;
            return Ok(Metrics::container(
                self.config,
                head_path,
                label,
                head_active,
                child,
            ));
        }

        let frame = Frame {
            block: current,
            path: current_path,
            location: current_location,
            ancestors,
            depth: current_depth,
        };
        match entry.compute_metrics {
            Some(measure) => {
                let mut cx = MetricsCx::new(*self, entry, frame)?;
                measure(&mut cx, current)
            }
            None => Ok(self.fallback_card(entry, frame)),
        }
    }

    /// Generic card for a stopping block that does not measure itself.
    fn fallback_card(&self, entry: RendererEntry, frame: Frame<'_>) -> Metrics {
        let title = entry
            .label_of(frame.block)
            .unwrap_or_else(|| frame.block.tag().to_string());
        let features = entry.features_of(frame.block, frame.location);
        Metrics::card(
            self.config,
            frame.path,
            title,
            features,
            frame.location.is_some(),
        )
    }

    fn lookup(&self, block: Block<'_>, path: &BlockPath) -> Result<RendererEntry, LayoutError> {
        let tag = block.tag();
        self.registry
            .lookup(tag)
            .copied()
            .ok_or_else(|| LayoutError::UnknownBlockType {
                namespace: tag.namespace.to_string(),
                name: tag.name.to_string(),
                path: path.clone(),
            })
    }

    fn check_depth(&self, path: &BlockPath, depth: usize) -> Result<(), LayoutError> {
        if depth > self.config.max_depth {
            pv_core::warn!(%path, depth, "depth guard tripped");
            return Err(LayoutError::CyclicBlock {
                path: path.clone(),
                depth,
            });
        }
        Ok(())
    }
}

/// Context handed to a variant's own metrics function.
///
/// It exposes the block's resolved children and a
/// [`compute_child`](Self::compute_child) callback that recurses through the
/// builder with the child's path, execution sub-location, and the extended
/// ancestor list.
pub struct MetricsCx<'r, 'a> {
    builder: MetricsBuilder<'r>,
    entry: RendererEntry,
    block: Block<'a>,
    path: BlockPath,
    location: Option<&'a Value>,
    ancestors: Vec<Block<'a>>,
    children: Vec<Block<'a>>,
    child_locations: Vec<Option<&'a Value>>,
    depth: usize,
}

impl<'r, 'a> MetricsCx<'r, 'a> {
    fn new(
        builder: MetricsBuilder<'r>,
        entry: RendererEntry,
        frame: Frame<'a>,
    ) -> Result<Self, LayoutError> {
        let children = entry
            .children_of(frame.block)
            .map_err(|err| LayoutError::malformed(&frame.path, err))?;
        let child_locations = entry
            .child_locations_of(frame.block, frame.location, children.len())
            .into_iter()
            .map(|loc| loc.filter(|v| !v.is_null()))
            .collect();
        let mut ancestors = frame.ancestors;
        ancestors.push(frame.block);
        Ok(Self {
            builder,
            entry,
            block: frame.block,
            path: frame.path,
            location: frame.location,
            ancestors,
            children,
            child_locations,
            depth: frame.depth,
        })
    }

    pub fn config(&self) -> &'r GraphConfig {
        self.builder.config
    }

    /// Path of the block being measured.
    pub fn path(&self) -> &BlockPath {
        &self.path
    }

    /// Execution location of the block being measured, if it is current.
    pub fn location(&self) -> Option<&'a Value> {
        self.location
    }

    pub fn is_active(&self) -> bool {
        self.location.is_some()
    }

    /// Blocks above this one, outermost first, ending with this block.
    pub fn ancestors(&self) -> &[Block<'a>] {
        &self.ancestors
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Label through this block's entry.
    pub fn label(&self) -> Option<String> {
        self.entry.label_of(self.block)
    }

    /// Features through this block's entry, with its location.
    pub fn features(&self) -> Vec<Feature> {
        self.entry.features_of(self.block, self.location)
    }

    /// Measure child `key`.
    pub fn compute_child(&mut self, key: usize) -> Result<Metrics, LayoutError> {
        let Some(&child) = self.children.get(key) else {
            return Err(LayoutError::malformed(
                &self.path,
                format!(
                    "child key {key} out of range ({} children)",
                    self.children.len()
                ),
            ));
        };
        let child_path = self.path.child(key);
        if child.same_as(&self.block) {
            return Err(LayoutError::CyclicBlock {
                path: child_path,
                depth: self.depth + 1,
            });
        }
        let location = self.child_locations.get(key).copied().flatten();
        self.builder
            .compute_metrics(child, child_path, &self.ancestors, location, self.depth + 1)
    }

    /// Measure every child in key order.
    pub fn compute_children(&mut self) -> Result<Vec<Metrics>, LayoutError> {
        (0..self.children.len())
            .map(|key| self.compute_child(key))
            .collect()
    }
}
