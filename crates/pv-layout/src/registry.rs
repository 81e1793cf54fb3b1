#![forbid(unsafe_code)]

//! Renderer registry: per-variant capability tables.
//!
//! Each block variant is described by a [`RendererEntry`], a small struct of
//! optional plain function pointers. Dispatch is a lookup by
//! `(namespace, name)`; there is no shared base behavior beyond what the
//! builder does when a capability is absent.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::block::{Block, ShapeError, TypeTag};
use crate::builder::MetricsCx;
use crate::error::LayoutError;
use crate::metrics::{Feature, Metrics};

/// Own-metrics capability. Present only for variants that lay out their
/// children themselves (or are leaves).
pub type MetricsFn =
    for<'r, 'a> fn(&mut MetricsCx<'r, 'a>, Block<'a>) -> Result<Metrics, LayoutError>;

/// Ordered children of a block.
pub type ChildrenFn = for<'a> fn(Block<'a>) -> Result<Vec<Block<'a>>, ShapeError>;

/// Execution sub-locations of a block's children, aligned by key.
pub type ChildLocationsFn = for<'a> fn(Block<'a>, &'a Value) -> Vec<Option<&'a Value>>;

/// Display label, if the block carries one.
pub type LabelFn = for<'a> fn(Block<'a>) -> Option<String>;

/// Summary lines for inspection and group labels.
pub type FeaturesFn = for<'a> fn(Block<'a>, Option<&'a Value>) -> Vec<Feature>;

/// Capabilities of one block variant. Every member is optional.
#[derive(Clone, Copy, Default)]
pub struct RendererEntry {
    pub compute_metrics: Option<MetricsFn>,
    pub children: Option<ChildrenFn>,
    pub child_locations: Option<ChildLocationsFn>,
    pub label: Option<LabelFn>,
    pub features: Option<FeaturesFn>,
}

impl RendererEntry {
    /// Children through the entry, or none when the capability is absent.
    pub fn children_of<'a>(&self, block: Block<'a>) -> Result<Vec<Block<'a>>, ShapeError> {
        self.children.map_or_else(|| Ok(Vec::new()), |f| f(block))
    }

    /// Child sub-locations padded or truncated to `count`.
    pub fn child_locations_of<'a>(
        &self,
        block: Block<'a>,
        location: Option<&'a Value>,
        count: usize,
    ) -> Vec<Option<&'a Value>> {
        let mut locations = match (self.child_locations, location) {
            (Some(f), Some(loc)) => f(block, loc),
            _ => Vec::new(),
        };
        locations.resize(count, None);
        locations
    }

    pub fn label_of(&self, block: Block<'_>) -> Option<String> {
        self.label.and_then(|f| f(block))
    }

    pub fn features_of<'a>(&self, block: Block<'a>, location: Option<&'a Value>) -> Vec<Feature> {
        self.features.map_or_else(Vec::new, |f| f(block, location))
    }
}

impl fmt::Debug for RendererEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererEntry")
            .field("compute_metrics", &self.compute_metrics.is_some())
            .field("children", &self.children.is_some())
            .field("child_locations", &self.child_locations.is_some())
            .field("label", &self.label.is_some())
            .field("features", &self.features.is_some())
            .finish()
    }
}

/// Map from `(namespace, name)` to [`RendererEntry`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, HashMap<String, RendererEntry>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in variants.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    /// Register `entry`, returning the entry it replaced.
    pub fn register(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        entry: RendererEntry,
    ) -> Option<RendererEntry> {
        self.entries
            .entry(namespace.into())
            .or_default()
            .insert(name.into(), entry)
    }

    pub fn lookup(&self, tag: TypeTag<'_>) -> Option<&RendererEntry> {
        self.entries.get(tag.namespace)?.get(tag.name)
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.lookup(TypeTag { namespace, name }).is_some()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
