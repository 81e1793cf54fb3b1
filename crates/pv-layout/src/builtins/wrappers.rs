#![forbid(unsafe_code)]

//! Single-child pass-through variants: `repeat`, `name`, `state`.
//!
//! None of these measure themselves, so the builder folds them into the
//! surrounding group. `name` contributes a label, `repeat` contributes
//! feature fragments, and `state` contributes nothing and disappears.

use serde_json::Value;

use super::{base_entry, display_value, single_child, single_child_location};
use crate::block::Block;
use crate::metrics::Feature;
use crate::registry::RendererEntry;

pub(super) fn repeat() -> RendererEntry {
    RendererEntry {
        children: Some(single_child),
        child_locations: Some(single_child_location),
        features: Some(repeat_features),
        ..base_entry()
    }
}

pub(super) fn name() -> RendererEntry {
    RendererEntry {
        children: Some(single_child),
        child_locations: Some(single_child_location),
        label: Some(name_label),
        ..base_entry()
    }
}

pub(super) fn state() -> RendererEntry {
    RendererEntry {
        children: Some(single_child),
        child_locations: Some(single_child_location),
        ..base_entry()
    }
}

fn repeat_features(block: Block<'_>, location: Option<&Value>) -> Vec<Feature> {
    let count = block.attr("count");
    let summary = match count {
        None | Some(Value::Null) => "Repeat forever".to_string(),
        Some(Value::Number(n)) if n.as_u64() == Some(1) => "Repeat once".to_string(),
        Some(Value::Number(n)) if n.as_u64() == Some(2) => "Repeat twice".to_string(),
        Some(other) => format!("Repeat {} times", display_value(other)),
    };
    let mut features = vec![Feature::new("replay", summary)];
    let iteration = location
        .and_then(|loc| loc.get("iteration"))
        .and_then(Value::as_u64);
    if let Some(iteration) = iteration {
        let text = match count.and_then(Value::as_u64) {
            Some(total) => format!("Iteration {} of {total}", iteration + 1),
            None => format!("Iteration {}", iteration + 1),
        };
        features.push(Feature::new("counter", text));
    }
    features
}

fn name_label(block: Block<'_>) -> Option<String> {
    block
        .str_attr("value")
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
