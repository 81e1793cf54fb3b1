#![forbid(unsafe_code)]

//! `segment`: a leaf that runs one process.
//!
//! Payload: `{ "label"?: string, "process": { "namespace": string, ... } }`.
//! Execution location: `{ "mode": <int>, "time": <ms>, ... }`; any non-null
//! location marks the segment as the current step.

use serde_json::{Map, Value};

use super::{base_entry, display_value};
use crate::block::Block;
use crate::builder::MetricsCx;
use crate::error::LayoutError;
use crate::metrics::{Feature, Metrics};
use crate::registry::RendererEntry;

pub(super) fn entry() -> RendererEntry {
    RendererEntry {
        compute_metrics: Some(compute_metrics),
        label: Some(label),
        features: Some(features),
        ..base_entry()
    }
}

fn compute_metrics(cx: &mut MetricsCx<'_, '_>, block: Block<'_>) -> Result<Metrics, LayoutError> {
    let title = label(block)
        .or_else(|| process(block).and_then(|p| p.get("namespace")).map(display_value))
        .unwrap_or_else(|| "Segment".to_string());
    Ok(Metrics::card(
        cx.config(),
        cx.path().clone(),
        title,
        cx.features(),
        cx.is_active(),
    ))
}

fn label(block: Block<'_>) -> Option<String> {
    block.str_attr("label").map(str::to_string)
}

fn process<'a>(block: Block<'a>) -> Option<&'a Map<String, Value>> {
    block.attr("process").and_then(Value::as_object)
}

fn features(block: Block<'_>, location: Option<&Value>) -> Vec<Feature> {
    let mut features = Vec::new();
    if let Some(process) = process(block) {
        let data = match process.get("data") {
            Some(Value::Object(data)) => data,
            _ => process,
        };
        features.extend(
            data.iter()
                .filter(|(key, _)| !matches!(key.as_str(), "namespace" | "name"))
                .map(|(key, value)| {
                    Feature::new("description", format!("{key}: {}", display_value(value)))
                }),
        );
    }
    if let Some(mode) = location.and_then(|loc| loc.get("mode")).and_then(Value::as_u64) {
        let (icon, text) = match mode {
            0 => ("stop", "Halting"),
            1 => ("play_arrow", "Running"),
            2 | 3 => ("pause", "Pausing"),
            4 => ("pause", "Paused"),
            _ => ("help", "Unknown mode"),
        };
        features.push(Feature::new(icon, text));
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn features_list_process_data() {
        let doc = json!({
            "namespace": "segment", "name": "_",
            "process": { "namespace": "timer", "data": { "duration": 600, "unit": "s" } }
        });
        let block = Block::from_value(&doc).expect("block");
        let got: Vec<_> = features(block, None).into_iter().map(|f| f.label).collect();
        assert_eq!(got, vec!["duration: 600".to_string(), "unit: s".to_string()]);
    }

    #[test]
    fn flat_process_skips_tag_fields() {
        let doc = json!({
            "namespace": "segment", "name": "_",
            "process": { "namespace": "say", "name": "_", "message": "hello" }
        });
        let block = Block::from_value(&doc).expect("block");
        let got: Vec<_> = features(block, None).into_iter().map(|f| f.label).collect();
        assert_eq!(got, vec!["message: hello".to_string()]);
    }

    #[test]
    fn live_mode_is_reported() {
        let doc = json!({ "namespace": "segment", "name": "_" });
        let location = json!({ "mode": 4, "time": 1200.0 });
        let block = Block::from_value(&doc).expect("block");
        let got = features(block, Some(&location));
        assert_eq!(got, vec![Feature::new("pause", "Paused")]);
    }
}
