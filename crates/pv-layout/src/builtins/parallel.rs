#![forbid(unsafe_code)]

//! `parallel`: branches run side by side between a fork and a join rail.
//! A `label` frames the whole arrangement in a container.
//!
//! Execution location: `{ "children": [<location> | null, ...] }`.

use serde_json::Value;

use super::{base_entry, child_list, child_list_locations};
use crate::block::Block;
use crate::builder::MetricsCx;
use crate::config::GraphConfig;
use crate::error::LayoutError;
use crate::metrics::{Attach, Metrics, elbow};
use crate::registry::RendererEntry;

/// Cells reserved along the flow for each rail.
const RAIL: i32 = 1;

pub(super) fn entry() -> RendererEntry {
    RendererEntry {
        compute_metrics: Some(compute_metrics),
        children: Some(child_list),
        child_locations: Some(child_list_locations),
        label: Some(label),
        ..base_entry()
    }
}

fn compute_metrics(cx: &mut MetricsCx<'_, '_>, _block: Block<'_>) -> Result<Metrics, LayoutError> {
    let children = cx.compute_children()?;
    let arranged = arrange(cx.config(), children);
    Ok(match cx.label() {
        Some(label) => Metrics::container(
            cx.config(),
            cx.path().clone(),
            label,
            cx.is_active(),
            arranged,
        ),
        None => arranged,
    })
}

fn label(block: Block<'_>) -> Option<String> {
    block.attr("label").and_then(Value::as_str).map(str::to_string)
}

/// Lay branches out across the flow axis, forked from the start point and
/// joined into the end point.
pub fn arrange(config: &GraphConfig, children: Vec<Metrics>) -> Metrics {
    let axis = config.axis;
    if children.is_empty() {
        return Metrics::empty();
    }

    let main_extent = children
        .iter()
        .map(|m| axis.main_len(m.size()))
        .max()
        .unwrap_or(0);
    let mut offsets = Vec::with_capacity(children.len());
    let mut cross = 0;
    for (i, m) in children.iter().enumerate() {
        if i > 0 {
            cross += config.gap;
        }
        offsets.push(axis.point(RAIL, cross));
        cross += axis.cross_len(m.size());
    }

    let total_main = main_extent + 2 * RAIL;
    let start = axis.point(0, cross / 2);
    let end = axis.point(total_main, cross / 2);
    let mut builder = Metrics::composite(axis.size(total_main, cross)).attach(start, end);
    for (offset, m) in offsets.iter().zip(&children) {
        builder = builder
            .link(elbow(axis, start, *offset + m.start(), 0))
            .link(elbow(axis, *offset + m.end(), end, total_main));
    }
    for (offset, m) in offsets.into_iter().zip(children) {
        builder = builder.child(offset, Attach::Linked, Attach::Linked, m);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockPath;
    use crate::scene::{Attachments, Shape};
    use pv_core::geometry::{Point, Size};

    #[test]
    fn branches_sit_side_by_side() {
        let cfg = GraphConfig::default();
        let a = Metrics::card(&cfg, BlockPath::from([0]), "A", Vec::new(), false);
        let b = Metrics::card(&cfg, BlockPath::from([1]), "B", Vec::new(), false);
        let (aw, bw) = (a.size().width, b.size().width);
        let m = arrange(&cfg, vec![a, b]);
        assert_eq!(m.size(), Size::new(aw + cfg.gap + bw, 2 + 2 * RAIL));

        let out = m.render(Point::ZERO, Attachments::NONE);
        assert_eq!(out.nodes[0].position, Point::new(0, RAIL));
        assert_eq!(out.nodes[1].position, Point::new(aw + cfg.gap, RAIL));
        let links = out
            .scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Link(_)))
            .count();
        assert_eq!(links, 4);
        assert!(out.scene.nodes().all(|n| n.attachments == Attachments::BOTH));
    }
}
