#![forbid(unsafe_code)]

//! `sequence`: children run one after another, stacked along the flow axis.
//!
//! Execution location: `{ "index": <current child>, "child": <location> }`.

use serde_json::Value;

use super::{base_entry, child_list};
use crate::block::Block;
use crate::builder::MetricsCx;
use crate::config::GraphConfig;
use crate::error::LayoutError;
use crate::metrics::{Attach, Metrics, elbow};
use crate::registry::RendererEntry;

pub(super) fn entry() -> RendererEntry {
    RendererEntry {
        compute_metrics: Some(compute_metrics),
        children: Some(child_list),
        child_locations: Some(child_locations),
        ..base_entry()
    }
}

fn compute_metrics(cx: &mut MetricsCx<'_, '_>, _block: Block<'_>) -> Result<Metrics, LayoutError> {
    let children = cx.compute_children()?;
    Ok(arrange(cx.config(), children))
}

fn child_locations<'a>(block: Block<'a>, location: &'a Value) -> Vec<Option<&'a Value>> {
    let count = block
        .attr("children")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let mut locations = vec![None; count];
    let index = location
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok());
    if let Some(slot) = index.and_then(|i| locations.get_mut(i)) {
        *slot = location.get("child");
    }
    locations
}

/// Stack `children` along the flow axis, centered across it, each one's end
/// linked to the next one's start.
pub fn arrange(config: &GraphConfig, children: Vec<Metrics>) -> Metrics {
    let axis = config.axis;
    let gap = config.gap;
    let Some(last) = children.len().checked_sub(1) else {
        return Metrics::empty();
    };

    let cross_extent = children
        .iter()
        .map(|m| axis.cross_len(m.size()))
        .max()
        .unwrap_or(0);
    let mut offsets = Vec::with_capacity(children.len());
    let mut main = 0;
    for (i, m) in children.iter().enumerate() {
        let cross = (cross_extent - axis.cross_len(m.size())) / 2;
        offsets.push(axis.point(main, cross));
        main += axis.main_len(m.size());
        if i != last {
            main += gap;
        }
    }

    let start = offsets[0] + children[0].start();
    let end = offsets[last] + children[last].end();
    let mut builder = Metrics::composite(axis.size(main, cross_extent)).attach(start, end);
    for i in 0..last {
        let from = offsets[i] + children[i].end();
        let to = offsets[i + 1] + children[i + 1].start();
        let bend = (axis.main(from) + axis.main(to)) / 2;
        builder = builder.link(elbow(axis, from, to, bend));
    }
    for (i, (offset, m)) in offsets.into_iter().zip(children).enumerate() {
        let start = if i == 0 { Attach::Inherit } else { Attach::Linked };
        let end = if i == last { Attach::Inherit } else { Attach::Linked };
        builder = builder.child(offset, start, end, m);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockPath;
    use crate::config::Axis;
    use crate::scene::{Attachments, Shape};
    use pv_core::geometry::{Point, Size};

    fn card(cfg: &GraphConfig, key: usize, title: &str) -> Metrics {
        Metrics::card(cfg, BlockPath::from([key]), title, Vec::new(), false)
    }

    #[test]
    fn stacks_vertically_with_gap_and_centering() {
        let cfg = GraphConfig::default();
        let narrow = card(&cfg, 0, "A");
        let wide = card(&cfg, 1, "ABCDEFGH");
        let (nw, ww) = (narrow.size().width, wide.size().width);
        let m = arrange(&cfg, vec![narrow, wide]);
        assert_eq!(m.size(), Size::new(ww, 2 + cfg.gap + 2));

        let out = m.render(Point::ZERO, Attachments::NONE);
        assert_eq!(out.nodes[0].position, Point::new((ww - nw) / 2, 0));
        assert_eq!(out.nodes[1].position, Point::new(0, 2 + cfg.gap));
        let links = out
            .scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Link(_)))
            .count();
        assert_eq!(links, 1);
    }

    #[test]
    fn horizontal_axis_runs_left_to_right() {
        let cfg = GraphConfig {
            axis: Axis::Horizontal,
            ..GraphConfig::default()
        };
        let m = arrange(&cfg, vec![card(&cfg, 0, "A"), card(&cfg, 1, "B")]);
        let out = m.render(Point::ZERO, Attachments::NONE);
        assert!(out.nodes[0].position.x < out.nodes[1].position.x);
        assert_eq!(out.nodes[0].position.y, out.nodes[1].position.y);
    }

    #[test]
    fn inner_edges_are_linked() {
        let cfg = GraphConfig::default();
        let m = arrange(
            &cfg,
            vec![card(&cfg, 0, "A"), card(&cfg, 1, "B"), card(&cfg, 2, "C")],
        );
        let out = m.render(Point::ZERO, Attachments::NONE);
        let flags: Vec<_> = out.scene.nodes().map(|n| n.attachments).collect();
        assert_eq!(flags[0], Attachments { start: false, end: true });
        assert_eq!(flags[1], Attachments::BOTH);
        assert_eq!(flags[2], Attachments { start: true, end: false });
    }

    #[test]
    fn empty_sequence_is_empty() {
        let m = arrange(&GraphConfig::default(), Vec::new());
        assert_eq!(m.size(), Size::ZERO);
    }
}
