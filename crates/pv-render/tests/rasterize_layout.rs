//! Rasterizing real layout passes.

use pv_core::geometry::PixelPoint;
use pv_layout::{GraphConfig, Registry, layout};
use pv_render::{Buffer, RasterParams, Theme, rasterize};
use proptest::prelude::*;
use serde_json::json;

fn protocol() -> serde_json::Value {
    json!({
        "namespace": "name", "name": "_", "value": "Prep",
        "child": {
            "namespace": "sequence", "name": "_",
            "children": [
                { "namespace": "segment", "name": "_", "label": "Alpha" },
                { "namespace": "segment", "name": "_", "label": "Beta" }
            ]
        }
    })
}

fn screen_text(buf: &Buffer) -> String {
    (0..buf.height())
        .map(|y| buf.row_text(y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn titles_and_labels_reach_the_screen() {
    let config = GraphConfig::default();
    let pass = layout(&Registry::with_builtins(), &config, &protocol(), None, None).expect("layout");
    let theme = Theme::monochrome();
    let params = RasterParams {
        offset: PixelPoint::ZERO,
        cell_pixel_size: config.geometry.cell_pixel_size,
        axis: config.axis,
        theme: &theme,
    };
    let mut buf = Buffer::new(40, 30);
    rasterize(&pass.output.scene, &mut buf, &params);
    let text = screen_text(&buf);
    assert!(text.contains("Prep"), "{text}");
    assert!(text.contains("Alpha"), "{text}");
    assert!(text.contains("Beta"), "{text}");
    let alpha_row = text.lines().position(|l| l.contains("Alpha")).expect("alpha");
    let beta_row = text.lines().position(|l| l.contains("Beta")).expect("beta");
    assert!(alpha_row < beta_row);
}

#[test]
fn panning_moves_content_left() {
    let config = GraphConfig::default();
    let pass = layout(&Registry::with_builtins(), &config, &protocol(), None, None).expect("layout");
    let theme = Theme::monochrome();
    let column = |offset: PixelPoint| {
        let mut buf = Buffer::new(40, 30);
        let params = RasterParams {
            offset,
            cell_pixel_size: config.geometry.cell_pixel_size,
            axis: config.axis,
            theme: &theme,
        };
        rasterize(&pass.output.scene, &mut buf, &params);
        screen_text(&buf)
            .lines()
            .find_map(|l| l.find("Alpha").map(|byte| l[..byte].chars().count()))
            .expect("alpha visible")
    };
    assert_eq!(column(PixelPoint::ZERO), column(PixelPoint::new(2.0, 0.0)) + 2);
}

proptest! {
    #[test]
    fn any_offset_is_safe(x in -500.0f64..500.0, y in -500.0f64..500.0, w in 1u16..60, h in 1u16..40) {
        let config = GraphConfig::default();
        let pass = layout(&Registry::with_builtins(), &config, &protocol(), None, None).expect("layout");
        let theme = Theme::dark();
        let params = RasterParams {
            offset: PixelPoint::new(x, y),
            cell_pixel_size: config.geometry.cell_pixel_size,
            axis: config.axis,
            theme: &theme,
        };
        let mut buf = Buffer::new(w, h);
        rasterize(&pass.output.scene, &mut buf, &params);
        prop_assert_eq!(buf.cells().len(), usize::from(w) * usize::from(h));
    }
}
