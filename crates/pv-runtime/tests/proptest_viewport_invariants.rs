//! Property-based invariants for the scroll range.
//!
//! 1. `min <= max` on both axes for any content and viewport.
//! 2. Any sequence of pans leaves the offset inside the range.
//! 3. A reveal slide never leaves the range while it runs.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use pv_core::geometry::{PixelSize, Point, Rect, Sides, Size};
use pv_runtime::{Boundaries, Viewport};

fn boundaries_strategy() -> impl Strategy<Value = (Boundaries, PixelSize)> {
    (
        (-200i32..200, -200i32..200),
        (0i32..500, 0i32..500),
        (0i32..5, 0i32..5, 0i32..5, 0i32..5),
        0.5f64..8.0,
        (0.0f64..2000.0, 0.0f64..2000.0),
    )
        .prop_map(|((ox, oy), (w, h), (t, r, b, l), cell, (vw, vh))| {
            let viewport = PixelSize::new(vw, vh);
            let bounds = Boundaries::compute(
                Point::new(ox, oy),
                Size::new(w, h),
                Sides::new(t, r, b, l),
                cell,
                viewport,
            );
            (bounds, viewport)
        })
}

proptest! {
    #[test]
    fn min_never_exceeds_max((bounds, _) in boundaries_strategy()) {
        prop_assert!(bounds.min.x <= bounds.max.x);
        prop_assert!(bounds.min.y <= bounds.max.y);
    }

    #[test]
    fn pans_stay_in_range(
        (bounds, size) in boundaries_strategy(),
        deltas in prop::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..20),
    ) {
        let mut vp = Viewport::new(2.0);
        vp.set_size(size);
        vp.set_boundaries(bounds);
        for (dx, dy) in deltas {
            vp.pan(dx, dy);
            prop_assert!(bounds.contains(vp.offset()), "offset {:?} outside {:?}", vp.offset(), bounds);
        }
    }

    #[test]
    fn reveal_slide_stays_in_range(
        (bounds, size) in boundaries_strategy(),
        (x, y) in (-300i32..300, -300i32..300),
        steps in 1u64..12,
    ) {
        let mut vp = Viewport::new(2.0);
        vp.set_size(size);
        vp.set_boundaries(bounds);
        let start = Instant::now();
        vp.reveal_at(Rect::new(x, y, 3, 2), Duration::from_millis(120), start);
        for i in 0..=steps {
            vp.tick_at(start + Duration::from_millis(i * 12));
            prop_assert!(bounds.contains(vp.offset()));
        }
        vp.tick_at(start + Duration::from_millis(120));
        prop_assert!(!vp.is_animating());
    }
}
