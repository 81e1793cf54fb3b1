//! Scenarios driving a whole `GraphView`: resize bursts, keyboard
//! navigation, rendering, and background sources.

use std::time::{Duration, Instant};

use pv_core::event::{Event, KeyCode, KeyEvent};
use pv_core::geometry::{PixelSize, Point};
use pv_layout::{Axis, BlockPath, GraphConfig, NodePosition, Registry};
use pv_render::{Buffer, Theme};
use pv_runtime::{Direction, Every, GraphView, NavigationIndex, Subscription, ViewConfig};
use serde_json::{Value, json};

fn leaf(label: &str) -> Value {
    json!({ "namespace": "segment", "name": "_", "label": label })
}

fn abc() -> Value {
    json!({
        "namespace": "sequence", "name": "_",
        "children": [leaf("A"), leaf("B"), leaf("C")]
    })
}

fn view(axis: Axis) -> GraphView {
    let config = GraphConfig {
        axis,
        ..GraphConfig::default()
    };
    GraphView::new(Registry::with_builtins(), config, ViewConfig::default())
}

#[test]
fn resize_burst_commits_once_with_last_size() {
    let mut view = view(Axis::Vertical);
    let start = Instant::now();
    view.handle_resize_at(40, 12, start);
    assert!(view.set_protocol(abc()).is_ok());
    let committed_before = view.resize_commits();

    let sizes = [(50, 14), (60, 16), (70, 18), (80, 20), (90, 22)];
    for (i, (w, h)) in sizes.into_iter().enumerate() {
        let at = start + Duration::from_millis(40 * i as u64);
        assert!(!view.handle_resize_at(w, h, at));
    }
    assert_eq!(view.viewport().size(), PixelSize::new(40.0, 12.0));

    let last = start + Duration::from_millis(160);
    assert!(!view.tick_at(last + Duration::from_millis(100)));
    assert!(view.tick_at(last + Duration::from_millis(500)));
    assert!(!view.tick_at(last + Duration::from_millis(1500)));

    assert_eq!(view.resize_commits(), committed_before + 1);
    assert_eq!(view.viewport().size(), PixelSize::new(90.0, 22.0));
    assert!(view.frame().is_some());
}

#[test]
fn empty_startup_size_does_not_delay_the_first_frame() {
    let mut view = view(Axis::Vertical);
    let start = Instant::now();
    assert!(!view.handle_resize_at(0, 0, start));
    assert!(view.set_protocol(json!(leaf("A"))).is_ok());
    assert!(view.frame().is_none());

    assert!(view.handle_resize_at(80, 24, start + Duration::from_millis(1)));
    assert!(view.frame().is_some());
    assert!(!view.has_pending_resize());
    assert_eq!(view.resize_commits(), 1);
}

#[test]
fn directional_navigation_cases() {
    let nodes: Vec<NodePosition> = [((0, 0), 0usize), ((0, 2), 1), ((2, 0), 2)]
        .into_iter()
        .map(|((x, y), k)| NodePosition {
            path: BlockPath::from([k]),
            position: Point::new(x, y),
        })
        .collect();
    let index = NavigationIndex::from_nodes(&nodes);
    let origin = BlockPath::from([0]);
    assert_eq!(
        index.select_adjacent(Some(&origin), Direction::Down),
        Some(BlockPath::from([1]))
    );
    assert_eq!(
        index.select_adjacent(Some(&origin), Direction::Right),
        Some(BlockPath::from([2]))
    );

    let far = NavigationIndex::from_nodes(&[
        NodePosition {
            path: BlockPath::from([0]),
            position: Point::new(0, 0),
        },
        NodePosition {
            path: BlockPath::from([1]),
            position: Point::new(0, 5),
        },
    ]);
    assert_eq!(
        far.select_adjacent(None, Direction::Up),
        Some(BlockPath::from([1]))
    );
}

#[test]
fn horizontal_flow_navigates_with_right_arrow() {
    let mut view = view(Axis::Horizontal);
    let now = Instant::now();
    view.handle_resize_at(80, 20, now);
    assert!(view.set_protocol(abc()).is_ok());

    let right = Event::Key(KeyEvent::new(KeyCode::Right));
    // Nothing selected: sideways moves have no starting point.
    view.handle_event_at(&right, now);
    assert!(view.selection().is_none());

    view.handle_event_at(&Event::Key(KeyEvent::new(KeyCode::Down)), now);
    assert_eq!(view.selection(), Some(&BlockPath::from([0])));
    view.handle_event_at(&right, now);
    assert_eq!(view.selection(), Some(&BlockPath::from([1])));
    view.handle_event_at(&right, now);
    assert_eq!(view.selection(), Some(&BlockPath::from([2])));
    view.handle_event_at(&right, now);
    assert_eq!(view.selection(), Some(&BlockPath::from([2])));

    view.handle_event_at(&Event::Key(KeyEvent::new(KeyCode::Escape)), now);
    assert!(view.selection().is_none());
}

#[test]
fn render_shows_every_title() {
    let mut view = view(Axis::Vertical);
    view.handle_resize_at(40, 40, Instant::now());
    assert!(view.set_protocol(abc()).is_ok());
    let mut buf = Buffer::new(40, 40);
    view.render(&mut buf, &Theme::default());
    let text: String = (0..buf.height()).map(|y| buf.row_text(y)).collect();
    for title in ["A", "B", "C"] {
        assert!(text.contains(title), "missing {title} in {text:?}");
    }
}

#[test]
fn errors_leave_a_blank_frame() {
    let mut view = view(Axis::Vertical);
    view.handle_resize_at(40, 12, Instant::now());
    assert!(view.set_protocol(json!({ "namespace": "mystery", "name": "_" })).is_err());
    let mut buf = Buffer::new(40, 12);
    view.render(&mut buf, &Theme::default());
    assert!((0..buf.height()).all(|y| buf.row_text(y).trim().is_empty()));
    assert!(view.last_error().is_some());
}

#[test]
fn background_ticks_reach_the_view_until_teardown() {
    let mut view = view(Axis::Vertical);
    let tick: Box<dyn Subscription<Event>> =
        Box::new(Every::with_id(1, Duration::from_millis(5), || Event::Tick));
    view.subscribe(vec![tick]);
    assert_eq!(view.active_subscriptions(), 1);
    let events = view.next_events(Duration::from_secs(2));
    assert!(events.contains(&Event::Tick));

    view.teardown();
    assert_eq!(view.active_subscriptions(), 0);
    view.teardown();
    assert_eq!(view.active_subscriptions(), 0);
}
