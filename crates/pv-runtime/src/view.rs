#![forbid(unsafe_code)]

//! A mounted, interactive protocol graph.
//!
//! [`GraphView`] owns everything one on-screen graph needs: the protocol
//! document and execution location, the layout result of the last pass, the
//! scroll [`Viewport`], the [`NavigationIndex`], the resize debounce and the
//! background event sources. The host feeds it [`Event`]s and draws it into
//! a [`Buffer`].
//!
//! Layout is rerun synchronously whenever an input changes (document,
//! location, committed size, selection). A failed pass discards the previous
//! frame entirely; [`GraphView::last_error`] keeps the reason so the host can
//! show a fallback panel.

use std::fmt;
use std::time::{Duration, Instant};

use pv_core::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use pv_core::geometry::{PixelSize, Point, Rect};
use pv_layout::{BlockPath, GraphConfig, LayoutError, LayoutPass, Registry, Shape};
use pv_render::{Buffer, RasterParams, Theme, rasterize};
use serde_json::Value;

use crate::config::ViewConfig;
use crate::navigation::{Direction, NavigationIndex};
use crate::resize::{ResizeAction, ResizeDebouncer};
use crate::subscription::{Subscription, SubscriptionManager};
use crate::viewport::{Boundaries, Viewport};

/// Extra requests passed along with a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectOptions {
    /// Open the detail panel for the selected node.
    pub show_inspector: bool,
}

/// Whether the view handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Consumed,
    /// Left for the host.
    Ignored,
}

impl EventOutcome {
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Selection callback.
pub type OnSelect = Box<dyn FnMut(Option<&BlockPath>, SelectOptions)>;

#[derive(Debug, Clone, Copy)]
struct Drag {
    last: (u16, u16),
    moved: bool,
}

pub struct GraphView {
    view_config: ViewConfig,
    graph_config: GraphConfig,
    registry: Registry,
    protocol: Option<Value>,
    location: Option<Value>,
    frame: Option<LayoutPass>,
    last_error: Option<LayoutError>,
    viewport: Viewport,
    debouncer: ResizeDebouncer,
    index: NavigationIndex,
    selection: Option<BlockPath>,
    on_select: Option<OnSelect>,
    subscriptions: SubscriptionManager<Event>,
    drag: Option<Drag>,
    last_clicked: Option<BlockPath>,
    needs_reset: bool,
    torn_down: bool,
}

impl fmt::Debug for GraphView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphView")
            .field("view_config", &self.view_config)
            .field("graph_config", &self.graph_config)
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("nodes", &self.index.len())
            .field("last_error", &self.last_error)
            .field("subscriptions", &self.subscriptions.active_count())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl GraphView {
    #[must_use]
    pub fn new(registry: Registry, graph_config: GraphConfig, view_config: ViewConfig) -> Self {
        Self {
            viewport: Viewport::new(graph_config.geometry.cell_pixel_size),
            debouncer: ResizeDebouncer::new(view_config.resize_debounce()),
            view_config,
            graph_config,
            registry,
            protocol: None,
            location: None,
            frame: None,
            last_error: None,
            index: NavigationIndex::new(),
            selection: None,
            on_select: None,
            subscriptions: SubscriptionManager::new(),
            drag: None,
            last_clicked: None,
            needs_reset: true,
            torn_down: false,
        }
    }

    /// Install the selection callback.
    #[must_use]
    pub fn with_on_select(
        mut self,
        on_select: impl FnMut(Option<&BlockPath>, SelectOptions) + 'static,
    ) -> Self {
        self.on_select = Some(Box::new(on_select));
        self
    }

    pub fn set_on_select(&mut self, on_select: Option<OnSelect>) {
        self.on_select = on_select;
    }

    // --- accessors ---

    #[must_use]
    pub fn view_config(&self) -> &ViewConfig {
        &self.view_config
    }

    #[must_use]
    pub fn graph_config(&self) -> &GraphConfig {
        &self.graph_config
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationIndex {
        &self.index
    }

    #[must_use]
    pub fn selection(&self) -> Option<&BlockPath> {
        self.selection.as_ref()
    }

    /// Result of the last successful pass, if it is still current.
    #[must_use]
    pub fn frame(&self) -> Option<&LayoutPass> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&LayoutError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn has_pending_resize(&self) -> bool {
        self.debouncer.has_pending()
    }

    #[must_use]
    pub fn resize_commits(&self) -> u64 {
        self.debouncer.commit_count()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // --- inputs ---

    /// Replace the protocol document and lay it out.
    pub fn set_protocol(&mut self, protocol: Value) -> Result<(), LayoutError> {
        self.protocol = Some(protocol);
        self.needs_reset = true;
        self.layout().map(|_| ())
    }

    /// Replace the execution location and lay out again.
    pub fn set_location(&mut self, location: Option<Value>) -> Result<(), LayoutError> {
        self.location = location;
        self.layout().map(|_| ())
    }

    /// Run a full layout pass with the current inputs.
    ///
    /// Returns `Ok(None)` while there is nothing to draw: no document yet,
    /// or a viewport without area.
    pub fn layout(&mut self) -> Result<Option<&LayoutPass>, LayoutError> {
        let size = self.viewport.size();
        let Some(protocol) = self.protocol.as_ref().filter(|_| !size.is_empty()) else {
            tracing::trace!("layout deferred");
            self.frame = None;
            self.index.clear();
            return Ok(None);
        };

        let result = pv_layout::layout(
            &self.registry,
            &self.graph_config,
            protocol,
            self.location.as_ref(),
            self.selection.as_ref(),
        );
        match result {
            Ok(pass) => {
                self.index.rebuild(&pass.output.nodes);
                self.viewport.set_boundaries(Boundaries::compute(
                    self.graph_config.origin,
                    pass.content_size,
                    self.view_config.margins,
                    self.graph_config.geometry.cell_pixel_size,
                    size,
                ));
                if self.needs_reset {
                    self.viewport.reset();
                    self.needs_reset = false;
                }
                tracing::debug!(
                    nodes = pass.output.nodes.len(),
                    width = pass.content_size.width,
                    height = pass.content_size.height,
                    "layout pass complete"
                );
                self.last_error = None;
                let frame: &LayoutPass = self.frame.insert(pass);
                Ok(Some(frame))
            }
            Err(err) => {
                tracing::warn!(error = %err, path = %err.path(), "layout pass failed");
                self.frame = None;
                self.index.clear();
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Layout driven by an internal change; failures stay in `last_error`.
    fn relayout(&mut self) {
        let _ = self.layout();
    }

    // --- resize and time ---

    /// Feed a viewport size change. Returns whether a redraw is needed.
    pub fn handle_resize_at(&mut self, width: u16, height: u16, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        let action = self.debouncer.handle_resize_at(width, height, now);
        self.apply_resize(action)
    }

    /// Advance debounce and reveal timers. Returns whether a redraw is needed.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        let action = self.debouncer.tick_at(now);
        let resized = self.apply_resize(action);
        let moved = self.viewport.tick_at(now);
        resized || moved
    }

    /// Time until the next timer wants a tick.
    #[must_use]
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        if self.viewport.is_animating() {
            return Some(Duration::ZERO);
        }
        self.debouncer.time_until_apply(now)
    }

    fn apply_resize(&mut self, action: ResizeAction) -> bool {
        match action {
            ResizeAction::Apply { width, height } => {
                self.viewport
                    .set_size(PixelSize::new(f64::from(width), f64::from(height)));
                self.relayout();
                true
            }
            ResizeAction::Deferred | ResizeAction::None => false,
        }
    }

    // --- viewport ---

    /// Pan by a pixel delta, clamped to the content.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.viewport.pan(dx, dy)
    }

    /// Scroll back to the top-left of the content.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // --- selection ---

    /// Select `path` (or clear with `None`), notify the callback and reveal
    /// the node.
    pub fn select(&mut self, path: Option<BlockPath>, options: SelectOptions, now: Instant) {
        let changed = self.selection != path;
        self.selection = path;
        if changed {
            match &self.selection {
                Some(path) => tracing::debug!(path = %path, "selection changed"),
                None => tracing::debug!("selection cleared"),
            }
        }
        if let Some(on_select) = &mut self.on_select {
            on_select(self.selection.as_ref(), options);
        }
        if changed {
            self.relayout();
        }
        self.reveal_selection(now);
    }

    /// Move the selection one step in `direction`.
    ///
    /// Returns whether a node was selected; with no candidate the selection
    /// is left as it was.
    pub fn select_adjacent(&mut self, direction: Direction, now: Instant) -> bool {
        match self
            .index
            .select_adjacent(self.selection.as_ref(), direction)
        {
            Some(next) => {
                self.select(Some(next), SelectOptions::default(), now);
                true
            }
            None => false,
        }
    }

    fn reveal_selection(&mut self, now: Instant) {
        let Some(rect) = self.selection.as_ref().and_then(|p| self.node_rect(p)) else {
            return;
        };
        self.viewport
            .reveal_at(rect, self.view_config.reveal_duration(), now);
    }

    /// Grid rectangle of the rendered node for `path`.
    #[must_use]
    pub fn node_rect(&self, path: &BlockPath) -> Option<Rect> {
        let from_scene = self.frame.as_ref().and_then(|frame| {
            frame
                .output
                .scene
                .shapes()
                .iter()
                .find_map(|shape| match shape {
                    Shape::Node(n) if &n.path == path => Some(n.rect),
                    Shape::Container(c) if &c.path == path => Some(c.rect),
                    _ => None,
                })
        });
        from_scene.or_else(|| {
            self.index
                .position(path)
                .map(|p| Rect::new(p.x, p.y, 1, 1))
        })
    }

    /// Grid cell under viewport position `(x, y)`.
    #[must_use]
    pub fn screen_to_grid(&self, x: u16, y: u16) -> Point {
        let cell = self.graph_config.geometry.cell_pixel_size;
        let offset = self.viewport.offset();
        let gx = ((f64::from(x) + offset.x) / cell).floor();
        let gy = ((f64::from(y) + offset.y) / cell).floor();
        Point::new(
            gx.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
            gy.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
        )
    }

    // --- events ---

    /// Route one input event.
    pub fn handle_event_at(&mut self, event: &Event, now: Instant) -> EventOutcome {
        if self.torn_down {
            return EventOutcome::Ignored;
        }
        match event {
            Event::Resize { width, height } => {
                self.handle_resize_at(*width, *height, now);
                EventOutcome::Consumed
            }
            Event::Tick => {
                self.tick_at(now);
                EventOutcome::Consumed
            }
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Focus(_) => EventOutcome::Ignored,
        }
    }

    /// [`handle_event_at`](Self::handle_event_at) with the current time.
    pub fn handle_event(&mut self, event: &Event) -> EventOutcome {
        self.handle_event_at(event, Instant::now())
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> EventOutcome {
        if !key.is_press() || !key.is_plain() {
            return EventOutcome::Ignored;
        }
        if let Some(direction) = Direction::from_key(key.code) {
            self.select_adjacent(direction, now);
            return EventOutcome::Consumed;
        }
        match key.code {
            KeyCode::Escape if self.selection.is_some() => {
                self.select(None, SelectOptions::default(), now);
                EventOutcome::Consumed
            }
            KeyCode::Home => {
                self.reset_view();
                EventOutcome::Consumed
            }
            _ => EventOutcome::Ignored,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) -> EventOutcome {
        let step = self.view_config.wheel_step;
        let horizontal = mouse.modifiers.contains(Modifiers::SHIFT);
        let wheel = match mouse.kind {
            MouseEventKind::ScrollUp if horizontal => Some((-step, 0.0)),
            MouseEventKind::ScrollDown if horizontal => Some((step, 0.0)),
            MouseEventKind::ScrollUp => Some((0.0, -step)),
            MouseEventKind::ScrollDown => Some((0.0, step)),
            MouseEventKind::ScrollLeft => Some((-step, 0.0)),
            MouseEventKind::ScrollRight => Some((step, 0.0)),
            _ => None,
        };
        if let Some((dx, dy)) = wheel {
            self.pan(dx, dy);
            return EventOutcome::Consumed;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = Some(Drag {
                    last: mouse.position(),
                    moved: false,
                });
                EventOutcome::Consumed
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (x, y) = mouse.position();
                let last = self.drag.map_or((x, y), |d| d.last);
                let dx = f64::from(x) - f64::from(last.0);
                let dy = f64::from(y) - f64::from(last.1);
                self.pan(-dx, -dy);
                self.drag = Some(Drag {
                    last: (x, y),
                    moved: true,
                });
                EventOutcome::Consumed
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let dragged = self.drag.take().is_some_and(|d| d.moved);
                if !dragged {
                    self.click(mouse.x, mouse.y, now);
                }
                EventOutcome::Consumed
            }
            _ => EventOutcome::Ignored,
        }
    }

    fn click(&mut self, x: u16, y: u16, now: Instant) {
        let grid = self.screen_to_grid(x, y);
        let hit = self
            .frame
            .as_ref()
            .and_then(|frame| frame.output.scene.hit_test(grid))
            .cloned();
        let repeat = hit.is_some() && hit == self.last_clicked && hit == self.selection;
        tracing::trace!(x = grid.x, y = grid.y, hit = ?hit, "click");
        self.last_clicked.clone_from(&hit);
        self.select(
            hit,
            SelectOptions {
                show_inspector: repeat,
            },
            now,
        );
    }

    // --- drawing ---

    /// Paint the current frame. Leaves `buf` blank when there is none.
    pub fn render(&self, buf: &mut Buffer, theme: &Theme) {
        buf.clear();
        let Some(frame) = &self.frame else {
            return;
        };
        let params = RasterParams {
            offset: self.viewport.offset(),
            cell_pixel_size: self.graph_config.geometry.cell_pixel_size,
            axis: self.graph_config.axis,
            theme,
        };
        rasterize(&frame.output.scene, buf, &params);
    }

    // --- background sources ---

    /// Start `subscriptions` as event sources; ids already running are skipped.
    pub fn subscribe(&mut self, subscriptions: Vec<Box<dyn Subscription<Event>>>) {
        if self.torn_down {
            return;
        }
        self.subscriptions.start(subscriptions);
    }

    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.active_count()
    }

    /// Wait up to `timeout` for source events, then take everything queued.
    pub fn next_events(&self, timeout: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(first) = self.subscriptions.recv_timeout(timeout) {
            events.push(first);
            events.extend(self.subscriptions.drain_messages());
        }
        events
    }

    /// Stop every source and cancel pending timers. Safe to call twice.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.subscriptions.stop_all();
        self.debouncer.cancel();
        self.drag = None;
        self.viewport.cancel_reveal();
        tracing::debug!("graph view torn down");
    }
}

impl Drop for GraphView {
    fn drop(&mut self) {
        self.teardown();
    }
}
