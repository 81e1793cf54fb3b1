#![forbid(unsafe_code)]

//! Terminal session and event loop for the viewer.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use pv_core::event::{Event, Modifiers};
use pv_core::geometry::Rect;
use pv_layout::{GraphConfig, LayoutError, LayoutPass, Registry};
use pv_render::presenter::Presenter;
use pv_render::{BorderChars, Buffer, Draw, Style, StyleFlags, Theme};
use pv_runtime::{Every, GraphView, SelectOptions, Subscription, TerminalEvents, ViewConfig};
use serde_json::{Value, json};

use crate::cli::Opts;

/// Protocol shown when no file is given.
pub const SAMPLE_PROTOCOL: &str = include_str!("../data/sample.json");

const INPUT_POLL: Duration = Duration::from_millis(50);
const TICK_INTERVAL: Duration = Duration::from_millis(33);
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Raw mode plus alternate screen, restored on drop.
pub struct TerminalGuard {
    mouse: bool,
}

impl TerminalGuard {
    pub fn enter(mouse: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        if mouse {
            execute!(out, EnableMouseCapture)?;
        }
        Ok(Self { mouse })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.mouse {
            let _ = execute!(out, DisableMouseCapture);
        }
        let _ = execute!(out, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = out.flush();
    }
}

/// Read and parse a JSON document.
pub fn load_json(path: &Path) -> io::Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[derive(Debug, Default)]
struct Status {
    selected: Option<String>,
    inspector: bool,
}

/// Loop control returned by [`Viewer::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The graph view plus the chrome around it.
pub struct Viewer {
    view: GraphView,
    theme: Theme,
    status: Rc<RefCell<Status>>,
    screen: (u16, u16),
}

/// Layout settings from the environment, with the command-line axis applied.
fn graph_config(opts: &Opts) -> GraphConfig {
    let graph = GraphConfig::from_env_with(|key| std::env::var(key).ok());
    for err in &graph.errors {
        tracing::warn!(%err, "ignoring layout setting");
    }
    let mut config = graph.config;
    if let Some(axis) = opts.axis {
        config.axis = axis;
    }
    config
}

/// Protocol (or the bundled sample) and optional execution location.
fn load_documents(opts: &Opts) -> io::Result<(Value, Option<Value>)> {
    let protocol = match &opts.protocol {
        Some(path) => load_json(path)?,
        None => serde_json::from_str(SAMPLE_PROTOCOL)?,
    };
    let location = opts.location.as_deref().map(load_json).transpose()?;
    Ok((protocol, location))
}

/// One JSON object per placed node: `{"path":[..],"x":..,"y":..}`.
#[must_use]
pub fn node_report(pass: &LayoutPass) -> Vec<Value> {
    pass.output
        .nodes
        .iter()
        .map(|node| {
            json!({
                "path": node.path,
                "x": node.position.x,
                "y": node.position.y,
            })
        })
        .collect()
}

/// Lay the documents out once and write the node report as JSON lines.
pub fn dump_nodes(opts: &Opts, out: &mut impl Write) -> io::Result<()> {
    let (protocol, location) = load_documents(opts)?;
    let pass = pv_layout::layout(
        &Registry::with_builtins(),
        &graph_config(opts),
        &protocol,
        location.as_ref(),
        None,
    )
    .map_err(io::Error::other)?;
    for line in node_report(&pass) {
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }
    out.flush()
}

impl Viewer {
    pub fn new(opts: &Opts) -> Self {
        let view_parse = ViewConfig::from_env_with(|key| std::env::var(key).ok());
        for err in &view_parse.errors {
            tracing::warn!(%err, "ignoring view setting");
        }
        let config = graph_config(opts);

        let status = Rc::new(RefCell::new(Status::default()));
        let sink = Rc::clone(&status);
        let view = GraphView::new(Registry::with_builtins(), config, view_parse.config)
            .with_on_select(move |path, options: SelectOptions| {
                let mut status = sink.borrow_mut();
                status.selected = path.map(ToString::to_string);
                status.inspector = options.show_inspector;
            });
        let theme = if opts.monochrome {
            Theme::monochrome()
        } else {
            Theme::dark()
        };
        Self {
            view,
            theme,
            status,
            screen: (0, 0),
        }
    }

    #[must_use]
    pub fn view(&self) -> &GraphView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut GraphView {
        &mut self.view
    }

    /// Route one event. The bottom row is kept for the status line.
    pub fn handle(&mut self, event: &Event, now: Instant) -> Flow {
        match event {
            Event::Key(key)
                if key.is_press()
                    && (key.is_char('q')
                        || (key.is_char('c') && key.modifiers.contains(Modifiers::CTRL))) =>
            {
                return Flow::Quit;
            }
            Event::Resize { width, height } => {
                self.screen = (*width, *height);
                let graph_rows = height.saturating_sub(1);
                self.view.handle_resize_at(*width, graph_rows, now);
            }
            other => {
                self.view.handle_event_at(other, now);
            }
        }
        Flow::Continue
    }

    /// Paint the whole screen into `buf`.
    pub fn draw(&self, buf: &mut Buffer) {
        self.view.render(buf, &self.theme);
        if let Some(err) = self.view.last_error() {
            draw_error_panel(buf, err, &self.theme);
        }
        self.draw_status(buf);
    }

    fn draw_status(&self, buf: &mut Buffer) {
        let y = i32::from(buf.height()) - 1;
        let width = i32::from(buf.width());
        let style = Style::new().attrs(StyleFlags::REVERSE);
        buf.draw_horizontal_line(0, y, width, pv_render::Cell::from_char(' ').with_style(style));

        let status = self.status.borrow();
        let selected = status.selected.as_deref().unwrap_or("none");
        let nodes = self.view.navigation().len();
        let offset = self.view.viewport().offset();
        let mut text = format!(
            " {nodes} nodes | selected {selected} | offset {:.0},{:.0}",
            offset.x, offset.y
        );
        if status.inspector {
            text.push_str(" | inspector");
        }
        if self.view.viewport().is_animating() {
            text.push_str(" | ...");
        }
        buf.print_text_clipped(0, y, &text, style, width);
    }
}

fn draw_error_panel(buf: &mut Buffer, err: &LayoutError, theme: &Theme) {
    let width = (i32::from(buf.width()) - 4).clamp(10, 72);
    let height = 5;
    let x = (i32::from(buf.width()) - width) / 2;
    let y = ((i32::from(buf.height()) - 1 - height) / 2).max(0);
    let panel = Rect::new(x, y, width, height);
    buf.draw_box(panel, BorderChars::HEAVY, theme.active, Style::new());
    let max_x = panel.right() - 2;
    buf.print_text_clipped(x + 2, y + 1, "Layout failed", theme.title, max_x);
    buf.print_text_clipped(x + 2, y + 2, &err.to_string(), theme.feature, max_x);
    buf.print_text_clipped(
        x + 2,
        y + 3,
        &format!("at {}", err.path()),
        theme.feature,
        max_x,
    );
}

/// Run the viewer until the user quits.
pub fn run(opts: &Opts) -> io::Result<()> {
    let (protocol, location) = load_documents(opts)?;

    let mut viewer = Viewer::new(opts);
    let (cols, rows) = terminal::size()?;
    let now = Instant::now();
    viewer.handle(&Event::Resize { width: cols, height: rows }, now);
    if let Err(err) = viewer.view_mut().set_protocol(protocol) {
        tracing::error!(%err, "protocol failed to lay out");
    }
    if let Err(err) = viewer.view_mut().set_location(location) {
        tracing::error!(%err, "location failed to lay out");
    }

    let _guard = TerminalGuard::enter(opts.mouse)?;
    let mut presenter = Presenter::new(io::stdout());
    let sources: Vec<Box<dyn Subscription<Event>>> = vec![
        Box::new(TerminalEvents::new(INPUT_POLL)),
        Box::new(Every::new(TICK_INTERVAL, || Event::Tick)),
    ];
    viewer.view_mut().subscribe(sources);
    tracing::info!(cols, rows, "viewer started");

    let mut dirty = true;
    loop {
        if dirty {
            let (w, h) = viewer.screen;
            let mut buf = Buffer::new(w, h);
            viewer.draw(&mut buf);
            presenter.present(&buf)?;
            dirty = false;
        }
        for event in viewer.view().next_events(IDLE_WAIT) {
            if viewer.handle(&event, Instant::now()) == Flow::Quit {
                viewer.view_mut().teardown();
                tracing::info!("viewer closed");
                return Ok(());
            }
            dirty |= !matches!(event, Event::Tick) || viewer.view().viewport().is_animating();
        }
        dirty |= viewer.view_mut().tick_at(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pv_core::event::{KeyCode, KeyEvent};
    use pv_layout::BlockPath;

    fn viewer() -> Viewer {
        let mut viewer = Viewer::new(&Opts::default());
        viewer.handle(
            &Event::Resize {
                width: 60,
                height: 30,
            },
            Instant::now(),
        );
        viewer
    }

    #[test]
    fn sample_protocol_lays_out() {
        let mut viewer = viewer();
        let sample: Value = serde_json::from_str(SAMPLE_PROTOCOL).unwrap_or(Value::Null);
        assert!(viewer.view_mut().set_protocol(sample).is_ok());
        assert!(viewer.view().navigation().len() >= 4);
    }

    #[test]
    fn status_row_is_reserved() {
        let viewer = viewer();
        assert_eq!(viewer.view().viewport().size().height, 29.0);
    }

    #[test]
    fn q_quits() {
        let mut viewer = viewer();
        let q = Event::Key(KeyEvent::new(KeyCode::Char('q')));
        assert_eq!(viewer.handle(&q, Instant::now()), Flow::Quit);
        let down = Event::Key(KeyEvent::new(KeyCode::Down));
        assert_eq!(viewer.handle(&down, Instant::now()), Flow::Continue);
    }

    #[test]
    fn selection_shows_in_status_line() {
        let mut viewer = viewer();
        let protocol = json!({
            "namespace": "sequence", "name": "_",
            "children": [{ "namespace": "segment", "name": "_", "label": "Only" }]
        });
        assert!(viewer.view_mut().set_protocol(protocol).is_ok());
        viewer.handle(&Event::Key(KeyEvent::new(KeyCode::Down)), Instant::now());
        let mut buf = Buffer::new(60, 30);
        viewer.draw(&mut buf);
        assert!(buf.row_text(29).contains("selected /0"));
    }

    #[test]
    fn dump_writes_one_json_line_per_node() {
        let mut out = Vec::new();
        assert!(dump_nodes(&Opts::default(), &mut out).is_ok());
        let text = String::from_utf8(out).unwrap_or_default();
        let lines: Vec<Value> = text
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        assert_eq!(lines.len(), text.lines().count());
        assert!(lines.len() >= 4);

        let paths: Vec<BlockPath> = lines
            .iter()
            .filter_map(|line| serde_json::from_value(line["path"].clone()).ok())
            .collect();
        assert_eq!(paths.len(), lines.len());
        assert!(paths.contains(&BlockPath::root()));
        assert!(paths.contains(&BlockPath::from([0, 0])));
        assert_eq!(lines[0]["path"], json!(paths[0].keys()));
    }

    #[test]
    fn layout_errors_get_a_panel() {
        let mut viewer = viewer();
        let _ = viewer
            .view_mut()
            .set_protocol(json!({ "namespace": "alien", "name": "_" }));
        let mut buf = Buffer::new(60, 30);
        viewer.draw(&mut buf);
        let text: String = (0..buf.height()).map(|y| buf.row_text(y)).collect();
        assert!(text.contains("Layout failed"));
        assert!(text.contains("alien"));
    }
}
