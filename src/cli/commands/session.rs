//! Scripted interaction sessions.
//!
//! A session loads a graph into a [`Workbench`] and replays a script of
//! user events against it, one step per line. Time only moves on `wait`
//! steps, so animations, drag releases and the resize debounce resolve
//! deterministically.

use anyhow::{Context, Result, anyhow, bail};
use console::{Emoji, style};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

use super::details::resolve_node;
use super::layout::workbench;
use super::query::describe_query;
use super::{load_document, print_header, resolve_source};
use crate::config::WorkbenchConfig;
use crate::export::export_document;
use crate::graph::display_name;
use crate::graph::filter::FilterSource;
use crate::layout::{LayoutKind, Viewport};
use crate::sparql::{LocalStore, QueryExecutor, RendererRegistry};
use crate::view::Workbench;
use crate::view::details::NodeDetails;
use crate::view::drag::UNPIN_DELAY;
use crate::view::page::render_page;
use crate::view::panels::Panel;
use crate::view::zoom::{RESET_DURATION, STEP_DURATION, ZoomTransform};

static STEP: Emoji<'_, '_> = Emoji("▶️  ", "> ");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

/// Width of the divider between split panes.
const SPLIT_HANDLE: f64 = 8.0;
const DEFAULT_SETTLE_TICKS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoomStep {
    In,
    Out,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitAxis {
    Rows,
    Columns,
}

/// One scripted user event.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Layout(LayoutKind),
    Physics { key: String, value: f64 },
    PhysicsReset,
    Tick(usize),
    Frame,
    Settle(usize),
    Wait(Duration),
    Click(Option<String>),
    Navigate(String),
    DragStart(String),
    DragMove { node: String, x: f64, y: f64 },
    DragEnd(String),
    Zoom(ZoomStep),
    Transform(ZoomTransform),
    Key { key: String, in_text_input: bool },
    Toggle(Panel),
    Resize(Viewport),
    Split { axis: SplitAxis, pointer: f64, container: f64 },
    Query(String),
    Filter(PathBuf),
    Restore,
    Status,
    Details,
    Svg(PathBuf),
    Html(PathBuf),
}

fn number(text: &str) -> Result<f64, String> {
    text.parse()
        .map_err(|_| format!("'{text}' is not a number"))
}

fn count(text: &str) -> Result<usize, String> {
    text.parse()
        .map_err(|_| format!("'{text}' is not a count"))
}

fn panel(name: &str) -> Result<Panel, String> {
    match name {
        "legend" => Ok(Panel::Legend),
        "instructions" => Ok(Panel::Instructions),
        "details" => Ok(Panel::NodeDetails),
        "query" => Ok(Panel::Query),
        _ => Err(format!("unknown panel '{name}'")),
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let step = match (word, args.as_slice()) {
            ("layout", [kind]) => Step::Layout(kind.parse()?),
            ("physics", ["reset"]) => Step::PhysicsReset,
            ("physics", [key, value]) => Step::Physics {
                key: key.to_string(),
                value: number(value)?,
            },
            ("tick", []) => Step::Tick(1),
            ("tick", [n]) => Step::Tick(count(n)?),
            ("frame", []) => Step::Frame,
            ("settle", []) => Step::Settle(DEFAULT_SETTLE_TICKS),
            ("settle", [n]) => Step::Settle(count(n)?),
            ("wait", [ms]) => Step::Wait(Duration::from_millis(count(ms)? as u64)),
            ("click", []) => Step::Click(None),
            ("click", [node]) => Step::Click(Some(node.to_string())),
            ("navigate", [node]) => Step::Navigate(node.to_string()),
            ("drag-start", [node]) => Step::DragStart(node.to_string()),
            ("drag-move", [node, x, y]) => Step::DragMove {
                node: node.to_string(),
                x: number(x)?,
                y: number(y)?,
            },
            ("drag-end", [node]) => Step::DragEnd(node.to_string()),
            ("zoom", ["in"]) => Step::Zoom(ZoomStep::In),
            ("zoom", ["out"]) => Step::Zoom(ZoomStep::Out),
            ("zoom", ["reset"]) => Step::Zoom(ZoomStep::Reset),
            ("transform", [k, x, y]) => {
                Step::Transform(ZoomTransform::new(number(k)?, number(x)?, number(y)?))
            }
            ("key", [key]) => Step::Key {
                key: key.to_string(),
                in_text_input: false,
            },
            ("key", [key, "--input"]) => Step::Key {
                key: key.to_string(),
                in_text_input: true,
            },
            ("toggle", [name]) => Step::Toggle(panel(name)?),
            ("resize", [w, h]) => Step::Resize(Viewport::new(number(w)?, number(h)?)),
            ("split", [axis, pointer, container]) => Step::Split {
                axis: match *axis {
                    "rows" => SplitAxis::Rows,
                    "columns" => SplitAxis::Columns,
                    other => return Err(format!("unknown split axis '{other}'")),
                },
                pointer: number(pointer)?,
                container: number(container)?,
            },
            ("query", [_, ..]) => Step::Query(rest.to_string()),
            ("filter", [_, ..]) => Step::Filter(PathBuf::from(rest)),
            ("restore", []) => Step::Restore,
            ("status", []) => Step::Status,
            ("details", []) => Step::Details,
            ("svg", [_, ..]) => Step::Svg(PathBuf::from(rest)),
            ("html", [_, ..]) => Step::Html(PathBuf::from(rest)),
            (
                "layout" | "physics" | "tick" | "frame" | "settle" | "wait" | "click"
                | "navigate" | "drag-start" | "drag-move" | "drag-end" | "zoom" | "transform"
                | "key" | "toggle" | "resize" | "split" | "query" | "filter" | "restore"
                | "status" | "details" | "svg" | "html",
                _,
            ) => return Err(format!("wrong arguments for '{word}'")),
            _ => return Err(format!("unknown step '{word}'")),
        };
        Ok(step)
    }
}

/// Parse a script, skipping blank lines and `#` comments.
fn parse_script(text: &str) -> Result<Vec<(usize, Step)>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            line.parse::<Step>()
                .map(|step| (n, step))
                .map_err(|e| anyhow!("line {n}: {e}"))
        })
        .collect()
}

struct Session {
    bench: Workbench,
    turtle: String,
    label: String,
    store: Option<LocalStore>,
    now: Instant,
}

impl Session {
    fn new(bench: Workbench, turtle: String, label: String) -> Self {
        Self {
            bench,
            turtle,
            label,
            store: None,
            now: Instant::now(),
        }
    }

    fn node(&self, query: &str) -> Result<String> {
        resolve_node(self.bench.graph(), query)
    }

    fn graph_summary(&self, verb: &str) -> String {
        format!(
            "{verb}: showing {} nodes, {} edges",
            self.bench.graph().node_count(),
            self.bench.graph().edge_count()
        )
    }

    async fn apply(&mut self, step: Step) -> Result<String> {
        debug!(?step, "session step");
        let report = match step {
            Step::Layout(kind) => {
                self.bench.change_layout(kind);
                format!(
                    "layout {} (generation {})",
                    kind.display_name(),
                    self.bench.generation()
                )
            }
            Step::Physics { key, value } => {
                if !self.bench.set_physics_param(&key, value) {
                    bail!("Unknown physics parameter '{}'", key);
                }
                let applied = self.bench.physics().get(&key).unwrap_or(value);
                format!("{key} = {applied}")
            }
            Step::PhysicsReset => {
                self.bench.reset_physics();
                "physics reset to defaults".to_string()
            }
            Step::Tick(n) => {
                let moved = (0..n).filter(|_| self.bench.tick()).count();
                format!("{moved} of {n} ticks moved nodes")
            }
            Step::Frame => {
                if self.bench.animation_frame() {
                    format!("redraw {}", self.bench.redraw_count())
                } else {
                    "no redraw pending".to_string()
                }
            }
            Step::Settle(n) => {
                let used = self.bench.settle(n);
                format!("settled after {used} ticks")
            }
            Step::Wait(duration) => {
                self.now += duration;
                self.bench.advance(self.now);
                format!("waited {}ms", duration.as_millis())
            }
            Step::Click(None) => {
                self.bench.click_canvas();
                "selection cleared".to_string()
            }
            Step::Click(Some(node)) => {
                let id = self.node(&node)?;
                let details = self.bench.click_node(&id)?;
                format!("selected {} ({})", details.name, details.kind)
            }
            Step::Navigate(node) => {
                let id = self.node(&node)?;
                let details = self.bench.navigate_to(&id, self.now)?;
                format!("navigating to {}", details.name)
            }
            Step::DragStart(node) => {
                let id = self.node(&node)?;
                self.bench.drag_start(&id)?;
                format!("dragging {}", display_name(&id))
            }
            Step::DragMove { node, x, y } => {
                let id = self.node(&node)?;
                self.bench.drag_move(&id, x, y)?;
                format!("moved {} to ({x}, {y})", display_name(&id))
            }
            Step::DragEnd(node) => {
                let id = self.node(&node)?;
                self.bench.drag_end(&id, self.now);
                format!(
                    "released {}, unpins after {}ms",
                    display_name(&id),
                    UNPIN_DELAY.as_millis()
                )
            }
            Step::Zoom(ZoomStep::In) => {
                self.bench.zoom_in(self.now);
                format!("zooming in over {}ms", STEP_DURATION.as_millis())
            }
            Step::Zoom(ZoomStep::Out) => {
                self.bench.zoom_out(self.now);
                format!("zooming out over {}ms", STEP_DURATION.as_millis())
            }
            Step::Zoom(ZoomStep::Reset) => {
                self.bench.reset_zoom(self.now);
                format!("resetting zoom over {}ms", RESET_DURATION.as_millis())
            }
            Step::Transform(transform) => {
                self.bench.set_transform(transform);
                let t = self.bench.transform();
                format!("transform k={:.2} x={:.1} y={:.1}", t.k, t.x, t.y)
            }
            Step::Key { key, in_text_input } => {
                match self.bench.handle_key(&key, in_text_input, self.now) {
                    Some(shortcut) => format!("{key}: {shortcut}"),
                    None => format!("{key}: ignored"),
                }
            }
            Step::Toggle(panel) => {
                let shown = self.bench.toggle_panel(panel);
                format!("{panel:?} {}", if shown { "shown" } else { "hidden" })
            }
            Step::Resize(viewport) => {
                self.bench.request_resize(viewport, self.now);
                format!("resize to {}x{} pending", viewport.width, viewport.height)
            }
            Step::Split {
                axis,
                pointer,
                container,
            } => {
                let panels = self.bench.panels_mut();
                let moved = match axis {
                    SplitAxis::Rows => panels.resize_rows(pointer, container, SPLIT_HANDLE),
                    SplitAxis::Columns => {
                        panels.resize_columns(pointer, container, SPLIT_HANDLE)
                    }
                };
                match (moved, self.bench.panels().split) {
                    (true, Some(split)) => match axis {
                        SplitAxis::Rows => format!(
                            "rows {} / {}",
                            split.graph_height, split.query_height
                        ),
                        SplitAxis::Columns => format!(
                            "columns {} / {}",
                            split.main_width, split.details_width
                        ),
                    },
                    _ => "split rejected".to_string(),
                }
            }
            Step::Query(query) => self.query(&query).await?,
            Step::Filter(path) => {
                let turtle = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                self.bench
                    .apply_filter(
                        &turtle,
                        FilterSource::Custom,
                        Some(path.display().to_string()),
                    )
                    .with_context(|| format!("{} is not valid Turtle", path.display()))?;
                self.graph_summary("filtered")
            }
            Step::Restore => {
                if self.bench.restore() {
                    self.graph_summary("restored")
                } else {
                    "nothing to restore".to_string()
                }
            }
            Step::Status => self.status(),
            Step::Details => match self.bench.selected() {
                Some(id) => NodeDetails::for_node(self.bench.graph(), id)?.to_text(),
                None => "no node selected".to_string(),
            },
            Step::Svg(path) => {
                let svg = self
                    .bench
                    .to_svg()
                    .context("Nothing to draw: the graph is empty")?;
                export_document(&svg, &path)?;
                format!("svg written to {}", path.display())
            }
            Step::Html(path) => {
                let html = render_page(&self.bench, &self.label, None)
                    .context("Nothing to visualize: the graph is empty")?;
                export_document(&html, &path)?;
                format!("page written to {}", path.display())
            }
        };
        Ok(report)
    }

    /// Query the loaded document. Graph results become the displayed filter.
    async fn query(&mut self, query: &str) -> Result<String> {
        let store = match self.store.take() {
            Some(store) => store,
            None => LocalStore::from_turtle(&self.turtle, self.label.clone())
                .with_context(|| format!("Failed to parse {}", self.label))?,
        };
        let result = store.execute(query).await;
        self.store = Some(store);
        let outcome = result.with_context(|| format!("Query against {} failed", self.label))?;

        if let Some(turtle) = outcome.turtle() {
            self.bench
                .apply_filter(turtle, FilterSource::Construct, Some(describe_query(query)))
                .context("Query result is not valid Turtle")?;
            return Ok(self.graph_summary("filtered"));
        }

        let registry = RendererRegistry::with_builtins();
        let Some(renderer) = registry.best_for(&outcome) else {
            bail!("No renderer can display this result");
        };
        let rendered = renderer.render(&outcome)?;
        Ok(format!(
            "{} results\n{}",
            outcome.len(),
            rendered.text.trim_end()
        ))
    }

    fn status(&self) -> String {
        let bench = &self.bench;
        let graph = bench.graph();
        let transform = bench.transform();
        let viewport = bench.viewport();
        let panels = bench.panels();
        let shown = |visible: bool| if visible { "shown" } else { "hidden" };

        let mut text = String::new();
        let _ = writeln!(
            text,
            "layout: {} (generation {}, {})",
            bench.layout().display_name(),
            bench.generation(),
            if bench.simulation_active() { "running" } else { "idle" }
        );
        let _ = writeln!(
            text,
            "graph: {} nodes, {} edges ({})",
            graph.node_count(),
            graph.edge_count(),
            match bench.filter().source() {
                Some(source) => format!("{source} filter"),
                None => "full".to_string(),
            }
        );
        let _ = writeln!(
            text,
            "selected: {}",
            bench.selected().map(display_name).unwrap_or("none")
        );
        let _ = writeln!(
            text,
            "dragging: {}",
            bench.dragging().map(display_name).unwrap_or("none")
        );
        let _ = writeln!(
            text,
            "zoom: k={:.2} x={:.1} y={:.1}",
            transform.k, transform.x, transform.y
        );
        let _ = writeln!(text, "viewport: {}x{}", viewport.width, viewport.height);
        let _ = writeln!(
            text,
            "redraws: {} ({} coalesced)",
            bench.redraw_count(),
            bench.coalesced_redraws()
        );
        let _ = write!(
            text,
            "panels: legend {}, instructions {}, details {}, query {}",
            shown(panels.legend_visible),
            shown(panels.instructions_visible),
            shown(!panels.details_collapsed),
            shown(!panels.query_collapsed)
        );
        text
    }
}

fn read_script(script: Option<&Path>) -> Result<String> {
    match script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display())),
        None => {
            std::io::read_to_string(std::io::stdin()).context("Failed to read script from stdin")
        }
    }
}

pub async fn run(
    data: Option<String>,
    script: Option<PathBuf>,
    layout: Option<LayoutKind>,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<()> {
    print_header("Session");

    let steps = parse_script(&read_script(script.as_deref())?)?;
    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let (turtle, graph) = load_document(&source).await?;

    let mut bench = workbench(&config, layout, width, height);
    bench.load(graph);
    let mut session = Session::new(bench, turtle, source.to_string());

    let total = steps.len();
    for (line, step) in steps {
        let report = session
            .apply(step)
            .await
            .with_context(|| format!("Step on line {} failed", line))?;
        let mut lines = report.lines();
        println!(
            "{}{} {}",
            STEP,
            style(format!("{line:>3}")).dim(),
            lines.next().unwrap_or("")
        );
        for rest in lines {
            println!("       {}", rest);
        }
    }

    println!();
    println!("{}{} steps applied", CHECK, style(total).green().bold());
    println!();

    Ok(())
}
