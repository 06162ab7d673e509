//! Headless view-state of the workbench.
//!
//! [`Workbench`] owns the displayed graph and every piece of interaction
//! state around it. It is driven by explicit events: simulation `tick`s,
//! `animation_frame`s, `advance(now)` for timers, and input handlers.

pub mod details;
pub mod drag;
pub mod frame;
pub mod page;
pub mod panels;
pub mod scene;
pub mod shortcuts;
pub mod zoom;

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::WorkbenchResult;
use crate::graph::GraphData;
use crate::graph::filter::{FilterSource, GraphFilter};
use crate::layout::{self, LayoutKind, PhysicsConfig, Simulation, Viewport};
use details::NodeDetails;
use drag::DragController;
use frame::FrameScheduler;
use panels::{Panel, PanelState};
use scene::{NodeStyle, Scene};
use shortcuts::Shortcut;
use zoom::{ZOOM_FACTOR, Zoom, ZoomTransform};

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct Workbench {
    graph: GraphData,
    filter: GraphFilter,
    layout: LayoutKind,
    physics: PhysicsConfig,
    viewport: Viewport,
    zoom: Zoom,
    panels: PanelState,
    scene: Option<Scene>,
    simulation: Option<Simulation>,
    generation: u64,
    frames: FrameScheduler,
    drag: DragController,
    selected: Option<String>,
    pending_resize: Option<(Viewport, Instant)>,
}

impl Workbench {
    pub fn new(viewport: Viewport, layout: LayoutKind, physics: PhysicsConfig) -> Self {
        Self {
            graph: GraphData::new(),
            filter: GraphFilter::default(),
            layout,
            physics: physics.clamped(),
            viewport,
            zoom: Zoom::default(),
            panels: PanelState::default(),
            scene: None,
            simulation: None,
            generation: 0,
            frames: FrameScheduler::new(),
            drag: DragController::default(),
            selected: None,
            pending_resize: None,
        }
    }

    /// Install a freshly ingested graph and render it.
    pub fn load(&mut self, graph: GraphData) {
        self.filter = GraphFilter::default();
        self.graph = graph;
        self.selected = None;
        self.drag.reset();
        self.render();
    }

    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_filtered()
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn panels(&self) -> &PanelState {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelState {
        &mut self.panels
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.dragging()
    }

    /// Incremented every time a simulation is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_active(&self) -> bool {
        self.simulation.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn redraw_count(&self) -> u64 {
        self.frames.redraw_count()
    }

    /// Redraw requests absorbed by an already pending frame.
    pub fn coalesced_redraws(&self) -> u64 {
        self.frames.coalesced_count()
    }

    pub fn redraw_pending(&self) -> bool {
        self.frames.is_pending()
    }

    /// Full rebuild: restart the layout, rebuild the scene, reattach panels.
    pub fn render(&mut self) {
        if self.graph.is_empty() {
            warn!("no graph data to render");
            self.stop_simulation();
            self.scene = None;
            return;
        }
        self.restart_layout();
        let mut scene = Scene::build(&self.graph, self.viewport, self.layout);
        scene.transform = self.zoom.transform();
        scene.filter_note = self.filter_note();
        self.scene = Some(scene);
        self.restyle_nodes();
        self.panels.attach();
        debug!(
            nodes = self.graph.node_count(),
            layout = %self.layout,
            generation = self.generation,
            "scene rebuilt"
        );
    }

    fn filter_note(&self) -> Option<String> {
        self.filter.source().map(|source| match self.filter.description() {
            Some(desc) => format!("Filtered ({source}): {desc}"),
            None => format!("Filtered ({source})"),
        })
    }

    fn stop_simulation(&mut self) {
        if let Some(mut old) = self.simulation.take() {
            old.stop();
            self.generation += 1;
        }
        self.frames.cancel();
    }

    /// Drop the running simulation and start the current layout's.
    fn restart_layout(&mut self) {
        self.stop_simulation();
        let sim =
            layout::create_simulation(self.layout, &mut self.graph, self.viewport, &self.physics);
        self.simulation = Some(sim);
        self.generation += 1;
        if let Some(scene) = &mut self.scene {
            scene.layout = self.layout;
        }
        self.frames.request();
    }

    pub fn change_layout(&mut self, kind: LayoutKind) {
        if self.graph.is_empty() {
            warn!(layout = %kind, "no graph data, layout change deferred");
            self.layout = kind;
            return;
        }
        info!(from = %self.layout, to = %kind, "switching layout");
        self.layout = kind;
        self.restart_layout();
    }

    /// Replace the physics parameters. Force layouts restart immediately.
    pub fn set_physics(&mut self, physics: PhysicsConfig) {
        self.physics = physics.clamped();
        if self.layout.uses_physics() && !self.graph.is_empty() {
            self.restart_layout();
        }
    }

    pub fn set_physics_param(&mut self, key: &str, value: f64) -> bool {
        let mut physics = self.physics.clone();
        if !physics.set(key, value) {
            warn!(key, "unknown physics parameter");
            return false;
        }
        self.set_physics(physics);
        true
    }

    pub fn reset_physics(&mut self) {
        self.set_physics(PhysicsConfig::default());
    }

    /// One simulation timer step. Returns whether positions changed.
    pub fn tick(&mut self) -> bool {
        let Some(sim) = &mut self.simulation else {
            return false;
        };
        if sim.step(&mut self.graph) {
            self.frames.request();
            true
        } else {
            false
        }
    }

    /// Frame boundary: perform the pending redraw, if any.
    pub fn animation_frame(&mut self) -> bool {
        if !self.frames.take() {
            return false;
        }
        if let Some(scene) = &mut self.scene {
            scene.update_positions(&self.graph);
            scene.transform = self.zoom.transform();
        }
        true
    }

    /// Run ticks and frames until the simulation cools or `max_ticks` pass.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
            self.animation_frame();
        }
        self.animation_frame();
        ticks
    }

    /// Fire due timers: zoom transitions, drag releases and the resize debounce.
    pub fn advance(&mut self, now: Instant) {
        if self.zoom.advance(now)
            && let Some(scene) = &mut self.scene
        {
            scene.transform = self.zoom.transform();
        }
        if self.drag.advance(&mut self.graph, self.simulation.as_mut(), now) {
            self.restyle_nodes();
        }
        if let Some((viewport, due)) = self.pending_resize
            && now >= due
        {
            self.pending_resize = None;
            self.apply_resize(viewport);
        }
    }

    fn restyle_nodes(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };
        let selected = self.selected.as_deref();
        let dragging = self.drag.dragging();
        for node in &mut scene.nodes {
            node.style = if dragging == Some(node.id.as_str()) {
                NodeStyle::Dragging
            } else if selected == Some(node.id.as_str()) {
                NodeStyle::Selected
            } else {
                NodeStyle::Normal
            };
        }
    }

    /// Select a node; any previous selection loses its highlight first.
    pub fn select(&mut self, id: &str) -> WorkbenchResult<NodeDetails> {
        let details = NodeDetails::for_node(&self.graph, id)?;
        self.selected = Some(id.to_string());
        self.restyle_nodes();
        Ok(details)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.restyle_nodes();
    }

    pub fn click_node(&mut self, id: &str) -> WorkbenchResult<NodeDetails> {
        self.select(id)
    }

    pub fn click_canvas(&mut self) {
        self.clear_selection();
    }

    /// Details-panel content for the current selection.
    pub fn details_html(&self) -> String {
        self.selected
            .as_deref()
            .and_then(|id| NodeDetails::for_node(&self.graph, id).ok())
            .map(|d| d.to_html())
            .unwrap_or_else(|| details::NO_SELECTION_HTML.to_string())
    }

    /// Follow a relation: select the node and pan it to the viewport centre.
    pub fn navigate_to(&mut self, id: &str, now: Instant) -> WorkbenchResult<NodeDetails> {
        let details = self.select(id)?;
        if let Some(node) = self.graph.node(id) {
            self.zoom
                .center_on((node.x, node.y), self.viewport.center(), now);
        }
        Ok(details)
    }

    pub fn drag_start(&mut self, id: &str) -> WorkbenchResult<()> {
        self.drag
            .start(&mut self.graph, self.simulation.as_mut(), id)?;
        self.restyle_nodes();
        Ok(())
    }

    pub fn drag_move(&mut self, id: &str, x: f64, y: f64) -> WorkbenchResult<()> {
        self.drag.move_to(&mut self.graph, id, x, y)?;
        self.frames.request();
        Ok(())
    }

    pub fn drag_end(&mut self, id: &str, now: Instant) {
        self.drag.end(self.simulation.as_mut(), id, now);
        self.restyle_nodes();
    }

    pub fn reset_zoom(&mut self, now: Instant) {
        self.zoom.reset(now);
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.zoom.scale_by(ZOOM_FACTOR, self.viewport.center(), now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.zoom.scale_by(1.0 / ZOOM_FACTOR, self.viewport.center(), now);
    }

    /// Direct wheel/pan input; applied immediately.
    pub fn set_transform(&mut self, transform: ZoomTransform) {
        self.zoom.set(transform);
        if let Some(scene) = &mut self.scene {
            scene.transform = self.zoom.transform();
        }
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> bool {
        self.panels.toggle(panel)
    }

    pub fn handle_key(&mut self, key: &str, in_text_input: bool, now: Instant) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(key, in_text_input)?;
        debug!(key, %shortcut, "shortcut");
        match shortcut {
            Shortcut::ResetZoom => self.reset_zoom(now),
            Shortcut::ZoomIn => self.zoom_in(now),
            Shortcut::ZoomOut => self.zoom_out(now),
            Shortcut::ToggleLegend => {
                self.toggle_panel(Panel::Legend);
            }
            Shortcut::ToggleInstructions => {
                self.toggle_panel(Panel::Instructions);
            }
            Shortcut::ToggleDetails => {
                self.toggle_panel(Panel::NodeDetails);
            }
            Shortcut::ToggleQuery => {
                self.toggle_panel(Panel::Query);
            }
        }
        Some(shortcut)
    }

    /// Window resize event; only the last one within the debounce window applies.
    pub fn request_resize(&mut self, viewport: Viewport, now: Instant) {
        self.pending_resize = Some((viewport, now + RESIZE_DEBOUNCE));
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        info!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
        if self.scene.is_none() {
            warn!("resize before first render, nothing to rebuild");
            return;
        }
        self.render();
    }

    /// Swap in a subgraph. A payload that fails to parse changes nothing.
    pub fn apply_filter(
        &mut self,
        turtle: &str,
        source: FilterSource,
        description: Option<String>,
    ) -> WorkbenchResult<()> {
        self.filter
            .apply(&mut self.graph, turtle, source, description)?;
        self.after_graph_swap();
        Ok(())
    }

    /// Bring back the unfiltered graph. No-op when nothing is filtered.
    pub fn restore(&mut self) -> bool {
        if !self.filter.restore(&mut self.graph) {
            debug!("restore requested without an active filter");
            return false;
        }
        self.after_graph_swap();
        true
    }

    fn after_graph_swap(&mut self) {
        self.selected = None;
        self.drag.reset();
        self.render();
    }

    pub fn to_svg(&self) -> Option<String> {
        self.scene.as_ref().map(|s| s.to_svg(&self.panels))
    }
}
