use serde::Serialize;
use tracing::debug;

use super::scene::COLOR_SCHEME;

const LEGEND_MAX_ENTRIES: usize = 15;
const MIN_GRAPH_HEIGHT: f64 = 200.0;
const MIN_QUERY_HEIGHT: f64 = 100.0;
const MIN_MAIN_WIDTH: f64 = 300.0;
const MIN_DETAILS_WIDTH: f64 = 200.0;

pub const INSTRUCTIONS: [&str; 8] = [
    "Scroll to zoom in/out",
    "Click and drag to pan",
    "Drag nodes to reposition",
    "Click 'Reset Zoom' or press R",
    "Use +/- keys to zoom",
    "Use the SPARQL panel to query data",
    "Press P to toggle details panel",
    "Press Q to toggle query panel",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Legend,
    Instructions,
    NodeDetails,
    Query,
}

/// Legend rows: the first colour-scheme entries, excluding the fallback.
pub fn legend_entries() -> Vec<(&'static str, &'static str)> {
    COLOR_SCHEME
        .iter()
        .filter(|(kind, _)| *kind != "default")
        .take(LEGEND_MAX_ENTRIES)
        .copied()
        .collect()
}

/// Pixel sizes of the split between graph/query (rows) and main/details (columns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitSizes {
    pub graph_height: f64,
    pub query_height: f64,
    pub main_width: f64,
    pub details_width: f64,
}

/// Visibility and sizing of the overlays and side panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelState {
    pub legend_visible: bool,
    pub instructions_visible: bool,
    pub details_collapsed: bool,
    pub query_collapsed: bool,
    pub split: Option<SplitSizes>,
    attach_count: u64,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            legend_visible: true,
            instructions_visible: true,
            details_collapsed: false,
            query_collapsed: false,
            split: None,
            attach_count: 0,
        }
    }
}

impl PanelState {
    /// Flip a panel. Returns whether it is now shown.
    pub fn toggle(&mut self, panel: Panel) -> bool {
        let shown = match panel {
            Panel::Legend => {
                self.legend_visible = !self.legend_visible;
                self.legend_visible
            }
            Panel::Instructions => {
                self.instructions_visible = !self.instructions_visible;
                self.instructions_visible
            }
            Panel::NodeDetails => {
                self.details_collapsed = !self.details_collapsed;
                !self.details_collapsed
            }
            Panel::Query => {
                self.query_collapsed = !self.query_collapsed;
                !self.query_collapsed
            }
        };
        debug!(?panel, shown, "panel toggled");
        shown
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Legend => self.legend_visible,
            Panel::Instructions => self.instructions_visible,
            Panel::NodeDetails => !self.details_collapsed,
            Panel::Query => !self.query_collapsed,
        }
    }

    /// Overlays are recreated after every scene rebuild; visibility carries over.
    pub fn attach(&mut self) {
        self.attach_count += 1;
    }

    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }

    /// Drag the graph/query divider to `pointer_y`. Rejected moves leave
    /// the split untouched and return false.
    pub fn resize_rows(&mut self, pointer_y: f64, container_height: f64, handle: f64) -> bool {
        let graph_height = pointer_y;
        let query_height = container_height - graph_height - handle;
        if graph_height <= MIN_GRAPH_HEIGHT || query_height <= MIN_QUERY_HEIGHT {
            return false;
        }
        let split = self.split.get_or_insert(SplitSizes {
            graph_height,
            query_height,
            main_width: 0.0,
            details_width: 0.0,
        });
        split.graph_height = graph_height;
        split.query_height = query_height;
        true
    }

    /// Drag the main/details divider to `pointer_x`.
    pub fn resize_columns(&mut self, pointer_x: f64, container_width: f64, handle: f64) -> bool {
        let main_width = pointer_x;
        let details_width = container_width - main_width - handle;
        if main_width <= MIN_MAIN_WIDTH || details_width <= MIN_DETAILS_WIDTH {
            return false;
        }
        let split = self.split.get_or_insert(SplitSizes {
            graph_height: 0.0,
            query_height: 0.0,
            main_width,
            details_width,
        });
        split.main_width = main_width;
        split.details_width = details_width;
        true
    }
}
