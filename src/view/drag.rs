use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{WorkbenchError, WorkbenchResult};
use crate::graph::GraphData;
use crate::layout::Simulation;

pub const DRAG_ALPHA_TARGET: f64 = 0.1;
pub const RELEASE_ALPHA_TARGET: f64 = 0.02;
pub const UNPIN_DELAY: Duration = Duration::from_millis(300);

/// Node dragging: pinning while held and a delayed release afterwards.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<String>,
    pending_unpins: Vec<(String, Instant)>,
}

impl DragController {
    pub fn dragging(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn pending_unpins(&self) -> usize {
        self.pending_unpins.len()
    }

    /// Pin the node where it is and reheat the simulation.
    pub fn start(
        &mut self,
        graph: &mut GraphData,
        simulation: Option<&mut Simulation>,
        id: &str,
    ) -> WorkbenchResult<()> {
        let node = graph
            .node_mut(id)
            .ok_or_else(|| WorkbenchError::UnknownNode(id.to_string()))?;
        let (x, y) = (node.x, node.y);
        node.pin(x, y);
        // a new grab cancels this node's pending release
        self.pending_unpins.retain(|(pending, _)| pending != id);
        if let Some(sim) = simulation {
            sim.set_alpha_target(DRAG_ALPHA_TARGET);
            sim.restart();
        }
        self.active = Some(id.to_string());
        debug!(node = id, "drag started");
        Ok(())
    }

    pub fn move_to(
        &mut self,
        graph: &mut GraphData,
        id: &str,
        x: f64,
        y: f64,
    ) -> WorkbenchResult<()> {
        let node = graph
            .node_mut(id)
            .ok_or_else(|| WorkbenchError::UnknownNode(id.to_string()))?;
        node.pin(x, y);
        Ok(())
    }

    /// Let go: cool toward a low target and schedule the unpin.
    pub fn end(&mut self, simulation: Option<&mut Simulation>, id: &str, now: Instant) {
        if let Some(sim) = simulation {
            sim.set_alpha_target(RELEASE_ALPHA_TARGET);
        }
        self.pending_unpins.push((id.to_string(), now + UNPIN_DELAY));
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        debug!(node = id, "drag ended");
    }

    /// Fire due unpins. Returns true when at least one fired.
    pub fn advance(
        &mut self,
        graph: &mut GraphData,
        simulation: Option<&mut Simulation>,
        now: Instant,
    ) -> bool {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_unpins)
            .into_iter()
            .partition(|(_, at)| *at <= now);
        self.pending_unpins = waiting;
        if due.is_empty() {
            return false;
        }
        for (id, _) in &due {
            match graph.node_mut(id) {
                Some(node) => node.unpin(),
                None => debug!(node = %id, "released node no longer in graph"),
            }
        }
        if let Some(sim) = simulation {
            sim.set_alpha_target(0.0);
        }
        true
    }

    /// Forget all drag state, e.g. after the graph was replaced.
    pub fn reset(&mut self) {
        self.active = None;
        self.pending_unpins.clear();
    }
}
