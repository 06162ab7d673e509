//! Coordinate seeding and force configuration for each layout preset.

use std::f64::consts::PI;

use super::simulation::{
    Axis, CenterForce, CollideForce, Force, LinkForce, ManyBodyForce, PositionForce, Simulation,
};
use super::tree::tree_positions;
use super::{PhysicsConfig, Viewport};
use crate::graph::GraphData;

const CHARGE_DISTANCE_MAX: f64 = 400.0;
const MANUAL_SETTLE_TICKS: usize = 100;
const TREE_MARGIN: f64 = 50.0;

fn link(graph: &GraphData, distance: f64, strength: f64) -> Force {
    Force::Link(LinkForce::new(graph, distance, strength))
}

fn collide(radius: f64, strength: f64) -> Force {
    Force::Collide(CollideForce { radius, strength })
}

fn hold(graph: &GraphData, axis: Axis, strength: f64) -> Force {
    Force::Position(PositionForce::hold_current(graph, axis, strength))
}

/// Nodes grouped by type, groups and members in order of first appearance.
fn group_by_kind(graph: &GraphData) -> Vec<Vec<usize>> {
    let kinds = graph.kinds();
    let mut groups = vec![Vec::new(); kinds.len()];
    for (i, node) in graph.nodes().enumerate() {
        if let Some(g) = kinds.iter().position(|k| *k == node.kind) {
            groups[g].push(i);
        }
    }
    groups
}

fn place_all(graph: &mut GraphData, positions: &[(f64, f64)]) {
    for (node, &(x, y)) in graph.nodes_mut().zip(positions) {
        node.place(x, y);
    }
}

pub fn force_directed(
    graph: &mut GraphData,
    viewport: Viewport,
    physics: &PhysicsConfig,
) -> Simulation {
    let sim = Simulation::new(graph);
    sim.with_force("link", link(graph, physics.link_distance, physics.link_strength))
        .with_force(
            "charge",
            Force::ManyBody(ManyBodyForce {
                strength: physics.charge_strength,
                distance_min: 1.0,
                distance_max: CHARGE_DISTANCE_MAX,
            }),
        )
        .with_force(
            "center",
            Force::Center(CenterForce {
                x: viewport.width / 2.0,
                y: viewport.height / 2.0,
                strength: physics.center_strength,
            }),
        )
        .with_force(
            "collision",
            collide(physics.collision_radius, physics.collision_strength),
        )
        .with_alpha_decay(physics.alpha_decay)
        .with_velocity_decay(physics.velocity_decay)
}

/// Settle with a short force-directed run, then hand over to a near-static
/// simulation that mostly reacts to dragging.
pub fn manual(graph: &mut GraphData, viewport: Viewport, physics: &PhysicsConfig) -> Simulation {
    let mut settle = force_directed(graph, viewport, physics).with_alpha_decay(0.02);
    for _ in 0..MANUAL_SETTLE_TICKS {
        settle.tick(graph);
    }
    drop(settle);

    Simulation::new(graph)
        .with_force("link", link(graph, physics.link_distance, 0.1))
        .with_force("collision", collide(physics.collision_radius, 0.2))
        .with_alpha_decay(0.001)
        .with_velocity_decay(0.9)
}

pub fn circular(graph: &mut GraphData, viewport: Viewport, physics: &PhysicsConfig) -> Simulation {
    let (cx, cy) = viewport.center();
    let radius = viewport.min_side() * 0.35;
    let n = graph.node_count() as f64;
    let positions: Vec<(f64, f64)> = (0..graph.node_count())
        .map(|i| {
            let angle = i as f64 / n * 2.0 * PI;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    place_all(graph, &positions);

    Simulation::new(graph)
        .with_force("link", link(graph, 100.0, 0.1))
        .with_force("collision", collide(physics.collision_radius, 0.5))
        .with_alpha_decay(0.02)
        .with_velocity_decay(0.8)
}

/// Grid dimensions for `n` nodes: `(cols, rows)`.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    (cols, n.div_ceil(cols))
}

pub fn grid(graph: &mut GraphData, viewport: Viewport) -> Simulation {
    let (cols, rows) = grid_shape(graph.node_count());
    if cols > 0 {
        let cell_w = viewport.width / cols as f64;
        let cell_h = viewport.height / rows as f64;
        let positions: Vec<(f64, f64)> = (0..graph.node_count())
            .map(|i| {
                let (col, row) = (i % cols, i / cols);
                ((col as f64 + 0.5) * cell_w, (row as f64 + 0.5) * cell_h)
            })
            .collect();
        place_all(graph, &positions);
    }

    Simulation::new(graph)
        .with_force("link", link(graph, 100.0, 0.1))
        .with_force("collision", collide(15.0, 0.5))
        .with_force("x", hold(graph, Axis::X, 0.2))
        .with_force("y", hold(graph, Axis::Y, 0.2))
        .with_alpha_decay(0.02)
        .with_velocity_decay(0.8)
}

pub fn hierarchical(graph: &mut GraphData, viewport: Viewport) -> Simulation {
    let groups = group_by_kind(graph);
    let mut positions = vec![(0.0, 0.0); graph.node_count()];
    let layers = groups.len() as f64 + 1.0;
    for (i, members) in groups.iter().enumerate() {
        let y = (i as f64 + 1.0) * viewport.height / layers;
        let slots = members.len() as f64 + 1.0;
        for (j, &node) in members.iter().enumerate() {
            positions[node] = ((j as f64 + 1.0) * viewport.width / slots, y);
        }
    }
    place_all(graph, &positions);

    Simulation::new(graph)
        .with_force("link", link(graph, 80.0, 0.3))
        .with_force("collision", collide(20.0, 0.7))
        .with_force("y", hold(graph, Axis::Y, 0.3))
        .with_alpha_decay(0.02)
        .with_velocity_decay(0.7)
}

pub fn radial(graph: &mut GraphData, viewport: Viewport) -> Simulation {
    let groups = group_by_kind(graph);
    let (cx, cy) = viewport.center();
    let ring = viewport.min_side() * 0.4 / groups.len().max(1) as f64;
    let mut positions = vec![(cx, cy); graph.node_count()];
    for (i, members) in groups.iter().enumerate() {
        let radius = (i as f64 + 1.0) * ring;
        let step = 2.0 * PI / members.len() as f64;
        for (j, &node) in members.iter().enumerate() {
            let angle = j as f64 * step;
            positions[node] = (cx + radius * angle.cos(), cy + radius * angle.sin());
        }
    }
    place_all(graph, &positions);

    Simulation::new(graph)
        .with_force("link", link(graph, 80.0, 0.2))
        .with_force("collision", collide(18.0, 0.5))
        .with_alpha_decay(0.02)
        .with_velocity_decay(0.8)
}

pub fn tree(graph: &mut GraphData, viewport: Viewport) -> Simulation {
    let width = (viewport.width - 2.0 * TREE_MARGIN).max(0.0);
    let height = (viewport.height - 2.0 * TREE_MARGIN).max(0.0);
    let positions: Vec<(f64, f64)> = tree_positions(graph, width, height)
        .into_iter()
        .map(|(x, y)| (x + TREE_MARGIN, y + TREE_MARGIN))
        .collect();
    place_all(graph, &positions);

    Simulation::new(graph)
        .with_force("link", link(graph, 60.0, 0.3))
        .with_force("collision", collide(15.0, 0.5))
        .with_force("x", hold(graph, Axis::X, 0.3))
        .with_force("y", hold(graph, Axis::Y, 0.3))
        .with_alpha_decay(0.02)
        .with_velocity_decay(0.7)
}
