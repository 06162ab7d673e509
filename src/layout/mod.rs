pub mod presets;
pub mod simulation;
pub mod tree;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::graph::GraphData;
pub use simulation::Simulation;

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    #[default]
    ForceDirected,
    Manual,
    Circular,
    Hierarchical,
    Grid,
    Radial,
    Tree,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 7] = [
        LayoutKind::ForceDirected,
        LayoutKind::Manual,
        LayoutKind::Circular,
        LayoutKind::Hierarchical,
        LayoutKind::Grid,
        LayoutKind::Radial,
        LayoutKind::Tree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::ForceDirected => "force-directed",
            LayoutKind::Manual => "manual",
            LayoutKind::Circular => "circular",
            LayoutKind::Hierarchical => "hierarchical",
            LayoutKind::Grid => "grid",
            LayoutKind::Radial => "radial",
            LayoutKind::Tree => "tree",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LayoutKind::ForceDirected => "Force-Directed",
            LayoutKind::Manual => "Manual",
            LayoutKind::Circular => "Circular",
            LayoutKind::Hierarchical => "Hierarchical",
            LayoutKind::Grid => "Grid",
            LayoutKind::Radial => "Radial",
            LayoutKind::Tree => "Tree",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayoutKind::ForceDirected => "Physics-based layout with customizable forces",
            LayoutKind::Manual => "Drag nodes freely with minimal physics",
            LayoutKind::Circular => "Nodes arranged in a circle",
            LayoutKind::Hierarchical => "Nodes layered by type",
            LayoutKind::Grid => "Nodes arranged in a regular grid",
            LayoutKind::Radial => "Concentric rings grouped by type",
            LayoutKind::Tree => "Tree structure following relationships",
        }
    }

    /// Whether the physics controls affect this layout.
    pub fn uses_physics(&self) -> bool {
        matches!(self, LayoutKind::ForceDirected | LayoutKind::Manual)
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown layout '{s}'"))
    }
}

/// User-tunable force parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub link_distance: f64,
    pub link_strength: f64,
    pub charge_strength: f64,
    pub center_strength: f64,
    pub collision_radius: f64,
    pub collision_strength: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            link_distance: 150.0,
            link_strength: 0.2,
            charge_strength: -200.0,
            center_strength: 0.1,
            collision_radius: 18.0,
            collision_strength: 0.3,
            alpha_decay: 0.005,
            velocity_decay: 0.6,
        }
    }
}

/// Range of one physics slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsControl {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

pub const PHYSICS_CONTROLS: [PhysicsControl; 8] = [
    PhysicsControl {
        key: "link_distance",
        label: "Link Distance",
        min: 50.0,
        max: 300.0,
        step: 10.0,
    },
    PhysicsControl {
        key: "link_strength",
        label: "Link Strength",
        min: 0.0,
        max: 1.0,
        step: 0.05,
    },
    PhysicsControl {
        key: "charge_strength",
        label: "Charge Strength",
        min: -1000.0,
        max: 0.0,
        step: 50.0,
    },
    PhysicsControl {
        key: "center_strength",
        label: "Center Force",
        min: 0.0,
        max: 1.0,
        step: 0.05,
    },
    PhysicsControl {
        key: "collision_radius",
        label: "Collision Radius",
        min: 5.0,
        max: 50.0,
        step: 1.0,
    },
    PhysicsControl {
        key: "collision_strength",
        label: "Collision Strength",
        min: 0.0,
        max: 1.0,
        step: 0.05,
    },
    PhysicsControl {
        key: "alpha_decay",
        label: "Alpha Decay",
        min: 0.001,
        max: 0.1,
        step: 0.001,
    },
    PhysicsControl {
        key: "velocity_decay",
        label: "Velocity Decay",
        min: 0.1,
        max: 0.9,
        step: 0.05,
    },
];

impl PhysicsConfig {
    fn field_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "link_distance" => Some(&mut self.link_distance),
            "link_strength" => Some(&mut self.link_strength),
            "charge_strength" => Some(&mut self.charge_strength),
            "center_strength" => Some(&mut self.center_strength),
            "collision_radius" => Some(&mut self.collision_radius),
            "collision_strength" => Some(&mut self.collision_strength),
            "alpha_decay" => Some(&mut self.alpha_decay),
            "velocity_decay" => Some(&mut self.velocity_decay),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "link_distance" => Some(self.link_distance),
            "link_strength" => Some(self.link_strength),
            "charge_strength" => Some(self.charge_strength),
            "center_strength" => Some(self.center_strength),
            "collision_radius" => Some(self.collision_radius),
            "collision_strength" => Some(self.collision_strength),
            "alpha_decay" => Some(self.alpha_decay),
            "velocity_decay" => Some(self.velocity_decay),
            _ => None,
        }
    }

    /// Set one parameter by control key, clamped to its range.
    /// Returns false for an unknown key.
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        let Some(control) = PHYSICS_CONTROLS.iter().find(|c| c.key == key) else {
            return false;
        };
        match self.field_mut(key) {
            Some(field) => {
                *field = value.clamp(control.min, control.max);
                true
            }
            None => false,
        }
    }

    /// Copy with every parameter forced into its control range.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for control in &PHYSICS_CONTROLS {
            if let Some(field) = out.field_mut(control.key) {
                let value = if field.is_finite() { *field } else { control.min };
                if value < control.min || value > control.max {
                    warn!(key = control.key, value, "physics value out of range, clamping");
                }
                *field = value.clamp(control.min, control.max);
            }
        }
        out
    }
}

/// Seed positions for `kind` and return its configured simulation.
pub fn create_simulation(
    kind: LayoutKind,
    graph: &mut GraphData,
    viewport: Viewport,
    physics: &PhysicsConfig,
) -> Simulation {
    debug!(layout = %kind, nodes = graph.node_count(), "creating simulation");
    match kind {
        LayoutKind::ForceDirected => presets::force_directed(graph, viewport, physics),
        LayoutKind::Manual => presets::manual(graph, viewport, physics),
        LayoutKind::Circular => presets::circular(graph, viewport, physics),
        LayoutKind::Grid => presets::grid(graph, viewport),
        LayoutKind::Hierarchical => presets::hierarchical(graph, viewport),
        LayoutKind::Radial => presets::radial(graph, viewport),
        LayoutKind::Tree => presets::tree(graph, viewport),
    }
}
