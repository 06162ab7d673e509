//! Iterative force simulation over a [`GraphData`].
//!
//! Mirrors the d3-force model: a cooling `alpha`, a set of forces that adjust
//! velocities, and velocity-Verlet style integration with friction. Pinned
//! nodes (`fx`/`fy`) are held in place.

use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::graph::GraphData;

pub const DEFAULT_ALPHA_MIN: f64 = 0.001;
const INITIAL_RADIUS: f64 = 10.0;

/// Per-tick working copy of a node's kinematic state.
#[derive(Debug, Clone, Copy, Default)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: Option<f64>,
    fy: Option<f64>,
}

/// Deterministic linear congruential generator used to break symmetric ties.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 4_294_967_296;

    fn new() -> Self {
        Self(1)
    }

    fn next(&mut self) -> f64 {
        self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
        self.0 as f64 / Self::M as f64
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<(usize, usize)>,
    bias: Vec<f64>,
    pub distance: f64,
    pub strength: f64,
}

impl LinkForce {
    pub fn new(graph: &GraphData, distance: f64, strength: f64) -> Self {
        let links: Vec<(usize, usize)> = graph
            .edge_endpoints()
            .into_iter()
            .filter(|(s, t)| s != t)
            .collect();
        let mut count = vec![0usize; graph.node_count()];
        for &(s, t) in &links {
            count[s] += 1;
            count[t] += 1;
        }
        let bias = links
            .iter()
            .map(|&(s, t)| count[s] as f64 / (count[s] + count[t]) as f64)
            .collect();
        Self {
            links,
            bias,
            distance,
            strength,
        }
    }

    fn apply(&self, bodies: &mut [Body], alpha: f64, random: &mut Lcg) {
        for (i, &(s, t)) in self.links.iter().enumerate() {
            let mut x = bodies[t].x + bodies[t].vx - bodies[s].x - bodies[s].vx;
            let mut y = bodies[t].y + bodies[t].vy - bodies[s].y - bodies[s].vy;
            if x == 0.0 {
                x = random.jiggle();
            }
            if y == 0.0 {
                y = random.jiggle();
            }
            let mut l = (x * x + y * y).sqrt();
            l = (l - self.distance) / l * alpha * self.strength;
            x *= l;
            y *= l;
            let b = self.bias[i];
            bodies[t].vx -= x * b;
            bodies[t].vy -= y * b;
            bodies[s].vx += x * (1.0 - b);
            bodies[s].vy += y * (1.0 - b);
        }
    }
}

/// Pairwise charge (negative strength repels).
#[derive(Debug, Clone)]
pub struct ManyBodyForce {
    pub strength: f64,
    pub distance_min: f64,
    pub distance_max: f64,
}

impl ManyBodyForce {
    fn apply(&self, bodies: &mut [Body], alpha: f64, random: &mut Lcg) {
        let min2 = self.distance_min * self.distance_min;
        let max2 = self.distance_max * self.distance_max;
        for i in 0..bodies.len() {
            let (xi, yi) = (bodies[i].x, bodies[i].y);
            for j in 0..bodies.len() {
                if i == j {
                    continue;
                }
                let mut x = bodies[j].x - xi;
                let mut y = bodies[j].y - yi;
                let mut l = x * x + y * y;
                if l >= max2 {
                    continue;
                }
                if x == 0.0 {
                    x = random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = random.jiggle();
                    l += y * y;
                }
                if l < min2 {
                    l = (min2 * l).sqrt();
                }
                let w = self.strength * alpha / l;
                bodies[i].vx += x * w;
                bodies[i].vy += y * w;
            }
        }
    }
}

/// Translates all nodes so their centroid moves toward `(x, y)`.
#[derive(Debug, Clone)]
pub struct CenterForce {
    pub x: f64,
    pub y: f64,
    pub strength: f64,
}

impl CenterForce {
    fn apply(&self, bodies: &mut [Body]) {
        if bodies.is_empty() {
            return;
        }
        let n = bodies.len() as f64;
        let (sx, sy) = bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
        let dx = (sx / n - self.x) * self.strength;
        let dy = (sy / n - self.y) * self.strength;
        for body in bodies.iter_mut() {
            body.x -= dx;
            body.y -= dy;
        }
    }
}

/// Pushes apart nodes whose circles overlap.
#[derive(Debug, Clone)]
pub struct CollideForce {
    pub radius: f64,
    pub strength: f64,
}

impl CollideForce {
    fn apply(&self, bodies: &mut [Body], random: &mut Lcg) {
        let ri = self.radius;
        let r = ri + ri;
        let ri2 = ri * ri;
        for i in 0..bodies.len() {
            let xi = bodies[i].x + bodies[i].vx;
            let yi = bodies[i].y + bodies[i].vy;
            for j in (i + 1)..bodies.len() {
                let mut x = xi - bodies[j].x - bodies[j].vx;
                let mut y = yi - bodies[j].y - bodies[j].vy;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = random.jiggle();
                    l += y * y;
                }
                let dist = l.sqrt();
                let k = (r - dist) / dist * self.strength;
                x *= k;
                y *= k;
                let share = ri2 / (ri2 + ri2);
                bodies[i].vx += x * share;
                bodies[i].vy += y * share;
                bodies[j].vx -= x * (1.0 - share);
                bodies[j].vy -= y * (1.0 - share);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Spring pulling each node toward its own target coordinate on one axis.
#[derive(Debug, Clone)]
pub struct PositionForce {
    pub axis: Axis,
    pub targets: Vec<f64>,
    pub strength: f64,
}

impl PositionForce {
    /// Targets are the nodes' current coordinates on `axis`.
    pub fn hold_current(graph: &GraphData, axis: Axis, strength: f64) -> Self {
        let targets = graph
            .nodes()
            .map(|n| match axis {
                Axis::X => n.x,
                Axis::Y => n.y,
            })
            .collect();
        Self {
            axis,
            targets,
            strength,
        }
    }

    fn apply(&self, bodies: &mut [Body], alpha: f64) {
        for (body, &target) in bodies.iter_mut().zip(&self.targets) {
            match self.axis {
                Axis::X => body.vx += (target - body.x) * self.strength * alpha,
                Axis::Y => body.vy += (target - body.y) * self.strength * alpha,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Force {
    Link(LinkForce),
    ManyBody(ManyBodyForce),
    Center(CenterForce),
    Collide(CollideForce),
    Position(PositionForce),
}

impl Force {
    fn apply(&self, bodies: &mut [Body], alpha: f64, random: &mut Lcg) {
        match self {
            Force::Link(f) => f.apply(bodies, alpha, random),
            Force::ManyBody(f) => f.apply(bodies, alpha, random),
            Force::Center(f) => f.apply(bodies),
            Force::Collide(f) => f.apply(bodies, random),
            Force::Position(f) => f.apply(bodies, alpha),
        }
    }
}

/// A configured physics simulation bound to one graph's node set.
#[derive(Debug, Clone)]
pub struct Simulation {
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    forces: Vec<(&'static str, Force)>,
    node_count: usize,
    stopped: bool,
    random: Lcg,
}

impl Simulation {
    /// Create a simulation and give every unplaced node a phyllotaxis position.
    pub fn new(graph: &mut GraphData) -> Self {
        let initial_angle = PI * (3.0 - 5f64.sqrt());
        for (i, node) in graph.nodes_mut().enumerate() {
            if !node.placed {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * initial_angle;
                node.place(radius * angle.cos(), radius * angle.sin());
            }
        }
        Self {
            alpha: 1.0,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            forces: Vec::new(),
            node_count: graph.node_count(),
            stopped: false,
            random: Lcg::new(),
        }
    }

    pub fn with_force(mut self, name: &'static str, force: Force) -> Self {
        self.forces.retain(|(n, _)| *n != name);
        self.forces.push((name, force));
        self
    }

    pub fn with_alpha_decay(mut self, decay: f64) -> Self {
        self.alpha_decay = decay;
        self
    }

    pub fn with_velocity_decay(mut self, decay: f64) -> Self {
        self.velocity_decay = decay;
        self
    }

    pub fn force(&self, name: &str) -> Option<&Force> {
        self.forces.iter().find(|(n, _)| *n == name).map(|(_, f)| f)
    }

    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|(n, _)| *n).collect()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
    }

    pub fn velocity_decay(&self) -> f64 {
        self.velocity_decay
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Re-arm the timer after it cooled down or was stopped.
    pub fn restart(&mut self) {
        self.stopped = false;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// True while the simulation would keep producing ticks.
    pub fn is_active(&self) -> bool {
        !self.stopped && (self.alpha >= self.alpha_min || self.alpha_target >= self.alpha_min)
    }

    /// Advance one step unconditionally.
    pub fn tick(&mut self, graph: &mut GraphData) {
        if graph.node_count() != self.node_count {
            warn!(
                expected = self.node_count,
                actual = graph.node_count(),
                "simulation bound to a different graph, skipping tick"
            );
            return;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        let mut bodies: Vec<Body> = graph
            .nodes()
            .map(|n| Body {
                x: n.x,
                y: n.y,
                vx: n.vx,
                vy: n.vy,
                fx: n.fx,
                fy: n.fy,
            })
            .collect();

        for (_, force) in &self.forces {
            force.apply(&mut bodies, self.alpha, &mut self.random);
        }

        let keep = 1.0 - self.velocity_decay;
        for (node, body) in graph.nodes_mut().zip(bodies) {
            match body.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx = body.vx * keep;
                    node.x = body.x + node.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy = body.vy * keep;
                    node.y = body.y + node.vy;
                }
            }
        }
    }

    /// Timer-driven step: ticks only while active. Returns whether it ticked.
    pub fn step(&mut self, graph: &mut GraphData) -> bool {
        if !self.is_active() {
            if !self.stopped {
                debug!(alpha = self.alpha, "simulation cooled down");
                self.stopped = true;
            }
            return false;
        }
        self.tick(graph);
        true
    }

    /// Run until cooled down or `max_ticks` is reached. Returns ticks run.
    pub fn run(&mut self, graph: &mut GraphData, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.step(graph) {
            ticks += 1;
        }
        ticks
    }
}
