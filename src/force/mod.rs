//! Force-directed node/edge layout.
//!
//! The host drives the simulation by calling [`Simulation::step`] once per
//! frame; nothing runs in the background. Each step cools `alpha` toward
//! `alpha_target`, applies charge, link springs and centering as velocity or
//! position changes, integrates, and finally snaps pinned nodes to their pins.

mod forces;
mod graph;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use serde::Deserialize;
use tracing::debug;

use crate::util::{Lcg, stable_pair};

use forces::{LinkSprings, ManyBody, apply_centering, phyllotaxis};
pub use graph::{ForceGraph, GraphEdge, GraphNode, NeighborHighlight};
use quadtree::Quadtree;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub width: f32,
    pub height: f32,
    pub link_distance: f32,
    /// Negative values repel.
    pub charge_strength: f32,
    pub theta: f32,
    pub alpha: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub alpha_target: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub node_radius: f32,
    /// Amplitude of the seeded jitter added to the initial spiral.
    pub jitter: f32,
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            width: 800.0,
            height: 600.0,
            link_distance: 100.0,
            charge_strength: -200.0,
            theta: 0.9,
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            node_radius: 8.0,
            jitter: 1.0,
            seed: 0,
        }
    }
}

impl ForceConfig {
    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Idle,
    Running,
    Dragging,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    config: ForceConfig,
    graph: ForceGraph,
    springs: LinkSprings,
    state: SimulationState,
    alpha: f32,
    alpha_target: f32,
    dragged: Option<usize>,
    random: Lcg,
    ticks: u64,
}

impl Simulation {
    /// Seeds positions on a jittered phyllotaxis spiral and starts running.
    pub fn new(mut graph: ForceGraph, config: ForceConfig) -> Self {
        let center = config.center();
        for (index, node) in graph.nodes.iter_mut().enumerate() {
            let (jx, jy) = stable_pair(config.seed, &node.id);
            node.position = center + phyllotaxis(index) + vec2(jx, jy) * config.jitter;
            node.velocity = Vec2::ZERO;
            node.fixed = None;
        }

        let springs = LinkSprings::new(graph.nodes.len(), &graph.edges, config.link_distance);
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            seed = config.seed,
            "force simulation started"
        );

        Self {
            springs,
            graph,
            state: SimulationState::Running,
            alpha: config.alpha,
            alpha_target: config.alpha_target,
            dragged: None,
            random: Lcg::new(config.seed),
            ticks: 0,
            config,
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn graph(&self) -> &ForceGraph {
        &self.graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.graph.nodes
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.graph.neighbors(index)
    }

    /// Advances one tick unless idle; returns whether the simulation is still
    /// active afterwards.
    pub fn step(&mut self) -> bool {
        if self.state == SimulationState::Idle {
            return false;
        }

        self.tick();
        if self.state == SimulationState::Running && self.alpha < self.config.alpha_min {
            self.state = SimulationState::Idle;
            debug!(ticks = self.ticks, "force simulation settled");
        }
        self.state != SimulationState::Idle
    }

    /// Runs up to `count` steps, stopping early when the simulation settles.
    pub fn run(&mut self, count: usize) {
        for _ in 0..count {
            if !self.step() {
                break;
            }
        }
    }

    fn tick(&mut self) {
        self.ticks += 1;
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let nodes = &mut self.graph.nodes;

        if self.config.charge_strength != 0.0 {
            let positions = nodes.iter().map(|node| node.position).collect::<Vec<_>>();
            if let Some(tree) = Quadtree::build(&positions) {
                let params = ManyBody {
                    strength: self.config.charge_strength,
                    theta: self.config.theta,
                };
                for (index, node) in nodes.iter_mut().enumerate() {
                    node.velocity += params.charge_on(&tree, index, &positions, alpha, &mut self.random);
                }
            }
        }

        self.springs.apply(nodes, &self.graph.edges, alpha, &mut self.random);
        apply_centering(nodes, self.config.center());

        let retain = 1.0 - self.config.velocity_decay;
        for node in nodes.iter_mut() {
            match node.fixed {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= retain;
                    node.position += node.velocity;
                }
            }
        }
    }

    /// Pins `index` under the pointer and reheats the simulation.
    pub fn drag_start(&mut self, index: usize, pointer: Vec2) {
        let Some(node) = self.graph.nodes.get_mut(index) else {
            return;
        };
        node.fixed = Some(pointer);
        self.dragged = Some(index);
        self.alpha_target = self.config.drag_alpha_target;
        self.state = SimulationState::Dragging;
    }

    pub fn drag_to(&mut self, pointer: Vec2) {
        if let Some(node) = self.dragged.and_then(|index| self.graph.nodes.get_mut(index)) {
            node.fixed = Some(pointer);
        }
    }

    pub fn drag_end(&mut self) {
        if let Some(node) = self.dragged.take().and_then(|index| self.graph.nodes.get_mut(index)) {
            node.fixed = None;
        }
        self.alpha_target = self.config.alpha_target;
        if self.state == SimulationState::Dragging {
            self.state = SimulationState::Running;
        }
    }

    /// Halts stepping; the layout keeps its current positions.
    pub fn stop(&mut self) {
        self.state = SimulationState::Idle;
    }

    /// Nearest node whose disk contains the world-space `point`.
    pub fn node_at(&self, point: Vec2) -> Option<usize> {
        let radius_sq = self.config.node_radius * self.config.node_radius;
        self.graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, (node.position - point).length_sq()))
            .filter(|(_, distance_sq)| *distance_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
