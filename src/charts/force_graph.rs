use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

use crate::data::GraphDocument;
use crate::force::{ForceConfig, ForceGraph, NeighborHighlight, Simulation, SimulationState};
use crate::interaction::{
    DIMMED_LINK_OPACITY, DIMMED_OPACITY, InteractionEvent, InteractionOutcome, InteractionState,
    Tooltip,
};
use crate::viewport::{Gesture, ViewportConfig, ViewportController, ViewportTransform};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ForceGraphConfig {
    pub simulation: ForceConfig,
    pub viewport: ViewportConfig,
}

impl Default for ForceGraphConfig {
    fn default() -> Self {
        let simulation = ForceConfig::default();
        Self {
            simulation,
            viewport: ViewportConfig {
                width: f64::from(simulation.width),
                height: f64::from(simulation.height),
                min_scale: 0.5,
                max_scale: 2.0,
                translate_extent: None,
            },
        }
    }
}

/// Force-directed graph under a pan/zoom overlay. Pointer coordinates are
/// canvas-local screen coordinates; the simulation lives in world space.
pub struct ForceGraphChart {
    simulation: Simulation,
    viewport: ViewportController,
    interaction: InteractionState<usize>,
    highlight: Option<NeighborHighlight>,
}

impl ForceGraphChart {
    pub fn new(document: &GraphDocument, config: &ForceGraphConfig) -> Self {
        let graph = ForceGraph::from_document(document);
        Self {
            simulation: Simulation::new(graph, config.simulation),
            viewport: ViewportController::new(config.viewport),
            interaction: InteractionState::new(),
            highlight: None,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn size(&self) -> (f64, f64) {
        let config = self.viewport.config();
        (config.width, config.height)
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.current_transform()
    }

    pub fn interaction(&self) -> &InteractionState<usize> {
        &self.interaction
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    pub fn highlight(&self) -> Option<&NeighborHighlight> {
        self.highlight.as_ref()
    }

    /// One frame: a simulation step plus any running viewport animation.
    /// Returns whether another frame is needed.
    pub fn step(&mut self, elapsed_ms: f64) -> bool {
        let simulating = self.simulation.step();
        let animating = self.viewport.tick(elapsed_ms);
        simulating || animating
    }

    pub fn to_world(&self, x: f64, y: f64) -> Vec2 {
        let (wx, wy) = self.transform().invert(x, y);
        vec2(wx as f32, wy as f32)
    }

    pub fn to_screen(&self, point: Vec2) -> (f64, f64) {
        self.transform().apply(f64::from(point.x), f64::from(point.y))
    }

    pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
        self.simulation.node_at(self.to_world(x, y))
    }

    pub fn node_opacity(&self, index: usize) -> f32 {
        match &self.highlight {
            Some(highlight) if !highlight.contains_node(index) => DIMMED_OPACITY,
            _ => 1.0,
        }
    }

    pub fn edge_opacity(&self, index: usize) -> f32 {
        match &self.highlight {
            Some(highlight) if !highlight.contains_edge(index) => DIMMED_LINK_OPACITY,
            _ => 1.0,
        }
    }

    /// Moves the drag pin while dragging, otherwise updates hover.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<usize> {
        if self.simulation.state() == SimulationState::Dragging {
            self.simulation.drag_to(self.to_world(x, y));
            return self.interaction.handle(InteractionEvent::PointerMove { x, y }, |_| String::new());
        }

        let Some(index) = self.node_at(x, y) else {
            return self.pointer_left();
        };
        let nodes = self.simulation.nodes();
        let outcome = self.interaction.handle(InteractionEvent::PointerEnter { id: index, x, y }, |id| {
            nodes[*id].name.clone()
        });
        if outcome == InteractionOutcome::HoverChanged {
            self.highlight = Some(self.simulation.graph().highlight(index));
        }
        outcome
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<usize> {
        if self.simulation.state() == SimulationState::Dragging {
            return InteractionOutcome::Unchanged;
        }
        self.highlight = None;
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }

    /// Starts dragging the node under the pointer; returns false on a miss so
    /// the host can pan instead.
    pub fn drag_start(&mut self, x: f64, y: f64) -> bool {
        let Some(index) = self.node_at(x, y) else {
            return false;
        };
        self.simulation.drag_start(index, self.to_world(x, y));
        true
    }

    pub fn drag_end(&mut self) {
        self.simulation.drag_end();
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.apply_user_gesture(Gesture::Pan { dx, dy });
    }

    pub fn zoom(&mut self, factor: f64, anchor: (f64, f64)) {
        self.viewport.apply_user_gesture(Gesture::Zoom { factor, anchor });
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
    }

    /// Stops the simulation; used when the chart is unmounted.
    pub fn stop(&mut self) {
        self.simulation.stop();
        self.viewport.cancel();
    }
}
