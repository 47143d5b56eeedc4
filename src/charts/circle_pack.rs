use serde::Deserialize;
use tracing::debug;

use crate::data::Record;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::interaction::{InteractionEvent, InteractionOutcome, InteractionState, Tooltip};
use crate::layout::{Circle, PackConfig, PackLayout, pack};
use crate::viewport::{ZoomAnimation, ZoomView};

use super::{HierarchyFields, thousands_breadcrumb};

/// Depth-1 circles smaller than this stay unlabelled in the overview.
const OVERVIEW_LABEL_MIN_RADIUS: f64 = 20.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CirclePackConfig {
    pub fields: HierarchyFields,
    pub layout: PackConfig,
    pub zoom_duration_ms: f64,
}

impl Default for CirclePackConfig {
    fn default() -> Self {
        Self {
            fields: HierarchyFields::new(
                "World",
                &["Continent", "Country", "Biome_Type"],
                Some("Region"),
                "Area_sq_km",
            ),
            layout: PackConfig::default(),
            zoom_duration_ms: 750.0,
        }
    }
}

/// Zoomable circle packing. Pointer coordinates are canvas-local, with the
/// canvas `layout.width × layout.height`.
pub struct CirclePackChart {
    tree: Hierarchy,
    layout: PackLayout,
    config: CirclePackConfig,
    focus: NodeId,
    /// Set once the user has zoomed; switches the labelling rule.
    focused: bool,
    view: ZoomView,
    animation: Option<ZoomAnimation>,
    interaction: InteractionState<NodeId>,
}

impl CirclePackChart {
    pub fn new(rows: &[Record], config: &CirclePackConfig) -> Self {
        let tree = config.fields.build(rows);
        let layout = pack(&tree, &config.layout);
        let root = layout.circle(tree.root());
        Self {
            view: ZoomView::new(root.x, root.y, root.r * 2.0),
            focus: tree.root(),
            focused: false,
            animation: None,
            interaction: InteractionState::new(),
            config: config.clone(),
            tree,
            layout,
        }
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn size(&self) -> (f64, f64) {
        (self.config.layout.width, self.config.layout.height)
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn view(&self) -> ZoomView {
        self.view
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn interaction(&self) -> &InteractionState<NodeId> {
        &self.interaction
    }

    /// Circle of `id` in canvas coordinates under the current view.
    pub fn projected(&self, id: NodeId) -> Circle {
        let (width, height) = self.size();
        let circle = self.layout.circle(id);
        let (x, y) = self.view.project(circle.x, circle.y, width, height);
        Circle::new(x, y, circle.r * self.view.scale(width))
    }

    pub fn label_visible(&self, id: NodeId) -> bool {
        let node = self.tree.node(id);
        if self.focused {
            id == self.focus || node.parent() == Some(self.focus)
        } else {
            node.depth == 1 && self.layout.circle(id).r > OVERVIEW_LABEL_MIN_RADIUS
        }
    }

    /// Deepest non-leaf circle under the pointer.
    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        let (width, height) = self.size();
        let (wx, wy) = self.view.unproject(x, y, width, height);
        self.layout.node_at(&self.tree, wx, wy, false)
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<NodeId> {
        let tree = &self.tree;
        let event = match self.node_at(x, y) {
            Some(id) => InteractionEvent::PointerEnter { id, x, y },
            None => InteractionEvent::PointerLeave,
        };
        self.interaction
            .handle(event, |id| thousands_breadcrumb(tree, *id, "Area", "sq km"))
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<NodeId> {
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    /// Clicking a circle zooms into it; clicking the background zooms back out.
    pub fn click(&mut self, x: f64, y: f64) -> InteractionOutcome<NodeId> {
        let target = self.node_at(x, y).unwrap_or(self.tree.root());
        if target == self.focus {
            return InteractionOutcome::Unchanged;
        }
        self.zoom_to(target);
        self.interaction.handle(InteractionEvent::Click(target), |_| String::new())
    }

    pub fn zoom_to(&mut self, id: NodeId) {
        let circle = self.layout.circle(id);
        let target = ZoomView::new(circle.x, circle.y, circle.r * 2.0);
        debug!(node = %self.tree.node(id).name, "circle pack zoom");
        self.animation = Some(ZoomAnimation::new(self.view, target, self.config.zoom_duration_ms));
        self.focus = id;
        self.focused = true;
    }

    /// Advances the zoom animation; returns whether it is still running.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        self.view = animation.advance(elapsed_ms);
        if animation.is_finished() {
            self.animation = None;
            return false;
        }
        true
    }
}
