use serde::Deserialize;

use crate::data::Record;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::interaction::{DIMMED_OPACITY, InteractionEvent, InteractionOutcome, InteractionState, Tooltip};
use crate::layout::{ArcGeometry, PartitionConfig, PartitionLayout, partition};

use super::{HierarchyFields, si_breadcrumb};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SunburstConfig {
    pub fields: HierarchyFields,
    pub layout: PartitionConfig,
}

impl Default for SunburstConfig {
    fn default() -> Self {
        Self {
            fields: HierarchyFields::new(
                "World",
                &["Continent", "Subcontinent"],
                Some("Country"),
                "Population",
            ),
            layout: PartitionConfig::default(),
        }
    }
}

/// Sunburst on a square canvas of side `2 × radius`; the centre of the
/// canvas is the centre of the rings.
pub struct SunburstChart {
    tree: Hierarchy,
    layout: PartitionLayout,
    interaction: InteractionState<NodeId>,
}

impl SunburstChart {
    pub fn new(rows: &[Record], config: &SunburstConfig) -> Self {
        let tree = config.fields.build(rows);
        let layout = partition(&tree, &config.layout);
        Self {
            tree,
            layout,
            interaction: InteractionState::new(),
        }
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn size(&self) -> (f64, f64) {
        let side = self.layout.radius() * 2.0;
        (side, side)
    }

    /// Drawable nodes: everything except the root.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, ArcGeometry)> + '_ {
        self.tree
            .ids()
            .filter(|id| *id != NodeId::ROOT)
            .map(|id| (id, self.layout.arc(id)))
    }

    pub fn label_visible(&self, id: NodeId) -> bool {
        self.layout.label_visible(id)
    }

    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        let radius = self.layout.radius();
        self.layout.node_at(&self.tree, x - radius, y - radius)
    }

    /// Full opacity for the hovered node, its ancestors and its descendants.
    pub fn opacity(&self, id: NodeId) -> f32 {
        match self.interaction.hovered() {
            None => 1.0,
            Some(&hovered) if self.tree.is_ancestor_of(id, hovered) => 1.0,
            Some(&hovered) if self.tree.is_ancestor_of(hovered, id) => 1.0,
            Some(_) => DIMMED_OPACITY,
        }
    }

    pub fn interaction(&self) -> &InteractionState<NodeId> {
        &self.interaction
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<NodeId> {
        let tree = &self.tree;
        let event = match self.node_at(x, y) {
            Some(id) => InteractionEvent::PointerEnter { id, x, y },
            None => InteractionEvent::PointerLeave,
        };
        self.interaction.handle(event, |id| si_breadcrumb(tree, *id))
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<NodeId> {
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }
}
