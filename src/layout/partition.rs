use std::f64::consts::TAU;

use serde::Deserialize;
use tracing::debug;

use crate::hierarchy::{ChildOrder, Hierarchy, NodeId};

use super::{ArcGeometry, check_input, clockwise_angle};

/// Arcs narrower than this (radians, about 7°) get no label.
const MIN_LABEL_SPAN: f64 = 7.0 * std::f64::consts::PI / 180.0;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Outer radius of the deepest ring.
    pub radius: f64,
    pub padding: f64,
    pub order: ChildOrder,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            radius: 350.0,
            padding: 0.0,
            order: ChildOrder::ValueDescending,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PartitionLayout {
    arcs: Vec<ArcGeometry>,
    radius: f64,
}

impl PartitionLayout {
    pub fn arc(&self, id: NodeId) -> ArcGeometry {
        self.arcs[id.index()]
    }

    pub fn arcs(&self) -> &[ArcGeometry] {
        &self.arcs
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Deepest non-root node under a centre-relative point.
    pub fn node_at(&self, tree: &Hierarchy, x: f64, y: f64) -> Option<NodeId> {
        let distance = (x * x + y * y).sqrt();
        if distance >= self.radius {
            return None;
        }
        let angle = clockwise_angle(x, y);

        let mut current = tree.root();
        let mut found = None;
        // Descend ring by ring; only one child per ring can hold the angle.
        loop {
            let next = tree.children(current).iter().copied().find(|child| {
                let arc = self.arcs[child.index()];
                angle >= arc.start_angle && angle < arc.end_angle
            });
            let Some(child) = next else {
                break;
            };
            let arc = self.arcs[child.index()];
            if distance < arc.inner_radius {
                break;
            }
            if distance < arc.outer_radius {
                found = Some(child);
            }
            current = child;
        }
        found
    }

    pub fn label_visible(&self, id: NodeId) -> bool {
        id != NodeId::ROOT && self.arcs[id.index()].span() > MIN_LABEL_SPAN
    }
}

/// Radial partition: depth maps to a ring, value to angular span.
pub fn partition(tree: &Hierarchy, config: &PartitionConfig) -> PartitionLayout {
    let mut arcs = vec![ArcGeometry::default(); tree.len()];
    if let Err(error) = check_input(tree, config.radius, config.radius) {
        debug!(%error, "partition layout is empty");
        return PartitionLayout {
            arcs,
            radius: config.radius,
        };
    }

    let band = config.radius.max(0.0) / (tree.height() + 1) as f64;
    let padding = config.padding;
    arcs[0] = ArcGeometry {
        start_angle: 0.0,
        end_angle: TAU,
        inner_radius: 0.0,
        outer_radius: band,
    };

    // Pre-order: a parent's unpadded span is final before its children are diced.
    for id in tree.ids() {
        let parent = arcs[id.index()];
        let depth = tree.node(id).depth as f64;

        let children = tree.ordered_children(id, config.order);
        if !children.is_empty() {
            let value = tree.value(id);
            let scale = if value > 0.0 { parent.span() / value } else { 0.0 };
            // The last valued child absorbs float drift; zero-valued ones stay empty.
            let last = children.iter().rev().copied().find(|child| tree.value(*child) > 0.0);
            let mut angle = parent.start_angle;
            for child in &children {
                let end = if Some(*child) == last {
                    parent.end_angle
                } else {
                    angle + tree.value(*child) * scale
                };
                arcs[child.index()] = ArcGeometry {
                    start_angle: angle,
                    end_angle: end,
                    inner_radius: band * (depth + 1.0),
                    outer_radius: band * (depth + 2.0),
                };
                angle = end;
            }
        }

        let arc = &mut arcs[id.index()];
        apply_padding(arc, padding);
    }

    debug!(nodes = tree.len(), band, "partitioned hierarchy");
    PartitionLayout {
        arcs,
        radius: config.radius,
    }
}

fn apply_padding(arc: &mut ArcGeometry, padding: f64) {
    if padding <= 0.0 {
        return;
    }
    let mut end = arc.end_angle - padding;
    if end < arc.start_angle {
        end = (arc.start_angle + arc.end_angle - padding) / 2.0;
        arc.start_angle = end;
    }
    arc.end_angle = end;

    let mut outer = arc.outer_radius - padding;
    if outer < arc.inner_radius {
        outer = (arc.inner_radius + arc.outer_radius - padding) / 2.0;
        arc.inner_radius = outer;
    }
    arc.outer_radius = outer;
}
