mod enclose;
mod siblings;

use serde::Deserialize;
use tracing::debug;

use crate::hierarchy::{ChildOrder, Hierarchy, NodeId};
use crate::util::Lcg;

use super::{Circle, LayoutError, check_input};

pub use enclose::enclose;
pub use siblings::pack_siblings;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub width: f64,
    pub height: f64,
    /// Gap between sibling circles, in output units.
    pub padding: f64,
    pub order: ChildOrder,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 700.0,
            padding: 3.0,
            order: ChildOrder::ValueDescending,
        }
    }
}

/// One circle per hierarchy node, indexed by `NodeId`.
#[derive(Clone, Debug)]
pub struct PackLayout {
    circles: Vec<Circle>,
}

impl PackLayout {
    pub fn circle(&self, id: NodeId) -> Circle {
        self.circles[id.index()]
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    /// Deepest node whose disk contains `(x, y)`, optionally ignoring leaves.
    pub fn node_at(&self, tree: &Hierarchy, x: f64, y: f64, include_leaves: bool) -> Option<NodeId> {
        tree.ids()
            .filter(|id| include_leaves || !tree.node(*id).is_leaf())
            .filter(|id| {
                let circle = self.circles[id.index()];
                circle.r > 0.0 && circle.contains_point(x, y)
            })
            .max_by_key(|id| tree.node(*id).depth)
    }
}

/// Nested circle packing of `tree` into a `width × height` canvas.
///
/// Leaf radius is `sqrt(value)` before the final rescale, so leaf areas stay
/// proportional to value. Zero-radius children sit at their parent's centre.
pub fn pack(tree: &Hierarchy, config: &PackConfig) -> PackLayout {
    let center_x = config.width / 2.0;
    let center_y = config.height / 2.0;
    let mut circles = vec![Circle::new(center_x, center_y, 0.0); tree.len()];

    if let Err(LayoutError::DegenerateCanvas) = check_input(tree, config.width, config.height) {
        debug!("circle pack skipped: degenerate canvas");
        return PackLayout { circles };
    }

    for id in tree.leaves() {
        circles[id.index()].r = tree.value(id).max(0.0).sqrt();
    }

    let side = config.width.min(config.height);
    let mut random = Lcg::default();
    pack_pass(tree, config.order, &mut circles, 0.0, &mut random);
    let padding_scale = circles[0].r / side;
    pack_pass(tree, config.order, &mut circles, config.padding * padding_scale, &mut random);

    let root_radius = circles[0].r;
    let scale = if root_radius > 0.0 {
        side / (2.0 * root_radius)
    } else {
        0.0
    };

    circles[0] = Circle::new(center_x, center_y, root_radius * scale);
    for id in tree.ids().skip(1) {
        let Some(parent) = tree.parent(id) else {
            continue;
        };
        let origin = circles[parent.index()];
        let circle = &mut circles[id.index()];
        circle.r *= scale;
        circle.x = origin.x + scale * circle.x;
        circle.y = origin.y + scale * circle.y;
    }

    debug!(
        nodes = tree.len(),
        radius = circles[0].r,
        "packed hierarchy"
    );
    PackLayout { circles }
}

/// Post-order pass sizing every internal node around its packed children.
/// Child positions are left relative to the parent centre.
fn pack_pass(
    tree: &Hierarchy,
    order: ChildOrder,
    circles: &mut [Circle],
    padding: f64,
    random: &mut Lcg,
) {
    for index in (0..tree.len()).rev() {
        let id = NodeId(index);
        if tree.node(id).is_leaf() {
            continue;
        }

        let mut members = Vec::new();
        for child in tree.ordered_children(id, order) {
            let circle = &mut circles[child.index()];
            circle.x = 0.0;
            circle.y = 0.0;
            if circle.r > 0.0 {
                members.push(child);
            }
        }

        if members.is_empty() {
            circles[index].r = 0.0;
            continue;
        }

        let mut local = members
            .iter()
            .map(|child| {
                let circle = circles[child.index()];
                Circle::new(0.0, 0.0, circle.r + padding)
            })
            .collect::<Vec<_>>();
        let enclosing = pack_siblings(&mut local, random);

        for (child, placed) in members.iter().zip(&local) {
            let circle = &mut circles[child.index()];
            circle.x = placed.x;
            circle.y = placed.y;
        }
        circles[index].r = enclosing + padding;
    }
}
