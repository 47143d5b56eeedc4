use serde::Deserialize;
use tracing::debug;

use crate::hierarchy::{ChildOrder, Hierarchy, NodeId};

use super::{Rect, check_input};

/// Golden ratio, the squarify target aspect.
pub const PHI: f64 = 1.618_033_988_749_895;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    pub width: f64,
    pub height: f64,
    /// Outer padding inside each parent and inner padding between siblings.
    pub padding: f64,
    pub round: bool,
    pub ratio: f64,
    pub order: ChildOrder,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            padding: 2.0,
            round: true,
            ratio: PHI,
            order: ChildOrder::ValueDescending,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TreemapLayout {
    rects: Vec<Rect>,
}

impl TreemapLayout {
    pub fn rect(&self, id: NodeId) -> Rect {
        self.rects[id.index()]
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn leaf_at(&self, tree: &Hierarchy, x: f64, y: f64) -> Option<NodeId> {
        tree.leaves()
            .filter(|id| *id != NodeId::ROOT)
            .find(|id| self.rects[id.index()].contains_point(x, y))
    }

    pub fn label_visible(&self, id: NodeId) -> bool {
        let rect = self.rects[id.index()];
        rect.width() > 60.0 && rect.height() > 30.0
    }
}

/// Squarified treemap with nested padding.
pub fn treemap(tree: &Hierarchy, config: &TreemapConfig) -> TreemapLayout {
    let mut rects = vec![Rect::default(); tree.len()];
    if let Err(error) = check_input(tree, config.width, config.height) {
        debug!(%error, "treemap layout is empty");
        return TreemapLayout { rects };
    }

    rects[0] = Rect::new(0.0, 0.0, config.width, config.height);
    // Half the inner padding, per depth: applied around each child.
    let mut padding_stack = vec![0.0; tree.height() + 2];

    for id in tree.ids() {
        let depth = tree.node(id).depth;
        let inset = padding_stack[depth];
        let mut rect = rects[id.index()];
        rect = shrink(rect, inset, inset);
        rects[id.index()] = rect;

        let children = tree.ordered_children(id, config.order);
        if children.is_empty() {
            continue;
        }

        let half = config.padding / 2.0;
        padding_stack[depth + 1] = half;
        let inner = shrink(rect, config.padding - half, config.padding - half);
        squarify(tree, &children, tree.value(id), config.ratio, inner, &mut rects);
    }

    if config.round {
        for rect in &mut rects {
            *rect = Rect::new(rect.x0.round(), rect.y0.round(), rect.x1.round(), rect.y1.round());
        }
    }

    debug!(nodes = tree.len(), "tiled treemap");
    TreemapLayout { rects }
}

/// Insets `rect`, collapsing to the midline when the inset exceeds it.
fn shrink(rect: Rect, dx: f64, dy: f64) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (rect.x0 + dx, rect.y0 + dy, rect.x1 - dx, rect.y1 - dy);
    if x1 < x0 {
        x0 = (x0 + x1) / 2.0;
        x1 = x0;
    }
    if y1 < y0 {
        y0 = (y0 + y1) / 2.0;
        y1 = y0;
    }
    Rect::new(x0, y0, x1, y1)
}

/// Lays `children` out in rows, growing each row while its worst aspect
/// ratio does not get worse. Rows run along the shorter side.
fn squarify(
    tree: &Hierarchy,
    children: &[NodeId],
    total: f64,
    ratio: f64,
    area: Rect,
    rects: &mut [Rect],
) {
    let Rect { mut x0, mut y0, x1, y1 } = area;
    let mut value = total;
    let count = children.len();
    let (mut i0, mut i1) = (0, 0);

    while i0 < count {
        let (dx, dy) = (x1 - x0, y1 - y0);

        let mut sum = tree.value(children[i1]);
        i1 += 1;
        while sum == 0.0 && i1 < count {
            sum = tree.value(children[i1]);
            i1 += 1;
        }

        let (mut min_value, mut max_value) = (sum, sum);
        let alpha = (dy / dx).max(dx / dy) / (value * ratio);
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        while i1 < count {
            let node_value = tree.value(children[i1]);
            sum += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum * sum * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &children[i0..i1];
        if dx < dy {
            let row_y1 = if value > 0.0 { y0 + dy * sum / value } else { y1 };
            dice(tree, row, sum, Rect::new(x0, y0, x1, row_y1), rects);
            y0 = row_y1;
        } else {
            let row_x1 = if value > 0.0 { x0 + dx * sum / value } else { x1 };
            slice(tree, row, sum, Rect::new(x0, y0, row_x1, y1), rects);
            x0 = row_x1;
        }
        value -= sum;
        i0 = i1;
    }
}

/// Splits `area` horizontally in proportion to value.
fn dice(tree: &Hierarchy, row: &[NodeId], total: f64, area: Rect, rects: &mut [Rect]) {
    let scale = if total > 0.0 { area.width() / total } else { 0.0 };
    let mut x = area.x0;
    for id in row {
        let x1 = x + tree.value(*id) * scale;
        rects[id.index()] = Rect::new(x, area.y0, x1, area.y1);
        x = x1;
    }
}

/// Splits `area` vertically in proportion to value.
fn slice(tree: &Hierarchy, row: &[NodeId], total: f64, area: Rect, rects: &mut [Rect]) {
    let scale = if total > 0.0 { area.height() / total } else { 0.0 };
    let mut y = area.y0;
    for id in row {
        let y1 = y + tree.value(*id) * scale;
        rects[id.index()] = Rect::new(area.x0, y, area.x1, y1);
        y = y1;
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{FieldValue, Record};
    use crate::hierarchy::{HierarchyBuilder, field, numeric_field};

    use super::*;

    fn sample() -> Hierarchy {
        let rows = [
            ("Asia", "China", 1410.0),
            ("Asia", "India", 1430.0),
            ("Asia", "Japan", 125.0),
            ("Europe", "Germany", 84.0),
            ("Europe", "France", 68.0),
            ("Europe", "Italy", 59.0),
            ("Africa", "Nigeria", 223.0),
            ("Africa", "Egypt", 112.0),
        ]
        .into_iter()
        .map(|(continent, country, value)| {
            Record::from_iter([
                ("Continent", FieldValue::from(continent)),
                ("Country", FieldValue::from(country)),
                ("value", FieldValue::from(value)),
            ])
        })
        .collect::<Vec<_>>();
        HierarchyBuilder::new("World")
            .group_by(field("Continent"))
            .group_by(field("Country"))
            .value(numeric_field("value"))
            .build(&rows)
    }

    #[test]
    fn unpadded_children_tile_the_parent() {
        let tree = sample();
        let config = TreemapConfig {
            padding: 0.0,
            round: false,
            ..TreemapConfig::default()
        };
        let layout = treemap(&tree, &config);

        for id in tree.ids().filter(|id| !tree.node(*id).is_leaf()) {
            let parent = layout.rect(id).area();
            let children: f64 = tree.children(id).iter().map(|c| layout.rect(*c).area()).sum();
            assert!((parent - children).abs() < 1e-6 * parent.max(1.0));
        }
    }

    #[test]
    fn areas_are_proportional_to_value() {
        let tree = sample();
        let config = TreemapConfig {
            padding: 0.0,
            round: false,
            ..TreemapConfig::default()
        };
        let layout = treemap(&tree, &config);
        let total = 960.0 * 600.0 / tree.value(tree.root());
        for leaf in tree.leaves() {
            let expected = tree.value(leaf) * total;
            assert!((layout.rect(leaf).area() - expected).abs() < 1e-6 * expected);
        }
    }

    #[test]
    fn padded_rounded_siblings_do_not_overlap() {
        let tree = sample();
        let layout = treemap(&tree, &TreemapConfig::default());
        for id in tree.ids() {
            let children = tree.children(id);
            for (i, a) in children.iter().enumerate() {
                for b in &children[i + 1..] {
                    assert!(!layout.rect(*a).overlaps(&layout.rect(*b)));
                }
            }
            for child in children {
                let (outer, inner) = (layout.rect(id), layout.rect(*child));
                assert!(inner.x0 >= outer.x0 && inner.x1 <= outer.x1);
                assert!(inner.y0 >= outer.y0 && inner.y1 <= outer.y1);
            }
        }
        for rect in layout.rects() {
            assert_eq!(rect.x0, rect.x0.round());
        }
    }

    #[test]
    fn leaf_hit_test_and_label_filter() {
        let tree = sample();
        let layout = treemap(&tree, &TreemapConfig::default());
        let india = tree.ids().find(|id| tree.node(*id).name == "India").unwrap();
        let rect = layout.rect(india);
        let hit = layout.leaf_at(&tree, (rect.x0 + rect.x1) / 2.0, (rect.y0 + rect.y1) / 2.0);
        assert_eq!(hit, Some(india));
        assert!(layout.label_visible(india));
    }

    #[test]
    fn empty_tree_has_no_geometry() {
        let tree = Hierarchy::empty("World");
        let layout = treemap(&tree, &TreemapConfig::default());
        assert_eq!(layout.rect(tree.root()).area(), 0.0);
    }
}
