use serde::Deserialize;
use tracing::debug;

use crate::data::Record;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::interaction::{InteractionEvent, InteractionOutcome, InteractionState, Tooltip};
use crate::layout::{Rect, TreemapConfig, TreemapLayout, treemap};
use crate::util::format_si;

use super::{HierarchyFields, si_breadcrumb};

/// Which census column sizes the tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum TreemapYear {
    #[serde(rename = "1960")]
    Y1960,
    #[default]
    #[serde(rename = "2023")]
    Y2023,
}

impl TreemapYear {
    pub const ALL: [Self; 2] = [Self::Y1960, Self::Y2023];

    pub fn label(self) -> &'static str {
        match self {
            Self::Y1960 => "1960",
            Self::Y2023 => "2023",
        }
    }

    pub fn value_field(self) -> &'static str {
        match self {
            Self::Y1960 => "Population 1960",
            Self::Y2023 => "Population 2023",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TreemapChartConfig {
    pub root: String,
    pub group_by: Vec<String>,
    pub leaf: String,
    pub year: TreemapYear,
    pub layout: TreemapConfig,
}

impl Default for TreemapChartConfig {
    fn default() -> Self {
        Self {
            root: "World".to_owned(),
            group_by: vec!["Country".to_owned(), "Age Group".to_owned()],
            leaf: "Gender".to_owned(),
            year: TreemapYear::default(),
            layout: TreemapConfig {
                width: 1000.0,
                height: 600.0,
                ..TreemapConfig::default()
            },
        }
    }
}

impl TreemapChartConfig {
    fn fields(&self, year: TreemapYear) -> HierarchyFields {
        HierarchyFields {
            root: self.root.clone(),
            group_by: self.group_by.clone(),
            leaf: Some(self.leaf.clone()),
            value: year.value_field().to_owned(),
        }
    }
}

/// Treemap whose value column can be switched at runtime.
pub struct TreemapChart {
    rows: Vec<Record>,
    config: TreemapChartConfig,
    year: TreemapYear,
    tree: Hierarchy,
    layout: TreemapLayout,
    interaction: InteractionState<NodeId>,
}

impl TreemapChart {
    pub fn new(rows: Vec<Record>, config: &TreemapChartConfig) -> Self {
        let tree = config.fields(config.year).build(&rows);
        let layout = treemap(&tree, &config.layout);
        Self {
            rows,
            config: config.clone(),
            year: config.year,
            tree,
            layout,
            interaction: InteractionState::new(),
        }
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn year(&self) -> TreemapYear {
        self.year
    }

    pub fn size(&self) -> (f64, f64) {
        (self.config.layout.width, self.config.layout.height)
    }

    /// Rebuilds the tree with the other value column and re-tiles it.
    pub fn set_year(&mut self, year: TreemapYear) {
        if year == self.year {
            return;
        }
        self.year = year;
        self.tree = self.config.fields(year).build(&self.rows);
        self.layout = treemap(&self.tree, &self.config.layout);
        self.interaction.reset();
        debug!(year = year.label(), "treemap value column switched");
    }

    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, Rect)> + '_ {
        self.tree
            .leaves()
            .filter(|id| *id != NodeId::ROOT)
            .map(|id| (id, self.layout.rect(id)))
    }

    /// Top-level group a leaf belongs to; drives its colour.
    pub fn group_of(&self, id: NodeId) -> Option<NodeId> {
        self.tree.ancestor_at_depth(id, 1)
    }

    /// Two label lines (group name, then `"leaf: value"`) when the tile is big
    /// enough to hold them.
    pub fn label(&self, id: NodeId) -> Option<[String; 2]> {
        if !self.layout.label_visible(id) {
            return None;
        }
        let group = self.group_of(id)?;
        let node = self.tree.node(id);
        Some([
            self.tree.node(group).name.clone(),
            format!("{}: {}", node.name, format_si(node.value)),
        ])
    }

    pub fn leaf_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.layout.leaf_at(&self.tree, x, y)
    }

    pub fn interaction(&self) -> &InteractionState<NodeId> {
        &self.interaction
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.interaction.tooltip()
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) -> InteractionOutcome<NodeId> {
        let tree = &self.tree;
        let event = match self.leaf_at(x, y) {
            Some(id) => InteractionEvent::PointerEnter { id, x, y },
            None => InteractionEvent::PointerLeave,
        };
        self.interaction.handle(event, |id| si_breadcrumb(tree, *id))
    }

    pub fn pointer_left(&mut self) -> InteractionOutcome<NodeId> {
        self.interaction.handle(InteractionEvent::PointerLeave, |_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldValue;

    fn rows() -> Vec<Record> {
        [
            ("India", "0-14", "Male", 100e6, 190e6),
            ("India", "0-14", "Female", 95e6, 175e6),
            ("India", "15-64", "Male", 120e6, 480e6),
            ("Japan", "65+", "Female", 3e6, 20e6),
        ]
        .into_iter()
        .map(|(country, age, gender, early, late)| {
            Record::from_iter([
                ("Country", FieldValue::from(country)),
                ("Age Group", age.into()),
                ("Gender", gender.into()),
                ("Population 1960", early.into()),
                ("Population 2023", late.into()),
            ])
        })
        .collect()
    }

    #[test]
    fn year_switch_rebuilds_the_tree() {
        let mut chart = TreemapChart::new(rows(), &TreemapChartConfig::default());
        assert_eq!(chart.tree().value(NodeId::ROOT), 865e6);

        chart.set_year(TreemapYear::Y1960);
        assert_eq!(chart.year(), TreemapYear::Y1960);
        assert_eq!(chart.tree().value(NodeId::ROOT), 318e6);
        assert_eq!(chart.leaves().count(), 4);
    }

    #[test]
    fn big_tiles_carry_country_and_value() {
        let chart = TreemapChart::new(rows(), &TreemapChartConfig::default());
        let (id, _) = chart
            .leaves()
            .max_by(|a, b| a.1.area().total_cmp(&b.1.area()))
            .unwrap();
        let [country, line] = chart.label(id).unwrap();
        assert_eq!(country, "India");
        assert_eq!(line, "Male: 480M");
    }

    #[test]
    fn hover_finds_the_leaf_under_the_pointer() {
        let mut chart = TreemapChart::new(rows(), &TreemapChartConfig::default());
        let (id, rect) = chart.leaves().next().unwrap();
        chart.pointer_moved((rect.x0 + rect.x1) / 2.0, (rect.y0 + rect.y1) / 2.0);
        assert_eq!(chart.interaction().hovered(), Some(&id));
        assert!(chart.tooltip().unwrap().text.starts_with("World > "));

        chart.pointer_moved(-5.0, -5.0);
        assert!(chart.tooltip().is_none());
    }
}
