//! Chart models: each one owns its data model, layout, viewport and
//! interaction state, and exposes enough geometry for the host to draw it
//! without re-deriving anything.

mod circle_pack;
mod donut;
mod force_graph;
mod line_chart;
mod stacked_bar;
mod sunburst;
mod treemap;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;

use crate::config::GalleryConfig;
use crate::data::{GraphDocument, Record, load_graph, load_records};
use crate::hierarchy::{Hierarchy, HierarchyBuilder, NodeId, field, numeric_field};
use crate::interaction::Tooltip;
use crate::layout::Rect;
use crate::util::{format_si, format_thousands};

pub use circle_pack::{CirclePackChart, CirclePackConfig};
pub use donut::{AGE_GROUPS, DonutChart, DonutConfig, DonutPanel, SliceId, SliceLabel};
pub use force_graph::{ForceGraphChart, ForceGraphConfig};
pub use line_chart::{LineChartConfig, LineSeries, Marker, MarkerId, MultiLineChart, SeriesKind};
pub use stacked_bar::{StackedBarChart, StackedBarConfig, StackedBar};
pub use sunburst::{SunburstChart, SunburstConfig};
pub use treemap::{TreemapChart, TreemapChartConfig, TreemapYear};

/// Gallery entries, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    CirclePack,
    Sunburst,
    Treemap,
    ForceGraph,
    MultiLine,
    StackedBar,
    Donut,
}

impl ChartKind {
    pub const ALL: [Self; 7] = [
        Self::CirclePack,
        Self::Sunburst,
        Self::Treemap,
        Self::ForceGraph,
        Self::MultiLine,
        Self::StackedBar,
        Self::Donut,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::CirclePack => "Circle Packing - Land Area by Biome",
            Self::Sunburst => "Sunburst - World Population",
            Self::Treemap => "Treemap - Population by Age and Gender",
            Self::ForceGraph => "Force-Directed Graph",
            Self::MultiLine => "Multi-Line Chart - Population and GDP per Capita",
            Self::StackedBar => "Stacked Bar Chart - CO2 Emissions",
            Self::Donut => "Donut Chart - Age Distribution in 1960 & 2023",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CirclePack => "Circle packing",
            Self::Sunburst => "Sunburst",
            Self::Treemap => "Treemap",
            Self::ForceGraph => "Force graph",
            Self::MultiLine => "Multi-line",
            Self::StackedBar => "Stacked bar",
            Self::Donut => "Donut",
        }
    }

    /// Files read from the data directory, in load order.
    pub fn data_files(self) -> &'static [&'static str] {
        match self {
            Self::CirclePack => &["circle_pack.json"],
            Self::Sunburst => &["sunburst.json"],
            Self::Treemap => &["treemap.json"],
            Self::ForceGraph => &["force.json"],
            Self::MultiLine => &["gdp.json", "population.json"],
            Self::StackedBar => &["co2.json"],
            Self::Donut => &["donut.json"],
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw inputs of one chart, as read from disk.
#[derive(Clone, Debug)]
pub enum ChartData {
    Records(Vec<Record>),
    Graph(GraphDocument),
    Pair(Vec<Record>, Vec<Record>),
}

impl ChartData {
    /// Reads every file `kind` needs from `data_dir`.
    pub fn load(kind: ChartKind, data_dir: &Path) -> Result<Self> {
        let path = |name: &str| data_dir.join(name);
        Ok(match kind {
            ChartKind::ForceGraph => Self::Graph(load_graph(&path("force.json"))?),
            ChartKind::MultiLine => Self::Pair(
                load_records(&path("gdp.json"))?,
                load_records(&path("population.json"))?,
            ),
            _ => {
                let [name] = kind.data_files() else {
                    anyhow::bail!("{kind} expects a single data file");
                };
                Self::Records(load_records(&path(*name))?)
            }
        })
    }
}

/// A mounted chart.
pub enum Chart {
    CirclePack(Box<CirclePackChart>),
    Sunburst(Box<SunburstChart>),
    Treemap(Box<TreemapChart>),
    ForceGraph(Box<ForceGraphChart>),
    MultiLine(Box<MultiLineChart>),
    StackedBar(Box<StackedBarChart>),
    Donut(Box<DonutChart>),
}

impl Chart {
    pub fn build(kind: ChartKind, data: ChartData, config: &GalleryConfig) -> Result<Self> {
        Ok(match (kind, data) {
            (ChartKind::CirclePack, ChartData::Records(rows)) => {
                Self::CirclePack(Box::new(CirclePackChart::new(&rows, &config.circle_pack)))
            }
            (ChartKind::Sunburst, ChartData::Records(rows)) => {
                Self::Sunburst(Box::new(SunburstChart::new(&rows, &config.sunburst)))
            }
            (ChartKind::Treemap, ChartData::Records(rows)) => {
                Self::Treemap(Box::new(TreemapChart::new(rows, &config.treemap)))
            }
            (ChartKind::ForceGraph, ChartData::Graph(document)) => {
                Self::ForceGraph(Box::new(ForceGraphChart::new(&document, &config.force_graph)))
            }
            (ChartKind::MultiLine, ChartData::Pair(gdp, population)) => Self::MultiLine(Box::new(
                MultiLineChart::new(&gdp, &population, &config.multi_line),
            )),
            (ChartKind::StackedBar, ChartData::Records(rows)) => {
                Self::StackedBar(Box::new(StackedBarChart::new(&rows, &config.stacked_bar)))
            }
            (ChartKind::Donut, ChartData::Records(rows)) => {
                Self::Donut(Box::new(DonutChart::new(&rows, &config.donut)))
            }
            (kind, _) => anyhow::bail!("data shape does not match the {kind} chart"),
        })
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Self::CirclePack(_) => ChartKind::CirclePack,
            Self::Sunburst(_) => ChartKind::Sunburst,
            Self::Treemap(_) => ChartKind::Treemap,
            Self::ForceGraph(_) => ChartKind::ForceGraph,
            Self::MultiLine(_) => ChartKind::MultiLine,
            Self::StackedBar(_) => ChartKind::StackedBar,
            Self::Donut(_) => ChartKind::Donut,
        }
    }

    /// The chart's tooltip, in its own canvas coordinates.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        match self {
            Self::CirclePack(chart) => chart.tooltip(),
            Self::Sunburst(chart) => chart.tooltip(),
            Self::Treemap(chart) => chart.tooltip(),
            Self::ForceGraph(chart) => chart.tooltip(),
            Self::MultiLine(chart) => chart.tooltip(),
            Self::StackedBar(_) => None,
            Self::Donut(chart) => chart.tooltip(),
        }
    }
}

/// Space around an axis chart's plot area.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Plot area of a `width × height` canvas, in canvas coordinates.
    pub fn plot_area(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            self.left,
            self.top,
            (width - self.right).max(self.left),
            (height - self.bottom).max(self.top),
        )
    }
}

/// Which record fields turn rows into a chart's tree.
#[derive(Clone, Debug, Deserialize)]
pub struct HierarchyFields {
    pub root: String,
    pub group_by: Vec<String>,
    /// With a leaf field every row becomes its own leaf.
    pub leaf: Option<String>,
    pub value: String,
}

impl HierarchyFields {
    pub fn new(root: &str, group_by: &[&str], leaf: Option<&str>, value: &str) -> Self {
        Self {
            root: root.to_owned(),
            group_by: group_by.iter().map(|key| (*key).to_owned()).collect(),
            leaf: leaf.map(str::to_owned),
            value: value.to_owned(),
        }
    }

    pub fn build(&self, rows: &[Record]) -> Hierarchy {
        let mut builder = HierarchyBuilder::new(self.root.clone());
        for key in &self.group_by {
            builder = builder.group_by(field(key));
        }
        if let Some(leaf) = &self.leaf {
            builder = builder.leaf_name(field(leaf));
        }
        builder.value(numeric_field(&self.value)).build(rows)
    }
}

/// `"World > Asia > India: 1.4G"`.
pub(crate) fn si_breadcrumb(tree: &Hierarchy, id: NodeId) -> String {
    format!("{}: {}", tree.breadcrumb(id, " > "), format_si(tree.value(id)))
}

/// `"World > Asia\nArea: 1,234 sq km"`.
pub(crate) fn thousands_breadcrumb(tree: &Hierarchy, id: NodeId, label: &str, unit: &str) -> String {
    format!(
        "{}\n{label}: {} {unit}",
        tree.breadcrumb(id, " > "),
        format_thousands(tree.value(id))
    )
}
