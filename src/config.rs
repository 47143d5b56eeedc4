use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::charts::{
    CirclePackConfig, DonutConfig, ForceGraphConfig, LineChartConfig, StackedBarConfig,
    SunburstConfig, TreemapChartConfig,
};

/// Per-chart settings. Every section is optional in the file; missing
/// sections and fields keep their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub circle_pack: CirclePackConfig,
    pub sunburst: SunburstConfig,
    pub treemap: TreemapChartConfig,
    pub force_graph: ForceGraphConfig,
    pub multi_line: LineChartConfig,
    pub stacked_bar: StackedBarConfig,
    pub donut: DonutConfig,
}

impl GalleryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!(path = %path.display(), "loaded gallery config");
        Ok(config)
    }

    /// Overrides the seed of every seeded layout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.force_graph.simulation.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config: GalleryConfig = serde_json::from_str(
            r#"{
                "force_graph": {"simulation": {"link_distance": 60}},
                "treemap": {"year": "1960"},
                "stacked_bar": {"default_years": [2000, 2010]}
            }"#,
        )
        .unwrap();

        assert_eq!(config.force_graph.simulation.link_distance, 60.0);
        assert_eq!(config.force_graph.simulation.charge_strength, -200.0);
        assert_eq!(config.force_graph.viewport.max_scale, 2.0);
        assert_eq!(config.treemap.year, crate::charts::TreemapYear::Y1960);
        assert_eq!(config.stacked_bar.default_years, [2000, 2010]);
        assert_eq!(config.circle_pack.zoom_duration_ms, 750.0);
        assert_eq!(config.multi_line.years, [1960, 2023]);
    }

    #[test]
    fn seed_override_reaches_the_simulation() {
        let config = GalleryConfig::default().with_seed(42);
        assert_eq!(config.force_graph.simulation.seed, 42);
    }

    #[test]
    fn missing_file_is_an_error() {
        let error = GalleryConfig::load(Path::new("/nonexistent/gallery.json")).unwrap_err();
        assert!(error.to_string().contains("failed to read config"));
    }
}
