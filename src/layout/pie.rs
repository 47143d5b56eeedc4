use std::f64::consts::TAU;

use serde::Deserialize;

use crate::hierarchy::ChildOrder;

use super::ArcGeometry;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PieConfig {
    /// `ValueDescending` allocates the largest value first; `Stored` keeps input order.
    pub order: ChildOrder,
    pub pad_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            order: ChildOrder::ValueDescending,
            pad_angle: 0.0,
            inner_radius: 0.0,
            outer_radius: 100.0,
        }
    }
}

/// One arc per input value, returned in input order.
///
/// Non-positive values get a zero span; with an all-zero input every arc is
/// empty.
pub fn pie(values: &[f64], config: &PieConfig) -> Vec<ArcGeometry> {
    let count = values.len();
    let mut arcs = vec![
        ArcGeometry {
            inner_radius: config.inner_radius,
            outer_radius: config.outer_radius,
            ..ArcGeometry::default()
        };
        count
    ];
    if count == 0 {
        return arcs;
    }

    let pad = config.pad_angle.clamp(0.0, TAU / count as f64);
    let total: f64 = values.iter().filter(|value| **value > 0.0).sum();
    let scale = if total > 0.0 {
        (TAU - count as f64 * pad) / total
    } else {
        0.0
    };

    let mut order = (0..count).collect::<Vec<_>>();
    if config.order == ChildOrder::ValueDescending {
        order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
    }

    let mut angle = 0.0;
    for index in order {
        let value = values[index];
        let end = angle + if value > 0.0 { value * scale } else { 0.0 } + pad;
        let arc = &mut arcs[index];
        arc.start_angle = angle;
        arc.end_angle = end;
        angle = end;
    }
    arcs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_value_starts_at_twelve_oclock() {
        let arcs = pie(&[1.0, 3.0], &PieConfig::default());
        assert_eq!(arcs[1].start_angle, 0.0);
        assert!((arcs[1].end_angle - TAU * 0.75).abs() < 1e-12);
        assert!((arcs[0].end_angle - TAU).abs() < 1e-12);
    }

    #[test]
    fn stored_order_keeps_input_sequence() {
        let config = PieConfig {
            order: ChildOrder::Stored,
            ..PieConfig::default()
        };
        let arcs = pie(&[1.0, 3.0], &config);
        assert_eq!(arcs[0].start_angle, 0.0);
        assert!((arcs[0].end_angle - TAU * 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_total_gives_empty_arcs() {
        let arcs = pie(&[0.0, 0.0], &PieConfig::default());
        assert!(arcs.iter().all(|arc| arc.span() == 0.0));
        assert!(pie(&[], &PieConfig::default()).is_empty());
    }

    #[test]
    fn padding_is_distributed_between_arcs() {
        let config = PieConfig {
            pad_angle: 0.1,
            ..PieConfig::default()
        };
        let arcs = pie(&[1.0, 1.0, 2.0], &config);
        let total: f64 = arcs.iter().map(ArcGeometry::span).sum();
        assert!((total - TAU).abs() < 1e-12);
    }
}
