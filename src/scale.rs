//! Data-to-pixel mappings for the axis-based charts.

use serde::Deserialize;

use crate::viewport::ViewportTransform;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Continuous linear mapping from `domain` onto `range`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    #[serde(default)]
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return r0;
        }
        let mut t = (value - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if r1 == r0 {
            return d0;
        }
        let mut t = (pixel - r0) / (r1 - r0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        d0 + t * (d1 - d0)
    }

    /// Round tick values: steps of 1, 2 or 5 times a power of ten, roughly
    /// `count` of them inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let [d0, d1] = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let step = tick_step(lo, hi, count);
        if step.is_nan() || step <= 0.0 {
            return Vec::new();
        }
        // Integer multiples avoid accumulated rounding drift.
        let (first, last) = ((lo / step).ceil() as i64, (hi / step).floor() as i64);
        let mut ticks = (first..=last)
            .map(|i| {
                if step >= 1.0 {
                    i as f64 * step
                } else {
                    i as f64 / (1.0 / step).round()
                }
            })
            .collect::<Vec<_>>();
        if d0 > d1 {
            ticks.reverse();
        }
        ticks
    }

    /// This scale seen through a zoom transform along `axis`: the domain becomes
    /// whatever data interval is now visible across the range.
    pub fn rescale(&self, transform: &ViewportTransform, axis: Axis) -> Self {
        let [r0, r1] = self.range;
        let invert = |pixel: f64| match axis {
            Axis::X => transform.invert_x(pixel),
            Axis::Y => transform.invert_y(pixel),
        };
        Self {
            domain: [self.invert(invert(r0)), self.invert(invert(r1))],
            range: self.range,
            clamp: self.clamp,
        }
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = 10f64.powi(raw.log10().floor() as i32);
    let error = raw / power;
    if error >= 50f64.sqrt() {
        power * 10.0
    } else if error >= 10f64.sqrt() {
        power * 5.0
    } else if error >= 2f64.sqrt() {
        power * 2.0
    } else {
        power
    }
}

/// Discrete bands with uniform inner and outer padding, centred in the range.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale<K> {
    pub domain: Vec<K>,
    pub range: [f64; 2],
    /// Fraction of a step left empty between and around bands.
    pub padding: f64,
}

impl<K: PartialEq> BandScale<K> {
    pub fn new(domain: Vec<K>, range: [f64; 2], padding: f64) -> Self {
        Self {
            domain,
            range,
            padding,
        }
    }

    pub fn step(&self) -> f64 {
        let count = self.domain.len() as f64;
        let span = self.range[1] - self.range[0];
        span / (count - self.padding + self.padding * 2.0).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of `key`'s band.
    pub fn position(&self, key: &K) -> Option<f64> {
        let index = self.domain.iter().position(|candidate| candidate == key)?;
        Some(self.start() + self.step() * index as f64)
    }

    pub fn center(&self, key: &K) -> Option<f64> {
        self.position(key).map(|x| x + self.bandwidth() / 2.0)
    }

    /// Band whose full step contains `pixel`.
    pub fn key_at(&self, pixel: f64) -> Option<&K> {
        let step = self.step();
        if step <= 0.0 {
            return None;
        }
        let offset = pixel - self.start() + step * self.padding / 2.0;
        if offset < 0.0 {
            return None;
        }
        self.domain.get((offset / step) as usize)
    }

    fn start(&self) -> f64 {
        let count = self.domain.len() as f64;
        let span = self.range[1] - self.range[0];
        self.range[0] + (span - self.step() * (count - self.padding)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_and_inverts() {
        let scale = LinearScale::new([0.0, 10.0], [100.0, 0.0]);
        assert_eq!(scale.apply(5.0), 50.0);
        assert_eq!(scale.invert(25.0), 7.5);
        assert_eq!(scale.apply(20.0), -100.0);
        assert_eq!(scale.clamped().apply(20.0), 0.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let scale = LinearScale::new([3.0, 3.0], [10.0, 20.0]);
        assert_eq!(scale.apply(3.0), 10.0);
        assert_eq!(scale.apply(99.0), 10.0);
    }

    #[test]
    fn ticks_use_round_steps() {
        let scale = LinearScale::new([0.0, 1.0], [0.0, 100.0]);
        assert_eq!(
            scale.ticks(5),
            [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        );
        let years = LinearScale::new([1960.0, 2023.0], [0.0, 100.0]);
        assert_eq!(years.ticks(6).first(), Some(&1960.0));
        assert_eq!(years.ticks(6).last(), Some(&2020.0));
    }

    #[test]
    fn rescale_follows_zoom() {
        let scale = LinearScale::new([0.0, 100.0], [0.0, 500.0]);
        let zoomed = ViewportTransform::new(2.0, -250.0, 0.0);
        let rescaled = scale.rescale(&zoomed, Axis::X);
        assert!((rescaled.domain[0] - 25.0).abs() < 1e-9);
        assert!((rescaled.domain[1] - 75.0).abs() < 1e-9);
        assert_eq!(scale.rescale(&ViewportTransform::IDENTITY, Axis::X), scale);
    }

    #[test]
    fn bands_are_centred_with_padding() {
        let bands = BandScale::new(vec![1990, 1991, 1992], [0.0, 330.0], 0.1);
        let step = bands.step();
        assert!((step - 330.0 / 3.1).abs() < 1e-9);
        assert!((bands.position(&1990).unwrap() - step * 0.1).abs() < 1e-9);
        assert!((bands.bandwidth() - step * 0.9).abs() < 1e-9);
        assert_eq!(bands.position(&2000), None);

        let centre = bands.center(&1991).unwrap();
        assert_eq!(bands.key_at(centre), Some(&1991));
    }
}
