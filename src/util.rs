use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Formats `value` with two significant digits and an SI prefix (`1.4G`, `35k`, `0.0`).
pub fn format_si(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0.0".to_owned();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let step = 10f64.powi(magnitude - 1);
    let rounded = (value / step).round() * step;

    let exponent = ((rounded.abs().log10() + 1e-9) / 3.0)
        .floor()
        .clamp(-8.0, 8.0) as i32;
    let scaled = rounded / 10f64.powi(exponent * 3);
    let integer_digits = (scaled.abs().log10() + 1e-9).floor() as i32 + 1;
    let decimals = (2 - integer_digits).max(0) as usize;
    let prefix = SI_PREFIXES[(exponent + 8) as usize];

    format!("{scaled:.decimals$}{prefix}")
}

/// Formats `value` with comma thousands separators (`1,234,567`, `1,234.5`).
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_owned();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let value = (value.abs() * 100.0).round() / 100.0;
    let whole = value.trunc() as u64;
    let fraction = format!("{:.2}", value.fract());
    let fraction = fraction
        .trim_start_matches('0')
        .trim_end_matches('0')
        .trim_end_matches('.');

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.starts_with('.') && fraction.len() > 1 {
        format!("{sign}{grouped}{fraction}")
    } else {
        format!("{sign}{grouped}")
    }
}

/// Deterministic pseudo-random pair in `[-1, 1]²` for a `(seed, key)` pair.
pub fn stable_pair(seed: u64, key: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Linear congruential generator yielding values in `[0, 1)`.
///
/// Same constants as the classic Numerical Recipes generator, so shuffles seeded
/// with the same state are reproducible across runs.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 1_664_525;
    const INCREMENT: u64 = 1_013_904_223;
    const MODULUS: u64 = 1 << 32;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % Self::MODULUS,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = (Self::MULTIPLIER * self.state + Self::INCREMENT) % Self::MODULUS;
        self.state as f64 / Self::MODULUS as f64
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(1)
    }
}
