//! Historical baselines for improvement figures.
//!
//! No snapshot history is recorded yet, so "previous score" comes from a
//! provider chosen by configuration. Calculators only see the trait.

use crate::metrics::improvement;

pub trait BaselineProvider: Send + Sync {
    /// Short policy name for logs and `config list`.
    fn name(&self) -> &'static str;

    /// The student's previous score in the class, if one is known.
    fn previous_score(&self, class_id: i64, student_id: i64, current: f64) -> Option<f64>;

    /// Center-wide improvement percentage given today's overall average.
    fn overall_improvement(&self, current_average: f64) -> f64;
}

/// Assumes nothing changed: previous equals current, improvement is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBaseline;

impl BaselineProvider for FlatBaseline {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn previous_score(&self, _class_id: i64, _student_id: i64, current: f64) -> Option<f64> {
        Some(current)
    }

    fn overall_improvement(&self, _current_average: f64) -> f64 {
        0.0
    }
}

/// Demo-only baseline: the previous score is the current one shifted by a
/// deterministic offset in `[-spread, spread]` keyed on (class, student).
///
/// Results are reproducible across calls and never leave `[0, 100]`.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticBaseline {
    spread: f64,
}

impl SyntheticBaseline {
    pub fn new(spread: f64) -> Self {
        Self {
            spread: spread.abs(),
        }
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    fn offset(&self, class_id: i64, student_id: i64) -> f64 {
        // splitmix64 over the packed key, mapped to [-1, 1].
        let mut z = (class_id as u64)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(student_id as u64);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
        (unit * 2.0 - 1.0) * self.spread
    }
}

impl BaselineProvider for SyntheticBaseline {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn previous_score(&self, class_id: i64, student_id: i64, current: f64) -> Option<f64> {
        Some((current - self.offset(class_id, student_id)).clamp(0.0, 100.0))
    }

    fn overall_improvement(&self, current_average: f64) -> f64 {
        let previous = (current_average - self.offset(0, 0)).clamp(0.0, 100.0);
        improvement(current_average, previous)
    }
}
