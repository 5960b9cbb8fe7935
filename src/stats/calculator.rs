//! Statistics Calculator Module
//! Descriptive statistics behind the distribution charts: quantiles, box
//! summaries, histograms, Gaussian KDE and Pearson correlation.

use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

/// Whisker reach in multiples of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus outliers for one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Equal-width bins; `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    pub fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Box summary with whiskers at the furthest points inside 1.5 IQR.
    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        if values.is_empty() {
            return None;
        }

        let sorted = Self::sorted(values);
        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Equal-width histogram over `[min, max]`; the last bin is closed.
    ///
    /// Returns `None` for empty input or zero bins. A constant sample gets
    /// a unit-wide range centred on the value.
    pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let bin = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Some(Histogram { edges, counts })
    }

    /// Scott's rule bandwidth, `None` when the sample has no spread.
    pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let std = values.iter().std_dev();
        let bw = std * (values.len() as f64).powf(-0.2);
        (bw.is_finite() && bw > 0.0).then_some(bw)
    }

    /// Gaussian KDE evaluated on `points` evenly spaced positions in `[lo, hi]`.
    pub fn gaussian_kde(values: &[f64], lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
        let Some(bandwidth) = Self::scott_bandwidth(values) else {
            return Vec::new();
        };
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };
        if points < 2 || !(hi > lo) {
            return Vec::new();
        }

        let n = values.len() as f64;
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                let density = values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    / (n * bandwidth);
                (x, density)
            })
            .collect()
    }

    /// Pearson correlation over the rows where both values are present.
    ///
    /// `None` when fewer than two paired rows exist or either side is constant.
    pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();
        if pairs.len() < 2 {
            return None;
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for &(x, y) in &pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        if sxx == 0.0 || syy == 0.0 {
            return None;
        }
        Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn box_summary_separates_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = StatsCalculator::box_summary(&values).unwrap();
        assert_eq!(summary.count, 6);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.whisker_high, 5.0);
        assert_eq!(summary.whisker_low, 1.0);
        assert!(StatsCalculator::box_summary(&[]).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let hist = StatsCalculator::histogram(&values, 5).unwrap();
        assert_eq!(hist.counts.len(), 5);
        assert_eq!(hist.edges.len(), 6);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.counts[4], 1);
        assert_eq!(hist.bin_width(), 2.0);
    }

    #[test]
    fn histogram_of_constant_sample() {
        let hist = StatsCalculator::histogram(&[7.0, 7.0], 4).unwrap();
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.edges[0], 6.5);
        assert!(StatsCalculator::histogram(&[1.0], 0).is_none());
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 4.5, 6.0];
        let curve = StatsCalculator::gaussian_kde(&values, -10.0, 20.0, 600);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|p| p.1 * step).sum();
        assert!((area - 1.0).abs() < 0.01, "area was {area}");
        assert!(StatsCalculator::gaussian_kde(&[3.0, 3.0], 0.0, 1.0, 10).is_empty());
    }

    #[test]
    fn pearson_uses_complete_pairs() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), None];
        let ys = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        let r = StatsCalculator::pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let flat = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert_eq!(StatsCalculator::pearson(&flat, &ys), None);
        assert_eq!(StatsCalculator::pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn pearson_detects_negative_relation() {
        let xs = [Some(1.0), Some(2.0), Some(3.0)];
        let ys = [Some(3.0), Some(2.0), Some(1.0)];
        let r = StatsCalculator::pearson(&xs, &ys).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }
}
