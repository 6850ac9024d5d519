//! Summary statistics
//!
//! Pure aggregation over a slice of field values: mean, extrema and population
//! standard deviation, each rounded to four decimal places.

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a value sequence
///
/// The count is reported by the caller alongside this summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (divisor N)
    pub std_dev: f64,
}

/// Round to four decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Compute summary statistics over `values`.
///
/// An empty slice yields an all-zero summary.
pub fn compute_stats(values: &[f64]) -> StatSummary {
    if values.is_empty() {
        return StatSummary::default();
    }

    let n = values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Summation error can push the mean a hair past an extremum
    let avg = (values.iter().sum::<f64>() / n).clamp(min, max);

    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n;

    StatSummary {
        avg: round4(avg),
        min: round4(min),
        max: round4(max),
        std_dev: round4(variance.sqrt()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(
            compute_stats(&[]),
            StatSummary {
                avg: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0
            }
        );
    }

    #[test]
    fn test_single_value() {
        assert_eq!(
            compute_stats(&[5.0]),
            StatSummary {
                avg: 5.0,
                min: 5.0,
                max: 5.0,
                std_dev: 0.0
            }
        );
    }

    #[test]
    fn test_population_std_dev() {
        let stats = compute_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.avg, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        // sqrt(2), not the sample deviation sqrt(2.5)
        assert_eq!(stats.std_dev, 1.4142);
    }

    #[test]
    fn test_rounding() {
        let stats = compute_stats(&[1.0, 2.0]);
        assert_eq!(stats.avg, 1.5);
        assert_eq!(stats.std_dev, 0.5);

        let stats = compute_stats(&[0.1, 0.2, 0.4]);
        assert_eq!(stats.avg, 0.2333);
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.max, 0.4);
        assert_eq!(round4(1.23456), 1.2346);
    }

    #[test]
    fn test_ordering_invariant() {
        let samples: [&[f64]; 4] = [
            &[0.1, 0.1, 0.1],
            &[3.0, -7.5, 12.25, 0.0],
            &[187.3412, 189.0021, 185.77, 190.1],
            &[1e-9, 2e-9],
        ];

        for values in samples {
            let stats = compute_stats(values);
            assert!(stats.min <= stats.avg, "{:?}", values);
            assert!(stats.avg <= stats.max, "{:?}", values);
        }
    }

    #[test]
    fn test_std_dev_zero_iff_constant() {
        assert_eq!(compute_stats(&[42.5; 10]).std_dev, 0.0);
        assert!(compute_stats(&[42.5, 42.5, 43.5]).std_dev > 0.0);
    }

    #[test]
    fn test_large_magnitudes_stay_finite() {
        let volumes: Vec<f64> = (0..10_000).map(|i| 1e10 + i as f64 * 1e5).collect();
        let stats = compute_stats(&volumes);

        assert!(stats.avg.is_finite());
        assert!(stats.std_dev.is_finite());
        assert_eq!(stats.min, 1e10);
        assert_eq!(stats.max, 1e10 + 9_999.0 * 1e5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(compute_stats(&[1.0, 3.0])).unwrap();
        assert_eq!(json["stdDev"], 1.0);
        assert_eq!(json["avg"], 2.0);
    }
}
