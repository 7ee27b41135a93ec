// Resource usage summary across trials
//
// - trueno::Vector for mean, stddev, min, max (SIMD)
// - aprender::stats::DescriptiveStats for the median (R-7 quantile)

use crate::trial::TrialResult;
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Descriptive statistics of one per-trial measurement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SampleStats {
    pub mean: f32,
    pub stddev: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32,
}

impl SampleStats {
    /// Statistics of `samples`; all zero when empty
    pub fn from_samples(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let v = Vector::from_slice(samples);
        Self {
            mean: v.mean().unwrap_or(0.0),
            stddev: v.stddev().unwrap_or(0.0),
            min: v.min().unwrap_or(0.0),
            max: v.max().unwrap_or(0.0),
            median: DescriptiveStats::new(&v).quantile(0.5).unwrap_or(0.0),
        }
    }
}

/// Time (seconds) and space usage reported by the program-under-test
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResourceSummary {
    pub time_secs: SampleStats,
    pub space: SampleStats,
}

impl ResourceSummary {
    pub fn from_results(results: &[TrialResult]) -> Self {
        let times: Vec<f32> = results.iter().map(|r| r.time.as_secs_f32()).collect();
        let spaces: Vec<f32> = results.iter().map(|r| r.space as f32).collect();
        Self {
            time_secs: SampleStats::from_samples(&times),
            space: SampleStats::from_samples(&spaces),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_sample_stats_basic() {
        let stats = SampleStats::from_samples(&[1.0, 3.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.median, 5.0);
        assert!(stats.stddev > 0.0);
    }

    #[test]
    fn test_sample_stats_even_median() {
        let stats = SampleStats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_sample_stats_empty() {
        assert_eq!(SampleStats::from_samples(&[]), SampleStats::default());
    }

    #[test]
    fn test_summary_from_results() {
        let results = vec![
            TrialResult::new(true)
                .with_time(Duration::from_millis(10))
                .with_space(100),
            TrialResult::new(false)
                .with_time(Duration::from_millis(30))
                .with_space(300),
        ];
        let summary = ResourceSummary::from_results(&results);
        assert!((summary.time_secs.mean - 0.02).abs() < 1e-5);
        assert_eq!(summary.space.max, 300.0);
        assert_eq!(summary.space.median, 200.0);
    }
}
