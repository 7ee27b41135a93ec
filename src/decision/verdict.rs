// Verdict of a single contingency test

use crate::decision::divergence::PowerDivergence;
use serde::Serialize;

/// Outcome of the statistical decision for one contingency table
///
/// Created once by [`decide`](crate::decision::decide) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// Power-divergence statistic over the filtered table
    pub statistic: f64,

    /// Chi-squared survival function at `statistic`
    pub p_value: f64,

    /// (rows - 1) * (columns - 1) of the filtered table
    pub degrees_of_freedom: usize,

    /// Alpha the p-value was compared against
    pub significance_level: f64,

    /// `p_value >= significance_level`: the null hypothesis (observed
    /// frequencies match the expected distribution) is not rejected
    pub accepted: bool,

    pub detail: VerdictDetail,
}

/// Diagnostics explaining how a verdict was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictDetail {
    /// Shape of the table handed to the engine
    pub original_shape: (usize, usize),

    /// Shape after all-zero categories were removed
    pub filtered_shape: (usize, usize),

    /// Labels of the categories removed by the frequency filter
    pub removed_categories: Vec<String>,

    /// Expected counts under independence for the filtered table
    pub expected: Vec<Vec<f64>>,

    /// Whether Yates' continuity correction was applied
    pub correction_applied: bool,

    pub divergence: PowerDivergence,
}

impl Verdict {
    /// One-line summary, e.g. `ACCEPTED (chi2=0.2917, dof=1, p=0.5892, alpha=0.05)`
    pub fn summary(&self) -> String {
        format!(
            "{} (chi2={:.4}, dof={}, p={:.4}, alpha={})",
            if self.accepted { "ACCEPTED" } else { "REJECTED" },
            self.statistic,
            self.degrees_of_freedom,
            self.p_value,
            self.significance_level
        )
    }
}
