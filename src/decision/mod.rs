// Statistical decision engine
//
// Decides, with a stated significance level, whether observed outcome
// frequencies are consistent with an expected distribution. The test is
// framed as a contingency table (groups x categories) so the same code path
// handles a single two-outcome probability clause, multi-category outcomes
// and multi-group comparisons.
//
// Pipeline:
//   table -> frequency filter (drop all-zero categories)
//         -> degeneracy check (>= 2x2, no empty group)
//         -> power-divergence statistic (+ Yates for 2x2)
//         -> chi-squared p-value (statrs)
//         -> accept iff p >= alpha

mod contingency;
mod divergence;
mod engine;
mod frequency_filter;
mod verdict;

pub use contingency::ContingencyTable;
pub use divergence::{yates_correct, PowerDivergence};
pub use engine::{chi_squared_sf, contingency_test, decide, expected_frequencies, ContingencyTest};
pub use frequency_filter::{filter_zero_columns, zero_columns};
pub use verdict::{Verdict, VerdictDetail};

use thiserror::Error;

/// Errors from table construction and the decision procedure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// No valid contingency test can be formed. This means "cannot
    /// compute", never "property false".
    #[error(
        "degenerate contingency table: {reason} (table {original_rows}x{original_cols}, \
         {rows}x{cols} after removing all-zero categories)"
    )]
    DegenerateTable {
        rows: usize,
        cols: usize,
        original_rows: usize,
        original_cols: usize,
        reason: String,
    },

    #[error("ragged contingency table: row {row} has {found} cells, expected {expected}")]
    RaggedTable {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("contingency table has {found} {what} labels for {expected} {what}s")]
    LabelMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("expected frequency is zero at cell ({row}, {column}); a marginal total is zero")]
    ZeroExpected { row: usize, column: usize },

    #[error("significance level must be in (0, 1), got {0}")]
    InvalidSignificance(f64),

    #[error("target probability must be in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("chi-squared distribution error: {0}")]
    Distribution(String),
}
