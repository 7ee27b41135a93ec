// Contingency-table hypothesis testing
//
// `contingency_test` is the standard test over a table as given;
// `decide` wraps it with the frequency filter, the degeneracy checks and
// the comparison against alpha.

use crate::decision::contingency::ContingencyTable;
use crate::decision::divergence::{yates_correct, PowerDivergence};
use crate::decision::frequency_filter::{filter_zero_columns, zero_columns};
use crate::decision::verdict::{Verdict, VerdictDetail};
use crate::decision::DecisionError;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of the standard (unfiltered) contingency test
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub expected: Vec<Vec<f64>>,
    pub correction_applied: bool,
}

/// Expected counts under independence: row_total * column_total / total
///
/// Fails with [`DecisionError::ZeroExpected`] if any expected cell is zero,
/// which happens exactly when some row or column total is zero.
pub fn expected_frequencies(table: &ContingencyTable) -> Result<Vec<Vec<f64>>, DecisionError> {
    let row_totals = table.row_totals();
    let column_totals = table.column_totals();
    let total = table.total() as f64;

    let mut expected = Vec::with_capacity(row_totals.len());
    for (i, &row_total) in row_totals.iter().enumerate() {
        let mut row = Vec::with_capacity(column_totals.len());
        for (j, &column_total) in column_totals.iter().enumerate() {
            let e = row_total as f64 * column_total as f64 / total;
            if e.is_nan() || e <= 0.0 {
                return Err(DecisionError::ZeroExpected { row: i, column: j });
            }
            row.push(e);
        }
        expected.push(row);
    }
    Ok(expected)
}

/// Standard chi-squared / power-divergence test of independence
///
/// Statistic is summed over all cells against expected counts from the
/// marginals; degrees of freedom are (rows - 1) * (columns - 1). When
/// `correction` is set and the table has one degree of freedom (2x2),
/// Yates' continuity correction is applied first. A table with zero
/// degrees of freedom yields statistic 0 and p-value 1.
pub fn contingency_test(
    table: &ContingencyTable,
    correction: bool,
    divergence: PowerDivergence,
) -> Result<ContingencyTest, DecisionError> {
    let (rows, cols) = table.shape();
    if rows == 0 || cols == 0 {
        return Err(DecisionError::DegenerateTable {
            rows,
            cols,
            original_rows: rows,
            original_cols: cols,
            reason: "table has no cells".to_string(),
        });
    }

    let expected = expected_frequencies(table)?;
    let degrees_of_freedom = (rows - 1) * (cols - 1);

    if degrees_of_freedom == 0 {
        return Ok(ContingencyTest {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom,
            expected,
            correction_applied: false,
        });
    }

    let observed: Vec<Vec<f64>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|&c| c as f64).collect())
        .collect();

    let correction_applied = correction && degrees_of_freedom == 1;
    let observed = if correction_applied {
        yates_correct(&observed, &expected)
    } else {
        observed
    };

    let statistic = divergence.statistic(&observed, &expected);
    let p_value = chi_squared_sf(statistic, degrees_of_freedom)?;

    Ok(ContingencyTest {
        statistic,
        p_value,
        degrees_of_freedom,
        expected,
        correction_applied,
    })
}

/// P(X >= statistic) for X ~ chi-squared(dof)
pub fn chi_squared_sf(statistic: f64, degrees_of_freedom: usize) -> Result<f64, DecisionError> {
    if statistic.is_nan() {
        return Err(DecisionError::Distribution(
            "test statistic is NaN".to_string(),
        ));
    }
    if statistic == f64::INFINITY {
        return Ok(0.0);
    }
    if statistic <= 0.0 {
        return Ok(1.0);
    }

    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| DecisionError::Distribution(e.to_string()))?;
    Ok(distribution.sf(statistic).clamp(0.0, 1.0))
}

/// Decide whether observed frequencies are consistent with the null hypothesis
///
/// 1. Remove categories no group produced (frequency filter).
/// 2. Fail with [`DecisionError::DegenerateTable`] if fewer than two groups
///    or two categories remain, or a group has no observations.
/// 3. Run [`contingency_test`] with the chosen divergence (Pearson when
///    `divergence` is `None`).
/// 4. Accept iff `p_value >= alpha`.
///
/// # Example
/// ```
/// use stochcheck::decision::{decide, ContingencyTable};
///
/// let table = ContingencyTable::from_rows(vec![vec![0, 5, 3], vec![0, 2, 4]]).unwrap();
/// let verdict = decide(&table, 0.05, true, None).unwrap();
/// assert!(verdict.accepted);
/// assert_eq!(verdict.degrees_of_freedom, 1);
/// ```
pub fn decide(
    table: &ContingencyTable,
    alpha: f64,
    correction: bool,
    divergence: Option<PowerDivergence>,
) -> Result<Verdict, DecisionError> {
    if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(DecisionError::InvalidSignificance(alpha));
    }

    let divergence = divergence.unwrap_or_default();
    let (original_rows, original_cols) = table.shape();
    let removed: Vec<String> = zero_columns(table)
        .into_iter()
        .map(|j| table.categories()[j].clone())
        .collect();
    let filtered = filter_zero_columns(table);
    let (rows, cols) = filtered.shape();

    let degenerate = |reason: String| DecisionError::DegenerateTable {
        rows,
        cols,
        original_rows,
        original_cols,
        reason,
    };

    if rows < 2 {
        return Err(degenerate(format!(
            "{} group(s) remain, a contingency test needs at least 2",
            rows
        )));
    }
    if cols < 2 {
        return Err(degenerate(format!(
            "{} category(ies) remain after removing all-zero columns, a contingency test needs at least 2",
            cols
        )));
    }
    if let Some(i) = filtered.row_totals().iter().position(|&t| t == 0) {
        return Err(degenerate(format!(
            "group `{}` has no observations",
            filtered.groups()[i]
        )));
    }

    let test = contingency_test(&filtered, correction, divergence)?;
    let accepted = test.p_value >= alpha;

    tracing::debug!(
        statistic = test.statistic,
        p_value = test.p_value,
        dof = test.degrees_of_freedom,
        removed = removed.len(),
        accepted,
        "contingency test decided"
    );

    Ok(Verdict {
        statistic: test.statistic,
        p_value: test.p_value,
        degrees_of_freedom: test.degrees_of_freedom,
        significance_level: alpha,
        accepted,
        detail: VerdictDetail {
            original_shape: (original_rows, original_cols),
            filtered_shape: (rows, cols),
            removed_categories: removed,
            expected: test.expected,
            correction_applied: test.correction_applied,
            divergence,
        },
    })
}
