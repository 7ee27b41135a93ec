// Frequency filter: drop categories no group ever produced
//
// A contingency test is undefined over a column whose every cell is zero
// (its expected frequencies are all zero). Removing such columns before
// testing leaves the statistic over the remaining cells unchanged.

use crate::decision::contingency::ContingencyTable;

/// Indices of columns whose every cell is exactly zero
pub fn zero_columns(table: &ContingencyTable) -> Vec<usize> {
    table
        .column_totals()
        .iter()
        .enumerate()
        .filter(|(_, &total)| total == 0)
        .map(|(j, _)| j)
        .collect()
}

/// Remove every all-zero column, keeping the rest in their original order
///
/// The row count is unchanged. If every column is removed the result has
/// the same rows and no columns.
///
/// # Example
/// ```
/// use stochcheck::decision::{filter_zero_columns, ContingencyTable};
///
/// let table = ContingencyTable::from_rows(vec![vec![0, 5, 3], vec![0, 2, 4]]).unwrap();
/// let filtered = filter_zero_columns(&table);
/// assert_eq!(filtered.rows(), &[vec![5, 3], vec![2, 4]]);
/// ```
pub fn filter_zero_columns(table: &ContingencyTable) -> ContingencyTable {
    let keep: Vec<usize> = table
        .column_totals()
        .iter()
        .enumerate()
        .filter(|(_, &total)| total > 0)
        .map(|(j, _)| j)
        .collect();

    table.select_columns(&keep)
}
