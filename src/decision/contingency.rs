// Contingency tables: grouped count matrices
//
// Rows are groups (e.g. observed vs. expected-under-null), columns are
// outcome categories. Cells are non-negative integer counts.

use crate::decision::DecisionError;
use serde::Serialize;

/// Rectangular mapping from (group, category) to a count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    groups: Vec<String>,
    categories: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a labelled table
    ///
    /// Fails if the number of group labels differs from the number of rows,
    /// or if any row's length differs from the number of category labels.
    pub fn new(
        groups: Vec<String>,
        categories: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self, DecisionError> {
        if groups.len() != counts.len() {
            return Err(DecisionError::LabelMismatch {
                what: "group",
                expected: counts.len(),
                found: groups.len(),
            });
        }
        for (row, cells) in counts.iter().enumerate() {
            if cells.len() != categories.len() {
                return Err(DecisionError::RaggedTable {
                    row,
                    expected: categories.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Self {
            groups,
            categories,
            counts,
        })
    }

    /// Build a table with positional labels (`g0`, `g1`, ... / `c0`, `c1`, ...)
    ///
    /// # Example
    /// ```
    /// use stochcheck::decision::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_rows(vec![vec![0, 5, 3], vec![0, 2, 4]]).unwrap();
    /// assert_eq!(table.shape(), (2, 3));
    /// assert_eq!(table.column_totals(), vec![0, 7, 7]);
    /// ```
    pub fn from_rows(counts: Vec<Vec<u64>>) -> Result<Self, DecisionError> {
        let width = counts.first().map(Vec::len).unwrap_or(0);
        let groups = (0..counts.len()).map(|i| format!("g{}", i)).collect();
        let categories = (0..width).map(|j| format!("c{}", j)).collect();
        Self::new(groups, categories, counts)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.counts.len(), self.categories.len())
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn count(&self, row: usize, column: usize) -> Option<u64> {
        self.counts.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<u64> {
        (0..self.categories.len())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Keep only the columns at `keep` (ascending), preserving their order
    pub(crate) fn select_columns(&self, keep: &[usize]) -> Self {
        Self {
            groups: self.groups.clone(),
            categories: keep.iter().map(|&j| self.categories[j].clone()).collect(),
            counts: self
                .counts
                .iter()
                .map(|row| keep.iter().map(|&j| row[j]).collect())
                .collect(),
        }
    }
}
