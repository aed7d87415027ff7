//! Two-dimensional contingency tables
//!
//! A [`CrossTab`] counts items over a row dimension with a fixed number of rows
//! and a column dimension that is clamped: any column value above `col_max` is
//! counted in the `col_max` column ("`col_max` or more"). Every item increments
//! exactly one cell, so the cell sum always equals the number of items.

use serde::Serialize;

/// Row-major count matrix of shape `num_rows × (col_max + 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    cells: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Creates an all-zero table.
    #[must_use]
    pub fn new(num_rows: usize, col_max: usize) -> Self {
        Self {
            cells: vec![vec![0; col_max + 1]; num_rows],
        }
    }

    /// Builds a table from `items`.
    ///
    /// # Arguments
    ///
    /// * `items` - Items to count
    /// * `num_rows` - Number of rows; `row` must return a value below it
    /// * `col_max` - Largest column index; larger column values are clamped
    /// * `row` - Closure computing the row index of an item
    /// * `col` - Closure computing the (unclamped) column value of an item
    ///
    /// # Panics
    ///
    /// Panics if `row` returns an index `>= num_rows`.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_stats::crosstab::CrossTab;
    ///
    /// let ages_and_counts = [(0, 0), (0, 2), (1, 12)];
    /// let table = CrossTab::from_items(&ages_and_counts, 2, 6, |(r, _)| *r, |(_, c)| *c);
    /// assert_eq!(table.num_cols(), 7);
    /// assert_eq!(table.row_sums(), [2, 1]);
    /// assert_eq!(table.get(1, 6), 1);
    /// ```
    pub fn from_items<T, R, C>(
        items: &[T],
        num_rows: usize,
        col_max: usize,
        mut row: R,
        mut col: C,
    ) -> Self
    where
        R: FnMut(&T) -> usize,
        C: FnMut(&T) -> usize,
    {
        let mut table = Self::new(num_rows, col_max);
        for item in items {
            table.increment(row(item), col(item));
        }
        table
    }

    /// Counts one item at (`row`, `col`), clamping `col` to the last column.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.num_rows()`.
    pub fn increment(&mut self, row: usize, col: usize) {
        let col = col.min(self.col_max());
        self.cells[row][col] += 1;
    }

    /// Adds the counts of a table of the same shape.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(
            (self.num_rows(), self.num_cols()),
            (other.num_rows(), other.num_cols()),
            "cross tables must have the same shape"
        );
        for (ours, theirs) in self.cells.iter_mut().zip(&other.cells) {
            for (a, b) in ours.iter_mut().zip(theirs) {
                *a += b;
            }
        }
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    fn col_max(&self) -> usize {
        self.num_cols().saturating_sub(1)
    }

    /// Count at (`row`, `col`), `0` outside the table.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.iter().map(Vec::as_slice)
    }

    #[must_use]
    pub fn row_sums(&self) -> Vec<usize> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn col_sums(&self) -> Vec<usize> {
        let mut sums = vec![0; self.num_cols()];
        for row in &self.cells {
            for (sum, cell) in sums.iter_mut().zip(row) {
                *sum += cell;
            }
        }
        sums
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }
}
