use std::{
    fmt::{self, Display, Formatter},
    ops::Index,
};

use ndarray::Array2;

use crate::{
    cost::{Cost, Weight},
    error::InputError,
};

/// A square matrix of travel costs. Entry `(r, c)` is the cost of going from
/// city `r` to city `c` (0-based); self loops are always forbidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    matrix: Array2<Weight>,
}

impl CostMatrix {
    /// Largest finite cost accepted for an instance of `n` cities.
    ///
    /// Every row and every column is reduced by at most the largest cost, so
    /// a lower bound stays below `2 * n` times it, plus one skip cost of at
    /// most twice it. Sums of that size must fit into an `i64`.
    pub fn max_cost(n: usize) -> i64 {
        i64::MAX / (2 * (n as i64 + 1))
    }

    /// Validates a raw instance. Zero diagonal entries are accepted and
    /// replaced by `Weight::Forbidden`.
    pub fn new(rows: Vec<Vec<Weight>>) -> Result<Self, InputError> {
        let n = rows.len();
        if n < 2 {
            return Err(InputError::TooSmall(n));
        }
        let max = Self::max_cost(n);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(InputError::NotSquare {
                    row: r,
                    len: row.len(),
                    expected: n,
                });
            }
            for (c, weight) in row.iter().enumerate() {
                match weight {
                    Weight::Finite(cost) if r == c && cost.get() != 0 => {
                        return Err(InputError::MalformedDiagonal {
                            index: r,
                            cost: cost.get(),
                        })
                    }
                    Weight::Finite(cost) if cost.is_negative() => {
                        return Err(InputError::NegativeCost {
                            row: r,
                            col: c,
                            cost: cost.get(),
                        })
                    }
                    Weight::Finite(cost) if cost.get() > max => {
                        return Err(InputError::CostTooLarge {
                            row: r,
                            col: c,
                            cost: cost.get(),
                            max,
                        })
                    }
                    _ => {}
                }
            }
        }

        let matrix = Array2::from_shape_fn((n, n), |(r, c)| {
            if r == c {
                Weight::Forbidden
            } else {
                rows[r][c]
            }
        });
        Ok(CostMatrix { matrix })
    }

    /// Convenience constructor from plain integers, where `None` marks a
    /// forbidden edge.
    pub fn from_costs(rows: &[Vec<Option<i64>>]) -> Result<Self, InputError> {
        CostMatrix::new(
            rows.iter()
                .map(|row| row.iter().map(|c| Weight::from(c.map(Cost::new))).collect())
                .collect(),
        )
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn get(&self, row: usize, col: usize) -> Weight {
        self.matrix[[row, col]]
    }

    pub fn row(&self, row: usize) -> Vec<Weight> {
        self.matrix.row(row).to_vec()
    }

    pub fn forbid(&mut self, row: usize, col: usize) {
        self.matrix[[row, col]] = Weight::Forbidden;
    }

    pub fn forbid_row(&mut self, row: usize) {
        self.matrix
            .row_mut(row)
            .map_inplace(|w| *w = Weight::Forbidden);
    }

    pub fn forbid_col(&mut self, col: usize) {
        self.matrix
            .column_mut(col)
            .map_inplace(|w| *w = Weight::Forbidden);
    }

    /// Minimum of every row, `Forbidden` for rows without a finite entry.
    pub fn row_minima(&self) -> Vec<Weight> {
        self.matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().min().copied().unwrap_or(Weight::Forbidden))
            .collect()
    }

    /// Minimum of every column, `Forbidden` for columns without a finite entry.
    pub fn col_minima(&self) -> Vec<Weight> {
        self.matrix
            .columns()
            .into_iter()
            .map(|col| col.iter().min().copied().unwrap_or(Weight::Forbidden))
            .collect()
    }

    /// Subtracts every row minimum from its row and returns the sum of the
    /// subtracted minima. Fully forbidden rows are left untouched.
    pub fn reduce_rows(&mut self) -> Cost {
        let minima = self.row_minima();
        for (mut row, min) in self.matrix.rows_mut().into_iter().zip(&minima) {
            if let Weight::Finite(min) = min {
                row.map_inplace(|w| *w = *w - *min);
            }
        }
        minima.iter().filter_map(Weight::cost).sum()
    }

    /// Column counterpart of `reduce_rows`.
    pub fn reduce_cols(&mut self) -> Cost {
        let minima = self.col_minima();
        for (mut col, min) in self.matrix.columns_mut().into_iter().zip(&minima) {
            if let Weight::Finite(min) = min {
                col.map_inplace(|w| *w = *w - *min);
            }
        }
        minima.iter().filter_map(Weight::cost).sum()
    }

    /// The increase of the lower bound if edge `(row, col)` is never taken:
    /// the cheapest other way out of `row` plus the cheapest other way into
    /// `col`.
    pub fn vertex_skip_cost(&self, row: usize, col: usize) -> Weight {
        let row_min = self
            .matrix
            .row(row)
            .iter()
            .enumerate()
            .filter(|(c, _)| *c != col)
            .map(|(_, w)| *w)
            .min()
            .unwrap_or(Weight::Forbidden);
        let col_min = self
            .matrix
            .column(col)
            .iter()
            .enumerate()
            .filter(|(r, _)| *r != row)
            .map(|(_, w)| *w)
            .min()
            .unwrap_or(Weight::Forbidden);
        row_min + col_min
    }

    /// All zero cells in row-major order.
    pub fn zeros(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matrix
            .indexed_iter()
            .filter(|(_, w)| w.is_zero())
            .map(|(idx, _)| idx)
    }

    pub fn row_has_finite(&self, row: usize) -> bool {
        self.matrix.row(row).iter().any(Weight::is_finite)
    }

    pub fn col_has_finite(&self, col: usize) -> bool {
        self.matrix.column(col).iter().any(Weight::is_finite)
    }

    pub fn is_symmetric(&self) -> bool {
        self.matrix == self.matrix.t()
    }

    /// Cost of the closed tour visiting the 1-based cities of `path` in order.
    pub fn tour_cost(&self, path: &[usize]) -> Weight {
        if path.is_empty() {
            return Weight::Forbidden;
        }
        let closing = self.get(path[path.len() - 1] - 1, path[0] - 1);
        path.windows(2)
            .map(|e| self.get(e[0] - 1, e[1] - 1))
            .fold(closing, |acc, w| acc + w)
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = Weight;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.matrix[[row, col]]
    }
}

impl Display for CostMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = self
            .matrix
            .iter()
            .map(|w| w.to_string().chars().count())
            .max()
            .unwrap_or(1);
        for row in self.matrix.rows() {
            let line = row
                .iter()
                .map(|w| format!("{:>width$}", w.to_string(), width = width))
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
