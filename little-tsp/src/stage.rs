use std::fmt::{self, Display, Formatter};

use fixedbitset::FixedBitSet;
use serde::Serialize;

use crate::{
    branch,
    chain::ChainEnds,
    cost::{Cost, Weight},
    error::SolveError,
    matrix::CostMatrix,
};

/// A directed edge `row -> col` of the cost matrix (0-based city indices).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VertexPair {
    pub row: usize,
    pub col: usize,
}

impl VertexPair {
    pub fn new(row: usize, col: usize) -> Self {
        VertexPair { row, col }
    }

    pub fn reversed(&self) -> Self {
        VertexPair::new(self.col, self.row)
    }
}

impl From<(usize, usize)> for VertexPair {
    fn from((row, col): (usize, usize)) -> Self {
        VertexPair::new(row, col)
    }
}

impl Display for VertexPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.row + 1, self.col + 1)
    }
}

/// The edge picked for branching together with the bound increase of the
/// branch that excludes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BranchVertex {
    pub edge: VertexPair,
    pub skip_cost: Weight,
}

/// One node of the branch and bound tree.
///
/// Committed rows and columns are not removed from the matrix; they are
/// filled with `Weight::Forbidden` and remembered in `closed_rows` and
/// `closed_cols`. Indices therefore always refer to the original cities.
#[derive(Debug, Clone)]
pub struct StageState {
    matrix: CostMatrix,
    path: Vec<VertexPair>,
    chains: ChainEnds,
    closed_rows: FixedBitSet,
    closed_cols: FixedBitSet,
    exclusions: Vec<VertexPair>,
    lower_bound: Cost,
}

impl StageState {
    /// Root of the search tree.
    pub fn new(matrix: CostMatrix) -> Self {
        Self::with_path(matrix, vec![])
    }

    /// A state whose matrix already reflects the committed edges of `path`.
    pub fn with_path(matrix: CostMatrix, path: Vec<VertexPair>) -> Self {
        let n = matrix.size();
        let mut chains = ChainEnds::new();
        let mut closed_rows = FixedBitSet::with_capacity(n);
        let mut closed_cols = FixedBitSet::with_capacity(n);
        for edge in &path {
            chains.link(edge.row, edge.col);
            closed_rows.insert(edge.row);
            closed_cols.insert(edge.col);
        }
        StageState {
            matrix,
            path,
            chains,
            closed_rows,
            closed_cols,
            exclusions: vec![],
            lower_bound: Cost::zero(),
        }
    }

    /// A level 0 state over a matrix in which `exclusions` are already
    /// forbidden. `exclusions` must be sorted.
    pub(crate) fn restarted(
        matrix: CostMatrix,
        exclusions: Vec<VertexPair>,
        lower_bound: Cost,
    ) -> Self {
        debug_assert!(exclusions.windows(2).all(|e| e[0] < e[1]));
        let mut state = Self::new(matrix);
        state.exclusions = exclusions;
        state.lower_bound = lower_bound;
        state
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn path(&self) -> &[VertexPair] {
        &self.path
    }

    pub fn chains(&self) -> &ChainEnds {
        &self.chains
    }

    /// Edges forbidden on the root matrix this state was rebuilt from.
    pub fn exclusions(&self) -> &[VertexPair] {
        &self.exclusions
    }

    pub fn lower_bound(&self) -> Cost {
        self.lower_bound
    }

    pub fn size(&self) -> usize {
        self.matrix.size()
    }

    /// Number of committed edges.
    pub fn level(&self) -> usize {
        self.closed_rows.count_ones(..)
    }

    /// Level at which only a 2×2 matrix is left and the tour is fixed.
    pub fn terminal_level(&self) -> usize {
        self.size() - 2
    }

    pub fn is_terminal(&self) -> bool {
        self.level() >= self.terminal_level()
    }

    /// Row then column reduction. Returns the total amount subtracted.
    pub fn reduce(&mut self) -> Cost {
        let rows = self.matrix.reduce_rows();
        let cols = self.matrix.reduce_cols();
        rows + cols
    }

    pub fn lower_bound_after(&self, extra: Cost) -> Cost {
        self.lower_bound + extra
    }

    pub fn update_lower_bound(&mut self, extra: Cost) {
        self.lower_bound += extra;
    }

    pub fn reset_lower_bound(&mut self) {
        self.lower_bound = Cost::zero();
    }

    /// Whether every open row and column still has an admissible edge.
    /// Reduction cannot detect this on its own, since all-forbidden lines
    /// simply contribute nothing.
    pub fn is_feasible(&self) -> bool {
        (0..self.size())
            .filter(|r| !self.closed_rows.contains(*r))
            .all(|r| self.matrix.row_has_finite(r))
            && (0..self.size())
                .filter(|c| !self.closed_cols.contains(*c))
                .all(|c| self.matrix.col_has_finite(c))
    }

    pub fn choose_branch_vertex(&self) -> Option<BranchVertex> {
        branch::choose_branch_vertex(&self.matrix)
    }

    /// Records `edge` as part of the tour. Leaves the matrix untouched.
    pub fn append_edge(&mut self, edge: VertexPair) {
        self.path.push(edge);
    }

    /// Descends into the branch that takes `edge`.
    ///
    /// The row and column of `edge` are closed. The reverse edge and the edge
    /// closing the chain `edge` now belongs to are forbidden, so no cycle
    /// shorter than the full tour can be formed.
    pub fn contract(&mut self, edge: VertexPair) {
        self.matrix.forbid_row(edge.row);
        self.matrix.forbid_col(edge.col);
        self.closed_rows.insert(edge.row);
        self.closed_cols.insert(edge.col);

        let (start, end) = self.chains.link(edge.row, edge.col);
        self.matrix.forbid(edge.col, edge.row);
        // A chain over all cities may close; it never happens before the
        // terminal level.
        if self.level() + 1 < self.size() {
            self.matrix.forbid(end, start);
        }
    }

    /// `append_edge` followed by `contract`.
    pub fn commit(&mut self, edge: VertexPair) {
        self.append_edge(edge);
        self.contract(edge);
    }

    /// Completes the tour of a terminal state.
    ///
    /// Of the two ways to connect the two open rows with the two open
    /// columns, the one made of admissible edges that closes a single
    /// Hamiltonian cycle is taken. Returns `Ok(None)` if neither is
    /// admissible. The tour is listed in 1-based city numbers starting at
    /// city 1.
    pub fn resolve_path(&self) -> Result<Option<Vec<usize>>, SolveError> {
        if !self.is_terminal() {
            return Err(SolveError::NotTerminal {
                level: self.level(),
                terminal: self.terminal_level(),
            });
        }
        let rows: Vec<usize> = (0..self.size())
            .filter(|r| !self.closed_rows.contains(*r))
            .collect();
        let cols: Vec<usize> = (0..self.size())
            .filter(|c| !self.closed_cols.contains(*c))
            .collect();
        if rows.len() != 2 || cols.len() != 2 {
            return Err(SolveError::BrokenCycle(self.path.clone()));
        }

        let completions = [
            [
                VertexPair::new(rows[0], cols[0]),
                VertexPair::new(rows[1], cols[1]),
            ],
            [
                VertexPair::new(rows[0], cols[1]),
                VertexPair::new(rows[1], cols[0]),
            ],
        ];
        let mut admissible = false;
        for completion in completions.iter() {
            if completion
                .iter()
                .any(|e| self.matrix.get(e.row, e.col).is_forbidden())
            {
                continue;
            }
            admissible = true;
            let edges: Vec<VertexPair> = self.path.iter().chain(completion).copied().collect();
            if let Some(tour) = follow_successors(self.size(), &edges) {
                return Ok(Some(tour));
            }
        }

        if admissible {
            let mut edges = self.path.clone();
            edges.extend_from_slice(&completions[0]);
            log::error!("Terminal state does not close a tour: {:?}", edges);
            Err(SolveError::BrokenCycle(edges))
        } else {
            Ok(None)
        }
    }
}

/// Chases successor links from city 0. Returns the 1-based tour if `edges`
/// form one cycle through all `n` cities.
fn follow_successors(n: usize, edges: &[VertexPair]) -> Option<Vec<usize>> {
    let mut successor: Vec<Option<usize>> = vec![None; n];
    for edge in edges {
        if successor[edge.row].replace(edge.col).is_some() {
            return None;
        }
    }

    let mut tour = Vec::with_capacity(n);
    let mut current = 0;
    loop {
        tour.push(current + 1);
        current = successor[current]?;
        if current == 0 || tour.len() > n {
            break;
        }
    }
    if current == 0 && tour.len() == n {
        Some(tour)
    } else {
        None
    }
}
