use thiserror::Error;

use crate::stage::VertexPair;

/// Reasons to reject a cost matrix before any search state is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("a cost matrix needs at least 2 cities, got {0}")]
    TooSmall(usize),
    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("negative cost {cost} at ({row}, {col})")]
    NegativeCost { row: usize, col: usize, cost: i64 },
    #[error("cost {cost} at ({row}, {col}) exceeds the largest supported cost {max}")]
    CostTooLarge {
        row: usize,
        col: usize,
        cost: i64,
        max: i64,
    },
    #[error("diagonal entry ({index}, {index}) must be forbidden or 0, got {cost}")]
    MalformedDiagonal { index: usize, cost: i64 },
    #[error("line {line}: cannot parse `{token}` as a cost")]
    Parse { line: usize, token: String },
}

/// Failures of the branch and bound search.
///
/// Apart from `Input`, every variant is a broken internal invariant: the
/// computation is aborted instead of returning a wrong tour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("no zero cell to branch on at level {level}")]
    NoBranchVertex { level: usize },
    #[error("path requested at level {level}, but a tour is only fixed at level {terminal}")]
    NotTerminal { level: usize, terminal: usize },
    #[error("committed edges {0:?} do not form a Hamiltonian cycle")]
    BrokenCycle(Vec<VertexPair>),
}
