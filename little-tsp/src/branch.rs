//! Branching rules: which edge to split on, and how to build the branch that
//! excludes it.

use crate::{
    cost::{Cost, Weight},
    matrix::CostMatrix,
    stage::{BranchVertex, StageState, VertexPair},
};

/// Picks the zero cell whose exclusion raises the lower bound the most.
///
/// Ties go to the first maximum in row-major order. A zero whose skip cost is
/// `Forbidden` (an edge without any alternative) is only picked if no zero
/// cell has a finite skip cost. Returns `None` if the matrix has no zero.
pub fn choose_branch_vertex(matrix: &CostMatrix) -> Option<BranchVertex> {
    let mut best: Option<BranchVertex> = None;
    let mut forced: Option<BranchVertex> = None;

    for (row, col) in matrix.zeros() {
        let skip_cost = matrix.vertex_skip_cost(row, col);
        let vertex = BranchVertex {
            edge: VertexPair::new(row, col),
            skip_cost,
        };
        match skip_cost {
            Weight::Forbidden => {
                if forced.is_none() {
                    forced = Some(vertex);
                }
            }
            Weight::Finite(_) => match best {
                Some(b) if b.skip_cost >= skip_cost => {}
                _ => best = Some(vertex),
            },
        }
    }

    best.or(forced)
}

/// Builds the branch that forbids `forbidden`.
///
/// The branch restarts from the root matrix instead of the current partial
/// tour: it gets no committed edges, level 0 and the root matrix with
/// `forbidden` and all `exclusions` of its parent set to `Forbidden`.
/// `new_bound` is only used to decide whether the branch is worth popping;
/// once popped its bound is re-derived from the reductions.
///
/// Keeping the parent's exclusions is required. A restart that forbids only
/// `forbidden` can descend into the same left branch it came from, and on
/// instances with tied costs the search then never terminates (see
/// `test_all_ties_terminate` in the solver). With the exclusions carried
/// along, every tour belongs to exactly one restart lineage, so all tied
/// optima are still found.
pub fn make_right_sibling(
    root: &CostMatrix,
    exclusions: &[VertexPair],
    forbidden: VertexPair,
    new_bound: Cost,
) -> StageState {
    let mut excluded = exclusions.to_vec();
    if let Err(pos) = excluded.binary_search(&forbidden) {
        excluded.insert(pos, forbidden);
    }

    let mut matrix = root.clone();
    for edge in &excluded {
        matrix.forbid(edge.row, edge.col);
    }
    StageState::restarted(matrix, excluded, new_bound)
}

#[cfg(test)]
mod test_branch {
    use super::*;
    use crate::matrix::test_matrix::{matrix, scenario_a, INF};

    #[test]
    fn test_choose_max_skip_cost() {
        let mut m = scenario_a();
        m.reduce_rows();
        m.reduce_cols();
        let vertex = choose_branch_vertex(&m).unwrap();
        assert_eq!(vertex.edge, VertexPair::new(0, 2));
        assert_eq!(vertex.skip_cost, Weight::finite(1));
    }

    #[test]
    fn test_choose_prefers_finite_skip_cost() {
        // (0, 1) and (1, 2) have no alternative, (2, 0) does.
        let m = matrix(&[&[INF, 0, INF], &[5, INF, 0], &[0, 2, INF]]);
        let vertex = choose_branch_vertex(&m).unwrap();
        assert_eq!(vertex.edge, VertexPair::new(2, 0));
        assert_eq!(vertex.skip_cost, Weight::finite(2 + 5));
    }

    #[test]
    fn test_choose_forced_when_nothing_else() {
        let m = matrix(&[&[INF, 0, INF], &[INF, INF, 0], &[0, INF, INF]]);
        let vertex = choose_branch_vertex(&m).unwrap();
        assert_eq!(vertex.edge, VertexPair::new(0, 1));
        assert_eq!(vertex.skip_cost, Weight::Forbidden);
    }

    #[test]
    fn test_choose_without_zero() {
        let m = matrix(&[&[INF, 1], &[1, INF]]);
        assert_eq!(choose_branch_vertex(&m), None);
    }

    #[test]
    fn test_right_sibling_restarts_from_root() {
        let root = scenario_a();
        let sibling = make_right_sibling(
            &root,
            &[VertexPair::new(3, 4)],
            VertexPair::new(0, 2),
            29.into(),
        );
        assert_eq!(sibling.level(), 0);
        assert!(sibling.path().is_empty());
        assert_eq!(sibling.lower_bound(), 29.into());
        assert_eq!(
            sibling.exclusions(),
            &[VertexPair::new(0, 2), VertexPair::new(3, 4)]
        );
        assert!(sibling.matrix().get(0, 2).is_forbidden());
        assert!(sibling.matrix().get(3, 4).is_forbidden());
        assert_eq!(sibling.matrix().get(0, 1), Weight::finite(10));
        assert_eq!(sibling.matrix().get(2, 0), Weight::finite(8));
    }
}
