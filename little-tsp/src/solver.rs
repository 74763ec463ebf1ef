use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{
    branch::make_right_sibling,
    cost::{Cost, Weight},
    error::SolveError,
    matrix::CostMatrix,
    solution::{filter_solutions, merge_reversed, TspSolution},
    stage::{StageState, VertexPair},
};

/// Limits of a search. Without limits the search runs until the tree is
/// exhausted and the result is exact.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Stop after this many nodes have been popped from the stack.
    pub node_limit: Option<usize>,
    /// Stop once this much wall-clock time has passed.
    pub time_limit: Option<Duration>,
}

impl SolverConfig {
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Nodes taken from the stack.
    pub popped: usize,
    /// Edges committed on left descents, one right branch each at most.
    pub branched: usize,
    /// Nodes abandoned because their bound exceeded the best tour.
    pub pruned: usize,
    /// Nodes abandoned because a city had no admissible edge left.
    pub infeasible: usize,
    /// Right branches skipped because the same restart was explored before.
    pub duplicates: usize,
    /// Nodes that reached the 2×2 stage.
    pub terminals: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub solutions: Vec<TspSolution>,
    pub stats: SearchStats,
    /// `false` if a limit of the `SolverConfig` stopped the search early.
    pub complete: bool,
}

impl SearchOutcome {
    pub fn optimal_cost(&self) -> Option<Cost> {
        self.solutions.first().map(|s| s.cost)
    }
}

/// Every optimal tour of `matrix`. See `solve_tsp_with`.
pub fn solve_tsp(matrix: &CostMatrix) -> Result<Vec<TspSolution>, SolveError> {
    solve_tsp_with(matrix, &SolverConfig::default()).map(|outcome| outcome.solutions)
}

/// Depth-first branch and bound over an explicit stack.
///
/// Each popped node is descended on its left branch (reduce, check the bound,
/// commit the branch vertex) until it is pruned or reaches the 2×2 stage.
/// The right branch of every commit is pushed as a restart from the root
/// matrix with the branch edge forbidden. Every terminal node whose bound
/// does not exceed the best known tour becomes a candidate; the candidates
/// tied at the best cost are returned.
///
/// For symmetric matrices a tour and its reversal are reported once.
/// An empty list means no tour avoids the forbidden edges.
///
/// The exclusion set of every explored restart is kept until the search
/// ends, so memory grows with the number of restarts. Use
/// `SolverConfig::node_limit` to cap it on large instances.
pub fn solve_tsp_with(root: &CostMatrix, config: &SolverConfig) -> Result<SearchOutcome, SolveError> {
    log::info!("Start branch and bound on {} cities.", root.size());
    let started = Instant::now();

    // The branch & bound tree.
    let mut tree_lifo: Vec<StageState> = vec![StageState::new(root.clone())];
    let mut explored: FxHashSet<Vec<VertexPair>> = FxHashSet::default();
    let mut best_lb: Option<Cost> = None;
    let mut candidates: Vec<TspSolution> = vec![];
    let mut stats = SearchStats::default();
    let mut complete = true;

    let within = |lb: Cost, best: Option<Cost>| best.map_or(true, |b| lb <= b);

    while let Some(mut left_branch) = tree_lifo.pop() {
        if !candidates.is_empty() && limit_reached(config, &stats, started) {
            log::warn!(
                "Search limit reached after {} nodes, {} nodes left unexplored.",
                stats.popped,
                tree_lifo.len() + 1
            );
            complete = false;
            break;
        }
        stats.popped += 1;

        if !within(left_branch.lower_bound(), best_lb) {
            stats.pruned += 1;
            continue;
        }
        if !explored.insert(left_branch.exclusions().to_vec()) {
            stats.duplicates += 1;
            continue;
        }
        if left_branch.level() == 0 {
            left_branch.reset_lower_bound();
        }
        log::trace!(
            "Node {}: restart with {} excluded edges.",
            stats.popped,
            left_branch.exclusions().len()
        );

        let mut abandoned = false;
        while !left_branch.is_terminal() {
            // 1. Reduce the matrix and raise the bound.
            let extra = left_branch.reduce();
            left_branch.update_lower_bound(extra);
            if !left_branch.is_feasible() {
                stats.infeasible += 1;
                abandoned = true;
                break;
            }
            if !within(left_branch.lower_bound(), best_lb) {
                stats.pruned += 1;
                abandoned = true;
                break;
            }

            // 2. Pick the edge to branch on.
            let vertex = match left_branch.choose_branch_vertex() {
                Some(vertex) => vertex,
                None => {
                    log::error!(
                        "No zero cell after reduction at level {}:\n{}",
                        left_branch.level(),
                        left_branch.matrix()
                    );
                    return Err(SolveError::NoBranchVertex {
                        level: left_branch.level(),
                    });
                }
            };

            // 3. Defer the branch without the edge, unless it cannot hold a tour.
            if let Weight::Finite(skip_cost) = vertex.skip_cost {
                let new_lower_bound = left_branch.lower_bound_after(skip_cost);
                tree_lifo.push(make_right_sibling(
                    root,
                    left_branch.exclusions(),
                    vertex.edge,
                    new_lower_bound,
                ));
            }

            // 4. Continue with the edge.
            log::trace!(
                "Level {}: take {} (skip cost {}), bound {}.",
                left_branch.level(),
                vertex.edge,
                vertex.skip_cost,
                left_branch.lower_bound()
            );
            left_branch.commit(vertex.edge);
            stats.branched += 1;
        }
        if abandoned {
            continue;
        }

        stats.terminals += 1;
        let extra = left_branch.reduce();
        left_branch.update_lower_bound(extra);
        if !within(left_branch.lower_bound(), best_lb) {
            stats.pruned += 1;
            continue;
        }

        let path = match left_branch.resolve_path()? {
            Some(path) => path,
            None => {
                stats.infeasible += 1;
                continue;
            }
        };
        let cost = match root.tour_cost(&path) {
            Weight::Finite(cost) => cost,
            Weight::Forbidden => {
                log::error!("Resolved tour {:?} uses a forbidden edge.", path);
                return Err(SolveError::BrokenCycle(left_branch.path().to_vec()));
            }
        };
        debug_assert_eq!(cost, left_branch.lower_bound());

        if within(cost, best_lb) {
            log::debug!("Found tour of cost {}: {:?}", cost, path);
            best_lb = Some(cost);
            candidates.push(TspSolution::new(cost, path));
        }
    }

    let mut solutions = filter_solutions(candidates);
    if root.is_symmetric() {
        solutions = merge_reversed(solutions);
    }

    match solutions.first() {
        Some(best) => log::info!(
            "Finished branch and bound: cost {}, {} optimal tours, {} nodes.",
            best.cost,
            solutions.len(),
            stats.popped
        ),
        None => log::warn!("Finished branch and bound: no admissible tour."),
    }

    Ok(SearchOutcome {
        solutions,
        stats,
        complete,
    })
}

fn limit_reached(config: &SolverConfig, stats: &SearchStats, started: Instant) -> bool {
    config
        .node_limit
        .map_or(false, |limit| stats.popped >= limit)
        || config
            .time_limit
            .map_or(false, |limit| started.elapsed() >= limit)
}
