//! Exhaustive enumeration of all tours. Only sensible for a handful of
//! cities; used to cross-check the branch and bound search.

use crate::{
    cost::{Cost, Weight},
    matrix::CostMatrix,
    solution::TspSolution,
};

/// Largest instance `brute_force_optima` accepts.
pub const MAX_BRUTE_FORCE_CITIES: usize = 10;

/// All optimal directed tours, found by trying every permutation of the
/// cities after city 1. Returns an empty list if no tour avoids forbidden
/// edges or the instance is larger than `MAX_BRUTE_FORCE_CITIES`.
pub fn brute_force_optima(matrix: &CostMatrix) -> Vec<TspSolution> {
    let n = matrix.size();
    if n > MAX_BRUTE_FORCE_CITIES {
        log::warn!("Refusing to enumerate all tours of {} cities.", n);
        return vec![];
    }

    let mut best: Option<Cost> = None;
    let mut optima: Vec<TspSolution> = vec![];
    let mut rest: Vec<usize> = (2..=n).collect();

    let mut visit = |rest: &[usize]| {
        let mut path = Vec::with_capacity(n);
        path.push(1);
        path.extend_from_slice(rest);
        if let Weight::Finite(cost) = matrix.tour_cost(&path) {
            match best {
                Some(b) if cost > b => {}
                Some(b) if cost == b => optima.push(TspSolution::new(cost, path)),
                _ => {
                    best = Some(cost);
                    optima = vec![TspSolution::new(cost, path)];
                }
            }
        }
    };

    // Heap's algorithm, iterative form.
    let k = rest.len();
    let mut counters = vec![0; k];
    visit(&rest);
    let mut i = 0;
    while i < k {
        if counters[i] < i {
            if i % 2 == 0 {
                rest.swap(0, i);
            } else {
                rest.swap(counters[i], i);
            }
            visit(&rest);
            counters[i] += 1;
            i = 0;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }

    optima
}

/// Cost of an optimal tour, `None` if there is no admissible tour.
pub fn brute_force_tsp(matrix: &CostMatrix) -> Option<Cost> {
    brute_force_optima(matrix).first().map(|s| s.cost)
}
