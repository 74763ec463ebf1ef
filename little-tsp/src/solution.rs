use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::cost::Cost;

/// A complete tour with its cost. `path` lists every city exactly once
/// (1-based), starting at city 1; the return to the first city is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TspSolution {
    pub cost: Cost,
    pub path: Vec<usize>,
}

impl TspSolution {
    pub fn new(cost: Cost, path: Vec<usize>) -> Self {
        TspSolution {
            cost,
            path: rotate_to_first_city(&path),
        }
    }

    /// Cost of the tour, which equals the lower bound of the terminal search
    /// node it was read from.
    pub fn lower_bound(&self) -> Cost {
        self.cost
    }

    /// Same cyclic sequence, regardless of the starting city.
    pub fn is_rotation_of(&self, path: &[usize]) -> bool {
        same_cycle(&self.path, path)
    }

    /// The tour travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        TspSolution {
            cost: self.cost,
            path: reversed_tour(&self.path),
        }
    }
}

impl Display for TspSolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut cities: Vec<String> = self.path.iter().map(|c| c.to_string()).collect();
        if let Some(first) = self.path.first() {
            cities.push(first.to_string());
        }
        write!(f, "{}: {}", self.cost, cities.join(" -> "))
    }
}

/// Rotates a cyclic sequence so that its smallest city comes first.
pub fn rotate_to_first_city(path: &[usize]) -> Vec<usize> {
    match path.iter().enumerate().min_by_key(|&(_, c)| *c) {
        Some((pos, _)) => path[pos..].iter().chain(&path[..pos]).copied().collect(),
        None => vec![],
    }
}

/// The same cycle in the opposite direction, again starting at its smallest city.
pub fn reversed_tour(path: &[usize]) -> Vec<usize> {
    let reversed: Vec<usize> = path.iter().rev().copied().collect();
    rotate_to_first_city(&reversed)
}

/// Whether two sequences describe the same directed cycle.
pub fn same_cycle(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && rotate_to_first_city(a) == rotate_to_first_city(b)
}

/// Keeps the candidates whose cost equals the smallest cost in the list.
/// Repeated tours are reported once.
pub fn filter_solutions(solutions: Vec<TspSolution>) -> Vec<TspSolution> {
    let optimal_cost = match solutions.iter().map(|s| s.cost).min() {
        Some(cost) => cost,
        None => return vec![],
    };

    let mut optimal: Vec<TspSolution> = Vec::new();
    for solution in solutions {
        if solution.cost == optimal_cost && !optimal.iter().any(|s| s.path == solution.path) {
            optimal.push(solution);
        }
    }
    optimal
}

/// Drops every tour whose reversal was reported before it. For symmetric
/// instances both directions describe the same round trip.
pub fn merge_reversed(solutions: Vec<TspSolution>) -> Vec<TspSolution> {
    let mut merged: Vec<TspSolution> = Vec::new();
    for solution in solutions {
        let reversed = reversed_tour(&solution.path);
        if !merged.iter().any(|s| s.path == reversed) {
            merged.push(solution);
        }
    }
    merged
}

#[cfg(test)]
mod test_solution {
    use super::*;

    fn solution(cost: i64, path: &[usize]) -> TspSolution {
        TspSolution::new(cost.into(), path.to_vec())
    }

    #[test]
    fn test_rotation() {
        assert_eq!(rotate_to_first_city(&[5, 4, 3, 1, 2]), vec![1, 2, 5, 4, 3]);
        assert_eq!(rotate_to_first_city(&[1, 3, 2]), vec![1, 3, 2]);
        assert!(rotate_to_first_city(&[]).is_empty());
        assert!(same_cycle(&[5, 4, 3, 1, 2], &[1, 2, 5, 4, 3]));
        assert!(!same_cycle(&[1, 3, 4, 5, 2], &[1, 2, 5, 4, 3]));
    }

    #[test]
    fn test_reversal() {
        assert_eq!(reversed_tour(&[1, 3, 4, 5, 2]), vec![1, 2, 5, 4, 3]);
        let s = solution(32, &[1, 3, 4, 5, 2]);
        assert_eq!(s.reversed().path, vec![1, 2, 5, 4, 3]);
        assert_eq!(s.reversed().reversed(), s);
    }

    #[test]
    fn test_new_rotates() {
        let s = solution(30, &[5, 4, 3, 1, 2]);
        assert_eq!(s.path, vec![1, 2, 5, 4, 3]);
        assert!(s.is_rotation_of(&[5, 4, 3, 1, 2]));
        assert_eq!(s.lower_bound(), 30.into());
    }

    #[test]
    fn test_filter_keeps_all_ties() {
        let filtered = filter_solutions(vec![
            solution(40, &[1, 2, 3, 4]),
            solution(32, &[1, 3, 2, 4]),
            solution(35, &[1, 4, 3, 2]),
            solution(32, &[1, 4, 2, 3]),
        ]);
        assert_eq!(
            filtered,
            vec![solution(32, &[1, 3, 2, 4]), solution(32, &[1, 4, 2, 3])]
        );
        assert!(filtered.iter().all(|s| s.lower_bound() == 32.into()));
    }

    #[test]
    fn test_filter_removes_repeats() {
        let filtered = filter_solutions(vec![
            solution(7, &[1, 2, 3]),
            solution(7, &[2, 3, 1]),
            solution(7, &[1, 3, 2]),
        ]);
        assert_eq!(filtered.len(), 2);
        assert!(filter_solutions(vec![]).is_empty());
    }

    #[test]
    fn test_merge_reversed() {
        let merged = merge_reversed(vec![
            solution(32, &[1, 3, 4, 5, 2]),
            solution(32, &[1, 2, 5, 4, 3]),
            solution(32, &[1, 2, 3, 4, 5]),
        ]);
        assert_eq!(
            merged,
            vec![solution(32, &[1, 3, 4, 5, 2]), solution(32, &[1, 2, 3, 4, 5])]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            solution(32, &[1, 3, 4, 5, 2]).to_string(),
            "32: 1 -> 3 -> 4 -> 5 -> 2 -> 1"
        );
    }
}
