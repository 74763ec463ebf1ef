pub mod branch;
pub mod brute_force;
pub mod chain;
pub mod cost;
pub mod error;
pub mod matrix;
pub mod solution;
pub mod solver;
pub mod stage;

pub use cost::{Cost, Weight};
pub use error::{InputError, SolveError};
pub use matrix::CostMatrix;
pub use solution::{filter_solutions, TspSolution};
pub use solver::{solve_tsp, solve_tsp_with, SearchOutcome, SearchStats, SolverConfig};
