use std::{error::Error, time::Instant};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use little_tsp::{
    brute_force::{brute_force_tsp, MAX_BRUTE_FORCE_CITIES},
    solve_tsp_with, CostMatrix, SolveError, SolverConfig,
};
use rayon::prelude::*;

use crate::samples::Sample;

fn progress_bar(num: usize, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(num as u64);
    pb.set_style(
        ProgressStyle::default_bar().template(
            "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ({pos}/{len})",
        ),
    );
    pb.enable_steady_tick(20);
    pb.set_message(message);
    pb
}

fn solve_sample(
    matrix: &CostMatrix,
    config: &SolverConfig,
    with_reference: bool,
) -> Result<Sample, SolveError> {
    let started = Instant::now();
    let outcome = solve_tsp_with(matrix, config)?;
    let elapsed = started.elapsed();
    let reference = if with_reference {
        Some(brute_force_tsp(matrix))
    } else {
        None
    };

    Ok(Sample {
        n: matrix.size(),
        symmetric: matrix.is_symmetric(),
        outcome,
        elapsed,
        reference,
    })
}

/// Solves independent instances in parallel. Every search itself stays
/// sequential.
pub fn create_samples(
    matrices: Vec<CostMatrix>,
    config: &SolverConfig,
) -> Result<Vec<Sample>, Box<dyn Error>> {
    let pb = progress_bar(matrices.len(), "Branch and bound");

    let samples = matrices
        .par_iter()
        .progress_with(pb)
        .map(|matrix| solve_sample(matrix, config, false))
        .collect::<Result<Vec<Sample>, SolveError>>()?;

    log::info!("Finished solving {} instances.", samples.len());
    println!("Branch and bound: ✔️");
    Ok(samples)
}

/// Like `create_samples`, but also runs the exhaustive solver on every
/// instance. Returns the samples whose optimum disagrees.
pub fn verify_samples(
    matrices: Vec<CostMatrix>,
    config: &SolverConfig,
) -> Result<Vec<Sample>, Box<dyn Error>> {
    if let Some(m) = matrices.iter().find(|m| m.size() > MAX_BRUTE_FORCE_CITIES) {
        return Err(format!(
            "Cannot verify instances with {} cities, at most {} are supported.",
            m.size(),
            MAX_BRUTE_FORCE_CITIES
        )
        .into());
    }
    let pb = progress_bar(matrices.len(), "Verify");

    let samples = matrices
        .par_iter()
        .progress_with(pb)
        .map(|matrix| solve_sample(matrix, config, true))
        .collect::<Result<Vec<Sample>, SolveError>>()?;

    let mismatches: Vec<Sample> = samples.into_iter().filter(|s| !s.agrees()).collect();
    for sample in &mismatches {
        log::error!("Branch and bound disagrees with brute force: {}", sample);
    }
    log::info!("Verification finished with {} mismatches.", mismatches.len());
    Ok(mismatches)
}

#[cfg(test)]
mod test_experiment {
    use super::*;
    use crate::gen_instances::RandomMatrixGenerator;

    #[test]
    fn test_verify_random_instances() {
        let matrices: Vec<CostMatrix> = RandomMatrixGenerator::default_costs(6, false)
            .with_seed(5)
            .take(8)
            .collect();
        let mismatches = verify_samples(matrices, &SolverConfig::default()).unwrap();
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_samples_are_complete() {
        let matrices: Vec<CostMatrix> = RandomMatrixGenerator::default_costs(7, true)
            .with_seed(9)
            .take(4)
            .collect();
        let samples = create_samples(matrices, &SolverConfig::default()).unwrap();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.outcome.complete && s.symmetric));
        assert!(samples.iter().all(|s| s.outcome.optimal_cost().is_some()));
    }

    #[test]
    fn test_verify_rejects_large_instances() {
        let matrices: Vec<CostMatrix> = RandomMatrixGenerator::default_costs(11, false)
            .with_seed(1)
            .take(1)
            .collect();
        assert!(verify_samples(matrices, &SolverConfig::default()).is_err());
    }
}
