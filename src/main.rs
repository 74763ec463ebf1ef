mod experiment;
mod gen_instances;
mod matrix_io;
mod samples;

use std::{error::Error, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};
use little_tsp::{solve_tsp_with, CostMatrix, SolverConfig};

use experiment::{create_samples, verify_samples};
use gen_instances::RandomMatrixGenerator;
use matrix_io::{export_matrix, export_solutions, import_matrix};
use samples::export;

/// Exact solver for the travelling salesman problem.
#[derive(Parser)]
#[clap(name = "tsp-bnb", version)]
struct Cli {
    /// Also print log messages to stderr.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a single instance file.
    Solve(Solve),
    /// Solve random instances and export one CSV row per instance.
    Gen(Gen),
    /// Compare random instances against the exhaustive solver.
    Verify(Verify),
    /// Print a parsed instance file.
    Print(Print),
}

#[derive(Args, Clone, Debug, Default)]
struct Limits {
    /// Stop after this many search nodes.
    #[clap(long)]
    node_limit: Option<usize>,

    /// Stop after this many seconds.
    #[clap(long)]
    time_limit: Option<u64>,
}

impl Limits {
    fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            node_limit: self.node_limit,
            time_limit: self.time_limit.map(Duration::from_secs),
        }
    }
}

#[derive(Args)]
struct Solve {
    #[clap(parse(from_os_str))]
    input: PathBuf,

    #[clap(flatten)]
    limits: Limits,

    /// Write the optimal tours as JSON.
    #[clap(long, parse(from_os_str))]
    json: Option<PathBuf>,
}

#[derive(Args)]
struct Gen {
    #[clap()]
    num: usize,

    #[clap(short, long, default_value = "10")]
    num_nodes: usize,

    #[clap(short, long)]
    symmetric: bool,

    #[clap(long, default_value = "100")]
    max_cost: i64,

    #[clap(long)]
    seed: Option<u64>,

    #[clap(flatten)]
    limits: Limits,

    /// Also write every generated instance into this directory.
    #[clap(long, parse(from_os_str))]
    instances: Option<PathBuf>,

    #[clap(short, long, default_value = "results.csv", parse(from_os_str))]
    output: PathBuf,
}

#[derive(Args)]
struct Verify {
    #[clap()]
    num: usize,

    #[clap(short, long, default_value = "7")]
    num_nodes: usize,

    #[clap(short, long)]
    symmetric: bool,

    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct Print {
    #[clap(parse(from_os_str))]
    input: PathBuf,
}

fn generate(
    num: usize,
    num_nodes: usize,
    symmetric: bool,
    max_cost: i64,
    seed: Option<u64>,
) -> Vec<CostMatrix> {
    let mut generator =
        RandomMatrixGenerator::default_costs(num_nodes, symmetric).with_max_cost(max_cost);
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }
    generator.take(num).collect()
}

fn set_up_logging(verbose: bool) -> Result<(), fern::InitError> {
    std::fs::create_dir_all("logs")?;
    let mut dispatch = fern::Dispatch::new()
        .level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date}][{level}] {message}",
                        date = chrono::Local::now().format("%H:%M:%S"),
                        level = record.level(),
                        message = message
                    ));
                })
                .chain(fern::log_file(format!(
                    "logs/{}.log",
                    chrono::Local::now().format("%d%m%Y-%H%M")
                ))?),
        );

    if verbose {
        let colors = ColoredLevelConfig::new()
            .info(Color::Green)
            .debug(Color::Cyan);
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{}] {}",
                        colors.color(record.level()),
                        message
                    ));
                })
                .chain(std::io::stderr()),
        );
    }
    dispatch.apply()?;

    log::info!("Logger set up!");

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    set_up_logging(cli.verbose)?;

    match cli.command {
        Command::Solve(solve) => {
            let matrix = import_matrix(&solve.input)?;
            println!("Instance with {} cities imported.", matrix.size());
            let outcome = solve_tsp_with(&matrix, &solve.limits.solver_config())?;

            match outcome.optimal_cost() {
                Some(cost) => println!("Optimal cost: {}", cost),
                None => println!("No tour avoids the forbidden edges."),
            }
            for solution in &outcome.solutions {
                println!("{}", solution);
            }
            if !outcome.complete {
                println!("Search stopped by a limit, the tours may not be optimal.");
            }
            println!("Search nodes: {}", outcome.stats.popped);

            if let Some(json) = solve.json {
                export_solutions(json, &outcome)?;
            }
        }
        Command::Gen(gen) => {
            let matrices = generate(
                gen.num,
                gen.num_nodes,
                gen.symmetric,
                gen.max_cost,
                gen.seed,
            );
            if let Some(dir) = &gen.instances {
                std::fs::create_dir_all(dir)?;
                for (i, matrix) in matrices.iter().enumerate() {
                    let mut file = dir.clone();
                    file.push(format!("{}.txt", i));
                    export_matrix(&file, matrix)?;
                }
            }

            let samples = create_samples(matrices, &gen.limits.solver_config())?;
            export(samples, gen.output)?;
        }
        Command::Verify(verify) => {
            let matrices = generate(
                verify.num,
                verify.num_nodes,
                verify.symmetric,
                100,
                verify.seed,
            );
            let mismatches = verify_samples(matrices, &SolverConfig::default())?;
            if mismatches.is_empty() {
                println!("All {} instances agree with brute force.", verify.num);
            } else {
                for sample in &mismatches {
                    println!("Mismatch: {}", sample);
                }
                return Err(format!("{} instances disagree with brute force", mismatches.len()).into());
            }
        }
        Command::Print(print) => {
            let matrix = import_matrix(&print.input)?;
            println!("{}", matrix);
            if matrix.is_symmetric() {
                println!("The instance is symmetric.");
            }
        }
    }
    Ok(())
}
