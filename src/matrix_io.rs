use std::{
    error::Error,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use little_tsp::{Cost, CostMatrix, InputError, SearchOutcome, SearchStats, TspSolution};
use serde::Serialize;

const FORBIDDEN_TOKENS: [&str; 7] = ["inf", "INF", "Inf", "∞", "-", "x", "X"];

/// Parses one matrix row per line. Entries are separated by whitespace or
/// commas; blank lines and lines starting with `#` are skipped.
pub fn parse_matrix(text: &str) -> Result<CostMatrix, InputError> {
    let mut rows: Vec<Vec<Option<i64>>> = vec![];
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| parse_entry(token, idx + 1))
            .collect::<Result<Vec<Option<i64>>, InputError>>()?;
        rows.push(row);
    }
    CostMatrix::from_costs(&rows)
}

fn parse_entry(token: &str, line: usize) -> Result<Option<i64>, InputError> {
    if FORBIDDEN_TOKENS.contains(&token) {
        return Ok(None);
    }
    token.parse::<i64>().map(Some).map_err(|_| InputError::Parse {
        line,
        token: token.to_string(),
    })
}

pub fn import_matrix<P: AsRef<Path>>(filename: P) -> Result<CostMatrix, Box<dyn Error>> {
    let text = std::fs::read_to_string(filename.as_ref())?;
    let matrix = parse_matrix(&text)?;
    log::info!(
        "Imported {}x{} matrix from {:?}.",
        matrix.size(),
        matrix.size(),
        filename.as_ref()
    );
    Ok(matrix)
}

/// Writes a matrix in the format `parse_matrix` reads.
pub fn export_matrix<P: AsRef<Path>>(filename: P, matrix: &CostMatrix) -> Result<(), Box<dyn Error>> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    for r in 0..matrix.size() {
        let row: Vec<String> = matrix
            .row(r)
            .iter()
            .map(|w| match w.cost() {
                Some(cost) => cost.to_string(),
                None => "inf".to_string(),
            })
            .collect();
        writeln!(writer, "{}", row.join(" "))?;
    }
    writer.flush()?;

    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    cost: Option<Cost>,
    complete: bool,
    stats: &'a SearchStats,
    solutions: &'a [TspSolution],
}

pub fn export_solutions<P: AsRef<Path>>(
    filename: P,
    outcome: &SearchOutcome,
) -> Result<(), Box<dyn Error>> {
    let report = Report {
        cost: outcome.optimal_cost(),
        complete: outcome.complete,
        stats: &outcome.stats,
        solutions: &outcome.solutions,
    };
    let file = File::create(filename.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writer.flush()?;
    log::info!("Exported solutions to {:?}.", filename.as_ref());

    Ok(())
}

#[cfg(test)]
mod test_matrix_io {
    use little_tsp::{solve_tsp_with, SolverConfig, Weight};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse() {
        let text = "# five cities\n\
                    inf 10 8 19 12\n\
                    10, inf, 20, 6, 3\n\
                    \n\
                    8 20 ∞ 4 2\n\
                    19 6 4 - 7\n\
                    12 3 2 7 x\n";
        let m = parse_matrix(text).unwrap();
        assert_eq!(m.size(), 5);
        assert_eq!(m.get(1, 4), Weight::finite(3));
        assert!(m.get(2, 2).is_forbidden());
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_parse_forbidden_off_diagonal() {
        let m = parse_matrix("0 INF 1\n2 0 -\n3 4 0").unwrap();
        assert!(m.get(0, 1).is_forbidden());
        assert!(m.get(1, 2).is_forbidden());
        assert!(m.get(0, 0).is_forbidden());
        assert_eq!(m.get(2, 1), Weight::finite(4));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_matrix("# header\ninf 1\n1 one").unwrap_err(),
            InputError::Parse {
                line: 3,
                token: "one".to_string()
            }
        );
        assert_eq!(
            parse_matrix("inf 1 2\n1 inf").unwrap_err(),
            InputError::NotSquare {
                row: 1,
                len: 2,
                expected: 3
            }
        );
        assert_eq!(
            parse_matrix("inf -3\n1 inf").unwrap_err(),
            InputError::NegativeCost {
                row: 0,
                col: 1,
                cost: -3
            }
        );
        assert_eq!(parse_matrix("").unwrap_err(), InputError::TooSmall(0));
    }

    #[test]
    fn test_export_import_matrix() {
        let m = parse_matrix("inf 10 -\n3 inf 7\n5 x inf").unwrap();
        let dir = tempdir().unwrap();
        let file = dir.path().join("instance.txt");

        export_matrix(&file, &m).unwrap();
        let imported = import_matrix(&file).unwrap();

        assert_eq!(imported, m);
        assert!(imported.get(0, 2).is_forbidden());
        assert!(imported.get(2, 1).is_forbidden());
    }

    #[test]
    fn test_export_solutions() {
        let m = parse_matrix("inf 1 10\n10 inf 1\n1 10 inf").unwrap();
        let outcome = solve_tsp_with(&m, &SolverConfig::default()).unwrap();
        let dir = tempdir().unwrap();
        let file = dir.path().join("solutions.json");

        export_solutions(&file, &outcome).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();

        assert_eq!(json["cost"], 3);
        assert_eq!(json["complete"], true);
        assert_eq!(json["solutions"][0]["cost"], 3);
        assert_eq!(json["solutions"][0]["path"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["stats"]["terminals"], outcome.stats.terminals);
    }
}
