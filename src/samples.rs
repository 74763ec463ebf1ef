use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    path::Path,
    time::Duration,
};

use csv::WriterBuilder;
use little_tsp::{Cost, SearchOutcome, SearchStats};
use serde::Serialize;

pub trait ResultRow {
    type RowType: Serialize;
    fn to_row(&self) -> Self::RowType;

    fn headers<'a>(&'a self) -> Vec<&'a str>;
}

/// One solved instance.
#[derive(Debug, Clone)]
pub struct Sample {
    pub n: usize,
    pub symmetric: bool,
    pub outcome: SearchOutcome,
    pub elapsed: Duration,
    /// Optimum of the exhaustive solver, if it was run.
    pub reference: Option<Option<Cost>>,
}

impl Sample {
    /// `false` only if the exhaustive solver ran and disagrees.
    pub fn agrees(&self) -> bool {
        match self.reference {
            Some(reference) => reference == self.outcome.optimal_cost(),
            None => true,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Row {
    n: usize,
    symmetric: bool,
    cost: Option<Cost>,
    optima: usize,
    complete: bool,
    stats: SearchStats,
    millis: u64,
}

impl ResultRow for Sample {
    type RowType = Row;

    fn to_row(&self) -> Self::RowType {
        Row {
            n: self.n,
            symmetric: self.symmetric,
            cost: self.outcome.optimal_cost(),
            optima: self.outcome.solutions.len(),
            complete: self.outcome.complete,
            stats: self.outcome.stats,
            millis: self.elapsed.as_millis() as u64,
        }
    }

    fn headers<'a>(&'a self) -> Vec<&'a str> {
        vec![
            "n",
            "symmetric",
            "cost",
            "optima",
            "complete",
            "popped",
            "branched",
            "pruned",
            "infeasible",
            "duplicates",
            "terminals",
            "millis",
        ]
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.outcome.optimal_cost() {
            Some(cost) => write!(f, "n: {}, cost: {}", self.n, cost)?,
            None => write!(f, "n: {}, no tour", self.n)?,
        }
        write!(
            f,
            ", optima: {}, nodes: {}",
            self.outcome.solutions.len(),
            self.outcome.stats.popped
        )?;
        if let Some(reference) = self.reference {
            match reference {
                Some(cost) => write!(f, ", brute force: {}", cost)?,
                None => write!(f, ", brute force: no tour")?,
            }
        }
        Ok(())
    }
}

pub fn export<I: ResultRow, P: AsRef<Path>>(
    samples: Vec<I>,
    path: P,
) -> Result<(), Box<dyn Error>> {
    log::info!("Exporting results to {:?}.", path.as_ref());
    let headers = match samples.first() {
        Some(sample) => sample.headers(),
        None => {
            log::warn!("Nothing to export.");
            return Ok(());
        }
    };
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(headers)?;
    for sample in samples {
        let row = sample.to_row();
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod test_samples {
    use little_tsp::{solve_tsp_with, CostMatrix, SolverConfig};
    use tempfile::tempdir;

    use super::*;

    fn sample(costs: &[Vec<Option<i64>>]) -> Sample {
        let matrix = CostMatrix::from_costs(costs).unwrap();
        Sample {
            n: matrix.size(),
            symmetric: matrix.is_symmetric(),
            outcome: solve_tsp_with(&matrix, &SolverConfig::default()).unwrap(),
            elapsed: Duration::from_millis(3),
            reference: None,
        }
    }

    #[test]
    fn test_export_columns_match_headers() {
        let samples = vec![
            sample(&[vec![None, Some(4)], vec![Some(3), None]]),
            sample(&[vec![None, Some(1)], vec![None, None]]),
        ];
        let dir = tempdir().unwrap();
        let file = dir.path().join("results.csv");

        export(samples, &file).unwrap();

        let text = std::fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "n,symmetric,cost,optima,complete,popped,branched,pruned,infeasible,duplicates,terminals,millis"
        );
        assert_eq!(lines[1], "2,false,7,1,true,1,0,0,0,0,1,3");
        // no tour: the cost column stays empty
        assert_eq!(lines[2], "2,false,,0,true,1,0,0,1,0,1,3");
        for line in &lines {
            assert_eq!(line.split(',').count(), 12);
        }
    }

    #[test]
    fn test_agrees() {
        let mut s = sample(&[vec![None, Some(4)], vec![Some(3), None]]);
        assert!(s.agrees());
        s.reference = Some(Some(7.into()));
        assert!(s.agrees());
        s.reference = Some(None);
        assert!(!s.agrees());
    }

    #[test]
    fn test_export_nothing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("empty.csv");
        export(Vec::<Sample>::new(), &file).unwrap();
        assert!(!file.exists());
    }
}
