use little_tsp::{Cost, CostMatrix, Weight};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub struct CostConfig {
    min: Cost,
    max: Cost,
}

/// Endless stream of random complete instances.
pub struct RandomMatrixGenerator {
    n: usize,
    symmetric: bool,
    cost_config: CostConfig,
    rng: StdRng,
}

impl RandomMatrixGenerator {
    pub fn default_costs(n: usize, symmetric: bool) -> Self {
        RandomMatrixGenerator {
            n,
            symmetric,
            cost_config: CostConfig {
                min: 1.into(),
                max: 100.into(),
            },
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_max_cost(mut self, max: i64) -> Self {
        self.cost_config.max = max.max(self.cost_config.min.get() + 1).into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn random_cost(&mut self) -> Weight {
        Weight::Finite(
            self.rng
                .gen_range(self.cost_config.min..self.cost_config.max),
        )
    }
}

impl Iterator for RandomMatrixGenerator {
    type Item = CostMatrix;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.n;
        let mut rows = vec![vec![Weight::Forbidden; n]; n];
        for r in 0..n {
            for c in 0..n {
                if r == c || (self.symmetric && c < r) {
                    continue;
                }
                let weight = self.random_cost();
                rows[r][c] = weight;
                if self.symmetric {
                    rows[c][r] = weight;
                }
            }
        }

        match CostMatrix::new(rows) {
            Ok(matrix) => Some(matrix),
            Err(err) => {
                log::error!("Cannot generate instance: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod test_gen_instances {
    use super::*;

    #[test]
    fn test_symmetric() {
        let matrices: Vec<CostMatrix> = RandomMatrixGenerator::default_costs(6, true)
            .with_seed(3)
            .take(5)
            .collect();
        assert_eq!(matrices.len(), 5);
        assert!(matrices.iter().all(|m| m.size() == 6 && m.is_symmetric()));
    }

    #[test]
    fn test_cost_range() {
        let m = RandomMatrixGenerator::default_costs(5, false)
            .with_max_cost(4)
            .with_seed(11)
            .next()
            .unwrap();
        for r in 0..5 {
            for c in 0..5 {
                match m.get(r, c).cost() {
                    Some(cost) => assert!(r != c && cost >= 1.into() && cost < 4.into()),
                    None => assert_eq!(r, c),
                }
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = RandomMatrixGenerator::default_costs(4, false).with_seed(42).next();
        let b = RandomMatrixGenerator::default_costs(4, false).with_seed(42).next();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_small_stops() {
        assert!(RandomMatrixGenerator::default_costs(1, false).next().is_none());
    }
}
