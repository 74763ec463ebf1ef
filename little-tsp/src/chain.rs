use rustc_hash::FxHashMap;

/// Endpoints of the disjoint fixed sub-chains of a partial tour.
///
/// Every committed edge `a -> b` either starts a new chain, extends one at
/// either end, or glues two chains together. Only the two endpoints of each
/// chain are stored, so linking an edge is O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainEnds {
    end_of: FxHashMap<usize, usize>,
    start_of: FxHashMap<usize, usize>,
}

impl ChainEnds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the directed edge `from -> to` and returns the `(start, end)` of
    /// the chain that now contains it.
    pub fn link(&mut self, from: usize, to: usize) -> (usize, usize) {
        // `from` ends an existing chain: extend it, keeping its start.
        let start = match self.start_of.remove(&from) {
            Some(start) => {
                self.end_of.remove(&start);
                start
            }
            None => from,
        };
        // `to` starts an existing chain: keep its end.
        let end = match self.end_of.remove(&to) {
            Some(end) => {
                self.start_of.remove(&end);
                end
            }
            None => to,
        };

        self.end_of.insert(start, end);
        self.start_of.insert(end, start);
        (start, end)
    }

    pub fn end_of(&self, start: usize) -> Option<usize> {
        self.end_of.get(&start).copied()
    }

    pub fn start_of(&self, end: usize) -> Option<usize> {
        self.start_of.get(&end).copied()
    }

    /// Number of disjoint chains.
    pub fn len(&self) -> usize {
        self.end_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_of.is_empty()
    }

    /// All chains as `(start, end)` pairs, sorted by start.
    pub fn chains(&self) -> Vec<(usize, usize)> {
        let mut chains: Vec<(usize, usize)> = self.end_of.iter().map(|(&s, &e)| (s, e)).collect();
        chains.sort_unstable();
        chains
    }
}

#[cfg(test)]
mod test_chain {
    use super::*;

    #[test]
    fn test_single_edge() {
        let mut chains = ChainEnds::new();
        assert_eq!(chains.link(0, 2), (0, 2));
        assert_eq!(chains.end_of(0), Some(2));
        assert_eq!(chains.start_of(2), Some(0));
        assert_eq!(chains.len(), 1);
    }

    #[test]
    fn test_extend_both_ends() {
        let mut chains = ChainEnds::new();
        chains.link(0, 2);
        // prepend
        assert_eq!(chains.link(1, 0), (1, 2));
        // append
        assert_eq!(chains.link(2, 3), (1, 3));
        assert_eq!(chains.chains(), vec![(1, 3)]);
        assert_eq!(chains.start_of(2), None);
        assert_eq!(chains.end_of(0), None);
    }

    #[test]
    fn test_glue_two_chains() {
        let mut chains = ChainEnds::new();
        chains.link(0, 1);
        chains.link(3, 4);
        assert_eq!(chains.chains(), vec![(0, 1), (3, 4)]);
        assert_eq!(chains.link(1, 3), (0, 4));
        assert_eq!(chains.chains(), vec![(0, 4)]);
        assert_eq!(chains.len(), 1);
    }

    #[test]
    fn test_disjoint_chains_stay_apart() {
        let mut chains = ChainEnds::new();
        chains.link(5, 2);
        chains.link(0, 1);
        chains.link(2, 4);
        assert_eq!(chains.chains(), vec![(0, 1), (5, 4)]);
    }
}
