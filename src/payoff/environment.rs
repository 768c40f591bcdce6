use crate::Points;
use crate::Round;
use serde::Deserialize;
use serde::Serialize;

/// Per-option mean rewards, switched every `rounds_per_environment` rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environments {
    tables: Vec<Vec<Points>>,
    rounds_per_environment: Round,
}

impl Environments {
    pub fn new(tables: Vec<Vec<Points>>, rounds_per_environment: Round) -> Self {
        Self {
            tables,
            rounds_per_environment,
        }
    }
    /// Mean rewards in effect at `round`.
    pub fn means(&self, round: Round) -> &[Points] {
        let epoch = round / self.rounds_per_environment.max(1);
        let index = epoch as usize % self.tables.len().max(1);
        self.tables.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn rounds_per_environment(&self) -> Round {
        self.rounds_per_environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn single_table_never_switches() {
        let env = Environments::new(vec![vec![50.0; 3]], 10);
        assert_eq!(env.means(0), &[50.0, 50.0, 50.0]);
        assert_eq!(env.means(1000), &[50.0, 50.0, 50.0]);
    }
    #[test]
    fn switches_every_block() {
        let env = Environments::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 5);
        assert_eq!(env.means(0), &[1.0, 2.0]);
        assert_eq!(env.means(4), &[1.0, 2.0]);
        assert_eq!(env.means(5), &[3.0, 4.0]);
        assert_eq!(env.means(10), &[1.0, 2.0]);
    }
}
