use super::NetworkGraph;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

/// Initial shape of a room's network.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Complete,
    Empty,
    /// Each participant tied to its two slot neighbors.
    Ring,
    /// Each possible edge present independently with probability `density`.
    Random { density: f64 },
}

impl Topology {
    pub fn build<R>(&self, n: usize, rng: &mut R) -> NetworkGraph
    where
        R: Rng,
    {
        match self {
            Self::Complete => NetworkGraph::complete(n),
            Self::Empty => NetworkGraph::empty(n),
            Self::Ring => {
                let mut graph = NetworkGraph::empty(n);
                (0..n).for_each(|i| graph.link(i, (i + 1) % n));
                graph
            }
            Self::Random { density } => {
                let p = density.clamp(0.0, 1.0);
                let mut graph = NetworkGraph::empty(n);
                for a in 0..n {
                    for b in (a + 1)..n {
                        if rng.random_bool(p) {
                            graph.link(a, b);
                        }
                    }
                }
                graph
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    #[test]
    fn ring_has_n_edges() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let graph = Topology::Ring.build(5, rng);
        assert_eq!(graph.total_edges(), 5);
        assert!(graph.is_connected());
        assert!((0..5).all(|p| graph.degree_of(p) == 2));
    }
    #[test]
    fn ring_of_two_is_one_edge() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let graph = Topology::Ring.build(2, rng);
        assert_eq!(graph.total_edges(), 1);
    }
    #[test]
    fn random_extremes() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(Topology::Random { density: 1.0 }.build(6, rng).density(), 1.0);
        assert_eq!(Topology::Random { density: 0.0 }.build(6, rng).density(), 0.0);
    }
    #[test]
    fn random_is_seeded() {
        let a = Topology::Random { density: 0.5 }.build(8, &mut SmallRng::seed_from_u64(3));
        let b = Topology::Random { density: 0.5 }.build(8, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
