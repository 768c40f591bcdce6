use crate::Round;
use crate::Slot;
use serde::Deserialize;
use serde::Serialize;
use std::collections::VecDeque;

/// Why and when an edge went away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    pub a: Slot,
    pub b: Slot,
    /// Members whose vote cut the edge. One entry means a unilateral break.
    pub initiators: Vec<Slot>,
    pub round: Round,
    pub at: u64,
}

impl Removal {
    pub fn mutual(&self) -> bool {
        self.initiators.len() > 1
    }
}

/// Client-facing digest of the network state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub edges_removed: usize,
    pub density: f64,
    pub isolated: Vec<Slot>,
}

/// Undirected interaction graph stored as an n×n boolean matrix.
/// Self-loops never exist; removed edges are never restored.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkGraph {
    n: usize,
    adjacency: Vec<bool>,
    removals: Vec<Removal>,
}

impl NetworkGraph {
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            adjacency: vec![false; n * n],
            removals: Vec::new(),
        }
    }
    pub fn complete(n: usize) -> Self {
        let mut graph = Self::empty(n);
        for a in 0..n {
            for b in (a + 1)..n {
                graph.link(a, b);
            }
        }
        graph
    }
    /// Adds an edge during construction only. Once a room is live the graph
    /// is mutated exclusively through removals.
    pub(crate) fn link(&mut self, a: Slot, b: Slot) {
        if a != b && a < self.n && b < self.n {
            self.adjacency[a * self.n + b] = true;
            self.adjacency[b * self.n + a] = true;
        }
    }
}

impl NetworkGraph {
    pub fn size(&self) -> usize {
        self.n
    }
    pub fn has_edge(&self, a: Slot, b: Slot) -> bool {
        a != b && a < self.n && b < self.n && self.adjacency[a * self.n + b]
    }
    /// Removes the edge in both directions. Returns false if it was already absent.
    pub fn remove_edge(&mut self, a: Slot, b: Slot) -> bool {
        self.sever(a, b, Vec::new(), 0)
    }
    /// Removes the edge and appends the removal to the history.
    pub fn sever(&mut self, a: Slot, b: Slot, initiators: Vec<Slot>, round: Round) -> bool {
        if !self.has_edge(a, b) {
            return false;
        }
        self.adjacency[a * self.n + b] = false;
        self.adjacency[b * self.n + a] = false;
        self.removals.push(Removal {
            a: a.min(b),
            b: a.max(b),
            initiators,
            round,
            at: crate::epoch_millis(),
        });
        log::debug!("[network] removed edge {}-{} in round {}", a, b, round);
        true
    }
    pub fn neighbors(&self, p: Slot) -> impl Iterator<Item = Slot> + '_ {
        (0..self.n).filter(move |q| self.has_edge(p, *q))
    }
    /// Neighbors of `p` not in `exclude`.
    pub fn valid_partners_of(&self, p: Slot, exclude: &[Slot]) -> Vec<Slot> {
        self.neighbors(p).filter(|q| !exclude.contains(q)).collect()
    }
    pub fn degree_of(&self, p: Slot) -> usize {
        self.neighbors(p).count()
    }
    pub fn is_isolated(&self, p: Slot) -> bool {
        self.degree_of(p) == 0
    }
    pub fn total_edges(&self) -> usize {
        self.adjacency.iter().filter(|e| **e).count() / 2
    }
    /// Fraction of possible edges present. Zero for graphs too small to hold one.
    pub fn density(&self) -> f64 {
        match self.n {
            0 | 1 => 0.0,
            n => self.total_edges() as f64 / (n * (n - 1) / 2) as f64,
        }
    }
    /// Whether every node reaches every other.
    pub fn is_connected(&self) -> bool {
        match self.n {
            0 | 1 => true,
            n => self.reach(0).iter().filter(|r| **r).count() == n,
        }
    }
    /// Nodes grouped by component, each sorted, components ordered by their lowest node.
    pub fn connected_components(&self) -> Vec<Vec<Slot>> {
        let mut seen = vec![false; self.n];
        let mut components = Vec::new();
        for root in 0..self.n {
            if seen[root] {
                continue;
            }
            let reached = self.reach(root);
            let component = (0..self.n).filter(|i| reached[*i]).collect::<Vec<_>>();
            component.iter().for_each(|i| seen[*i] = true);
            components.push(component);
        }
        components
    }
    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            edges_removed: self.removals.len(),
            density: self.density(),
            isolated: (0..self.n).filter(|p| self.is_isolated(*p)).collect(),
        }
    }
    fn reach(&self, root: Slot) -> Vec<bool> {
        let mut reached = vec![false; self.n];
        let mut queue = VecDeque::from([root]);
        reached[root] = true;
        while let Some(p) = queue.pop_front() {
            for q in self.neighbors(p) {
                if !reached[q] {
                    reached[q] = true;
                    queue.push_back(q);
                }
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn complete_is_connected() {
        for n in 2..8 {
            let graph = NetworkGraph::complete(n);
            assert!(graph.is_connected());
            assert_eq!(graph.total_edges(), n * (n - 1) / 2);
            assert_eq!(graph.density(), 1.0);
            assert_eq!(graph.connected_components().len(), 1);
        }
    }
    #[test]
    fn empty_is_disconnected() {
        for n in 2..8 {
            let graph = NetworkGraph::empty(n);
            assert!(!graph.is_connected());
            assert_eq!(graph.total_edges(), 0);
            assert_eq!(graph.density(), 0.0);
            assert_eq!(graph.connected_components().len(), n);
            assert!((0..n).all(|p| graph.is_isolated(p)));
        }
    }
    #[test]
    fn no_self_loops() {
        let mut graph = NetworkGraph::complete(3);
        graph.link(1, 1);
        assert!(!graph.has_edge(1, 1));
        assert_eq!(graph.degree_of(1), 2);
        assert!(!graph.remove_edge(2, 2));
    }
    #[test]
    fn removal_is_symmetric_and_monotone() {
        let mut graph = NetworkGraph::complete(4);
        assert!(graph.remove_edge(0, 1));
        assert!(!graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
        assert!(!graph.remove_edge(1, 0));
        for a in 0..4 {
            for b in 0..4 {
                graph.remove_edge(a, b);
                assert!(!graph.has_edge(a, b));
            }
        }
        assert_eq!(graph.total_edges(), 0);
        assert_eq!(graph.removals().len(), 6);
    }
    #[test]
    fn history_records_initiators() {
        let mut graph = NetworkGraph::complete(3);
        assert!(graph.sever(2, 0, vec![2], 4));
        let removal = &graph.removals()[0];
        assert_eq!((removal.a, removal.b), (0, 2));
        assert_eq!(removal.initiators, vec![2]);
        assert_eq!(removal.round, 4);
        assert!(!removal.mutual());
    }
    #[test]
    fn valid_partners_respect_exclusions() {
        let mut graph = NetworkGraph::complete(4);
        graph.remove_edge(0, 2);
        assert_eq!(graph.valid_partners_of(0, &[]), vec![1, 3]);
        assert_eq!(graph.valid_partners_of(0, &[3]), vec![1]);
        assert_eq!(graph.valid_partners_of(0, &[0, 1, 3]), Vec::<Slot>::new());
    }
    #[test]
    fn components_split_after_cuts() {
        let mut graph = NetworkGraph::complete(4);
        graph.remove_edge(0, 2);
        graph.remove_edge(0, 3);
        graph.remove_edge(1, 2);
        graph.remove_edge(1, 3);
        assert!(!graph.is_connected());
        assert_eq!(graph.connected_components(), vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(graph.density(), 2.0 / 6.0);
    }
    #[test]
    fn summary_lists_isolated() {
        let mut graph = NetworkGraph::complete(3);
        graph.remove_edge(0, 1);
        graph.remove_edge(0, 2);
        let summary = graph.summary();
        assert_eq!(summary.edges_removed, 2);
        assert_eq!(summary.isolated, vec![0]);
        assert!((summary.density - 1.0 / 3.0).abs() < 1e-12);
    }
    #[test]
    fn trivial_sizes() {
        assert!(NetworkGraph::empty(0).is_connected());
        assert!(NetworkGraph::empty(1).is_connected());
        assert_eq!(NetworkGraph::complete(1).density(), 0.0);
    }
}
