use super::NetworkGraph;
use crate::Round;
use crate::Slot;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;

/// What a participant does in a pairing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "partner", rename_all = "snake_case")]
pub enum Assignment {
    Partner(Slot),
    /// No remaining edge to any active participant.
    Isolated,
    /// Has partners in principle, but sits this round out.
    Unpaired,
    /// Not active this round.
    Absent,
}

/// Assignments for every slot in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    round: Round,
    assignments: Vec<Assignment>,
}

impl Pairing {
    pub fn round(&self) -> Round {
        self.round
    }
    pub fn assignment(&self, slot: Slot) -> Assignment {
        self.assignments
            .get(slot)
            .copied()
            .unwrap_or(Assignment::Absent)
    }
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }
    pub fn partner_of(&self, slot: Slot) -> Option<Slot> {
        match self.assignment(slot) {
            Assignment::Partner(q) => Some(q),
            _ => None,
        }
    }
    /// Each pair once, lower slot first, ordered by lower slot.
    pub fn pairs(&self) -> Vec<(Slot, Slot)> {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(p, a)| match a {
                Assignment::Partner(q) if p < *q => Some((p, *q)),
                _ => None,
            })
            .collect()
    }
    pub fn isolated(&self) -> Vec<Slot> {
        self.filter(Assignment::Isolated)
    }
    pub fn unpaired(&self) -> Vec<Slot> {
        self.filter(Assignment::Unpaired)
    }
    fn filter(&self, target: Assignment) -> Vec<Slot> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| **a == target)
            .map(|(p, _)| p)
            .collect()
    }
}

/// Remembers who met whom and who sat out, to build each round's pairs.
///
/// Active participants without any valid partner are isolated. The rest are
/// matched with a maximum matching along remaining edges. With an odd number
/// of eligible participants exactly one sits out whenever the graph allows:
/// candidates are tried by fewest sit-outs so far, ties rotating with the
/// round, and the first whose absence leaves a perfect matching is chosen.
/// Within a matching each participant prefers the partner it was paired with
/// least recently (never-paired first).
#[derive(Debug, Clone)]
pub struct Matchmaker {
    n: usize,
    last: Vec<Option<Round>>,
    sitouts: Vec<u32>,
}

/// Search state for one round's matching.
struct Search<'a> {
    graph: &'a NetworkGraph,
    matchmaker: &'a Matchmaker,
    dead: HashSet<(Vec<Slot>, usize)>,
    pairs: Vec<(Slot, Slot)>,
    skipped: Vec<Slot>,
}

impl Search<'_> {
    /// Pairs everyone in `open` (sorted) leaving at most `skips` unpaired.
    fn solve(&mut self, open: &[Slot], skips: usize) -> bool {
        if open.is_empty() {
            return true;
        }
        if self.dead.contains(&(open.to_vec(), skips)) {
            return false;
        }
        let options = |p: Slot| {
            open.iter()
                .copied()
                .filter(|q| *q != p && self.graph.has_edge(p, *q))
                .collect::<Vec<_>>()
        };
        let Some(p) = open.iter().copied().min_by_key(|p| (options(*p).len(), *p)) else {
            return true;
        };
        let mut choices = options(p);
        choices.sort_by_key(|q| (self.matchmaker.last_paired(p, *q), *q));
        for q in choices {
            let rest = open
                .iter()
                .copied()
                .filter(|x| *x != p && *x != q)
                .collect::<Vec<_>>();
            self.pairs.push((p, q));
            if self.solve(&rest, skips) {
                return true;
            }
            self.pairs.pop();
        }
        if skips > 0 {
            let rest = open
                .iter()
                .copied()
                .filter(|x| *x != p)
                .collect::<Vec<_>>();
            self.skipped.push(p);
            if self.solve(&rest, skips - 1) {
                return true;
            }
            self.skipped.pop();
        }
        self.dead.insert((open.to_vec(), skips));
        false
    }
}

impl Matchmaker {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            last: vec![None; n * n],
            sitouts: vec![0; n],
        }
    }
    pub fn last_paired(&self, a: Slot, b: Slot) -> Option<Round> {
        self.last.get(a * self.n + b).copied().flatten()
    }
    pub fn sitouts(&self, slot: Slot) -> u32 {
        self.sitouts.get(slot).copied().unwrap_or(0)
    }
    pub fn pair(&mut self, graph: &NetworkGraph, active: &[bool], round: Round) -> Pairing {
        let n = self.n.min(graph.size()).min(active.len());
        let inactive = (0..self.n)
            .filter(|p| !active.get(*p).copied().unwrap_or(false))
            .collect::<Vec<_>>();
        let mut assignments = vec![Assignment::Absent; self.n];
        let mut eligible = Vec::new();
        for p in (0..n).filter(|p| active[*p]) {
            match graph.valid_partners_of(p, &inactive).is_empty() {
                true => assignments[p] = Assignment::Isolated,
                false => eligible.push(p),
            }
        }
        let (pairs, skipped) = self.matching(graph, &eligible, round);
        for p in skipped {
            assignments[p] = Assignment::Unpaired;
            self.sitouts[p] += 1;
        }
        for (p, q) in pairs {
            assignments[p] = Assignment::Partner(q);
            assignments[q] = Assignment::Partner(p);
            self.last[p * self.n + q] = Some(round);
            self.last[q * self.n + p] = Some(round);
        }
        log::debug!("[matchmaker] round {} assignments {:?}", round, assignments);
        Pairing { round, assignments }
    }
    /// Maximum matching of `eligible`, with the sit-out rotation applied when it is odd.
    fn matching(
        &self,
        graph: &NetworkGraph,
        eligible: &[Slot],
        round: Round,
    ) -> (Vec<(Slot, Slot)>, Vec<Slot>) {
        let mut search = Search {
            graph,
            matchmaker: self,
            dead: HashSet::new(),
            pairs: Vec::new(),
            skipped: Vec::new(),
        };
        let odd = eligible.len() % 2 == 1;
        if odd {
            for out in self.rotation(eligible, round) {
                let rest = eligible
                    .iter()
                    .copied()
                    .filter(|p| *p != out)
                    .collect::<Vec<_>>();
                if search.solve(&rest, 0) {
                    return (search.pairs, vec![out]);
                }
            }
        }
        let start = if odd { 3 } else { 0 };
        for skips in (start..=eligible.len()).step_by(2) {
            if search.solve(eligible, skips) {
                return (search.pairs, search.skipped);
            }
        }
        (Vec::new(), eligible.to_vec())
    }
    /// Sit-out candidates: fewest sit-outs so far, ties broken by a cursor that advances each round.
    fn rotation(&self, eligible: &[Slot], round: Round) -> Vec<Slot> {
        let n = self.n.max(1);
        let cursor = round as usize % n;
        let mut order = eligible.to_vec();
        order.sort_by_key(|p| (self.sitouts(*p), (p + n - cursor) % n));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn even_complete_pairs_everyone() {
        let graph = NetworkGraph::complete(4);
        let mut mm = Matchmaker::new(4);
        let pairing = mm.pair(&graph, &[true; 4], 0);
        assert_eq!(pairing.pairs().len(), 2);
        assert!(pairing.unpaired().is_empty());
        assert!(pairing.isolated().is_empty());
        for p in 0..4 {
            let q = pairing.partner_of(p).unwrap();
            assert_eq!(pairing.partner_of(q), Some(p));
        }
    }
    #[test]
    fn prefers_never_paired() {
        let graph = NetworkGraph::complete(4);
        let mut mm = Matchmaker::new(4);
        let mut seen = HashSet::new();
        for round in 0..3 {
            for pair in mm.pair(&graph, &[true; 4], round).pairs() {
                assert!(seen.insert(pair), "pair {:?} repeated in round {}", pair, round);
            }
        }
        assert_eq!(seen.len(), 6);
    }
    #[test]
    fn prefers_least_recent_once_exhausted() {
        let graph = NetworkGraph::complete(4);
        let mut mm = Matchmaker::new(4);
        let first = mm.pair(&graph, &[true; 4], 0).pairs();
        mm.pair(&graph, &[true; 4], 1);
        mm.pair(&graph, &[true; 4], 2);
        assert_eq!(mm.pair(&graph, &[true; 4], 3).pairs(), first);
    }
    #[test]
    fn odd_count_rotates_sitout() {
        let graph = NetworkGraph::complete(5);
        let mut mm = Matchmaker::new(5);
        let mut out = Vec::new();
        for round in 0..5 {
            let pairing = mm.pair(&graph, &[true; 5], round);
            assert_eq!(pairing.unpaired().len(), 1);
            assert_eq!(pairing.pairs().len(), 2);
            out.push(pairing.unpaired()[0]);
        }
        let distinct = out.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 5);
        assert!((0..5).all(|p| mm.sitouts(p) == 1));
    }
    #[test]
    fn degree_zero_is_isolated() {
        let mut graph = NetworkGraph::complete(3);
        graph.remove_edge(0, 1);
        graph.remove_edge(0, 2);
        let mut mm = Matchmaker::new(3);
        let pairing = mm.pair(&graph, &[true; 3], 0);
        assert_eq!(pairing.assignment(0), Assignment::Isolated);
        assert_eq!(pairing.pairs(), vec![(1, 2)]);
        assert_eq!(mm.sitouts(0), 0);
    }
    #[test]
    fn inactive_partners_do_not_count() {
        let mut graph = NetworkGraph::complete(3);
        graph.remove_edge(0, 1);
        let mut mm = Matchmaker::new(3);
        let pairing = mm.pair(&graph, &[true, true, false], 0);
        assert_eq!(pairing.assignment(2), Assignment::Absent);
        assert_eq!(pairing.assignment(0), Assignment::Isolated);
        assert_eq!(pairing.assignment(1), Assignment::Isolated);
    }
    #[test]
    fn pairs_only_along_edges() {
        let mut graph = NetworkGraph::complete(4);
        graph.remove_edge(0, 1);
        graph.remove_edge(2, 3);
        let mut mm = Matchmaker::new(4);
        for round in 0..4 {
            for (a, b) in mm.pair(&graph, &[true; 4], round).pairs() {
                assert!(graph.has_edge(a, b));
            }
        }
    }
    fn path(n: usize) -> NetworkGraph {
        let mut graph = NetworkGraph::complete(n);
        for a in 0..n {
            for b in a + 2..n {
                graph.remove_edge(a, b);
            }
        }
        graph
    }
    #[test]
    fn odd_path_leaves_exactly_one_out() {
        let graph = path(5);
        let mut mm = Matchmaker::new(5);
        for round in 0..8 {
            let pairing = mm.pair(&graph, &[true; 5], round);
            assert_eq!(pairing.unpaired().len(), 1, "round {}", round);
            assert_eq!(pairing.pairs().len(), 2, "round {}", round);
            for (a, b) in pairing.pairs() {
                assert!(graph.has_edge(a, b));
            }
        }
    }
    #[test]
    fn odd_path_skips_unmatchable_sitouts() {
        let graph = path(5);
        let mut mm = Matchmaker::new(5);
        assert_eq!(mm.pair(&graph, &[true; 5], 0).unpaired(), vec![0]);
        let second = mm.pair(&graph, &[true; 5], 1);
        assert_eq!(second.unpaired(), vec![2]);
        assert_eq!(second.pairs(), vec![(0, 1), (3, 4)]);
    }
    #[test]
    fn odd_ring_rotates_through_everyone() {
        let mut graph = NetworkGraph::complete(5);
        for a in 0..5 {
            for b in a + 2..5 {
                if (a, b) != (0, 4) {
                    graph.remove_edge(a, b);
                }
            }
        }
        let mut mm = Matchmaker::new(5);
        let mut out = HashSet::new();
        for round in 0..5 {
            let pairing = mm.pair(&graph, &[true; 5], round);
            assert_eq!(pairing.unpaired().len(), 1);
            assert_eq!(pairing.pairs().len(), 2);
            out.insert(pairing.unpaired()[0]);
        }
        assert_eq!(out.len(), 5);
    }
    #[test]
    fn star_strands_only_what_it_must() {
        let mut graph = NetworkGraph::complete(4);
        graph.remove_edge(1, 2);
        graph.remove_edge(1, 3);
        graph.remove_edge(2, 3);
        let mut mm = Matchmaker::new(4);
        let pairing = mm.pair(&graph, &[true; 4], 0);
        assert_eq!(pairing.pairs(), vec![(0, 1)]);
        assert_eq!(pairing.unpaired(), vec![2, 3]);
        assert_eq!(mm.sitouts(2), 1);
    }
}
