use super::NetworkGraph;
use super::Pairing;
use super::Removal;
use crate::Round;
use crate::Slot;
use serde::Deserialize;
use serde::Serialize;

/// A member's verdict on the tie to its current partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Maintain,
    Break,
}

/// Reasons a vote is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("P{0} has no partner this round")]
    NotPaired(Slot),
    #[error("P{voter} is paired with P{actual}, not P{named}")]
    WrongPartner {
        voter: Slot,
        named: Slot,
        actual: Slot,
    },
    #[error("P{0} already voted")]
    AlreadyVoted(Slot),
}

/// Votes of one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Ballot {
    members: [Slot; 2],
    votes: [Option<Vote>; 2],
}

impl Ballot {
    pub fn new(a: Slot, b: Slot) -> Self {
        Self {
            members: [a.min(b), a.max(b)],
            votes: [None, None],
        }
    }
    pub fn members(&self) -> [Slot; 2] {
        self.members
    }
    pub fn contains(&self, slot: Slot) -> bool {
        self.members.contains(&slot)
    }
    pub fn vote_of(&self, slot: Slot) -> Option<Vote> {
        self.index(slot).and_then(|i| self.votes[i])
    }
    pub fn cast(&mut self, voter: Slot, vote: Vote) -> Result<(), Refusal> {
        let i = self.index(voter).ok_or(Refusal::NotPaired(voter))?;
        match self.votes[i] {
            Some(_) => Err(Refusal::AlreadyVoted(voter)),
            None => {
                self.votes[i] = Some(vote);
                Ok(())
            }
        }
    }
    /// Members whose vote is to break. A single entry is enough to cut the edge.
    pub fn breakers(&self) -> Vec<Slot> {
        self.members
            .iter()
            .zip(self.votes.iter())
            .filter(|(_, v)| **v == Some(Vote::Break))
            .map(|(m, _)| *m)
            .collect()
    }
    /// Unilateral veto: either member breaking severs. Missing votes count as maintain.
    pub fn severs(&self) -> bool {
        !self.breakers().is_empty()
    }
    fn index(&self, slot: Slot) -> Option<usize> {
        self.members.iter().position(|m| *m == slot)
    }
}

/// Open ballots for every pair of a round.
#[derive(Debug, Clone, PartialEq)]
pub struct Ostracism {
    round: Round,
    ballots: Vec<Ballot>,
}

impl Ostracism {
    pub fn open(pairing: &Pairing) -> Self {
        Self {
            round: pairing.round(),
            ballots: pairing
                .pairs()
                .into_iter()
                .map(|(a, b)| Ballot::new(a, b))
                .collect(),
        }
    }
    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }
    pub fn cast(&mut self, voter: Slot, partner: Slot, vote: Vote) -> Result<(), Refusal> {
        let ballot = self
            .ballots
            .iter_mut()
            .find(|b| b.contains(voter))
            .ok_or(Refusal::NotPaired(voter))?;
        let [a, b] = ballot.members();
        let actual = if a == voter { b } else { a };
        match actual == partner {
            true => ballot.cast(voter, vote),
            false => Err(Refusal::WrongPartner {
                voter,
                named: partner,
                actual,
            }),
        }
    }
    /// Every voter for whom `counts` holds has voted.
    pub fn complete<F>(&self, counts: F) -> bool
    where
        F: Fn(Slot) -> bool,
    {
        self.ballots.iter().all(|b| {
            b.members()
                .iter()
                .filter(|m| counts(**m))
                .all(|m| b.vote_of(*m).is_some())
        })
    }
    /// Applies every severing ballot to the graph and returns the removals made.
    pub fn resolve(self, graph: &mut NetworkGraph) -> Vec<Removal> {
        let before = graph.removals().len();
        for ballot in self.ballots.iter().filter(|b| b.severs()) {
            let [a, b] = ballot.members();
            graph.sever(a, b, ballot.breakers(), self.round);
        }
        graph.removals()[before..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Matchmaker;

    fn pairing(n: usize) -> (NetworkGraph, Pairing) {
        let graph = NetworkGraph::complete(n);
        let pairing = Matchmaker::new(n).pair(&graph, &vec![true; n], 0);
        (graph, pairing)
    }

    #[test]
    fn unilateral_break_severs() {
        let (mut graph, pairing) = pairing(2);
        let mut ostracism = Ostracism::open(&pairing);
        ostracism.cast(0, 1, Vote::Break).unwrap();
        ostracism.cast(1, 0, Vote::Maintain).unwrap();
        let removals = ostracism.resolve(&mut graph);
        assert_eq!(removals.len(), 1);
        assert_eq!(removals[0].initiators, vec![0]);
        assert!(!graph.has_edge(0, 1));
        assert!(graph.valid_partners_of(0, &[]).is_empty());
    }
    #[test]
    fn mutual_maintain_keeps_edge() {
        let (mut graph, pairing) = pairing(2);
        let mut ostracism = Ostracism::open(&pairing);
        ostracism.cast(0, 1, Vote::Maintain).unwrap();
        ostracism.cast(1, 0, Vote::Maintain).unwrap();
        assert!(ostracism.resolve(&mut graph).is_empty());
        assert!(graph.has_edge(0, 1));
    }
    #[test]
    fn mutual_break_records_both() {
        let (mut graph, pairing) = pairing(2);
        let mut ostracism = Ostracism::open(&pairing);
        ostracism.cast(1, 0, Vote::Break).unwrap();
        ostracism.cast(0, 1, Vote::Break).unwrap();
        let removals = ostracism.resolve(&mut graph);
        assert!(removals[0].mutual());
    }
    #[test]
    fn missing_votes_maintain() {
        let (mut graph, pairing) = pairing(4);
        let ostracism = Ostracism::open(&pairing);
        assert!(!ostracism.complete(|_| true));
        assert!(ostracism.complete(|_| false));
        assert!(ostracism.resolve(&mut graph).is_empty());
        assert_eq!(graph.total_edges(), 6);
    }
    #[test]
    fn refuses_bad_votes() {
        let (_, pairing) = pairing(4);
        let partner = pairing.partner_of(0).unwrap();
        let stranger = (1..4).find(|p| *p != partner).unwrap();
        let mut ostracism = Ostracism::open(&pairing);
        assert!(matches!(
            ostracism.cast(0, stranger, Vote::Break),
            Err(Refusal::WrongPartner { .. })
        ));
        ostracism.cast(0, partner, Vote::Break).unwrap();
        assert_eq!(
            ostracism.cast(0, partner, Vote::Maintain),
            Err(Refusal::AlreadyVoted(0))
        );
        assert_eq!(ostracism.cast(9, 0, Vote::Break), Err(Refusal::NotPaired(9)));
    }
}
