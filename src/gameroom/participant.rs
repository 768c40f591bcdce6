use crate::OptionIndex;
use crate::Points;
use crate::Slot;
use crate::SubjectId;
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Active,
    Inactive,
}

/// A response in a main-task round. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub slot: Slot,
    pub option: Option<OptionIndex>,
    pub at: u64,
    pub reaction_ms: Option<u64>,
    pub timed_out: bool,
}

impl Choice {
    /// Null response filled in for a participant who never answered.
    pub fn missing(slot: Slot) -> Self {
        Self {
            slot,
            option: None,
            at: crate::epoch_millis(),
            reaction_ms: None,
            timed_out: true,
        }
    }
}

/// A seated subject and everything it has earned so far.
#[derive(Debug, Clone)]
pub struct Participant {
    subject: SubjectId,
    slot: Slot,
    presence: Presence,
    joined_at: Instant,
    history: Vec<Points>,
    waiting_bonus: Points,
    answered: u32,
    isolated: bool,
}

impl Participant {
    pub fn new(subject: SubjectId, slot: Slot, joined_at: Instant) -> Self {
        Self {
            subject,
            slot,
            presence: Presence::Active,
            joined_at,
            history: Vec::new(),
            waiting_bonus: 0.0,
            answered: 0,
            isolated: false,
        }
    }
    pub fn subject(&self) -> &str {
        &self.subject
    }
    pub fn slot(&self) -> Slot {
        self.slot
    }
    pub fn is_active(&self) -> bool {
        self.presence == Presence::Active
    }
    pub fn set_presence(&mut self, presence: Presence) {
        self.presence = presence;
    }
    pub fn joined_at(&self) -> Instant {
        self.joined_at
    }
    /// Sum of round payoffs, excluding the waiting bonus.
    pub fn total(&self) -> Points {
        self.history.iter().sum()
    }
    pub fn history(&self) -> &[Points] {
        &self.history
    }
    pub fn waiting_bonus(&self) -> Points {
        self.waiting_bonus
    }
    pub fn answered(&self) -> u32 {
        self.answered
    }
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }
    pub fn accrue_waiting(&mut self, bonus: Points) {
        self.waiting_bonus += bonus;
    }
    pub fn settle(&mut self, payoff: Points, answered: bool) {
        self.history.push(payoff);
        self.answered += answered as u32;
    }
    /// Marks whether the network left this participant without partners.
    pub fn set_isolated(&mut self, isolated: bool) {
        self.isolated = isolated;
    }
}
